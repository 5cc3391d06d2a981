//! Reads project coordinates from a Maven `pom.xml`.

use std::path::Path;

use xdoc_parser::{Attributes, Handler};

/// Captures the text of `<project><artifactId>`.
///
/// Only the direct child of the root counts: the `artifactId` of the parent,
/// of dependencies or plugins sits deeper and is ignored.
#[derive(Debug, Default)]
struct ArtifactIdReader {
    path: Vec<String>,
    artifact_id: String,
}

impl ArtifactIdReader {
    fn in_project_artifact_id(&self) -> bool {
        matches!(self.path.as_slice(), [root, child] if root == "project" && child == "artifactId")
    }
}

impl Handler for ArtifactIdReader {
    type Error = xdoc_parser::Error;

    fn start_element(&mut self, name: &str, _attributes: &Attributes) -> Result<(), Self::Error> {
        self.path.push(name.to_string());
        Ok(())
    }

    fn end_element(&mut self, _name: &str) -> Result<(), Self::Error> {
        self.path.pop();
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<(), Self::Error> {
        if self.in_project_artifact_id() {
            self.artifact_id.push_str(text);
        }
        Ok(())
    }
}

/// The artifact id declared by the POM source `pom`, if any.
pub(crate) fn artifact_id(pom: &str) -> Result<Option<String>, xdoc_parser::Error> {
    let mut reader = ArtifactIdReader::default();
    xdoc_parser::parse(pom, &mut reader)?;
    let artifact_id = reader.artifact_id.trim();
    Ok((!artifact_id.is_empty()).then(|| artifact_id.to_string()))
}

/// The artifact id declared by the POM file at `path`, if any.
#[tracing::instrument]
pub(crate) fn artifact_id_from_file(path: &Path) -> Result<Option<String>, xdoc_parser::Error> {
    let pom = std::fs::read_to_string(path)?;
    artifact_id(&pom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
    <modelVersion>4.0.0</modelVersion>
    <parent>
        <artifactId>lutece-global-pom</artifactId>
        <groupId>fr.paris.lutece.tools</groupId>
    </parent>
    <groupId>fr.paris.lutece.plugins</groupId>
    <artifactId> plugin-forms </artifactId>
    <dependencies>
        <dependency>
            <artifactId>lutece-core</artifactId>
        </dependency>
    </dependencies>
</project>
"#;

    #[test]
    fn test_reads_project_artifact_id() -> Result<(), xdoc_parser::Error> {
        assert_eq!(artifact_id(POM)?, Some("plugin-forms".to_string()));
        Ok(())
    }

    #[test]
    fn test_missing_artifact_id() -> Result<(), xdoc_parser::Error> {
        assert_eq!(
            artifact_id("<project><parent><artifactId>x</artifactId></parent></project>")?,
            None
        );
        Ok(())
    }

    #[test]
    fn test_malformed_pom() {
        assert!(artifact_id("<project><artifactId>x</project>").is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = artifact_id_from_file(Path::new("does/not/exist/pom.xml"));
        assert!(matches!(result, Err(xdoc_parser::Error::Io(_))));
    }
}
