use std::path::{Path, PathBuf};

use xdoc2md_converters_core::{Converter, Options};
use xdoc2md_converters_markdown::Processor;

type Error = Box<dyn std::error::Error>;

/// Drop trailing whitespace on every line, and trailing blank lines.
fn normalize(text: &str) -> String {
    text.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string()
}

/// Converts every `.xml` fixture and compares it with the expected Markdown.
///
/// The fixture's file stem is used as artifact id and `<stem>.git` as
/// repository name, so `lutece-core.xml` exercises the core badge layout.
#[rstest::rstest]
#[tracing_test::traced_test]
fn test_fixtures(#[files("tests/fixtures/source/*.xml")] path: PathBuf) -> Result<(), Error> {
    let file_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or("Invalid fixture file name")?;
    let expected_path = Path::new("tests")
        .join("fixtures")
        .join("expected")
        .join(file_name)
        .with_extension("md");

    let source = std::fs::read_to_string(&path)?;
    let options = Options::builder()
        .artifact_id(file_name)
        .repository(format!("{file_name}.git"))
        .build();
    let mut output = Vec::new();
    Processor::new(options).write_to(&source, &mut output)?;

    let expected = std::fs::read_to_string(&expected_path)?;
    let actual = String::from_utf8(output)?;

    pretty_assertions::assert_eq!(
        normalize(&expected),
        normalize(&actual),
        "Markdown output mismatch for fixture: {file_name}",
    );
    Ok(())
}

#[test]
fn test_output_ends_with_notice() -> Result<(), Error> {
    let source = std::fs::read_to_string("tests/fixtures/source/plugin-demo.xml")?;
    let markdown = Processor::new(Options::builder().artifact_id("plugin-demo").build())
        .convert_to_string(&source)?;
    assert!(markdown.ends_with(
        " *generated by [xdoc2md](https://github.com/lutece-platform/tools-maven-xdoc2md-plugin) - do not edit directly.*"
    ));
    Ok(())
}
