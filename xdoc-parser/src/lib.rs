//! Streaming reader for xdoc, the XML documentation format of the Maven site plugin.
//!
//! The reader does not build a tree. It walks the source once and pushes
//! structural events (element start, element end, character data) into a
//! [`Handler`], the same way a SAX parser drives a content handler. Converters
//! implement [`Handler`] and produce their output while the document streams
//! through.
//!
//! ```
//! use xdoc_parser::{Attributes, Handler};
//!
//! #[derive(Default)]
//! struct SectionNames(Vec<String>);
//!
//! impl Handler for SectionNames {
//!     type Error = xdoc_parser::Error;
//!
//!     fn start_element(&mut self, name: &str, attributes: &Attributes) -> Result<(), Self::Error> {
//!         if name == "section" {
//!             self.0.push(attributes.get("name").unwrap_or_default().to_string());
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let mut names = SectionNames::default();
//! xdoc_parser::parse(r#"<body><section name="Intro"/></body>"#, &mut names)?;
//! assert_eq!(names.0, ["Intro"]);
//! # Ok::<(), xdoc_parser::Error>(())
//! ```
//!
//! Well-formedness is checked on the way: mismatched or stray end tags,
//! elements left open at the end of the input, malformed attributes and
//! unknown entity references abort the walk with an [`Error`] carrying the
//! [`Location`] of the offending markup. Events already delivered are not
//! retracted, so handlers that produce output should only publish it once
//! parsing returned `Ok`.

use std::{io::Read, path::Path};

mod error;
mod handler;
mod model;
mod reader;

pub use error::{Detail as ErrorDetail, Error};
pub use handler::{EventCollector, Handler};
pub use model::{Attributes, Event, Location, Position, Tag, attribute};

/// Parse an xdoc document from a string, pushing its events into `handler`.
///
/// # Errors
///
/// Returns the handler's error if the document is not well-formed XML (the
/// parser [`Error`] converted with `From`), or if the handler itself fails.
pub fn parse<H>(input: &str, handler: &mut H) -> Result<(), H::Error>
where
    H: Handler,
    H::Error: From<Error>,
{
    reader::drive(input, handler)
}

/// Parse an xdoc file, pushing its events into `handler`.
///
/// # Errors
///
/// Fails if the file cannot be read as UTF-8 text, or for any reason
/// [`parse`] fails.
#[tracing::instrument(skip_all, fields(path = ?path.as_ref()))]
pub fn parse_file<P, H>(path: P, handler: &mut H) -> Result<(), H::Error>
where
    P: AsRef<Path>,
    H: Handler,
    H::Error: From<Error>,
{
    let input = std::fs::read_to_string(path.as_ref()).map_err(Error::from)?;
    parse(&input, handler)
}

/// Parse an xdoc document read to completion from `reader`.
///
/// # Errors
///
/// Fails if reading fails or the input is not UTF-8, or for any reason
/// [`parse`] fails.
pub fn parse_from_reader<R, H>(reader: &mut R, handler: &mut H) -> Result<(), H::Error>
where
    R: Read,
    H: Handler,
    H::Error: From<Error>,
{
    let mut input = String::new();
    reader.read_to_string(&mut input).map_err(Error::from)?;
    parse(&input, handler)
}

/// Collect every event of a document.
///
/// # Errors
///
/// Fails when the document is not well-formed.
pub fn events(input: &str) -> Result<Vec<Event>, Error> {
    let mut collector = EventCollector::new();
    parse(input, &mut collector)?;
    Ok(collector.into_events())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_from_reader() -> Result<(), Error> {
        let mut source = "<body>x</body>".as_bytes();
        let mut collector = EventCollector::new();
        parse_from_reader(&mut source, &mut collector)?;
        assert_eq!(collector.events().len(), 3);
        Ok(())
    }

    #[test]
    fn test_parse_file_missing() {
        let mut collector = EventCollector::new();
        let result = parse_file("does/not/exist.xml", &mut collector);
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_parse_from_reader_rejects_invalid_utf8() {
        let mut source: &[u8] = &[b'<', b'p', b'>', 0xff, b'<', b'/', b'p', b'>'];
        let mut collector = EventCollector::new();
        let result = parse_from_reader(&mut source, &mut collector);
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
