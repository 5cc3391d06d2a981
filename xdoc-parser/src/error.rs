use std::fmt;

use crate::model::{Location, Position};

#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("XML syntax error: {1}, position: {0}")]
    Syntax(Detail, String),

    #[error("mismatched end tag: </{found}> (expected '</{expected}>'), position: {detail}")]
    MismatchedEndTag {
        detail: Detail,
        expected: String,
        found: String,
    },

    #[error("unexpected end tag: </{1}>, position: {0}")]
    UnexpectedEndTag(Detail, String),

    #[error("unclosed element: <{1}>, position: {0}")]
    UnclosedElement(Detail, String),

    #[error("invalid attribute in <{1}>: {2}, position: {0}")]
    InvalidAttribute(Detail, String, String),

    #[error("unknown entity reference: &{1};, position: {0}")]
    UnknownEntity(Detail, String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Extract location information from this error if available.
    #[must_use]
    pub fn location(&self) -> Option<&Location> {
        match self {
            Self::Syntax(detail, ..)
            | Self::MismatchedEndTag { detail, .. }
            | Self::UnexpectedEndTag(detail, ..)
            | Self::UnclosedElement(detail, ..)
            | Self::InvalidAttribute(detail, ..)
            | Self::UnknownEntity(detail, ..) => Some(&detail.location),
            Self::Io(_) => None,
        }
    }

    /// Get advice for resolving this error, if any.
    #[must_use]
    pub fn advice(&self) -> Option<&'static str> {
        match self {
            Self::MismatchedEndTag { .. } => {
                Some("Every element must be closed by an end tag with the same name")
            }
            Self::UnexpectedEndTag(..) => {
                Some("This end tag has no matching start tag; remove it or add the start tag")
            }
            Self::UnclosedElement(..) => Some(
                "The document ended while this element was still open; add its end tag (or write it as `<name/>`)",
            ),
            Self::UnknownEntity(..) => Some(
                "Only the XML entities &amp; &lt; &gt; &quot; &apos; and numeric references like &#160; are supported",
            ),
            Self::InvalidAttribute(..) => {
                Some("Attributes must be written as name=\"value\" and appear only once")
            }
            Self::Syntax(..) | Self::Io(_) => None,
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct Detail {
    pub location: Location,
}

impl fmt::Display for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Location {
            start:
                Position {
                    line: start_line,
                    column: start_column,
                },
            end:
                Position {
                    line: end_line,
                    column: end_column,
                },
            ..
        } = self.location;

        write!(
            f,
            "start(line: {start_line}, column: {start_column}), end(line: {end_line}, column: {end_column})",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn detail() -> Detail {
        Detail {
            location: Location {
                absolute_start: 12,
                absolute_end: 18,
                start: Position { line: 2, column: 3 },
                end: Position { line: 2, column: 9 },
            },
        }
    }

    #[test]
    fn test_error_detail_display() {
        assert_eq!(
            format!("{}", detail()),
            "start(line: 2, column: 3), end(line: 2, column: 9)"
        );
    }

    #[test]
    fn test_mismatched_end_tag_display() {
        let error = Error::MismatchedEndTag {
            detail: detail(),
            expected: "p".to_string(),
            found: "section".to_string(),
        };
        assert_eq!(
            format!("{error}"),
            "mismatched end tag: </section> (expected '</p>'), position: start(line: 2, column: 3), end(line: 2, column: 9)"
        );
        assert!(error.advice().is_some());
        assert_eq!(error.location().map(|l| l.absolute_start), Some(12));
    }

    #[test]
    fn test_io_error_has_no_location() {
        let error = Error::from(std::io::Error::other("disk full"));
        assert_eq!(error.location(), None);
        assert_eq!(error.advice(), None);
        assert_eq!(format!("{error}"), "I/O error: disk full");
    }
}
