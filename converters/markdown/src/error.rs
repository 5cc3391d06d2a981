//! Error types for the Markdown converter.

use std::path::PathBuf;

/// Errors that can occur during Markdown conversion.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error while writing the result.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Output path would be the same as input path.
    #[error("Output path cannot be the same as input path: {0}")]
    OutputPathSameAsInput(PathBuf),

    /// The source document is not well-formed.
    #[error("Parser error: {0}")]
    Parser(#[from] xdoc_parser::Error),
}
