use std::{error::Error, path::Path};

use miette::{Diagnostic, NamedSource, SourceSpan};
use xdoc2md_converters_core::find_parser_error;
use xdoc_parser::Location;

/// Rich error wrapper for miette display with the offending source
#[derive(Debug, Diagnostic, thiserror::Error)]
#[error("{message}")]
#[diagnostic()]
pub(crate) struct RichError {
    message: String,

    #[help]
    advice: String,

    #[source_code]
    src: NamedSource<String>,

    #[label("{position_advice}")]
    span: SourceSpan,
    position_advice: String,
}

/// Error without source context, when the input is not at hand
#[derive(Debug, Diagnostic, thiserror::Error)]
#[error("{message}")]
#[diagnostic()]
pub(crate) struct PlainError {
    message: String,

    #[help]
    advice: Option<String>,
}

fn source_span_from_location(location: &Location) -> SourceSpan {
    let start_offset = location.absolute_start;
    let length = location.absolute_end.saturating_sub(location.absolute_start);

    SourceSpan::new(start_offset.into(), length)
}

/// Build a report for `e`.
///
/// When a parser error sits in the source chain and the source text is known,
/// the report points at the offending markup.
pub(crate) fn report<E: Error + 'static>(e: &E, source_context: Option<(&Path, &str)>) -> miette::Report {
    let Some(parser_error) = find_parser_error(e) else {
        return miette::Report::new(PlainError {
            message: e.to_string(),
            advice: None,
        });
    };

    let advice = parser_error.advice().map(str::to_string);
    if let (Some((path, source)), Some(location)) = (source_context, parser_error.location()) {
        let line = location.start.line;
        let column = location.start.column;
        return miette::Report::new(RichError {
            message: parser_error.to_string(),
            advice: advice.unwrap_or_default(),
            src: NamedSource::new(path.display().to_string(), source.to_string()),
            span: source_span_from_location(location),
            position_advice: format!("error occurred here (line {line}, column {column})"),
        });
    }

    miette::Report::new(PlainError {
        message: parser_error.to_string(),
        advice,
    })
}
