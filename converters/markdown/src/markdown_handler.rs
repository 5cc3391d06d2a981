//! Event handler that turns the xdoc event stream into Markdown.

use xdoc2md_converters_core::Options;
use xdoc_parser::{Attributes, Handler, Tag, attribute};

use crate::{Error, badges};

/// One separator cell of the line that follows a table header row.
const HEADER_SEPARATOR_CELL: &str = "|-----------------";

/// Position inside the current table.
#[derive(Debug, Default, Clone, Copy)]
struct TableCursor {
    rows: usize,
    columns: usize,
}

/// Markdown handler that generates Markdown output from xdoc events.
///
/// The output is seeded with the badge preamble on creation and grows with
/// every event; it is complete once `</body>` has been handled. A handler
/// converts exactly one document: create a new one for the next.
pub struct MarkdownHandler {
    options: Options,
    output: String,
    /// Text is only kept once `<body>` has started.
    in_body: bool,
    /// Text is copied verbatim inside `<pre>`.
    in_preformatted: bool,
    table: TableCursor,
    table_depth: usize,
    /// While set, text is rendered as a link to this target.
    link_target: Option<String>,
}

impl MarkdownHandler {
    /// Create a handler for one document.
    #[must_use]
    pub fn new(options: Options) -> Self {
        let output = badges::preamble(&options);
        Self {
            options,
            output,
            in_body: false,
            in_preformatted: false,
            table: TableCursor::default(),
            table_depth: 0,
            link_target: None,
        }
    }

    /// The Markdown produced so far.
    #[must_use]
    pub fn result(&self) -> &str {
        &self.output
    }

    /// Consume the handler, returning the Markdown produced.
    #[must_use]
    pub fn into_result(self) -> String {
        self.output
    }

    fn open(&mut self, tag: Tag, attributes: &Attributes) {
        match tag {
            Tag::Body => self.in_body = true,
            Tag::Section => self.heading("#", attributes),
            Tag::Subsection => self.heading("##", attributes),
            Tag::Strong | Tag::Bold => self.output.push_str(" **"),
            Tag::Emphasis => self.output.push_str(" *"),
            Tag::Code => self.output.push_str(" `"),
            Tag::Paragraph => self.output.push('\n'),
            Tag::Preformatted => {
                if self.in_preformatted {
                    tracing::warn!("nested <pre> blocks are not supported, the inner one closes the fence");
                }
                self.output.push_str("\n```");
                if let Some(language) = attributes.get(attribute::LANGUAGE) {
                    self.output.push_str(language);
                }
                self.output.push('\n');
                self.in_preformatted = true;
            }
            Tag::ListItem => self.output.push_str("\n* "),
            Tag::UnorderedList => self.output.push_str("\n "),
            Tag::Table => {
                if self.table_depth > 0 {
                    tracing::warn!(depth = self.table_depth, "nested tables are not supported, restarting row and column counts");
                }
                self.table_depth += 1;
                self.output.push('\n');
                self.table = TableCursor::default();
            }
            Tag::TableRow => self.table.rows += 1,
            Tag::TableHeader | Tag::TableData => {
                self.output.push_str("| ");
                self.table.columns += 1;
            }
            Tag::Anchor => {
                let target = attributes.get(attribute::HREF).unwrap_or_default();
                if let Some(previous) = &self.link_target {
                    tracing::warn!(%previous, %target, "nested links are not supported, the inner target replaces the outer one");
                }
                self.link_target = Some(target.to_string());
            }
            Tag::Image => {
                let image = self.image(
                    attributes.get(attribute::SRC).unwrap_or_default(),
                    attributes.get(attribute::ALT).unwrap_or_default(),
                );
                self.output.push_str(&image);
            }
        }
    }

    fn close(&mut self, tag: Tag) {
        match tag {
            Tag::Body => {
                self.output
                    .push_str(&badges::documentation_link(&self.options));
                self.output.push_str(badges::FOOTER);
            }
            Tag::Strong | Tag::Bold => self.output.push_str("** "),
            Tag::Emphasis => self.output.push_str("* "),
            Tag::Code => self.output.push_str("` "),
            Tag::Paragraph => self.output.push('\n'),
            Tag::Preformatted => {
                self.output.push_str("\n```\n");
                self.in_preformatted = false;
            }
            Tag::UnorderedList => self.output.push('\n'),
            Tag::Table => self.table_depth = self.table_depth.saturating_sub(1),
            Tag::TableRow => {
                self.output.push_str("|\n");
                // The first row is taken as the header row
                if self.table.rows == 1 {
                    for _ in 0..self.table.columns {
                        self.output.push_str(HEADER_SEPARATOR_CELL);
                    }
                    self.output.push_str("|\n");
                }
            }
            Tag::Anchor => self.link_target = None,
            Tag::Section
            | Tag::Subsection
            | Tag::ListItem
            | Tag::TableHeader
            | Tag::TableData
            | Tag::Image => {}
        }
    }

    fn heading(&mut self, marker: &str, attributes: &Attributes) {
        let name = attributes.get(attribute::NAME).unwrap_or_default();
        self.output.push('\n');
        self.output.push_str(marker);
        self.output.push(' ');
        self.output.push_str(name);
        self.output.push('\n');
    }

    /// Markdown for an image. Relative sources point into the artifact's
    /// published site.
    fn image(&self, source: &str, alt: &str) -> String {
        if source.starts_with("http") {
            format!("![{alt}]({source})")
        } else {
            format!(
                "![{alt}]({}/{}/{source})",
                self.options.docs_url(),
                self.options.artifact_id()
            )
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(target) = &self.link_target {
            self.output.push_str(" [");
            self.output.push_str(trim_controls(text));
            self.output.push_str("](");
            self.output.push_str(trim_controls(target));
            self.output.push_str(") ");
        } else if self.in_body {
            if self.in_preformatted {
                self.output.push_str(text);
            } else {
                self.output.push_str(&collapse_whitespace(text));
            }
        }
    }
}

/// Strip spaces and control characters from both ends. Non-breaking and
/// other Unicode spaces are content and stay.
fn trim_controls(text: &str) -> &str {
    text.trim_matches(|c: char| c <= ' ')
}

fn is_ascii_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\u{0B}' | '\u{0C}' | '\r')
}

/// Trim `text` and replace every run of ASCII whitespace with a single space.
fn collapse_whitespace(text: &str) -> String {
    trim_controls(text)
        .split(is_ascii_space)
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

impl Handler for MarkdownHandler {
    type Error = Error;

    fn start_element(&mut self, name: &str, attributes: &Attributes) -> Result<(), Self::Error> {
        match Tag::from_name(name) {
            Some(tag) => self.open(tag, attributes),
            None => tracing::trace!(name, "ignoring unsupported element"),
        }
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> Result<(), Self::Error> {
        if let Some(tag) = Tag::from_name(name) {
            self.close(tag);
        }
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<(), Self::Error> {
        self.text(text);
        Ok(())
    }
}
