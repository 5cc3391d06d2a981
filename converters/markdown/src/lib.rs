//! Markdown converter for Maven xdoc documents.
//!
//! Produces the `README.md` of a Lutece project from its site index: a build
//! status header and quality badges, the body of the document rendered as
//! Markdown, a link to the published Maven site and a generated-file notice.
//!
//! # Example
//!
//! ```
//! use xdoc2md_converters_core::{Converter, Options};
//! use xdoc2md_converters_markdown::Processor;
//!
//! let options = Options::builder()
//!     .artifact_id("plugin-demo")
//!     .repository("lutece-plugin-demo.git")
//!     .build();
//! let processor = Processor::new(options);
//! let markdown = processor.convert_to_string(
//!     r#"<document><body><section name="Demo"><p>Hello</p></section></body></document>"#,
//! )?;
//! assert!(markdown.starts_with("![](https://dev.lutece.paris.fr/jenkins/buildStatus/icon?job=plugin-demo-deploy)"));
//! assert!(markdown.contains("\n# Demo\n\nHello\n"));
//! # Ok::<(), xdoc2md_converters_markdown::Error>(())
//! ```
//!
//! # Supported elements
//!
//! `section` and `subsection` become headings, `strong`/`b`, `em` and `code`
//! inline spans, `p` paragraphs, `pre` fenced code blocks, `ul`/`li` bullet
//! lists, `table`/`tr`/`th`/`td` pipe tables (the first row is the header),
//! `a` inline links and `img` images. Other elements are skipped but their
//! text is kept. Text outside `body` is dropped.
//!
//! # Limitations
//!
//! - Nested tables, links or preformatted blocks are not supported; the inner
//!   element takes over and a warning is logged.
//! - Ordered lists and definition lists are rendered as plain text.

use std::{
    io::Write,
    path::{Path, PathBuf},
    time::Instant,
};

use xdoc2md_converters_core::{Converter, Options, PrettyDuration};

mod badges;
mod error;
mod markdown_handler;

pub use badges::job_name;
pub use error::Error;
pub use markdown_handler::MarkdownHandler;

/// Markdown converter processor.
#[derive(Clone, Debug)]
pub struct Processor {
    options: Options,
}

impl Processor {
    /// Convert one xdoc document to Markdown.
    ///
    /// Each call uses a fresh [`MarkdownHandler`], so nothing leaks from one
    /// document into the next.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parser`] when the document is not well-formed.
    #[tracing::instrument(skip_all, fields(artifact = self.options.artifact_id()))]
    pub fn convert_to_string(&self, source: &str) -> Result<String, Error> {
        let now = Instant::now();
        let mut handler = MarkdownHandler::new(self.options.clone());
        xdoc_parser::parse(source, &mut handler)?;
        if self.options.timings() {
            tracing::info!(elapsed = now.elapsed().pretty_print(), "converted to markdown");
        }
        Ok(handler.into_result())
    }
}

impl Converter for Processor {
    type Error = Error;

    fn new(options: Options) -> Self {
        Self { options }
    }

    fn options(&self) -> &Options {
        &self.options
    }

    fn output_extension(&self) -> &'static str {
        "md"
    }

    fn write_to<W: Write>(&self, source: &str, mut writer: W) -> Result<(), Self::Error> {
        let markdown = self.convert_to_string(source)?;
        writer.write_all(markdown.as_bytes())?;
        Ok(())
    }

    fn derive_output_path(&self, input: &Path) -> Result<PathBuf, Error> {
        let md_path = self
            .options
            .output()
            .map_or_else(|| input.with_extension(self.output_extension()), Path::to_path_buf);
        // Avoid overwriting the input file
        if md_path == input {
            return Err(Error::OutputPathSameAsInput(input.to_path_buf()));
        }
        Ok(md_path)
    }
}
