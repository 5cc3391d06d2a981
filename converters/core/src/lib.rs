//! Core traits and options for xdoc2md converters.
//!
//! - [`Converter`] - trait every output backend implements
//! - [`Options`] - project identity and badge/documentation endpoints
//! - [`Metric`] - a quality metric rendered as a badge
//! - [`find_parser_error`] - locate the parser error behind a converter error
//! - [`write_atomically`] - replace an output file without exposing a partial one
//!
//! # Example
//!
//! ```
//! use xdoc2md_converters_core::Options;
//!
//! let options = Options::builder()
//!     .artifact_id("plugin-forms")
//!     .repository("lutece-form-plugin-forms.git")
//!     .build();
//! assert_eq!(options.docs_url(), "https://dev.lutece.paris.fr/plugins");
//! ```

use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

mod metric;

pub use metric::{Metric, ParseMetricError};

/// Default endpoints, matching the Lutece platform infrastructure.
pub mod defaults {
    /// Build status badge endpoint; the job name is appended to it.
    pub const BUILD_STATUS_URL: &str = "https://dev.lutece.paris.fr/jenkins/buildStatus/icon?job=";
    /// `SonarQube` server serving the quality badges.
    pub const SONAR_URL: &str = "https://dev.lutece.paris.fr/sonar";
    /// Base of the published Maven sites, one directory per artifact.
    pub const DOCS_URL: &str = "https://dev.lutece.paris.fr/plugins";
    /// The artifact whose badges live under the platform group rather than the plugins group.
    pub const CORE_ARTIFACT_ID: &str = "lutece-core";
}

/// Converter options.
///
/// Use [`Options::builder()`] to construct an instance. Options are read-only
/// once built: converters capture them when a conversion starts.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Options {
    artifact_id: String,
    repository: String,
    build_status_url: String,
    sonar_url: String,
    docs_url: String,
    core_artifact_id: String,
    metrics: Vec<Metric>,
    output: Option<PathBuf>,
    timings: bool,
}

impl Default for Options {
    fn default() -> Self {
        OptionsBuilder::default().build()
    }
}

impl Options {
    /// Create a new builder with default values.
    #[must_use]
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::default()
    }

    /// Maven artifact id of the documented project.
    #[must_use]
    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    /// Name of the source repository (used to derive the build job name).
    #[must_use]
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Build status badge endpoint.
    #[must_use]
    pub fn build_status_url(&self) -> &str {
        &self.build_status_url
    }

    /// Quality badge server.
    #[must_use]
    pub fn sonar_url(&self) -> &str {
        &self.sonar_url
    }

    /// Base URL of the published documentation sites.
    #[must_use]
    pub fn docs_url(&self) -> &str {
        &self.docs_url
    }

    /// Artifact id that selects the core badge layout.
    #[must_use]
    pub fn core_artifact_id(&self) -> &str {
        &self.core_artifact_id
    }

    /// Whether the documented project is the core artifact.
    #[must_use]
    pub fn is_core_artifact(&self) -> bool {
        self.artifact_id == self.core_artifact_id
    }

    /// Metrics to badge, in rendering order.
    #[must_use]
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    /// Explicit output path, overriding the one derived from the input.
    #[must_use]
    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    /// Get whether timing information should be logged.
    #[must_use]
    pub fn timings(&self) -> bool {
        self.timings
    }
}

/// Builder for [`Options`].
#[derive(Debug, Clone)]
pub struct OptionsBuilder {
    artifact_id: String,
    repository: String,
    build_status_url: String,
    sonar_url: String,
    docs_url: String,
    core_artifact_id: String,
    metrics: Vec<Metric>,
    output: Option<PathBuf>,
    timings: bool,
}

impl Default for OptionsBuilder {
    fn default() -> Self {
        Self {
            artifact_id: String::new(),
            repository: String::new(),
            build_status_url: defaults::BUILD_STATUS_URL.to_string(),
            sonar_url: defaults::SONAR_URL.to_string(),
            docs_url: defaults::DOCS_URL.to_string(),
            core_artifact_id: defaults::CORE_ARTIFACT_ID.to_string(),
            metrics: Metric::defaults(),
            output: None,
            timings: false,
        }
    }
}

impl OptionsBuilder {
    /// Set the artifact id.
    #[must_use]
    pub fn artifact_id<S: Into<String>>(mut self, artifact_id: S) -> Self {
        self.artifact_id = artifact_id.into();
        self
    }

    /// Set the repository name.
    #[must_use]
    pub fn repository<S: Into<String>>(mut self, repository: S) -> Self {
        self.repository = repository.into();
        self
    }

    /// Set the build status badge endpoint.
    #[must_use]
    pub fn build_status_url<S: Into<String>>(mut self, url: S) -> Self {
        self.build_status_url = url.into();
        self
    }

    /// Set the quality badge server. A trailing `/` is dropped.
    #[must_use]
    pub fn sonar_url<S: Into<String>>(mut self, url: S) -> Self {
        self.sonar_url = without_trailing_slash(url.into());
        self
    }

    /// Set the documentation base URL. A trailing `/` is dropped.
    #[must_use]
    pub fn docs_url<S: Into<String>>(mut self, url: S) -> Self {
        self.docs_url = without_trailing_slash(url.into());
        self
    }

    /// Set the artifact id that selects the core badge layout.
    #[must_use]
    pub fn core_artifact_id<S: Into<String>>(mut self, artifact_id: S) -> Self {
        self.core_artifact_id = artifact_id.into();
        self
    }

    /// Replace the badged metrics.
    #[must_use]
    pub fn metrics(mut self, metrics: Vec<Metric>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Write the result to `output` instead of next to the input.
    #[must_use]
    pub fn output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    /// Enable or disable timing output.
    #[must_use]
    pub fn timings(mut self, timings: bool) -> Self {
        self.timings = timings;
        self
    }

    /// Build the [`Options`] instance.
    #[must_use]
    pub fn build(self) -> Options {
        Options {
            artifact_id: self.artifact_id,
            repository: self.repository,
            build_status_url: self.build_status_url,
            sonar_url: self.sonar_url,
            docs_url: self.docs_url,
            core_artifact_id: self.core_artifact_id,
            metrics: self.metrics,
            output: self.output,
            timings: self.timings,
        }
    }
}

fn without_trailing_slash(mut url: String) -> String {
    while url.ends_with('/') {
        url.pop();
    }
    url
}

/// Trait for document converters.
///
/// A converter is created once from [`Options`] and may convert any number of
/// documents; implementations must not carry state from one conversion to
/// the next.
pub trait Converter: Sized {
    /// The error type for this converter.
    type Error: From<io::Error>;

    /// Create a new converter instance.
    fn new(options: Options) -> Self;

    /// Get a reference to the options.
    fn options(&self) -> &Options;

    /// Extension of the files this converter produces.
    fn output_extension(&self) -> &'static str;

    /// Convert `source` and write the result to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if the source is malformed or writing fails.
    fn write_to<W: Write>(&self, source: &str, writer: W) -> Result<(), Self::Error>;

    /// Path the conversion of `input` is written to.
    ///
    /// # Errors
    ///
    /// Implementations reject paths that would overwrite the input.
    fn derive_output_path(&self, input: &Path) -> Result<PathBuf, Self::Error>;

    /// Convert a document read from `file` (or from stdin when `None`).
    ///
    /// File conversions are rendered in memory first and then swapped into
    /// place with [`write_atomically`], so neither a malformed source nor a
    /// failed write leaves a truncated output file behind. Stdin conversions go to
    /// the explicit output path if one is set, to stdout otherwise. Returns the
    /// path written, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if conversion or writing fails.
    #[tracing::instrument(skip_all, fields(source = ?file))]
    fn convert(&self, source: &str, file: Option<&Path>) -> Result<Option<PathBuf>, Self::Error> {
        let output = match (file, self.options().output()) {
            (Some(input), _) => self.derive_output_path(input)?,
            (None, Some(explicit)) => explicit.to_path_buf(),
            (None, None) => {
                let stdout = io::stdout();
                let mut lock = stdout.lock();
                self.write_to(source, &mut lock)?;
                lock.flush()?;
                return Ok(None);
            }
        };

        let mut rendered = Vec::new();
        self.write_to(source, &mut rendered)?;
        write_atomically(&output, &rendered)?;
        tracing::debug!(destination = ?output, "output written");
        Ok(Some(output))
    }
}

/// Write `contents` to `path` through a sibling staging file renamed over
/// `path`, so readers see either the old file or the complete new one.
///
/// # Errors
///
/// Returns the I/O error of the write or the rename. The staging file is
/// removed on failure.
pub fn write_atomically(path: &Path, contents: &[u8]) -> io::Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, format!("not a file path: {}", path.display())))?;
    let mut staging_name = std::ffi::OsString::from(".");
    staging_name.push(file_name);
    staging_name.push(".tmp");
    let staging = path.with_file_name(staging_name);

    let result = std::fs::write(&staging, contents).and_then(|()| std::fs::rename(&staging, path));
    if result.is_err() {
        let _ = std::fs::remove_file(&staging);
    }
    result
}

/// Extension trait for formatting [`Duration`](std::time::Duration) in human-readable form.
pub trait PrettyDuration {
    /// Format with the most readable unit (ns, µs, ms, s), up to two decimals.
    fn pretty_print(&self) -> String;
}

impl PrettyDuration for std::time::Duration {
    fn pretty_print(&self) -> String {
        let nanos = self.as_nanos();
        // f64 covers any duration we will ever time here
        #[allow(clippy::cast_precision_loss)]
        let value = nanos as f64;
        let (scaled, unit) = match nanos {
            0..=999 => return format!("{nanos}ns"),
            1_000..=999_999 => (value / 1e3, "µs"),
            1_000_000..=999_999_999 => (value / 1e6, "ms"),
            _ => (value / 1e9, "s"),
        };
        let digits = format!("{scaled:.2}");
        let digits = digits.trim_end_matches('0').trim_end_matches('.');
        format!("{digits}{unit}")
    }
}

/// Walk the error source chain to find a parser error.
///
/// The CLI uses this to render malformed-input errors with the offending
/// source span, whatever converter error wraps them.
pub fn find_parser_error<'e>(
    e: &'e (dyn std::error::Error + 'static),
) -> Option<&'e xdoc_parser::Error> {
    let mut current = Some(e);
    while let Some(err) = current {
        if let Some(parser_error) = err.downcast_ref::<xdoc_parser::Error>() {
            return Some(parser_error);
        }
        current = err.source();
    }
    None
}
