use std::{
    io::Read,
    path::{Path, PathBuf},
};

use clap::{ArgAction, Args as ClapArgs};
use rayon::prelude::*;
use xdoc2md_converters_core::{Converter, Metric, Options, defaults};
use xdoc2md_converters_markdown::{Error, Processor};

use crate::{error, pom};

/// Maven site index converted when no input is given.
const DEFAULT_SOURCE: &str = "src/site/xdoc/index.xml";
/// Where [`DEFAULT_SOURCE`] is converted to.
const DEFAULT_OUTPUT: &str = "README.md";

/// Convert xdoc documents to Markdown
///
/// Without input files, converts `src/site/xdoc/index.xml` into `README.md`.
#[derive(ClapArgs, Debug)]
pub struct Args {
    /// List of files to convert
    #[arg(conflicts_with = "stdin")]
    pub files: Vec<PathBuf>,

    /// Input from stdin
    #[arg(long, conflicts_with = "files")]
    pub stdin: bool,

    /// Output file (single input only); defaults to the input with a `.md` extension
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Maven artifact id; read from the POM when omitted
    #[arg(long)]
    pub artifact_id: Option<String>,

    /// POM to read the artifact id from
    #[arg(long, default_value = "pom.xml")]
    pub pom: PathBuf,

    /// Repository name used for the build job; defaults to the current directory name
    #[arg(long)]
    pub repository: Option<String>,

    /// Build status badge endpoint, the job name is appended to it
    #[arg(long, default_value = defaults::BUILD_STATUS_URL)]
    pub build_status_url: String,

    /// Quality badge server
    #[arg(long, default_value = defaults::SONAR_URL)]
    pub sonar_url: String,

    /// Base URL of the published Maven sites
    #[arg(long, default_value = defaults::DOCS_URL)]
    pub docs_url: String,

    /// Artifact id whose badges use the core group
    #[arg(long, default_value = defaults::CORE_ARTIFACT_ID)]
    pub core_artifact_id: String,

    /// Metric to badge, replaces the default set when given
    #[arg(short = 'm', long = "metric", value_name = "NAME=KEY", action = ArgAction::Append)]
    pub metrics: Vec<Metric>,

    /// Show timing information
    #[arg(long)]
    pub timings: bool,
}

impl Args {
    /// Files to convert, and the output override that goes with them.
    fn inputs(&self) -> (Vec<PathBuf>, Option<PathBuf>) {
        if !self.stdin && self.files.is_empty() {
            let output = self
                .output
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));
            return (vec![PathBuf::from(DEFAULT_SOURCE)], Some(output));
        }
        (self.files.clone(), self.output.clone())
    }
}

/// Name of the checkout in `dir`, used as repository name.
fn repository_name(dir: &Path) -> String {
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn resolve_artifact_id(args: &Args) -> miette::Result<String> {
    if let Some(artifact_id) = &args.artifact_id {
        return Ok(artifact_id.clone());
    }
    match pom::artifact_id_from_file(&args.pom) {
        Ok(Some(artifact_id)) => Ok(artifact_id),
        Ok(None) => Err(miette::miette!(
            help = "pass --artifact-id",
            "no <artifactId> found in {}",
            args.pom.display()
        )),
        Err(e) => Err(error::report(&e, None)
            .wrap_err(format!("cannot read the artifact id from {}", args.pom.display()))),
    }
}

fn resolve_repository(args: &Args) -> miette::Result<String> {
    if let Some(repository) = &args.repository {
        return Ok(repository.clone());
    }
    let dir = std::env::current_dir()
        .map_err(|e| miette::miette!("cannot determine the repository name: {e}"))?;
    Ok(repository_name(&dir))
}

fn build_options(args: &Args, artifact_id: String, repository: String, output: Option<PathBuf>) -> Options {
    let mut builder = Options::builder()
        .artifact_id(artifact_id)
        .repository(repository)
        .build_status_url(args.build_status_url.as_str())
        .sonar_url(args.sonar_url.as_str())
        .docs_url(args.docs_url.as_str())
        .core_artifact_id(args.core_artifact_id.as_str())
        .output(output)
        .timings(args.timings);
    if !args.metrics.is_empty() {
        builder = builder.metrics(args.metrics.clone());
    }
    builder.build()
}

pub fn run(args: &Args) -> miette::Result<()> {
    let (files, output) = args.inputs();
    if output.is_some() && files.len() > 1 {
        return Err(miette::miette!(
            help = "drop --output to write each result next to its input",
            "--output accepts a single input file, got {}",
            files.len()
        ));
    }

    let artifact_id = resolve_artifact_id(args)?;
    let repository = resolve_repository(args)?;
    tracing::debug!(%artifact_id, %repository, "project identity");
    let processor = Processor::new(build_options(args, artifact_id, repository, output));

    if args.stdin {
        let mut source = String::new();
        std::io::stdin()
            .lock()
            .read_to_string(&mut source)
            .map_err(|e| error::report(&e, None))?;
        return processor
            .convert(&source, None)
            .map(|_| ())
            .map_err(|e| error::report(&e, Some((Path::new("<stdin>"), &source))));
    }

    // Each file gets its own handler and its own output, so they convert in parallel
    let results: Vec<(PathBuf, Option<String>, Result<(), Error>)> = files
        .par_iter()
        .map(|file| match std::fs::read_to_string(file) {
            Ok(source) => {
                let result = convert_file(&processor, &source, file);
                (file.clone(), Some(source), result)
            }
            Err(e) => (file.clone(), None, Err(Error::Io(e))),
        })
        .collect();

    let errors: Vec<_> = results
        .into_iter()
        .filter(|(_file, _source, result)| result.is_err())
        .collect();

    if !errors.is_empty() {
        eprintln!("\nFailed to process {} file(s):", errors.len());
        for (idx, (file, source, result)) in errors.iter().enumerate() {
            if let Err(e) = result {
                eprintln!("\n{}. File: {}", idx + 1, file.display());
                let report = error::report(e, source.as_deref().map(|source| (file.as_path(), source)));
                eprintln!("{report:?}");
            }
        }
        return Err(miette::miette!("failed to convert {} file(s)", errors.len()));
    }

    Ok(())
}

fn convert_file(processor: &Processor, source: &str, file: &Path) -> Result<(), Error> {
    if let Some(output) = processor.convert(source, Some(file))? {
        tracing::info!(input = %file.display(), output = %output.display(), "converted");
    }
    Ok(())
}
