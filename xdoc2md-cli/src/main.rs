use std::io;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod error;
mod pom;
mod subcommands;

/// Generate Markdown READMEs from Maven xdoc documentation
#[derive(Parser, Debug)]
#[command(name = "xdoc2md", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert xdoc documents to Markdown
    Convert(subcommands::convert::Args),

    /// Show the event stream the parser produces for a document
    Inspect(subcommands::inspect::Args),
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let layer = fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(io::IsTerminal::is_terminal(&io::stderr()))
        .with_filter(filter);

    tracing_subscriber::registry().with(layer).init();
}

fn main() -> miette::Result<()> {
    setup_logging();

    let cli = Cli::parse();
    match cli.command {
        Command::Convert(args) => subcommands::convert::run(&args),
        Command::Inspect(args) => subcommands::inspect::run(&args),
    }
}
