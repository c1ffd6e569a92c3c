//! Command-line interface for cliconf
//!
//! Provides `merge`, `template` and `completions` subcommands.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod completions;
mod merge;
mod template;
mod utils;

/// Merge argument defaults, YAML config files and command-line overrides
#[derive(Parser)]
#[command(name = "cliconf")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge defaults, a config file and arguments given after `--`
    Merge(merge::MergeArgs),

    /// Write a YAML template holding every default of a schema
    Template(template::TemplateArgs),

    /// Print shell completions for cliconf
    Completions(completions::CompletionsArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Diagnostics go to stderr so merged output on stdout stays machine-readable.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match cli.command {
        Commands::Merge(args) => merge::run(args),
        Commands::Template(args) => template::run(args),
        Commands::Completions(args) => completions::run(args),
    }
}
