//! Merge command implementation

use anyhow::{Context, Result};
use clap::Args;
use cliconf::ConfigMerger;
use std::ffi::OsString;
use std::path::PathBuf;

use super::utils::{load_schema, OutputFormat};

#[derive(Args)]
pub struct MergeArgs {
    /// Argument schema (YAML)
    #[arg(short, long, value_name = "FILE")]
    pub schema: PathBuf,

    /// YAML config file layered between defaults and arguments
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,

    /// Keep destinations without a value as null
    #[arg(long)]
    pub include_none: bool,

    /// Arguments for the schema, given after `--`
    #[arg(last = true, value_name = "ARGS")]
    pub args: Vec<OsString>,
}

pub fn run(args: MergeArgs) -> Result<()> {
    let command = load_schema(&args.schema)?;
    let argv = std::iter::once(OsString::from(command.get_name())).chain(args.args);

    let mut merger = ConfigMerger::new(&command).args(argv).include_none(args.include_none);
    if let Some(path) = &args.config {
        merger = merger.source(path);
    }

    let config = match merger.merge() {
        // Schema arguments are reported exactly like clap reports its own.
        Err(cliconf::Error::Cli(err)) => err.exit(),
        result => result.context("Failed merging configuration")?,
    };

    match args.format {
        OutputFormat::Yaml => print!("{}", config.to_yaml_string()?),
        OutputFormat::Json => println!("{}", config.to_json_string()?),
    }
    Ok(())
}
