//! Template command implementation

use anyhow::{Context, Result};
use clap::Args;
use cliconf::{generate_template, TemplateSink};
use std::path::PathBuf;

use super::utils::load_schema;

#[derive(Args)]
pub struct TemplateArgs {
    /// Argument schema (YAML)
    #[arg(short, long, value_name = "FILE")]
    pub schema: PathBuf,

    /// Write the template here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

pub fn run(args: TemplateArgs) -> Result<()> {
    let command = load_schema(&args.schema)?;

    match &args.output {
        Some(path) => {
            generate_template(&command, path.as_path())
                .with_context(|| format!("Failed writing template: {}", path.display()))?;
            println!("Template written to {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            generate_template(&command, TemplateSink::writer(stdout.lock()))?;
        }
    }
    Ok(())
}
