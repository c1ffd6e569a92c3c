//! Shared CLI utilities.

use anyhow::{Context, Result};
use clap::{Command, ValueEnum};
use cliconf::SchemaFile;
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}

/// Load a schema file and build its command.
pub fn load_schema(path: &Path) -> Result<Command> {
    let schema = SchemaFile::load(path)
        .with_context(|| format!("Failed loading schema: {}", path.display()))?;
    tracing::debug!(name = %schema.name, args = schema.args.len(), "loaded schema");
    schema.to_command().with_context(|| format!("Invalid schema: {}", path.display()))
}
