//! Error types for configuration merging.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A destination key with an empty segment (`""`, `".a"`, `"a..b"`).
    #[error("invalid destination key '{key}': empty path segment")]
    InvalidPath { key: String },

    /// One destination is a strict prefix of another and both carry values.
    #[error("conflicting destination keys: '{path}' is both a value and a section")]
    PathConflict { path: String },

    /// A section on one side of a merge is a plain value on the other.
    #[error("cannot merge '{path}': a section and a plain value share the same path")]
    MergeConflict { path: String },

    /// The configuration document is not a mapping at the top level.
    #[error("config document {origin} must be a mapping, found {found}")]
    NotAMapping { origin: String, found: &'static str },

    #[error("failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in {origin}: {source}")]
    ParseYaml {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to serialize config: {0}")]
    SerializeYaml(#[source] serde_yaml::Error),

    #[error("failed to serialize config as JSON: {0}")]
    SerializeJson(#[from] serde_json::Error),

    /// The merged tree does not fit the requested type.
    #[error("config does not match the requested type: {0}")]
    Extract(#[source] serde_yaml::Error),

    /// A declarative schema that cannot be turned into a command.
    #[error("invalid schema: {0}")]
    Schema(String),

    /// Raised by clap while parsing the argument vector. Kept untouched so
    /// callers can hand it back to clap (`clap::Error::exit`).
    #[error(transparent)]
    Cli(#[from] clap::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile { path: path.into(), source }
    }

    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::WriteFile { path: path.into(), source }
    }

    pub fn parse_yaml(origin: impl Into<String>, source: serde_yaml::Error) -> Self {
        Self::ParseYaml { origin: origin.into(), source }
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }
}

/// Short name of a YAML value's kind, for error messages.
pub(crate) fn kind_name(value: &serde_yaml::Value) -> &'static str {
    use serde_yaml::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
