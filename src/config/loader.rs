//! YAML config document loading

use crate::error::{kind_name, Error, Result};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Where a YAML config document is read from.
pub enum ConfigSource<'a> {
    /// A file on disk, opened and closed within the load.
    Path(PathBuf),
    /// An already-open stream; read to the end.
    Reader(Box<dyn Read + 'a>),
}

impl<'a> ConfigSource<'a> {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    pub fn reader(reader: impl Read + 'a) -> Self {
        Self::Reader(Box::new(reader))
    }

    /// In-memory YAML text.
    pub fn text(text: &'a str) -> Self {
        Self::Reader(Box::new(text.as_bytes()))
    }

    fn origin(&self) -> String {
        match self {
            Self::Path(path) => format!("'{}'", path.display()),
            Self::Reader(_) => "<reader>".to_string(),
        }
    }
}

impl std::fmt::Debug for ConfigSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Self::Reader(_) => f.write_str("Reader(..)"),
        }
    }
}

impl From<PathBuf> for ConfigSource<'_> {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for ConfigSource<'_> {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<&PathBuf> for ConfigSource<'_> {
    fn from(path: &PathBuf) -> Self {
        Self::Path(path.clone())
    }
}

/// Load a config document as a mapping.
///
/// An empty document (or one holding only comments) is an empty mapping.
/// Anything other than a mapping at the top level is rejected. YAML merge keys
/// (`<<: *defaults`) are resolved.
pub fn load_source(source: ConfigSource<'_>) -> Result<Mapping> {
    let origin = source.origin();
    let content = match source {
        ConfigSource::Path(path) => {
            fs::read_to_string(&path).map_err(|e| Error::read_file(&path, e))?
        }
        ConfigSource::Reader(mut reader) => {
            let mut content = String::new();
            reader.read_to_string(&mut content)?;
            content
        }
    };
    tracing::debug!(origin = %origin, bytes = content.len(), "loading config document");
    parse_document(&content, &origin)
}

fn parse_document(content: &str, origin: &str) -> Result<Mapping> {
    if is_blank_document(content) {
        return Ok(Mapping::new());
    }

    let mut value: Value =
        serde_yaml::from_str(content).map_err(|e| Error::parse_yaml(origin, e))?;
    value.apply_merge().map_err(|e| Error::parse_yaml(origin, e))?;

    match value {
        Value::Mapping(mapping) => Ok(mapping),
        Value::Null => Ok(Mapping::new()),
        other => Err(Error::NotAMapping { origin: origin.to_string(), found: kind_name(&other) }),
    }
}

fn is_blank_document(content: &str) -> bool {
    content.lines().map(str::trim).all(|line| line.is_empty() || line.starts_with('#') || line == "---")
}
