//! The merged configuration tree

use crate::error::{Error, Result};
use crate::expand::{flatten, FlatConfig, SEPARATOR};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::ops::Index;

static NULL: Value = Value::Null;

/// Result of a merge: nested sections of YAML values.
///
/// Look values up by section (`config["model"]["hidden"]`), by dotted path
/// (`config.get("model.hidden")`), or deserialize the whole tree into a typed
/// struct with [`Config::extract`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config {
    root: Mapping,
}

impl Config {
    pub fn new(root: Mapping) -> Self {
        Self { root }
    }

    /// Value at a dotted path, `None` when any segment is missing.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split(SEPARATOR);
        let first = segments.next()?;
        segments.try_fold(self.root.get(first)?, |node, segment| node.get(segment))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.root
    }

    pub fn into_mapping(self) -> Mapping {
        self.root
    }

    pub fn into_value(self) -> Value {
        Value::Mapping(self.root)
    }

    /// Dotted-key view of the tree.
    pub fn flatten(&self) -> FlatConfig {
        flatten(&self.root)
    }

    /// Deserialize the tree into `T`.
    pub fn extract<T: DeserializeOwned>(&self) -> Result<T> {
        serde_yaml::from_value(Value::Mapping(self.root.clone())).map_err(Error::Extract)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(&self.root).map_err(Error::SerializeYaml)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }
}

impl From<Mapping> for Config {
    fn from(root: Mapping) -> Self {
        Self::new(root)
    }
}

impl Index<&str> for Config {
    type Output = Value;

    /// Top-level section or value; `null` when missing.
    fn index(&self, key: &str) -> &Value {
        self.root.get(key).unwrap_or(&NULL)
    }
}
