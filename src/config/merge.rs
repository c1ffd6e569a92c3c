//! Layered config merging
//!
//! Precedence, lowest to highest: argument defaults < config file < arguments
//! given on the command line.

use super::loader::{load_source, ConfigSource};
use super::tree::Config;
use crate::error::{Error, Result};
use crate::expand::{drop_nulls, expand, key_segment, FlatConfig, SEPARATOR};
use crate::split::{split_from, SplitArgs};
use clap::Command;
use serde_yaml::{Mapping, Value};
use std::ffi::OsString;

/// Builder for a single merge of defaults, an optional config document and
/// command-line overrides.
///
/// ```no_run
/// use clap::{Arg, Command};
/// use cliconf::{ConfigMerger, ConfigSource};
///
/// let schema = Command::new("train").arg(Arg::new("model.hidden").long("hidden").default_value("20"));
/// let config = ConfigMerger::new(&schema)
///     .source(ConfigSource::path("train.yaml"))
///     .merge()?;
/// println!("{}", config.to_yaml_string()?);
/// # Ok::<(), cliconf::Error>(())
/// ```
pub struct ConfigMerger<'a> {
    schema: &'a Command,
    source: Option<ConfigSource<'a>>,
    args: Option<Vec<OsString>>,
    include_none: bool,
}

impl<'a> ConfigMerger<'a> {
    pub fn new(schema: &'a Command) -> Self {
        Self { schema, source: None, args: None, include_none: false }
    }

    /// YAML document layered between defaults and command-line values.
    pub fn source(mut self, source: impl Into<ConfigSource<'a>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Same as [`ConfigMerger::source`], taking an `Option`.
    pub fn maybe_source(mut self, source: Option<ConfigSource<'a>>) -> Self {
        self.source = source;
        self
    }

    /// Argument vector to parse (first item is the binary name). Defaults to
    /// the process arguments.
    pub fn args<I, T>(mut self, argv: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        self.args = Some(argv.into_iter().map(Into::into).collect());
        self
    }

    /// Keep destinations that have no value as `null` instead of dropping them.
    pub fn include_none(mut self, include_none: bool) -> Self {
        self.include_none = include_none;
        self
    }

    pub fn merge(self) -> Result<Config> {
        let Self { schema, source, args, include_none } = self;
        let SplitArgs { explicit, defaulted } = match args {
            Some(argv) => split_from(schema, argv)?,
            None => split_from(schema, std::env::args_os())?,
        };
        let prune = |flat: FlatConfig| if include_none { flat } else { drop_nulls(flat) };

        let mut merged = expand(&prune(defaulted))?;

        if let Some(source) = source {
            let file = load_source(source)?;
            tracing::debug!(keys = file.len(), "merging config document over defaults");
            merge_mappings(&mut merged, file)?;
        }

        let overrides = expand(&prune(explicit))?;
        if !overrides.is_empty() {
            tracing::debug!(keys = overrides.len(), "merging command-line overrides");
            merge_mappings(&mut merged, overrides)?;
        }

        Ok(Config::new(merged))
    }
}

/// Merge using the process arguments.
pub fn merge(schema: &Command, source: Option<ConfigSource<'_>>) -> Result<Config> {
    ConfigMerger::new(schema).maybe_source(source).merge()
}

/// Merge using an explicit argument vector (first item is the binary name).
pub fn merge_from<'a, I, T>(
    schema: &'a Command,
    source: Option<ConfigSource<'a>>,
    argv: I,
) -> Result<Config>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    ConfigMerger::new(schema).maybe_source(source).args(argv).merge()
}

/// Deep-merge `overlay` onto `base`, section by section.
///
/// Values from `overlay` replace values in `base`; keys present on one side
/// only are kept. Sequences are replaced whole. A section on one side meeting
/// a plain value on the other is [`Error::MergeConflict`], except that a `null`
/// in `base` may be replaced by anything.
pub fn merge_mappings(base: &mut Mapping, overlay: Mapping) -> Result<()> {
    merge_at(base, overlay, "")
}

fn merge_at(base: &mut Mapping, overlay: Mapping, prefix: &str) -> Result<()> {
    for (key, incoming) in overlay {
        let segment = key_segment(&key);
        let path =
            if prefix.is_empty() { segment } else { format!("{prefix}{SEPARATOR}{segment}") };

        match base.get_mut(&key) {
            None => {
                base.insert(key, incoming);
            }
            Some(existing) => merge_value(existing, incoming, &path)?,
        }
    }
    Ok(())
}

fn merge_value(existing: &mut Value, incoming: Value, path: &str) -> Result<()> {
    match (existing, incoming) {
        (Value::Mapping(current), Value::Mapping(section)) => merge_at(current, section, path),
        (Value::Mapping(_), _) => Err(Error::MergeConflict { path: path.to_string() }),
        (slot, Value::Mapping(_)) if !slot.is_null() => {
            Err(Error::MergeConflict { path: path.to_string() })
        }
        (slot, incoming) => {
            tracing::trace!(path, "value overridden");
            *slot = incoming;
            Ok(())
        }
    }
}
