//! cliconf: merge command-line defaults, YAML config files and command-line
//! overrides into one configuration tree.
//!
//! The argument schema is a plain `clap::Command` whose argument ids are dotted
//! destination keys:
//!
//! ```
//! use clap::{value_parser, Arg, Command};
//! use cliconf::{merge_from, ConfigSource};
//!
//! let schema = Command::new("train").arg(
//!     Arg::new("model.hidden")
//!         .long("hidden")
//!         .value_parser(value_parser!(i64))
//!         .default_value("20"),
//! );
//!
//! let file = ConfigSource::text("model:\n  hidden: 100\nrandom_value: hello\n");
//! let config = merge_from(&schema, Some(file), ["train", "--hidden", "200"])?;
//! assert_eq!(config.get("model.hidden"), Some(&200.into()));
//! assert_eq!(config["random_value"], "hello");
//! # Ok::<(), cliconf::Error>(())
//! ```
//!
//! Precedence, lowest to highest: argument defaults, the config file, values
//! given on the command line.

pub mod config;
pub mod error;
pub mod expand;
pub mod schema;
pub mod split;
pub mod template;

pub use config::{merge, merge_from, merge_mappings, Config, ConfigMerger, ConfigSource};
pub use error::{Error, Result};
pub use expand::{expand, flatten, FlatConfig};
pub use schema::{ArgKind, ArgSpec, SchemaFile};
pub use split::{schema_defaults, split, split_from, SplitArgs};
pub use template::{generate_template, render_template, TemplateSink};
