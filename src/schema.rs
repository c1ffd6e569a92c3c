//! Declarative argument schemas
//!
//! A YAML description of a command's arguments, turned into a `clap::Command`
//! whose argument ids are the dotted destination keys:
//!
//! ```yaml
//! name: train
//! about: Train a model
//! args:
//!   - dest: model.hidden
//!     kind: int
//!     default: 20
//!     help: Hidden layer size
//!   - dest: trainer.fp16
//!     kind: flag
//! ```

use crate::error::{Error, Result};
use crate::expand::SEPARATOR;
use clap::{value_parser, Arg, ArgAction, Command};
use figment::providers::{Format, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeSet;
use std::path::Path;

/// Ids clap assigns to its generated flags.
const RESERVED_IDS: [&str; 2] = ["help", "version"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaFile {
    pub name: String,
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub args: Vec<ArgSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArgSpec {
    /// Dotted destination key.
    pub dest: String,
    /// Long flag name; defaults to the last `dest` segment with `_` as `-`.
    #[serde(default)]
    pub long: Option<String>,
    #[serde(default)]
    pub short: Option<char>,
    #[serde(default)]
    pub help: Option<String>,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub kind: ArgKind,
    #[serde(default)]
    pub required: bool,
    /// Environment variable read when the flag is absent.
    #[serde(default)]
    pub env: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArgKind {
    #[default]
    String,
    Int,
    Float,
    /// Takes an explicit `true`/`false` value.
    Bool,
    /// Present/absent switch, `false` by default.
    Flag,
    /// Counts occurrences (`-vvv`).
    Count,
    /// Repeatable; collects every value into a sequence.
    List,
}

impl SchemaFile {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::read_file(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "schema file not found"),
            ));
        }
        Figment::new()
            .merge(Yaml::file(path))
            .extract()
            .map_err(|e| Error::schema(format!("{}: {e}", path.display())))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Figment::new().merge(Yaml::string(text)).extract().map_err(|e| Error::schema(e.to_string()))
    }

    pub fn to_command(&self) -> Result<Command> {
        let mut cmd = Command::new(self.name.clone());
        if let Some(about) = &self.about {
            cmd = cmd.about(about.clone());
        }

        let mut dests = BTreeSet::new();
        let mut longs = BTreeSet::from(["help".to_string()]);
        let mut shorts = BTreeSet::from(['h']);
        for spec in &self.args {
            if spec.dest.split(SEPARATOR).any(str::is_empty) {
                return Err(Error::schema(format!("invalid dest '{}'", spec.dest)));
            }
            if RESERVED_IDS.contains(&spec.dest.as_str()) {
                return Err(Error::schema(format!("dest '{}' is reserved", spec.dest)));
            }
            if !dests.insert(spec.dest.as_str()) {
                return Err(Error::schema(format!("duplicate dest '{}'", spec.dest)));
            }
            let long = spec.long_name();
            if long.is_empty() {
                return Err(Error::schema(format!("empty long flag (dest '{}')", spec.dest)));
            }
            if !longs.insert(long.clone()) {
                return Err(Error::schema(format!("duplicate flag '--{long}' (dest '{}')", spec.dest)));
            }
            if let Some(short) = spec.short {
                if !short.is_alphanumeric() {
                    return Err(Error::schema(format!("invalid flag '-{short}' (dest '{}')", spec.dest)));
                }
                if !shorts.insert(short) {
                    return Err(Error::schema(format!("duplicate flag '-{short}' (dest '{}')", spec.dest)));
                }
            }
            cmd = cmd.arg(spec.to_arg()?);
        }
        Ok(cmd)
    }
}

impl ArgSpec {
    pub fn long_name(&self) -> String {
        match &self.long {
            Some(long) => long.trim_start_matches('-').to_string(),
            None => self.dest.rsplit(SEPARATOR).next().unwrap_or(&self.dest).replace('_', "-"),
        }
    }

    fn to_arg(&self) -> Result<Arg> {
        let mut arg = Arg::new(self.dest.clone()).long(self.long_name()).required(self.required);
        if let Some(short) = self.short {
            arg = arg.short(short);
        }
        if let Some(help) = &self.help {
            arg = arg.help(help.clone());
        }
        if let Some(env) = &self.env {
            arg = arg.env(env.clone());
        }

        arg = match self.kind {
            ArgKind::String => arg.value_parser(value_parser!(String)),
            ArgKind::Int => arg.value_parser(value_parser!(i64)),
            ArgKind::Float => arg.value_parser(value_parser!(f64)),
            ArgKind::Bool => arg.value_parser(value_parser!(bool)),
            ArgKind::Flag => arg.action(ArgAction::SetTrue),
            ArgKind::Count => arg.action(ArgAction::Count),
            ArgKind::List => arg.action(ArgAction::Append).value_parser(value_parser!(String)),
        };

        match self.default_texts()? {
            Some(texts) if self.kind == ArgKind::List => Ok(arg.default_values(texts)),
            Some(mut texts) => match texts.pop() {
                Some(text) => Ok(arg.default_value(text)),
                None => Ok(arg),
            },
            None => Ok(arg),
        }
    }

    /// Default value(s) as command-line text, checked against the kind so
    /// clap never sees a default its value parser would reject.
    fn default_texts(&self) -> Result<Option<Vec<String>>> {
        let invalid = || {
            Error::schema(format!(
                "default for '{}' does not fit kind '{}'",
                self.dest,
                self.kind.as_str()
            ))
        };

        let default = match &self.default {
            None | Some(Value::Null) => return Ok(None),
            Some(default) => default,
        };

        let texts = match (self.kind, default) {
            (ArgKind::String, Value::String(s)) => vec![s.clone()],
            (ArgKind::String, Value::Number(n)) => vec![n.to_string()],
            (ArgKind::String, Value::Bool(b)) => vec![b.to_string()],
            (ArgKind::Int, Value::Number(n)) if n.is_i64() => vec![n.to_string()],
            (ArgKind::Float, Value::Number(n)) => vec![n.to_string()],
            (ArgKind::Bool, Value::Bool(b)) => vec![b.to_string()],
            (ArgKind::Flag, Value::Bool(false)) => return Ok(None),
            (ArgKind::Count, Value::Number(n)) if n.as_u64().is_some_and(|c| c <= u64::from(u8::MAX)) => {
                vec![n.to_string()]
            }
            (ArgKind::List, Value::Sequence(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    Value::Number(n) => Ok(n.to_string()),
                    Value::Bool(b) => Ok(b.to_string()),
                    _ => Err(invalid()),
                })
                .collect::<Result<Vec<_>>>()?,
            (ArgKind::List, Value::String(s)) => vec![s.clone()],
            _ => return Err(invalid()),
        };
        Ok(Some(texts))
    }
}

impl ArgKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ArgKind::String => "string",
            ArgKind::Int => "int",
            ArgKind::Float => "float",
            ArgKind::Bool => "bool",
            ArgKind::Flag => "flag",
            ArgKind::Count => "count",
            ArgKind::List => "list",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split::split_from;

    const TRAIN: &str = r#"
name: train
about: Train a model
args:
  - dest: model.hidden
    kind: int
    default: 20
    help: Hidden layer size
  - dest: optimizer.learning_rate
    kind: float
    default: 0.001
  - dest: run.name
    short: n
    default: baseline
  - dest: trainer.fp16
    kind: flag
  - dest: verbosity
    short: v
    kind: count
  - dest: data.files
    long: file
    kind: list
    default: [train.txt, extra.txt]
"#;

    #[test]
    fn builds_command_with_dotted_ids() {
        let cmd = SchemaFile::from_yaml_str(TRAIN).expect("schema").to_command().expect("command");
        let split = split_from(
            &cmd,
            ["train", "--hidden", "64", "--learning-rate", "0.1", "-n", "exp", "--fp16", "-vv"],
        )
        .expect("split");

        assert_eq!(split.explicit["model.hidden"], Value::from(64));
        assert_eq!(split.explicit["optimizer.learning_rate"], Value::from(0.1));
        assert_eq!(split.explicit["run.name"], Value::from("exp"));
        assert_eq!(split.explicit["trainer.fp16"], Value::Bool(true));
        assert_eq!(split.explicit["verbosity"], Value::from(2u8));
        assert_eq!(
            split.defaulted["data.files"],
            Value::Sequence(vec![Value::from("train.txt"), Value::from("extra.txt")])
        );
    }

    #[test]
    fn loads_from_file() {
        let tmp = tempfile::TempDir::new().expect("tmp");
        let path = tmp.path().join("schema.yaml");
        std::fs::write(&path, TRAIN).expect("write");

        let schema = SchemaFile::load(&path).expect("load");
        assert_eq!(schema.name, "train");
        assert_eq!(schema.args.len(), 6);
        assert_eq!(schema.args[0].kind, ArgKind::Int);
        assert_eq!(schema.args[0].default, Some(Value::from(20)));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let tmp = tempfile::TempDir::new().expect("tmp");
        let err = SchemaFile::load(&tmp.path().join("nope.yaml")).expect_err("missing");
        assert!(matches!(err, Error::ReadFile { .. }));
    }

    #[test]
    fn long_name_defaults_to_last_segment() {
        let spec: ArgSpec = serde_yaml::from_str("dest: optimizer.weight_decay").expect("spec");
        assert_eq!(spec.long_name(), "weight-decay");

        let spec: ArgSpec = serde_yaml::from_str("dest: seed\nlong: --random-seed").expect("spec");
        assert_eq!(spec.long_name(), "random-seed");
    }

    #[test]
    fn duplicate_flags_are_rejected() {
        let text = "name: t\nargs:\n  - dest: encoder.hidden\n  - dest: decoder.hidden\n";
        let err = SchemaFile::from_yaml_str(text).expect("schema").to_command().expect_err("dup");
        assert!(err.to_string().contains("--hidden"));
    }

    #[test]
    fn duplicate_dests_are_rejected() {
        let text = "name: t\nargs:\n  - dest: a.b\n  - dest: a.b\n    long: other\n";
        let err = SchemaFile::from_yaml_str(text).expect("schema").to_command().expect_err("dup");
        assert!(err.to_string().contains("duplicate dest"));
    }

    #[test]
    fn defaults_must_fit_the_kind() {
        for text in [
            "name: t\nargs:\n  - dest: a\n    kind: int\n    default: many\n",
            "name: t\nargs:\n  - dest: a\n    kind: flag\n    default: true\n",
            "name: t\nargs:\n  - dest: a\n    kind: count\n    default: 1000\n",
            "name: t\nargs:\n  - dest: a\n    default: [1, 2]\n",
        ] {
            let schema = SchemaFile::from_yaml_str(text).expect("schema");
            assert!(matches!(schema.to_command(), Err(Error::Schema(_))), "{text}");
        }
    }

    #[test]
    fn bad_flags_are_schema_errors() {
        for text in [
            "name: t\nargs:\n  - dest: a\n    short: '-'\n",
            "name: t\nargs:\n  - dest: a\n    short: '?'\n",
            "name: t\nargs:\n  - dest: a\n    short: h\n",
            "name: t\nargs:\n  - dest: a\n    long: '--'\n",
            "name: t\nargs:\n  - dest: help\n    long: show-help\n",
            "name: t\nargs:\n  - dest: version\n    long: show-version\n",
        ] {
            let schema = SchemaFile::from_yaml_str(text).expect("schema");
            assert!(matches!(schema.to_command(), Err(Error::Schema(_))), "{text}");
        }
    }

    #[test]
    fn int_default_out_of_range_is_rejected() {
        let text = "name: t\nargs:\n  - dest: a\n    kind: int\n    default: 18446744073709551615\n";
        let schema = SchemaFile::from_yaml_str(text).expect("schema");
        assert!(matches!(schema.to_command(), Err(Error::Schema(_))));

        let text = "name: t\nargs:\n  - dest: a\n    kind: int\n    default: -5\n";
        let cmd = SchemaFile::from_yaml_str(text).expect("schema").to_command().expect("command");
        let split = split_from(&cmd, ["t"]).expect("split");
        assert_eq!(split.defaulted["a"], Value::from(-5));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let text = "name: t\nargs:\n  - dest: a\n    defualt: 1\n";
        assert!(matches!(SchemaFile::from_yaml_str(text), Err(Error::Schema(_))));
    }

    #[test]
    fn invalid_dest_is_rejected() {
        let text = "name: t\nargs:\n  - dest: a..b\n    long: ab\n";
        let err = SchemaFile::from_yaml_str(text).expect("schema").to_command().expect_err("dest");
        assert!(err.to_string().contains("invalid dest"));
    }
}
