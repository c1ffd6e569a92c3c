//! Splitting parsed arguments into explicit and defaulted values
//!
//! The argument schema is a `clap::Command` whose argument ids are dotted
//! destination keys (`Arg::new("model.hidden").long("hidden")`). After parsing,
//! clap reports where every value came from, which is all that is needed to
//! tell values typed by the user apart from declared defaults.

use crate::error::Result;
use crate::expand::FlatConfig;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use serde_yaml::Value;
use std::ffi::OsString;
use std::path::PathBuf;

/// Parsed arguments partitioned by origin. Key sets are disjoint and together
/// cover every destination declared by the schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitArgs {
    /// Values supplied on the command line (or through an arg's `env` fallback).
    pub explicit: FlatConfig,
    /// Values that fell back to the declared default, `null` when there is none.
    pub defaulted: FlatConfig,
}

/// Split the process arguments (`std::env::args_os()`).
pub fn split(schema: &Command) -> Result<SplitArgs> {
    split_from(schema, std::env::args_os())
}

/// Split an explicit argument vector. As with clap, the first item is the
/// binary name.
///
/// Parse failures (unknown flags, bad values, `--help`) come back as
/// [`crate::Error::Cli`] carrying clap's own error.
pub fn split_from<I, T>(schema: &Command, argv: I) -> Result<SplitArgs>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut cmd = schema.clone();
    let matches = cmd.try_get_matches_from_mut(argv)?;
    let split = partition(&cmd, &matches);
    tracing::debug!(
        explicit = split.explicit.len(),
        defaulted = split.defaulted.len(),
        "split command-line arguments"
    );
    Ok(split)
}

/// Declared defaults of every destination, without parsing any user input.
///
/// Required arguments and `env` fallbacks are ignored, so this never fails on
/// missing input and matches what [`split_from`] reports as `defaulted` for an
/// empty command line.
pub fn schema_defaults(schema: &Command) -> Result<FlatConfig> {
    let mut cmd = schema
        .clone()
        .mut_args(|arg| arg.required(false).env(None::<&'static str>))
        .arg_required_else_help(false)
        .subcommand_required(false)
        .ignore_errors(true);
    let name = cmd.get_name().to_string();
    let matches = cmd.try_get_matches_from_mut([name])?;
    Ok(partition(&cmd, &matches).defaulted)
}

/// Arguments that carry configuration values; help and version flags do not.
pub fn destinations(cmd: &Command) -> impl Iterator<Item = &Arg> {
    cmd.get_arguments().filter(|arg| {
        !matches!(
            arg.get_action(),
            ArgAction::Help | ArgAction::HelpShort | ArgAction::HelpLong | ArgAction::Version
        )
    })
}

fn partition(cmd: &Command, matches: &ArgMatches) -> SplitArgs {
    let mut split = SplitArgs::default();
    for arg in destinations(cmd) {
        let id = arg.get_id().as_str();
        let value = arg_value(arg, matches);
        match matches.value_source(id) {
            Some(ValueSource::CommandLine) | Some(ValueSource::EnvVariable) => {
                tracing::trace!(dest = id, "explicit value");
                split.explicit.insert(id.to_string(), value);
            }
            _ => {
                split.defaulted.insert(id.to_string(), value);
            }
        }
    }
    split
}

fn arg_value(arg: &Arg, matches: &ArgMatches) -> Value {
    let id = arg.get_id().as_str();
    let mut values = typed_values(matches, id).unwrap_or_else(|| raw_values(matches, id));

    if takes_many(arg) {
        if values.is_empty() {
            Value::Null
        } else {
            Value::Sequence(values)
        }
    } else {
        values.pop().unwrap_or(Value::Null)
    }
}

fn takes_many(arg: &Arg) -> bool {
    matches!(arg.get_action(), ArgAction::Append)
        || arg.get_num_args().is_some_and(|range| range.max_values() > 1)
}

/// Values stored by the arg's value parser, for the common value types.
/// `None` when the stored type is none of them (custom parsers, `ValueEnum`s).
fn typed_values(matches: &ArgMatches, id: &str) -> Option<Vec<Value>> {
    macro_rules! try_types {
        ($($ty:ty => $convert:expr),* $(,)?) => {
            $(
                match matches.try_get_many::<$ty>(id) {
                    Ok(Some(values)) => return Some(values.map($convert).collect()),
                    Ok(None) => return Some(Vec::new()),
                    Err(_) => {}
                }
            )*
        };
    }

    try_types! {
        String => |v: &String| Value::String(v.clone()),
        bool => |v: &bool| Value::Bool(*v),
        i64 => |v: &i64| Value::from(*v),
        u64 => |v: &u64| Value::from(*v),
        i32 => |v: &i32| Value::from(*v),
        u32 => |v: &u32| Value::from(*v),
        i16 => |v: &i16| Value::from(*v),
        u16 => |v: &u16| Value::from(*v),
        i8 => |v: &i8| Value::from(*v),
        u8 => |v: &u8| Value::from(*v),
        usize => |v: &usize| Value::from(*v),
        isize => |v: &isize| Value::from(*v),
        f64 => |v: &f64| Value::from(*v),
        f32 => |v: &f32| Value::from(v.to_string().parse::<f64>().unwrap_or(f64::from(*v))),
        PathBuf => |v: &PathBuf| Value::String(v.display().to_string()),
        OsString => |v: &OsString| Value::String(v.to_string_lossy().into_owned()),
    }
    None
}

/// Fallback for values of unknown type: the raw command-line text, read as a
/// YAML scalar.
fn raw_values(matches: &ArgMatches, id: &str) -> Vec<Value> {
    matches
        .get_raw(id)
        .map(|raw| raw.map(|text| scalar_from_text(&text.to_string_lossy())).collect())
        .unwrap_or_default()
}

/// Interpret text as a bool or number when YAML would, otherwise keep it as a
/// string. Text that YAML reads as null or as a collection stays a string.
pub fn scalar_from_text(text: &str) -> Value {
    match serde_yaml::from_str::<Value>(text) {
        Ok(value @ (Value::Bool(_) | Value::Number(_))) => value,
        _ => Value::String(text.to_string()),
    }
}
