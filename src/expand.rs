//! Dotted-path expansion
//!
//! Turns flat destination keys such as `model.hidden` into nested sections
//! (`{model: {hidden: ..}}`), and flattens nested sections back into keys.

use crate::error::{Error, Result};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

/// Flat mapping from dotted destination keys to values.
pub type FlatConfig = BTreeMap<String, Value>;

pub const SEPARATOR: char = '.';

/// Expand a flat dotted-path mapping into nested sections.
///
/// Keys sharing a prefix end up in one section. Values are stored as-is, so a
/// sequence or mapping value is a leaf and is never expanded further.
///
/// Fails with [`Error::InvalidPath`] for keys with empty segments and with
/// [`Error::PathConflict`] when one key is a strict prefix of another
/// (`model` and `model.hidden`).
pub fn expand(flat: &FlatConfig) -> Result<Mapping> {
    check_prefix_conflicts(flat)?;

    let mut root = Mapping::new();
    for (key, value) in flat {
        insert_path(&mut root, key, value.clone())?;
    }
    Ok(root)
}

/// Flatten nested sections into dotted keys.
///
/// Empty sections and non-mapping values are leaves. For input without prefix
/// conflicts this is the inverse of [`expand`].
pub fn flatten(nested: &Mapping) -> FlatConfig {
    let mut flat = FlatConfig::new();
    flatten_into(nested, "", &mut flat);
    flat
}

/// Remove entries whose value is `null`.
///
/// Destinations that have neither a default nor an explicit value come out of
/// the splitter as `null`; they are dropped before expansion unless the caller
/// asked to keep them.
pub fn drop_nulls(mut flat: FlatConfig) -> FlatConfig {
    flat.retain(|_, value| !value.is_null());
    flat
}

fn split_key(key: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = key.split(SEPARATOR).collect();
    if segments.iter().any(|segment| segment.is_empty()) {
        return Err(Error::InvalidPath { key: key.to_string() });
    }
    Ok(segments)
}

fn check_prefix_conflicts(flat: &FlatConfig) -> Result<()> {
    for key in flat.keys() {
        let prefix = format!("{key}{SEPARATOR}");
        // Keys are sorted, so anything nested under `key` follows `prefix` directly.
        if let Some((nested, _)) = flat.range(prefix.clone()..).next() {
            if nested.starts_with(&prefix) {
                tracing::debug!(section = %key, nested = %nested, "destination prefix conflict");
                return Err(Error::PathConflict { path: key.clone() });
            }
        }
    }
    Ok(())
}

fn insert_path(root: &mut Mapping, key: &str, value: Value) -> Result<()> {
    let segments = split_key(key)?;
    let Some((leaf, parents)) = segments.split_last() else {
        return Err(Error::InvalidPath { key: key.to_string() });
    };

    let mut node = root;
    for (depth, segment) in parents.iter().enumerate() {
        let entry = node
            .entry(Value::String((*segment).to_string()))
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        node = match entry {
            Value::Mapping(section) => section,
            _ => {
                return Err(Error::PathConflict { path: segments[..=depth].join(".") });
            }
        };
    }

    let leaf = Value::String((*leaf).to_string());
    if node.contains_key(&leaf) {
        return Err(Error::PathConflict { path: key.to_string() });
    }
    node.insert(leaf, value);
    Ok(())
}

fn flatten_into(node: &Mapping, prefix: &str, out: &mut FlatConfig) {
    for (key, value) in node {
        let segment = key_segment(key);
        let path = if prefix.is_empty() { segment } else { format!("{prefix}{SEPARATOR}{segment}") };
        match value {
            Value::Mapping(section) if !section.is_empty() => flatten_into(section, &path, out),
            _ => {
                out.insert(path, value.clone());
            }
        }
    }
}

/// Render a mapping key as a path segment. YAML allows non-string keys.
pub(crate) fn key_segment(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "~".to_string(),
        other => serde_yaml::to_string(other).map(|s| s.trim_end().to_string()).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Value;

    fn flat(entries: &[(&str, Value)]) -> FlatConfig {
        entries.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn yaml(text: &str) -> Mapping {
        serde_yaml::from_str(text).expect("yaml")
    }

    #[test]
    fn expands_dotted_keys_into_sections() {
        let input = flat(&[("model.hidden", Value::from(20)), ("optimizer.lr", Value::from(0.001))]);
        let nested = expand(&input).expect("expand");
        assert_eq!(nested, yaml("model: {hidden: 20}\noptimizer: {lr: 0.001}\n"));
    }

    #[test]
    fn shared_prefixes_merge_into_one_section() {
        let input = flat(&[
            ("model.encoder.layers", Value::from(4)),
            ("model.encoder.heads", Value::from(8)),
            ("model.dropout", Value::from(0.1)),
        ]);
        let nested = expand(&input).expect("expand");
        assert_eq!(nested, yaml("model:\n  dropout: 0.1\n  encoder:\n    heads: 8\n    layers: 4\n"));
    }

    #[test]
    fn undotted_keys_stay_top_level() {
        let input = flat(&[("seed", Value::from(42)), ("name", Value::from("run"))]);
        let nested = expand(&input).expect("expand");
        assert_eq!(nested, yaml("name: run\nseed: 42\n"));
    }

    #[test]
    fn composite_values_are_opaque_leaves() {
        let layers: Value = serde_yaml::from_str("[64, 32]").expect("yaml");
        let extra: Value = serde_yaml::from_str("{a.b: 1}").expect("yaml");
        let input = flat(&[("model.layers", layers.clone()), ("model.extra", extra.clone())]);
        let nested = Value::Mapping(expand(&input).expect("expand"));
        assert_eq!(nested["model"]["layers"], layers);
        // The dotted key inside a mapping value is not expanded.
        assert_eq!(nested["model"]["extra"]["a.b"], Value::from(1));
    }

    #[test]
    fn prefix_conflict_is_an_error() {
        let input = flat(&[("model", Value::from(1)), ("model.hidden", Value::from(20))]);
        let err = expand(&input).expect_err("conflict");
        assert!(matches!(err, Error::PathConflict { ref path } if path == "model"));
    }

    #[test]
    fn prefix_conflict_detected_across_unrelated_keys() {
        // `model-x` sorts between `model` and `model.hidden`.
        let input = flat(&[
            ("model", Value::from(1)),
            ("model-x", Value::from(2)),
            ("model.hidden", Value::from(20)),
        ]);
        assert!(matches!(expand(&input), Err(Error::PathConflict { .. })));
    }

    #[test]
    fn similar_names_are_not_conflicts() {
        let input = flat(&[("model", Value::from(1)), ("modelx.hidden", Value::from(2))]);
        assert!(expand(&input).is_ok());
    }

    #[test]
    fn empty_segments_are_rejected() {
        for key in ["", ".a", "a.", "a..b"] {
            let input = flat(&[(key, Value::from(1))]);
            assert!(
                matches!(expand(&input), Err(Error::InvalidPath { .. })),
                "key {key:?} should be rejected"
            );
        }
    }

    #[test]
    fn flatten_inverts_expand() {
        let input = flat(&[
            ("a.b.c", Value::from(1)),
            ("a.b.d", Value::from("x")),
            ("a.e", Value::from(true)),
            ("f", Value::Null),
            ("g.h", serde_yaml::from_str("[1, 2]").expect("yaml")),
        ]);
        let nested = expand(&input).expect("expand");
        assert_eq!(flatten(&nested), input);
    }

    #[test]
    fn flatten_keeps_empty_sections_as_leaves() {
        let nested = yaml("a: {}\nb: {c: {}}\n");
        let flat = flatten(&nested);
        assert_eq!(flat.get("a"), Some(&Value::Mapping(Mapping::new())));
        assert_eq!(flat.get("b.c"), Some(&Value::Mapping(Mapping::new())));
    }

    #[test]
    fn drop_nulls_removes_only_null_values() {
        let input = flat(&[("a", Value::Null), ("b", Value::from(0)), ("c", Value::from(""))]);
        let kept = drop_nulls(input);
        assert_eq!(kept.keys().collect::<Vec<_>>(), vec!["b", "c"]);
    }

    #[test]
    fn nulls_dropped_before_expansion_avoid_conflicts() {
        let input = flat(&[("model", Value::Null), ("model.hidden", Value::from(20))]);
        assert!(expand(&input).is_err());
        let nested = expand(&drop_nulls(input)).expect("expand");
        assert_eq!(nested, yaml("model: {hidden: 20}\n"));
    }
}
