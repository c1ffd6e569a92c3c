//! Configuration loading and merging
//!
//! Handles loading YAML documents and layering them between argument defaults
//! and command-line values (CLI > File > Defaults).

pub mod loader;
pub mod merge;
pub mod tree;

pub use loader::{load_source, ConfigSource};
pub use merge::{merge, merge_from, merge_mappings, ConfigMerger};
pub use tree::Config;
