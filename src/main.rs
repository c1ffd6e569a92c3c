//! cliconf: merge argument defaults, YAML config files and command-line
//! overrides described by a declarative argument schema.

use anyhow::Result;

mod cli;

fn main() -> Result<()> {
    cli::run()
}
