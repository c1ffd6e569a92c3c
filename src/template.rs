//! YAML template generation from argument defaults

use crate::error::{Error, Result};
use crate::expand::expand;
use crate::split::schema_defaults;
use clap::Command;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Where a template is written.
pub enum TemplateSink<'a> {
    /// Created or truncated; missing parent directories are created.
    Path(PathBuf),
    Writer(Box<dyn Write + 'a>),
}

impl<'a> TemplateSink<'a> {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    pub fn writer(writer: impl Write + 'a) -> Self {
        Self::Writer(Box::new(writer))
    }
}

impl From<PathBuf> for TemplateSink<'_> {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for TemplateSink<'_> {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

/// Render every declared default as a nested YAML document.
///
/// Destinations without a default are listed as `null`, so the template shows
/// every key the schema accepts.
pub fn render_template(schema: &Command) -> Result<String> {
    let defaults = schema_defaults(schema)?;
    let nested = expand(&defaults)?;
    serde_yaml::to_string(&nested).map_err(Error::SerializeYaml)
}

/// Write the template for `schema` to `sink`. The output loads back through
/// [`crate::ConfigSource`] into the same tree.
pub fn generate_template<'a>(schema: &Command, sink: impl Into<TemplateSink<'a>>) -> Result<()> {
    let rendered = render_template(schema)?;

    match sink.into() {
        TemplateSink::Path(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| Error::write_file(parent, e))?;
            }
            fs::write(&path, rendered).map_err(|e| Error::write_file(&path, e))?;
            tracing::debug!(path = %path.display(), "wrote config template");
        }
        TemplateSink::Writer(mut writer) => {
            writer.write_all(rendered.as_bytes())?;
            writer.flush()?;
        }
    }
    Ok(())
}
