//! Patch loading and validation

mod legacy;
mod schema;

pub use schema::*;

use crate::error::{Error, ParameterError, Result};
use std::path::Path;

/// Patch file syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchFormat {
    Yaml,
    /// Line-oriented `Key: value` text
    Text,
}

impl PatchFormat {
    /// `.yaml`/`.yml` files are YAML, anything else is the text format
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                PatchFormat::Yaml
            }
            _ => PatchFormat::Text,
        }
    }
}

/// Parse and validate patch text
pub fn parse_config(contents: &str, format: PatchFormat) -> Result<PatchConfig, ParameterError> {
    let config = match format {
        PatchFormat::Yaml => serde_yaml::from_str::<PatchConfig>(contents)?,
        PatchFormat::Text => legacy::parse(contents)?,
    };
    config.validate()?;
    Ok(config)
}

/// Load a patch from disk
pub fn load_config(path: &Path) -> Result<PatchConfig> {
    let contents = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&contents, PatchFormat::from_path(path))?;
    log::debug!(
        "loaded patch {:?} with {} oscillators",
        path,
        config.oscillators.len()
    );
    Ok(config)
}
