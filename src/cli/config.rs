//! TOML configuration file support.
//!
//! Export settings that are tedious to pass as flags, mapping functions in
//! particular, can live in a config file:
//!
//! ```toml
//! # biosys.toml
//! [export]
//! dataset_name = "Fauna survey"
//! bionet = false
//! cast = true
//!
//! [export.mapping]
//! Latitude = { round = 6 }
//! Longitude = { round = 6 }
//! "External Key" = "record_id"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use biosys_schema::export::MappingFuncs;

/// Root configuration structure for biosys.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Export-specific settings.
    #[serde(default)]
    pub export: ExportConfig,
}

/// Configuration for the export command.
#[derive(Debug, Default, Deserialize)]
pub struct ExportConfig {
    /// Dataset name used as the worksheet title.
    pub dataset_name: Option<String>,

    /// Produce the bionet flavour of the export.
    pub bionet: Option<bool>,

    /// Cast CSV cells instead of writing raw values.
    pub cast: Option<bool>,

    /// Per-field mapping functions, see `MappingFuncs::from_spec`.
    pub mapping: Option<toml::Table>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Load the config file if one was given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

impl ExportConfig {
    /// Build the mapping functions declared under `[export.mapping]`.
    pub fn mapping_funcs(&self) -> Result<MappingFuncs> {
        let Some(table) = &self.mapping else {
            return Ok(MappingFuncs::new());
        };
        let spec = serde_json::to_value(table).context("Failed to read [export.mapping]")?;
        MappingFuncs::from_spec(&spec).context("Invalid [export.mapping]")
    }
}
