//! Configuration for the wiremap CLI
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (wiremap.toml)
//! - Environment variables (WIREMAP_*)
//!
//! ## Example config file (wiremap.toml):
//! ```toml
//! [collection]
//! path = "./components.json"
//!
//! [validation]
//! strict = false
//!
//! [output]
//! format = "pretty"
//! ```

use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::Result;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WiremapConfig {
    /// Collection document settings
    #[serde(default)]
    pub collection: CollectionConfig,

    /// Validation settings
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Collection document configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Path to the persisted collection document
    #[serde(default = "default_collection_path")]
    pub path: PathBuf,
}

/// Validation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Treat integrity warnings as blocking, like errors
    #[serde(default)]
    pub strict: bool,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

/// Output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_collection_path() -> PathBuf {
    PathBuf::from("components.json")
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            path: default_collection_path(),
        }
    }
}

impl WiremapConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        for location in ["wiremap.toml", ".wiremap.toml"] {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(config_dir) = directories::ProjectDirs::from("dev", "wiremap", "wiremap") {
            let xdg_config = config_dir.config_dir().join("wiremap.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("WIREMAP")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WiremapConfig::default();
        assert_eq!(config.collection.path, PathBuf::from("components.json"));
        assert!(!config.validation.strict);
        assert_eq!(config.output.format, OutputFormat::Pretty);
    }

    #[test]
    fn test_serialize_config() {
        let config = WiremapConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[collection]"));
        assert!(toml_str.contains("[validation]"));
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wiremap.toml");
        std::fs::write(&path, "[validation]\nstrict = true\n").unwrap();

        let config = WiremapConfig::load_from(path.to_str()).unwrap();
        assert!(config.validation.strict);
    }
}
