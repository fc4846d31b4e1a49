//! TOML configuration file support.
//!
//! Settings that would otherwise be repeated on every run can live in a
//! config file; command-line flags still take precedence:
//!
//! ```toml
//! # matflat.toml
//! [conversion]
//! input_dir = "recordings"
//! output_dir = "converted"
//! variable = "data"
//! compress = true
//! flatten_fields = ["spikes", "channel"]
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration structure for matflat.toml files.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Conversion-specific settings.
    #[serde(default)]
    pub conversion: ConversionConfig,
}

/// Configuration for the convert command.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConversionConfig {
    /// Directory of input .mat files.
    pub input_dir: Option<PathBuf>,

    /// Directory for the .npz archives.
    pub output_dir: Option<PathBuf>,

    /// Top-level MAT variable holding the record.
    pub variable: Option<String>,

    /// Deflate archive entries.
    pub compress: Option<bool>,

    /// Fields flattened to one dimension regardless of stored shape.
    pub flatten_fields: Option<Vec<String>>,
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [conversion]
            input_dir = "recordings"
            output_dir = "converted"
            variable = "rec"
            compress = true
            flatten_fields = ["waveforms"]
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.conversion.input_dir, Some(PathBuf::from("recordings")));
        assert_eq!(config.conversion.output_dir, Some(PathBuf::from("converted")));
        assert_eq!(config.conversion.variable.as_deref(), Some("rec"));
        assert_eq!(config.conversion.compress, Some(true));
        assert_eq!(
            config.conversion.flatten_fields,
            Some(vec!["waveforms".to_string()])
        );
    }

    #[test]
    fn test_partial_config() {
        let toml = r#"
            [conversion]
            compress = true
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.conversion.compress, Some(true));
        assert_eq!(config.conversion.input_dir, None);
        assert_eq!(config.conversion.flatten_fields, None);
    }

    #[test]
    fn test_empty_config() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.conversion.variable, None);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let toml = r#"
            [conversion]
            compression_level = 3
        "#;
        assert!(Config::from_str(toml).is_err());
    }
}
