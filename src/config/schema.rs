//! Configuration schema for flowforge
//!
//! Configuration is stored at `~/.config/flowforge/config.toml`

use crate::bundle::validate::Strictness;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// General settings
    pub general: GeneralConfig,

    /// Validation behavior
    pub validation: ValidationConfig,

    /// Pipeline catalog settings
    pub catalog: CatalogConfig,

    /// Session defaults
    pub session: SessionConfig,

    /// Export defaults
    pub export: ExportConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,

    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: "text".to_string(),
        }
    }
}

/// Validation behavior
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// How cross-artifact consistency issues are treated.
    /// "strict" blocks export, "lenient" reports them as warnings.
    pub strictness: Strictness,
}

/// Pipeline catalog settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Path to a catalog JSON file (process and reference types).
    /// Falls back to the built-in catalog when unset.
    pub path: Option<PathBuf>,

    /// Path to a column-term dictionary JSON file.
    /// Falls back to the built-in dictionary when unset.
    pub terms: Option<PathBuf>,
}

/// Session defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum undo history depth kept per session
    pub history_depth: usize,

    /// Sessions untouched for longer than this are removed by cleanup.
    /// 0 disables age-based cleanup.
    pub max_age_hours: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_depth: 50,
            max_age_hours: 0,
        }
    }
}

/// Export defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// File name used for the bundled archive
    pub archive_name: String,

    /// Default output directory (current directory when unset)
    pub out_dir: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            archive_name: "pipeline-configuration.zip".to_string(),
            out_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips() {
        let config = AppConfig::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.session.history_depth, 50);
        assert_eq!(parsed.export.archive_name, "pipeline-configuration.zip");
    }

    #[test]
    fn partial_config_uses_defaults() {
        let config: AppConfig = toml::from_str("[validation]\nstrictness = \"lenient\"").unwrap();
        assert_eq!(config.validation.strictness, Strictness::Lenient);
        assert_eq!(config.general.log_format, "text");
    }
}
