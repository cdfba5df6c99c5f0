//! Configuration management.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::services::privacy::DEFAULT_TRACKING_PARAMS;

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub privacy: PrivacyConfig,
}

/// Where options are persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the option database (default: <data dir>/copy-as-markdown/options.db)
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    Config::data_dir()
        .join("options.db")
        .to_string_lossy()
        .to_string()
}

/// URL cleaning applied when `privacy-remove-tracking` is on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivacyConfig {
    /// Query parameter names to strip; a trailing `*` matches a prefix
    #[serde(default = "default_tracking_params")]
    pub tracking_params: Vec<String>,
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self {
            tracking_params: default_tracking_params(),
        }
    }
}

fn default_tracking_params() -> Vec<String> {
    DEFAULT_TRACKING_PARAMS.iter().map(|s| s.to_string()).collect()
}

impl Config {
    /// Load configuration from default location.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();

        if config_path.exists() {
            Self::from_file(&config_path.to_string_lossy())
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file.
    pub fn from_file(path: &str) -> Result<Self> {
        let expanded = expand_path(path);
        let content = std::fs::read_to_string(&expanded)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Get the default config path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("copy-as-markdown")
            .join("config.toml")
    }

    /// Get the data directory for option storage.
    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("copy-as-markdown")
    }

    /// Resolved path of the option database.
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(expand_path(&self.storage.db_path))
    }
}

/// Expand ~ to home directory.
fn expand_path(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert!(config.storage.db_path.ends_with("options.db"));
        assert!(config.privacy.tracking_params.contains(&"utm_*".to_string()));
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml(
            r#"
            [privacy]
            tracking_params = ["ref", "src_*"]
            "#,
        )
        .unwrap();
        assert_eq!(config.privacy.tracking_params, vec!["ref", "src_*"]);
        assert_eq!(config.storage.db_path, default_db_path());
    }

    #[test]
    fn test_expand_path() {
        assert_eq!(expand_path("/tmp/options.db"), "/tmp/options.db");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                expand_path("~/opts.db"),
                home.join("opts.db").to_string_lossy().to_string()
            );
        }
    }
}
