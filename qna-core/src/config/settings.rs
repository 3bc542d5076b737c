//! Settings configuration loaded from TOML files.
//!
//! Non-sensitive configuration lives in `~/.config/qna/config.toml`
//! (or `$QNA_CONFIG_DIR/config.toml`).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Default TOML configuration file content
const DEFAULT_CONFIG_TOML: &str = r#"# qna configuration file
# Located at: ~/.config/qna/config.toml
#
# This file contains non-sensitive configuration.
# The QnA Maker subscription key is read from the environment:
#   - QNAMAKER_API_KEY

[qnamaker]
base_url = "https://westus.api.cognitive.microsoft.com/qnamaker/v4.0"
# Seconds a fetched question list is served from memory.
# 0 keeps the list until the next mutation.
cache_ttl_seconds = 10
timeout_seconds = 30

[logging]
level = "info"
"#;

/// Settings loaded from the TOML configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    /// QnA Maker service settings
    #[serde(default)]
    pub qnamaker: QnaMakerSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// QnA Maker service settings
#[derive(Debug, Clone, Deserialize)]
pub struct QnaMakerSettings {
    /// Management API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Lifetime of the cached question list (0 disables time-based expiry)
    #[serde(default = "default_cache_ttl_seconds")]
    pub cache_ttl_seconds: u64,

    /// HTTP request timeout
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

/// Logging settings
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_base_url() -> String {
    "https://westus.api.cognitive.microsoft.com/qnamaker/v4.0".to_string()
}

fn default_cache_ttl_seconds() -> u64 {
    10
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for QnaMakerSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            cache_ttl_seconds: default_cache_ttl_seconds(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl QnaMakerSettings {
    /// Cache lifetime, `None` when time-based expiry is disabled.
    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_ttl_seconds > 0).then(|| Duration::from_secs(self.cache_ttl_seconds))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Errors that can occur when loading settings
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config directory not found")]
    ConfigDirNotFound,
}

impl Settings {
    /// Load settings from the TOML configuration file.
    ///
    /// If the config file doesn't exist, creates it with default values.
    pub fn load() -> Result<Self, SettingsError> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            tracing::info!("Creating default configuration at {:?}", config_path);
            Self::create_default_config(&config_path)?;
        }

        let content = fs::read_to_string(&config_path)?;
        Self::from_toml(&content)
    }

    /// Parse settings from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(content)?;
        Ok(settings)
    }

    /// Get the configuration file path.
    ///
    /// Uses `$QNA_CONFIG_DIR` when set, otherwise the XDG config directory.
    pub fn config_path() -> Result<PathBuf, SettingsError> {
        if let Ok(override_dir) = std::env::var("QNA_CONFIG_DIR") {
            return Ok(PathBuf::from(override_dir).join("config.toml"));
        }

        let config_dir = dirs::config_dir()
            .ok_or(SettingsError::ConfigDirNotFound)?
            .join("qna");

        Ok(config_dir.join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, DEFAULT_CONFIG_TOML)?;
        Ok(())
    }
}
