//! Configuration management.
//!
//! Secrets come from environment variables, settings from a TOML file.
//!
//! # Configuration Sources
//!
//! ## Secrets (Environment Variables)
//! - `QNAMAKER_API_KEY` - QnA Maker management subscription key
//!
//! ## Settings (TOML File)
//! Located at `~/.config/qna/config.toml`:
//! ```toml
//! [qnamaker]
//! base_url = "https://westus.api.cognitive.microsoft.com/qnamaker/v4.0"
//! cache_ttl_seconds = 10
//! timeout_seconds = 30
//!
//! [logging]
//! level = "info"
//! ```

mod secrets;
mod settings;

pub use secrets::{QNAMAKER_API_KEY_ENV, Secrets, SecretsError};
pub use settings::{LoggingSettings, QnaMakerSettings, Settings, SettingsError};

/// Combined configuration containing both secrets and settings.
#[derive(Debug, Clone)]
pub struct Config {
    /// Secrets loaded from environment variables
    pub secrets: Secrets,
    /// Settings loaded from TOML configuration file
    pub settings: Settings,
}

/// Errors that can occur when loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Secrets error: {0}")]
    Secrets(#[from] SecretsError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if `QNAMAKER_API_KEY` is unset or the TOML file
    /// cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let secrets = Secrets::from_env()?;
        let settings = Settings::load()?;
        Ok(Self { secrets, settings })
    }

    /// Get the QnA Maker management subscription key.
    pub fn qnamaker_api_key(&self) -> &str {
        &self.secrets.qnamaker_api_key
    }

    /// Get the QnA Maker service settings.
    pub fn qnamaker(&self) -> &QnaMakerSettings {
        &self.settings.qnamaker
    }
}

/// Load .env file if it exists (for development convenience).
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}
