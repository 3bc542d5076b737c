//! Shared configuration for the QnA Maker adapter workspace.

pub mod config;

pub use config::{
    Config, ConfigError, LoggingSettings, QnaMakerSettings, Secrets, SecretsError, Settings,
    SettingsError, load_dotenv,
};
