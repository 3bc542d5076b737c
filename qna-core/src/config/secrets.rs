//! Secrets configuration loaded from environment variables only.
//!
//! The QnA Maker subscription key must never be stored in the settings file,
//! so it is read exclusively from the environment.

use std::env;

/// Env var holding the QnA Maker management subscription key.
pub const QNAMAKER_API_KEY_ENV: &str = "QNAMAKER_API_KEY";

/// Secrets loaded exclusively from environment variables.
#[derive(Clone, Default)]
pub struct Secrets {
    /// QnA Maker management API subscription key (env: QNAMAKER_API_KEY)
    pub qnamaker_api_key: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("qnamaker_api_key", &"[redacted]")
            .finish()
    }
}

/// Errors that can occur when loading secrets
#[derive(Debug, thiserror::Error)]
pub enum SecretsError {
    #[error("Missing required secret: {0}")]
    MissingSecret(&'static str),
}

impl Secrets {
    /// Load secrets from environment variables.
    ///
    /// This also loads a `.env` file if present (development convenience),
    /// but production should rely on actual environment variables.
    pub fn from_env() -> Result<Self, SecretsError> {
        let _ = dotenvy::dotenv();

        Self::from_env_inner()
    }

    /// Load from the environment without touching `.env`.
    pub(crate) fn from_env_inner() -> Result<Self, SecretsError> {
        let qnamaker_api_key = env::var(QNAMAKER_API_KEY_ENV)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(SecretsError::MissingSecret(QNAMAKER_API_KEY_ENV))?;

        Ok(Self { qnamaker_api_key })
    }
}
