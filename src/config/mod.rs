//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `CHAT_EVAL` prefix and
//! nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use chat_eval::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Classifying with {}", config.ai.provider);
//! ```

mod ai;
mod classification;
mod error;

pub use ai::{AiConfig, AiProvider};
pub use classification::{ClassificationConfig, PermanentErrorPolicy};
pub use error::{ConfigError, ValidationError};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Classifier backend selection and credentials
    #[serde(default)]
    pub ai: AiConfig,

    /// Retry, pacing and request parameters
    #[serde(default)]
    pub classification: ClassificationConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present
    /// 2. Reads environment variables with `CHAT_EVAL` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `CHAT_EVAL__AI__PROVIDER=groq` -> `ai.provider = groq`
    /// - `CHAT_EVAL__CLASSIFICATION__MAX_ATTEMPTS=5` -> `classification.max_attempts = 5`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CHAT_EVAL")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        self.classification.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 5] = [
        "CHAT_EVAL__AI__PROVIDER",
        "CHAT_EVAL__AI__GROQ_API_KEY",
        "CHAT_EVAL__AI__TIMEOUT_SECS",
        "CHAT_EVAL__CLASSIFICATION__MAX_ATTEMPTS",
        "CHAT_EVAL__CLASSIFICATION__ON_PERMANENT_ERROR",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_defaults_without_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert_eq!(config.ai.provider, AiProvider::OpenAI);
        assert_eq!(config.classification.max_attempts, 3);
    }

    #[test]
    fn test_load_nested_values() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("CHAT_EVAL__AI__PROVIDER", "groq");
        env::set_var("CHAT_EVAL__AI__GROQ_API_KEY", "gsk_xxx");
        env::set_var("CHAT_EVAL__AI__TIMEOUT_SECS", "12");
        env::set_var("CHAT_EVAL__CLASSIFICATION__MAX_ATTEMPTS", "5");
        env::set_var("CHAT_EVAL__CLASSIFICATION__ON_PERMANENT_ERROR", "abort");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.ai.provider, AiProvider::Groq);
        assert_eq!(config.ai.api_key(), Some("gsk_xxx"));
        assert_eq!(config.ai.timeout_secs, 12);
        assert_eq!(config.classification.max_attempts, 5);
        assert_eq!(
            config.classification.on_permanent_error,
            PermanentErrorPolicy::Abort
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_reports_missing_key() {
        let config = AppConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired(_))
        ));
    }
}
