//! Classification run configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Retry, pacing and request settings for a classification run
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Attempts per classification call before falling back
    pub max_attempts: u32,

    /// Backoff unit; the delay after attempt `n` is `unit * 2^n`
    pub backoff_unit_ms: u64,

    /// Pause after every classified message
    pub rate_limit_delay_ms: u64,

    pub max_tokens: u32,

    pub temperature: f32,

    /// What the analyzer does when a classifier error cannot be retried
    pub on_permanent_error: PermanentErrorPolicy,
}

/// Handling of permanent classifier errors inside a batch
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PermanentErrorPolicy {
    /// Write the error sentinel for the message and keep going
    #[default]
    Record,
    /// Stop the batch and return the error
    Abort,
}

impl ClassificationConfig {
    pub fn backoff_unit(&self) -> Duration {
        Duration::from_millis(self.backoff_unit_ms)
    }

    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_millis(self.rate_limit_delay_ms)
    }

    /// Validate classification settings
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=10).contains(&self.max_attempts) {
            return Err(ValidationError::OutOfRange {
                field: "max_attempts",
                min: 1.0,
                max: 10.0,
                actual: f64::from(self.max_attempts),
            });
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::OutOfRange {
                field: "temperature",
                min: 0.0,
                max: 2.0,
                actual: f64::from(self.temperature),
            });
        }

        if self.max_tokens == 0 {
            return Err(ValidationError::MissingRequired("max_tokens"));
        }

        Ok(())
    }
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_unit_ms: 1000,
            rate_limit_delay_ms: 100,
            max_tokens: 50,
            temperature: 0.1,
            on_permanent_error: PermanentErrorPolicy::default(),
        }
    }
}
