//! Classifier Port - Interface to the external LLM classifier.
//!
//! The orchestrator only ever sees this trait; one adapter exists per backend
//! (OpenAI-compatible, Anthropic, mock). Adapters make exactly one HTTP call
//! per `classify`: retrying is the orchestrator's job.
//!
//! # Example
//!
//! ```ignore
//! let response = classifier
//!     .classify(ClassificationRequest::new(system, user).with_max_tokens(50))
//!     .await?;
//! println!("{}", response.text);
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for external classification calls.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Sends one prompt pair and returns the raw answer text.
    async fn classify(
        &self,
        request: ClassificationRequest,
    ) -> Result<ClassifierResponse, ClassifierError>;

    /// Get provider information (name, model).
    fn provider_info(&self) -> ProviderInfo;
}

/// One classification call.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl ClassificationRequest {
    /// Creates a request with the short-answer defaults (50 tokens, temperature 0.1).
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            max_tokens: 50,
            temperature: 0.1,
        }
    }

    /// Sets the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = max;
        self
    }

    /// Sets the temperature.
    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = temp;
        self
    }
}

/// Raw answer from the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierResponse {
    pub text: String,
    /// Present only when the backend reported usage.
    pub usage: Option<TokenUsage>,
    pub model: String,
}

/// Token usage information.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Provider information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "openai", "groq", "anthropic").
    pub name: String,
    /// Model identifier.
    pub model: String,
}

impl ProviderInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// Classifier call errors.
///
/// Transient variants and `MalformedResponse` are retried by the
/// orchestrator; the permanent ones are surfaced immediately.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifierError {
    /// Rate limited by provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until retry is allowed.
        retry_after_secs: u32,
    },

    /// Provider is unavailable (5xx).
    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u32 },

    /// Response arrived but could not be read.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Request rejected by the provider (4xx other than auth and rate limit).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Client could not be set up.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ClassifierError {
    /// Creates a rate limited error.
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a malformed response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClassifierError::RateLimited { .. }
                | ClassifierError::Unavailable { .. }
                | ClassifierError::Network(_)
                | ClassifierError::Timeout { .. }
                | ClassifierError::MalformedResponse(_)
        )
    }

    /// Returns true for auth/configuration problems that retrying cannot fix.
    pub fn is_permanent(&self) -> bool {
        !self.is_retryable()
    }
}
