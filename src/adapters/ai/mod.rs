//! Classifier Adapters.
//!
//! Implementations of the `Classifier` port.
//!
//! ## Available Adapters
//!
//! - `MockClassifier` - Queue-driven double for tests and offline runs
//! - `OpenAIProvider` - OpenAI chat completions, also serving Groq
//! - `AnthropicProvider` - Anthropic messages API

mod anthropic_provider;
mod mock_provider;
mod openai_provider;

pub use anthropic_provider::{AnthropicConfig, AnthropicProvider};
pub use mock_provider::{MockClassifier, MockResponse, MOCK_DEFAULT_RESPONSE};
pub use openai_provider::{OpenAIConfig, OpenAIProvider, GROQ_BASE_URL};

use std::sync::Arc;

use crate::config::{AiConfig, AiProvider};
use crate::ports::{Classifier, ClassifierError};

/// Builds the classifier selected by configuration.
///
/// # Errors
///
/// `ClassifierError::Configuration` when the selected provider has no key
/// or its HTTP client cannot be built.
pub fn build_classifier(config: &AiConfig) -> Result<Arc<dyn Classifier>, ClassifierError> {
    if config.provider == AiProvider::Mock {
        return Ok(Arc::new(MockClassifier::new()));
    }

    let key = config.api_key().ok_or_else(|| {
        ClassifierError::Configuration(format!("no API key configured for {}", config.provider))
    })?;

    let classifier: Arc<dyn Classifier> = match config.provider {
        AiProvider::Anthropic => Arc::new(AnthropicProvider::new(
            AnthropicConfig::new(key)
                .with_model(config.model())
                .with_timeout(config.timeout()),
        )?),
        AiProvider::Groq => Arc::new(OpenAIProvider::new(
            OpenAIConfig::groq(key)
                .with_model(config.model())
                .with_timeout(config.timeout()),
        )?),
        _ => Arc::new(OpenAIProvider::new(
            OpenAIConfig::new(key)
                .with_model(config.model())
                .with_timeout(config.timeout()),
        )?),
    };

    Ok(classifier)
}
