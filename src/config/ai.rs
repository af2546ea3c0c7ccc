//! Classifier provider configuration

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::error::ValidationError;

/// Classifier provider configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Which backend answers classification calls
    pub provider: AiProvider,

    /// OpenAI API key
    pub openai_api_key: Option<String>,

    /// Anthropic API key
    pub anthropic_api_key: Option<String>,

    /// Groq API key
    pub groq_api_key: Option<String>,

    /// Model override; each provider has its own default
    pub model: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// Classifier backend
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    #[default]
    OpenAI,
    Anthropic,
    Groq,
    Mock,
}

impl AiProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiProvider::OpenAI => "openai",
            AiProvider::Anthropic => "anthropic",
            AiProvider::Groq => "groq",
            AiProvider::Mock => "mock",
        }
    }

    /// Model used when no override is configured.
    pub fn default_model(&self) -> &'static str {
        match self {
            AiProvider::OpenAI => "gpt-4o",
            AiProvider::Anthropic => "claude-3-haiku-20240307",
            AiProvider::Groq => "llama3-8b-8192",
            AiProvider::Mock => "mock-model-1",
        }
    }
}

impl fmt::Display for AiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiProvider {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(AiProvider::OpenAI),
            "anthropic" => Ok(AiProvider::Anthropic),
            "groq" => Ok(AiProvider::Groq),
            "mock" => Ok(AiProvider::Mock),
            other => Err(ValidationError::UnknownProvider(other.to_string())),
        }
    }
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Key for the selected provider, if one is set and non-empty
    pub fn api_key(&self) -> Option<&str> {
        let key = match self.provider {
            AiProvider::OpenAI => self.openai_api_key.as_deref(),
            AiProvider::Anthropic => self.anthropic_api_key.as_deref(),
            AiProvider::Groq => self.groq_api_key.as_deref(),
            AiProvider::Mock => return None,
        };
        key.filter(|k| !k.trim().is_empty())
    }

    /// Configured model, or the provider default
    pub fn model(&self) -> &str {
        self.model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| self.provider.default_model())
    }

    /// Validate AI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }

        if self.provider != AiProvider::Mock && self.api_key().is_none() {
            let var = match self.provider {
                AiProvider::OpenAI => "CHAT_EVAL__AI__OPENAI_API_KEY",
                AiProvider::Anthropic => "CHAT_EVAL__AI__ANTHROPIC_API_KEY",
                _ => "CHAT_EVAL__AI__GROQ_API_KEY",
            };
            return Err(ValidationError::MissingRequired(var));
        }

        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: AiProvider::default(),
            openai_api_key: None,
            anthropic_api_key: None,
            groq_api_key: None,
            model: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_select_openai() {
        let config = AiConfig::default();
        assert_eq!(config.provider, AiProvider::OpenAI);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.model(), "gpt-4o");
    }

    #[test]
    fn model_override_wins_over_default() {
        let config = AiConfig {
            provider: AiProvider::Groq,
            model: Some("mixtral-8x7b-32768".to_string()),
            ..Default::default()
        };
        assert_eq!(config.model(), "mixtral-8x7b-32768");

        let blank = AiConfig {
            provider: AiProvider::Groq,
            model: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(blank.model(), "llama3-8b-8192");
    }

    #[test]
    fn selected_provider_needs_its_own_key() {
        let config = AiConfig {
            provider: AiProvider::Anthropic,
            openai_api_key: Some("sk-xxx".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired("CHAT_EVAL__AI__ANTHROPIC_API_KEY"))
        ));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let config = AiConfig {
            groq_api_key: Some("   ".to_string()),
            provider: AiProvider::Groq,
            ..Default::default()
        };
        assert!(config.api_key().is_none());
        assert!(config.validate().is_err());
    }

    #[test]
    fn mock_needs_no_key() {
        let config = AiConfig {
            provider: AiProvider::Mock,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let config = AiConfig {
            provider: AiProvider::Mock,
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidTimeout)));
    }

    #[test]
    fn provider_parses_case_insensitively() {
        assert_eq!("GROQ".parse::<AiProvider>().unwrap(), AiProvider::Groq);
        assert_eq!(" mock ".parse::<AiProvider>().unwrap(), AiProvider::Mock);
        assert!("gemini".parse::<AiProvider>().is_err());
    }
}
