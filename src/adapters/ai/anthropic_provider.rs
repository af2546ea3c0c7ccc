//! Anthropic Provider - Classifier over Anthropic's Messages API.
//!
//! # Configuration
//!
//! ```ignore
//! let config = AnthropicConfig::new(api_key).with_model("claude-3-haiku-20240307");
//! let provider = AnthropicProvider::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::openai_provider::{parse_retry_after, retry_after_header};
use crate::ports::{
    ClassificationRequest, Classifier, ClassifierError, ClassifierResponse, ProviderInfo,
    TokenUsage,
};

/// Anthropic API version header value.
const ANTHROPIC_API_VERSION: &str = "2023-06-01";

/// Configuration for the Anthropic provider.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use.
    pub model: String,
    /// Base URL for the API (default: https://api.anthropic.com).
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl AnthropicConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "claude-3-haiku-20240307".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Anthropic classifier. One HTTP call per `classify`.
pub struct AnthropicProvider {
    config: AnthropicConfig,
    client: Client,
}

impl AnthropicProvider {
    /// Creates a new provider.
    ///
    /// # Errors
    /// `ClassifierError::Configuration` if the HTTP client cannot be built.
    pub fn new(config: AnthropicConfig) -> Result<Self, ClassifierError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClassifierError::Configuration(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.config.base_url.trim_end_matches('/'))
    }

    /// The system prompt goes in its own field; Anthropic has no system role.
    fn to_anthropic_request(&self, request: &ClassificationRequest) -> AnthropicRequest {
        AnthropicRequest {
            model: self.config.model.clone(),
            system: request.system_prompt.clone(),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: request.user_prompt.clone(),
            }],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }

    async fn send_request(&self, request: &ClassificationRequest) -> Result<Response, ClassifierError> {
        self.client
            .post(self.messages_url())
            .header("x-api-key", self.config.api_key())
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .header("Content-Type", "application/json")
            .json(&self.to_anthropic_request(request))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClassifierError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    ClassifierError::network(format!("Connection failed: {}", e))
                } else {
                    ClassifierError::network(e.to_string())
                }
            })
    }

    fn status_error(status: u16, retry_after_header: Option<u32>, body: &str) -> ClassifierError {
        match status {
            401 | 403 => ClassifierError::AuthenticationFailed,
            // Anthropic tends to have longer rate limit windows.
            429 => ClassifierError::rate_limited(
                retry_after_header.unwrap_or_else(|| parse_retry_after(body, 60)),
            ),
            // 529: overloaded.
            500..=599 => ClassifierError::unavailable(format!("Server error {}: {}", status, body)),
            408 | 409 | 425 => {
                ClassifierError::unavailable(format!("Transient status {}: {}", status, body))
            }
            400..=499 => ClassifierError::InvalidRequest(format!("{}: {}", status, body)),
            _ => ClassifierError::network(format!("Unexpected status {}: {}", status, body)),
        }
    }

    /// Joins the text blocks of a success body.
    fn parse_body(body: &str) -> Result<ClassifierResponse, ClassifierError> {
        let parsed: AnthropicResponse = serde_json::from_str(body)
            .map_err(|e| ClassifierError::malformed(format!("Failed to parse response: {}", e)))?;

        let text = parsed
            .content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");
        if text.is_empty() {
            return Err(ClassifierError::malformed("No text content in response"));
        }

        Ok(ClassifierResponse {
            text,
            usage: parsed
                .usage
                .map(|u| TokenUsage::new(u.input_tokens, u.output_tokens)),
            model: parsed.model,
        })
    }
}

#[async_trait]
impl Classifier for AnthropicProvider {
    async fn classify(
        &self,
        request: ClassificationRequest,
    ) -> Result<ClassifierResponse, ClassifierError> {
        let response = self.send_request(&request).await?;
        let status = response.status();
        let retry_after = retry_after_header(&response);
        let body = response
            .text()
            .await
            .map_err(|e| ClassifierError::network(format!("Failed to read body: {}", e)))?;

        if !status.is_success() {
            return Err(Self::status_error(status.as_u16(), retry_after, &body));
        }
        Self::parse_body(&body)
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("anthropic", &self.config.model)
    }
}

// ----- Anthropic API Types -----

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    system: String,
    messages: Vec<AnthropicMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    model: String,
    content: Vec<ContentBlock>,
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder_works() {
        let config = AnthropicConfig::new("test-key")
            .with_model("claude-3-5-sonnet-20240620")
            .with_base_url("https://proxy.local/")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(config.model, "claude-3-5-sonnet-20240620");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.api_key(), "test-key");

        let provider = AnthropicProvider::new(config).unwrap();
        assert_eq!(provider.messages_url(), "https://proxy.local/v1/messages");
    }

    #[test]
    fn system_prompt_is_a_top_level_field() {
        let provider = AnthropicProvider::new(AnthropicConfig::new("k")).unwrap();
        let json = serde_json::to_value(
            provider.to_anthropic_request(&ClassificationRequest::new("sys", "usr")),
        )
        .unwrap();

        assert_eq!(json["system"], "sys");
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["max_tokens"], 50);
    }

    #[test]
    fn text_blocks_are_joined() {
        let body = r#"{"model":"claude-3-haiku-20240307",
            "content":[{"type":"text","text":"Fiyat "},{"type":"text","text":"Sorgusu"}],
            "usage":{"input_tokens":120,"output_tokens":4}}"#;
        let response = AnthropicProvider::parse_body(body).unwrap();

        assert_eq!(response.text, "Fiyat Sorgusu");
        assert_eq!(response.usage.unwrap().total_tokens, 124);
    }

    #[test]
    fn response_without_text_is_malformed() {
        let body = r#"{"model":"m","content":[]}"#;
        assert!(matches!(
            AnthropicProvider::parse_body(body),
            Err(ClassifierError::MalformedResponse(_))
        ));
    }

    #[test]
    fn overload_is_retryable_and_auth_is_not() {
        assert!(AnthropicProvider::status_error(529, None, "overloaded").is_retryable());
        assert!(AnthropicProvider::status_error(401, None, "").is_permanent());
        assert_eq!(
            AnthropicProvider::status_error(429, None, "{}"),
            ClassifierError::rate_limited(60)
        );
    }

    #[test]
    fn request_timeout_and_conflict_are_retried() {
        for status in [408, 409, 425] {
            assert!(AnthropicProvider::status_error(status, None, "").is_retryable());
        }
        assert!(AnthropicProvider::status_error(404, None, "").is_permanent());
    }
}
