//! OpenAI Provider - Classifier over the OpenAI chat completions API.
//!
//! Any OpenAI-compatible endpoint works by changing the base URL; Groq is
//! provided as a preset.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAIConfig::new(api_key).with_model("gpt-4o");
//! let provider = OpenAIProvider::new(config)?;
//!
//! let groq = OpenAIProvider::new(OpenAIConfig::groq(groq_key))?;
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{
    ClassificationRequest, Classifier, ClassifierError, ClassifierResponse, ProviderInfo,
    TokenUsage,
};

/// Groq's OpenAI-compatible endpoint.
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Configuration for the OpenAI provider.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Name reported in provenance ("openai", "groq", ...).
    pub provider_name: String,
    /// Model to use (e.g., "gpt-4o", "llama3-8b-8192").
    pub model: String,
    /// Base URL for the API (default: https://api.openai.com/v1).
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl OpenAIConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            provider_name: "openai".to_string(),
            model: "gpt-4o".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Preset for Groq-hosted models.
    pub fn groq(api_key: impl Into<String>) -> Self {
        Self::new(api_key)
            .with_provider_name("groq")
            .with_model("llama3-8b-8192")
            .with_base_url(GROQ_BASE_URL)
    }

    pub fn with_provider_name(mut self, name: impl Into<String>) -> Self {
        self.provider_name = name.into();
        self
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

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI-compatible classifier. One HTTP call per `classify`.
pub struct OpenAIProvider {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIProvider {
    /// Creates a new provider.
    ///
    /// # Errors
    /// `ClassifierError::Configuration` if the HTTP client cannot be built.
    pub fn new(config: OpenAIConfig) -> Result<Self, ClassifierError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClassifierError::Configuration(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Builds the chat completions endpoint URL.
    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    /// Converts our request to OpenAI's format.
    fn to_openai_request(&self, request: &ClassificationRequest) -> OpenAIRequest {
        OpenAIRequest {
            model: self.config.model.clone(),
            messages: vec![
                OpenAIMessage {
                    role: "system".to_string(),
                    content: Some(request.system_prompt.clone()),
                },
                OpenAIMessage {
                    role: "user".to_string(),
                    content: Some(request.user_prompt.clone()),
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }

    async fn send_request(&self, request: &ClassificationRequest) -> Result<Response, ClassifierError> {
        self.client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("Content-Type", "application/json")
            .json(&self.to_openai_request(request))
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

    /// Maps a non-success status to an error.
    fn status_error(status: u16, retry_after_header: Option<u32>, body: &str) -> ClassifierError {
        match status {
            401 | 403 => ClassifierError::AuthenticationFailed,
            429 => ClassifierError::rate_limited(
                retry_after_header.unwrap_or_else(|| parse_retry_after(body, 30)),
            ),
            500..=599 => ClassifierError::unavailable(format!("Server error {}: {}", status, body)),
            408 | 409 | 425 => {
                ClassifierError::unavailable(format!("Transient status {}: {}", status, body))
            }
            400..=499 => ClassifierError::InvalidRequest(format!("{}: {}", status, body)),
            _ => ClassifierError::network(format!("Unexpected status {}: {}", status, body)),
        }
    }

    /// Reads a success body into a response.
    fn parse_body(body: &str) -> Result<ClassifierResponse, ClassifierError> {
        let parsed: OpenAIResponse = serde_json::from_str(body)
            .map_err(|e| ClassifierError::malformed(format!("Failed to parse response: {}", e)))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ClassifierError::malformed("No content in response"))?;

        Ok(ClassifierResponse {
            text,
            usage: parsed
                .usage
                .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens)),
            model: parsed.model,
        })
    }
}

#[async_trait]
impl Classifier for OpenAIProvider {
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
        ProviderInfo::new(&self.config.provider_name, &self.config.model)
    }
}

/// Seconds from a `retry-after` header, if present and numeric.
pub(super) fn retry_after_header(response: &Response) -> Option<u32> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Finds "try again in N" in a JSON error message, else `default_secs`.
pub(super) fn parse_retry_after(error_body: &str, default_secs: u32) -> u32 {
    let message = serde_json::from_str::<serde_json::Value>(error_body)
        .ok()
        .and_then(|v| v.get("error")?.get("message")?.as_str().map(str::to_string));

    message
        .as_deref()
        .and_then(|s| s.split("try again in ").nth(1))
        .and_then(|rest| {
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse().ok()
        })
        .unwrap_or(default_secs)
}

// ----- OpenAI API Types -----

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    model: String,
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
