//! Mock Classifier for testing and offline runs.
//!
//! Responses and errors are queued and consumed in order. Once the queue is
//! empty the mock answers with a fixed default, which no label set accepts,
//! so an offline run exercises the fallback path end to end.
//!
//! # Example
//!
//! ```ignore
//! let classifier = MockClassifier::new()
//!     .with_response("Pozitif")
//!     .with_error(ClassifierError::network("reset"));
//!
//! let response = classifier.classify(request).await?;
//! assert_eq!(response.text, "Pozitif");
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    ClassificationRequest, Classifier, ClassifierError, ClassifierResponse, ProviderInfo,
    TokenUsage,
};

/// Answer given once the queue is empty.
pub const MOCK_DEFAULT_RESPONSE: &str = "Mock response";

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Success {
        text: String,
        usage: Option<TokenUsage>,
    },
    Error(ClassifierError),
}

/// Queue-driven classifier double with call tracking.
#[derive(Debug, Clone)]
pub struct MockClassifier {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    info: ProviderInfo,
    delay: Duration,
    calls: Arc<Mutex<Vec<ClassificationRequest>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClassifier {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            info: ProviderInfo::new("mock", "mock-model-1"),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a successful answer with a small usage figure.
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.with_response_usage(text, Some(TokenUsage::new(10, 2)))
    }

    /// Queues a successful answer with explicit usage.
    pub fn with_response_usage(self, text: impl Into<String>, usage: Option<TokenUsage>) -> Self {
        lock(&self.responses).push_back(MockResponse::Success {
            text: text.into(),
            usage,
        });
        self
    }

    /// Queues an error.
    pub fn with_error(self, error: ClassifierError) -> Self {
        lock(&self.responses).push_back(MockResponse::Error(error));
        self
    }

    /// Queues the same error `times` times.
    pub fn with_errors(self, error: ClassifierError, times: usize) -> Self {
        (0..times).fold(self, |mock, _| mock.with_error(error.clone()))
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the number of calls made to this classifier.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<ClassificationRequest> {
        lock(&self.calls).clone()
    }

    /// Number of queued responses not yet consumed.
    pub fn remaining(&self) -> usize {
        lock(&self.responses).len()
    }

    fn next_response(&self) -> MockResponse {
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| MockResponse::Success {
                text: MOCK_DEFAULT_RESPONSE.to_string(),
                usage: None,
            })
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    async fn classify(
        &self,
        request: ClassificationRequest,
    ) -> Result<ClassifierResponse, ClassifierError> {
        lock(&self.calls).push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response() {
            MockResponse::Success { text, usage } => Ok(ClassifierResponse {
                text,
                usage,
                model: self.info.model.clone(),
            }),
            MockResponse::Error(err) => Err(err),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}
