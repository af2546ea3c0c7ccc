//! ClassificationOrchestrator - one label for one kind of one message.
//!
//! Calls the classifier with bounded retries and exponential backoff, then
//! validates the answer against the label set. An exhausted budget or an
//! answer outside the set degrades to the local keyword rules, so the only
//! error that escapes is a permanent classifier failure.
//!
//! # Accounting
//!
//! Every attempt counts as an API call, whether or not it succeeds. Tokens
//! are counted only for responses that report usage.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::ClassificationConfig;
use crate::domain::classification::{prompts, FallbackClassifier};
use crate::domain::conversation::ConversationWindow;
use crate::domain::labels::{normalize_response, ClassificationKind, Label};
use crate::ports::{ClassificationRequest, Classifier, ClassifierError, ProviderInfo};

/// A label and whether the keyword rules produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelOutcome {
    pub label: Label,
    pub used_fallback: bool,
}

/// Retrying front of the classifier port.
pub struct ClassificationOrchestrator {
    classifier: Arc<dyn Classifier>,
    settings: ClassificationConfig,
    api_calls: AtomicU64,
    total_tokens: AtomicU64,
}

impl ClassificationOrchestrator {
    pub fn new(classifier: Arc<dyn Classifier>, settings: ClassificationConfig) -> Self {
        Self {
            classifier,
            settings,
            api_calls: AtomicU64::new(0),
            total_tokens: AtomicU64::new(0),
        }
    }

    /// Attempted classifier calls so far.
    pub fn api_calls(&self) -> u64 {
        self.api_calls.load(Ordering::Relaxed)
    }

    /// Tokens reported by successful calls so far.
    pub fn total_tokens(&self) -> u64 {
        self.total_tokens.load(Ordering::Relaxed)
    }

    pub fn provider_info(&self) -> ProviderInfo {
        self.classifier.provider_info()
    }

    pub fn settings(&self) -> &ClassificationConfig {
        &self.settings
    }

    /// Delay before the attempt following attempt `attempt` (0-based).
    fn backoff(&self, attempt: u32) -> Duration {
        self.settings
            .backoff_unit()
            .saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Classifies the window's target message for one kind.
    ///
    /// Always yields a label from the kind's set unless the classifier fails
    /// permanently.
    ///
    /// # Errors
    ///
    /// The first permanent `ClassifierError` (authentication, configuration,
    /// rejected request). These are never retried.
    pub async fn classify(
        &self,
        kind: ClassificationKind,
        window: &ConversationWindow<'_>,
    ) -> Result<LabelOutcome, ClassifierError> {
        let request = ClassificationRequest::new(
            prompts::system_prompt(),
            prompts::user_prompt(kind, window),
        )
        .with_max_tokens(self.settings.max_tokens)
        .with_temperature(self.settings.temperature);

        let max_attempts = self.settings.max_attempts.max(1);

        for attempt in 0..max_attempts {
            self.api_calls.fetch_add(1, Ordering::Relaxed);

            match self.classifier.classify(request.clone()).await {
                Ok(response) => {
                    if let Some(usage) = response.usage {
                        self.total_tokens
                            .fetch_add(u64::from(usage.total_tokens), Ordering::Relaxed);
                    }

                    return match normalize_response(kind, &response.text) {
                        Ok(label) => {
                            tracing::debug!(kind = %kind, label = %label, "classified");
                            Ok(LabelOutcome {
                                label,
                                used_fallback: false,
                            })
                        }
                        Err(reason) => {
                            tracing::warn!(
                                kind = %kind,
                                response = %response.text.trim(),
                                error = %reason,
                                "answer outside label set, using keyword rules"
                            );
                            Ok(self.fallback(kind, window))
                        }
                    };
                }
                Err(err) if err.is_permanent() => {
                    tracing::error!(kind = %kind, error = %err, "classifier failed permanently");
                    return Err(err);
                }
                Err(err) => {
                    tracing::warn!(
                        kind = %kind,
                        attempt = attempt + 1,
                        max_attempts,
                        error = %err,
                        "classifier call failed"
                    );
                    if attempt + 1 < max_attempts {
                        sleep(self.backoff(attempt)).await;
                    }
                }
            }
        }

        tracing::warn!(kind = %kind, max_attempts, "retries exhausted, using keyword rules");
        Ok(self.fallback(kind, window))
    }

    fn fallback(&self, kind: ClassificationKind, window: &ConversationWindow<'_>) -> LabelOutcome {
        LabelOutcome {
            label: FallbackClassifier::classify(kind, window),
            used_fallback: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockClassifier;
    use crate::domain::conversation::{build_window, Message, Role};
    use crate::domain::labels::{Answered, Sentiment, Topic};
    use crate::ports::TokenUsage;

    fn transcript() -> Vec<Message> {
        vec![
            Message::new(1u64, Role::Customer, "Fiyat ne kadar?"),
            Message::new(2u64, Role::Support, "150 TL"),
        ]
    }

    fn orchestrator(mock: &MockClassifier) -> ClassificationOrchestrator {
        ClassificationOrchestrator::new(Arc::new(mock.clone()), ClassificationConfig::default())
    }

    #[tokio::test]
    async fn valid_answer_needs_one_call() {
        let mock = MockClassifier::new()
            .with_response_usage("Nötr", Some(TokenUsage::new(40, 2)));
        let orch = orchestrator(&mock);
        let messages = transcript();
        let window = build_window(&messages, 0).unwrap();

        let outcome = orch.classify(ClassificationKind::Sentiment, &window).await.unwrap();

        assert_eq!(outcome.label, Label::Sentiment(Sentiment::Neutral));
        assert!(!outcome.used_fallback);
        assert_eq!(orch.api_calls(), 1);
        assert_eq!(orch.total_tokens(), 42);
    }

    #[tokio::test]
    async fn request_carries_configured_parameters() {
        let mock = MockClassifier::new().with_response("Evet");
        let settings = ClassificationConfig {
            max_tokens: 20,
            temperature: 0.0,
            ..Default::default()
        };
        let orch = ClassificationOrchestrator::new(Arc::new(mock.clone()), settings);
        let messages = transcript();
        let window = build_window(&messages, 0).unwrap();

        orch.classify(ClassificationKind::Answered, &window).await.unwrap();

        let call = &mock.get_calls()[0];
        assert_eq!(call.max_tokens, 20);
        assert_eq!(call.temperature, 0.0);
        assert!(call.user_prompt.contains("Destek: 150 TL"));
    }

    #[tokio::test]
    async fn three_transient_failures_degrade_to_fallback() {
        tokio::time::pause();
        let mock = MockClassifier::new().with_errors(ClassifierError::unavailable("503"), 3);
        let orch = orchestrator(&mock);
        let messages = transcript();
        let window = build_window(&messages, 0).unwrap();

        let outcome = orch.classify(ClassificationKind::Answered, &window).await.unwrap();

        assert_eq!(outcome.label, Label::Answered(Answered::Yes));
        assert!(outcome.used_fallback);
        assert_eq!(orch.api_calls(), 3);
        assert_eq!(orch.total_tokens(), 0);
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn backoff_doubles_between_attempts() {
        tokio::time::pause();
        let mock = MockClassifier::new().with_errors(ClassifierError::network("reset"), 3);
        let orch = orchestrator(&mock);
        let messages = transcript();
        let window = build_window(&messages, 0).unwrap();

        let started = tokio::time::Instant::now();
        orch.classify(ClassificationKind::Topic, &window).await.unwrap();

        // 1s after the first failure, 2s after the second, none after the last.
        assert_eq!(started.elapsed(), Duration::from_secs(3));
    }

    #[tokio::test]
    async fn recovery_after_a_transient_failure() {
        tokio::time::pause();
        let mock = MockClassifier::new()
            .with_error(ClassifierError::rate_limited(1))
            .with_response("Fiyat Sorgusu");
        let orch = orchestrator(&mock);
        let messages = transcript();
        let window = build_window(&messages, 0).unwrap();

        let outcome = orch.classify(ClassificationKind::Topic, &window).await.unwrap();

        assert_eq!(outcome.label, Label::Topic(Topic::PriceInquiry));
        assert!(!outcome.used_fallback);
        assert_eq!(orch.api_calls(), 2);
    }

    #[tokio::test]
    async fn out_of_set_answer_falls_back_without_retry() {
        let mock = MockClassifier::new().with_response("Belki");
        let orch = orchestrator(&mock);
        let messages = transcript();
        let window = build_window(&messages, 0).unwrap();

        let outcome = orch.classify(ClassificationKind::Sentiment, &window).await.unwrap();

        assert!(outcome.used_fallback);
        assert_eq!(outcome.label, Label::Sentiment(Sentiment::Neutral));
        assert_eq!(orch.api_calls(), 1);
    }

    #[tokio::test]
    async fn permanent_error_surfaces_immediately() {
        let mock = MockClassifier::new()
            .with_error(ClassifierError::AuthenticationFailed)
            .with_response("Nötr");
        let orch = orchestrator(&mock);
        let messages = transcript();
        let window = build_window(&messages, 0).unwrap();

        let result = orch.classify(ClassificationKind::Sentiment, &window).await;

        assert_eq!(result, Err(ClassifierError::AuthenticationFailed));
        assert_eq!(orch.api_calls(), 1);
        assert_eq!(mock.remaining(), 1);
    }
}
