//! AnalyzeConversationHandler - classifies a whole transcript.
//!
//! Messages are processed strictly one at a time in input order. The output
//! holds exactly one record per processed message; a message whose
//! classification fails hard gets the error sentinel instead of aborting the
//! batch, unless the configured policy says otherwise.

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::sleep;

use crate::application::orchestrator::ClassificationOrchestrator;
use crate::config::{ClassificationConfig, PermanentErrorPolicy};
use crate::domain::classification::{ClassificationResult, DatasetRow, MachineLabels, Provenance};
use crate::domain::conversation::{build_window, Message, MessageId};
use crate::domain::foundation::{InvalidInputError, RunId, Timestamp};
use crate::domain::labels::ClassificationKind;
use crate::ports::{Classifier, ClassifierError};

/// Command to classify a transcript.
#[derive(Debug, Clone)]
pub struct AnalyzeConversationCommand {
    pub messages: Vec<Message>,
}

/// Counts reported at the end of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    /// Messages sent to the classifier (non-empty text).
    pub attempted: usize,
    /// Messages with at least one label from the keyword rules.
    pub degraded_to_fallback: usize,
    pub hard_errors: usize,
    pub skipped_empty: usize,
    pub api_calls: u64,
    pub total_tokens: u64,
    pub cancelled: bool,
}

/// Label string to occurrence count, per kind.
pub type LabelDistributions = BTreeMap<ClassificationKind, BTreeMap<String, usize>>;

/// Result of a batch run.
#[derive(Debug, Clone)]
pub struct AnalyzeConversationResult {
    pub run_id: RunId,
    pub results: Vec<ClassificationResult>,
    pub rows: Vec<DatasetRow>,
    pub summary: BatchSummary,
    pub distributions: LabelDistributions,
}

#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),

    #[error("classifier failed permanently on message {message_id}: {source}")]
    Classifier {
        message_id: MessageId,
        #[source]
        source: ClassifierError,
    },

    #[error("classification of message {message_id} did not produce every label")]
    IncompleteLabels { message_id: MessageId },
}

/// Handler for transcript classification.
pub struct AnalyzeConversationHandler {
    orchestrator: ClassificationOrchestrator,
}

impl AnalyzeConversationHandler {
    pub fn new(classifier: Arc<dyn Classifier>, settings: ClassificationConfig) -> Self {
        Self {
            orchestrator: ClassificationOrchestrator::new(classifier, settings),
        }
    }

    pub fn orchestrator(&self) -> &ClassificationOrchestrator {
        &self.orchestrator
    }

    /// Classifies every message until done or `cancel` turns true.
    ///
    /// Cancellation is checked before each message; the message in flight
    /// always finishes.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty transcript. Under the `abort` policy, the
    /// first hard per-message failure.
    pub async fn handle(
        &self,
        cmd: AnalyzeConversationCommand,
        cancel: watch::Receiver<bool>,
    ) -> Result<AnalyzeConversationResult, AnalyzeError> {
        let messages = cmd.messages;
        if messages.is_empty() {
            return Err(InvalidInputError::EmptyMessages.into());
        }

        let run_id = RunId::new();
        let info = self.orchestrator.provider_info();
        let settings = self.orchestrator.settings();
        let calls_at_start = self.orchestrator.api_calls();
        let tokens_at_start = self.orchestrator.total_tokens();

        tracing::info!(
            run_id = %run_id,
            messages = messages.len(),
            provider = %info.name,
            model = %info.model,
            "analysis started"
        );

        let mut summary = BatchSummary {
            total: messages.len(),
            ..Default::default()
        };
        let mut results = Vec::with_capacity(messages.len());

        for (index, message) in messages.iter().enumerate() {
            if *cancel.borrow() {
                tracing::info!(run_id = %run_id, processed = index, "analysis cancelled");
                summary.cancelled = true;
                break;
            }

            let calls_before = self.orchestrator.api_calls();
            let tokens_before = self.orchestrator.total_tokens();

            let (labels, fallback_kinds) = if message.is_blank() {
                summary.skipped_empty += 1;
                (MachineLabels::empty_text_default(), Vec::new())
            } else {
                summary.attempted += 1;
                let outcome = match self.classify_message(&messages, index).await {
                    Ok(outcome) => outcome,
                    Err(err) if settings.on_permanent_error == PermanentErrorPolicy::Abort => {
                        tracing::error!(run_id = %run_id, error = %err, "analysis aborted");
                        return Err(err);
                    }
                    Err(err) => {
                        tracing::error!(
                            run_id = %run_id,
                            message_id = %message.id,
                            error = %err,
                            "message recorded as error"
                        );
                        summary.hard_errors += 1;
                        (MachineLabels::Error, Vec::new())
                    }
                };
                sleep(settings.rate_limit_delay()).await;
                outcome
            };

            if !fallback_kinds.is_empty() {
                summary.degraded_to_fallback += 1;
            }

            tracing::debug!(
                index,
                message_id = %message.id,
                sentiment = labels.label(ClassificationKind::Sentiment),
                topic = labels.label(ClassificationKind::Topic),
                answered = labels.label(ClassificationKind::Answered),
                "message classified"
            );

            results.push(ClassificationResult {
                message_id: message.id.clone(),
                labels,
                provenance: Provenance {
                    provider: info.name.clone(),
                    model: info.model.clone(),
                    call_count_consumed: self.orchestrator.api_calls() - calls_before,
                    token_count_consumed: self.orchestrator.total_tokens() - tokens_before,
                    produced_at: Timestamp::now(),
                    fallback_kinds,
                },
            });
        }

        summary.api_calls = self.orchestrator.api_calls() - calls_at_start;
        summary.total_tokens = self.orchestrator.total_tokens() - tokens_at_start;

        let rows: Vec<DatasetRow> = messages
            .iter()
            .zip(&results)
            .map(|(message, result)| DatasetRow::from_result(message, result))
            .collect();
        let distributions = distributions(&results);

        tracing::info!(
            run_id = %run_id,
            processed = results.len(),
            degraded = summary.degraded_to_fallback,
            hard_errors = summary.hard_errors,
            api_calls = summary.api_calls,
            tokens = summary.total_tokens,
            "analysis finished"
        );

        Ok(AnalyzeConversationResult {
            run_id,
            results,
            rows,
            summary,
            distributions,
        })
    }

    async fn classify_message(
        &self,
        messages: &[Message],
        index: usize,
    ) -> Result<(MachineLabels, Vec<ClassificationKind>), AnalyzeError> {
        let window = build_window(messages, index)?;
        let message_id = &messages[window.target_index()].id;

        let mut labels = Vec::with_capacity(ClassificationKind::all().len());
        let mut fallback_kinds = Vec::new();

        for kind in ClassificationKind::all() {
            let outcome = self
                .orchestrator
                .classify(*kind, &window)
                .await
                .map_err(|source| AnalyzeError::Classifier {
                    message_id: message_id.clone(),
                    source,
                })?;
            if outcome.used_fallback {
                fallback_kinds.push(*kind);
            }
            labels.push(outcome.label);
        }

        let labels = MachineLabels::from_labels(&labels).ok_or_else(|| {
            AnalyzeError::IncompleteLabels {
                message_id: message_id.clone(),
            }
        })?;
        Ok((labels, fallback_kinds))
    }
}

fn distributions(results: &[ClassificationResult]) -> LabelDistributions {
    let mut out = LabelDistributions::new();
    for kind in ClassificationKind::all() {
        let counts = out.entry(*kind).or_default();
        for result in results {
            *counts.entry(result.labels.label(*kind).to_string()).or_default() += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockClassifier;
    use crate::domain::conversation::Role;
    use crate::domain::labels::ERROR_LABEL;

    fn never_cancelled() -> watch::Receiver<bool> {
        watch::channel(false).1
    }

    fn handler(mock: &MockClassifier, settings: ClassificationConfig) -> AnalyzeConversationHandler {
        AnalyzeConversationHandler::new(Arc::new(mock.clone()), settings)
    }

    fn command(messages: Vec<Message>) -> AnalyzeConversationCommand {
        AnalyzeConversationCommand { messages }
    }

    #[tokio::test]
    async fn empty_transcript_is_rejected() {
        let mock = MockClassifier::new();
        let result = handler(&mock, ClassificationConfig::default())
            .handle(command(vec![]), never_cancelled())
            .await;

        assert!(matches!(
            result,
            Err(AnalyzeError::InvalidInput(InvalidInputError::EmptyMessages))
        ));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn blank_messages_get_defaults_without_calls() {
        tokio::time::pause();
        let mock = MockClassifier::new();
        let result = handler(&mock, ClassificationConfig::default())
            .handle(
                command(vec![Message::new(1u64, Role::Customer, "   ")]),
                never_cancelled(),
            )
            .await
            .unwrap();

        assert_eq!(mock.call_count(), 0);
        assert_eq!(result.summary.skipped_empty, 1);
        assert_eq!(result.summary.attempted, 0);
        assert_eq!(result.rows[0].llm_sentiment, "Nötr");
        assert_eq!(result.rows[0].llm_topic, "Genel Bilgi");
        assert_eq!(result.rows[0].llm_answered, "Hayır");
    }

    #[tokio::test]
    async fn labels_come_from_the_classifier_in_kind_order() {
        tokio::time::pause();
        let mock = MockClassifier::new()
            .with_response("Pozitif")
            .with_response("Gelinlik")
            .with_response("Hayır");
        let result = handler(&mock, ClassificationConfig::default())
            .handle(
                command(vec![Message::new(1u64, Role::Customer, "Gelinlikler harika")]),
                never_cancelled(),
            )
            .await
            .unwrap();

        let row = &result.rows[0];
        assert_eq!(row.llm_sentiment, "Pozitif");
        assert_eq!(row.llm_topic, "Gelinlik");
        assert_eq!(row.llm_answered, "Hayır");
        assert_eq!(result.results[0].provenance.call_count_consumed, 3);
        assert_eq!(result.results[0].provenance.token_count_consumed, 36);
        assert!(!result.results[0].used_fallback());
        assert_eq!(result.summary.api_calls, 3);
        assert_eq!(result.summary.degraded_to_fallback, 0);
    }

    #[tokio::test]
    async fn permanent_error_is_recorded_and_batch_continues() {
        tokio::time::pause();
        let mock = MockClassifier::new()
            .with_error(ClassifierError::AuthenticationFailed)
            .with_response("Nötr")
            .with_response("Diğer")
            .with_response("Evet");
        let messages = vec![
            Message::new(1u64, Role::Customer, "Merhaba"),
            Message::new(2u64, Role::Support, "Buyrun"),
        ];

        let result = handler(&mock, ClassificationConfig::default())
            .handle(command(messages), never_cancelled())
            .await
            .unwrap();

        assert_eq!(result.results.len(), 2);
        assert!(result.results[0].is_error());
        assert_eq!(result.rows[0].llm_topic, ERROR_LABEL);
        assert_eq!(result.rows[1].llm_topic, "Diğer");
        assert_eq!(result.summary.hard_errors, 1);
        assert_eq!(
            result.distributions[&ClassificationKind::Answered][ERROR_LABEL],
            1
        );
    }

    #[tokio::test]
    async fn abort_policy_stops_on_permanent_error() {
        let mock = MockClassifier::new().with_error(ClassifierError::AuthenticationFailed);
        let settings = ClassificationConfig {
            on_permanent_error: PermanentErrorPolicy::Abort,
            ..Default::default()
        };

        let result = handler(&mock, settings)
            .handle(
                command(vec![
                    Message::new(1u64, Role::Customer, "Merhaba"),
                    Message::new(2u64, Role::Customer, "Orada mısınız?"),
                ]),
                never_cancelled(),
            )
            .await;

        assert!(matches!(
            result,
            Err(AnalyzeError::Classifier {
                source: ClassifierError::AuthenticationFailed,
                ..
            })
        ));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn cancellation_before_start_produces_no_records() {
        let mock = MockClassifier::new();
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        let result = handler(&mock, ClassificationConfig::default())
            .handle(
                command(vec![Message::new(1u64, Role::Customer, "Merhaba")]),
                rx,
            )
            .await
            .unwrap();

        assert!(result.summary.cancelled);
        assert!(result.results.is_empty());
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn out_of_set_answers_count_as_degraded() {
        tokio::time::pause();
        // Every call gets the mock default, which matches no label.
        let mock = MockClassifier::new();
        let messages = vec![
            Message::new(1u64, Role::Customer, "Fiyat ne kadar?"),
            Message::new(2u64, Role::Support, "150 TL"),
        ];

        let result = handler(&mock, ClassificationConfig::default())
            .handle(command(messages), never_cancelled())
            .await
            .unwrap();

        assert_eq!(result.summary.degraded_to_fallback, 2);
        assert_eq!(result.summary.api_calls, 6);
        assert_eq!(result.rows[0].llm_topic, "Fiyat Sorgusu");
        assert_eq!(result.rows[0].llm_answered, "Evet");
        assert_eq!(result.rows[1].llm_answered, "Hayır");
        assert_eq!(result.results[0].provenance.fallback_kinds.len(), 3);
    }
}
