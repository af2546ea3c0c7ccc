//! Per-message classification output and the persisted dataset row.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::conversation::{Message, MessageId, Role};
use crate::domain::foundation::Timestamp;
use crate::domain::labels::{Answered, ClassificationKind, Label, Sentiment, Topic, ERROR_LABEL};

/// The machine labels of one message, or the hard-error sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineLabels {
    Labeled {
        sentiment: Sentiment,
        topic: Topic,
        answered: Answered,
    },
    Error,
}

impl MachineLabels {
    /// Stored string for one kind: the display name, or `"Error"`.
    pub fn label(&self, kind: ClassificationKind) -> &'static str {
        match self {
            MachineLabels::Labeled {
                sentiment,
                topic,
                answered,
            } => match kind {
                ClassificationKind::Sentiment => sentiment.display_name(),
                ClassificationKind::Topic => topic.display_name(),
                ClassificationKind::Answered => answered.display_name(),
            },
            MachineLabels::Error => ERROR_LABEL,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, MachineLabels::Error)
    }

    /// Assembles one label per kind, in any order. `None` if a kind is missing.
    pub fn from_labels(labels: &[Label]) -> Option<Self> {
        let (mut sentiment, mut topic, mut answered) = (None, None, None);
        for label in labels {
            match *label {
                Label::Sentiment(s) => sentiment = Some(s),
                Label::Topic(t) => topic = Some(t),
                Label::Answered(a) => answered = Some(a),
            }
        }
        Some(MachineLabels::Labeled {
            sentiment: sentiment?,
            topic: topic?,
            answered: answered?,
        })
    }

    /// Labels assigned to a message with no text, without calling out.
    pub fn empty_text_default() -> Self {
        MachineLabels::Labeled {
            sentiment: Sentiment::Neutral,
            topic: Topic::GeneralInfo,
            answered: Answered::No,
        }
    }
}

/// Where a result came from and what it cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    pub provider: String,
    pub model: String,
    pub call_count_consumed: u64,
    pub token_count_consumed: u64,
    pub produced_at: Timestamp,
    /// Kinds whose label came from the local fallback rules.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallback_kinds: Vec<ClassificationKind>,
}

/// One record per input message. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationResult {
    pub message_id: MessageId,
    pub labels: MachineLabels,
    pub provenance: Provenance,
}

impl ClassificationResult {
    pub fn is_error(&self) -> bool {
        self.labels.is_error()
    }

    pub fn used_fallback(&self) -> bool {
        !self.provenance.fallback_kinds.is_empty()
    }
}

/// Reads a missing or `null` machine cell as an empty label.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Dataset row as persisted between the analyze, review and evaluate steps.
///
/// Machine columns are never rewritten; human corrections live in the
/// `manual_*` columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetRow {
    pub message_id: MessageId,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub sender: String,
    pub role: Role,
    #[serde(default)]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub llm_sentiment: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub llm_topic: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub llm_answered: String,
    #[serde(default)]
    pub manual_sentiment: Option<String>,
    #[serde(default)]
    pub manual_topic: Option<String>,
    #[serde(default)]
    pub manual_answered: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labeled_at: Option<Timestamp>,
}

impl DatasetRow {
    /// Columns the evaluation step needs to find in a dataset.
    pub const EVALUATION_COLUMNS: [&'static str; 6] = [
        "llm_sentiment",
        "llm_topic",
        "llm_answered",
        "manual_sentiment",
        "manual_topic",
        "manual_answered",
    ];

    /// Builds an unreviewed row from a message and its classification.
    pub fn from_result(message: &Message, result: &ClassificationResult) -> Self {
        Self {
            message_id: message.id.clone(),
            timestamp: message.timestamp.clone(),
            sender: message.sender.clone(),
            role: message.role,
            message: message.text.clone(),
            llm_sentiment: result.labels.label(ClassificationKind::Sentiment).to_string(),
            llm_topic: result.labels.label(ClassificationKind::Topic).to_string(),
            llm_answered: result.labels.label(ClassificationKind::Answered).to_string(),
            manual_sentiment: None,
            manual_topic: None,
            manual_answered: None,
            comment: None,
            labeled_at: None,
        }
    }

    pub fn machine_label(&self, kind: ClassificationKind) -> &str {
        match kind {
            ClassificationKind::Sentiment => &self.llm_sentiment,
            ClassificationKind::Topic => &self.llm_topic,
            ClassificationKind::Answered => &self.llm_answered,
        }
    }

    /// Human label for a kind, treating blank strings as absent.
    pub fn human_label(&self, kind: ClassificationKind) -> Option<&str> {
        let value = match kind {
            ClassificationKind::Sentiment => self.manual_sentiment.as_deref(),
            ClassificationKind::Topic => self.manual_topic.as_deref(),
            ClassificationKind::Answered => self.manual_answered.as_deref(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    /// True when both sources carry a label for every kind.
    pub fn is_fully_labeled(&self) -> bool {
        ClassificationKind::all().iter().all(|kind| {
            !self.machine_label(*kind).trim().is_empty() && self.human_label(*kind).is_some()
        })
    }
}
