//! Human-assigned labels for one message.

use serde::{Deserialize, Serialize};

use crate::domain::classification::DatasetRow;
use crate::domain::foundation::Timestamp;
use crate::domain::labels::{Answered, ClassificationKind, Sentiment, Topic};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HumanLabel {
    pub sentiment: Sentiment,
    pub topic: Topic,
    pub answered: Answered,
    pub comment: Option<String>,
    pub labeled_at: Timestamp,
}

impl HumanLabel {
    pub fn new(sentiment: Sentiment, topic: Topic, answered: Answered) -> Self {
        Self {
            sentiment,
            topic,
            answered,
            comment: None,
            labeled_at: Timestamp::now(),
        }
    }

    /// Sets the comment; blank comments are dropped.
    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        self
    }

    /// Reads the manual columns of a row, if all three hold valid labels.
    pub fn from_row(row: &DatasetRow) -> Option<Self> {
        let sentiment = row.human_label(ClassificationKind::Sentiment)?.parse().ok()?;
        let topic = row.human_label(ClassificationKind::Topic)?.parse().ok()?;
        let answered = row.human_label(ClassificationKind::Answered)?.parse().ok()?;
        Some(Self {
            sentiment,
            topic,
            answered,
            comment: row.comment.clone(),
            labeled_at: row.labeled_at.unwrap_or_default(),
        })
    }

    /// Writes this label into the manual columns of a row.
    pub fn apply_to(&self, row: &mut DatasetRow) {
        row.manual_sentiment = Some(self.sentiment.display_name().to_string());
        row.manual_topic = Some(self.topic.display_name().to_string());
        row.manual_answered = Some(self.answered.display_name().to_string());
        row.comment = self.comment.clone();
        row.labeled_at = Some(self.labeled_at);
    }
}
