//! Labeling session - single-cursor review pass over a classified dataset.
//!
//! The session owns its rows, cursor and label map; callers hold it and pass
//! it around explicitly. Machine columns are never touched: human labels are
//! kept beside the rows and merged only on export.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::domain::classification::DatasetRow;
use crate::domain::foundation::{InvalidInputError, StateMachine, ValidationError};
use crate::domain::labels::{Answered, ClassificationKind, Sentiment, Topic};

use super::{HumanLabel, SessionStatus};

/// Errors from labeling session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LabelingError {
    #[error("no dataset loaded")]
    NoDatasetLoaded,

    #[error("review is complete; jump back to a message first")]
    NoCurrentMessage,

    #[error("machine labels for message {index} are unavailable")]
    MachineLabelUnavailable { index: usize },

    #[error(transparent)]
    InvalidTransition(#[from] ValidationError),

    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),
}

/// Labeled count versus total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub labeled: usize,
    pub total: usize,
}

impl Progress {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.labeled as f64 / self.total as f64 * 100.0
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LabelingSession {
    status: SessionStatus,
    rows: Vec<DatasetRow>,
    cursor: usize,
    labels: BTreeMap<usize, HumanLabel>,
}

impl LabelingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Starts a fresh review: cursor at 0, no human labels.
    ///
    /// May be called in any state; an existing review is discarded.
    pub fn load(&mut self, rows: Vec<DatasetRow>) -> Result<(), LabelingError> {
        if rows.is_empty() {
            return Err(InvalidInputError::EmptyDataset.into());
        }
        self.status = self.status.transition_to(SessionStatus::Reviewing)?;
        self.rows = rows;
        self.cursor = 0;
        self.labels.clear();
        Ok(())
    }

    /// Like [`load`](Self::load), but keeps labels already present in the
    /// manual columns so an interrupted review can continue.
    pub fn resume(&mut self, rows: Vec<DatasetRow>) -> Result<(), LabelingError> {
        self.load(rows)?;
        self.labels = self
            .rows
            .iter()
            .enumerate()
            .filter_map(|(i, row)| HumanLabel::from_row(row).map(|label| (i, label)))
            .collect();
        Ok(())
    }

    /// Row under the cursor; `None` when idle or complete.
    pub fn current_row(&self) -> Option<&DatasetRow> {
        match self.status {
            SessionStatus::Reviewing => self.rows.get(self.cursor),
            _ => None,
        }
    }

    pub fn human_label(&self, index: usize) -> Option<&HumanLabel> {
        self.labels.get(&index)
    }

    /// Attaches or overwrites the label at the cursor. Does not move.
    pub fn save_current(
        &mut self,
        sentiment: Sentiment,
        topic: Topic,
        answered: Answered,
        comment: Option<String>,
    ) -> Result<(), LabelingError> {
        let index = self.reviewing_index()?;
        let label = HumanLabel::new(sentiment, topic, answered).with_comment(comment);
        self.labels.insert(index, label);
        Ok(())
    }

    /// Moves the cursor forward; past the last row the session is Complete.
    pub fn advance(&mut self) -> Result<SessionStatus, LabelingError> {
        self.require_dataset()?;
        let next = self.cursor + 1;
        let target = if next >= self.rows.len() {
            SessionStatus::Complete
        } else {
            SessionStatus::Reviewing
        };
        self.status = self.status.transition_to(target)?;
        self.cursor = next.min(self.rows.len());
        Ok(self.status)
    }

    /// Moves the cursor to `target`, clamped to the dataset, and resumes reviewing.
    pub fn jump(&mut self, target: usize) -> Result<(), LabelingError> {
        self.require_dataset()?;
        self.status = self.status.transition_to(SessionStatus::Reviewing)?;
        self.cursor = target.min(self.rows.len() - 1);
        Ok(())
    }

    pub fn previous(&mut self) -> Result<(), LabelingError> {
        self.jump(self.cursor.saturating_sub(1))
    }

    /// Advances without saving anything.
    pub fn skip(&mut self) -> Result<SessionStatus, LabelingError> {
        self.advance()
    }

    /// Copies the machine labels of the current row into a human label.
    pub fn accept_machine_label(&mut self) -> Result<(), LabelingError> {
        let index = self.reviewing_index()?;
        let row = &self.rows[index];
        let unavailable = || LabelingError::MachineLabelUnavailable { index };

        let sentiment = row
            .machine_label(ClassificationKind::Sentiment)
            .parse()
            .map_err(|_| unavailable())?;
        let topic = row
            .machine_label(ClassificationKind::Topic)
            .parse()
            .map_err(|_| unavailable())?;
        let answered = row
            .machine_label(ClassificationKind::Answered)
            .parse()
            .map_err(|_| unavailable())?;

        self.save_current(sentiment, topic, answered, None)
    }

    pub fn save_and_continue(
        &mut self,
        sentiment: Sentiment,
        topic: Topic,
        answered: Answered,
        comment: Option<String>,
    ) -> Result<SessionStatus, LabelingError> {
        self.save_current(sentiment, topic, answered, comment)?;
        self.advance()
    }

    pub fn accept_and_continue(&mut self) -> Result<SessionStatus, LabelingError> {
        self.accept_machine_label()?;
        self.advance()
    }

    /// Accepts the machine labels of every remaining unlabeled row, skipping
    /// rows whose machine labels are the error sentinel. Returns how many
    /// rows were accepted; the session ends Complete.
    pub fn accept_remaining(&mut self) -> Result<usize, LabelingError> {
        self.require_dataset()?;
        let mut accepted = 0;
        while self.status == SessionStatus::Reviewing {
            if self.labels.contains_key(&self.cursor) {
                self.skip()?;
                continue;
            }
            match self.accept_and_continue() {
                Ok(_) => accepted += 1,
                Err(LabelingError::MachineLabelUnavailable { .. }) => {
                    self.skip()?;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(accepted)
    }

    pub fn progress(&self) -> Progress {
        Progress {
            labeled: self.labels.len(),
            total: self.rows.len(),
        }
    }

    /// Rows with human labels merged into the manual columns.
    ///
    /// Rows without a session label keep whatever manual values they were
    /// loaded with.
    pub fn to_dataset(&self) -> Vec<DatasetRow> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let mut row = row.clone();
                if let Some(label) = self.labels.get(&i) {
                    label.apply_to(&mut row);
                }
                row
            })
            .collect()
    }

    fn require_dataset(&self) -> Result<(), LabelingError> {
        if self.status.has_dataset() {
            Ok(())
        } else {
            Err(LabelingError::NoDatasetLoaded)
        }
    }

    fn reviewing_index(&self) -> Result<usize, LabelingError> {
        match self.status {
            SessionStatus::Idle => Err(LabelingError::NoDatasetLoaded),
            SessionStatus::Complete => Err(LabelingError::NoCurrentMessage),
            SessionStatus::Reviewing => Ok(self.cursor),
        }
    }
}
