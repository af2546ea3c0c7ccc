//! SessionStatus enum for the labeling review lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Lifecycle status of a labeling session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No dataset loaded.
    #[default]
    Idle,
    /// Cursor sits on a message.
    Reviewing,
    /// Cursor moved past the last message.
    Complete,
}

impl SessionStatus {
    /// Returns true once a dataset is loaded.
    pub fn has_dataset(&self) -> bool {
        !matches!(self, SessionStatus::Idle)
    }
}

impl StateMachine for SessionStatus {
    /// Valid transitions:
    /// - Idle -> Reviewing (load)
    /// - Reviewing -> Reviewing (advance, jump, reload)
    /// - Reviewing -> Complete (advance past the end)
    /// - Complete -> Reviewing (jump, reload)
    fn can_transition_to(&self, target: &Self) -> bool {
        use SessionStatus::*;
        matches!(
            (self, target),
            (Idle, Reviewing) | (Reviewing, Reviewing) | (Reviewing, Complete) | (Complete, Reviewing)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SessionStatus::*;
        match self {
            Idle => vec![Reviewing],
            Reviewing => vec![Reviewing, Complete],
            Complete => vec![Reviewing],
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionStatus::Idle => "Idle",
            SessionStatus::Reviewing => "Reviewing",
            SessionStatus::Complete => "Complete",
        };
        write!(f, "{}", s)
    }
}
