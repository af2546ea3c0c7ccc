//! State machine trait for status enums.
//!
//! Gives every lifecycle status (for example the labeling session's
//! `SessionStatus`) the same validated transition API.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// Implementors list their legal edges; `transition_to` and `is_terminal`
/// come for free.
///
/// # Example
///
/// ```ignore
/// let next = SessionStatus::Idle.transition_to(SessionStatus::Reviewing)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Batch {
        Queued,
        Running,
        Finished,
    }

    impl StateMachine for Batch {
        fn can_transition_to(&self, target: &Self) -> bool {
            self.valid_transitions().contains(target)
        }

        fn valid_transitions(&self) -> Vec<Self> {
            match self {
                Batch::Queued => vec![Batch::Running],
                Batch::Running => vec![Batch::Finished],
                Batch::Finished => vec![],
            }
        }
    }

    #[test]
    fn legal_edge_is_accepted() {
        assert_eq!(Batch::Queued.transition_to(Batch::Running), Ok(Batch::Running));
    }

    #[test]
    fn skipping_a_state_is_rejected() {
        let err = Batch::Queued.transition_to(Batch::Finished).unwrap_err();
        assert!(err.to_string().contains("Cannot transition from Queued to Finished"));
    }

    #[test]
    fn only_states_without_edges_are_terminal() {
        assert!(Batch::Finished.is_terminal());
        assert!(!Batch::Queued.is_terminal());
        assert!(!Batch::Running.is_terminal());
    }
}
