//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps, the state machine trait and the error types
//! every other domain module builds on.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{InvalidInputError, ValidationError};
pub use ids::RunId;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
