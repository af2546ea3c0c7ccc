//! Application layer - orchestration and command handlers.
//!
//! This layer drives domain operations and coordinates between ports.

pub mod handlers;
mod orchestrator;

pub use handlers::{
    AnalyzeConversationCommand, AnalyzeConversationHandler, AnalyzeConversationResult,
    AnalyzeError, BatchSummary, EvaluateAccuracyCommand, EvaluateAccuracyHandler, EvaluateError,
    LabelDistributions,
};
pub use orchestrator::{ClassificationOrchestrator, LabelOutcome};
