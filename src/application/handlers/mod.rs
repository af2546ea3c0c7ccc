//! Application handlers.
//!
//! Command handlers that drive the domain through the ports.

mod analyze_conversation;
mod evaluate_accuracy;

pub use analyze_conversation::{
    AnalyzeConversationCommand, AnalyzeConversationHandler, AnalyzeConversationResult,
    AnalyzeError, BatchSummary, LabelDistributions,
};
pub use evaluate_accuracy::{EvaluateAccuracyCommand, EvaluateAccuracyHandler, EvaluateError};
