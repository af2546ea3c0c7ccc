//! Domain layer containing the classification and evaluation logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (errors, ids, timestamp, state machine)
//! - `conversation` - Chat messages and context windows
//! - `labels` - Closed label sets and response normalization
//! - `classification` - Fallback rules, prompts and result records
//! - `labeling` - Human review session
//! - `evaluation` - Agreement metrics and reports

pub mod classification;
pub mod conversation;
pub mod evaluation;
pub mod foundation;
pub mod labeling;
pub mod labels;
