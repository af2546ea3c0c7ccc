//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Classifier backends (OpenAI-compatible, Anthropic, mock)
//! - `storage` - JSON file store for transcripts, datasets and reports

pub mod ai;
pub mod storage;

pub use ai::{build_classifier, MockClassifier};
pub use storage::JsonFileStore;
