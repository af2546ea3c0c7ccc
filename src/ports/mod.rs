//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the core and the outside world. Adapters implement these ports.
//!
//! - `Classifier` - the external LLM classifier
//! - `MessageSource` / `DatasetSource` - loading transcripts and labeled datasets
//! - `ReportSink` - persisting datasets and reports

mod classifier;
mod storage;

pub use classifier::{
    ClassificationRequest, Classifier, ClassifierError, ClassifierResponse, ProviderInfo,
    TokenUsage,
};
pub use storage::{Artifact, DatasetSource, MessageSource, ReportSink, StorageError};
