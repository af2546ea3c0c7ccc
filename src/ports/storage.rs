//! Storage Ports - loading transcripts and datasets, persisting artifacts.
//!
//! Format conversion lives entirely behind these traits; the core only sees
//! canonical `Message` lists and `DatasetRow`s.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::domain::classification::DatasetRow;
use crate::domain::conversation::Message;
use crate::domain::evaluation::AccuracyReport;
use crate::domain::foundation::InvalidInputError;

/// Errors raised by storage adapters.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to serialize: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize: {0}")]
    DeserializationFailed(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),
}

/// Something the core produces for a caller to keep.
#[derive(Debug, Clone, Copy)]
pub enum Artifact<'a> {
    /// Dataset rows (machine and manual columns).
    Dataset(&'a [DatasetRow]),
    /// `{category: {accuracy, precision, recall, f1, ...}}`
    Metrics(&'a AccuracyReport),
    /// `{category: {labels, matrix}}`
    Confusion(&'a AccuracyReport),
    /// Human-readable report.
    Markdown(&'a AccuracyReport),
    /// Per-row correctness flags of the evaluated rows.
    Agreement(&'a AccuracyReport),
}

/// Source of ordered chat transcripts.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Loads messages in transcript order.
    ///
    /// # Errors
    /// `StorageError::InvalidInput(EmptyMessages)` when the source holds none.
    async fn load_messages(&self, source: &Path) -> Result<Vec<Message>, StorageError>;
}

/// Source of labeled datasets.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Loads dataset rows, rejecting datasets that lack any of `required_columns`.
    async fn load_dataset(
        &self,
        source: &Path,
        required_columns: &[&str],
    ) -> Result<Vec<DatasetRow>, StorageError>;
}

/// Destination for produced artifacts.
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn persist(&self, artifact: Artifact<'_>, destination: &Path) -> Result<(), StorageError>;
}
