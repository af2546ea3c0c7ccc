//! JSON file store
//!
//! Reads transcripts and datasets from JSON files and writes artifacts back
//! as pretty-printed JSON, or as markdown for `.md` destinations.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

use crate::domain::classification::DatasetRow;
use crate::domain::conversation::Message;
use crate::domain::evaluation::render_markdown;
use crate::domain::foundation::InvalidInputError;
use crate::ports::{Artifact, DatasetSource, MessageSource, ReportSink, StorageError};

/// File-backed implementation of all three storage ports
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFileStore;

impl JsonFileStore {
    pub fn new() -> Self {
        Self
    }

    async fn read_json(&self, path: &Path) -> Result<Value, StorageError> {
        let raw = fs::read_to_string(path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound(path.to_path_buf()),
            _ => StorageError::IoError(e.to_string()),
        })?;

        serde_json::from_str(&raw).map_err(|e| StorageError::DeserializationFailed(e.to_string()))
    }

    async fn ensure_parent(&self, path: &Path) -> Result<(), StorageError> {
        match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir)
                .await
                .map_err(|e| StorageError::IoError(e.to_string())),
            _ => Ok(()),
        }
    }
}

fn to_pretty<T: Serialize>(value: &T) -> Result<String, StorageError> {
    serde_json::to_string_pretty(value).map_err(|e| StorageError::SerializationFailed(e.to_string()))
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

/// Columns that no row carries. A column present on at least one row is
/// considered present; rows lacking it are handled by the evaluator's filter.
fn missing_columns(rows: &[Value], required: &[&str]) -> Vec<String> {
    required
        .iter()
        .filter(|column| {
            !rows
                .iter()
                .any(|row| row.as_object().is_some_and(|obj| obj.contains_key(**column)))
        })
        .map(|column| column.to_string())
        .collect()
}

fn render(artifact: Artifact<'_>, destination: &Path) -> Result<String, StorageError> {
    match artifact {
        Artifact::Dataset(rows) => to_pretty(&rows),
        Artifact::Markdown(report) => Ok(render_markdown(report)),
        Artifact::Metrics(report) | Artifact::Confusion(report) if is_markdown(destination) => {
            Ok(render_markdown(report))
        }
        Artifact::Metrics(report) => to_pretty(&report.metrics_document()),
        Artifact::Confusion(report) => to_pretty(&report.confusion_document()),
        Artifact::Agreement(report) => to_pretty(&report.rows),
    }
}

#[async_trait]
impl MessageSource for JsonFileStore {
    async fn load_messages(&self, source: &Path) -> Result<Vec<Message>, StorageError> {
        let value = match self.read_json(source).await? {
            Value::Object(mut obj) => obj.remove("messages").ok_or_else(|| {
                StorageError::DeserializationFailed(
                    "expected an array or an object with a 'messages' array".to_string(),
                )
            })?,
            other => other,
        };

        let messages: Vec<Message> = serde_json::from_value(value)
            .map_err(|e| StorageError::DeserializationFailed(e.to_string()))?;

        if messages.is_empty() {
            return Err(InvalidInputError::EmptyMessages.into());
        }

        tracing::debug!(path = %source.display(), count = messages.len(), "loaded messages");
        Ok(messages)
    }
}

#[async_trait]
impl DatasetSource for JsonFileStore {
    async fn load_dataset(
        &self,
        source: &Path,
        required_columns: &[&str],
    ) -> Result<Vec<DatasetRow>, StorageError> {
        let rows = match self.read_json(source).await? {
            Value::Array(rows) => rows,
            _ => {
                return Err(StorageError::DeserializationFailed(
                    "dataset must be a JSON array of rows".to_string(),
                ))
            }
        };

        if rows.is_empty() {
            return Err(InvalidInputError::EmptyDataset.into());
        }

        let missing = missing_columns(&rows, required_columns);
        if !missing.is_empty() {
            return Err(InvalidInputError::MissingColumns(missing).into());
        }

        let dataset: Vec<DatasetRow> = serde_json::from_value(Value::Array(rows))
            .map_err(|e| StorageError::DeserializationFailed(e.to_string()))?;

        tracing::debug!(path = %source.display(), rows = dataset.len(), "loaded dataset");
        Ok(dataset)
    }
}

#[async_trait]
impl ReportSink for JsonFileStore {
    async fn persist(&self, artifact: Artifact<'_>, destination: &Path) -> Result<(), StorageError> {
        let content = render(artifact, destination)?;
        self.ensure_parent(destination).await?;

        fs::write(destination, content)
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?;

        tracing::info!(path = %destination.display(), "artifact written");
        Ok(())
    }
}
