//! EvaluateAccuracyHandler - scores a labeled dataset and writes the reports.
//!
//! The report is computed in full before anything is written; a failed
//! evaluation leaves no artifacts behind.

use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::classification::DatasetRow;
use crate::domain::evaluation::{AccuracyEvaluator, AccuracyReport};
use crate::domain::foundation::InvalidInputError;
use crate::ports::{Artifact, DatasetSource, ReportSink, StorageError};

/// Command to evaluate a labeled dataset.
#[derive(Debug, Clone)]
pub struct EvaluateAccuracyCommand {
    pub input: PathBuf,
    /// Destination of the metrics document.
    pub report: PathBuf,
    pub confusion: Option<PathBuf>,
    pub markdown: Option<PathBuf>,
    /// Destination of the per-row correctness table.
    pub detailed: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum EvaluateError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    InvalidInput(#[from] InvalidInputError),
}

/// Handler for accuracy evaluation.
pub struct EvaluateAccuracyHandler {
    source: Arc<dyn DatasetSource>,
    sink: Arc<dyn ReportSink>,
}

impl EvaluateAccuracyHandler {
    pub fn new(source: Arc<dyn DatasetSource>, sink: Arc<dyn ReportSink>) -> Self {
        Self { source, sink }
    }

    /// # Errors
    ///
    /// Missing columns, an empty dataset or a dataset with no fully labeled
    /// row are fatal, as are storage failures.
    pub async fn handle(&self, cmd: EvaluateAccuracyCommand) -> Result<AccuracyReport, EvaluateError> {
        let rows = self
            .source
            .load_dataset(&cmd.input, &DatasetRow::EVALUATION_COLUMNS)
            .await?;

        let report = AccuracyEvaluator::evaluate(&rows)?;

        for (kind, category) in &report.categories {
            tracing::info!(
                category = %kind,
                accuracy = category.metrics.accuracy,
                f1 = category.metrics.f1,
                target_achieved = category.target_achieved,
                "category evaluated"
            );
        }
        if report.excluded_rows > 0 {
            tracing::warn!(
                excluded = report.excluded_rows,
                evaluated = report.evaluated_rows,
                "rows without complete labels were left out"
            );
        }

        self.sink.persist(Artifact::Metrics(&report), &cmd.report).await?;
        if let Some(path) = &cmd.confusion {
            self.sink.persist(Artifact::Confusion(&report), path).await?;
        }
        if let Some(path) = &cmd.markdown {
            self.sink.persist(Artifact::Markdown(&report), path).await?;
        }
        if let Some(path) = &cmd.detailed {
            self.sink.persist(Artifact::Agreement(&report), path).await?;
        }

        Ok(report)
    }
}
