//! Evaluation module - agreement between machine and human labels.
//!
//! Everything here is a pure function of the dataset rows it receives.

mod confusion;
mod markdown;
mod metrics;
mod report;

pub use confusion::ConfusionMatrix;
pub use markdown::render_markdown;
pub use metrics::CategoryMetrics;
pub use report::{
    AccuracyEvaluator, AccuracyReport, CategoryReport, MetricsEntry, RowAgreement, TARGET_ACCURACY,
};
