//! Classification module - fallback rules, prompts and result records.

mod fallback;
pub mod prompts;
mod result;

pub use fallback::FallbackClassifier;
pub use result::{ClassificationResult, DatasetRow, MachineLabels, Provenance};
