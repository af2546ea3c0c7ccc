//! Labeling module - the human review pass over classified messages.

mod human_label;
mod session;
mod status;

pub use human_label::HumanLabel;
pub use session::{LabelingError, LabelingSession, Progress};
pub use status::SessionStatus;
