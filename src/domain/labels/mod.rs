//! Labels module - the closed label sets for each classification kind.
//!
//! Every label has a canonical display name (what prompts ask for and what
//! datasets store) plus a validated `FromStr`. Raw classifier output goes
//! through [`normalize_response`], which applies the per-kind matching rules.

mod answered;
mod sentiment;
mod topic;

pub use answered::Answered;
pub use sentiment::Sentiment;
pub use topic::Topic;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ValidationError;

/// Sentinel written to all three label fields of a message that hard-errored.
/// It never parses as a valid label.
pub const ERROR_LABEL: &str = "Error";

/// One of the three classification kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationKind {
    Sentiment,
    Topic,
    Answered,
}

impl ClassificationKind {
    /// Returns all kinds in reporting order.
    pub fn all() -> &'static [ClassificationKind] {
        &[
            ClassificationKind::Sentiment,
            ClassificationKind::Topic,
            ClassificationKind::Answered,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassificationKind::Sentiment => "sentiment",
            ClassificationKind::Topic => "topic",
            ClassificationKind::Answered => "answered",
        }
    }

    /// Label used when a message has no text.
    pub fn empty_text_default(&self) -> Label {
        match self {
            ClassificationKind::Sentiment => Label::Sentiment(Sentiment::Neutral),
            ClassificationKind::Topic => Label::Topic(Topic::GeneralInfo),
            ClassificationKind::Answered => Label::Answered(Answered::No),
        }
    }
}

impl fmt::Display for ClassificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated label of any kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    Sentiment(Sentiment),
    Topic(Topic),
    Answered(Answered),
}

impl Label {
    pub fn kind(&self) -> ClassificationKind {
        match self {
            Label::Sentiment(_) => ClassificationKind::Sentiment,
            Label::Topic(_) => ClassificationKind::Topic,
            Label::Answered(_) => ClassificationKind::Answered,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Label::Sentiment(s) => s.display_name(),
            Label::Topic(t) => t.display_name(),
            Label::Answered(a) => a.display_name(),
        }
    }

    /// Parses an exact (folded) label name of the given kind.
    pub fn parse(kind: ClassificationKind, value: &str) -> Result<Self, ValidationError> {
        Ok(match kind {
            ClassificationKind::Sentiment => Label::Sentiment(value.parse()?),
            ClassificationKind::Topic => Label::Topic(value.parse()?),
            ClassificationKind::Answered => Label::Answered(value.parse()?),
        })
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Validates raw classifier output against the label set for `kind`.
///
/// Sentiment needs an exact folded match. Topic accepts a substring match in
/// either direction, first category in declaration order wins. Answered looks
/// for affirmative markers before negative ones.
pub fn normalize_response(kind: ClassificationKind, raw: &str) -> Result<Label, ValidationError> {
    let field = kind.as_str();
    if raw.trim().is_empty() {
        return Err(ValidationError::empty_field(field));
    }
    let label = match kind {
        ClassificationKind::Sentiment => raw.parse().ok().map(Label::Sentiment),
        ClassificationKind::Topic => Topic::match_response(raw).map(Label::Topic),
        ClassificationKind::Answered => Answered::match_response(raw).map(Label::Answered),
    };
    label.ok_or_else(|| {
        ValidationError::invalid_format(field, format!("'{}' is not a known label", raw.trim()))
    })
}

/// Lowercases with Turkish dotted/dotless I folded onto plain `i`, so
/// "HAYIR", "Hayır" and "hayir" compare equal.
pub(crate) fn fold(value: &str) -> String {
    value
        .trim()
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| *c != '\u{0307}')
        .map(|c| if c == 'ı' { 'i' } else { c })
        .collect()
}
