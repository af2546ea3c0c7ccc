//! Sentiment label set.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::fold;
use crate::domain::foundation::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Sentiment {
    #[serde(rename = "Pozitif")]
    Positive,
    #[serde(rename = "Negatif")]
    Negative,
    #[serde(rename = "Nötr")]
    Neutral,
}

impl Sentiment {
    pub fn all() -> &'static [Sentiment] {
        &[Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral]
    }

    /// Canonical name stored in datasets and requested in prompts.
    pub fn display_name(&self) -> &'static str {
        match self {
            Sentiment::Positive => "Pozitif",
            Sentiment::Negative => "Negatif",
            Sentiment::Neutral => "Nötr",
        }
    }

    fn english_name(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Sentiment {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded = fold(s);
        if folded.is_empty() {
            return Err(ValidationError::empty_field("sentiment"));
        }
        Sentiment::all()
            .iter()
            .copied()
            .find(|v| fold(v.display_name()) == folded || v.english_name() == folded)
            .ok_or_else(|| {
                ValidationError::invalid_format("sentiment", format!("unknown label '{}'", s.trim()))
            })
    }
}

impl TryFrom<String> for Sentiment {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_turkish_and_english_names_case_insensitively() {
        assert_eq!("NEGATİF".parse::<Sentiment>().unwrap(), Sentiment::Negative);
        assert_eq!("nötr".parse::<Sentiment>().unwrap(), Sentiment::Neutral);
        assert_eq!("Positive".parse::<Sentiment>().unwrap(), Sentiment::Positive);
    }

    #[test]
    fn rejects_near_misses() {
        assert!("pozitiff".parse::<Sentiment>().is_err());
        assert!("".parse::<Sentiment>().is_err());
    }

    #[test]
    fn serializes_display_name() {
        assert_eq!(
            serde_json::to_string(&Sentiment::Neutral).unwrap(),
            "\"Nötr\""
        );
        let parsed: Sentiment = serde_json::from_str("\"negative\"").unwrap();
        assert_eq!(parsed, Sentiment::Negative);
    }
}
