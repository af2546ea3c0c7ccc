//! Answered-by-support label set.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::fold;
use crate::domain::foundation::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Answered {
    #[serde(rename = "Evet")]
    Yes,
    #[serde(rename = "Hayır")]
    No,
}

impl Answered {
    pub fn all() -> &'static [Answered] {
        &[Answered::Yes, Answered::No]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Answered::Yes => "Evet",
            Answered::No => "Hayır",
        }
    }

    /// Looks for an affirmative marker first, then a negative one.
    pub fn match_response(raw: &str) -> Option<Answered> {
        let folded = fold(raw);
        let has_word = |w: &str| {
            folded
                .split(|c: char| !c.is_alphanumeric())
                .any(|token| token == w)
        };

        if folded.contains("evet") || has_word("yes") {
            Some(Answered::Yes)
        } else if folded.contains("hayir") || has_word("no") {
            Some(Answered::No)
        } else {
            None
        }
    }
}

impl fmt::Display for Answered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Answered {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold(s).as_str() {
            "evet" | "yes" => Ok(Answered::Yes),
            "hayir" | "no" => Ok(Answered::No),
            "" => Err(ValidationError::empty_field("answered")),
            _ => Err(ValidationError::invalid_format(
                "answered",
                format!("unknown label '{}'", s.trim()),
            )),
        }
    }
}

impl TryFrom<String> for Answered {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_parse_accepts_both_spellings_of_hayir() {
        assert_eq!("Hayır".parse::<Answered>().unwrap(), Answered::No);
        assert_eq!("hayir".parse::<Answered>().unwrap(), Answered::No);
        assert_eq!("YES".parse::<Answered>().unwrap(), Answered::Yes);
    }

    #[test]
    fn match_prefers_affirmative_marker() {
        assert_eq!(Answered::match_response("Evet / Hayır"), Some(Answered::Yes));
    }

    #[test]
    fn match_requires_whole_word_for_english() {
        assert_eq!(Answered::match_response("No."), Some(Answered::No));
        assert_eq!(Answered::match_response("nothing"), None);
        assert_eq!(Answered::match_response("yesterday"), None);
    }
}
