//! Deterministic local classification used when the external classifier
//! is exhausted or answers outside the label set.
//!
//! Every function here is total: any input yields a label from the closed set.

use once_cell::sync::Lazy;

use crate::domain::conversation::{ConversationWindow, Role};
use crate::domain::labels::{fold, Answered, ClassificationKind, Label, Sentiment, Topic};

const POSITIVE_WORDS: &[&str] = &[
    "güzel",
    "harika",
    "mükemmel",
    "teşekkür",
    "memnun",
    "beğendim",
    "süper",
    "muhteşem",
];

const NEGATIVE_WORDS: &[&str] = &[
    "kötü",
    "berbat",
    "şikayet",
    "memnun değil",
    "problem",
    "geç",
    "pahalı",
    "kızgın",
];

/// Topic keyword table, checked in order. Keywords are stored pre-folded.
static TOPIC_KEYWORDS: Lazy<Vec<(Topic, Vec<String>)>> = Lazy::new(|| {
    let table: &[(Topic, &[&str])] = &[
        (Topic::Venue, &["mekan", "salon", "bahçe", "düğün salonu", "yer"]),
        (Topic::WeddingDress, &["gelinlik", "elbise", "gelin", "kıyafet"]),
        (Topic::Photographer, &["fotoğraf", "çekim", "albüm", "kameraman"]),
        (
            Topic::PriceInquiry,
            &["fiyat", "ücret", "maliyet", "ne kadar", "para", "tutar"],
        ),
        (Topic::Reservation, &["rezervasyon", "randevu", "tarih", "saat"]),
        (Topic::Complaint, &["şikayet", "memnun değil", "problem", "sorun"]),
    ];
    table
        .iter()
        .map(|(topic, words)| (*topic, words.iter().map(|w| fold(w)).collect()))
        .collect()
});

fn count_hits(text: &str, words: &[&str]) -> usize {
    words.iter().filter(|w| text.contains(&fold(w))).count()
}

/// Keyword-rule classifier.
pub struct FallbackClassifier;

impl FallbackClassifier {
    /// Positive versus negative keyword count; a tie is Neutral.
    pub fn sentiment(text: &str) -> Sentiment {
        let folded = fold(text);
        let positive = count_hits(&folded, POSITIVE_WORDS);
        let negative = count_hits(&folded, NEGATIVE_WORDS);

        match positive.cmp(&negative) {
            std::cmp::Ordering::Greater => Sentiment::Positive,
            std::cmp::Ordering::Less => Sentiment::Negative,
            std::cmp::Ordering::Equal => Sentiment::Neutral,
        }
    }

    /// First topic in the keyword table with a hit, otherwise GeneralInfo.
    pub fn topic(text: &str) -> Topic {
        let folded = fold(text);
        TOPIC_KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| folded.contains(w.as_str())))
            .map(|(topic, _)| *topic)
            .unwrap_or(Topic::GeneralInfo)
    }

    /// Yes when a support message appears among the next two messages.
    pub fn answered(window: &ConversationWindow<'_>) -> Answered {
        if window.following().iter().any(|e| e.role == Role::Support) {
            Answered::Yes
        } else {
            Answered::No
        }
    }

    pub fn classify(kind: ClassificationKind, window: &ConversationWindow<'_>) -> Label {
        let text = window.target().text;
        match kind {
            ClassificationKind::Sentiment => Label::Sentiment(Self::sentiment(text)),
            ClassificationKind::Topic => Label::Topic(Self::topic(text)),
            ClassificationKind::Answered => Label::Answered(Self::answered(window)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::{build_window, Message};
    use proptest::prelude::*;

    #[test]
    fn praise_is_positive() {
        assert_eq!(
            FallbackClassifier::sentiment("Harika bir gün oldu, çok teşekkürler"),
            Sentiment::Positive
        );
    }

    #[test]
    fn complaints_are_negative() {
        assert_eq!(
            FallbackClassifier::sentiment("Çok pahalı ve geç teslim ettiniz"),
            Sentiment::Negative
        );
    }

    #[test]
    fn balanced_or_neutral_text_is_neutral() {
        assert_eq!(FallbackClassifier::sentiment("Yarın açık mısınız?"), Sentiment::Neutral);
        assert_eq!(FallbackClassifier::sentiment("güzel ama pahalı"), Sentiment::Neutral);
        assert_eq!(FallbackClassifier::sentiment(""), Sentiment::Neutral);
    }

    #[test]
    fn topic_keywords_follow_table_order() {
        assert_eq!(FallbackClassifier::topic("Fiyat ne kadar?"), Topic::PriceInquiry);
        assert_eq!(FallbackClassifier::topic("Gelinlik provası"), Topic::WeddingDress);
        // "salon" (Venue) wins over "fiyat" because Venue is checked first.
        assert_eq!(FallbackClassifier::topic("Salon fiyatı"), Topic::Venue);
        assert_eq!(FallbackClassifier::topic("Merhaba"), Topic::GeneralInfo);
    }

    #[test]
    fn support_reply_after_question_means_answered() {
        let messages = vec![
            Message::new(1u64, Role::Customer, "Fiyat ne kadar?"),
            Message::new(2u64, Role::Support, "150 TL"),
        ];
        let window = build_window(&messages, 0).unwrap();
        assert_eq!(FallbackClassifier::answered(&window), Answered::Yes);
    }

    #[test]
    fn support_reply_three_messages_later_is_out_of_reach() {
        let messages = vec![
            Message::new(1u64, Role::Customer, "Merhaba"),
            Message::new(2u64, Role::Customer, "Orada mısınız?"),
            Message::new(3u64, Role::Customer, "?"),
            Message::new(4u64, Role::Support, "Buyrun"),
        ];
        let window = build_window(&messages, 0).unwrap();
        assert_eq!(FallbackClassifier::answered(&window), Answered::No);
    }

    #[test]
    fn earlier_support_messages_do_not_count() {
        let messages = vec![
            Message::new(1u64, Role::Support, "Hoş geldiniz"),
            Message::new(2u64, Role::Customer, "Teşekkürler"),
        ];
        let window = build_window(&messages, 1).unwrap();
        assert_eq!(FallbackClassifier::answered(&window), Answered::No);
    }

    proptest! {
        #[test]
        fn fallback_always_yields_a_member_of_the_label_set(
            text in ".*",
            roles in proptest::collection::vec(any::<bool>(), 1..8),
            seed in 0usize..64,
        ) {
            let messages: Vec<Message> = roles
                .iter()
                .enumerate()
                .map(|(i, support)| {
                    let role = if *support { Role::Support } else { Role::Customer };
                    Message::new(i as u64, role, text.clone())
                })
                .collect();
            let index = seed % messages.len();
            let window = build_window(&messages, index).unwrap();

            for kind in ClassificationKind::all() {
                let label = FallbackClassifier::classify(*kind, &window);
                prop_assert_eq!(label.kind(), *kind);
                prop_assert!(Label::parse(*kind, label.display_name()).is_ok());
            }
        }
    }
}
