//! Accuracy Evaluator - machine/human agreement per category and the target verdict.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::classification::DatasetRow;
use crate::domain::conversation::MessageId;
use crate::domain::foundation::InvalidInputError;
use crate::domain::labels::ClassificationKind;

use super::{CategoryMetrics, ConfusionMatrix};

/// Accuracy a category must reach to count as acceptable.
pub const TARGET_ACCURACY: f64 = 0.95;

/// Metrics, matrix and verdict for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryReport {
    pub metrics: CategoryMetrics,
    pub confusion: ConfusionMatrix,
    pub target_achieved: bool,
    /// `TARGET_ACCURACY - accuracy`, present only when the target is missed.
    pub gap: Option<f64>,
}

impl CategoryReport {
    fn new(metrics: CategoryMetrics, confusion: ConfusionMatrix) -> Self {
        let target_achieved = metrics.accuracy >= TARGET_ACCURACY;
        Self {
            metrics,
            confusion,
            target_achieved,
            gap: (!target_achieved).then(|| TARGET_ACCURACY - metrics.accuracy),
        }
    }
}

/// Per-row correctness flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowAgreement {
    pub message_id: MessageId,
    pub sentiment_correct: bool,
    pub topic_correct: bool,
    pub answered_correct: bool,
    pub overall_correct: bool,
}

/// Snapshot of agreement between machine and human labels.
#[derive(Debug, Clone, PartialEq)]
pub struct AccuracyReport {
    /// Rows that entered the computation.
    pub evaluated_rows: usize,
    /// Rows dropped for missing a label in either source.
    pub excluded_rows: usize,
    pub categories: BTreeMap<ClassificationKind, CategoryReport>,
    /// Fraction of rows correct in all three categories.
    pub overall_accuracy: f64,
    pub rows: Vec<RowAgreement>,
}

/// Persisted metrics entry for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsEntry {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub target_achieved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap: Option<f64>,
}

impl AccuracyReport {
    pub fn category(&self, kind: ClassificationKind) -> Option<&CategoryReport> {
        self.categories.get(&kind)
    }

    /// True when every category meets the target.
    pub fn all_targets_achieved(&self) -> bool {
        self.categories.values().all(|c| c.target_achieved)
    }

    /// `{category: {accuracy, precision, recall, f1, target_achieved, gap?}}`
    pub fn metrics_document(&self) -> BTreeMap<ClassificationKind, MetricsEntry> {
        self.categories
            .iter()
            .map(|(kind, c)| {
                let entry = MetricsEntry {
                    accuracy: c.metrics.accuracy,
                    precision: c.metrics.precision,
                    recall: c.metrics.recall,
                    f1: c.metrics.f1,
                    target_achieved: c.target_achieved,
                    gap: c.gap,
                };
                (*kind, entry)
            })
            .collect()
    }

    /// `{category: {labels, matrix}}`
    pub fn confusion_document(&self) -> BTreeMap<ClassificationKind, ConfusionMatrix> {
        self.categories
            .iter()
            .map(|(kind, c)| (*kind, c.confusion.clone()))
            .collect()
    }
}

/// Pure evaluation service; no I/O, no randomness.
pub struct AccuracyEvaluator;

impl AccuracyEvaluator {
    /// Evaluates every category over the rows labeled in both sources for all
    /// three categories. The same row subset feeds every category.
    ///
    /// # Errors
    ///
    /// `InvalidInputError::NoLabeledRows` when no row qualifies.
    pub fn evaluate(rows: &[DatasetRow]) -> Result<AccuracyReport, InvalidInputError> {
        let labeled: Vec<&DatasetRow> = rows.iter().filter(|r| r.is_fully_labeled()).collect();
        if labeled.is_empty() {
            return Err(InvalidInputError::NoLabeledRows);
        }

        let categories = ClassificationKind::all()
            .iter()
            .map(|kind| {
                let pairs = Self::pairs(&labeled, *kind);
                let report = CategoryReport::new(
                    CategoryMetrics::from_pairs(&pairs),
                    ConfusionMatrix::from_pairs(&pairs),
                );
                (*kind, report)
            })
            .collect();

        let agreements: Vec<RowAgreement> = labeled.iter().map(|r| Self::agreement(r)).collect();
        let overall_correct = agreements.iter().filter(|a| a.overall_correct).count();

        Ok(AccuracyReport {
            evaluated_rows: labeled.len(),
            excluded_rows: rows.len() - labeled.len(),
            categories,
            overall_accuracy: overall_correct as f64 / labeled.len() as f64,
            rows: agreements,
        })
    }

    fn pairs<'a>(rows: &[&'a DatasetRow], kind: ClassificationKind) -> Vec<(&'a str, &'a str)> {
        rows.iter()
            .filter_map(|r| Some((r.human_label(kind)?, r.machine_label(kind))))
            .collect()
    }

    fn agreement(row: &DatasetRow) -> RowAgreement {
        let correct = |kind| row.human_label(kind) == Some(row.machine_label(kind));
        let sentiment_correct = correct(ClassificationKind::Sentiment);
        let topic_correct = correct(ClassificationKind::Topic);
        let answered_correct = correct(ClassificationKind::Answered);
        RowAgreement {
            message_id: row.message_id.clone(),
            sentiment_correct,
            topic_correct,
            answered_correct,
            overall_correct: sentiment_correct && topic_correct && answered_correct,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::conversation::Role;
    use proptest::prelude::*;

    pub(crate) fn labeled_row(
        id: u64,
        machine: [&str; 3],
        human: [Option<&str>; 3],
    ) -> DatasetRow {
        DatasetRow {
            message_id: MessageId::Number(id),
            timestamp: String::new(),
            sender: String::new(),
            role: Role::Customer,
            message: String::new(),
            llm_sentiment: machine[0].to_string(),
            llm_topic: machine[1].to_string(),
            llm_answered: machine[2].to_string(),
            manual_sentiment: human[0].map(str::to_string),
            manual_topic: human[1].map(str::to_string),
            manual_answered: human[2].map(str::to_string),
            comment: None,
            labeled_at: None,
        }
    }

    fn agreeing(id: u64, sentiment: &str, human_sentiment: &str) -> DatasetRow {
        labeled_row(
            id,
            [sentiment, "Genel Bilgi", "Evet"],
            [Some(human_sentiment), Some("Genel Bilgi"), Some("Evet")],
        )
    }

    #[test]
    fn eight_of_ten_sentiment_matches_misses_target() {
        let mut rows: Vec<DatasetRow> = (0..8).map(|i| agreeing(i, "Nötr", "Nötr")).collect();
        rows.push(agreeing(8, "Pozitif", "Nötr"));
        rows.push(agreeing(9, "Negatif", "Pozitif"));

        let report = AccuracyEvaluator::evaluate(&rows).unwrap();
        let sentiment = report.category(ClassificationKind::Sentiment).unwrap();

        assert!((sentiment.metrics.accuracy - 0.8).abs() < 1e-9);
        assert!(!sentiment.target_achieved);
        assert!((sentiment.gap.unwrap() - 0.15).abs() < 1e-9);

        let topic = report.category(ClassificationKind::Topic).unwrap();
        assert!(topic.target_achieved);
        assert_eq!(topic.gap, None);
        assert!((report.overall_accuracy - 0.8).abs() < 1e-9);
    }

    #[test]
    fn row_missing_any_label_is_excluded_from_every_category() {
        let rows = vec![
            agreeing(1, "Nötr", "Nötr"),
            labeled_row(
                2,
                ["Pozitif", "Gelinlik", "Hayır"],
                [Some("Negatif"), None, Some("Evet")],
            ),
        ];
        let report = AccuracyEvaluator::evaluate(&rows).unwrap();

        assert_eq!(report.evaluated_rows, 1);
        assert_eq!(report.excluded_rows, 1);
        for category in report.categories.values() {
            assert_eq!(category.metrics.accuracy, 1.0);
            assert_eq!(category.confusion.matrix.iter().flatten().sum::<u64>(), 1);
        }
    }

    #[test]
    fn row_flags_mark_each_category_separately() {
        let rows = vec![
            agreeing(1, "Nötr", "Nötr"),
            labeled_row(
                2,
                ["Pozitif", "Gelinlik", "Hayır"],
                [Some("Pozitif"), Some("Fotoğrafçı"), Some("Hayır")],
            ),
        ];
        let report = AccuracyEvaluator::evaluate(&rows).unwrap();

        assert_eq!(
            report.rows[1],
            RowAgreement {
                message_id: MessageId::Number(2),
                sentiment_correct: true,
                topic_correct: false,
                answered_correct: true,
                overall_correct: false,
            }
        );
        assert!(report.rows[0].overall_correct);
        assert_eq!(report.overall_accuracy, 0.5);
    }

    #[test]
    fn no_labeled_rows_is_an_error() {
        let rows = vec![labeled_row(1, ["Nötr", "Diğer", "Hayır"], [None, None, None])];
        assert_eq!(
            AccuracyEvaluator::evaluate(&rows).unwrap_err(),
            InvalidInputError::NoLabeledRows
        );
    }

    #[test]
    fn error_sentinel_counts_as_disagreement() {
        let rows = vec![labeled_row(
            1,
            ["Error", "Error", "Error"],
            [Some("Nötr"), Some("Diğer"), Some("Hayır")],
        )];
        let report = AccuracyEvaluator::evaluate(&rows).unwrap();
        assert_eq!(report.overall_accuracy, 0.0);
        assert_eq!(
            report
                .category(ClassificationKind::Topic)
                .unwrap()
                .confusion
                .unlisted_predictions,
            vec![1]
        );
    }

    #[test]
    fn documents_are_keyed_by_category_name() {
        let rows = vec![agreeing(1, "Nötr", "Nötr")];
        let report = AccuracyEvaluator::evaluate(&rows).unwrap();

        let metrics = serde_json::to_value(report.metrics_document()).unwrap();
        assert_eq!(metrics["sentiment"]["accuracy"], 1.0);
        assert_eq!(metrics["answered"]["target_achieved"], true);
        assert!(metrics["topic"].get("gap").is_none());

        let confusion = serde_json::to_value(report.confusion_document()).unwrap();
        assert_eq!(confusion["topic"]["labels"][0], "Genel Bilgi");
        assert_eq!(confusion["topic"]["matrix"][0][0], 1);
    }

    fn label_strategy() -> impl Strategy<Value = &'static str> {
        prop_oneof![Just("Pozitif"), Just("Negatif"), Just("Nötr"), Just("Error")]
    }

    fn row_strategy() -> impl Strategy<Value = DatasetRow> {
        (
            label_strategy(),
            label_strategy(),
            proptest::option::weighted(0.85, label_strategy()),
        )
            .prop_map(|(machine, human, answered)| {
                labeled_row(
                    0,
                    [machine, machine, "Evet"],
                    [Some(human), Some(human), answered],
                )
            })
    }

    proptest! {
        #[test]
        fn metrics_are_bounded_and_rows_sum_to_support(
            rows in proptest::collection::vec(row_strategy(), 1..60)
        ) {
            let Ok(report) = AccuracyEvaluator::evaluate(&rows) else {
                return Ok(());
            };
            let labeled: Vec<&DatasetRow> = rows.iter().filter(|r| r.is_fully_labeled()).collect();

            for (kind, category) in &report.categories {
                let m = category.metrics;
                for value in [m.accuracy, m.precision, m.recall, m.f1] {
                    prop_assert!((0.0..=1.0 + 1e-12).contains(&value));
                }
                for (i, label) in category.confusion.labels.iter().enumerate() {
                    let support = labeled
                        .iter()
                        .filter(|r| r.human_label(*kind) == Some(label.as_str()))
                        .count() as u64;
                    prop_assert_eq!(category.confusion.row_total(i), support);
                }
            }
        }

        #[test]
        fn evaluate_is_deterministic(
            rows in proptest::collection::vec(row_strategy(), 1..40)
        ) {
            let first = AccuracyEvaluator::evaluate(&rows);
            let second = AccuracyEvaluator::evaluate(&rows);
            prop_assert_eq!(first, second);
        }
    }
}
