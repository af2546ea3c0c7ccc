//! Agreement metrics for one category.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Accuracy plus support-weighted precision, recall and F1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

#[derive(Default)]
struct LabelCounts {
    support: u64,
    predicted: u64,
    true_positive: u64,
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl CategoryMetrics {
    /// Computes metrics from `(human, machine)` pairs using exact string equality.
    ///
    /// Each label's precision/recall/F1 is weighted by how often humans
    /// assigned it. A label never predicted has precision 0; an empty input
    /// yields all zeros.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let total = pairs.len() as u64;
        let mut counts: BTreeMap<&str, LabelCounts> = BTreeMap::new();
        let mut correct = 0u64;

        for &(human, machine) in pairs {
            counts.entry(human).or_default().support += 1;
            counts.entry(machine).or_default().predicted += 1;
            if human == machine {
                correct += 1;
                counts.entry(human).or_default().true_positive += 1;
            }
        }

        let (mut precision, mut recall, mut f1) = (0.0, 0.0, 0.0);
        for c in counts.values() {
            if c.support == 0 {
                continue;
            }
            let weight = ratio(c.support, total);
            let p = ratio(c.true_positive, c.predicted);
            let r = ratio(c.true_positive, c.support);
            let f = if p + r > 0.0 { 2.0 * p * r / (p + r) } else { 0.0 };
            precision += weight * p;
            recall += weight * r;
            f1 += weight * f;
        }

        Self {
            accuracy: ratio(correct, total),
            precision,
            recall,
            f1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn perfect_agreement_scores_one() {
        let m = CategoryMetrics::from_pairs(&[("a", "a"), ("b", "b"), ("b", "b")]);
        assert!(close(m.accuracy, 1.0));
        assert!(close(m.precision, 1.0));
        assert!(close(m.recall, 1.0));
        assert!(close(m.f1, 1.0));
    }

    #[test]
    fn weighted_averages_match_hand_computation() {
        // truth a,a,b,b ; predicted a,b,b,b
        // a: p=1/1, r=1/2, f=2/3 ; b: p=2/3, r=1, f=0.8 ; weights 0.5 / 0.5
        let m = CategoryMetrics::from_pairs(&[("a", "a"), ("a", "b"), ("b", "b"), ("b", "b")]);
        assert!(close(m.accuracy, 0.75));
        assert!(close(m.precision, 0.5 * 1.0 + 0.5 * (2.0 / 3.0)));
        assert!(close(m.recall, 0.5 * 0.5 + 0.5 * 1.0));
        assert!(close(m.f1, 0.5 * (2.0 / 3.0) + 0.5 * 0.8));
    }

    #[test]
    fn never_predicted_label_contributes_zero() {
        let m = CategoryMetrics::from_pairs(&[("a", "b"), ("a", "b")]);
        assert!(close(m.accuracy, 0.0));
        assert!(close(m.precision, 0.0));
        assert!(close(m.recall, 0.0));
        assert!(close(m.f1, 0.0));
    }

    #[test]
    fn empty_input_is_all_zero() {
        let m = CategoryMetrics::from_pairs(&[]);
        assert_eq!(m.accuracy, 0.0);
        assert_eq!(m.f1, 0.0);
    }
}
