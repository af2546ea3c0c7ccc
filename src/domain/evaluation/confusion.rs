//! Confusion matrix over string labels.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Square count matrix. Rows are human (truth) labels, columns machine
/// (predicted) labels, both in the sorted order of distinct human labels.
///
/// A prediction that is not itself a human label has no column; it is
/// counted in `unlisted_predictions` for its row, so each row still sums
/// to the support of its label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub labels: Vec<String>,
    pub matrix: Vec<Vec<u64>>,
    #[serde(default, skip_serializing_if = "all_zero")]
    pub unlisted_predictions: Vec<u64>,
}

fn all_zero(counts: &[u64]) -> bool {
    counts.iter().all(|c| *c == 0)
}

impl ConfusionMatrix {
    /// Builds the matrix from `(human, machine)` pairs.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let labels: Vec<String> = pairs
            .iter()
            .map(|(human, _)| human.to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let size = labels.len();
        let mut matrix = vec![vec![0u64; size]; size];
        let mut unlisted_predictions = vec![0u64; size];

        for &(human, machine) in pairs {
            let Some(row) = labels.iter().position(|l| l == human) else {
                continue;
            };
            match labels.iter().position(|l| l == machine) {
                Some(col) => matrix[row][col] += 1,
                None => unlisted_predictions[row] += 1,
            }
        }

        Self {
            labels,
            matrix,
            unlisted_predictions,
        }
    }

    /// Total count in a row, including unlisted predictions.
    pub fn row_total(&self, row: usize) -> u64 {
        self.matrix[row].iter().sum::<u64>() + self.unlisted_predictions[row]
    }

    /// Off-diagonal cells, largest first, ties in label order.
    pub fn top_confusions(&self, limit: usize) -> Vec<(&str, &str, u64)> {
        let mut cells: Vec<(&str, &str, u64)> = Vec::new();
        for (r, truth) in self.labels.iter().enumerate() {
            for (c, predicted) in self.labels.iter().enumerate() {
                let count = self.matrix[r][c];
                if r != c && count > 0 {
                    cells.push((truth.as_str(), predicted.as_str(), count));
                }
            }
        }
        cells.sort_by(|a, b| b.2.cmp(&a.2));
        cells.truncate(limit);
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_sorted_distinct_human_labels() {
        let pairs = [("Nötr", "Pozitif"), ("Negatif", "Negatif"), ("Nötr", "Nötr")];
        let cm = ConfusionMatrix::from_pairs(&pairs);

        assert_eq!(cm.labels, vec!["Negatif", "Nötr"]);
        assert_eq!(cm.matrix, vec![vec![1, 0], vec![0, 1]]);
        assert_eq!(cm.unlisted_predictions, vec![0, 1]);
        assert_eq!(cm.row_total(1), 2);
    }

    #[test]
    fn top_confusions_orders_by_count() {
        let pairs = [
            ("Evet", "Hayır"),
            ("Evet", "Hayır"),
            ("Hayır", "Evet"),
            ("Evet", "Evet"),
        ];
        let cm = ConfusionMatrix::from_pairs(&pairs);
        assert_eq!(
            cm.top_confusions(5),
            vec![("Evet", "Hayır", 2), ("Hayır", "Evet", 1)]
        );
    }

    #[test]
    fn serialized_form_omits_empty_unlisted_counts() {
        let cm = ConfusionMatrix::from_pairs(&[("Evet", "Evet")]);
        let json = serde_json::to_value(&cm).unwrap();
        assert_eq!(json, serde_json::json!({"labels": ["Evet"], "matrix": [[1]]}));
    }
}
