//! Markdown rendering of an accuracy report.

use crate::domain::labels::ClassificationKind;

use super::{AccuracyReport, TARGET_ACCURACY};

fn pct(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}

fn suggestion(kind: ClassificationKind) -> &'static str {
    match kind {
        ClassificationKind::Sentiment => {
            "Add borderline examples (polite complaints, neutral thanks) to the sentiment prompt."
        }
        ClassificationKind::Topic => {
            "Review the most confused category pairs and add examples that separate them."
        }
        ClassificationKind::Answered => {
            "Check role labels in the transcript; widen the context shown for follow-up replies."
        }
    }
}

/// Renders the report as a markdown document.
pub fn render_markdown(report: &AccuracyReport) -> String {
    let mut out = String::new();
    out.push_str("# Classification Accuracy Report\n\n");
    out.push_str(&format!(
        "Evaluated rows: {} (excluded: {})  \n",
        report.evaluated_rows, report.excluded_rows
    ));
    out.push_str(&format!("Overall accuracy: {}  \n", pct(report.overall_accuracy)));
    out.push_str(&format!("Target: {}\n\n", pct(TARGET_ACCURACY)));

    out.push_str("## Metrics\n\n");
    out.push_str("| Category | Accuracy | Precision | Recall | F1 | Status |\n");
    out.push_str("|---|---|---|---|---|---|\n");
    for (kind, c) in &report.categories {
        let status = match c.gap {
            None => "achieved".to_string(),
            Some(gap) => format!("missed by {}", pct(gap)),
        };
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            kind,
            pct(c.metrics.accuracy),
            pct(c.metrics.precision),
            pct(c.metrics.recall),
            pct(c.metrics.f1),
            status
        ));
    }

    let missed: Vec<_> = report
        .categories
        .iter()
        .filter(|(_, c)| !c.target_achieved)
        .collect();

    out.push_str("\n## Suggestions\n\n");
    if missed.is_empty() {
        out.push_str("All categories meet the target.\n");
        return out;
    }
    for (kind, c) in missed {
        out.push_str(&format!("### {}\n\n", kind));
        out.push_str(&format!("- {}\n", suggestion(*kind)));
        for (truth, predicted, count) in c.confusion.top_confusions(3) {
            out.push_str(&format!("- `{}` labeled as `{}`: {} rows\n", truth, predicted, count));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::evaluation::report::tests::labeled_row;
    use crate::domain::evaluation::AccuracyEvaluator;

    #[test]
    fn passing_report_has_no_per_category_suggestions() {
        let rows = vec![labeled_row(
            1,
            ["Nötr", "Diğer", "Evet"],
            [Some("Nötr"), Some("Diğer"), Some("Evet")],
        )];
        let md = render_markdown(&AccuracyEvaluator::evaluate(&rows).unwrap());

        assert!(md.contains("| sentiment | 100.0% |"));
        assert!(md.contains("All categories meet the target."));
    }

    #[test]
    fn missed_category_gets_a_suggestion_section() {
        let rows = vec![
            labeled_row(1, ["Nötr", "Gelinlik", "Evet"], [Some("Nötr"), Some("Davetiye"), Some("Evet")]),
            labeled_row(2, ["Nötr", "Davetiye", "Evet"], [Some("Nötr"), Some("Davetiye"), Some("Evet")]),
        ];
        let md = render_markdown(&AccuracyEvaluator::evaluate(&rows).unwrap());

        assert!(md.contains("| topic | 50.0% |"));
        assert!(md.contains("missed by 45.0%"));
        assert!(md.contains("### topic"));
        assert!(!md.contains("### sentiment"));
    }
}
