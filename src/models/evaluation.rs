//! Hold-out evaluation of the fraud classifier

use aprender::metrics::classification::{accuracy, confusion_matrix, f1_score, Average};
use serde::Serialize;
use tracing::info;

/// Precision, recall and F1 for one class
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Accuracy plus per-class metrics, indexed by class (0 = valid, 1 = fraud)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub accuracy: f64,
    pub weighted_f1: f64,
    pub classes: [ClassMetrics; 2],
}

impl ClassificationReport {
    /// Build a report from true and predicted labels.
    ///
    /// Returns `None` for an empty or mismatched evaluation set. Undefined
    /// precision or recall (zero denominator) is reported as 0.
    pub fn from_predictions(y_true: &[usize], y_pred: &[usize]) -> Option<Self> {
        if y_true.is_empty() || y_true.len() != y_pred.len() {
            return None;
        }

        // cm[t][p]: rows are true labels, columns predictions
        let cm = confusion_matrix(y_pred, y_true);
        let n = cm.n_rows();
        let cell = |t: usize, p: usize| if t < n && p < n { cm.get(t, p) } else { 0 };

        let metrics_for = |class: usize| {
            let tp = cell(class, class);
            let fp: usize = (0..n).filter(|&t| t != class).map(|t| cell(t, class)).sum();
            let support: usize = (0..n).map(|p| cell(class, p)).sum();

            let precision = ratio(tp, tp + fp);
            let recall = ratio(tp, support);
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };
            ClassMetrics {
                precision,
                recall,
                f1,
                support,
            }
        };

        Some(Self {
            accuracy: f64::from(accuracy(y_pred, y_true)),
            weighted_f1: f64::from(f1_score(y_pred, y_true, Average::Weighted)),
            classes: [metrics_for(0), metrics_for(1)],
        })
    }

    /// Log the report
    pub fn log(&self) {
        info!(
            accuracy = format!("{:.2}", self.accuracy),
            weighted_f1 = format!("{:.2}", self.weighted_f1),
            "Model accuracy"
        );
        for (name, m) in ["Valid", "Fraud"].iter().zip(&self.classes) {
            info!(
                class = name,
                precision = format!("{:.2}", m.precision),
                recall = format!("{:.2}", m.recall),
                f1 = format!("{:.2}", m.f1),
                support = m.support,
                "Classification report"
            );
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}
