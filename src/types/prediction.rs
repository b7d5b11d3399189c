//! Classifier output

use serde::{Deserialize, Serialize};
use std::fmt;

/// Class predicted by the fraud classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredictionLabel {
    Fraud,
    Valid,
}

impl PredictionLabel {
    /// Label for a binary class index (1 = fraud)
    pub fn from_class(class: u8) -> Self {
        if class == 1 {
            PredictionLabel::Fraud
        } else {
            PredictionLabel::Valid
        }
    }

    pub fn is_fraud(self) -> bool {
        self == PredictionLabel::Fraud
    }
}

impl fmt::Display for PredictionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictionLabel::Fraud => f.write_str("Fraud"),
            PredictionLabel::Valid => f.write_str("Valid"),
        }
    }
}

/// Predicted label plus the model's probability of the `Fraud` class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FraudPrediction {
    pub label: PredictionLabel,
    pub fraud_probability: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_from_class() {
        assert_eq!(PredictionLabel::from_class(1), PredictionLabel::Fraud);
        assert_eq!(PredictionLabel::from_class(0), PredictionLabel::Valid);
        assert_eq!(PredictionLabel::Fraud.to_string(), "Fraud");
    }
}
