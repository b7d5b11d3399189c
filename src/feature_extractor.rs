//! Feature extraction for fraud classifier training and inference.
//!
//! Both training and inference go through this module so the feature
//! order stays identical across a saved model artifact.

use crate::error::{KycError, Result};
use crate::rules::RuleThresholds;
use crate::types::KycRecord;
use aprender::primitives::Matrix;

/// Number of features produced per record
pub const FEATURE_COUNT: usize = 6;

/// Feature names, in extraction order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "TxnCount",
    "TxnAmount",
    "HighTxnAmount",
    "HighTxnCount",
    "PAN_Valid",
    "Email_Valid",
];

/// Length of a well-formed PAN
const PAN_LEN: usize = 10;

/// Transforms records into model input features.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureExtractor {
    thresholds: RuleThresholds,
}

impl FeatureExtractor {
    /// Create a feature extractor using the default transaction thresholds.
    pub fn new() -> Self {
        Self::with_thresholds(RuleThresholds::default())
    }

    pub fn with_thresholds(thresholds: RuleThresholds) -> Self {
        Self { thresholds }
    }

    /// Thresholds behind the `HighTxnAmount` and `HighTxnCount` features
    pub fn thresholds(&self) -> RuleThresholds {
        self.thresholds
    }

    /// Extract features from a record.
    ///
    /// The boolean features are encoded as 0.0 / 1.0. `PAN_Valid` only checks
    /// the length and `Email_Valid` only checks for an `@`.
    pub fn extract(&self, record: &KycRecord) -> Vec<f64> {
        let mut features = Vec::with_capacity(FEATURE_COUNT);

        features.push(f64::from(record.txn_count));
        features.push(record.txn_amount);
        features.push(indicator(record.txn_amount > self.thresholds.amount));
        features.push(indicator(record.txn_count > self.thresholds.count));
        features.push(indicator(record.pan.chars().count() == PAN_LEN));
        features.push(indicator(record.email.contains('@')));

        features
    }

    /// Extract features for a batch of records.
    pub fn extract_batch<'a, I>(&self, records: I) -> Vec<Vec<f64>>
    where
        I: IntoIterator<Item = &'a KycRecord>,
    {
        records.into_iter().map(|r| self.extract(r)).collect()
    }

    /// Pack feature rows into the `f32` matrix the classifier consumes.
    ///
    /// Rejects rows of the wrong width and values that are not finite once
    /// narrowed to `f32`.
    pub fn to_matrix(&self, rows: &[Vec<f64>]) -> Result<Matrix<f32>> {
        let mut data = Vec::with_capacity(rows.len() * FEATURE_COUNT);
        for row in rows {
            if row.len() != FEATURE_COUNT {
                return Err(KycError::DimensionMismatch {
                    expected: FEATURE_COUNT,
                    actual: row.len(),
                });
            }
            for (&value, name) in row.iter().zip(FEATURE_NAMES) {
                let narrowed = value as f32;
                if !narrowed.is_finite() {
                    return Err(KycError::NonFiniteFeature {
                        column: name.to_string(),
                    });
                }
                data.push(narrowed);
            }
        }
        Matrix::from_vec(rows.len(), FEATURE_COUNT, data)
            .map_err(|e| KycError::Model(e.to_string()))
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }

    /// Get feature names in extraction order.
    pub fn feature_names(&self) -> Vec<String> {
        FEATURE_NAMES.iter().map(|n| n.to_string()).collect()
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn indicator(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}
