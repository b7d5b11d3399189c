//! Fraud classifier inference

use crate::error::{KycError, Result};
use crate::feature_extractor::FeatureExtractor;
use crate::types::{FraudPrediction, KycRecord, PredictionLabel, ProcessedRecord};
use aprender::preprocessing::StandardScaler;
use aprender::primitives::Matrix;
use aprender::traits::Transformer;
use aprender::tree::RandomForestClassifier;
use tracing::debug;

/// Fraud vote share a record must exceed to be predicted as fraud
pub const FRAUD_THRESHOLD: f64 = 0.5;

/// Column of the fraud class in `predict_proba` output
const FRAUD_CLASS: usize = 1;

/// A fitted `(model, scaler)` pair plus the feature extractor feeding it.
#[derive(Debug, Clone)]
pub struct FraudClassifier {
    model: RandomForestClassifier,
    scaler: StandardScaler,
    extractor: FeatureExtractor,
}

impl FraudClassifier {
    /// Wrap a fitted model and scaler, using the default feature extractor.
    pub fn from_parts(model: RandomForestClassifier, scaler: StandardScaler) -> Result<Self> {
        Self::with_extractor(model, scaler, FeatureExtractor::new())
    }

    pub fn with_extractor(
        model: RandomForestClassifier,
        scaler: StandardScaler,
        extractor: FeatureExtractor,
    ) -> Result<Self> {
        // Importances exist only once the forest has been fitted
        let model_features = model
            .feature_importances()
            .map(|importances| importances.len())
            .ok_or(KycError::NotFitted)?;
        if !scaler.is_fitted() {
            return Err(KycError::NotFitted);
        }

        let expected = extractor.feature_count();
        for actual in [model_features, scaler.mean().len()] {
            if actual != expected {
                return Err(KycError::DimensionMismatch { expected, actual });
            }
        }

        Ok(Self {
            model,
            scaler,
            extractor,
        })
    }

    pub fn model(&self) -> &RandomForestClassifier {
        &self.model
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    pub fn into_parts(self) -> (RandomForestClassifier, StandardScaler) {
        (self.model, self.scaler)
    }

    /// Predict from unscaled feature rows
    pub fn predict_features(&self, features: &[Vec<f64>]) -> Result<Vec<FraudPrediction>> {
        if features.is_empty() {
            return Ok(Vec::new());
        }

        let scaled = self.scaler.transform(&self.extractor.to_matrix(features)?)?;
        let n_features = scaled.n_cols();

        // predict_proba walks every tree over the whole matrix once per row,
        // so rows are scored one at a time
        scaled
            .as_slice()
            .chunks(n_features)
            .map(|row| {
                let row = Matrix::from_vec(1, n_features, row.to_vec())
                    .map_err(|e| KycError::Model(e.to_string()))?;
                let proba = self.model.predict_proba(&row);
                let fraud_probability = if proba.n_cols() > FRAUD_CLASS {
                    f64::from(proba.get(0, FRAUD_CLASS))
                } else {
                    0.0
                };
                Ok(FraudPrediction {
                    label: PredictionLabel::from_class(u8::from(
                        fraud_probability > FRAUD_THRESHOLD,
                    )),
                    fraud_probability,
                })
            })
            .collect()
    }

    /// Predict for each record
    pub fn predict(&self, records: &[KycRecord]) -> Result<Vec<FraudPrediction>> {
        let features = self.extractor.extract_batch(records);
        self.predict_features(&features)
    }

    /// Attach predictions to processed records
    pub fn annotate(&self, mut records: Vec<ProcessedRecord>) -> Result<Vec<ProcessedRecord>> {
        let features = self
            .extractor
            .extract_batch(records.iter().map(|r| &r.record));
        let predictions = self.predict_features(&features)?;

        for (record, prediction) in records.iter_mut().zip(predictions) {
            record.prediction = Some(prediction);
        }

        debug!(
            records = records.len(),
            fraud = records
                .iter()
                .filter(|r| r.prediction.is_some_and(|p| p.label.is_fraud()))
                .count(),
            "Predictions attached"
        );
        Ok(records)
    }
}
