//! Fraud classifier training

use crate::config::ModelConfig;
use crate::error::{KycError, Result};
use crate::feature_extractor::FeatureExtractor;
use crate::models::evaluation::ClassificationReport;
use crate::models::inference::FraudClassifier;
use crate::models::split::{ensure_both_classes, select, stratified_split};
use crate::types::ProcessedRecord;
use aprender::preprocessing::StandardScaler;
use aprender::traits::Transformer;
use aprender::tree::RandomForestClassifier;
use tracing::{info, warn};

/// Result of a training run
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub classifier: FraudClassifier,
    /// Hold-out metrics; `None` when the test split is empty
    pub report: Option<ClassificationReport>,
    /// Class forced into the labels when only one was present
    pub injected_class: Option<usize>,
    pub train_size: usize,
    pub test_size: usize,
}

/// Trains the scaler and forest on processed records.
///
/// Labels come from the rule verdict (1 = suspicious), so the model learns
/// to reproduce the rule engine.
pub struct ModelTrainer {
    config: ModelConfig,
    extractor: FeatureExtractor,
}

impl ModelTrainer {
    pub fn new(config: ModelConfig, extractor: FeatureExtractor) -> Self {
        Self { config, extractor }
    }

    /// Features and labels for the records, after minority injection
    pub fn prepare(
        &self,
        records: &[ProcessedRecord],
    ) -> (Vec<Vec<f64>>, Vec<usize>, Option<usize>) {
        let features = self
            .extractor
            .extract_batch(records.iter().map(|r| &r.record));
        let mut labels: Vec<usize> = records
            .iter()
            .map(|r| usize::from(r.verdict.is_suspicious()))
            .collect();
        let injected = ensure_both_classes(&mut labels);
        (features, labels, injected)
    }

    pub fn train(&self, records: &[ProcessedRecord]) -> Result<TrainingOutcome> {
        if records.len() < 2 {
            return Err(KycError::InsufficientData(format!(
                "need at least 2 records to train, got {}",
                records.len()
            )));
        }

        let (features, labels, injected_class) = self.prepare(records);
        let (train_idx, test_idx) =
            stratified_split(&labels, self.config.test_size, self.config.seed);

        let x_train = select(&features, &train_idx);
        let y_train = select(&labels, &train_idx);
        let x_test = select(&features, &test_idx);
        let y_test = select(&labels, &test_idx);

        info!(
            train = x_train.len(),
            test = x_test.len(),
            fraud_rate = format!(
                "{:.3}",
                labels.iter().filter(|&&l| l == 1).count() as f64 / labels.len() as f64
            ),
            "Training fraud classifier"
        );

        let mut scaler = StandardScaler::new();
        let x_train_scaled = scaler.fit_transform(&self.extractor.to_matrix(&x_train)?)?;

        let mut model = RandomForestClassifier::new(self.config.n_estimators)
            .with_random_state(self.config.seed);
        if let Some(depth) = self.config.max_depth {
            model = model.with_max_depth(depth);
        }
        model.fit(&x_train_scaled, &y_train)?;

        let classifier = FraudClassifier::with_extractor(model, scaler, self.extractor)?;

        let report = if x_test.is_empty() {
            warn!("Test split is empty, skipping evaluation");
            None
        } else {
            let y_pred: Vec<usize> = classifier
                .predict_features(&x_test)?
                .iter()
                .map(|p| usize::from(p.label.is_fraud()))
                .collect();
            ClassificationReport::from_predictions(&y_test, &y_pred)
        };
        if let Some(report) = &report {
            report.log();
        }

        Ok(TrainingOutcome {
            classifier,
            report,
            injected_class,
            train_size: train_idx.len(),
            test_size: test_idx.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{KycRecord, RuleVerdict};

    fn config() -> ModelConfig {
        ModelConfig {
            n_estimators: 10,
            test_size: 0.2,
            seed: 42,
            max_depth: None,
        }
    }

    fn record(i: usize, suspicious: bool) -> ProcessedRecord {
        let record = KycRecord {
            customer_id: format!("c-{i}"),
            name: "Asha Rao".to_string(),
            dob: "1990-01-01".to_string(),
            pan: "KLMNO4321Z".to_string(),
            aadhaar: "4321 8765 2109".to_string(),
            email: "asha@example.com".to_string(),
            mobile: "9876543210".to_string(),
            address: String::new(),
            txn_count: (i % 50) as u32 + 1,
            txn_amount: 1_000.0 * (i % 90) as f64 + 100.0,
        };
        let verdict = if suspicious {
            RuleVerdict::from_reasons(["High transaction amount"])
        } else {
            RuleVerdict::valid()
        };
        ProcessedRecord::new(record, verdict)
    }

    #[test]
    fn test_single_class_training_succeeds() {
        let records: Vec<ProcessedRecord> = (0..30).map(|i| record(i, true)).collect();
        let trainer = ModelTrainer::new(config(), FeatureExtractor::new());

        let (_, labels, injected) = trainer.prepare(&records);
        assert_eq!(injected, Some(0));
        assert!(labels.contains(&0) && labels.contains(&1));

        let outcome = trainer.train(&records).unwrap();
        assert_eq!(outcome.injected_class, Some(0));
        assert_eq!(outcome.train_size + outcome.test_size, 30);
    }

    #[test]
    fn test_learns_amount_rule() {
        let records: Vec<ProcessedRecord> = (0..200)
            .map(|i| {
                let r = record(i, false);
                let suspicious = r.record.txn_amount > 50_000.0;
                record(i, suspicious)
            })
            .collect();
        let trainer = ModelTrainer::new(config(), FeatureExtractor::new());
        let outcome = trainer.train(&records).unwrap();

        assert!(outcome.injected_class.is_none());
        let report = outcome.report.unwrap();
        assert!(report.accuracy > 0.9, "accuracy {}", report.accuracy);
    }

    #[test]
    fn test_non_finite_amount_aborts_training() {
        let mut records: Vec<ProcessedRecord> = (0..40).map(|i| record(i, i % 2 == 0)).collect();
        records[0].record.txn_amount = f64::NAN;

        let trainer = ModelTrainer::new(config(), FeatureExtractor::new());
        assert!(matches!(
            trainer.train(&records),
            Err(KycError::NonFiniteFeature { .. })
        ));
    }

    #[test]
    fn test_too_few_records() {
        let trainer = ModelTrainer::new(config(), FeatureExtractor::new());
        assert!(matches!(
            trainer.train(&[record(0, true)]),
            Err(KycError::InsufficientData(_))
        ));
    }
}
