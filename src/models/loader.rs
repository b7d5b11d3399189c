//! Model artifact persistence

use crate::error::{KycError, Result};
use crate::feature_extractor::FeatureExtractor;
use crate::models::inference::FraudClassifier;
use crate::rules::RuleThresholds;
use aprender::preprocessing::StandardScaler;
use aprender::tree::RandomForestClassifier;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Artifact layout version; bumped whenever the serialized shape changes
pub const ARTIFACT_VERSION: u32 = 2;

/// On-disk model artifact
#[derive(Debug, Deserialize)]
struct ModelArtifact {
    format_version: u32,
    feature_names: Vec<String>,
    thresholds: RuleThresholds,
    model: RandomForestClassifier,
    scaler: StandardScaler,
}

/// Borrowed view of [`ModelArtifact`] used when saving
#[derive(Serialize)]
struct ArtifactRef<'a> {
    format_version: u32,
    feature_names: &'a [String],
    thresholds: RuleThresholds,
    model: &'a RandomForestClassifier,
    scaler: &'a StandardScaler,
}

/// Saves and loads the `(model, scaler)` pair as a single bincode file.
///
/// The artifact records the feature names and the transaction thresholds
/// behind the indicator features it was trained on. Loading rejects an
/// artifact whose schema or thresholds differ from the extractor's.
#[derive(Debug, Clone, Default)]
pub struct ModelLoader {
    extractor: FeatureExtractor,
}

impl ModelLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extractor(extractor: FeatureExtractor) -> Self {
        Self { extractor }
    }

    /// Persist a fitted classifier, creating parent directories as needed
    pub fn save<P: AsRef<Path>>(&self, path: P, classifier: &FraudClassifier) -> Result<()> {
        self.save_parts(path, classifier.model(), classifier.scaler())
    }

    pub fn save_parts<P: AsRef<Path>>(
        &self,
        path: P,
        model: &RandomForestClassifier,
        scaler: &StandardScaler,
    ) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let feature_names = self.extractor.feature_names();
        let artifact = ArtifactRef {
            format_version: ARTIFACT_VERSION,
            feature_names: &feature_names,
            thresholds: self.extractor.thresholds(),
            model,
            scaler,
        };

        let mut writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(&mut writer, &artifact)?;
        writer.flush()?;

        info!(path = %path.display(), "Model artifact saved");
        Ok(())
    }

    /// Load the `(model, scaler)` pair
    pub fn load_parts<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<(RandomForestClassifier, StandardScaler)> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading model artifact");

        let reader = BufReader::new(File::open(path)?);
        let artifact: ModelArtifact = bincode::deserialize_from(reader)?;

        if artifact.format_version != ARTIFACT_VERSION {
            return Err(KycError::ArtifactVersion {
                expected: ARTIFACT_VERSION,
                found: artifact.format_version,
            });
        }
        let expected = self.extractor.feature_names();
        if artifact.feature_names != expected {
            return Err(KycError::SchemaMismatch {
                expected,
                found: artifact.feature_names,
            });
        }
        let configured = self.extractor.thresholds();
        if artifact.thresholds != configured {
            return Err(KycError::ThresholdMismatch {
                expected: configured,
                found: artifact.thresholds,
            });
        }

        info!(
            features = artifact.feature_names.len(),
            amount_threshold = artifact.thresholds.amount,
            count_threshold = artifact.thresholds.count,
            "Model artifact loaded"
        );
        Ok((artifact.model, artifact.scaler))
    }

    /// Load the artifact as a ready-to-use classifier
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<FraudClassifier> {
        let (model, scaler) = self.load_parts(path)?;
        FraudClassifier::with_extractor(model, scaler, self.extractor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aprender::Transformer;

    fn fitted_classifier() -> FraudClassifier {
        let x: Vec<Vec<f64>> = (0..40)
            .map(|i| {
                let amount = 2_500.0 * i as f64;
                let high = f64::from(u8::from(amount > 50_000.0));
                vec![(i % 7) as f64, amount, high, 0.0, 1.0, 1.0]
            })
            .collect();
        let y: Vec<usize> = x.iter().map(|row| row[2] as usize).collect();

        let matrix = FeatureExtractor::new().to_matrix(&x).unwrap();
        let mut scaler = StandardScaler::new();
        let scaled = scaler.fit_transform(&matrix).unwrap();
        let mut model = RandomForestClassifier::new(8).with_random_state(42);
        model.fit(&scaled, &y).unwrap();
        FraudClassifier::from_parts(model, scaler).unwrap()
    }

    #[test]
    fn test_round_trip_predictions_are_identical() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("model.bin");
        let classifier = fitted_classifier();
        let loader = ModelLoader::new();

        loader.save(&path, &classifier).unwrap();
        let restored = loader.load(&path).unwrap();

        let rows = vec![
            vec![3.0, 12_000.0, 0.0, 0.0, 1.0, 1.0],
            vec![5.0, 80_000.0, 1.0, 0.0, 1.0, 0.0],
            vec![31.0, 50_000.0, 0.0, 1.0, 0.0, 1.0],
        ];
        let before = classifier.predict_features(&rows).unwrap();
        let after = restored.predict_features(&rows).unwrap();
        for (b, a) in before.iter().zip(&after) {
            assert_eq!(b.fraud_probability.to_bits(), a.fraud_probability.to_bits());
            assert_eq!(b.label, a.label);
        }
        assert_eq!(restored.scaler().mean(), classifier.scaler().mean());
        assert_eq!(restored.scaler().std(), classifier.scaler().std());
    }

    #[test]
    fn test_schema_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        let classifier = fitted_classifier();

        let stale_names = vec!["TxnCount".to_string(), "TxnAmount".to_string()];
        let artifact = ArtifactRef {
            format_version: ARTIFACT_VERSION,
            feature_names: &stale_names,
            thresholds: RuleThresholds::default(),
            model: classifier.model(),
            scaler: classifier.scaler(),
        };
        fs::write(&path, bincode::serialize(&artifact).unwrap()).unwrap();

        let result = ModelLoader::new().load_parts(&path);
        assert!(matches!(result, Err(KycError::SchemaMismatch { .. })));
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        let classifier = fitted_classifier();

        let names = FeatureExtractor::new().feature_names();
        let artifact = ArtifactRef {
            format_version: ARTIFACT_VERSION + 1,
            feature_names: &names,
            thresholds: RuleThresholds::default(),
            model: classifier.model(),
            scaler: classifier.scaler(),
        };
        fs::write(&path, bincode::serialize(&artifact).unwrap()).unwrap();

        assert!(matches!(
            ModelLoader::new().load(&path),
            Err(KycError::ArtifactVersion { found, .. }) if found == ARTIFACT_VERSION + 1
        ));
    }

    #[test]
    fn test_threshold_mismatch_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");
        ModelLoader::new().save(&path, &fitted_classifier()).unwrap();

        let stricter = RuleThresholds {
            amount: 10_000.0,
            count: 30,
        };
        let loader = ModelLoader::with_extractor(FeatureExtractor::with_thresholds(stricter));
        match loader.load(&path) {
            Err(KycError::ThresholdMismatch { expected, found }) => {
                assert_eq!(expected, stricter);
                assert_eq!(found, RuleThresholds::default());
            }
            other => panic!("expected threshold mismatch, got {:?}", other.err()),
        }

        assert!(ModelLoader::new().load(&path).is_ok());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = ModelLoader::new().load(dir.path().join("absent.bin"));
        assert!(matches!(result, Err(KycError::Io(_))));
    }
}
