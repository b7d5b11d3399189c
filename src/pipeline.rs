//! End-to-end batch pipeline: generate, process, verify, train, predict.

use crate::cleaning::clean_records;
use crate::config::AppConfig;
use crate::feature_extractor::FeatureExtractor;
use crate::generator::RecordGenerator;
use crate::metrics::RunSummary;
use crate::models::{ClassificationReport, FraudClassifier, ModelLoader, ModelTrainer};
use crate::rules::{RuleEngine, RuleThresholds};
use crate::storage;
use crate::types::{ProcessedRecord, RawRecord, VerificationResult};
use crate::validation::Blacklists;
use crate::verification::{VerificationMerger, VerificationService, VerificationThresholds};
use anyhow::{bail, Context, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Everything a completed run produced
#[derive(Debug)]
pub struct PipelineOutcome {
    /// Final records with verdicts, verification columns and predictions
    pub records: Vec<ProcessedRecord>,
    pub verification: VerificationResult,
    pub report: Option<ClassificationReport>,
    pub summary: RunSummary,
}

/// Batch pipeline over one set of records and one verification result.
pub struct Pipeline {
    config: AppConfig,
    blacklists: Arc<Blacklists>,
    verifier: VerificationService,
    supplied_verification: Option<VerificationResult>,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Result<Self> {
        let verifier = VerificationService::simulated(&config.verification)
            .context("Failed to initialize verification service")?;
        Ok(Self {
            blacklists: Arc::new(config.rules.blacklists.clone()),
            config,
            verifier,
            supplied_verification: None,
        })
    }

    /// Replace the simulated verification capability
    pub fn with_verifier(mut self, verifier: VerificationService) -> Self {
        self.verifier = verifier;
        self
    }

    /// Merge this result instead of calling the verification capability
    pub fn with_verification_result(mut self, result: VerificationResult) -> Self {
        self.supplied_verification = Some(result);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn extractor(&self) -> FeatureExtractor {
        FeatureExtractor::with_thresholds(RuleThresholds::from(&self.config.rules))
    }

    /// Run every stage; the first failing stage aborts the run
    pub fn run(&mut self) -> Result<PipelineOutcome> {
        info!("Starting KYC fraud detection pipeline");
        let mut summary = RunSummary::new();

        let rows = run_stage(&mut summary, "generate", || self.load_rows())?;
        let records = run_stage(&mut summary, "process", || self.process(rows))?;
        let (records, verification) =
            run_stage(&mut summary, "verify", || self.verify(records))?;
        let (classifier, report) = run_stage(&mut summary, "train", || self.train(&records))?;
        let records = run_stage(&mut summary, "predict", || self.predict(&classifier, records))?;

        summary.record_batch(&records);
        summary.print_summary();
        info!("Pipeline completed successfully");

        Ok(PipelineOutcome {
            records,
            verification,
            report,
            summary,
        })
    }

    /// Read the uploaded file, or generate and save synthetic records
    fn load_rows(&self) -> Result<Vec<RawRecord>> {
        let paths = &self.config.paths;
        if let Some(input) = &paths.input_file {
            info!(path = %input.display(), "Reading uploaded records");
            return storage::read_rows(input)
                .with_context(|| format!("Failed to read {}", input.display()));
        }

        let count = self.config.generator.records;
        info!(count, "Generating synthetic KYC records");
        let records =
            RecordGenerator::new(self.blacklists.clone(), &self.config.generator).generate(count);
        storage::write_raw(paths.raw_path(), &records).context("Failed to write raw records")?;

        Ok(records.into_iter().map(RawRecord::from).collect())
    }

    /// Clean rows and apply the static rules
    fn process(&self, rows: Vec<RawRecord>) -> Result<Vec<ProcessedRecord>> {
        let cleaned = clean_records(rows);
        if cleaned.records.is_empty() {
            bail!("No records left after cleaning");
        }

        let engine = RuleEngine::new(
            self.blacklists.clone(),
            RuleThresholds::from(&self.config.rules),
        )?;
        let processed = engine.apply(cleaned.records);

        info!(
            records = processed.len(),
            suspicious = processed.iter().filter(|r| r.verdict.is_suspicious()).count(),
            "Static rules applied"
        );
        Ok(processed)
    }

    /// Obtain the verification result and merge it into every record
    fn verify(
        &mut self,
        records: Vec<ProcessedRecord>,
    ) -> Result<(Vec<ProcessedRecord>, VerificationResult)> {
        let result = match &self.supplied_verification {
            Some(result) => {
                info!("Using supplied verification result");
                result.clone()
            }
            None => {
                let v = &self.config.verification;
                self.verifier
                    .verify(v.document_path.as_deref(), v.selfie_path.as_deref())
            }
        };
        storage::write_verification(self.config.paths.verification_path(), &result)
            .context("Failed to write verification result")?;

        let thresholds = VerificationThresholds::from(&self.config.verification);
        let merger = VerificationMerger::new(thresholds);
        let records = merger.merge(records, &result);
        storage::write_records(self.config.paths.processed_path(), &records)
            .context("Failed to write processed records")?;

        Ok((records, result))
    }

    /// Train on the rule labels and save the artifact
    fn train(
        &self,
        records: &[ProcessedRecord],
    ) -> Result<(FraudClassifier, Option<ClassificationReport>)> {
        let extractor = self.extractor();
        let outcome = ModelTrainer::new(self.config.model.clone(), extractor).train(records)?;

        let model_path = self.config.paths.model_path();
        ModelLoader::with_extractor(extractor)
            .save(&model_path, &outcome.classifier)
            .with_context(|| format!("Failed to save model to {}", model_path.display()))?;

        info!(
            train = outcome.train_size,
            test = outcome.test_size,
            injected_class = ?outcome.injected_class,
            "Model trained and saved"
        );
        Ok((outcome.classifier, outcome.report))
    }

    fn predict(
        &self,
        classifier: &FraudClassifier,
        records: Vec<ProcessedRecord>,
    ) -> Result<Vec<ProcessedRecord>> {
        let records = classifier.annotate(records)?;
        storage::write_records(self.config.paths.final_path(), &records)
            .context("Failed to write final predictions")?;
        Ok(records)
    }
}

/// Score an existing processed record file with a saved model artifact.
pub fn predict_file(
    config: &AppConfig,
    input: &Path,
    output: &Path,
    model_path: &Path,
) -> Result<Vec<ProcessedRecord>> {
    let mut summary = RunSummary::new();

    let records = run_stage(&mut summary, "load", || {
        storage::read_records(input)
            .with_context(|| format!("Failed to read {}", input.display()))
    })?;
    let classifier = run_stage(&mut summary, "load_model", || {
        let extractor = FeatureExtractor::with_thresholds(RuleThresholds::from(&config.rules));
        ModelLoader::with_extractor(extractor)
            .load(model_path)
            .with_context(|| format!("Failed to load model from {}", model_path.display()))
    })?;
    let records = run_stage(&mut summary, "predict", || {
        let records = classifier.annotate(records)?;
        storage::write_records(output, &records).context("Failed to write predictions")?;
        Ok(records)
    })?;

    summary.record_batch(&records);
    summary.print_summary();
    Ok(records)
}

/// Time a stage and log its outcome; an error aborts the run
fn run_stage<T>(
    summary: &mut RunSummary,
    stage: &str,
    f: impl FnOnce() -> Result<T>,
) -> Result<T> {
    info!(stage, "Stage started");
    let start = Instant::now();

    match f() {
        Ok(value) => {
            let elapsed = start.elapsed();
            summary.record_stage(stage, elapsed);
            info!(stage, elapsed_ms = elapsed.as_millis() as u64, "Stage finished");
            Ok(value)
        }
        Err(e) => {
            error!(stage, error = %e, "Stage failed, aborting run");
            Err(e.context(format!("{stage} stage failed")))
        }
    }
}
