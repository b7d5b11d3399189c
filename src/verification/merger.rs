//! Merges a verification result into processed records

use crate::config::VerificationConfig;
use crate::rules::reasons;
use crate::types::{ProcessedRecord, RuleVerdict, VerificationFeatures, VerificationResult};
use tracing::info;

/// Scores strictly below these thresholds fail the check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerificationThresholds {
    pub authenticity: f64,
    pub liveness: f64,
    pub face_match: f64,
}

impl Default for VerificationThresholds {
    fn default() -> Self {
        Self {
            authenticity: 0.5,
            liveness: 0.5,
            face_match: 0.6,
        }
    }
}

impl From<&VerificationConfig> for VerificationThresholds {
    fn from(config: &VerificationConfig) -> Self {
        Self {
            authenticity: config.authenticity_threshold,
            liveness: config.liveness_threshold,
            face_match: config.face_match_threshold,
        }
    }
}

/// Writes verification columns onto records and runs the second rule pass.
///
/// One result is broadcast to every record in the batch: all rows receive
/// the same scores, and only the mismatch flags differ per row.
#[derive(Debug, Clone, Copy, Default)]
pub struct VerificationMerger {
    thresholds: VerificationThresholds,
}

impl VerificationMerger {
    pub fn new(thresholds: VerificationThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> VerificationThresholds {
        self.thresholds
    }

    /// Verification columns for one record
    pub fn features(
        &self,
        record: &ProcessedRecord,
        result: &VerificationResult,
    ) -> VerificationFeatures {
        let (name, dob) = result
            .extracted_fields
            .as_ref()
            .map_or(("", ""), |f| (f.name.as_str(), f.dob.as_str()));

        VerificationFeatures {
            authenticity_score: result.authenticity_score,
            liveness_score: result.liveness_score,
            face_match_confidence: result.face_match_confidence,
            name_mismatch: record.record.name != name,
            dob_mismatch: record.record.dob != dob,
        }
    }

    /// Second rule pass over the verification columns
    pub fn evaluate(&self, features: &VerificationFeatures) -> RuleVerdict {
        let t = &self.thresholds;
        let checks = [
            (features.authenticity_score < t.authenticity, reasons::LOW_AUTHENTICITY),
            (features.liveness_score < t.liveness, reasons::LIVENESS_FAILED),
            (features.face_match_confidence < t.face_match, reasons::FACE_MATCH_FAILED),
            (features.name_mismatch, reasons::NAME_MISMATCH),
        ];

        RuleVerdict::from_reasons(
            checks
                .into_iter()
                .filter_map(|(fired, reason)| fired.then_some(reason)),
        )
    }

    /// Merge the result into every record
    pub fn merge(
        &self,
        records: Vec<ProcessedRecord>,
        result: &VerificationResult,
    ) -> Vec<ProcessedRecord> {
        let before = records.iter().filter(|r| r.verdict.is_suspicious()).count();

        let merged: Vec<ProcessedRecord> = records
            .into_iter()
            .map(|mut record| {
                let features = self.features(&record, result);
                let second_pass = self.evaluate(&features);
                record.verdict = record.verdict.merge(second_pass);
                record.verification = Some(features);
                record
            })
            .collect();

        let after = merged.iter().filter(|r| r.verdict.is_suspicious()).count();
        info!(
            records = merged.len(),
            suspicious_before = before,
            suspicious_after = after,
            "Verification features merged"
        );
        merged
    }
}
