//! Static rule engine

use crate::config::RulesConfig;
use crate::error::Result;
use crate::types::{KycRecord, ProcessedRecord, RuleVerdict};
use crate::validation::{Blacklists, RecordValidator};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Reason strings emitted by the rule passes
pub mod reasons {
    pub const INVALID_PAN: &str = "Invalid PAN format";
    pub const INVALID_AADHAAR: &str = "Invalid Aadhaar format";
    pub const INVALID_EMAIL: &str = "Invalid Email";
    pub const INVALID_MOBILE: &str = "Invalid Mobile";
    pub const BLACKLISTED_PAN: &str = "Blacklisted PAN";
    pub const BLACKLISTED_AADHAAR: &str = "Blacklisted Aadhaar";
    pub const HIGH_AMOUNT: &str = "High transaction amount";
    pub const HIGH_COUNT: &str = "High transaction count";
    pub const LOW_AUTHENTICITY: &str = "Low Document Authenticity";
    pub const LIVENESS_FAILED: &str = "Liveness Check Failed";
    pub const FACE_MATCH_FAILED: &str = "Face Match Failed";
    pub const NAME_MISMATCH: &str = "Name Mismatch with ID";
}

/// Transaction thresholds; values strictly above them are flagged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleThresholds {
    pub amount: f64,
    pub count: u32,
}

impl Default for RuleThresholds {
    fn default() -> Self {
        Self {
            amount: 50_000.0,
            count: 30,
        }
    }
}

impl From<&RulesConfig> for RuleThresholds {
    fn from(config: &RulesConfig) -> Self {
        Self {
            amount: config.amount_threshold,
            count: config.count_threshold,
        }
    }
}

/// Applies the validation rules and transaction thresholds to records.
pub struct RuleEngine {
    validator: RecordValidator,
    thresholds: RuleThresholds,
}

impl RuleEngine {
    pub fn new(blacklists: Arc<Blacklists>, thresholds: RuleThresholds) -> Result<Self> {
        Ok(Self {
            validator: RecordValidator::new(blacklists)?,
            thresholds,
        })
    }

    pub fn from_config(config: &RulesConfig) -> Result<Self> {
        Self::new(Arc::new(config.blacklists.clone()), RuleThresholds::from(config))
    }

    pub fn validator(&self) -> &RecordValidator {
        &self.validator
    }

    pub fn thresholds(&self) -> RuleThresholds {
        self.thresholds
    }

    /// Evaluate every rule against a record.
    ///
    /// All checks run; the order only determines the order of reasons.
    pub fn evaluate(&self, record: &KycRecord) -> RuleVerdict {
        let v = &self.validator;
        let checks = [
            (!v.validate_pan(&record.pan), reasons::INVALID_PAN),
            (!v.validate_aadhaar(&record.aadhaar), reasons::INVALID_AADHAAR),
            (!v.validate_email(&record.email), reasons::INVALID_EMAIL),
            (!v.validate_mobile(&record.mobile), reasons::INVALID_MOBILE),
            (v.is_blacklisted_pan(&record.pan), reasons::BLACKLISTED_PAN),
            (v.is_blacklisted_aadhaar(&record.aadhaar), reasons::BLACKLISTED_AADHAAR),
            (record.txn_amount > self.thresholds.amount, reasons::HIGH_AMOUNT),
            (record.txn_count > self.thresholds.count, reasons::HIGH_COUNT),
        ];

        RuleVerdict::from_reasons(
            checks
                .into_iter()
                .filter_map(|(fired, reason)| fired.then_some(reason)),
        )
    }

    /// Evaluate a batch of cleaned records
    pub fn apply(&self, records: Vec<KycRecord>) -> Vec<ProcessedRecord> {
        records
            .into_iter()
            .map(|record| {
                let verdict = self.evaluate(&record);
                debug!(
                    customer_id = %record.customer_id,
                    flag = %verdict.flag(),
                    reasons = %verdict.reason_string(),
                    "Rules evaluated"
                );
                ProcessedRecord::new(record, verdict)
            })
            .collect()
    }
}
