//! Type definitions for the KYC fraud pipeline

pub mod prediction;
pub mod record;
pub mod verdict;
pub mod verification;

pub use prediction::{FraudPrediction, PredictionLabel};
pub use record::{KycRecord, ProcessedRecord, RawRecord};
pub use verdict::{RuleFlag, RuleVerdict};
pub use verification::{ExtractedFields, VerificationFeatures, VerificationResult};
