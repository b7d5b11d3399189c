//! KYC Fraud Pipeline Library
//!
//! Batch screening of KYC applicant records: field validation and
//! blacklist rules, identity document and face verification merged into the
//! verdicts, and a random-forest classifier trained on the rule labels.

pub mod cleaning;
pub mod config;
pub mod error;
pub mod feature_extractor;
pub mod generator;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod rules;
pub mod storage;
pub mod types;
pub mod validation;
pub mod verification;

pub use config::AppConfig;
pub use error::{KycError, Result};
pub use feature_extractor::FeatureExtractor;
pub use models::{FraudClassifier, ModelLoader, ModelTrainer};
pub use pipeline::{Pipeline, PipelineOutcome};
pub use rules::RuleEngine;
pub use types::{KycRecord, ProcessedRecord, RuleFlag, RuleVerdict, VerificationResult};
pub use validation::{Blacklists, RecordValidator};
pub use verification::{VerificationMerger, VerificationService};
