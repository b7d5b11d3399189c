//! Error types for the KYC fraud pipeline library

use crate::rules::RuleThresholds;
use thiserror::Error;

/// Result type alias for library operations
pub type Result<T> = std::result::Result<T, KycError>;

/// Typed failures raised by the pipeline components.
///
/// Stage-level code wraps these with `anyhow` context before aborting a run.
#[derive(Debug, Error)]
pub enum KycError {
    #[error("Insufficient training data: {0}")]
    InsufficientData(String),

    #[error("Model has not been fitted")]
    NotFitted,

    #[error("Feature dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Model artifact schema mismatch: expected {expected:?}, found {found:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Model artifact thresholds {found:?} differ from configured {expected:?}")]
    ThresholdMismatch {
        expected: RuleThresholds,
        found: RuleThresholds,
    },

    #[error("Non-finite feature value in column {column}")]
    NonFiniteFeature { column: String },

    #[error("Model error: {0}")]
    Model(String),

    #[error("Unsupported model artifact version {found} (expected {expected})")]
    ArtifactVersion { expected: u32, found: u32 },

    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("Invalid verification result: {0}")]
    InvalidVerification(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Artifact encoding error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<aprender::AprenderError> for KycError {
    fn from(err: aprender::AprenderError) -> Self {
        KycError::Model(err.to_string())
    }
}
