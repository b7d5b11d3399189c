//! Identity verification data structures

use serde::{Deserialize, Serialize};

/// Value of every extracted field when OCR fails
pub const OCR_ERROR: &str = "OCR_Error";

/// Value of an extracted field the parser could not find
pub const NOT_AVAILABLE: &str = "N/A";

/// Fields read off an identity document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedFields {
    pub name: String,
    pub dob: String,
    pub document_id: String,
    pub address: String,
    pub expiry_date: String,
    pub document_type: String,
    pub gender: String,
}

impl ExtractedFields {
    /// All fields set to `N/A`
    pub fn not_available() -> Self {
        Self::filled(NOT_AVAILABLE)
    }

    /// Sentinel returned when the OCR call fails
    pub fn ocr_error() -> Self {
        Self::filled(OCR_ERROR)
    }

    pub fn is_ocr_error(&self) -> bool {
        self == &Self::ocr_error()
    }

    fn filled(value: &str) -> Self {
        Self {
            name: value.to_string(),
            dob: value.to_string(),
            document_id: value.to_string(),
            address: value.to_string(),
            expiry_date: value.to_string(),
            document_type: value.to_string(),
            gender: value.to_string(),
        }
    }
}

/// Output of the external verification capability for one
/// document/selfie pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    /// Confidence the document is genuine (0.0 - 1.0)
    pub authenticity_score: f64,
    /// Confidence the selfie shows a live person (0.0 - 1.0)
    pub liveness_score: f64,
    /// Similarity between document face and selfie face (0.0 - 1.0)
    pub face_match_confidence: f64,
    /// OCR fields; `None` compares as empty strings
    pub extracted_fields: Option<ExtractedFields>,
}

/// Verification columns written onto each record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerificationFeatures {
    pub authenticity_score: f64,
    pub liveness_score: f64,
    pub face_match_confidence: f64,
    /// Record name differs from the extracted name
    pub name_mismatch: bool,
    /// Record birth date differs from the extracted birth date
    pub dob_mismatch: bool,
}
