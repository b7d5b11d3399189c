//! Identity verification: document OCR, face checks and the merge into
//! the rule verdicts.
//!
//! The OCR and face services sit behind [`DocumentReader`], [`FaceDetector`]
//! and [`VerificationScorer`]; [`simulated`] provides the local stand-ins.

pub mod document;
pub mod merger;
pub mod simulated;

pub use document::DocumentParser;
pub use merger::{VerificationMerger, VerificationThresholds};
pub use simulated::{FileFaceDetector, SimulatedScorer, TranscriptReader};

use crate::config::VerificationConfig;
use crate::error::Result;
use crate::types::{ExtractedFields, VerificationResult};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// A face found in an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceDescriptor {
    pub source: PathBuf,
    pub image_bytes: u64,
}

/// Extracts raw text from a document image
pub trait DocumentReader {
    fn read_text(&self, path: &Path) -> Result<String>;
}

/// Locates a face in an image; `None` when there is none
pub trait FaceDetector {
    fn detect_face(&self, path: &Path) -> Option<FaceDescriptor>;
}

/// Produces the verification scores
pub trait VerificationScorer {
    fn authenticity(&mut self, fields: &ExtractedFields) -> f64;

    fn face_match(
        &mut self,
        document_face: Option<&FaceDescriptor>,
        live_face: Option<&FaceDescriptor>,
    ) -> f64;

    /// `None` when the capability has no liveness check
    fn liveness(&mut self, live_face: Option<&FaceDescriptor>) -> Option<f64>;
}

/// Runs one document/selfie pair through the verification capability.
pub struct VerificationService {
    reader: Box<dyn DocumentReader>,
    detector: Box<dyn FaceDetector>,
    scorer: Box<dyn VerificationScorer>,
    parser: DocumentParser,
    default_liveness: f64,
}

impl VerificationService {
    pub fn new(
        reader: Box<dyn DocumentReader>,
        detector: Box<dyn FaceDetector>,
        scorer: Box<dyn VerificationScorer>,
        default_liveness: f64,
    ) -> Result<Self> {
        Ok(Self {
            reader,
            detector,
            scorer,
            parser: DocumentParser::new()?,
            default_liveness,
        })
    }

    /// Service backed by the simulated capability
    pub fn simulated(config: &VerificationConfig) -> Result<Self> {
        Self::new(
            Box::new(TranscriptReader),
            Box::new(FileFaceDetector),
            Box::new(SimulatedScorer::from_config(config)),
            config.default_liveness_score,
        )
    }

    /// Read the document's fields, or the OCR error sentinel on failure
    pub fn extract_fields(&self, document: Option<&Path>) -> ExtractedFields {
        let Some(path) = document else {
            warn!("No document supplied, using OCR error fields");
            return ExtractedFields::ocr_error();
        };

        match self.reader.read_text(path) {
            Ok(text) => self.parser.parse(&text),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Document OCR failed");
                ExtractedFields::ocr_error()
            }
        }
    }

    /// Verify a document against a selfie
    pub fn verify(&mut self, document: Option<&Path>, selfie: Option<&Path>) -> VerificationResult {
        let fields = self.extract_fields(document);
        let authenticity_score = self.scorer.authenticity(&fields);

        let document_face = document.and_then(|p| self.detector.detect_face(p));
        let live_face = selfie.and_then(|p| self.detector.detect_face(p));
        let face_match_confidence = self
            .scorer
            .face_match(document_face.as_ref(), live_face.as_ref());
        let liveness_score = self
            .scorer
            .liveness(live_face.as_ref())
            .unwrap_or(self.default_liveness);

        info!(
            authenticity = format!("{:.3}", authenticity_score),
            liveness = format!("{:.3}", liveness_score),
            face_match = format!("{:.3}", face_match_confidence),
            ocr_error = fields.is_ocr_error(),
            "Identity verification complete"
        );

        VerificationResult {
            authenticity_score,
            liveness_score,
            face_match_confidence,
            extracted_fields: Some(fields),
        }
    }
}
