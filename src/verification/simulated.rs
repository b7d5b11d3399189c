//! Simulated verification capability
//!
//! Stands in for the cloud OCR and face services: text comes from a
//! transcript file, a face is "detected" when the image file has content,
//! and scores are random draws in fixed ranges.

use super::document::parse_document_date;
use super::{DocumentReader, FaceDescriptor, FaceDetector, VerificationScorer};
use crate::config::VerificationConfig;
use crate::error::{KycError, Result};
use crate::types::ExtractedFields;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const GENUINE_AUTHENTICITY: (f64, f64) = (0.8, 0.99);
const MATCHED_FACES: (f64, f64) = (0.7, 0.95);
const UNMATCHED_FACES: (f64, f64) = (0.05, 0.3);

const BLACKLISTED_DOCUMENT_PENALTY: f64 = 0.2;
const EXPIRED_DOCUMENT_PENALTY: f64 = 0.1;

/// Reads the text of a document from a `<path>.txt` transcript next to the
/// image, or from the file itself when it is UTF-8 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TranscriptReader;

impl TranscriptReader {
    fn transcript_path(path: &Path) -> PathBuf {
        let mut name = OsString::from(path.as_os_str());
        name.push(".txt");
        PathBuf::from(name)
    }
}

impl DocumentReader for TranscriptReader {
    fn read_text(&self, path: &Path) -> Result<String> {
        let transcript = Self::transcript_path(path);
        let source = if transcript.is_file() {
            transcript
        } else {
            path.to_path_buf()
        };

        debug!(path = %source.display(), "Reading document text");
        fs::read_to_string(&source)
            .map_err(|e| KycError::Ocr(format!("{}: {e}", source.display())))
    }
}

/// Treats any non-empty image file as containing one face.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFaceDetector;

impl FaceDetector for FileFaceDetector {
    fn detect_face(&self, path: &Path) -> Option<FaceDescriptor> {
        match fs::metadata(path) {
            Ok(meta) if meta.is_file() && meta.len() > 0 => Some(FaceDescriptor {
                source: path.to_path_buf(),
                image_bytes: meta.len(),
            }),
            Ok(_) => {
                warn!(path = %path.display(), "No face detected");
                None
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Image file not found");
                None
            }
        }
    }
}

/// Random scores in the ranges the real services typically return.
pub struct SimulatedScorer {
    rng: StdRng,
    document_blacklist: BTreeSet<String>,
    expiry_cutoff: NaiveDate,
}

impl SimulatedScorer {
    /// Seeded scorer; `None` draws the seed from OS entropy
    pub fn new(
        seed: Option<u64>,
        document_blacklist: BTreeSet<String>,
        expiry_cutoff: NaiveDate,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            document_blacklist,
            expiry_cutoff,
        }
    }

    pub fn from_config(config: &VerificationConfig) -> Self {
        Self::new(
            config.seed,
            config.document_blacklist.clone(),
            config.expiry_cutoff,
        )
    }

    fn draw(&mut self, (low, high): (f64, f64)) -> f64 {
        self.rng.gen_range(low..=high)
    }
}

impl VerificationScorer for SimulatedScorer {
    fn authenticity(&mut self, fields: &ExtractedFields) -> f64 {
        let mut score = self.draw(GENUINE_AUTHENTICITY);

        if self.document_blacklist.contains(&fields.document_id) {
            score -= BLACKLISTED_DOCUMENT_PENALTY;
        }
        // Unparseable dates (N/A, OCR_Error) carry no penalty
        if parse_document_date(&fields.expiry_date).is_some_and(|d| d < self.expiry_cutoff) {
            score -= EXPIRED_DOCUMENT_PENALTY;
        }

        score.max(0.0)
    }

    fn face_match(
        &mut self,
        document_face: Option<&FaceDescriptor>,
        live_face: Option<&FaceDescriptor>,
    ) -> f64 {
        if document_face.is_some() && live_face.is_some() {
            self.draw(MATCHED_FACES)
        } else {
            self.draw(UNMATCHED_FACES)
        }
    }

    fn liveness(&mut self, _live_face: Option<&FaceDescriptor>) -> Option<f64> {
        None
    }
}
