//! CSV record files and the JSON verification report

use crate::error::{KycError, Result};
use crate::types::{
    FraudPrediction, KycRecord, PredictionLabel, ProcessedRecord, RawRecord, RuleVerdict,
    VerificationFeatures, VerificationResult,
};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

/// One row of a processed or final record file.
///
/// Columns a stage has not populated are written empty.
#[derive(Debug, Serialize, Deserialize)]
struct OutputRow {
    #[serde(rename = "CustomerID")]
    customer_id: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "DOB")]
    dob: String,
    #[serde(rename = "PAN")]
    pan: String,
    #[serde(rename = "Aadhaar")]
    aadhaar: String,
    #[serde(rename = "Email")]
    email: String,
    #[serde(rename = "Mobile")]
    mobile: String,
    #[serde(rename = "Address")]
    address: String,
    #[serde(rename = "TxnCount")]
    txn_count: u32,
    #[serde(rename = "TxnAmount")]
    txn_amount: f64,
    #[serde(rename = "RuleFlag")]
    rule_flag: String,
    #[serde(rename = "RuleReason", default)]
    rule_reason: String,
    #[serde(rename = "ID_Doc_Authenticity_Score", default)]
    authenticity_score: Option<f64>,
    #[serde(rename = "Liveness_Score", default)]
    liveness_score: Option<f64>,
    #[serde(rename = "Face_Match_Confidence", default)]
    face_match_confidence: Option<f64>,
    #[serde(rename = "OCR_Name_Mismatch_Flag", default)]
    name_mismatch: Option<u8>,
    #[serde(rename = "OCR_DOB_Mismatch_Flag", default)]
    dob_mismatch: Option<u8>,
    #[serde(rename = "ML_Prediction", default)]
    ml_prediction: Option<String>,
    #[serde(rename = "Fraud_Probability", default)]
    fraud_probability: Option<f64>,
}

impl From<&ProcessedRecord> for OutputRow {
    fn from(processed: &ProcessedRecord) -> Self {
        let r = &processed.record;
        let v = processed.verification.as_ref();
        let p = processed.prediction.as_ref();
        Self {
            customer_id: r.customer_id.clone(),
            name: r.name.clone(),
            dob: r.dob.clone(),
            pan: r.pan.clone(),
            aadhaar: r.aadhaar.clone(),
            email: r.email.clone(),
            mobile: r.mobile.clone(),
            address: r.address.clone(),
            txn_count: r.txn_count,
            txn_amount: r.txn_amount,
            rule_flag: processed.verdict.flag().to_string(),
            rule_reason: processed.verdict.reason_string(),
            authenticity_score: v.map(|v| v.authenticity_score),
            liveness_score: v.map(|v| v.liveness_score),
            face_match_confidence: v.map(|v| v.face_match_confidence),
            name_mismatch: v.map(|v| u8::from(v.name_mismatch)),
            dob_mismatch: v.map(|v| u8::from(v.dob_mismatch)),
            ml_prediction: p.map(|p| p.label.to_string()),
            fraud_probability: p.map(|p| p.fraud_probability),
        }
    }
}

impl OutputRow {
    fn into_processed(self) -> ProcessedRecord {
        let verification = match (
            self.authenticity_score,
            self.liveness_score,
            self.face_match_confidence,
        ) {
            (Some(authenticity_score), Some(liveness_score), Some(face_match_confidence)) => {
                Some(VerificationFeatures {
                    authenticity_score,
                    liveness_score,
                    face_match_confidence,
                    name_mismatch: self.name_mismatch.unwrap_or(0) != 0,
                    dob_mismatch: self.dob_mismatch.unwrap_or(0) != 0,
                })
            }
            _ => None,
        };

        let prediction = match (self.ml_prediction.as_deref(), self.fraud_probability) {
            (Some(label), Some(fraud_probability)) => Some(FraudPrediction {
                label: if label == PredictionLabel::Fraud.to_string() {
                    PredictionLabel::Fraud
                } else {
                    PredictionLabel::Valid
                },
                fraud_probability,
            }),
            _ => None,
        };

        let record = KycRecord {
            customer_id: self.customer_id,
            name: self.name,
            dob: self.dob,
            pan: self.pan,
            aadhaar: self.aadhaar,
            email: self.email,
            mobile: self.mobile,
            address: self.address,
            txn_count: self.txn_count,
            txn_amount: self.txn_amount,
        };

        ProcessedRecord {
            record,
            verdict: RuleVerdict::from_reason_string(&self.rule_reason),
            verification,
            prediction,
        }
    }
}

fn create_writer(path: &Path) -> Result<csv::Writer<BufWriter<File>>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(csv::Writer::from_writer(BufWriter::new(File::create(path)?)))
}

/// Write generated records in the raw column layout
pub fn write_raw<P: AsRef<Path>>(path: P, records: &[KycRecord]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = create_writer(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = records.len(), "Raw records written");
    Ok(())
}

/// Read an uploaded record file.
///
/// Rows that fail to parse (for example a non-numeric `TxnAmount`) are
/// skipped with a warning.
pub fn read_rows<P: AsRef<Path>>(path: P) -> Result<Vec<RawRecord>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_reader(BufReader::new(File::open(path)?));

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for (line, row) in reader.deserialize::<RawRecord>().enumerate() {
        match row {
            Ok(row) => rows.push(row),
            Err(e) => {
                skipped += 1;
                warn!(row = line + 1, error = %e, "Skipping malformed row");
            }
        }
    }

    info!(path = %path.display(), rows = rows.len(), skipped, "Record file read");
    Ok(rows)
}

/// Write processed or final records with every derived column
pub fn write_records<P: AsRef<Path>>(path: P, records: &[ProcessedRecord]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = create_writer(path)?;
    for record in records {
        writer.serialize(OutputRow::from(record))?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = records.len(), "Records written");
    Ok(())
}

/// Read a file written by [`write_records`]
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<ProcessedRecord>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_reader(BufReader::new(File::open(path)?));

    let records = reader
        .deserialize::<OutputRow>()
        .map(|row| row.map(OutputRow::into_processed))
        .collect::<std::result::Result<Vec<_>, csv::Error>>()?;

    info!(path = %path.display(), rows = records.len(), "Processed records read");
    Ok(records)
}

/// Write the verification result as pretty JSON
pub fn write_verification<P: AsRef<Path>>(path: P, result: &VerificationResult) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, result)?;
    writer.flush()?;

    info!(path = %path.display(), "Verification result written");
    Ok(())
}

/// Read an externally supplied verification result
pub fn read_verification<P: AsRef<Path>>(path: P) -> Result<VerificationResult> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let result: VerificationResult = serde_json::from_reader(reader)?;

    for (name, score) in [
        ("authenticity_score", result.authenticity_score),
        ("liveness_score", result.liveness_score),
        ("face_match_confidence", result.face_match_confidence),
    ] {
        if !(0.0..=1.0).contains(&score) {
            return Err(KycError::InvalidVerification(format!(
                "{name} = {score} is outside [0, 1]"
            )));
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ExtractedFields, RuleFlag};

    fn record(id: &str, amount: f64) -> KycRecord {
        KycRecord {
            customer_id: id.to_string(),
            name: "Asha Rao".to_string(),
            dob: "1990-01-01".to_string(),
            pan: "KLMNO4321Z".to_string(),
            aadhaar: "4321 8765 2109".to_string(),
            email: "asha@example.com".to_string(),
            mobile: "9876543210".to_string(),
            address: "12 MG Road, Pune 411001".to_string(),
            txn_count: 3,
            txn_amount: amount,
        }
    }

    #[test]
    fn test_raw_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        let records = vec![record("a", 10.5), record("b", 75_000.0)];

        write_raw(&path, &records).unwrap();
        let rows = read_rows(&path).unwrap();

        assert_eq!(rows, records.into_iter().map(RawRecord::from).collect::<Vec<_>>());
    }

    #[test]
    fn test_malformed_and_partial_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.csv");
        fs::write(
            &path,
            "CustomerID,Name,DOB,PAN,Aadhaar,Email,Mobile,Address,TxnCount,TxnAmount\n\
             a,Asha,1990-01-01,KLMNO4321Z,4321 8765 2109,a@b.com,9876543210,,4,100.0\n\
             b,Ravi,1980-01-01,ABCDE1234F,,r@b.com,9876543210,,,\n\
             c,Meera,1970-01-01,PQRST6789L,1111 2222 3333,m@b.com,9876543210,,many,100.0\n",
        )
        .unwrap();

        let rows = read_rows(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].aadhaar, None);
        assert_eq!(rows[1].txn_count, None);
    }

    #[test]
    fn test_processed_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("final.csv");

        let mut flagged = ProcessedRecord::new(
            record("a", 75_000.0),
            RuleVerdict::from_reasons(["High transaction amount", "Face Match Failed"]),
        );
        flagged.verification = Some(VerificationFeatures {
            authenticity_score: 0.91,
            liveness_score: 0.0,
            face_match_confidence: 0.12,
            name_mismatch: true,
            dob_mismatch: false,
        });
        flagged.prediction = Some(FraudPrediction {
            label: PredictionLabel::Fraud,
            fraud_probability: 0.87,
        });
        let plain = ProcessedRecord::new(record("b", 10.0), RuleVerdict::valid());

        write_records(&path, &[flagged.clone(), plain.clone()]).unwrap();
        let restored = read_records(&path).unwrap();

        assert_eq!(restored, vec![flagged, plain]);
        assert_eq!(restored[0].verdict.flag(), RuleFlag::Suspicious);

        let text = fs::read_to_string(&path).unwrap();
        let header = text.lines().next().unwrap();
        assert!(header.ends_with(
            "RuleFlag,RuleReason,ID_Doc_Authenticity_Score,Liveness_Score,\
             Face_Match_Confidence,OCR_Name_Mismatch_Flag,OCR_DOB_Mismatch_Flag,\
             ML_Prediction,Fraud_Probability"
        ));
        assert!(text.contains("High transaction amount; Face Match Failed"));
    }

    #[test]
    fn test_verification_report_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports").join("verification.json");
        let result = VerificationResult {
            authenticity_score: 0.875,
            liveness_score: 0.0,
            face_match_confidence: 0.75,
            extracted_fields: Some(ExtractedFields::ocr_error()),
        };

        write_verification(&path, &result).unwrap();
        assert_eq!(read_verification(&path).unwrap(), result);
    }

    #[test]
    fn test_out_of_range_verification_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("verification.json");
        fs::write(
            &path,
            r#"{"authenticity_score": 1.4, "liveness_score": 0.5,
                "face_match_confidence": 0.5, "extracted_fields": null}"#,
        )
        .unwrap();

        assert!(matches!(
            read_verification(&path),
            Err(KycError::InvalidVerification(_))
        ));
    }
}
