//! KYC record data structures

use crate::types::prediction::FraudPrediction;
use crate::types::verdict::RuleVerdict;
use crate::types::verification::VerificationFeatures;
use serde::{Deserialize, Serialize};

/// One applicant, as written to the raw record file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KycRecord {
    /// Unique customer identifier
    #[serde(rename = "CustomerID")]
    pub customer_id: String,

    #[serde(rename = "Name")]
    pub name: String,

    /// Birth date, `YYYY-MM-DD`
    #[serde(rename = "DOB")]
    pub dob: String,

    /// Tax ID number (5 letters, 4 digits, 1 letter)
    #[serde(rename = "PAN")]
    pub pan: String,

    /// National ID number (three space-separated groups of 4 digits)
    #[serde(rename = "Aadhaar")]
    pub aadhaar: String,

    #[serde(rename = "Email")]
    pub email: String,

    /// 10-digit mobile number
    #[serde(rename = "Mobile")]
    pub mobile: String,

    #[serde(rename = "Address")]
    pub address: String,

    /// Number of transactions
    #[serde(rename = "TxnCount")]
    pub txn_count: u32,

    /// Total transaction amount
    #[serde(rename = "TxnAmount")]
    pub txn_amount: f64,
}

/// A record row as read from an uploaded file, before cleaning.
///
/// Every field is optional; empty CSV fields deserialize to `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "CustomerID", default)]
    pub customer_id: Option<String>,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "DOB", default)]
    pub dob: Option<String>,
    #[serde(rename = "PAN", default)]
    pub pan: Option<String>,
    #[serde(rename = "Aadhaar", default)]
    pub aadhaar: Option<String>,
    #[serde(rename = "Email", default)]
    pub email: Option<String>,
    #[serde(rename = "Mobile", default)]
    pub mobile: Option<String>,
    #[serde(rename = "Address", default)]
    pub address: Option<String>,
    #[serde(rename = "TxnCount", default)]
    pub txn_count: Option<u32>,
    #[serde(rename = "TxnAmount", default)]
    pub txn_amount: Option<f64>,
}

impl From<KycRecord> for RawRecord {
    fn from(record: KycRecord) -> Self {
        Self {
            customer_id: Some(record.customer_id),
            name: Some(record.name),
            dob: Some(record.dob),
            pan: Some(record.pan),
            aadhaar: Some(record.aadhaar),
            email: Some(record.email),
            mobile: Some(record.mobile),
            address: Some(record.address),
            txn_count: Some(record.txn_count),
            txn_amount: Some(record.txn_amount),
        }
    }
}

/// A cleaned record together with everything the pipeline derived for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedRecord {
    pub record: KycRecord,
    /// Rule verdict, including verification reasons once merged
    pub verdict: RuleVerdict,
    /// Verification columns, present after the merge stage
    pub verification: Option<VerificationFeatures>,
    /// Classifier output, present after the prediction stage
    pub prediction: Option<FraudPrediction>,
}

impl ProcessedRecord {
    pub fn new(record: KycRecord, verdict: RuleVerdict) -> Self {
        Self {
            record,
            verdict,
            verification: None,
            prediction: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_record_from_kyc_record() {
        let record = KycRecord {
            customer_id: "c-1".to_string(),
            name: "Asha Rao".to_string(),
            dob: "1990-01-01".to_string(),
            pan: "ABCPD1234K".to_string(),
            aadhaar: "1234 1234 1234".to_string(),
            email: "asha@example.com".to_string(),
            mobile: "9876543210".to_string(),
            address: "1 Main Road, Pune".to_string(),
            txn_count: 4,
            txn_amount: 1200.5,
        };

        let raw = RawRecord::from(record.clone());
        assert_eq!(raw.pan.as_deref(), Some("ABCPD1234K"));
        assert_eq!(raw.txn_count, Some(4));
        assert_eq!(raw.txn_amount, Some(1200.5));
    }

    #[test]
    fn test_raw_record_csv_empty_fields_are_none() {
        let data = "CustomerID,Name,DOB,PAN,Aadhaar,Email,Mobile,Address,TxnCount,TxnAmount\n\
                    c-1,,1990-01-01,abcde1234f,,a@b.co,9876543210,,3,10.5\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let rows: Vec<RawRecord> = reader.deserialize().collect::<Result<_, _>>().unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, None);
        assert_eq!(rows[0].aadhaar, None);
        assert_eq!(rows[0].pan.as_deref(), Some("abcde1234f"));
        assert_eq!(rows[0].txn_count, Some(3));
    }
}
