//! Record cleaning: duplicate removal, incomplete-row removal and field
//! normalization.

use crate::types::{KycRecord, RawRecord};
use std::collections::HashSet;
use tracing::{debug, info};

/// Number of trailing characters kept from the mobile field
const MOBILE_LEN: usize = 10;

/// Cleaned records plus what was dropped
#[derive(Debug, Clone, Default)]
pub struct CleaningOutcome {
    pub records: Vec<KycRecord>,
    pub duplicates_dropped: usize,
    pub incomplete_dropped: usize,
}

/// Clean raw rows.
///
/// Exact duplicate rows are removed first, then rows missing any of name,
/// PAN, Aadhaar, email, mobile or birth date, and rows whose transaction
/// amount is NaN or infinite. Surviving rows are normalized:
/// PAN is upper-cased, Aadhaar keeps only digits and spaces, mobile keeps its
/// last 10 characters. Missing non-core fields become empty strings and
/// missing transaction fields become zero.
pub fn clean_records(rows: Vec<RawRecord>) -> CleaningOutcome {
    let total = rows.len();
    let mut seen = HashSet::with_capacity(total);
    let mut outcome = CleaningOutcome::default();

    for row in rows {
        if !seen.insert(dedup_key(&row)) {
            outcome.duplicates_dropped += 1;
            continue;
        }

        match normalize(row) {
            Some(record) => outcome.records.push(record),
            None => outcome.incomplete_dropped += 1,
        }
    }

    info!(
        input = total,
        kept = outcome.records.len(),
        duplicates = outcome.duplicates_dropped,
        incomplete = outcome.incomplete_dropped,
        "Records cleaned"
    );

    outcome
}

fn dedup_key(row: &RawRecord) -> String {
    // Unit separator cannot appear in CSV text fields we care about
    let fields = [
        row.customer_id.as_deref(),
        row.name.as_deref(),
        row.dob.as_deref(),
        row.pan.as_deref(),
        row.aadhaar.as_deref(),
        row.email.as_deref(),
        row.mobile.as_deref(),
        row.address.as_deref(),
    ];
    let mut key = fields
        .iter()
        .map(|f| f.unwrap_or("\u{0}"))
        .collect::<Vec<_>>()
        .join("\u{1f}");
    key.push_str(&format!(
        "\u{1f}{:?}\u{1f}{:?}",
        row.txn_count,
        row.txn_amount.map(f64::to_bits)
    ));
    key
}

fn normalize(row: RawRecord) -> Option<KycRecord> {
    let name = required(row.name)?;
    let pan = required(row.pan)?;
    let aadhaar = required(row.aadhaar)?;
    let email = required(row.email)?;
    let mobile = required(row.mobile)?;
    let dob = required(row.dob)?;
    let txn_amount = match row.txn_amount {
        Some(amount) if !amount.is_finite() => {
            debug!(customer_id = ?row.customer_id, "Non-finite transaction amount");
            return None;
        }
        amount => amount.unwrap_or(0.0),
    };

    let record = KycRecord {
        customer_id: row.customer_id.unwrap_or_default(),
        name,
        dob,
        pan: pan.to_uppercase(),
        aadhaar: aadhaar
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == ' ')
            .collect(),
        email,
        mobile: last_chars(&mobile, MOBILE_LEN),
        address: row.address.unwrap_or_default(),
        txn_count: row.txn_count.unwrap_or(0),
        txn_amount,
    };

    debug!(customer_id = %record.customer_id, "Record normalized");
    Some(record)
}

fn required(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

fn last_chars(value: &str, n: usize) -> String {
    let skip = value.chars().count().saturating_sub(n);
    value.chars().skip(skip).collect()
}
