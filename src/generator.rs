//! Synthetic KYC record generator

use crate::config::GeneratorConfig;
use crate::types::KycRecord;
use crate::validation::Blacklists;
use chrono::{Days, Months, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::seq::{IteratorRandom, SliceRandom};
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

const FIRST_NAMES: &[&str] = &[
    "Aarav", "Aditi", "Amit", "Ananya", "Arjun", "Deepa", "Farhan", "Gita", "Ishaan", "Kavya",
    "Meera", "Nikhil", "Pooja", "Rahul", "Riya", "Sanjay", "Sneha", "Tara", "Vikram", "Zoya",
    "James", "Maria", "David", "Laura",
];

const LAST_NAMES: &[&str] = &[
    "Sharma", "Patel", "Iyer", "Reddy", "Khan", "Gupta", "Nair", "Singh", "Das", "Mehta",
    "Rao", "Joshi", "Bose", "Kapoor", "Smith", "Garcia",
];

const STREETS: &[&str] = &[
    "MG Road", "Park Street", "Lake View Road", "Station Road", "Church Street", "Hill Road",
    "Ring Road", "Temple Street",
];

const CITIES: &[&str] = &[
    "Mumbai", "Delhi", "Bengaluru", "Chennai", "Kolkata", "Pune", "Hyderabad", "Jaipur",
];

const EMAIL_DOMAINS: &[&str] = &["example.com", "gmail.com", "yahoo.com", "outlook.com"];

const MIN_AGE_YEARS: u32 = 18;
const MAX_AGE_YEARS: u32 = 90;

/// Digits in a generated MSISDN; the mobile field keeps the last 10
const MSISDN_DIGITS: usize = 13;
const MOBILE_DIGITS: usize = 10;

const MAX_TXN_COUNT: u32 = 50;
const MIN_TXN_AMOUNT: f64 = 100.0;
const MAX_TXN_AMOUNT: f64 = 100_000.0;

/// Generates synthetic applicants, occasionally substituting blacklisted
/// identity numbers.
pub struct RecordGenerator {
    rng: StdRng,
    blacklists: Arc<Blacklists>,
    blacklist_rate: f64,
    reference_date: NaiveDate,
    used_pans: HashSet<String>,
}

impl RecordGenerator {
    pub fn new(blacklists: Arc<Blacklists>, config: &GeneratorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            blacklists,
            blacklist_rate: config.blacklist_rate.clamp(0.0, 1.0),
            reference_date: Utc::now().date_naive(),
            used_pans: HashSet::new(),
        }
    }

    /// Date ages are computed against (today by default)
    pub fn with_reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = date;
        self
    }

    pub fn generate(&mut self, count: usize) -> Vec<KycRecord> {
        let records: Vec<KycRecord> = (0..count).map(|_| self.generate_record()).collect();

        info!(
            count = records.len(),
            blacklisted_pan = records
                .iter()
                .filter(|r| self.blacklists.is_blacklisted_pan(&r.pan))
                .count(),
            blacklisted_aadhaar = records
                .iter()
                .filter(|r| self.blacklists.is_blacklisted_aadhaar(&r.aadhaar))
                .count(),
            "Synthetic records generated"
        );
        records
    }

    pub fn generate_record(&mut self) -> KycRecord {
        let first = self.choice(FIRST_NAMES);
        let last = self.choice(LAST_NAMES);

        let mut pan = self.unique_pan();
        let mut aadhaar = self.aadhaar();
        if self.rng.gen_bool(self.blacklist_rate) {
            if let Some(listed) = self.blacklists.pan.iter().choose(&mut self.rng) {
                pan = listed.clone();
            }
        }
        if self.rng.gen_bool(self.blacklist_rate) {
            if let Some(listed) = self.blacklists.aadhaar.iter().choose(&mut self.rng) {
                aadhaar = listed.clone();
            }
        }

        let record = KycRecord {
            customer_id: uuid::Builder::from_random_bytes(self.rng.gen())
                .into_uuid()
                .to_string(),
            name: format!("{first} {last}"),
            dob: self.date_of_birth().format("%Y-%m-%d").to_string(),
            pan,
            aadhaar,
            email: self.email(first, last),
            mobile: self.mobile(),
            address: self.address(),
            txn_count: self.rng.gen_range(1..=MAX_TXN_COUNT),
            txn_amount: (self.rng.gen_range(MIN_TXN_AMOUNT..=MAX_TXN_AMOUNT) * 100.0).round()
                / 100.0,
        };

        debug!(customer_id = %record.customer_id, pan = %record.pan, "Record generated");
        record
    }

    fn choice(&mut self, values: &[&'static str]) -> &'static str {
        values.choose(&mut self.rng).copied().unwrap_or_default()
    }

    /// `?????####?`, unique within this generator
    fn unique_pan(&mut self) -> String {
        loop {
            let letters: String = (0..5).map(|_| self.letter()).collect();
            let digits = self.rng.gen_range(0..10_000u32);
            let pan = format!("{letters}{digits:04}{}", self.letter());
            if self.used_pans.insert(pan.clone()) {
                return pan;
            }
        }
    }

    fn letter(&mut self) -> char {
        char::from(self.rng.gen_range(b'A'..=b'Z'))
    }

    fn aadhaar(&mut self) -> String {
        let groups: Vec<String> = (0..3)
            .map(|_| format!("{:04}", self.rng.gen_range(0..10_000u32)))
            .collect();
        groups.join(" ")
    }

    fn email(&mut self, first: &str, last: &str) -> String {
        let domain = self.choice(EMAIL_DOMAINS);
        let suffix = self.rng.gen_range(1..100u32);
        format!(
            "{}.{}{suffix}@{domain}",
            first.to_lowercase(),
            last.to_lowercase()
        )
    }

    /// Last 10 digits of a 13-digit MSISDN
    fn mobile(&mut self) -> String {
        let msisdn: String = (0..MSISDN_DIGITS)
            .map(|_| char::from(b'0' + self.rng.gen_range(0..10u8)))
            .collect();
        msisdn[MSISDN_DIGITS - MOBILE_DIGITS..].to_string()
    }

    fn address(&mut self) -> String {
        let number = self.rng.gen_range(1..500u32);
        let street = self.choice(STREETS);
        let city = self.choice(CITIES);
        let pin = self.rng.gen_range(110_000..=859_999u32);
        format!("{number} {street}, {city} {pin}")
    }

    /// Uniform over birth dates giving an age of 18 to 90 on the reference date
    fn date_of_birth(&mut self) -> NaiveDate {
        let youngest = self
            .reference_date
            .checked_sub_months(Months::new(MIN_AGE_YEARS * 12))
            .unwrap_or(self.reference_date);
        let oldest = self
            .reference_date
            .checked_sub_months(Months::new((MAX_AGE_YEARS + 1) * 12))
            .and_then(|d| d.checked_add_days(Days::new(1)))
            .unwrap_or(youngest);

        let span = (youngest - oldest).num_days().max(0) as u64;
        oldest
            .checked_add_days(Days::new(self.rng.gen_range(0..=span)))
            .unwrap_or(youngest)
    }
}
