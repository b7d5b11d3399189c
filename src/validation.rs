//! Field format validation and blacklist lookups

use crate::error::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

const PAN_PATTERN: &str = r"^[A-Z]{5}[0-9]{4}[A-Z]$";
const AADHAAR_PATTERN: &str = r"^[0-9]{4} [0-9]{4} [0-9]{4}$";
const EMAIL_PATTERN: &str = r"^[^@]+@[^@]+\.[^@]+$";
const MOBILE_PATTERN: &str = r"^[6-9][0-9]{9}$";

/// Blacklisted identity numbers.
///
/// One instance is shared by the validator and the synthetic generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blacklists {
    #[serde(default)]
    pub pan: BTreeSet<String>,
    #[serde(default)]
    pub aadhaar: BTreeSet<String>,
}

impl Default for Blacklists {
    fn default() -> Self {
        Self {
            pan: ["ABCDE1234F", "PQRST6789L"]
                .into_iter()
                .map(String::from)
                .collect(),
            aadhaar: ["1234 5678 9012", "1111 2222 3333"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl Blacklists {
    /// Exact match, no normalization
    pub fn is_blacklisted_pan(&self, pan: &str) -> bool {
        self.pan.contains(pan)
    }

    /// Exact match, no normalization
    pub fn is_blacklisted_aadhaar(&self, aadhaar: &str) -> bool {
        self.aadhaar.contains(aadhaar)
    }
}

/// Validates record fields against fixed patterns.
#[derive(Debug, Clone)]
pub struct RecordValidator {
    pan: Regex,
    aadhaar: Regex,
    email: Regex,
    mobile: Regex,
    blacklists: Arc<Blacklists>,
}

impl RecordValidator {
    pub fn new(blacklists: Arc<Blacklists>) -> Result<Self> {
        Ok(Self {
            pan: Regex::new(PAN_PATTERN)?,
            aadhaar: Regex::new(AADHAAR_PATTERN)?,
            email: Regex::new(EMAIL_PATTERN)?,
            mobile: Regex::new(MOBILE_PATTERN)?,
            blacklists,
        })
    }

    /// 5 upper-case letters, 4 digits, 1 upper-case letter
    pub fn validate_pan(&self, pan: &str) -> bool {
        self.pan.is_match(pan)
    }

    /// `dddd dddd dddd`
    pub fn validate_aadhaar(&self, aadhaar: &str) -> bool {
        self.aadhaar.is_match(aadhaar)
    }

    /// A single `@` followed by a domain containing a dot
    pub fn validate_email(&self, email: &str) -> bool {
        self.email.is_match(email)
    }

    /// 10 digits starting with 6, 7, 8 or 9
    pub fn validate_mobile(&self, mobile: &str) -> bool {
        self.mobile.is_match(mobile)
    }

    pub fn is_blacklisted_pan(&self, pan: &str) -> bool {
        self.blacklists.is_blacklisted_pan(pan)
    }

    pub fn is_blacklisted_aadhaar(&self, aadhaar: &str) -> bool {
        self.blacklists.is_blacklisted_aadhaar(aadhaar)
    }

    pub fn blacklists(&self) -> &Arc<Blacklists> {
        &self.blacklists
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn validator() -> RecordValidator {
        RecordValidator::new(Arc::new(Blacklists::default())).unwrap()
    }

    #[test]
    fn test_pan_format() {
        let v = validator();
        assert!(v.validate_pan("ABCDE1234F"));
        assert!(!v.validate_pan("ABCDE123F"));
        assert!(!v.validate_pan("abcde1234f"));
        assert!(!v.validate_pan("ABCDE1234FG"));
        assert!(!v.validate_pan(" ABCDE1234F"));
        assert!(!v.validate_pan(""));
    }

    #[test]
    fn test_aadhaar_format() {
        let v = validator();
        assert!(v.validate_aadhaar("1234 5678 9012"));
        assert!(!v.validate_aadhaar("123456789012"));
        assert!(!v.validate_aadhaar("1234-5678-9012"));
        assert!(!v.validate_aadhaar("1234 5678 901"));
    }

    #[test]
    fn test_email_format() {
        let v = validator();
        assert!(v.validate_email("asha.rao@example.com"));
        assert!(!v.validate_email("asha.rao@example"));
        assert!(!v.validate_email("asha@@example.com"));
        assert!(!v.validate_email("@example.com"));
        assert!(!v.validate_email("asha.example.com"));
    }

    #[test]
    fn test_mobile_format() {
        let v = validator();
        assert!(v.validate_mobile("9876543210"));
        assert!(v.validate_mobile("6000000000"));
        assert!(!v.validate_mobile("5876543210"));
        assert!(!v.validate_mobile("987654321"));
        assert!(!v.validate_mobile("98765432101"));
    }

    #[test]
    fn test_blacklists_are_exact() {
        let v = validator();
        assert!(v.is_blacklisted_pan("ABCDE1234F"));
        assert!(v.is_blacklisted_pan("PQRST6789L"));
        assert!(!v.is_blacklisted_pan("abcde1234f"));
        assert!(v.is_blacklisted_aadhaar("1111 2222 3333"));
        assert!(!v.is_blacklisted_aadhaar("111122223333"));
    }

    proptest! {
        #[test]
        fn prop_pan_pattern_accepted(pan in "[A-Z]{5}[0-9]{4}[A-Z]") {
            prop_assert!(validator().validate_pan(&pan));
        }

        #[test]
        fn prop_short_digit_run_rejected(pan in "[A-Z]{5}[0-9]{3}[A-Z]") {
            prop_assert!(!validator().validate_pan(&pan));
        }

        #[test]
        fn prop_mobile_leading_digit(first in 0u8..10, rest in "[0-9]{9}") {
            let mobile = format!("{first}{rest}");
            prop_assert_eq!(validator().validate_mobile(&mobile), first >= 6);
        }
    }
}
