//! Field extraction from identity document text

use crate::error::Result;
use crate::types::verification::{ExtractedFields, NOT_AVAILABLE};
use chrono::NaiveDate;
use regex::{Regex, RegexBuilder};

const DATE: &str = r"(\d{4}-\d{2}-\d{2}|\d{2}/\d{2}/\d{4}|\d{2}-\d{2}-\d{4})";

/// Date layouts accepted on documents
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

/// Parse a document date in any of the accepted layouts
pub fn parse_document_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value.trim(), format).ok())
}

/// Labeled-field parser over OCR text. All patterns are case insensitive.
#[derive(Debug, Clone)]
pub struct DocumentParser {
    name: Regex,
    dob: Regex,
    document_id: Regex,
    address: Regex,
    expiry: Regex,
    passport: Regex,
    national_id: Regex,
    driving_license: Regex,
    gender: Regex,
}

impl DocumentParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            name: pattern(r"(?:Full Name|Name|Nom)[ \t]*:[ \t]*([A-Z ]+)")?,
            dob: pattern(&format!(r"\b(?:DOB|Date of Birth)[ \t]*:?[ \t]*{DATE}\b"))?,
            document_id: pattern(r"\b(?:Document ID|ID No|IDN)[ \t]*:?[ \t]*([A-Z0-9]+)\b")?,
            address: pattern(r"(?:Address|Addr)[ \t]*:?[ \t]*(.+)")?,
            expiry: pattern(&format!(r"\b(?:Expiry Date|Exp)[ \t]*:?[ \t]*{DATE}\b"))?,
            passport: pattern(r"passport")?,
            national_id: pattern(r"national id|id card")?,
            driving_license: pattern(r"driver.?s license")?,
            gender: pattern(r"\b(?:Gender|Sex)[ \t]*:?[ \t]*([MF])\b")?,
        })
    }

    /// Extract every field; unmatched fields are `N/A`
    pub fn parse(&self, text: &str) -> ExtractedFields {
        let mut fields = ExtractedFields::not_available();

        if let Some(name) = capture(&self.name, text).filter(|n| !n.is_empty()) {
            fields.name = name;
        } else if let Some(name) = leading_caps_line(text) {
            fields.name = name;
        }
        if let Some(dob) = capture(&self.dob, text) {
            fields.dob = dob;
        }
        if let Some(id) = capture(&self.document_id, text) {
            fields.document_id = id;
        }
        if let Some(address) = capture(&self.address, text) {
            fields.address = address;
        }
        if let Some(expiry) = capture(&self.expiry, text) {
            fields.expiry_date = expiry;
        }

        fields.document_type = if self.passport.is_match(text) {
            "Passport"
        } else if self.national_id.is_match(text) {
            "National ID Card"
        } else if self.driving_license.is_match(text) {
            "Driver's License"
        } else {
            NOT_AVAILABLE
        }
        .to_string();

        if let Some(gender) = capture(&self.gender, text) {
            fields.gender = gender.to_uppercase();
        }

        fields
    }
}

fn pattern(source: &str) -> Result<Regex> {
    Ok(RegexBuilder::new(source).case_insensitive(true).build()?)
}

fn capture(regex: &Regex, text: &str) -> Option<String> {
    regex
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// First non-empty line, when it is all capitals, has more than one word and
/// is not the only line
fn leading_caps_line(text: &str) -> Option<String> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    let first = lines.next()?;
    lines.next()?;

    let has_letters = first.chars().any(char::is_alphabetic);
    let all_caps = !first.chars().any(char::is_lowercase);
    let multi_word = first.split_whitespace().count() > 1;
    (has_letters && all_caps && multi_word).then(|| first.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "REPUBLIC OF INDIA\n\
        National ID Card\n\
        Name: JOHN DOE\n\
        DOB: 1990-01-01\n\
        Document ID: ABC123456789\n\
        Address: 12 Lake View, Pune\n\
        Expiry Date: 31/12/2030\n\
        Gender: m\n";

    #[test]
    fn test_labeled_fields() {
        let fields = DocumentParser::new().unwrap().parse(SAMPLE);

        assert_eq!(fields.name, "JOHN DOE");
        assert_eq!(fields.dob, "1990-01-01");
        assert_eq!(fields.document_id, "ABC123456789");
        assert_eq!(fields.address, "12 Lake View, Pune");
        assert_eq!(fields.expiry_date, "31/12/2030");
        assert_eq!(fields.document_type, "National ID Card");
        assert_eq!(fields.gender, "M");
    }

    #[test]
    fn test_unmatched_fields_are_not_available() {
        let fields = DocumentParser::new().unwrap().parse("blurry scan");
        assert_eq!(fields, ExtractedFields::not_available());
    }

    #[test]
    fn test_name_falls_back_to_leading_caps_line() {
        let parser = DocumentParser::new().unwrap();

        let fields = parser.parse("PRIYA SHARMA\nPassport\nIDN 987654321098");
        assert_eq!(fields.name, "PRIYA SHARMA");
        assert_eq!(fields.document_type, "Passport");
        assert_eq!(fields.document_id, "987654321098");

        // A single line is never taken as the name
        assert_eq!(parser.parse("PRIYA SHARMA").name, NOT_AVAILABLE);
        // Single word, or mixed case, neither
        assert_eq!(parser.parse("INDIA\nsecond").name, NOT_AVAILABLE);
        assert_eq!(parser.parse("Priya Sharma\nsecond").name, NOT_AVAILABLE);
    }

    #[test]
    fn test_driving_license_keyword() {
        let fields = DocumentParser::new()
            .unwrap()
            .parse("Driver's License\nSex: F\nExp 2024-01-01");
        assert_eq!(fields.document_type, "Driver's License");
        assert_eq!(fields.gender, "F");
        assert_eq!(fields.expiry_date, "2024-01-01");
    }

    #[test]
    fn test_parse_document_date() {
        let expected = NaiveDate::from_ymd_opt(2030, 12, 31);
        assert_eq!(parse_document_date("2030-12-31"), expected);
        assert_eq!(parse_document_date("31/12/2030"), expected);
        assert_eq!(parse_document_date("31-12-2030"), expected);
        assert_eq!(parse_document_date("N/A"), None);
        assert_eq!(parse_document_date("OCR_Error"), None);
    }
}
