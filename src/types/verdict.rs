//! Rule verdicts

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between reasons in the rendered reason string
pub const REASON_SEPARATOR: &str = "; ";

/// Binary verdict of the rule engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleFlag {
    Valid,
    Suspicious,
}

impl RuleFlag {
    pub fn is_suspicious(self) -> bool {
        self == RuleFlag::Suspicious
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RuleFlag::Valid => "Valid",
            RuleFlag::Suspicious => "Suspicious",
        }
    }
}

impl fmt::Display for RuleFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered reasons a record was flagged.
///
/// The flag is derived from the reasons, so a verdict is `Suspicious`
/// exactly when at least one reason is present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleVerdict {
    reasons: Vec<String>,
}

impl RuleVerdict {
    /// A verdict with no reasons
    pub fn valid() -> Self {
        Self::default()
    }

    pub fn from_reasons<I, S>(reasons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            reasons: reasons
                .into_iter()
                .map(Into::into)
                .filter(|r: &String| !r.is_empty())
                .collect(),
        }
    }

    /// Parse a rendered reason string (`"a; b"`) back into a verdict
    pub fn from_reason_string(reasons: &str) -> Self {
        Self::from_reasons(reasons.split(REASON_SEPARATOR).map(str::trim))
    }

    pub fn flag(&self) -> RuleFlag {
        if self.reasons.is_empty() {
            RuleFlag::Valid
        } else {
            RuleFlag::Suspicious
        }
    }

    pub fn is_suspicious(&self) -> bool {
        self.flag().is_suspicious()
    }

    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    /// Reasons joined with `"; "`, empty when valid
    pub fn reason_string(&self) -> String {
        self.reasons.join(REASON_SEPARATOR)
    }

    /// Combine with a later rule pass: the flag is OR-ed and the reasons of
    /// `later` are appended after this verdict's reasons.
    pub fn merge(mut self, later: RuleVerdict) -> Self {
        self.reasons.extend(later.reasons);
        self
    }
}
