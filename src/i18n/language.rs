//! Language code type: a validated ISO 639-1 code.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::error::ValidationError;

static CODE_REGEX: OnceLock<Regex> = OnceLock::new();

fn code_regex() -> &'static Regex {
    CODE_REGEX.get_or_init(|| Regex::new(r"^[a-z]{2}$").expect("Invalid language code regex"))
}

/// A two-letter lowercase language code such as `en` or `fr`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Parse a language code, accepting any letter case.
    pub fn parse(code: &str) -> Result<Self, ValidationError> {
        let normalized = code.trim().to_ascii_lowercase();
        if code_regex().is_match(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(ValidationError::new(
                "language",
                format!("'{}' is not a two-letter language code.", code),
            ))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Upper-case form used in user-facing messages ("EN").
    pub fn display_upper(&self) -> String {
        self.0.to_ascii_uppercase()
    }
}

impl FromStr for LanguageCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LanguageCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LanguageCode> for String {
    fn from(code: LanguageCode) -> Self {
        code.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
