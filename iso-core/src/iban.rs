//! International Bank Account Number (ISO 13616)

use crate::checksum::{mod97, normalize};
use crate::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Shortest IBAN in use (Norway)
pub const MIN_LENGTH: usize = 15;

/// Longest IBAN permitted by ISO 13616
pub const MAX_LENGTH: usize = 34;

static IBAN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{2}[0-9]{2}[A-Z0-9]+$").expect("IBAN pattern compiles"));

/// Validated IBAN in electronic (unspaced, uppercase) form.
///
/// Construction checks length, structure and the MOD 97-10 check digits;
/// an `Iban` value is therefore always valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Iban(String);

impl Iban {
    /// Parse and validate an IBAN. Spaces are ignored, letters uppercased.
    pub fn new(value: impl AsRef<str>) -> Result<Self> {
        let normalized = normalize(value.as_ref());

        if !(MIN_LENGTH..=MAX_LENGTH).contains(&normalized.len()) {
            return Err(Error::InvalidLength {
                kind: "IBAN",
                expected: "15-34",
                actual: normalized.len(),
            });
        }

        if !IBAN_PATTERN.is_match(&normalized) {
            return Err(Error::InvalidFormat {
                kind: "IBAN",
                value: normalized,
            });
        }

        // BBAN first, then country code and check digits
        let rearranged = format!("{}{}", &normalized[4..], &normalized[..4]);
        if mod97(&rearranged) != Some(1) {
            return Err(Error::ChecksumMismatch {
                kind: "IBAN",
                value: normalized,
            });
        }

        Ok(Self(normalized))
    }

    /// ISO 3166 country code (first two letters)
    pub fn country_code(&self) -> &str {
        &self.0[..2]
    }

    /// Two check digits
    pub fn check_digits(&self) -> &str {
        &self.0[2..4]
    }

    /// Basic Bank Account Number (country-specific remainder)
    pub fn bban(&self) -> &str {
        &self.0[4..]
    }

    /// Electronic form
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Print form: groups of four separated by spaces
    pub fn to_print_format(&self) -> String {
        self.0
            .as_bytes()
            .chunks(4)
            .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Iban {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Iban {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for Iban {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Iban> for String {
    fn from(iban: Iban) -> Self {
        iban.0
    }
}

impl AsRef<str> for Iban {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
