//! Business Identifier Code (ISO 9362)

use crate::checksum::normalize;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

static BIC_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z]{4}[A-Z]{2}[A-Z0-9]{2}([A-Z0-9]{3})?$").expect("BIC pattern compiles")
});

/// Branch code implied by an 8-character BIC (primary office)
pub const PRIMARY_OFFICE_BRANCH: &str = "XXX";

/// Validated BIC, 8 or 11 characters.
///
/// Equality, ordering and hashing use the 11-character canonical form,
/// so `DEUTDEFF` equals `DEUTDEFFXXX`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Bic(String);

impl Bic {
    /// Parse and validate a BIC. Spaces are ignored, letters uppercased.
    pub fn new(value: impl AsRef<str>) -> Result<Self> {
        let normalized = normalize(value.as_ref());

        if normalized.len() != 8 && normalized.len() != 11 {
            return Err(Error::InvalidLength {
                kind: "BIC",
                expected: "8 or 11",
                actual: normalized.len(),
            });
        }

        if !BIC_PATTERN.is_match(&normalized) {
            return Err(Error::InvalidFormat {
                kind: "BIC",
                value: normalized,
            });
        }

        Ok(Self(normalized))
    }

    /// Institution (bank) code
    pub fn institution_code(&self) -> &str {
        &self.0[..4]
    }

    /// ISO 3166 country code
    pub fn country_code(&self) -> &str {
        &self.0[4..6]
    }

    /// Location code
    pub fn location_code(&self) -> &str {
        &self.0[6..8]
    }

    /// Branch code, `XXX` for an 8-character BIC
    pub fn branch_code(&self) -> &str {
        self.0.get(8..).unwrap_or(PRIMARY_OFFICE_BRANCH)
    }

    /// Whether this BIC addresses the primary office
    pub fn is_primary_office(&self) -> bool {
        self.branch_code() == PRIMARY_OFFICE_BRANCH
    }

    /// 11-character canonical form
    pub fn canonical(&self) -> String {
        if self.0.len() == 8 {
            format!("{}{}", self.0, PRIMARY_OFFICE_BRANCH)
        } else {
            self.0.clone()
        }
    }

    /// Form as supplied (8 or 11 characters)
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn canonical_parts(&self) -> (&str, &str) {
        (&self.0[..8], self.branch_code())
    }
}

impl PartialEq for Bic {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_parts() == other.canonical_parts()
    }
}

impl Eq for Bic {}

impl Hash for Bic {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_parts().hash(state);
    }
}

impl PartialOrd for Bic {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Bic {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical_parts().cmp(&other.canonical_parts())
    }
}

impl fmt::Display for Bic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Bic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for Bic {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Bic> for String {
    fn from(bic: Bic) -> Self {
        bic.0
    }
}
