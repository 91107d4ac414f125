//! Structured creditor reference (ISO 11649, "RF reference")

use crate::checksum::{mod97, normalize};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reference prefix
pub const PREFIX: &str = "RF";

/// Maximum payload length after the check digits
pub const MAX_PAYLOAD_LENGTH: usize = 21;

/// Validated RF creditor reference: `RF` + 2 check digits + 1-21 alphanumerics.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CreditorReference(String);

impl CreditorReference {
    /// Build a reference for `payload`, computing its check digits.
    pub fn generate(payload: impl AsRef<str>) -> Result<Self> {
        let payload = normalize(payload.as_ref());
        check_payload(&payload)?;

        let remainder = mod97(&format!("{}{}00", payload, PREFIX)).ok_or_else(|| {
            Error::InvalidFormat {
                kind: "creditor reference",
                value: payload.clone(),
            }
        })?;

        Ok(Self(format!("{}{:02}{}", PREFIX, 98 - remainder, payload)))
    }

    /// Parse and validate an existing reference.
    pub fn new(value: impl AsRef<str>) -> Result<Self> {
        let normalized = normalize(value.as_ref());

        if normalized.len() < 5 || normalized.len() > 4 + MAX_PAYLOAD_LENGTH {
            return Err(Error::InvalidLength {
                kind: "creditor reference",
                expected: "5-25",
                actual: normalized.len(),
            });
        }

        if !normalized.is_ascii() {
            return Err(Error::InvalidFormat {
                kind: "creditor reference",
                value: normalized,
            });
        }

        let digits = &normalized[2..4];
        if !normalized.starts_with(PREFIX) || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidFormat {
                kind: "creditor reference",
                value: normalized,
            });
        }

        let payload = &normalized[4..];
        check_payload(payload)?;

        if mod97(&format!("{}{}{}", payload, PREFIX, digits)) != Some(1) {
            return Err(Error::ChecksumMismatch {
                kind: "creditor reference",
                value: normalized,
            });
        }

        Ok(Self(normalized))
    }

    /// Two check digits
    pub fn check_digits(&self) -> &str {
        &self.0[2..4]
    }

    /// Reference payload after the check digits
    pub fn payload(&self) -> &str {
        &self.0[4..]
    }

    /// Electronic form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn check_payload(payload: &str) -> Result<()> {
    if payload.is_empty() || payload.len() > MAX_PAYLOAD_LENGTH {
        return Err(Error::InvalidLength {
            kind: "creditor reference payload",
            expected: "1-21",
            actual: payload.len(),
        });
    }
    if !payload.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()) {
        return Err(Error::InvalidFormat {
            kind: "creditor reference payload",
            value: payload.to_string(),
        });
    }
    Ok(())
}

impl fmt::Display for CreditorReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CreditorReference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for CreditorReference {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<CreditorReference> for String {
    fn from(reference: CreditorReference) -> Self {
        reference.0
    }
}
