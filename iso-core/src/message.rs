//! ISO 20022 message identifiers
//!
//! A message definition is identified as `area.number.variant.version`,
//! e.g. `pain.001.001.09`. The same four parts form the trailing segment of
//! the schema namespace URI.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Namespace prefix shared by all ISO 20022 XSD namespaces
pub const NAMESPACE_PREFIX: &str = "urn:iso:std:iso:20022:tech:xsd:";

/// Message identifier such as `pain.001.001.09`.
///
/// Numeric parts keep their zero padding so the dotted form and the
/// namespace URI round-trip exactly. Ordering is by business area, then by
/// the numeric value of number, variant and version, so the greatest
/// identifier of a family is its most recent revision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MessageIdentifier {
    business_area: String,
    message_number: String,
    variant: String,
    version: String,
}

impl MessageIdentifier {
    /// Build an identifier from its four parts
    pub fn new(
        business_area: impl Into<String>,
        message_number: impl Into<String>,
        variant: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self> {
        let id = Self {
            business_area: business_area.into(),
            message_number: message_number.into(),
            variant: variant.into(),
            version: version.into(),
        };

        let area_ok = id.business_area.len() == 4
            && id.business_area.bytes().all(|b| b.is_ascii_lowercase());
        let digits_ok = [&id.message_number, &id.variant, &id.version]
            .iter()
            .all(|part| !part.is_empty() && part.len() <= 3 && part.bytes().all(|b| b.is_ascii_digit()));

        if !area_ok || !digits_ok {
            return Err(Error::InvalidMessageIdentifier(id.dotted()));
        }
        Ok(id)
    }

    /// Parse the dotted form, e.g. `pain.001.001.09`
    pub fn parse(value: &str) -> Result<Self> {
        let parts: Vec<&str> = value.trim().split('.').collect();
        match parts.as_slice() {
            [area, number, variant, version] => Self::new(*area, *number, *variant, *version)
                .map_err(|_| Error::InvalidMessageIdentifier(value.to_string())),
            _ => Err(Error::InvalidMessageIdentifier(value.to_string())),
        }
    }

    /// Parse a namespace URI `urn:iso:std:iso:20022:tech:xsd:{id}`
    pub fn from_namespace(namespace: &str) -> Result<Self> {
        namespace
            .trim()
            .strip_prefix(NAMESPACE_PREFIX)
            .ok_or_else(|| Error::InvalidMessageIdentifier(namespace.to_string()))
            .and_then(|dotted| {
                Self::parse(dotted)
                    .map_err(|_| Error::InvalidMessageIdentifier(namespace.to_string()))
            })
    }

    /// Namespace URI for this identifier
    pub fn namespace(&self) -> String {
        format!("{}{}", NAMESPACE_PREFIX, self.dotted())
    }

    /// Dotted form
    pub fn dotted(&self) -> String {
        format!(
            "{}.{}.{}.{}",
            self.business_area, self.message_number, self.variant, self.version
        )
    }

    /// Business area, e.g. `pain`
    pub fn business_area(&self) -> &str {
        &self.business_area
    }

    /// Message number, e.g. `001`
    pub fn message_number(&self) -> &str {
        &self.message_number
    }

    /// Variant, e.g. `001`
    pub fn variant(&self) -> &str {
        &self.variant
    }

    /// Version as written in the namespace, e.g. `09`
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Three-digit version tag, e.g. `009`
    pub fn version_tag(&self) -> String {
        format!("{:0>3}", self.version)
    }

    /// Whether both identifiers name the same message in possibly different revisions
    pub fn same_message(&self, other: &MessageIdentifier) -> bool {
        self.business_area == other.business_area
            && numeric(&self.message_number) == numeric(&other.message_number)
    }

    fn sort_key(&self) -> (&str, u32, u32, u32) {
        (
            &self.business_area,
            numeric(&self.message_number),
            numeric(&self.variant),
            numeric(&self.version),
        )
    }
}

fn numeric(part: &str) -> u32 {
    // Parts are validated as 1-3 ASCII digits
    part.parse().unwrap_or(0)
}

impl PartialOrd for MessageIdentifier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MessageIdentifier {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key()
            .cmp(&other.sort_key())
            .then_with(|| self.dotted().cmp(&other.dotted()))
    }
}

impl fmt::Display for MessageIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dotted())
    }
}

impl FromStr for MessageIdentifier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MessageIdentifier {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<MessageIdentifier> for String {
    fn from(id: MessageIdentifier) -> Self {
        id.dotted()
    }
}
