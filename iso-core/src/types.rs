//! Building blocks shared by ISO 20022 payment messages
//!
//! These are plain output shapes populated by the decoders. Choices the
//! wire format defines as exclusive (code or proprietary, organisation or
//! person, IBAN or other account id) are enums so that "both" and "neither"
//! cannot be represented.

use crate::{Bic, CreditorReference, CurrencyCode, Error, Iban, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Either an external code or a free-form proprietary value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeOrProprietary {
    /// Code from an ISO external code list
    Code(String),
    /// Proprietary value
    Proprietary(String),
}

impl CodeOrProprietary {
    /// Code value, if this is a code
    pub fn code(&self) -> Option<&str> {
        match self {
            CodeOrProprietary::Code(code) => Some(code),
            CodeOrProprietary::Proprietary(_) => None,
        }
    }

    /// Underlying text regardless of slot
    pub fn as_str(&self) -> &str {
        match self {
            CodeOrProprietary::Code(value) | CodeOrProprietary::Proprietary(value) => value,
        }
    }
}

/// Postal address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    /// Department
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    /// Street name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_name: Option<String>,
    /// Building number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_number: Option<String>,
    /// Post code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_code: Option<String>,
    /// Town name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub town_name: Option<String>,
    /// Country subdivision
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_sub_division: Option<String>,
    /// ISO 3166 country code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Unstructured address lines, in document order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub address_lines: Vec<String>,
}

/// Identification issued under a named scheme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericIdentification {
    /// Identifier
    pub id: String,
    /// Scheme name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme_name: Option<CodeOrProprietary>,
    /// Issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
}

/// Date and place of birth of a private person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateAndPlaceOfBirth {
    /// Birth date
    pub birth_date: NaiveDate,
    /// Province of birth
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    /// City of birth
    pub city: String,
    /// Country of birth
    pub country: String,
}

/// Organisation identification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganisationIdentification {
    /// BIC of the organisation (`AnyBIC`, `BICOrBEI` in older revisions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub any_bic: Option<Bic>,
    /// Legal entity identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lei: Option<String>,
    /// Other identifications
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub other: Vec<GenericIdentification>,
}

/// Private person identification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonIdentification {
    /// Date and place of birth
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_and_place_of_birth: Option<DateAndPlaceOfBirth>,
    /// Other identifications
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub other: Vec<GenericIdentification>,
}

/// Identification of a party: organisation or private person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Party {
    /// `OrgId`
    Organisation(OrganisationIdentification),
    /// `PrvtId`
    Private(PersonIdentification),
}

/// Contact details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    /// Contact name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Phone number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
}

/// Party (debtor, creditor, initiating party, ultimate parties)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyIdentification {
    /// Name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Postal address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_address: Option<PostalAddress>,
    /// Organisation or person identification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identification: Option<Party>,
    /// Country of residence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_of_residence: Option<String>,
    /// Contact details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_details: Option<ContactDetails>,
}

/// Account identification: IBAN or another scheme
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountIdentification {
    /// Validated IBAN
    Iban(Iban),
    /// Non-IBAN identification
    Other(GenericIdentification),
}

/// Cash account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashAccount {
    /// Account identification
    pub identification: AccountIdentification,
    /// Account type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_type: Option<CodeOrProprietary>,
    /// Account currency
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<CurrencyCode>,
    /// Account name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl CashAccount {
    /// IBAN, if the account is identified by one
    pub fn iban(&self) -> Option<&Iban> {
        match &self.identification {
            AccountIdentification::Iban(iban) => Some(iban),
            AccountIdentification::Other(_) => None,
        }
    }
}

/// Clearing system member identification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearingSystemMember {
    /// Clearing system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clearing_system: Option<CodeOrProprietary>,
    /// Member identifier
    pub member_id: String,
}

/// Financial institution identification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialInstitution {
    /// BIC (`BICFI`, `BIC` in older revisions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bic: Option<Bic>,
    /// Clearing system member identification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clearing_system_member: Option<ClearingSystemMember>,
    /// Legal entity identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lei: Option<String>,
    /// Name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Postal address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_address: Option<PostalAddress>,
    /// Other identification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other: Option<GenericIdentification>,
}

/// Branch identification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchIdentification {
    /// Branch identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Branch name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Agent: financial institution plus optional branch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    /// Institution identification
    pub financial_institution: FinancialInstitution,
    /// Branch identification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<BranchIdentification>,
}

/// Payment type information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTypeInformation {
    /// Instruction priority (`HIGH`, `NORM`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction_priority: Option<String>,
    /// Service level, e.g. `SEPA`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_level: Option<CodeOrProprietary>,
    /// Local instrument
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_instrument: Option<CodeOrProprietary>,
    /// Category purpose
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_purpose: Option<CodeOrProprietary>,
}

/// Document referred to by structured remittance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferredDocument {
    /// Document type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_type: Option<CodeOrProprietary>,
    /// Document number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    /// Related date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_date: Option<NaiveDate>,
}

/// Creditor reference information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditorReferenceInformation {
    /// Reference type, `SCOR` for structured creditor references
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_type: Option<CodeOrProprietary>,
    /// Reference type issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    /// Reference as transmitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Validated ISO 11649 reference, when the reference is one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_reference: Option<CreditorReference>,
}

/// Structured remittance block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredRemittance {
    /// Referred documents
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub referred_documents: Vec<ReferredDocument>,
    /// Creditor reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creditor_reference: Option<CreditorReferenceInformation>,
    /// Additional free text
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_information: Vec<String>,
}

/// Remittance information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemittanceInformation {
    /// Unstructured lines
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unstructured: Vec<String>,
    /// Structured blocks
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub structured: Vec<StructuredRemittance>,
}

/// Party bearing the charges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChargeBearer {
    /// Borne by debtor
    #[serde(rename = "DEBT")]
    Debtor,
    /// Borne by creditor
    #[serde(rename = "CRED")]
    Creditor,
    /// Shared
    #[serde(rename = "SHAR")]
    Shared,
    /// Following the service level
    #[serde(rename = "SLEV")]
    ServiceLevel,
}

impl ChargeBearer {
    /// Wire code
    pub fn code(&self) -> &'static str {
        match self {
            ChargeBearer::Debtor => "DEBT",
            ChargeBearer::Creditor => "CRED",
            ChargeBearer::Shared => "SHAR",
            ChargeBearer::ServiceLevel => "SLEV",
        }
    }
}

impl FromStr for ChargeBearer {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "DEBT" => Ok(ChargeBearer::Debtor),
            "CRED" => Ok(ChargeBearer::Creditor),
            "SHAR" => Ok(ChargeBearer::Shared),
            "SLEV" => Ok(ChargeBearer::ServiceLevel),
            other => Err(Error::InvalidFormat {
                kind: "charge bearer",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ChargeBearer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Payment method of a payment instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Credit transfer
    #[serde(rename = "TRF")]
    CreditTransfer,
    /// Transfer advice
    #[serde(rename = "TRA")]
    TransferAdvice,
    /// Cheque
    #[serde(rename = "CHK")]
    Cheque,
}

impl PaymentMethod {
    /// Wire code
    pub fn code(&self) -> &'static str {
        match self {
            PaymentMethod::CreditTransfer => "TRF",
            PaymentMethod::TransferAdvice => "TRA",
            PaymentMethod::Cheque => "CHK",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "TRF" => Ok(PaymentMethod::CreditTransfer),
            "TRA" => Ok(PaymentMethod::TransferAdvice),
            "CHK" => Ok(PaymentMethod::Cheque),
            other => Err(Error::InvalidFormat {
                kind: "payment method",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_charge_bearer_codes() {
        for code in ["DEBT", "CRED", "SHAR", "SLEV"] {
            let bearer: ChargeBearer = code.parse().unwrap();
            assert_eq!(bearer.code(), code);
        }
        assert!("BOTH".parse::<ChargeBearer>().is_err());
        assert_eq!(
            serde_json::to_string(&ChargeBearer::ServiceLevel).unwrap(),
            "\"SLEV\""
        );
    }

    #[test]
    fn test_payment_method_codes() {
        assert_eq!("TRF".parse::<PaymentMethod>().unwrap(), PaymentMethod::CreditTransfer);
        assert_eq!(PaymentMethod::Cheque.to_string(), "CHK");
        assert!("DD".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_code_or_proprietary() {
        let code = CodeOrProprietary::Code("SEPA".to_string());
        let prtry = CodeOrProprietary::Proprietary("INTERNAL".to_string());
        assert_eq!(code.code(), Some("SEPA"));
        assert_eq!(prtry.code(), None);
        assert_eq!(prtry.as_str(), "INTERNAL");
    }

    #[test]
    fn test_cash_account_iban() {
        let account = CashAccount {
            identification: AccountIdentification::Iban(
                Iban::new("DE89370400440532013000").unwrap(),
            ),
            account_type: None,
            currency: None,
            name: None,
        };
        assert_eq!(account.iban().unwrap().country_code(), "DE");
    }
}
