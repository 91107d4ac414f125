//! ISO 20022 core types
//!
//! Self-validating value types and the decoded message shapes used by the
//! streaming decoder.
//!
//! # Invariants
//!
//! - A constructed `Iban`, `Bic`, `CurrencyCode` or `CreditorReference` is valid;
//!   there is no unchecked constructor
//! - Money arithmetic never mixes currencies
//! - `MessageIdentifier` round-trips through its dotted form and namespace URI

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod bic;
pub mod checksum;
pub mod creditor_reference;
pub mod currency;
pub mod error;
pub mod iban;
pub mod message;
pub mod money;
pub mod pain001;
pub mod types;

// Re-exports
pub use bic::Bic;
pub use creditor_reference::CreditorReference;
pub use currency::CurrencyCode;
pub use error::{Error, Result};
pub use iban::Iban;
pub use message::{MessageIdentifier, NAMESPACE_PREFIX};
pub use money::Money;
pub use pain001::{
    CreditTransferTransaction, ExecutionDate, GroupHeader, Pain001Document,
    PaymentIdentification, PaymentInstruction,
};
pub use types::{
    AccountIdentification, Agent, CashAccount, ChargeBearer, CodeOrProprietary,
    PartyIdentification, Party, PaymentMethod, RemittanceInformation,
};
