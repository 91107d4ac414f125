//! Aggregate decoders
//!
//! Each decoder takes a [`Subregion`](crate::reader::Subregion) positioned
//! just inside an aggregate's start tag, walks its direct children by local
//! name and returns the finished aggregate. Unknown children are skipped so
//! minor schema additions decode unchanged. A required child that never
//! appears is reported as [`Error::MissingField`](crate::Error::MissingField)
//! naming the aggregate and the wire element.

mod account;
mod agent;
mod common;
mod header;
mod party;
mod payment;
mod remittance;
mod transaction;

pub use account::decode_account;
pub use agent::{decode_agent, decode_financial_institution};
pub use common::{
    decode_amount, decode_code_or_proprietary, decode_generic_identification,
    decode_payment_type_information, decode_postal_address,
};
pub use header::decode_group_header;
pub use party::decode_party;
pub use payment::{decode_execution_date, decode_payment_instruction};
pub use remittance::{decode_remittance, STRUCTURED_CREDITOR_REFERENCE};
pub use transaction::decode_transaction;

pub(crate) use common::required;
