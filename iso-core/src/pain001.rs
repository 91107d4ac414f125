//! pain.001 Customer Credit Transfer Initiation
//!
//! Output shapes for the decoded document. A document holds one group
//! header and an ordered list of payment instructions, each of which holds
//! an ordered list of credit transfer transactions.

use crate::types::{
    Agent, CashAccount, ChargeBearer, CodeOrProprietary, PartyIdentification, PaymentMethod,
    PaymentTypeInformation, RemittanceInformation,
};
use crate::{Error, MessageIdentifier, Money, Result};
use chrono::{DateTime, FixedOffset, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Group header (`GrpHdr`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupHeader {
    /// Message identification
    pub message_id: String,
    /// Creation date and time; a timestamp without offset is read as UTC
    pub creation_date_time: DateTime<FixedOffset>,
    /// Declared number of transactions in the whole message
    pub number_of_transactions: u64,
    /// Declared sum of all instructed amounts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_sum: Option<Decimal>,
    /// Initiating party
    pub initiating_party: PartyIdentification,
    /// Forwarding agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forwarding_agent: Option<Agent>,
}

/// Requested execution date: a plain date, or a date-time in newer revisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionDate {
    /// `Dt`
    Date(NaiveDate),
    /// `DtTm`
    DateTime(DateTime<FixedOffset>),
}

impl ExecutionDate {
    /// Calendar date of execution
    pub fn date(&self) -> NaiveDate {
        match self {
            ExecutionDate::Date(date) => *date,
            ExecutionDate::DateTime(date_time) => date_time.date_naive(),
        }
    }
}

/// Payment identification (`PmtId`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentIdentification {
    /// Instruction identification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction_id: Option<String>,
    /// End-to-end identification
    pub end_to_end_id: String,
    /// Unique end-to-end transaction reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uetr: Option<String>,
}

/// Credit transfer transaction (`CdtTrfTxInf`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditTransferTransaction {
    /// Payment identification
    pub payment_id: PaymentIdentification,
    /// Payment type information
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_type_information: Option<PaymentTypeInformation>,
    /// Instructed amount
    pub amount: Money,
    /// Charge bearer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charge_bearer: Option<ChargeBearer>,
    /// Ultimate debtor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ultimate_debtor: Option<PartyIdentification>,
    /// Intermediary agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intermediary_agent: Option<Agent>,
    /// Creditor agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creditor_agent: Option<Agent>,
    /// Creditor
    pub creditor: PartyIdentification,
    /// Creditor account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creditor_account: Option<CashAccount>,
    /// Ultimate creditor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ultimate_creditor: Option<PartyIdentification>,
    /// Purpose
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<CodeOrProprietary>,
    /// Remittance information
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remittance_information: Option<RemittanceInformation>,
}

/// Payment instruction (`PmtInf`), the batch level of pain.001
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInstruction {
    /// Payment information identification
    pub payment_information_id: String,
    /// Payment method
    pub payment_method: PaymentMethod,
    /// Batch booking requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_booking: Option<bool>,
    /// Declared number of transactions in this batch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_transactions: Option<u64>,
    /// Declared sum of this batch's instructed amounts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_sum: Option<Decimal>,
    /// Payment type information
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_type_information: Option<PaymentTypeInformation>,
    /// Requested execution date
    pub requested_execution_date: ExecutionDate,
    /// Debtor
    pub debtor: PartyIdentification,
    /// Debtor account
    pub debtor_account: CashAccount,
    /// Debtor agent
    pub debtor_agent: Agent,
    /// Ultimate debtor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ultimate_debtor: Option<PartyIdentification>,
    /// Charge bearer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charge_bearer: Option<ChargeBearer>,
    /// Transactions in document order
    pub transactions: Vec<CreditTransferTransaction>,
}

impl PaymentInstruction {
    /// Sum of instructed amounts, ignoring currency (as `CtrlSum` does)
    pub fn instructed_total(&self) -> Decimal {
        self.transactions.iter().map(|tx| tx.amount.amount).sum()
    }

    /// Check declared `NbOfTxs` and `CtrlSum` against the transactions
    pub fn check_consistency(&self) -> Result<()> {
        let scope = || format!("payment instruction {}", self.payment_information_id);

        if let Some(declared) = self.number_of_transactions {
            if declared != self.transactions.len() as u64 {
                return Err(Error::Inconsistent {
                    scope: scope(),
                    detail: format!(
                        "declares {} transactions, contains {}",
                        declared,
                        self.transactions.len()
                    ),
                });
            }
        }

        if let Some(declared) = self.control_sum {
            let actual = self.instructed_total();
            if declared != actual {
                return Err(Error::Inconsistent {
                    scope: scope(),
                    detail: format!("control sum {} does not match total {}", declared, actual),
                });
            }
        }

        Ok(())
    }
}

/// Decoded pain.001 document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pain001Document {
    /// Message revision the document was decoded as
    pub message: MessageIdentifier,
    /// Group header
    pub group_header: GroupHeader,
    /// Payment instructions in document order
    pub payment_instructions: Vec<PaymentInstruction>,
}

impl Pain001Document {
    /// Total number of transactions across all batches
    pub fn transaction_count(&self) -> usize {
        self.payment_instructions
            .iter()
            .map(|batch| batch.transactions.len())
            .sum()
    }

    /// Sum of all instructed amounts
    pub fn instructed_total(&self) -> Decimal {
        self.payment_instructions
            .iter()
            .map(PaymentInstruction::instructed_total)
            .sum()
    }

    /// All transactions in document order
    pub fn transactions(&self) -> impl Iterator<Item = &CreditTransferTransaction> {
        self.payment_instructions
            .iter()
            .flat_map(|batch| batch.transactions.iter())
    }

    /// Verify header and batch totals against the decoded transactions
    pub fn check_consistency(&self) -> Result<()> {
        let header = &self.group_header;
        let scope = || format!("group header {}", header.message_id);

        let count = self.transaction_count() as u64;
        if header.number_of_transactions != count {
            return Err(Error::Inconsistent {
                scope: scope(),
                detail: format!(
                    "declares {} transactions, contains {}",
                    header.number_of_transactions, count
                ),
            });
        }

        if let Some(declared) = header.control_sum {
            let actual = self.instructed_total();
            if declared != actual {
                return Err(Error::Inconsistent {
                    scope: scope(),
                    detail: format!("control sum {} does not match total {}", declared, actual),
                });
            }
        }

        self.payment_instructions
            .iter()
            .try_for_each(PaymentInstruction::check_consistency)
    }
}
