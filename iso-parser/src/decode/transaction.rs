//! Credit transfer transaction decoding (`CdtTrfTxInf`)

use super::account::decode_account;
use super::agent::decode_agent;
use super::common::{
    decode_amount, decode_code_or_proprietary, decode_payment_type_information, parse_code,
    required,
};
use super::party::decode_party;
use super::remittance::decode_remittance;
use crate::reader::Subregion;
use crate::Result;
use iso_core::{ChargeBearer, CreditTransferTransaction, Money, PaymentIdentification};
use std::io::BufRead;

const AGGREGATE: &str = "CreditTransferTransaction";

/// Decode one credit transfer transaction
pub fn decode_transaction<R: BufRead>(
    region: &mut Subregion<'_, R>,
) -> Result<CreditTransferTransaction> {
    let mut payment_id = None;
    let mut payment_type_information = None;
    let mut amount = None;
    let mut charge_bearer = None;
    let mut ultimate_debtor = None;
    let mut intermediary_agent = None;
    let mut creditor_agent = None;
    let mut creditor = None;
    let mut creditor_account = None;
    let mut ultimate_creditor = None;
    let mut purpose = None;
    let mut remittance_information = None;

    while let Some(child) = region.next_child()? {
        match child.local_name.as_str() {
            "PmtId" => payment_id = Some(decode_payment_id(&mut region.subregion())?),
            "PmtTpInf" => {
                payment_type_information =
                    Some(decode_payment_type_information(&mut region.subregion())?)
            }
            "Amt" => amount = Some(decode_instructed_amount(&mut region.subregion())?),
            "ChrgBr" => {
                charge_bearer = Some(parse_code::<ChargeBearer>(
                    &region.read_text()?,
                    AGGREGATE,
                    "ChrgBr",
                )?)
            }
            "UltmtDbtr" => ultimate_debtor = Some(decode_party(&mut region.subregion())?),
            "IntrmyAgt1" => intermediary_agent = Some(decode_agent(&mut region.subregion())?),
            "CdtrAgt" => creditor_agent = Some(decode_agent(&mut region.subregion())?),
            "Cdtr" => creditor = Some(decode_party(&mut region.subregion())?),
            "CdtrAcct" => creditor_account = Some(decode_account(&mut region.subregion())?),
            "UltmtCdtr" => ultimate_creditor = Some(decode_party(&mut region.subregion())?),
            "Purp" => {
                purpose = Some(decode_code_or_proprietary(
                    &mut region.subregion(),
                    AGGREGATE,
                    "Purp",
                )?)
            }
            "RmtInf" => remittance_information = Some(decode_remittance(&mut region.subregion())?),
            _ => {}
        }
    }

    Ok(CreditTransferTransaction {
        payment_id: required(payment_id, AGGREGATE, "PmtId")?,
        payment_type_information,
        amount: required(amount, AGGREGATE, "Amt")?,
        charge_bearer,
        ultimate_debtor,
        intermediary_agent,
        creditor_agent,
        creditor: required(creditor, AGGREGATE, "Cdtr")?,
        creditor_account,
        ultimate_creditor,
        purpose,
        remittance_information,
    })
}

fn decode_payment_id<R: BufRead>(region: &mut Subregion<'_, R>) -> Result<PaymentIdentification> {
    const AGGREGATE: &str = "PaymentIdentification";
    let mut instruction_id = None;
    let mut end_to_end_id = None;
    let mut uetr = None;

    while let Some(child) = region.next_child()? {
        match child.local_name.as_str() {
            "InstrId" => instruction_id = Some(region.read_text()?),
            "EndToEndId" => end_to_end_id = Some(region.read_text()?),
            "UETR" => uetr = Some(region.read_text()?),
            _ => {}
        }
    }

    Ok(PaymentIdentification {
        instruction_id,
        end_to_end_id: required(end_to_end_id, AGGREGATE, "EndToEndId")?,
        uetr,
    })
}

/// `Amt` is a choice of `InstdAmt` and `EqvtAmt`; only the instructed amount is supported
fn decode_instructed_amount<R: BufRead>(region: &mut Subregion<'_, R>) -> Result<Money> {
    const AGGREGATE: &str = "Amount";
    let mut amount = None;

    while let Some(child) = region.next_child()? {
        if child.local_name == "InstdAmt" && amount.is_none() {
            amount = Some(decode_amount(region, &child, AGGREGATE, "InstdAmt")?);
        }
    }

    required(amount, AGGREGATE, "InstdAmt")
}
