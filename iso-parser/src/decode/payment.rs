//! Payment instruction decoding (`PmtInf`)

use super::account::decode_account;
use super::agent::decode_agent;
use super::common::{
    decode_payment_type_information, parse_bool, parse_code, parse_count, parse_date,
    parse_date_time, parse_decimal, required,
};
use super::party::decode_party;
use super::transaction::decode_transaction;
use crate::reader::{Subregion, XmlEvent};
use crate::Result;
use iso_core::{ChargeBearer, ExecutionDate, PaymentInstruction, PaymentMethod};
use std::io::BufRead;

const AGGREGATE: &str = "PaymentInstruction";

/// Decode a payment instruction with all of its transactions
pub fn decode_payment_instruction<R: BufRead>(
    region: &mut Subregion<'_, R>,
) -> Result<PaymentInstruction> {
    let mut payment_information_id = None;
    let mut payment_method = None;
    let mut batch_booking = None;
    let mut number_of_transactions = None;
    let mut control_sum = None;
    let mut payment_type_information = None;
    let mut requested_execution_date = None;
    let mut debtor = None;
    let mut debtor_account = None;
    let mut debtor_agent = None;
    let mut ultimate_debtor = None;
    let mut charge_bearer = None;
    let mut transactions = Vec::new();

    while let Some(child) = region.next_child()? {
        match child.local_name.as_str() {
            "PmtInfId" => payment_information_id = Some(region.read_text()?),
            "PmtMtd" => {
                payment_method = Some(parse_code::<PaymentMethod>(
                    &region.read_text()?,
                    AGGREGATE,
                    "PmtMtd",
                )?)
            }
            "BtchBookg" => batch_booking = Some(parse_bool(&region.read_text()?, AGGREGATE, "BtchBookg")?),
            "NbOfTxs" => {
                number_of_transactions = Some(parse_count(&region.read_text()?, AGGREGATE, "NbOfTxs")?)
            }
            "CtrlSum" => control_sum = Some(parse_decimal(&region.read_text()?, AGGREGATE, "CtrlSum")?),
            "PmtTpInf" => {
                payment_type_information =
                    Some(decode_payment_type_information(&mut region.subregion())?)
            }
            "ReqdExctnDt" => {
                requested_execution_date = Some(decode_execution_date(&mut region.subregion())?)
            }
            "Dbtr" => debtor = Some(decode_party(&mut region.subregion())?),
            "DbtrAcct" => debtor_account = Some(decode_account(&mut region.subregion())?),
            "DbtrAgt" => debtor_agent = Some(decode_agent(&mut region.subregion())?),
            "UltmtDbtr" => ultimate_debtor = Some(decode_party(&mut region.subregion())?),
            "ChrgBr" => {
                charge_bearer = Some(parse_code::<ChargeBearer>(
                    &region.read_text()?,
                    AGGREGATE,
                    "ChrgBr",
                )?)
            }
            "CdtTrfTxInf" => transactions.push(decode_transaction(&mut region.subregion())?),
            _ => {}
        }
    }

    Ok(PaymentInstruction {
        payment_information_id: required(payment_information_id, AGGREGATE, "PmtInfId")?,
        payment_method: required(payment_method, AGGREGATE, "PmtMtd")?,
        batch_booking,
        number_of_transactions,
        control_sum,
        payment_type_information,
        requested_execution_date: required(requested_execution_date, AGGREGATE, "ReqdExctnDt")?,
        debtor: required(debtor, AGGREGATE, "Dbtr")?,
        debtor_account: required(debtor_account, AGGREGATE, "DbtrAcct")?,
        debtor_agent: required(debtor_agent, AGGREGATE, "DbtrAgt")?,
        ultimate_debtor,
        charge_bearer,
        transactions,
    })
}

/// `ReqdExctnDt`: bare date (001.03) or a `Dt` / `DtTm` choice (001.09+)
pub fn decode_execution_date<R: BufRead>(region: &mut Subregion<'_, R>) -> Result<ExecutionDate> {
    let mut text = String::new();
    let mut date = None;

    loop {
        match region.next_event()? {
            XmlEvent::Text(chunk) => text.push_str(&chunk),
            XmlEvent::Start(child) if date.is_none() && child.local_name == "Dt" => {
                date = Some(ExecutionDate::Date(parse_date(
                    &region.read_text()?,
                    AGGREGATE,
                    "ReqdExctnDt",
                )?));
            }
            XmlEvent::Start(child) if date.is_none() && child.local_name == "DtTm" => {
                date = Some(ExecutionDate::DateTime(parse_date_time(
                    &region.read_text()?,
                    AGGREGATE,
                    "ReqdExctnDt",
                )?));
            }
            XmlEvent::Start(_) => region.skip()?,
            XmlEvent::End(_) => {}
            XmlEvent::Eof => break,
        }
    }

    match date {
        Some(date) => Ok(date),
        None if text.trim().is_empty() => Err(crate::Error::MissingField {
            aggregate: AGGREGATE,
            field: "ReqdExctnDt",
        }),
        None => Ok(ExecutionDate::Date(parse_date(
            text.trim(),
            AGGREGATE,
            "ReqdExctnDt",
        )?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::XmlCursor;
    use crate::Error;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn decode(xml: &str) -> Result<PaymentInstruction> {
        let mut cursor = XmlCursor::new(xml.as_bytes());
        cursor.next_start()?;
        let mut region = cursor.subregion();
        decode_payment_instruction(&mut region)
    }

    fn batch(execution_date: &str, extra: &str) -> String {
        format!(
            r#"<PmtInf>
                <PmtInfId>PMT-1</PmtInfId>
                <PmtMtd>TRF</PmtMtd>
                <BtchBookg>true</BtchBookg>
                <NbOfTxs>2</NbOfTxs>
                <CtrlSum>1500.00</CtrlSum>
                {}
                <Dbtr><Nm>ACME</Nm></Dbtr>
                <DbtrAcct><Id><IBAN>DE89370400440532013000</IBAN></Id></DbtrAcct>
                <DbtrAgt><FinInstnId><BICFI>DEUTDEFF</BICFI></FinInstnId></DbtrAgt>
                <ChrgBr>SLEV</ChrgBr>
                {}
                <CdtTrfTxInf>
                    <PmtId><EndToEndId>E2E-1</EndToEndId></PmtId>
                    <Amt><InstdAmt Ccy="EUR">1000.00</InstdAmt></Amt>
                    <Cdtr><Nm>One</Nm></Cdtr>
                </CdtTrfTxInf>
                <CdtTrfTxInf>
                    <PmtId><EndToEndId>E2E-2</EndToEndId></PmtId>
                    <Amt><InstdAmt Ccy="EUR">500.00</InstdAmt></Amt>
                    <Cdtr><Nm>Two</Nm></Cdtr>
                </CdtTrfTxInf>
            </PmtInf>"#,
            execution_date, extra
        )
    }

    #[test]
    fn test_batch_with_transactions_in_order() {
        let payment = decode(&batch("<ReqdExctnDt><Dt>2024-01-16</Dt></ReqdExctnDt>", "")).unwrap();

        assert_eq!(payment.payment_information_id, "PMT-1");
        assert_eq!(payment.payment_method, PaymentMethod::CreditTransfer);
        assert_eq!(payment.batch_booking, Some(true));
        assert_eq!(payment.control_sum, Some(dec!(1500.00)));
        assert_eq!(payment.charge_bearer, Some(ChargeBearer::ServiceLevel));
        assert_eq!(
            payment.requested_execution_date,
            ExecutionDate::Date(NaiveDate::from_ymd_opt(2024, 1, 16).unwrap())
        );

        let ids: Vec<_> = payment
            .transactions
            .iter()
            .map(|tx| tx.payment_id.end_to_end_id.as_str())
            .collect();
        assert_eq!(ids, vec!["E2E-1", "E2E-2"]);
        assert!(payment.check_consistency().is_ok());
    }

    #[test]
    fn test_bare_execution_date() {
        let payment = decode(&batch("<ReqdExctnDt>2024-01-16</ReqdExctnDt>", "")).unwrap();
        assert_eq!(
            payment.requested_execution_date.date(),
            NaiveDate::from_ymd_opt(2024, 1, 16).unwrap()
        );
    }

    #[test]
    fn test_execution_date_time() {
        let payment = decode(&batch(
            "<ReqdExctnDt><DtTm>2024-01-16T09:00:00+01:00</DtTm></ReqdExctnDt>",
            "",
        ))
        .unwrap();
        assert!(matches!(payment.requested_execution_date, ExecutionDate::DateTime(_)));
    }

    #[test]
    fn test_missing_execution_date() {
        let err = decode(&batch("", "")).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingField {
                aggregate: "PaymentInstruction",
                field: "ReqdExctnDt"
            }
        ));
    }

    #[test]
    fn test_unknown_payment_method() {
        let xml = batch("<ReqdExctnDt>2024-01-16</ReqdExctnDt>", "").replace(">TRF<", ">DD<");
        let err = decode(&xml).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { field: "PmtMtd", .. }));
    }

    #[test]
    fn test_unknown_children_are_ignored() {
        let payment = decode(&batch(
            "<ReqdExctnDt>2024-01-16</ReqdExctnDt>",
            "<InstrForDbtrAgt>note</InstrForDbtrAgt><Future><Nested/></Future>",
        ))
        .unwrap();
        assert_eq!(payment.transactions.len(), 2);
    }

    #[test]
    fn test_transaction_failure_fails_batch() {
        let xml = batch("<ReqdExctnDt>2024-01-16</ReqdExctnDt>", "").replace("E2E-2", "");
        let xml = xml.replace("<EndToEndId></EndToEndId>", "");
        let err = decode(&xml).unwrap_err();
        assert!(matches!(err, Error::MissingField { field: "EndToEndId", .. }));
    }
}
