//! Cash account decoding (`DbtrAcct`, `CdtrAcct`)

use super::common::{
    decode_code_or_proprietary, decode_generic_identification, required, validated,
};
use crate::reader::Subregion;
use crate::Result;
use iso_core::{AccountIdentification, CashAccount, CurrencyCode, Iban};
use std::io::BufRead;

const AGGREGATE: &str = "CashAccount";

/// Decode a cash account; the IBAN is validated on the way in
pub fn decode_account<R: BufRead>(region: &mut Subregion<'_, R>) -> Result<CashAccount> {
    let mut identification = None;
    let mut account_type = None;
    let mut currency = None;
    let mut name = None;

    while let Some(child) = region.next_child()? {
        match child.local_name.as_str() {
            "Id" => identification = decode_account_id(&mut region.subregion())?,
            "Tp" => {
                account_type = Some(decode_code_or_proprietary(
                    &mut region.subregion(),
                    AGGREGATE,
                    "Tp",
                )?)
            }
            "Ccy" => currency = Some(validated(CurrencyCode::new(region.read_text()?), AGGREGATE, "Ccy")?),
            "Nm" => name = Some(region.read_text()?),
            _ => {}
        }
    }

    Ok(CashAccount {
        identification: required(identification, AGGREGATE, "Id")?,
        account_type,
        currency,
        name,
    })
}

fn decode_account_id<R: BufRead>(
    region: &mut Subregion<'_, R>,
) -> Result<Option<AccountIdentification>> {
    let mut id = None;

    while let Some(child) = region.next_child()? {
        if id.is_some() {
            continue;
        }
        match child.local_name.as_str() {
            "IBAN" => {
                let iban = validated(Iban::new(region.read_text()?), AGGREGATE, "IBAN")?;
                id = Some(AccountIdentification::Iban(iban));
            }
            "Othr" => {
                let other = decode_generic_identification(&mut region.subregion(), AGGREGATE)?;
                id = Some(AccountIdentification::Other(other));
            }
            _ => {}
        }
    }

    Ok(id)
}
