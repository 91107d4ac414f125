//! Remittance information decoding (`RmtInf`)
//!
//! A creditor reference typed `SCOR` that starts with `RF` is checked as an
//! ISO 11649 structured reference; a bad check digit fails the remittance.

use super::common::{decode_code_or_proprietary, parse_date, validated};
use crate::reader::{Subregion, XmlEvent};
use crate::Result;
use iso_core::types::{
    CreditorReferenceInformation, ReferredDocument, StructuredRemittance,
};
use iso_core::{CodeOrProprietary, CreditorReference, RemittanceInformation};
use std::io::BufRead;

/// Reference type code for structured creditor references
pub const STRUCTURED_CREDITOR_REFERENCE: &str = "SCOR";

/// Decode remittance information
pub fn decode_remittance<R: BufRead>(region: &mut Subregion<'_, R>) -> Result<RemittanceInformation> {
    let mut remittance = RemittanceInformation::default();

    while let Some(child) = region.next_child()? {
        match child.local_name.as_str() {
            "Ustrd" => remittance.unstructured.push(region.read_text()?),
            "Strd" => remittance
                .structured
                .push(decode_structured(&mut region.subregion())?),
            _ => {}
        }
    }

    Ok(remittance)
}

fn decode_structured<R: BufRead>(region: &mut Subregion<'_, R>) -> Result<StructuredRemittance> {
    let mut structured = StructuredRemittance::default();

    while let Some(child) = region.next_child()? {
        match child.local_name.as_str() {
            "RfrdDocInf" => structured
                .referred_documents
                .push(decode_referred_document(&mut region.subregion())?),
            "CdtrRefInf" => {
                structured.creditor_reference =
                    Some(decode_creditor_reference(&mut region.subregion())?)
            }
            "AddtlRmtInf" => structured.additional_information.push(region.read_text()?),
            _ => {}
        }
    }

    Ok(structured)
}

fn decode_referred_document<R: BufRead>(region: &mut Subregion<'_, R>) -> Result<ReferredDocument> {
    const AGGREGATE: &str = "ReferredDocument";
    let mut document = ReferredDocument::default();

    while let Some(child) = region.next_child()? {
        match child.local_name.as_str() {
            "Tp" => document.document_type = decode_typed_code(&mut region.subregion(), AGGREGATE)?.0,
            "Nb" => document.number = Some(region.read_text()?),
            "RltdDt" => document.related_date = Some(related_date(&mut region.subregion())?),
            _ => {}
        }
    }

    Ok(document)
}

/// `RltdDt` is a bare date up to 001.09 and a `Dt` child in later revisions
fn related_date<R: BufRead>(region: &mut Subregion<'_, R>) -> Result<chrono::NaiveDate> {
    const AGGREGATE: &str = "ReferredDocument";
    let mut text = String::new();
    let mut date = None;

    loop {
        match region.next_event()? {
            XmlEvent::Text(chunk) => text.push_str(&chunk),
            XmlEvent::Start(child) if child.local_name == "Dt" && date.is_none() => {
                date = Some(parse_date(&region.read_text()?, AGGREGATE, "RltdDt")?);
            }
            XmlEvent::Start(_) => region.skip()?,
            XmlEvent::End(_) => {}
            XmlEvent::Eof => break,
        }
    }

    match date {
        Some(date) => Ok(date),
        None => parse_date(text.trim(), AGGREGATE, "RltdDt"),
    }
}

fn decode_creditor_reference<R: BufRead>(
    region: &mut Subregion<'_, R>,
) -> Result<CreditorReferenceInformation> {
    const AGGREGATE: &str = "CreditorReferenceInformation";
    let mut info = CreditorReferenceInformation::default();

    while let Some(child) = region.next_child()? {
        match child.local_name.as_str() {
            "Tp" => {
                let (reference_type, issuer) = decode_typed_code(&mut region.subregion(), AGGREGATE)?;
                info.reference_type = reference_type;
                info.issuer = issuer;
            }
            "Ref" => info.reference = Some(region.read_text()?),
            _ => {}
        }
    }

    let is_scor = info
        .reference_type
        .as_ref()
        .and_then(CodeOrProprietary::code)
        == Some(STRUCTURED_CREDITOR_REFERENCE);
    if let Some(reference) = info.reference.as_deref() {
        let rf_prefixed = reference
            .trim_start()
            .get(..2)
            .map_or(false, |prefix| prefix.eq_ignore_ascii_case("RF"));
        if is_scor && rf_prefixed {
            info.structured_reference =
                Some(validated(CreditorReference::new(reference), AGGREGATE, "Ref")?);
        }
    }

    Ok(info)
}

/// `Tp` blocks wrap a `CdOrPrtry` choice plus an optional issuer
fn decode_typed_code<R: BufRead>(
    region: &mut Subregion<'_, R>,
    aggregate: &'static str,
) -> Result<(Option<CodeOrProprietary>, Option<String>)> {
    let mut code = None;
    let mut issuer = None;

    while let Some(child) = region.next_child()? {
        match child.local_name.as_str() {
            "CdOrPrtry" => {
                code = Some(decode_code_or_proprietary(
                    &mut region.subregion(),
                    aggregate,
                    "CdOrPrtry",
                )?)
            }
            "Issr" => issuer = Some(region.read_text()?),
            _ => {}
        }
    }

    Ok((code, issuer))
}
