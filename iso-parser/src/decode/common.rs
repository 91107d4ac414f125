//! Scalar parsing and small shared aggregates

use crate::reader::{StartElement, Subregion};
use crate::{Error, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use iso_core::types::{GenericIdentification, PaymentTypeInformation, PostalAddress};
use iso_core::{CodeOrProprietary, CurrencyCode, Money};
use rust_decimal::Decimal;
use std::io::BufRead;

/// Turn an absent required child into a `MissingField` error
pub(crate) fn required<T>(value: Option<T>, aggregate: &'static str, field: &'static str) -> Result<T> {
    value.ok_or(Error::MissingField { aggregate, field })
}

/// Attach field context to a value type error
pub(crate) fn validated<T>(
    result: iso_core::Result<T>,
    aggregate: &'static str,
    field: &'static str,
) -> Result<T> {
    result.map_err(|source| Error::Validation {
        aggregate,
        field,
        source,
    })
}

fn invalid(aggregate: &'static str, field: &'static str, value: &str) -> Error {
    Error::InvalidValue {
        aggregate,
        field,
        value: value.to_string(),
    }
}

/// Decimal with `.` as separator; signs, exponents and grouping are rejected
pub(crate) fn parse_decimal(text: &str, aggregate: &'static str, field: &'static str) -> Result<Decimal> {
    let mut parts = text.split('.');
    let whole = parts.next().unwrap_or_default();
    let fraction = parts.next();

    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    let well_formed = digits(whole) && fraction.map_or(true, digits) && parts.next().is_none();
    if !well_formed {
        return Err(invalid(aggregate, field, text));
    }

    text.parse::<Decimal>()
        .map_err(|_| invalid(aggregate, field, text))
}

/// Enumerated code such as `ChrgBr` or `PmtMtd`
pub(crate) fn parse_code<T: std::str::FromStr>(
    text: &str,
    aggregate: &'static str,
    field: &'static str,
) -> Result<T> {
    text.parse().map_err(|_| invalid(aggregate, field, text))
}

/// Non-negative count such as `NbOfTxs`
pub(crate) fn parse_count(text: &str, aggregate: &'static str, field: &'static str) -> Result<u64> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(aggregate, field, text));
    }
    text.parse().map_err(|_| invalid(aggregate, field, text))
}

/// XML schema boolean
pub(crate) fn parse_bool(text: &str, aggregate: &'static str, field: &'static str) -> Result<bool> {
    match text {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(invalid(aggregate, field, text)),
    }
}

/// ISO date `YYYY-MM-DD`
pub(crate) fn parse_date(text: &str, aggregate: &'static str, field: &'static str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|_| invalid(aggregate, field, text))
}

/// ISO date-time; a value without offset is taken as UTC
pub(crate) fn parse_date_time(
    text: &str,
    aggregate: &'static str,
    field: &'static str,
) -> Result<DateTime<FixedOffset>> {
    if let Ok(date_time) = DateTime::parse_from_rfc3339(text) {
        return Ok(date_time);
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc().fixed_offset())
        .map_err(|_| invalid(aggregate, field, text))
}

/// Read a `Cd` / `Prtry` choice; the first alternative in document order wins
pub fn decode_code_or_proprietary<R: BufRead>(
    region: &mut Subregion<'_, R>,
    aggregate: &'static str,
    field: &'static str,
) -> Result<CodeOrProprietary> {
    let mut value = None;
    while let Some(child) = region.next_child()? {
        if value.is_some() {
            continue;
        }
        match child.local_name.as_str() {
            "Cd" => value = Some(CodeOrProprietary::Code(region.read_text()?)),
            "Prtry" => value = Some(CodeOrProprietary::Proprietary(region.read_text()?)),
            _ => {}
        }
    }
    required(value, aggregate, field)
}

/// Read an amount element: decimal text plus `Ccy` attribute
pub fn decode_amount<R: BufRead>(
    region: &mut Subregion<'_, R>,
    element: &StartElement,
    aggregate: &'static str,
    field: &'static str,
) -> Result<Money> {
    let currency = required(element.attribute("Ccy"), aggregate, "Ccy")?;
    let currency = validated(CurrencyCode::new(currency), aggregate, "Ccy")?;

    let text = region.read_text()?;
    if text.is_empty() {
        return Err(Error::MissingField { aggregate, field });
    }
    let amount = parse_decimal(&text, aggregate, field)?;

    Ok(Money::new(amount, currency))
}

/// Generic identification (`Othr`)
pub fn decode_generic_identification<R: BufRead>(
    region: &mut Subregion<'_, R>,
    aggregate: &'static str,
) -> Result<GenericIdentification> {
    let mut id = None;
    let mut scheme_name = None;
    let mut issuer = None;

    while let Some(child) = region.next_child()? {
        match child.local_name.as_str() {
            "Id" => id = Some(region.read_text()?),
            "SchmeNm" => {
                scheme_name = Some(decode_code_or_proprietary(
                    &mut region.subregion(),
                    aggregate,
                    "SchmeNm",
                )?)
            }
            "Issr" => issuer = Some(region.read_text()?),
            _ => {}
        }
    }

    Ok(GenericIdentification {
        id: required(id, aggregate, "Id")?,
        scheme_name,
        issuer,
    })
}

/// Postal address (`PstlAdr`)
pub fn decode_postal_address<R: BufRead>(region: &mut Subregion<'_, R>) -> Result<PostalAddress> {
    let mut address = PostalAddress::default();

    while let Some(child) = region.next_child()? {
        match child.local_name.as_str() {
            "Dept" => address.department = Some(region.read_text()?),
            "StrtNm" => address.street_name = Some(region.read_text()?),
            "BldgNb" => address.building_number = Some(region.read_text()?),
            "PstCd" => address.post_code = Some(region.read_text()?),
            "TwnNm" => address.town_name = Some(region.read_text()?),
            "CtrySubDvsn" => address.country_sub_division = Some(region.read_text()?),
            "Ctry" => address.country = Some(region.read_text()?),
            "AdrLine" => address.address_lines.push(region.read_text()?),
            _ => {}
        }
    }

    Ok(address)
}

/// Payment type information (`PmtTpInf`)
pub fn decode_payment_type_information<R: BufRead>(
    region: &mut Subregion<'_, R>,
) -> Result<PaymentTypeInformation> {
    const AGGREGATE: &str = "PaymentTypeInformation";
    let mut info = PaymentTypeInformation::default();

    while let Some(child) = region.next_child()? {
        match child.local_name.as_str() {
            "InstrPrty" => info.instruction_priority = Some(region.read_text()?),
            // Repeatable from 001.09 on; the first occurrence is kept
            "SvcLvl" if info.service_level.is_none() => {
                info.service_level = Some(decode_code_or_proprietary(
                    &mut region.subregion(),
                    AGGREGATE,
                    "SvcLvl",
                )?)
            }
            "LclInstrm" => {
                info.local_instrument = Some(decode_code_or_proprietary(
                    &mut region.subregion(),
                    AGGREGATE,
                    "LclInstrm",
                )?)
            }
            "CtgyPurp" => {
                info.category_purpose = Some(decode_code_or_proprietary(
                    &mut region.subregion(),
                    AGGREGATE,
                    "CtgyPurp",
                )?)
            }
            _ => {}
        }
    }

    Ok(info)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::XmlCursor;
    use rust_decimal_macros::dec;

    fn with_region<T>(xml: &str, f: impl FnOnce(&mut Subregion<'_, &[u8]>) -> Result<T>) -> Result<T> {
        let mut cursor = XmlCursor::new(xml.as_bytes());
        cursor.next_start()?;
        let mut region = cursor.subregion();
        f(&mut region)
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("1500.00", "A", "F").unwrap(), dec!(1500.00));
        assert_eq!(parse_decimal("7", "A", "F").unwrap(), dec!(7));
        for bad in ["", "1,5", "-1", "1.", ".5", "1.2.3", "1e5", " 1"] {
            assert!(
                matches!(parse_decimal(bad, "A", "F"), Err(Error::InvalidValue { .. })),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_parse_date_time_without_offset_is_utc() {
        let parsed = parse_date_time("2024-01-15T10:00:00", "A", "F").unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 0);
        let offset = parse_date_time("2024-01-15T10:00:00+02:00", "A", "F").unwrap();
        assert_eq!(offset.offset().local_minus_utc(), 7200);
        let fractional = parse_date_time("2024-01-15T10:00:00.123", "A", "F").unwrap();
        assert_eq!(fractional.timestamp_subsec_millis(), 123);
        assert!(parse_date_time("15/01/2024", "A", "F").is_err());
    }

    #[test]
    fn test_parse_scalars() {
        assert_eq!(parse_count("12", "A", "F").unwrap(), 12);
        assert!(parse_count("-1", "A", "F").is_err());
        assert!(parse_bool("true", "A", "F").unwrap());
        assert!(!parse_bool("0", "A", "F").unwrap());
        assert!(parse_bool("yes", "A", "F").is_err());
        assert!(parse_date("2024-02-30", "A", "F").is_err());
    }

    #[test]
    fn test_code_or_proprietary_first_wins() {
        let value = with_region("<Tp><Prtry>OWN</Prtry><Cd>SEPA</Cd></Tp>", |region| {
            decode_code_or_proprietary(region, "Test", "Tp")
        })
        .unwrap();
        assert_eq!(value, CodeOrProprietary::Proprietary("OWN".to_string()));
    }

    #[test]
    fn test_code_or_proprietary_missing() {
        let err = with_region("<Tp><Other>x</Other></Tp>", |region| {
            decode_code_or_proprietary(region, "Test", "Tp")
        })
        .unwrap_err();
        assert!(matches!(
            err,
            Error::MissingField {
                aggregate: "Test",
                field: "Tp"
            }
        ));
    }

    #[test]
    fn test_amount() {
        let money = with_region(r#"<Amt><InstdAmt Ccy="EUR">1000.00</InstdAmt></Amt>"#, |region| {
            let element = region.next_child()?.unwrap();
            decode_amount(region, &element, "Amount", "InstdAmt")
        })
        .unwrap();
        assert_eq!(money.amount, dec!(1000.00));
        assert_eq!(money.currency.as_str(), "EUR");
    }

    #[test]
    fn test_amount_requires_currency() {
        let err = with_region("<Amt><InstdAmt>1000.00</InstdAmt></Amt>", |region| {
            let element = region.next_child()?.unwrap();
            decode_amount(region, &element, "Amount", "InstdAmt")
        })
        .unwrap_err();
        assert!(matches!(err, Error::MissingField { field: "Ccy", .. }));
    }

    #[test]
    fn test_amount_requires_value() {
        let err = with_region(r#"<Amt><InstdAmt Ccy="EUR"/></Amt>"#, |region| {
            let element = region.next_child()?.unwrap();
            decode_amount(region, &element, "Amount", "InstdAmt")
        })
        .unwrap_err();
        assert!(matches!(err, Error::MissingField { field: "InstdAmt", .. }));
    }

    #[test]
    fn test_postal_address_lines_in_order() {
        let address = with_region(
            "<PstlAdr><Ctry>DE</Ctry><AdrLine>Line 1</AdrLine><AdrLine>Line 2</AdrLine></PstlAdr>",
            |region| decode_postal_address(region),
        )
        .unwrap();
        assert_eq!(address.country.as_deref(), Some("DE"));
        assert_eq!(address.address_lines, vec!["Line 1", "Line 2"]);
    }
}
