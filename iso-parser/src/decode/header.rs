//! Group header decoding (`GrpHdr`)

use super::agent::decode_agent;
use super::common::{parse_count, parse_date_time, parse_decimal, required};
use super::party::decode_party;
use crate::reader::Subregion;
use crate::Result;
use iso_core::GroupHeader;
use std::io::BufRead;

const AGGREGATE: &str = "GroupHeader";

/// Decode the group header
pub fn decode_group_header<R: BufRead>(region: &mut Subregion<'_, R>) -> Result<GroupHeader> {
    let mut message_id = None;
    let mut creation_date_time = None;
    let mut number_of_transactions = None;
    let mut control_sum = None;
    let mut initiating_party = None;
    let mut forwarding_agent = None;

    while let Some(child) = region.next_child()? {
        match child.local_name.as_str() {
            "MsgId" => message_id = Some(region.read_text()?),
            "CreDtTm" => {
                creation_date_time = Some(parse_date_time(&region.read_text()?, AGGREGATE, "CreDtTm")?)
            }
            "NbOfTxs" => {
                number_of_transactions = Some(parse_count(&region.read_text()?, AGGREGATE, "NbOfTxs")?)
            }
            "CtrlSum" => control_sum = Some(parse_decimal(&region.read_text()?, AGGREGATE, "CtrlSum")?),
            "InitgPty" => initiating_party = Some(decode_party(&mut region.subregion())?),
            "FwdgAgt" => forwarding_agent = Some(decode_agent(&mut region.subregion())?),
            _ => {}
        }
    }

    Ok(GroupHeader {
        message_id: required(message_id, AGGREGATE, "MsgId")?,
        creation_date_time: required(creation_date_time, AGGREGATE, "CreDtTm")?,
        number_of_transactions: required(number_of_transactions, AGGREGATE, "NbOfTxs")?,
        control_sum,
        initiating_party: required(initiating_party, AGGREGATE, "InitgPty")?,
        forwarding_agent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::XmlCursor;
    use crate::Error;
    use rust_decimal_macros::dec;

    fn decode(xml: &str) -> Result<GroupHeader> {
        let mut cursor = XmlCursor::new(xml.as_bytes());
        cursor.next_start()?;
        let mut region = cursor.subregion();
        decode_group_header(&mut region)
    }

    #[test]
    fn test_header() {
        let header = decode(
            "<GrpHdr><MsgId>MSG-1</MsgId><CreDtTm>2024-01-15T10:00:00</CreDtTm><NbOfTxs>2</NbOfTxs>\
             <CtrlSum>1500.00</CtrlSum><InitgPty><Nm>ACME</Nm></InitgPty>\
             <FwdgAgt><FinInstnId><BICFI>DEUTDEFF</BICFI></FinInstnId></FwdgAgt></GrpHdr>",
        )
        .unwrap();

        assert_eq!(header.message_id, "MSG-1");
        assert_eq!(header.number_of_transactions, 2);
        assert_eq!(header.control_sum, Some(dec!(1500.00)));
        assert_eq!(header.initiating_party.name.as_deref(), Some("ACME"));
        assert!(header.forwarding_agent.is_some());
        assert_eq!(header.creation_date_time.to_rfc3339(), "2024-01-15T10:00:00+00:00");
    }

    #[test]
    fn test_missing_message_id() {
        let err = decode(
            "<GrpHdr><CreDtTm>2024-01-15T10:00:00</CreDtTm><NbOfTxs>2</NbOfTxs><InitgPty/></GrpHdr>",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::MissingField {
                aggregate: "GroupHeader",
                field: "MsgId"
            }
        ));
    }

    #[test]
    fn test_bad_count() {
        let err = decode(
            "<GrpHdr><MsgId>M</MsgId><CreDtTm>2024-01-15T10:00:00</CreDtTm><NbOfTxs>two</NbOfTxs><InitgPty/></GrpHdr>",
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidValue { field: "NbOfTxs", .. }));
    }
}
