//! Agent decoding (`DbtrAgt`, `CdtrAgt`, `IntrmyAgt1`, `FwdgAgt`)

use super::common::{
    decode_code_or_proprietary, decode_generic_identification, decode_postal_address, required,
    validated,
};
use crate::reader::Subregion;
use crate::Result;
use iso_core::types::{BranchIdentification, ClearingSystemMember, FinancialInstitution};
use iso_core::{Agent, Bic};
use std::io::BufRead;

const AGGREGATE: &str = "FinancialInstitution";

/// Decode an agent: institution identification plus optional branch
pub fn decode_agent<R: BufRead>(region: &mut Subregion<'_, R>) -> Result<Agent> {
    let mut financial_institution = None;
    let mut branch = None;

    while let Some(child) = region.next_child()? {
        match child.local_name.as_str() {
            "FinInstnId" => {
                financial_institution = Some(decode_financial_institution(&mut region.subregion())?)
            }
            "BrnchId" => branch = Some(decode_branch(&mut region.subregion())?),
            _ => {}
        }
    }

    Ok(Agent {
        financial_institution: required(financial_institution, "Agent", "FinInstnId")?,
        branch,
    })
}

/// Decode `FinInstnId`; accepts `BICFI` and the older `BIC`
pub fn decode_financial_institution<R: BufRead>(
    region: &mut Subregion<'_, R>,
) -> Result<FinancialInstitution> {
    let mut institution = FinancialInstitution::default();

    while let Some(child) = region.next_child()? {
        match child.local_name.as_str() {
            "BICFI" => {
                institution.bic = Some(validated(Bic::new(region.read_text()?), AGGREGATE, "BICFI")?)
            }
            "BIC" => {
                institution.bic = Some(validated(Bic::new(region.read_text()?), AGGREGATE, "BIC")?)
            }
            "ClrSysMmbId" => {
                institution.clearing_system_member =
                    Some(decode_clearing_member(&mut region.subregion())?)
            }
            "LEI" => institution.lei = Some(region.read_text()?),
            "Nm" => institution.name = Some(region.read_text()?),
            "PstlAdr" => {
                institution.postal_address = Some(decode_postal_address(&mut region.subregion())?)
            }
            "Othr" => {
                institution.other = Some(decode_generic_identification(
                    &mut region.subregion(),
                    AGGREGATE,
                )?)
            }
            _ => {}
        }
    }

    Ok(institution)
}

fn decode_clearing_member<R: BufRead>(region: &mut Subregion<'_, R>) -> Result<ClearingSystemMember> {
    const AGGREGATE: &str = "ClearingSystemMember";
    let mut clearing_system = None;
    let mut member_id = None;

    while let Some(child) = region.next_child()? {
        match child.local_name.as_str() {
            "ClrSysId" => {
                clearing_system = Some(decode_code_or_proprietary(
                    &mut region.subregion(),
                    AGGREGATE,
                    "ClrSysId",
                )?)
            }
            "MmbId" => member_id = Some(region.read_text()?),
            _ => {}
        }
    }

    Ok(ClearingSystemMember {
        clearing_system,
        member_id: required(member_id, AGGREGATE, "MmbId")?,
    })
}

fn decode_branch<R: BufRead>(region: &mut Subregion<'_, R>) -> Result<BranchIdentification> {
    let mut branch = BranchIdentification::default();

    while let Some(child) = region.next_child()? {
        match child.local_name.as_str() {
            "Id" => branch.id = Some(region.read_text()?),
            "Nm" => branch.name = Some(region.read_text()?),
            _ => {}
        }
    }

    Ok(branch)
}
