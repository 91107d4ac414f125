//! Party decoding (`Dbtr`, `Cdtr`, `InitgPty`, ultimate parties)

use super::common::{
    decode_generic_identification, decode_postal_address, parse_date, required, validated,
};
use crate::reader::Subregion;
use crate::Result;
use iso_core::types::{
    ContactDetails, DateAndPlaceOfBirth, OrganisationIdentification, PersonIdentification,
};
use iso_core::{Bic, Party, PartyIdentification};
use std::io::BufRead;

/// Decode a party
pub fn decode_party<R: BufRead>(region: &mut Subregion<'_, R>) -> Result<PartyIdentification> {
    let mut party = PartyIdentification::default();

    while let Some(child) = region.next_child()? {
        match child.local_name.as_str() {
            "Nm" => party.name = Some(region.read_text()?),
            "PstlAdr" => party.postal_address = Some(decode_postal_address(&mut region.subregion())?),
            "Id" => party.identification = decode_party_choice(&mut region.subregion())?,
            "CtryOfRes" => party.country_of_residence = Some(region.read_text()?),
            "CtctDtls" => {
                party.contact_details = Some(decode_contact_details(&mut region.subregion())?)
            }
            _ => {}
        }
    }

    Ok(party)
}

/// `Id` holds either `OrgId` or `PrvtId`; the first one present is used
fn decode_party_choice<R: BufRead>(region: &mut Subregion<'_, R>) -> Result<Option<Party>> {
    let mut party = None;

    while let Some(child) = region.next_child()? {
        if party.is_some() {
            continue;
        }
        match child.local_name.as_str() {
            "OrgId" => party = Some(Party::Organisation(decode_organisation(&mut region.subregion())?)),
            "PrvtId" => party = Some(Party::Private(decode_person(&mut region.subregion())?)),
            _ => {}
        }
    }

    Ok(party)
}

fn decode_organisation<R: BufRead>(
    region: &mut Subregion<'_, R>,
) -> Result<OrganisationIdentification> {
    const AGGREGATE: &str = "OrganisationIdentification";
    let mut org = OrganisationIdentification::default();

    while let Some(child) = region.next_child()? {
        match child.local_name.as_str() {
            "AnyBIC" => {
                org.any_bic = Some(validated(Bic::new(region.read_text()?), AGGREGATE, "AnyBIC")?)
            }
            "BICOrBEI" => {
                org.any_bic = Some(validated(Bic::new(region.read_text()?), AGGREGATE, "BICOrBEI")?)
            }
            "LEI" => org.lei = Some(region.read_text()?),
            "Othr" => org.other.push(decode_generic_identification(
                &mut region.subregion(),
                AGGREGATE,
            )?),
            _ => {}
        }
    }

    Ok(org)
}

fn decode_person<R: BufRead>(region: &mut Subregion<'_, R>) -> Result<PersonIdentification> {
    const AGGREGATE: &str = "PersonIdentification";
    let mut person = PersonIdentification::default();

    while let Some(child) = region.next_child()? {
        match child.local_name.as_str() {
            "DtAndPlcOfBirth" => {
                person.date_and_place_of_birth = Some(decode_birth(&mut region.subregion())?)
            }
            "Othr" => person.other.push(decode_generic_identification(
                &mut region.subregion(),
                AGGREGATE,
            )?),
            _ => {}
        }
    }

    Ok(person)
}

fn decode_birth<R: BufRead>(region: &mut Subregion<'_, R>) -> Result<DateAndPlaceOfBirth> {
    const AGGREGATE: &str = "DateAndPlaceOfBirth";
    let mut birth_date = None;
    let mut province = None;
    let mut city = None;
    let mut country = None;

    while let Some(child) = region.next_child()? {
        match child.local_name.as_str() {
            "BirthDt" => birth_date = Some(parse_date(&region.read_text()?, AGGREGATE, "BirthDt")?),
            "PrvcOfBirth" => province = Some(region.read_text()?),
            "CityOfBirth" => city = Some(region.read_text()?),
            "CtryOfBirth" => country = Some(region.read_text()?),
            _ => {}
        }
    }

    Ok(DateAndPlaceOfBirth {
        birth_date: required(birth_date, AGGREGATE, "BirthDt")?,
        province,
        city: required(city, AGGREGATE, "CityOfBirth")?,
        country: required(country, AGGREGATE, "CtryOfBirth")?,
    })
}

fn decode_contact_details<R: BufRead>(region: &mut Subregion<'_, R>) -> Result<ContactDetails> {
    let mut contact = ContactDetails::default();

    while let Some(child) = region.next_child()? {
        match child.local_name.as_str() {
            "Nm" => contact.name = Some(region.read_text()?),
            "PhneNb" => contact.phone_number = Some(region.read_text()?),
            "EmailAdr" => contact.email_address = Some(region.read_text()?),
            _ => {}
        }
    }

    Ok(contact)
}
