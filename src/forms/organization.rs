//! Hospital system and hospital forms.

use rusqlite::Connection;

use super::convert::{
    address, contact_info, opt_enum, opt_int, put_address, put_contact_info, put_num, put_opt,
    required_text, ADDRESS_FIELDS, CONTACT_FIELDS,
};
use super::{EntityForm, FormError, FormFields};
use crate::db::{self, DatabaseError, Table};
use crate::models::enums::TraumaLevel;
use crate::models::{Hospital, HospitalPayload, HospitalSystem, HospitalSystemPayload};

fn blank(names: &[&str]) -> FormFields {
    names
        .iter()
        .chain(ADDRESS_FIELDS.iter())
        .chain(CONTACT_FIELDS.iter())
        .map(|name| (name.to_string(), String::new()))
        .collect()
}

#[derive(Debug)]
pub struct HospitalSystemForm;

impl EntityForm for HospitalSystemForm {
    type Row = HospitalSystem;
    type Payload = HospitalSystemPayload;

    const TABLE: Table = Table::HospitalSystems;
    const REQUIRED: &'static [&'static str] = &["name"];

    fn defaults() -> FormFields {
        blank(&["name", "region_id"])
    }

    fn fields_from_row(row: &HospitalSystem) -> FormFields {
        let mut fields = Self::defaults();
        put_opt(&mut fields, "name", Some(&row.name));
        put_num(&mut fields, "region_id", row.region_id);
        put_address(&mut fields, row.address.as_ref());
        put_contact_info(&mut fields, row.contact_info.as_ref());
        fields
    }

    fn payload_from_fields(fields: &FormFields) -> Result<HospitalSystemPayload, FormError> {
        Ok(HospitalSystemPayload {
            name: required_text(fields, "name")?,
            address: address(fields),
            contact_info: contact_info(fields),
            region_id: opt_int(fields, "region_id")?,
        })
    }

    fn create(conn: &Connection, payload: &HospitalSystemPayload, actor: &str) -> Result<HospitalSystem, DatabaseError> {
        db::insert_hospital_system(conn, payload, actor)
    }

    fn update(conn: &Connection, id: i64, payload: &HospitalSystemPayload, actor: &str) -> Result<(), DatabaseError> {
        db::update_hospital_system(conn, id, payload, actor)
    }

    fn fetch(conn: &Connection, id: i64) -> Result<Option<HospitalSystem>, DatabaseError> {
        Ok(db::get_hospital_system(conn, id)?.filter(|s| s.audit.is_active))
    }

    fn reload(conn: &Connection) -> Result<Vec<HospitalSystem>, DatabaseError> {
        db::list_active_hospital_systems(conn)
    }
}

#[derive(Debug)]
pub struct HospitalForm;

impl EntityForm for HospitalForm {
    type Row = Hospital;
    type Payload = HospitalPayload;

    const TABLE: Table = Table::Hospitals;
    const REQUIRED: &'static [&'static str] = &["name"];

    fn defaults() -> FormFields {
        blank(&["name", "hospital_system_id", "region_id", "bed_count", "trauma_level"])
    }

    fn fields_from_row(row: &Hospital) -> FormFields {
        let mut fields = Self::defaults();
        put_opt(&mut fields, "name", Some(&row.name));
        put_num(&mut fields, "hospital_system_id", row.hospital_system_id);
        put_num(&mut fields, "region_id", row.region_id);
        put_num(&mut fields, "bed_count", row.bed_count);
        put_opt(&mut fields, "trauma_level", row.trauma_level.as_ref().map(TraumaLevel::as_str));
        put_address(&mut fields, row.address.as_ref());
        put_contact_info(&mut fields, row.contact_info.as_ref());
        fields
    }

    fn payload_from_fields(fields: &FormFields) -> Result<HospitalPayload, FormError> {
        let bed_count = opt_int(fields, "bed_count")?;
        if bed_count.is_some_and(|beds| beds < 0) {
            return Err(FormError::InvalidValue {
                field: "bed_count".into(),
                reason: "bed count cannot be negative".into(),
            });
        }
        Ok(HospitalPayload {
            name: required_text(fields, "name")?,
            hospital_system_id: opt_int(fields, "hospital_system_id")?,
            address: address(fields),
            contact_info: contact_info(fields),
            region_id: opt_int(fields, "region_id")?,
            bed_count,
            trauma_level: opt_enum(fields, "trauma_level")?,
        })
    }

    fn create(conn: &Connection, payload: &HospitalPayload, actor: &str) -> Result<Hospital, DatabaseError> {
        db::insert_hospital(conn, payload, actor)
    }

    fn update(conn: &Connection, id: i64, payload: &HospitalPayload, actor: &str) -> Result<(), DatabaseError> {
        db::update_hospital(conn, id, payload, actor)
    }

    fn fetch(conn: &Connection, id: i64) -> Result<Option<Hospital>, DatabaseError> {
        Ok(db::get_hospital(conn, id)?.filter(|h| h.audit.is_active))
    }

    fn reload(conn: &Connection) -> Result<Vec<Hospital>, DatabaseError> {
        db::list_active_hospitals(conn)
    }
}
