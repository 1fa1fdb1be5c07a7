use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{
    audit_from_row, collect_rows, ensure_active, get_enum_opt, get_json, in_transaction, now_local,
    to_json_column, Table,
};
use crate::db::{to_db_timestamp, DatabaseError};
use crate::models::*;

const HOSPITAL_COLUMNS: &str = "id, name, hospital_system_id, address, contact_info, region_id,
     bed_count, trauma_level, is_active, created_at, updated_at, created_by, updated_by";

fn map_hospital(row: &Row<'_>) -> rusqlite::Result<Hospital> {
    Ok(Hospital {
        id: row.get("id")?,
        name: row.get("name")?,
        hospital_system_id: row.get("hospital_system_id")?,
        address: get_json(row, "address")?,
        contact_info: get_json(row, "contact_info")?,
        region_id: row.get("region_id")?,
        bed_count: row.get("bed_count")?,
        trauma_level: get_enum_opt(row, "trauma_level")?,
        audit: audit_from_row(row)?,
    })
}

pub fn insert_hospital(
    conn: &Connection,
    payload: &HospitalPayload,
    actor: &str,
) -> Result<Hospital, DatabaseError> {
    in_transaction(conn, |conn| {
        ensure_active(conn, Table::HospitalSystems, payload.hospital_system_id)?;
        ensure_active(conn, Table::Regions, payload.region_id)?;
        let now = to_db_timestamp(&now_local());
        conn.execute(
            "INSERT INTO hospitals
             (name, hospital_system_id, address, contact_info, region_id, bed_count, trauma_level,
              created_at, updated_at, created_by, updated_by)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8, ?9, ?9)",
            params![
                payload.name,
                payload.hospital_system_id,
                to_json_column(payload.address.as_ref())?,
                to_json_column(payload.contact_info.as_ref())?,
                payload.region_id,
                payload.bed_count,
                payload.trauma_level.map(|t| t.as_str()),
                now,
                actor,
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::info!(id, actor, "Created hospital");
        get_hospital(conn, id)?.ok_or_else(|| DatabaseError::not_found("hospital", id))
    })
}

pub fn update_hospital(
    conn: &Connection,
    id: i64,
    payload: &HospitalPayload,
    actor: &str,
) -> Result<(), DatabaseError> {
    in_transaction(conn, |conn| {
        ensure_active(conn, Table::HospitalSystems, payload.hospital_system_id)?;
        ensure_active(conn, Table::Regions, payload.region_id)?;
        let changed = conn.execute(
            "UPDATE hospitals
             SET name = ?1, hospital_system_id = ?2, address = ?3, contact_info = ?4,
                 region_id = ?5, bed_count = ?6, trauma_level = ?7,
                 updated_at = ?8, updated_by = ?9
             WHERE id = ?10 AND is_active = 1",
            params![
                payload.name,
                payload.hospital_system_id,
                to_json_column(payload.address.as_ref())?,
                to_json_column(payload.contact_info.as_ref())?,
                payload.region_id,
                payload.bed_count,
                payload.trauma_level.map(|t| t.as_str()),
                to_db_timestamp(&now_local()),
                actor,
                id,
            ],
        )?;
        if changed == 0 {
            return Err(DatabaseError::not_found("hospital", id));
        }
        tracing::info!(id, actor, "Updated hospital");
        Ok(())
    })
}

pub fn get_hospital(conn: &Connection, id: i64) -> Result<Option<Hospital>, DatabaseError> {
    let sql = format!("SELECT {HOSPITAL_COLUMNS} FROM hospitals WHERE id = ?1");
    Ok(conn.query_row(&sql, params![id], map_hospital).optional()?)
}

pub fn list_active_hospitals(conn: &Connection) -> Result<Vec<Hospital>, DatabaseError> {
    let sql = format!(
        "SELECT {HOSPITAL_COLUMNS} FROM hospitals WHERE is_active = 1 ORDER BY name COLLATE NOCASE"
    );
    collect_rows(conn, &sql, [], map_hospital)
}

/// Id and name of every hospital, soft-deleted ones included, for labelling
/// historical rows.
pub fn list_all_hospital_names(conn: &Connection) -> Result<Vec<(i64, String)>, DatabaseError> {
    collect_rows(conn, "SELECT id, name FROM hospitals ORDER BY id", [], |row| {
        Ok((row.get(0)?, row.get(1)?))
    })
}
