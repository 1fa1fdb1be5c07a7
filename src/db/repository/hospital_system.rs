use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{
    audit_from_row, collect_rows, ensure_active, get_json, in_transaction, now_local,
    to_json_column, Table,
};
use crate::db::{to_db_timestamp, DatabaseError};
use crate::models::*;

const SYSTEM_COLUMNS: &str = "id, name, address, contact_info, region_id,
     is_active, created_at, updated_at, created_by, updated_by";

fn map_system(row: &Row<'_>) -> rusqlite::Result<HospitalSystem> {
    Ok(HospitalSystem {
        id: row.get("id")?,
        name: row.get("name")?,
        address: get_json(row, "address")?,
        contact_info: get_json(row, "contact_info")?,
        region_id: row.get("region_id")?,
        audit: audit_from_row(row)?,
    })
}

pub fn insert_hospital_system(
    conn: &Connection,
    payload: &HospitalSystemPayload,
    actor: &str,
) -> Result<HospitalSystem, DatabaseError> {
    in_transaction(conn, |conn| {
        ensure_active(conn, Table::Regions, payload.region_id)?;
        let now = to_db_timestamp(&now_local());
        conn.execute(
            "INSERT INTO hospital_systems
             (name, address, contact_info, region_id, created_at, updated_at, created_by, updated_by)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5, ?6, ?6)",
            params![
                payload.name,
                to_json_column(payload.address.as_ref())?,
                to_json_column(payload.contact_info.as_ref())?,
                payload.region_id,
                now,
                actor,
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::info!(id, actor, "Created hospital system");
        get_hospital_system(conn, id)?.ok_or_else(|| DatabaseError::not_found("hospital system", id))
    })
}

/// Full overwrite of the editable columns (last write wins).
pub fn update_hospital_system(
    conn: &Connection,
    id: i64,
    payload: &HospitalSystemPayload,
    actor: &str,
) -> Result<(), DatabaseError> {
    in_transaction(conn, |conn| {
        ensure_active(conn, Table::Regions, payload.region_id)?;
        let changed = conn.execute(
            "UPDATE hospital_systems
             SET name = ?1, address = ?2, contact_info = ?3, region_id = ?4,
                 updated_at = ?5, updated_by = ?6
             WHERE id = ?7 AND is_active = 1",
            params![
                payload.name,
                to_json_column(payload.address.as_ref())?,
                to_json_column(payload.contact_info.as_ref())?,
                payload.region_id,
                to_db_timestamp(&now_local()),
                actor,
                id,
            ],
        )?;
        if changed == 0 {
            return Err(DatabaseError::not_found("hospital system", id));
        }
        tracing::info!(id, actor, "Updated hospital system");
        Ok(())
    })
}

pub fn get_hospital_system(conn: &Connection, id: i64) -> Result<Option<HospitalSystem>, DatabaseError> {
    let sql = format!("SELECT {SYSTEM_COLUMNS} FROM hospital_systems WHERE id = ?1");
    Ok(conn.query_row(&sql, params![id], map_system).optional()?)
}

pub fn list_active_hospital_systems(conn: &Connection) -> Result<Vec<HospitalSystem>, DatabaseError> {
    let sql = format!(
        "SELECT {SYSTEM_COLUMNS} FROM hospital_systems
         WHERE is_active = 1 ORDER BY name COLLATE NOCASE"
    );
    collect_rows(conn, &sql, [], map_system)
}
