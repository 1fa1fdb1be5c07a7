use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{
    audit_from_row, collect_rows, ensure_active, get_json, in_transaction, now_local,
    to_json_column, Table,
};
use crate::db::{to_db_timestamp, DatabaseError};
use crate::models::*;

const SURGEON_COLUMNS: &str = "id, name, hospital_id, specialties, contact_info,
     is_active, created_at, updated_at, created_by, updated_by";

fn map_surgeon(row: &Row<'_>) -> rusqlite::Result<Surgeon> {
    Ok(Surgeon {
        id: row.get("id")?,
        name: row.get("name")?,
        hospital_id: row.get("hospital_id")?,
        specialties: get_json(row, "specialties")?.unwrap_or_default(),
        contact_info: get_json(row, "contact_info")?,
        audit: audit_from_row(row)?,
    })
}

pub fn insert_surgeon(conn: &Connection, surgeon: &NewSurgeon, actor: &str) -> Result<Surgeon, DatabaseError> {
    in_transaction(conn, |conn| {
        ensure_active(conn, Table::Hospitals, surgeon.hospital_id)?;
        let now = to_db_timestamp(&now_local());
        let specialties = serde_json::to_string(&surgeon.specialties)
            .map_err(|e| DatabaseError::InvalidData(e.to_string()))?;
        conn.execute(
            "INSERT INTO surgeons (name, hospital_id, specialties, contact_info,
             created_at, updated_at, created_by, updated_by)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5, ?6, ?6)",
            params![
                surgeon.name,
                surgeon.hospital_id,
                specialties,
                to_json_column(surgeon.contact_info.as_ref())?,
                now,
                actor,
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::info!(id, actor, "Created surgeon");
        get_surgeon(conn, id)?.ok_or_else(|| DatabaseError::not_found("surgeon", id))
    })
}

pub fn get_surgeon(conn: &Connection, id: i64) -> Result<Option<Surgeon>, DatabaseError> {
    let sql = format!("SELECT {SURGEON_COLUMNS} FROM surgeons WHERE id = ?1");
    Ok(conn.query_row(&sql, params![id], map_surgeon).optional()?)
}

pub fn list_active_surgeons(conn: &Connection) -> Result<Vec<Surgeon>, DatabaseError> {
    let sql = format!(
        "SELECT {SURGEON_COLUMNS} FROM surgeons WHERE is_active = 1 ORDER BY name COLLATE NOCASE"
    );
    collect_rows(conn, &sql, [], map_surgeon)
}
