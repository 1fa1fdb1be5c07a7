use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{audit_from_row, collect_rows, now_local};
use crate::db::{to_db_timestamp, DatabaseError};
use crate::models::*;

const REGION_COLUMNS: &str =
    "id, name, code, is_active, created_at, updated_at, created_by, updated_by";

fn map_region(row: &Row<'_>) -> rusqlite::Result<Region> {
    Ok(Region {
        id: row.get("id")?,
        name: row.get("name")?,
        code: row.get("code")?,
        audit: audit_from_row(row)?,
    })
}

pub fn insert_region(conn: &Connection, region: &NewRegion, actor: &str) -> Result<Region, DatabaseError> {
    let now = to_db_timestamp(&now_local());
    conn.execute(
        "INSERT INTO regions (name, code, created_at, updated_at, created_by, updated_by)
         VALUES (?1, ?2, ?3, ?3, ?4, ?4)",
        params![region.name, region.code, now, actor],
    )?;
    let id = conn.last_insert_rowid();
    get_region(conn, id)?.ok_or_else(|| DatabaseError::not_found("region", id))
}

pub fn get_region(conn: &Connection, id: i64) -> Result<Option<Region>, DatabaseError> {
    let sql = format!("SELECT {REGION_COLUMNS} FROM regions WHERE id = ?1");
    Ok(conn.query_row(&sql, params![id], map_region).optional()?)
}

/// Active regions sorted by name, for selection controls.
pub fn list_active_regions(conn: &Connection) -> Result<Vec<Region>, DatabaseError> {
    let sql = format!(
        "SELECT {REGION_COLUMNS} FROM regions WHERE is_active = 1 ORDER BY name COLLATE NOCASE"
    );
    collect_rows(conn, &sql, [], map_region)
}
