use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{audit_from_row, collect_rows, ensure_active, in_transaction, now_local, Table};
use crate::db::{to_db_timestamp, DatabaseError};
use crate::models::*;

const TEAM_COLUMNS: &str = "id, name, team_lead, region_id,
     is_active, created_at, updated_at, created_by, updated_by";

fn map_team(row: &Row<'_>) -> rusqlite::Result<RepTeam> {
    Ok(RepTeam {
        id: row.get("id")?,
        name: row.get("name")?,
        team_lead: row.get("team_lead")?,
        region_id: row.get("region_id")?,
        audit: audit_from_row(row)?,
    })
}

pub fn insert_rep_team(conn: &Connection, payload: &RepTeamPayload, actor: &str) -> Result<RepTeam, DatabaseError> {
    in_transaction(conn, |conn| {
        ensure_active(conn, Table::Regions, payload.region_id)?;
        let now = to_db_timestamp(&now_local());
        conn.execute(
            "INSERT INTO rep_teams (name, team_lead, region_id, created_at, updated_at, created_by, updated_by)
             VALUES (?1, ?2, ?3, ?4, ?4, ?5, ?5)",
            params![payload.name, payload.team_lead, payload.region_id, now, actor],
        )?;
        let id = conn.last_insert_rowid();
        tracing::info!(id, actor, "Created rep team");
        get_rep_team(conn, id)?.ok_or_else(|| DatabaseError::not_found("rep team", id))
    })
}

pub fn update_rep_team(
    conn: &Connection,
    id: i64,
    payload: &RepTeamPayload,
    actor: &str,
) -> Result<(), DatabaseError> {
    in_transaction(conn, |conn| {
        ensure_active(conn, Table::Regions, payload.region_id)?;
        let changed = conn.execute(
            "UPDATE rep_teams SET name = ?1, team_lead = ?2, region_id = ?3, updated_at = ?4, updated_by = ?5
             WHERE id = ?6 AND is_active = 1",
            params![
                payload.name,
                payload.team_lead,
                payload.region_id,
                to_db_timestamp(&now_local()),
                actor,
                id,
            ],
        )?;
        if changed == 0 {
            return Err(DatabaseError::not_found("rep team", id));
        }
        tracing::info!(id, actor, "Updated rep team");
        Ok(())
    })
}

pub fn get_rep_team(conn: &Connection, id: i64) -> Result<Option<RepTeam>, DatabaseError> {
    let sql = format!("SELECT {TEAM_COLUMNS} FROM rep_teams WHERE id = ?1");
    Ok(conn.query_row(&sql, params![id], map_team).optional()?)
}

pub fn list_active_rep_teams(conn: &Connection) -> Result<Vec<RepTeam>, DatabaseError> {
    let sql = format!(
        "SELECT {TEAM_COLUMNS} FROM rep_teams WHERE is_active = 1 ORDER BY name COLLATE NOCASE"
    );
    collect_rows(conn, &sql, [], map_team)
}
