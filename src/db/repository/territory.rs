use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{audit_from_row, collect_rows, ensure_active, in_transaction, now_local, Table};
use crate::db::{to_db_timestamp, DatabaseError};
use crate::models::*;

const TERRITORY_COLUMNS: &str = "id, name, rep_team_id, coverage_area,
     is_active, created_at, updated_at, created_by, updated_by";

fn map_territory(row: &Row<'_>) -> rusqlite::Result<Territory> {
    Ok(Territory {
        id: row.get("id")?,
        name: row.get("name")?,
        rep_team_id: row.get("rep_team_id")?,
        coverage_area: row.get("coverage_area")?,
        audit: audit_from_row(row)?,
    })
}

pub fn insert_territory(
    conn: &Connection,
    payload: &TerritoryPayload,
    actor: &str,
) -> Result<Territory, DatabaseError> {
    in_transaction(conn, |conn| {
        ensure_active(conn, Table::RepTeams, payload.rep_team_id)?;
        let now = to_db_timestamp(&now_local());
        conn.execute(
            "INSERT INTO territories (name, rep_team_id, coverage_area, created_at, updated_at, created_by, updated_by)
             VALUES (?1, ?2, ?3, ?4, ?4, ?5, ?5)",
            params![payload.name, payload.rep_team_id, payload.coverage_area, now, actor],
        )?;
        let id = conn.last_insert_rowid();
        tracing::info!(id, actor, "Created territory");
        get_territory(conn, id)?.ok_or_else(|| DatabaseError::not_found("territory", id))
    })
}

pub fn update_territory(
    conn: &Connection,
    id: i64,
    payload: &TerritoryPayload,
    actor: &str,
) -> Result<(), DatabaseError> {
    in_transaction(conn, |conn| {
        ensure_active(conn, Table::RepTeams, payload.rep_team_id)?;
        let changed = conn.execute(
            "UPDATE territories SET name = ?1, rep_team_id = ?2, coverage_area = ?3,
                 updated_at = ?4, updated_by = ?5
             WHERE id = ?6 AND is_active = 1",
            params![
                payload.name,
                payload.rep_team_id,
                payload.coverage_area,
                to_db_timestamp(&now_local()),
                actor,
                id,
            ],
        )?;
        if changed == 0 {
            return Err(DatabaseError::not_found("territory", id));
        }
        tracing::info!(id, actor, "Updated territory");
        Ok(())
    })
}

pub fn get_territory(conn: &Connection, id: i64) -> Result<Option<Territory>, DatabaseError> {
    let sql = format!("SELECT {TERRITORY_COLUMNS} FROM territories WHERE id = ?1");
    Ok(conn.query_row(&sql, params![id], map_territory).optional()?)
}

pub fn list_active_territories(conn: &Connection) -> Result<Vec<Territory>, DatabaseError> {
    let sql = format!(
        "SELECT {TERRITORY_COLUMNS} FROM territories WHERE is_active = 1 ORDER BY name COLLATE NOCASE"
    );
    collect_rows(conn, &sql, [], map_territory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{insert_rep_team, soft_delete};
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn territory_can_move_between_teams() {
        let conn = open_memory_database().unwrap();
        let team = insert_rep_team(
            &conn,
            &RepTeamPayload { name: "Spine East".into(), team_lead: None, region_id: None },
            "t",
        )
        .unwrap();
        let territory = insert_territory(
            &conn,
            &TerritoryPayload {
                name: "Boston Metro".into(),
                rep_team_id: Some(team.id),
                coverage_area: Some("Suffolk and Middlesex counties".into()),
            },
            "t",
        )
        .unwrap();
        assert_eq!(territory.rep_team_id, Some(team.id));

        update_territory(
            &conn,
            territory.id,
            &TerritoryPayload {
                name: "Boston Metro".into(),
                rep_team_id: None,
                coverage_area: territory.coverage_area.clone(),
            },
            "t",
        )
        .unwrap();
        let stored = get_territory(&conn, territory.id).unwrap().unwrap();
        assert!(stored.rep_team_id.is_none());
        assert_eq!(stored.coverage_area, territory.coverage_area);
    }

    #[test]
    fn territory_cannot_move_to_deleted_team() {
        let conn = open_memory_database().unwrap();
        let team = insert_rep_team(
            &conn,
            &RepTeamPayload { name: "Joint Recon".into(), team_lead: None, region_id: None },
            "t",
        )
        .unwrap();
        let territory = insert_territory(
            &conn,
            &TerritoryPayload { name: "Denver".into(), rep_team_id: None, coverage_area: None },
            "t",
        )
        .unwrap();
        soft_delete(&conn, Table::RepTeams, team.id, "t").unwrap();

        let moved = TerritoryPayload { name: "Denver".into(), rep_team_id: Some(team.id), coverage_area: None };
        let err = update_territory(&conn, territory.id, &moved, "t").unwrap_err();
        assert!(matches!(err, DatabaseError::InactiveReference { ref entity_type, .. } if entity_type == "rep team"));
        let err = insert_territory(&conn, &moved, "t").unwrap_err();
        assert!(matches!(err, DatabaseError::InactiveReference { .. }));
        assert!(get_territory(&conn, territory.id).unwrap().unwrap().rep_team_id.is_none());
    }
}
