use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{audit_from_row, collect_rows, get_enum, now_local};
use crate::db::{to_db_timestamp, DatabaseError};
use crate::models::*;

const PROCEDURE_COLUMNS: &str = "id, name, code, procedure_type, complexity,
     is_active, created_at, updated_at, created_by, updated_by";

fn map_procedure(row: &Row<'_>) -> rusqlite::Result<Procedure> {
    Ok(Procedure {
        id: row.get("id")?,
        name: row.get("name")?,
        code: row.get("code")?,
        procedure_type: row.get("procedure_type")?,
        complexity: get_enum(row, "complexity")?,
        audit: audit_from_row(row)?,
    })
}

pub fn insert_procedure(
    conn: &Connection,
    procedure: &NewProcedure,
    actor: &str,
) -> Result<Procedure, DatabaseError> {
    let now = to_db_timestamp(&now_local());
    conn.execute(
        "INSERT INTO procedures (name, code, procedure_type, complexity,
         created_at, updated_at, created_by, updated_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5, ?6, ?6)",
        params![
            procedure.name,
            procedure.code,
            procedure.procedure_type,
            procedure.complexity.as_str(),
            now,
            actor,
        ],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(id, actor, "Created procedure");
    get_procedure(conn, id)?.ok_or_else(|| DatabaseError::not_found("procedure", id))
}

pub fn get_procedure(conn: &Connection, id: i64) -> Result<Option<Procedure>, DatabaseError> {
    let sql = format!("SELECT {PROCEDURE_COLUMNS} FROM procedures WHERE id = ?1");
    Ok(conn.query_row(&sql, params![id], map_procedure).optional()?)
}

pub fn list_active_procedures(conn: &Connection) -> Result<Vec<Procedure>, DatabaseError> {
    let sql = format!(
        "SELECT {PROCEDURE_COLUMNS} FROM procedures WHERE is_active = 1 ORDER BY name COLLATE NOCASE"
    );
    collect_rows(conn, &sql, [], map_procedure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::ProcedureComplexity;

    #[test]
    fn stored_complexity_is_parsed_back() {
        let conn = open_memory_database().unwrap();
        let p = insert_procedure(
            &conn,
            &NewProcedure {
                name: "Lumbar Fusion".into(),
                code: "LF-01".into(),
                procedure_type: None,
                complexity: ProcedureComplexity::Critical,
            },
            "t",
        )
        .unwrap();
        assert_eq!(get_procedure(&conn, p.id).unwrap().unwrap().complexity, ProcedureComplexity::Critical);
    }

    #[test]
    fn corrupt_complexity_surfaces_as_error() {
        let conn = open_memory_database().unwrap();
        conn.execute(
            "INSERT INTO procedures (name, code, complexity, created_at, updated_at)
             VALUES ('X', 'X', 'extreme', '2025-01-01T00:00:00', '2025-01-01T00:00:00')",
            [],
        )
        .unwrap();
        assert!(list_active_procedures(&conn).is_err());
    }
}
