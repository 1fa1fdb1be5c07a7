use chrono::NaiveDateTime;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use super::{
    audit_from_row, collect_rows, ensure_active, get_enum, get_ts, get_ts_opt, in_transaction,
    now_local, Table,
};
use crate::db::{to_db_timestamp, DatabaseError};
use crate::models::enums::CaseStatus;
use crate::models::*;

const CASE_COLUMNS: &str = "c.id, c.case_number, c.surgeon_id, c.hospital_id, c.procedure_id,
     c.scheduled_at, c.actual_start, c.actual_end, c.status, c.operating_room,
     c.estimated_cost, c.actual_cost, c.notes,
     c.is_active, c.created_at, c.updated_at, c.created_by, c.updated_by";

fn map_case(row: &Row<'_>) -> rusqlite::Result<SurgeryCase> {
    Ok(SurgeryCase {
        id: row.get("id")?,
        case_number: row.get("case_number")?,
        surgeon_id: row.get("surgeon_id")?,
        hospital_id: row.get("hospital_id")?,
        procedure_id: row.get("procedure_id")?,
        scheduled_at: get_ts(row, "scheduled_at")?,
        actual_start: get_ts_opt(row, "actual_start")?,
        actual_end: get_ts_opt(row, "actual_end")?,
        status: get_enum(row, "status")?,
        operating_room: row.get("operating_room")?,
        estimated_cost: row.get("estimated_cost")?,
        actual_cost: row.get("actual_cost")?,
        notes: row.get("notes")?,
        audit: audit_from_row(row)?,
    })
}

fn map_case_view(row: &Row<'_>) -> rusqlite::Result<SurgeryCaseView> {
    Ok(SurgeryCaseView {
        case: map_case(row)?,
        surgeon_name: row.get("surgeon_name")?,
        hospital_name: row.get("hospital_name")?,
        procedure_name: row.get("procedure_name")?,
        procedure_code: row.get("procedure_code")?,
    })
}

/// Insert a booking under a freshly generated case number.
pub fn insert_surgery_case(
    conn: &Connection,
    case_number: &str,
    payload: &SurgeryCasePayload,
    actor: &str,
) -> Result<SurgeryCase, DatabaseError> {
    in_transaction(conn, |conn| {
        ensure_active(conn, Table::Surgeons, Some(payload.surgeon_id))?;
        ensure_active(conn, Table::Hospitals, Some(payload.hospital_id))?;
        ensure_active(conn, Table::Procedures, Some(payload.procedure_id))?;
        let now = to_db_timestamp(&now_local());
        conn.execute(
            "INSERT INTO surgery_cases
             (case_number, surgeon_id, hospital_id, procedure_id, scheduled_at, status,
              operating_room, estimated_cost, actual_cost, notes,
              created_at, updated_at, created_by, updated_by)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11, ?12, ?12)",
            params![
                case_number,
                payload.surgeon_id,
                payload.hospital_id,
                payload.procedure_id,
                to_db_timestamp(&payload.scheduled_at),
                payload.status.as_str(),
                payload.operating_room,
                payload.estimated_cost,
                payload.actual_cost,
                payload.notes,
                now,
                actor,
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::info!(id, case_number, actor, "Booked surgery case");
        get_surgery_case(conn, id)?.ok_or_else(|| DatabaseError::not_found("surgery case", id))
    })
}

/// Overwrite the editable columns. `case_number` is never touched.
pub fn update_surgery_case(
    conn: &Connection,
    id: i64,
    payload: &SurgeryCasePayload,
    actor: &str,
) -> Result<(), DatabaseError> {
    in_transaction(conn, |conn| {
        ensure_active(conn, Table::Surgeons, Some(payload.surgeon_id))?;
        ensure_active(conn, Table::Hospitals, Some(payload.hospital_id))?;
        ensure_active(conn, Table::Procedures, Some(payload.procedure_id))?;
        let changed = conn.execute(
            "UPDATE surgery_cases
             SET surgeon_id = ?1, hospital_id = ?2, procedure_id = ?3, scheduled_at = ?4,
                 status = ?5, operating_room = ?6, estimated_cost = ?7, actual_cost = ?8,
                 notes = ?9, updated_at = ?10, updated_by = ?11
             WHERE id = ?12 AND is_active = 1",
            params![
                payload.surgeon_id,
                payload.hospital_id,
                payload.procedure_id,
                to_db_timestamp(&payload.scheduled_at),
                payload.status.as_str(),
                payload.operating_room,
                payload.estimated_cost,
                payload.actual_cost,
                payload.notes,
                to_db_timestamp(&now_local()),
                actor,
                id,
            ],
        )?;
        if changed == 0 {
            return Err(DatabaseError::not_found("surgery case", id));
        }
        tracing::info!(id, actor, "Updated surgery case");
        Ok(())
    })
}

/// Persist a lifecycle move together with its actual-time stamps.
pub fn set_case_status(
    conn: &Connection,
    id: i64,
    status: CaseStatus,
    actual_start: Option<NaiveDateTime>,
    actual_end: Option<NaiveDateTime>,
    actor: &str,
) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE surgery_cases
         SET status = ?1, actual_start = ?2, actual_end = ?3, updated_at = ?4, updated_by = ?5
         WHERE id = ?6 AND is_active = 1",
        params![
            status.as_str(),
            actual_start.as_ref().map(to_db_timestamp),
            actual_end.as_ref().map(to_db_timestamp),
            to_db_timestamp(&now_local()),
            actor,
            id,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::not_found("surgery case", id));
    }
    tracing::info!(id, status = status.as_str(), actor, "Surgery case status changed");
    Ok(())
}

pub fn get_surgery_case(conn: &Connection, id: i64) -> Result<Option<SurgeryCase>, DatabaseError> {
    let sql = format!("SELECT {CASE_COLUMNS} FROM surgery_cases c WHERE c.id = ?1");
    Ok(conn.query_row(&sql, params![id], map_case).optional()?)
}

pub fn get_surgery_case_view(conn: &Connection, id: i64) -> Result<Option<SurgeryCaseView>, DatabaseError> {
    let sql = format!("{} WHERE c.id = ?1", case_view_select());
    Ok(conn.query_row(&sql, params![id], map_case_view).optional()?)
}

/// Active cases with surgeon, hospital and procedure display fields in one query.
pub fn list_case_views(conn: &Connection, filter: &CaseFilter) -> Result<Vec<SurgeryCaseView>, DatabaseError> {
    let mut conditions = vec!["c.is_active = 1".to_string()];
    let mut values: Vec<String> = Vec::new();

    if let Some(from) = &filter.created_from {
        values.push(to_db_timestamp(from));
        conditions.push(format!("c.created_at >= ?{}", values.len()));
    }
    if let Some(from) = &filter.scheduled_from {
        values.push(to_db_timestamp(from));
        conditions.push(format!("c.scheduled_at >= ?{}", values.len()));
    }
    if let Some(to) = &filter.scheduled_to {
        values.push(to_db_timestamp(to));
        conditions.push(format!("c.scheduled_at < ?{}", values.len()));
    }
    if let Some(status) = filter.status {
        values.push(status.as_str().to_string());
        conditions.push(format!("c.status = ?{}", values.len()));
    }

    let order = match filter.order {
        CaseOrder::NewestFirst => "c.created_at DESC, c.id DESC",
        CaseOrder::BySchedule => "c.scheduled_at ASC, c.id ASC",
    };

    let sql = format!(
        "{} WHERE {} ORDER BY {order}",
        case_view_select(),
        conditions.join(" AND ")
    );
    collect_rows(conn, &sql, params_from_iter(values), map_case_view)
}

fn case_view_select() -> String {
    format!(
        "SELECT {CASE_COLUMNS},
                s.name AS surgeon_name, h.name AS hospital_name,
                p.name AS procedure_name, p.code AS procedure_code
         FROM surgery_cases c
         JOIN surgeons s ON s.id = c.surgeon_id
         JOIN hospitals h ON h.id = c.hospital_id
         JOIN procedures p ON p.id = c.procedure_id"
    )
}
