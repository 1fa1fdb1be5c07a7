//! Repository layer: entity-scoped database operations.
//!
//! One sub-module per table family. Every list query filters on
//! `is_active = 1`; removal is always a soft delete through
//! [`soft_delete`], never a physical `DELETE`.

mod ai_insight;
mod hospital;
mod hospital_system;
mod procedure;
mod region;
mod rep_team;
mod sales;
mod surgeon;
mod surgery_case;
mod territory;

use std::str::FromStr;

use chrono::{Local, NaiveDateTime, Timelike};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{to_db_timestamp, DatabaseError, TIMESTAMP_FORMAT};
use crate::models::AuditInfo;

// Re-export all public items from sub-modules
pub use ai_insight::*;
pub use hospital::*;
pub use hospital_system::*;
pub use procedure::*;
pub use region::*;
pub use rep_team::*;
pub use sales::*;
pub use surgeon::*;
pub use surgery_case::*;
pub use territory::*;

/// Tables that support soft delete through [`soft_delete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Regions,
    HospitalSystems,
    Hospitals,
    RepTeams,
    Territories,
    Surgeons,
    Procedures,
    SurgeryCases,
    AiInsights,
    Opportunities,
    Invoices,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regions => "regions",
            Self::HospitalSystems => "hospital_systems",
            Self::Hospitals => "hospitals",
            Self::RepTeams => "rep_teams",
            Self::Territories => "territories",
            Self::Surgeons => "surgeons",
            Self::Procedures => "procedures",
            Self::SurgeryCases => "surgery_cases",
            Self::AiInsights => "ai_insights",
            Self::Opportunities => "opportunities",
            Self::Invoices => "invoices",
        }
    }

    /// Singular noun used in error messages.
    pub fn entity_name(&self) -> &'static str {
        match self {
            Self::Regions => "region",
            Self::HospitalSystems => "hospital system",
            Self::Hospitals => "hospital",
            Self::RepTeams => "rep team",
            Self::Territories => "territory",
            Self::Surgeons => "surgeon",
            Self::Procedures => "procedure",
            Self::SurgeryCases => "surgery case",
            Self::AiInsights => "insight",
            Self::Opportunities => "opportunity",
            Self::Invoices => "invoice",
        }
    }
}

/// Flip `is_active` off for one live row.
///
/// Returns `NotFound` when the row is missing or already inactive.
pub fn soft_delete(
    conn: &Connection,
    table: Table,
    id: i64,
    actor: &str,
) -> Result<(), DatabaseError> {
    let sql = format!(
        "UPDATE {} SET is_active = 0, updated_at = ?1, updated_by = ?2
         WHERE id = ?3 AND is_active = 1",
        table.as_str()
    );
    let changed = conn.execute(&sql, params![to_db_timestamp(&now_local()), actor, id])?;
    if changed == 0 {
        return Err(DatabaseError::not_found(table.entity_name(), id));
    }
    tracing::info!(table = table.as_str(), id, actor, "Soft-deleted row");
    Ok(())
}

/// Fail unless `id` names a live row of `table`. `None` references pass.
pub(crate) fn ensure_active(conn: &Connection, table: Table, id: Option<i64>) -> Result<(), DatabaseError> {
    let Some(id) = id else {
        return Ok(());
    };
    let sql = format!("SELECT is_active FROM {} WHERE id = ?1", table.as_str());
    let active: Option<bool> = conn.query_row(&sql, params![id], |row| row.get(0)).optional()?;
    if active != Some(true) {
        return Err(DatabaseError::InactiveReference {
            entity_type: table.entity_name().into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Run `write` in an immediate transaction, or inside the caller's if one
/// is already open, so reference checks and the write see the same rows.
pub(crate) fn in_transaction<T>(
    conn: &Connection,
    write: impl FnOnce(&Connection) -> Result<T, DatabaseError>,
) -> Result<T, DatabaseError> {
    if !conn.is_autocommit() {
        return write(conn);
    }
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    let out = write(&tx)?;
    tx.commit()?;
    Ok(out)
}

/// Current wall-clock time, truncated to whole seconds.
pub(crate) fn now_local() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

// ─── Row helpers ──────────────────────────────────────────────────────────────

fn conversion_err<E>(row: &Row<'_>, col: &str, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    let idx = row.as_ref().column_index(col).unwrap_or_default();
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

pub(crate) fn get_ts(row: &Row<'_>, col: &str) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(col)?;
    NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(|e| conversion_err(row, col, e))
}

pub(crate) fn get_ts_opt(row: &Row<'_>, col: &str) -> rusqlite::Result<Option<NaiveDateTime>> {
    match row.get::<_, Option<String>>(col)? {
        Some(raw) => NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT)
            .map(Some)
            .map_err(|e| conversion_err(row, col, e)),
        None => Ok(None),
    }
}

pub(crate) fn get_enum<T>(row: &Row<'_>, col: &str) -> rusqlite::Result<T>
where
    T: FromStr<Err = DatabaseError>,
{
    let raw: String = row.get(col)?;
    T::from_str(&raw).map_err(|e| conversion_err(row, col, e))
}

pub(crate) fn get_enum_opt<T>(row: &Row<'_>, col: &str) -> rusqlite::Result<Option<T>>
where
    T: FromStr<Err = DatabaseError>,
{
    match row.get::<_, Option<String>>(col)? {
        Some(raw) => T::from_str(&raw).map(Some).map_err(|e| conversion_err(row, col, e)),
        None => Ok(None),
    }
}

pub(crate) fn get_json<T: DeserializeOwned>(row: &Row<'_>, col: &str) -> rusqlite::Result<Option<T>> {
    match row.get::<_, Option<String>>(col)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| conversion_err(row, col, e)),
        None => Ok(None),
    }
}

pub(crate) fn audit_from_row(row: &Row<'_>) -> rusqlite::Result<AuditInfo> {
    Ok(AuditInfo {
        is_active: row.get::<_, i64>("is_active")? != 0,
        created_at: get_ts(row, "created_at")?,
        updated_at: get_ts(row, "updated_at")?,
        created_by: row.get("created_by")?,
        updated_by: row.get("updated_by")?,
    })
}

/// Serialize an optional nested attribute into its JSON column.
pub(crate) fn to_json_column<T: Serialize>(value: Option<&T>) -> Result<Option<String>, DatabaseError> {
    value
        .map(|v| serde_json::to_string(v).map_err(|e| DatabaseError::InvalidData(e.to_string())))
        .transpose()
}

pub(crate) fn collect_rows<T, P>(
    conn: &Connection,
    sql: &str,
    params: P,
    map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> Result<Vec<T>, DatabaseError>
where
    P: rusqlite::Params,
{
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, map)?;
    let collected = rows.collect::<Result<Vec<_>, _>>();
    collected.map_err(DatabaseError::from)
}
