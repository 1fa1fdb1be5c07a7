use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

use super::{
    audit_from_row, collect_rows, ensure_active, get_enum, get_ts, get_ts_opt, in_transaction,
    now_local, Table,
};
use crate::db::{to_db_timestamp, DatabaseError};
use crate::models::*;

const OPPORTUNITY_COLUMNS: &str = "id, name, hospital_id, territory_id, stage, amount, expected_close,
     is_active, created_at, updated_at, created_by, updated_by";

const INVOICE_COLUMNS: &str = "id, invoice_number, hospital_id, amount, status, issued_at, paid_at,
     is_active, created_at, updated_at, created_by, updated_by";

fn map_opportunity(row: &Row<'_>) -> rusqlite::Result<Opportunity> {
    Ok(Opportunity {
        id: row.get("id")?,
        name: row.get("name")?,
        hospital_id: row.get("hospital_id")?,
        territory_id: row.get("territory_id")?,
        stage: get_enum(row, "stage")?,
        amount: row.get("amount")?,
        expected_close: row
            .get::<_, Option<String>>("expected_close")?
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        audit: audit_from_row(row)?,
    })
}

fn map_invoice(row: &Row<'_>) -> rusqlite::Result<Invoice> {
    Ok(Invoice {
        id: row.get("id")?,
        invoice_number: row.get("invoice_number")?,
        hospital_id: row.get("hospital_id")?,
        amount: row.get("amount")?,
        status: get_enum(row, "status")?,
        issued_at: get_ts(row, "issued_at")?,
        paid_at: get_ts_opt(row, "paid_at")?,
        audit: audit_from_row(row)?,
    })
}

pub fn insert_opportunity(conn: &Connection, opp: &NewOpportunity, actor: &str) -> Result<i64, DatabaseError> {
    in_transaction(conn, |conn| {
        ensure_active(conn, Table::Hospitals, opp.hospital_id)?;
        ensure_active(conn, Table::Territories, opp.territory_id)?;
        let now = to_db_timestamp(&now_local());
        conn.execute(
            "INSERT INTO opportunities
             (name, hospital_id, territory_id, stage, amount, expected_close,
              created_at, updated_at, created_by, updated_by)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7, ?8, ?8)",
            params![
                opp.name,
                opp.hospital_id,
                opp.territory_id,
                opp.stage.as_str(),
                opp.amount,
                opp.expected_close.map(|d| d.format("%Y-%m-%d").to_string()),
                now,
                actor,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    })
}

pub fn list_active_opportunities(conn: &Connection) -> Result<Vec<Opportunity>, DatabaseError> {
    let sql = format!(
        "SELECT {OPPORTUNITY_COLUMNS} FROM opportunities WHERE is_active = 1 ORDER BY created_at DESC"
    );
    collect_rows(conn, &sql, [], map_opportunity)
}

pub fn insert_invoice(conn: &Connection, invoice: &NewInvoice, actor: &str) -> Result<i64, DatabaseError> {
    in_transaction(conn, |conn| {
        ensure_active(conn, Table::Hospitals, invoice.hospital_id)?;
        let now = to_db_timestamp(&now_local());
        conn.execute(
            "INSERT INTO invoices
             (invoice_number, hospital_id, amount, status, issued_at, paid_at,
              created_at, updated_at, created_by, updated_by)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7, ?8, ?8)",
            params![
                invoice.invoice_number,
                invoice.hospital_id,
                invoice.amount,
                invoice.status.as_str(),
                to_db_timestamp(&invoice.issued_at),
                invoice.paid_at.as_ref().map(to_db_timestamp),
                now,
                actor,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    })
}

pub fn list_active_invoices(conn: &Connection) -> Result<Vec<Invoice>, DatabaseError> {
    let sql = format!(
        "SELECT {INVOICE_COLUMNS} FROM invoices WHERE is_active = 1 ORDER BY issued_at DESC"
    );
    collect_rows(conn, &sql, [], map_invoice)
}
