//! Optional-table capability descriptor for report builders.
//!
//! Detected once when the database is opened and then passed explicitly
//! into whatever needs it. Nothing re-detects per request.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::db::{table_exists, DatabaseError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportCapabilities {
    pub opportunities: bool,
    pub invoices: bool,
}

impl ReportCapabilities {
    pub fn detect(conn: &Connection) -> Result<Self, DatabaseError> {
        let caps = Self {
            opportunities: table_exists(conn, "opportunities")?,
            invoices: table_exists(conn, "invoices")?,
        };
        tracing::info!(
            opportunities = caps.opportunities,
            invoices = caps.invoices,
            "Report capabilities detected"
        );
        Ok(caps)
    }

    /// Everything available. Handy for tests and fully migrated stores.
    pub fn all() -> Self {
        Self { opportunities: true, invoices: true }
    }
}
