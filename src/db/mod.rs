pub mod sqlite;
pub mod repository;

pub use sqlite::*;
pub use repository::*;

use chrono::NaiveDateTime;
use thiserror::Error;

/// Storage format for every timestamp column (local time, no offset).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Referenced {entity_type} {id} is missing or inactive")]
    InactiveReference { entity_type: String, id: String },

    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("Invalid stored data: {0}")]
    InvalidData(String),
}

impl DatabaseError {
    pub fn not_found(entity_type: &str, id: i64) -> Self {
        DatabaseError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    /// True when SQLite rejected a write on a UNIQUE index.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            DatabaseError::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => {
                err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
            }
            _ => false,
        }
    }

    /// True when SQLite rejected a write on a FOREIGN KEY reference.
    pub fn is_foreign_key_violation(&self) -> bool {
        match self {
            DatabaseError::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => {
                err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
            }
            _ => false,
        }
    }

    /// Single human-readable line shown inline next to a form or list.
    pub fn user_message(&self) -> String {
        if self.is_unique_violation() {
            return "A record with the same identifier already exists. Please use a different value."
                .to_string();
        }
        if self.is_foreign_key_violation() {
            return "One of the selected references no longer exists. Please reload and try again."
                .to_string();
        }
        match self {
            DatabaseError::NotFound { entity_type, .. } => {
                format!("The selected {entity_type} could not be found. It may have been removed.")
            }
            DatabaseError::InactiveReference { entity_type, .. } => {
                format!("The selected {entity_type} no longer exists. Please reload and try again.")
            }
            DatabaseError::ConstraintViolation(detail) => detail.clone(),
            _ => "Something went wrong while saving. Please try again.".to_string(),
        }
    }
}

pub fn to_db_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn from_db_timestamp(raw: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map_err(|e| DatabaseError::InvalidData(format!("timestamp '{raw}': {e}")))
}

pub fn from_db_timestamp_opt(raw: Option<String>) -> Result<Option<NaiveDateTime>, DatabaseError> {
    raw.as_deref().map(from_db_timestamp).transpose()
}
