use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Soft-delete flag and audit columns shared by every table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditInfo {
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub created_by: Option<String>,
    pub updated_by: Option<String>,
}

/// Rows addressable by their surrogate id.
pub trait Identified {
    fn id(&self) -> i64;
}
