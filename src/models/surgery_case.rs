use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::audit::{AuditInfo, Identified};
use super::enums::CaseStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurgeryCase {
    pub id: i64,
    pub case_number: String,
    pub surgeon_id: i64,
    pub hospital_id: i64,
    pub procedure_id: i64,
    pub scheduled_at: NaiveDateTime,
    pub actual_start: Option<NaiveDateTime>,
    pub actual_end: Option<NaiveDateTime>,
    pub status: CaseStatus,
    pub operating_room: Option<String>,
    pub estimated_cost: Option<f64>,
    pub actual_cost: Option<f64>,
    pub notes: Option<String>,
    #[serde(flatten)]
    pub audit: AuditInfo,
}

/// Editable columns of a booking. `case_number` is assigned once on insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurgeryCasePayload {
    pub surgeon_id: i64,
    pub hospital_id: i64,
    pub procedure_id: i64,
    pub scheduled_at: NaiveDateTime,
    pub status: CaseStatus,
    pub operating_room: Option<String>,
    pub estimated_cost: Option<f64>,
    pub actual_cost: Option<f64>,
    pub notes: Option<String>,
}

/// A case joined with the display fields of its references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurgeryCaseView {
    #[serde(flatten)]
    pub case: SurgeryCase,
    pub surgeon_name: String,
    pub hospital_name: String,
    pub procedure_name: String,
    pub procedure_code: String,
}

impl Identified for SurgeryCase {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for SurgeryCaseView {
    fn id(&self) -> i64 {
        self.case.id
    }
}
