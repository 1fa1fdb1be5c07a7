use serde::{Deserialize, Serialize};

use super::audit::{AuditInfo, Identified};
use super::contact::ContactInfo;
use super::enums::ProcedureComplexity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surgeon {
    pub id: i64,
    pub name: String,
    pub hospital_id: Option<i64>,
    pub specialties: Vec<String>,
    pub contact_info: Option<ContactInfo>,
    #[serde(flatten)]
    pub audit: AuditInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSurgeon {
    pub name: String,
    pub hospital_id: Option<i64>,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub contact_info: Option<ContactInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Procedure {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub procedure_type: Option<String>,
    pub complexity: ProcedureComplexity,
    #[serde(flatten)]
    pub audit: AuditInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProcedure {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub procedure_type: Option<String>,
    pub complexity: ProcedureComplexity,
}

impl Identified for Surgeon {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for Procedure {
    fn id(&self) -> i64 {
        self.id
    }
}
