use serde::{Deserialize, Serialize};

use super::audit::{AuditInfo, Identified};
use super::contact::{Address, ContactInfo};
use super::enums::TraumaLevel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalSystem {
    pub id: i64,
    pub name: String,
    pub address: Option<Address>,
    pub contact_info: Option<ContactInfo>,
    pub region_id: Option<i64>,
    #[serde(flatten)]
    pub audit: AuditInfo,
}

/// Editable columns of a hospital system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalSystemPayload {
    pub name: String,
    pub address: Option<Address>,
    pub contact_info: Option<ContactInfo>,
    pub region_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hospital {
    pub id: i64,
    pub name: String,
    pub hospital_system_id: Option<i64>,
    pub address: Option<Address>,
    pub contact_info: Option<ContactInfo>,
    pub region_id: Option<i64>,
    pub bed_count: Option<i64>,
    pub trauma_level: Option<TraumaLevel>,
    #[serde(flatten)]
    pub audit: AuditInfo,
}

/// Editable columns of a hospital.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalPayload {
    pub name: String,
    pub hospital_system_id: Option<i64>,
    pub address: Option<Address>,
    pub contact_info: Option<ContactInfo>,
    pub region_id: Option<i64>,
    pub bed_count: Option<i64>,
    pub trauma_level: Option<TraumaLevel>,
}

impl Identified for HospitalSystem {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for Hospital {
    fn id(&self) -> i64 {
        self.id
    }
}
