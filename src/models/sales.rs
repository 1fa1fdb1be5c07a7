use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::audit::{AuditInfo, Identified};
use super::enums::{InvoiceStatus, OpportunityStage};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: i64,
    pub name: String,
    pub hospital_id: Option<i64>,
    pub territory_id: Option<i64>,
    pub stage: OpportunityStage,
    pub amount: f64,
    pub expected_close: Option<NaiveDate>,
    #[serde(flatten)]
    pub audit: AuditInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOpportunity {
    pub name: String,
    pub hospital_id: Option<i64>,
    pub territory_id: Option<i64>,
    pub stage: OpportunityStage,
    pub amount: f64,
    pub expected_close: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub invoice_number: String,
    pub hospital_id: Option<i64>,
    pub amount: f64,
    pub status: InvoiceStatus,
    pub issued_at: NaiveDateTime,
    pub paid_at: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub audit: AuditInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInvoice {
    pub invoice_number: String,
    pub hospital_id: Option<i64>,
    pub amount: f64,
    pub status: InvoiceStatus,
    pub issued_at: NaiveDateTime,
    pub paid_at: Option<NaiveDateTime>,
}

impl Identified for Opportunity {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Identified for Invoice {
    fn id(&self) -> i64 {
        self.id
    }
}
