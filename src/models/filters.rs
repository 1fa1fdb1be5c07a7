use chrono::NaiveDateTime;

use super::enums::{CaseStatus, InsightCategory};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CaseOrder {
    /// Most recently booked first.
    #[default]
    NewestFirst,
    /// Earliest scheduled slot first.
    BySchedule,
}

#[derive(Debug, Default, Clone)]
pub struct CaseFilter {
    pub created_from: Option<NaiveDateTime>,
    pub scheduled_from: Option<NaiveDateTime>,
    pub scheduled_to: Option<NaiveDateTime>,
    pub status: Option<CaseStatus>,
    pub order: CaseOrder,
}

#[derive(Debug, Default, Clone)]
pub struct InsightFilter {
    pub category: Option<InsightCategory>,
    pub unviewed_only: bool,
}
