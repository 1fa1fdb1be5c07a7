//! Sales report assembled from opportunities and invoices.
//!
//! Either source table may be missing on a given store. The caller passes
//! the [`ReportCapabilities`] detected at startup and the matching section
//! comes back as `None` instead of failing the whole report.

use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime};
use rusqlite::Connection;
use serde::Serialize;

use crate::capabilities::ReportCapabilities;
use crate::db::{self, DatabaseError};
use crate::models::enums::{InvoiceStatus, OpportunityStage};
use crate::models::{Invoice, Opportunity};
use crate::stats::{count_by, percentage_breakdown, MonetarySummary, Share, GROWTH_RATE_PLACEHOLDER};

/// Open deals expected to close within this many days count as closing soon.
pub const CLOSING_SOON_DAYS: i64 = 30;

const UNASSIGNED_HOSPITAL: &str = "Unassigned";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineSection {
    pub pipeline_total: f64,
    pub opportunity_count: usize,
    pub avg_deal_size: f64,
    pub won_count: usize,
    pub lost_count: usize,
    /// Won as a percentage of closed deals; 0 when nothing has closed.
    pub win_rate: f64,
    pub closing_soon: usize,
    pub by_stage: Vec<Share<OpportunityStage>>,
}

impl PipelineSection {
    pub fn compute(opportunities: &[Opportunity], now: NaiveDateTime) -> Self {
        let summary = MonetarySummary::from_amounts(opportunities.iter().map(|o| o.amount));
        let stages = count_by(opportunities, |o| o.stage);
        let won = stages.get(&OpportunityStage::ClosedWon).copied().unwrap_or(0);
        let lost = stages.get(&OpportunityStage::ClosedLost).copied().unwrap_or(0);
        let horizon = (now + Duration::days(CLOSING_SOON_DAYS)).date();
        let today = now.date();

        Self {
            pipeline_total: summary.total,
            opportunity_count: summary.count,
            avg_deal_size: summary.average,
            won_count: won,
            lost_count: lost,
            win_rate: if won + lost == 0 {
                0.0
            } else {
                won as f64 / (won + lost) as f64 * 100.0
            },
            closing_soon: opportunities
                .iter()
                .filter(|o| !o.stage.is_closed())
                .filter(|o| o.expected_close.is_some_and(|d| d >= today && d <= horizon))
                .count(),
            by_stage: percentage_breakdown(opportunities, |o| o.stage, |o| o.amount),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueSection {
    pub invoiced_total: f64,
    pub invoice_count: usize,
    pub paid_total: f64,
    pub outstanding_total: f64,
    pub overdue_count: usize,
    pub by_hospital: Vec<Share<String>>,
}

impl RevenueSection {
    pub fn compute(invoices: &[Invoice], hospital_names: &HashMap<i64, String>) -> Self {
        let billable: Vec<&Invoice> = invoices.iter().filter(|i| i.status != InvoiceStatus::Void).collect();
        let invoiced = MonetarySummary::from_amounts(billable.iter().map(|i| i.amount));
        let paid: f64 = billable
            .iter()
            .filter(|i| i.status == InvoiceStatus::Paid)
            .map(|i| i.amount)
            .sum();

        let name_of = |invoice: &&Invoice| {
            invoice
                .hospital_id
                .and_then(|id| hospital_names.get(&id).cloned())
                .unwrap_or_else(|| UNASSIGNED_HOSPITAL.to_string())
        };

        Self {
            invoiced_total: invoiced.total,
            invoice_count: invoiced.count,
            paid_total: paid,
            outstanding_total: invoiced.total - paid,
            overdue_count: billable.iter().filter(|i| i.status == InvoiceStatus::Overdue).count(),
            by_hospital: percentage_breakdown(&billable, name_of, |i| i.amount),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesReport {
    pub generated_at: NaiveDateTime,
    pub capabilities: ReportCapabilities,
    pub pipeline: Option<PipelineSection>,
    pub revenue: Option<RevenueSection>,
    pub growth_rate: f64,
}

impl SalesReport {
    pub fn build(conn: &Connection, caps: ReportCapabilities, now: NaiveDateTime) -> Result<Self, DatabaseError> {
        let pipeline = if caps.opportunities {
            Some(PipelineSection::compute(&db::list_active_opportunities(conn)?, now))
        } else {
            None
        };

        let revenue = if caps.invoices {
            // Soft-deleted hospitals keep their name on historical invoices.
            let names: HashMap<i64, String> = db::list_all_hospital_names(conn)?.into_iter().collect();
            Some(RevenueSection::compute(&db::list_active_invoices(conn)?, &names))
        } else {
            None
        };

        tracing::debug!(
            pipeline = pipeline.is_some(),
            revenue = revenue.is_some(),
            "Sales report built"
        );

        Ok(Self {
            generated_at: now,
            capabilities: caps,
            pipeline,
            revenue,
            growth_rate: GROWTH_RATE_PLACEHOLDER,
        })
    }
}
