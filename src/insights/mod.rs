//! Externally generated insights: paging, category filter, viewed flag and
//! the refresh round trip to the generator.

pub mod generator;
pub mod refresh;

pub use generator::{GenerationStatus, GenerationTicket, HttpInsightGenerator, InsightGenerator};
pub use refresh::{refresh_insights, RefreshOutcome, RefreshPolicy};

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::db::{self, DatabaseError};
use crate::listing::ListState;
use crate::models::enums::InsightCategory;
use crate::models::{AiInsight, InsightFilter};
use crate::stats::count_by;

#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    #[error("Cannot reach the insight generator at {0}")]
    Connection(String),
    #[error("HTTP client error: {0}")]
    HttpClient(String),
    #[error("Insight generator returned {status}: {body}")]
    Remote { status: u16, body: String },
    #[error("Unreadable generator response: {0}")]
    ResponseParsing(String),
    #[error("Insight generation {run_id} failed: {reason}")]
    GenerationFailed { run_id: String, reason: String },
    #[error("Insight generation {run_id} still pending after {polls} polls")]
    TimedOut { run_id: String, polls: u32 },
    #[error("No insight generator is configured")]
    NotConfigured,
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Client-side category filter over an already loaded page.
pub fn filter_by_category(insights: &[AiInsight], filter: &InsightFilter) -> Vec<AiInsight> {
    insights
        .iter()
        .filter(|i| filter.category.map_or(true, |c| i.category == c))
        .filter(|i| !filter.unviewed_only || !i.is_viewed)
        .cloned()
        .collect()
}

/// One loaded page of insights plus the active filter.
#[derive(Debug, Default)]
pub struct InsightBoard {
    page: ListState<AiInsight>,
    pub filter: InsightFilter,
}

impl InsightBoard {
    pub fn load(conn: &Connection, now: NaiveDateTime, limit: u32) -> Result<Self, DatabaseError> {
        Ok(Self {
            page: ListState::new(db::list_recent_insights(conn, now, limit)?),
            filter: InsightFilter::default(),
        })
    }

    pub fn all(&self) -> &[AiInsight] {
        self.page.items()
    }

    pub fn visible(&self) -> Vec<AiInsight> {
        filter_by_category(self.page.items(), &self.filter)
    }

    pub fn unviewed_count(&self) -> usize {
        self.page.items().iter().filter(|i| !i.is_viewed).count()
    }

    pub fn category_counts(&self) -> BTreeMap<InsightCategory, usize> {
        count_by(self.page.items(), |i| i.category)
    }

    /// Write the flag, then patch the one local record. No re-fetch.
    pub fn mark_viewed(&mut self, conn: &Connection, id: i64, now: NaiveDateTime) -> Result<(), DatabaseError> {
        db::mark_insight_viewed(conn, id, now)?;
        if let Some(mut insight) = self.page.get(id).cloned() {
            insight.is_viewed = true;
            insight.viewed_at = Some(now);
            self.page.replace(insight);
        }
        Ok(())
    }

    /// Swap in a freshly read page after a refresh.
    pub fn reset(&mut self, insights: Vec<AiInsight>) {
        self.page.reset(insights);
    }
}
