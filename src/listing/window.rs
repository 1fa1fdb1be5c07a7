use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::models::{CaseFilter, CaseOrder};

/// Time filter for a list view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeWindow {
    /// Rows created in the last N days, newest first.
    TrailingDays(i64),
    /// Rows scheduled in the Monday-to-Monday week containing the date.
    Week(NaiveDate),
}

impl TimeWindow {
    /// Inclusive lower and exclusive upper bound. Recomputed on every call
    /// so a long-lived view follows the clock.
    pub fn bounds(&self, now: NaiveDateTime) -> (NaiveDateTime, Option<NaiveDateTime>) {
        match self {
            TimeWindow::TrailingDays(days) => (now - Duration::days(*days), None),
            TimeWindow::Week(anchor) => {
                let start = week_start(*anchor).and_time(NaiveTime::MIN);
                (start, Some(start + Duration::days(7)))
            }
        }
    }

    pub fn to_case_filter(&self, now: NaiveDateTime) -> CaseFilter {
        let (from, to) = self.bounds(now);
        match self {
            TimeWindow::TrailingDays(_) => CaseFilter {
                created_from: Some(from),
                order: CaseOrder::NewestFirst,
                ..Default::default()
            },
            TimeWindow::Week(_) => CaseFilter {
                scheduled_from: Some(from),
                scheduled_to: to,
                order: CaseOrder::BySchedule,
                ..Default::default()
            },
        }
    }
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}
