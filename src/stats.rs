//! Derived statistics over already-loaded collections.
//!
//! Every figure is recomputed from the full input on each call.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::models::enums::CaseStatus;
use crate::models::SurgeryCaseView;

/// Growth needs historical snapshots that are not kept, so the field
/// always carries this value.
pub const GROWTH_RATE_PLACEHOLDER: f64 = 0.0;

/// Days counted as "recent" on the booking panel.
pub const RECENT_DAYS: i64 = 7;

/// Items whose timestamp falls within the last `days` days, inclusive.
pub fn count_within_days<T>(
    items: &[T],
    now: NaiveDateTime,
    days: i64,
    timestamp: impl Fn(&T) -> NaiveDateTime,
) -> usize {
    let from = now - Duration::days(days);
    items.iter().filter(|item| timestamp(item) >= from).count()
}

pub fn count_by<T, K: Ord>(items: &[T], key: impl Fn(&T) -> K) -> BTreeMap<K, usize> {
    let mut counts = BTreeMap::new();
    for item in items {
        *counts.entry(key(item)).or_insert(0) += 1;
    }
    counts
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonetarySummary {
    pub total: f64,
    pub count: usize,
    pub average: f64,
}

impl MonetarySummary {
    pub fn from_amounts(amounts: impl IntoIterator<Item = f64>) -> Self {
        let (total, count) = amounts
            .into_iter()
            .fold((0.0, 0usize), |(sum, n), amount| (sum + amount, n + 1));
        Self {
            total,
            count,
            average: if count == 0 { 0.0 } else { total / count as f64 },
        }
    }
}

/// One slice of a percentage-of-total breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share<K> {
    pub key: K,
    pub amount: f64,
    pub percentage: f64,
}

/// Sum `amount` per `key` and express each sum as a share of the total.
/// Sorted by amount, largest first; percentages are 0 when the total is 0.
pub fn percentage_breakdown<T, K: Ord + Clone>(
    items: &[T],
    key: impl Fn(&T) -> K,
    amount: impl Fn(&T) -> f64,
) -> Vec<Share<K>> {
    let mut sums: BTreeMap<K, f64> = BTreeMap::new();
    for item in items {
        *sums.entry(key(item)).or_insert(0.0) += amount(item);
    }
    let total: f64 = sums.values().sum();

    let mut shares: Vec<Share<K>> = sums
        .into_iter()
        .map(|(key, amount)| Share {
            key,
            amount,
            percentage: if total == 0.0 { 0.0 } else { amount / total * 100.0 },
        })
        .collect();
    shares.sort_by(|a, b| b.amount.total_cmp(&a.amount));
    shares
}

/// Figures shown above the booking list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingStats {
    pub total: usize,
    pub last_7_days: usize,
    pub upcoming: usize,
    pub by_status: BTreeMap<CaseStatus, usize>,
    pub estimated_value: MonetarySummary,
    pub growth_rate: f64,
}

impl BookingStats {
    pub fn compute(cases: &[SurgeryCaseView], now: NaiveDateTime) -> Self {
        let mut by_status = count_by(cases, |v| v.case.status);
        for status in CaseStatus::ALL {
            by_status.entry(*status).or_insert(0);
        }
        Self {
            total: cases.len(),
            last_7_days: count_within_days(cases, now, RECENT_DAYS, |v| v.case.audit.created_at),
            upcoming: cases
                .iter()
                .filter(|v| v.case.status == CaseStatus::Scheduled && v.case.scheduled_at > now)
                .count(),
            by_status,
            estimated_value: MonetarySummary::from_amounts(cases.iter().filter_map(|v| v.case.estimated_cost)),
            growth_rate: GROWTH_RATE_PLACEHOLDER,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::models::{AuditInfo, SurgeryCase};

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    fn view(id: i64, created: NaiveDateTime, scheduled: NaiveDateTime, status: CaseStatus, cost: Option<f64>) -> SurgeryCaseView {
        SurgeryCaseView {
            case: SurgeryCase {
                id,
                case_number: format!("CASE-2025-TEST{id:04}"),
                surgeon_id: 1,
                hospital_id: 1,
                procedure_id: 1,
                scheduled_at: scheduled,
                actual_start: None,
                actual_end: None,
                status,
                operating_room: None,
                estimated_cost: cost,
                actual_cost: None,
                notes: None,
                audit: AuditInfo {
                    is_active: true,
                    created_at: created,
                    updated_at: created,
                    created_by: None,
                    updated_by: None,
                },
            },
            surgeon_name: "S".into(),
            hospital_name: "H".into(),
            procedure_name: "P".into(),
            procedure_code: "C".into(),
        }
    }

    #[test]
    fn empty_amounts_average_zero() {
        let summary = MonetarySummary::from_amounts(Vec::<f64>::new());
        assert_eq!(summary, MonetarySummary { total: 0.0, count: 0, average: 0.0 });
    }

    #[test]
    fn average_is_total_over_count() {
        let summary = MonetarySummary::from_amounts([100.0, 200.0, 600.0]);
        assert_eq!(summary.total, 900.0);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.average, 300.0);
    }

    #[test]
    fn trailing_window_is_inclusive_at_boundary() {
        let now = at(20, 12);
        let stamps = vec![at(13, 12), at(13, 11), at(19, 0), at(20, 12)];
        assert_eq!(count_within_days(&stamps, now, 7, |t| *t), 3);
    }

    #[test]
    fn breakdown_sums_to_hundred_and_sorts() {
        let rows = vec![("a", 25.0), ("b", 50.0), ("a", 25.0), ("c", 0.0)];
        let shares = percentage_breakdown(&rows, |r| r.0, |r| r.1);
        assert_eq!(shares[0].key, "a");
        assert_eq!(shares[0].amount, 50.0);
        let total: f64 = shares.iter().map(|s| s.percentage).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn breakdown_of_zero_total_is_all_zero() {
        let rows = vec![("a", 0.0), ("b", 0.0)];
        let shares = percentage_breakdown(&rows, |r| r.0, |r| r.1);
        assert!(shares.iter().all(|s| s.percentage == 0.0));
    }

    #[test]
    fn booking_stats_from_loaded_cases() {
        let now = at(20, 12);
        let cases = vec![
            view(1, at(19, 9), at(22, 8), CaseStatus::Scheduled, Some(1000.0)),
            view(2, at(2, 9), at(18, 8), CaseStatus::Completed, Some(3000.0)),
            view(3, at(15, 9), at(19, 8), CaseStatus::Scheduled, None),
            view(4, at(16, 9), at(25, 8), CaseStatus::Cancelled, None),
        ];

        let stats = BookingStats::compute(&cases, now);

        assert_eq!(stats.total, 4);
        assert_eq!(stats.last_7_days, 3);
        // case 3 is still "scheduled" but already in the past
        assert_eq!(stats.upcoming, 1);
        assert_eq!(stats.by_status[&CaseStatus::Scheduled], 2);
        assert_eq!(stats.by_status[&CaseStatus::NoShow], 0);
        assert_eq!(stats.estimated_value.average, 2000.0);
        assert_eq!(stats.growth_rate, GROWTH_RATE_PLACEHOLDER);
    }

    #[test]
    fn stats_track_the_input_not_a_cache() {
        let now = at(20, 12);
        let mut cases = vec![view(1, at(19, 9), at(22, 8), CaseStatus::Scheduled, None)];
        assert_eq!(BookingStats::compute(&cases, now).total, 1);
        cases.clear();
        assert_eq!(BookingStats::compute(&cases, now).total, 0);
    }
}
