//! Surgery-case booking rules: case numbers, lifecycle moves and the week view.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use rand::Rng;
use rusqlite::Connection;
use serde::Serialize;

use crate::db::{self, DatabaseError};
use crate::listing::{week_start, TimeWindow};
use crate::models::enums::CaseStatus;
use crate::models::{SurgeryCase, SurgeryCasePayload, SurgeryCaseView};

const CASE_SUFFIX_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Attempts before giving up on a colliding case number.
const MAX_CASE_NUMBER_ATTEMPTS: usize = 3;

/// `CASE-<year>-<5 random base36 chars><last 4 digits of epoch millis>`.
pub fn generate_case_number<R: Rng + ?Sized>(now: DateTime<Local>, rng: &mut R) -> String {
    let random: String = (0..5)
        .map(|_| CASE_SUFFIX_ALPHABET[rng.gen_range(0..CASE_SUFFIX_ALPHABET.len())] as char)
        .collect();
    let millis = now.timestamp_millis().rem_euclid(10_000);
    format!("CASE-{}-{random}{millis:04}", now.year())
}

/// Book a new case under a fresh case number.
///
/// New bookings always start as `scheduled`; later states are reached
/// through [`transition_case`]. Retries with a new number when the unique
/// index rejects a collision.
pub fn book_case(conn: &Connection, payload: &SurgeryCasePayload, actor: &str) -> Result<SurgeryCase, DatabaseError> {
    if payload.status != CaseStatus::Scheduled {
        return Err(DatabaseError::ConstraintViolation(format!(
            "A new booking must start as scheduled, not {}.",
            payload.status.as_str().replace('_', " ")
        )));
    }
    let mut rng = rand::thread_rng();
    let mut attempt = 0;
    loop {
        attempt += 1;
        let case_number = generate_case_number(Local::now(), &mut rng);
        match db::insert_surgery_case(conn, &case_number, payload, actor) {
            Ok(case) => return Ok(case),
            Err(e) if e.is_unique_violation() && attempt < MAX_CASE_NUMBER_ATTEMPTS => {
                tracing::warn!(case_number, attempt, "Case number collision, retrying");
            }
            Err(e) => return Err(e),
        }
    }
}

/// Actual-time stamps after moving to `next`. Existing stamps are kept.
pub fn stamp_times(
    actual_start: Option<NaiveDateTime>,
    actual_end: Option<NaiveDateTime>,
    next: CaseStatus,
    now: NaiveDateTime,
) -> (Option<NaiveDateTime>, Option<NaiveDateTime>) {
    match next {
        CaseStatus::InProgress => (actual_start.or(Some(now)), actual_end),
        CaseStatus::Completed => (actual_start.or(Some(now)), actual_end.or(Some(now))),
        _ => (actual_start, actual_end),
    }
}

fn check_transition(from: CaseStatus, to: CaseStatus) -> Result<(), DatabaseError> {
    if from.can_transition_to(to) {
        return Ok(());
    }
    Err(DatabaseError::ConstraintViolation(format!(
        "A {} case cannot be moved to {}.",
        from.as_str().replace('_', " "),
        to.as_str().replace('_', " ")
    )))
}

fn load_case(conn: &Connection, id: i64) -> Result<SurgeryCase, DatabaseError> {
    db::get_surgery_case(conn, id)?
        .filter(|case| case.audit.is_active)
        .ok_or_else(|| DatabaseError::not_found("surgery case", id))
}

/// Move one case along its lifecycle.
pub fn transition_case(
    conn: &Connection,
    id: i64,
    next: CaseStatus,
    actor: &str,
    now: NaiveDateTime,
) -> Result<SurgeryCase, DatabaseError> {
    let current = load_case(conn, id)?;
    check_transition(current.status, next)?;
    let (start, end) = stamp_times(current.actual_start, current.actual_end, next, now);
    db::set_case_status(conn, id, next, start, end, actor)?;
    load_case(conn, id)
}

/// Full booking edit. The status change is validated and stamped in the
/// same transaction as the column overwrite.
pub fn update_case(
    conn: &Connection,
    id: i64,
    payload: &SurgeryCasePayload,
    actor: &str,
    now: NaiveDateTime,
) -> Result<(), DatabaseError> {
    let current = load_case(conn, id)?;
    check_transition(current.status, payload.status)?;

    let tx = conn.unchecked_transaction()?;
    db::update_surgery_case(&tx, id, payload, actor)?;
    if current.status != payload.status {
        let (start, end) = stamp_times(current.actual_start, current.actual_end, payload.status, now);
        db::set_case_status(&tx, id, payload.status, start, end, actor)?;
    }
    tx.commit()?;
    Ok(())
}

/// Cases of one Monday-to-Monday week grouped by calendar day.
#[derive(Debug, Clone, Serialize)]
pub struct WeekSchedule {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: BTreeMap<NaiveDate, Vec<SurgeryCaseView>>,
}

impl WeekSchedule {
    pub fn case_count(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }
}

pub fn week_schedule(conn: &Connection, anchor: NaiveDate) -> Result<WeekSchedule, DatabaseError> {
    let start = week_start(anchor);
    // Week bounds ignore the clock.
    let filter = TimeWindow::Week(anchor).to_case_filter(start.and_time(NaiveTime::MIN));

    let mut days: BTreeMap<NaiveDate, Vec<SurgeryCaseView>> =
        (0..7).map(|offset| (start + Duration::days(offset), Vec::new())).collect();
    for view in db::list_case_views(conn, &filter)? {
        days.entry(view.case.scheduled_at.date()).or_default().push(view);
    }

    Ok(WeekSchedule {
        start,
        end: start + Duration::days(7),
        days,
    })
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::db::repository::fixtures::*;
    use crate::db::sqlite::open_memory_database;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
    }

    #[test]
    fn case_number_format() {
        let now = Local.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let number = generate_case_number(now, &mut rng);

        assert!(number.starts_with("CASE-2025-"));
        let suffix = &number["CASE-2025-".len()..];
        assert_eq!(suffix.len(), 9);
        assert!(suffix[..5].chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        let expected_millis = format!("{:04}", now.timestamp_millis() % 10_000);
        assert_eq!(&suffix[5..], expected_millis);
    }

    #[test]
    fn case_numbers_differ_across_draws() {
        let now = Local::now();
        let mut rng = StdRng::seed_from_u64(42);
        let a = generate_case_number(now, &mut rng);
        let b = generate_case_number(now, &mut rng);
        assert_ne!(a, b);
    }

    #[test]
    fn stamps_only_fill_empty_slots() {
        let t1 = at(2025, 3, 10, 8);
        let t2 = at(2025, 3, 10, 11);
        assert_eq!(stamp_times(None, None, CaseStatus::InProgress, t1), (Some(t1), None));
        assert_eq!(stamp_times(Some(t1), None, CaseStatus::Completed, t2), (Some(t1), Some(t2)));
        assert_eq!(stamp_times(None, None, CaseStatus::Cancelled, t2), (None, None));
    }

    #[test]
    fn booked_case_gets_number_and_keeps_it_on_edit() {
        let conn = open_memory_database().unwrap();
        let seeded = seed_reference(&conn);
        let payload = case_payload(&seeded, at(2025, 3, 12, 9));
        let case = book_case(&conn, &payload, "t").unwrap();
        assert!(case.case_number.starts_with("CASE-"));

        let mut edited = payload.clone();
        edited.operating_room = Some("OR-7".into());
        update_case(&conn, case.id, &edited, "t", at(2025, 3, 11, 9)).unwrap();

        let stored = db::get_surgery_case(&conn, case.id).unwrap().unwrap();
        assert_eq!(stored.case_number, case.case_number);
        assert_eq!(stored.operating_room.as_deref(), Some("OR-7"));
    }

    #[test]
    fn booking_cannot_start_past_scheduled() {
        let conn = open_memory_database().unwrap();
        let seeded = seed_reference(&conn);
        for status in [CaseStatus::Completed, CaseStatus::NoShow, CaseStatus::InProgress] {
            let mut payload = case_payload(&seeded, at(2025, 3, 12, 9));
            payload.status = status;
            let err = book_case(&conn, &payload, "t").unwrap_err();
            assert!(matches!(err, DatabaseError::ConstraintViolation(_)), "{status:?}");
            assert!(err.user_message().contains("must start as scheduled"));
        }
        assert!(db::list_case_views(&conn, &Default::default()).unwrap().is_empty());
    }

    #[test]
    fn lifecycle_moves_stamp_actual_times() {
        let conn = open_memory_database().unwrap();
        let seeded = seed_reference(&conn);
        let case = book_case(&conn, &case_payload(&seeded, at(2025, 3, 12, 9)), "t").unwrap();

        let started = transition_case(&conn, case.id, CaseStatus::InProgress, "t", at(2025, 3, 12, 9)).unwrap();
        assert_eq!(started.actual_start, Some(at(2025, 3, 12, 9)));
        assert!(started.actual_end.is_none());

        let done = transition_case(&conn, case.id, CaseStatus::Completed, "t", at(2025, 3, 12, 11)).unwrap();
        assert_eq!(done.actual_start, Some(at(2025, 3, 12, 9)));
        assert_eq!(done.actual_end, Some(at(2025, 3, 12, 11)));
    }

    #[test]
    fn terminal_status_rejects_moves() {
        let conn = open_memory_database().unwrap();
        let seeded = seed_reference(&conn);
        let case = book_case(&conn, &case_payload(&seeded, at(2025, 3, 12, 9)), "t").unwrap();
        transition_case(&conn, case.id, CaseStatus::Cancelled, "t", at(2025, 3, 11, 9)).unwrap();

        let err = transition_case(&conn, case.id, CaseStatus::InProgress, "t", at(2025, 3, 12, 9)).unwrap_err();
        assert!(matches!(err, DatabaseError::ConstraintViolation(_)));
        assert!(err.user_message().contains("cancelled"));
    }

    #[test]
    fn edit_with_illegal_status_leaves_row_untouched() {
        let conn = open_memory_database().unwrap();
        let seeded = seed_reference(&conn);
        let payload = case_payload(&seeded, at(2025, 3, 12, 9));
        let case = book_case(&conn, &payload, "t").unwrap();

        let mut edited = payload.clone();
        edited.status = CaseStatus::Completed;
        edited.notes = Some("skipped ahead".into());
        assert!(update_case(&conn, case.id, &edited, "t", at(2025, 3, 12, 9)).is_err());

        let stored = db::get_surgery_case(&conn, case.id).unwrap().unwrap();
        assert_eq!(stored.status, CaseStatus::Scheduled);
        assert!(stored.notes.is_none());
    }

    #[test]
    fn week_schedule_groups_by_day() {
        let conn = open_memory_database().unwrap();
        let seeded = seed_reference(&conn);
        // Week of Monday 2025-03-10
        book_case(&conn, &case_payload(&seeded, at(2025, 3, 10, 8)), "t").unwrap();
        book_case(&conn, &case_payload(&seeded, at(2025, 3, 12, 14)), "t").unwrap();
        book_case(&conn, &case_payload(&seeded, at(2025, 3, 12, 9)), "t").unwrap();
        book_case(&conn, &case_payload(&seeded, at(2025, 3, 17, 0)), "t").unwrap();
        book_case(&conn, &case_payload(&seeded, at(2025, 3, 9, 23)), "t").unwrap();

        let week = week_schedule(&conn, NaiveDate::from_ymd_opt(2025, 3, 13).unwrap()).unwrap();

        assert_eq!(week.start, NaiveDate::from_ymd_opt(2025, 3, 10).unwrap());
        assert_eq!(week.end, NaiveDate::from_ymd_opt(2025, 3, 17).unwrap());
        assert_eq!(week.days.len(), 7);
        assert_eq!(week.case_count(), 3);
        let wednesday = &week.days[&NaiveDate::from_ymd_opt(2025, 3, 12).unwrap()];
        assert_eq!(wednesday.len(), 2);
        assert!(wednesday[0].case.scheduled_at < wednesday[1].case.scheduled_at);
        assert!(week.days[&NaiveDate::from_ymd_opt(2025, 3, 11).unwrap()].is_empty());
    }
}
