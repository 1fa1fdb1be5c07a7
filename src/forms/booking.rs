//! Surgery-case booking form.
//!
//! Date and time are separate inputs joined into one `scheduled_at`.
//! Creating a booking assigns a case number; editing never changes it.

use rusqlite::Connection;

use super::convert::{
    date_and_time, opt_enum, opt_float, put_num, put_opt, required_int, split_date_time, text,
};
use super::{EntityForm, FormError, FormFields};
use crate::db::{self, DatabaseError, Table};
use crate::models::enums::CaseStatus;
use crate::models::{CaseFilter, SurgeryCasePayload, SurgeryCaseView};
use crate::scheduling;

#[derive(Debug)]
pub struct BookingForm;

impl EntityForm for BookingForm {
    type Row = SurgeryCaseView;
    type Payload = SurgeryCasePayload;

    const TABLE: Table = Table::SurgeryCases;
    const REQUIRED: &'static [&'static str] =
        &["surgeon_id", "hospital_id", "procedure_id", "scheduled_date", "scheduled_time"];

    fn defaults() -> FormFields {
        let mut fields: FormFields = [
            "surgeon_id",
            "hospital_id",
            "procedure_id",
            "scheduled_date",
            "scheduled_time",
            "operating_room",
            "estimated_cost",
            "actual_cost",
            "notes",
        ]
        .iter()
        .map(|name| (name.to_string(), String::new()))
        .collect();
        fields.insert("status".into(), CaseStatus::Scheduled.as_str().into());
        fields
    }

    fn fields_from_row(row: &SurgeryCaseView) -> FormFields {
        let case = &row.case;
        let mut fields = Self::defaults();
        put_num(&mut fields, "surgeon_id", Some(case.surgeon_id));
        put_num(&mut fields, "hospital_id", Some(case.hospital_id));
        put_num(&mut fields, "procedure_id", Some(case.procedure_id));
        split_date_time(&mut fields, &case.scheduled_at, "scheduled_date", "scheduled_time");
        put_opt(&mut fields, "status", Some(case.status.as_str()));
        put_opt(&mut fields, "operating_room", case.operating_room.as_deref());
        put_num(&mut fields, "estimated_cost", case.estimated_cost);
        put_num(&mut fields, "actual_cost", case.actual_cost);
        put_opt(&mut fields, "notes", case.notes.as_deref());
        fields
    }

    fn payload_from_fields(fields: &FormFields) -> Result<SurgeryCasePayload, FormError> {
        let estimated_cost = opt_float(fields, "estimated_cost")?;
        let actual_cost = opt_float(fields, "actual_cost")?;
        for (field, value) in [("estimated_cost", estimated_cost), ("actual_cost", actual_cost)] {
            if value.is_some_and(|v| v < 0.0) {
                return Err(FormError::InvalidValue {
                    field: field.into(),
                    reason: "amount cannot be negative".into(),
                });
            }
        }
        Ok(SurgeryCasePayload {
            surgeon_id: required_int(fields, "surgeon_id")?,
            hospital_id: required_int(fields, "hospital_id")?,
            procedure_id: required_int(fields, "procedure_id")?,
            scheduled_at: date_and_time(fields, "scheduled_date", "scheduled_time")?,
            status: opt_enum(fields, "status")?.unwrap_or(CaseStatus::Scheduled),
            operating_room: text(fields, "operating_room"),
            estimated_cost,
            actual_cost,
            notes: text(fields, "notes"),
        })
    }

    fn create(conn: &Connection, payload: &SurgeryCasePayload, actor: &str) -> Result<SurgeryCaseView, DatabaseError> {
        let case = scheduling::book_case(conn, payload, actor)?;
        db::get_surgery_case_view(conn, case.id)?.ok_or_else(|| DatabaseError::not_found("surgery case", case.id))
    }

    fn update(conn: &Connection, id: i64, payload: &SurgeryCasePayload, actor: &str) -> Result<(), DatabaseError> {
        scheduling::update_case(conn, id, payload, actor, db::repository::now_local())
    }

    fn fetch(conn: &Connection, id: i64) -> Result<Option<SurgeryCaseView>, DatabaseError> {
        Ok(db::get_surgery_case_view(conn, id)?.filter(|v| v.case.audit.is_active))
    }

    fn reload(conn: &Connection) -> Result<Vec<SurgeryCaseView>, DatabaseError> {
        db::list_case_views(conn, &CaseFilter::default())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::db::repository::fixtures::*;
    use crate::db::sqlite::open_memory_database;
    use crate::forms::{submit_create, submit_update, FormController, MISSING_REQUIRED_MESSAGE};

    fn booking_fields(seeded: &Seeded) -> FormFields {
        let mut fields = BookingForm::defaults();
        fields.insert("surgeon_id".into(), seeded.surgeon.id.to_string());
        fields.insert("hospital_id".into(), seeded.hospital.id.to_string());
        fields.insert("procedure_id".into(), seeded.procedure.id.to_string());
        fields.insert("scheduled_date".into(), "2025-04-02".into());
        fields.insert("scheduled_time".into(), "07:30".into());
        fields.insert("estimated_cost".into(), "$18,250.50".into());
        fields
    }

    #[test]
    fn date_and_time_join_into_one_instant() {
        let conn = open_memory_database().unwrap();
        let seeded = seed_reference(&conn);
        let payload = BookingForm::payload_from_fields(&booking_fields(&seeded)).unwrap();
        assert_eq!(
            payload.scheduled_at,
            NaiveDate::from_ymd_opt(2025, 4, 2).unwrap().and_hms_opt(7, 30, 0).unwrap()
        );
        assert_eq!(payload.estimated_cost, Some(18_250.5));
        assert_eq!(payload.status, CaseStatus::Scheduled);
    }

    #[test]
    fn booking_without_surgeon_is_rejected() {
        let conn = open_memory_database().unwrap();
        let seeded = seed_reference(&conn);
        let mut ctl = FormController::<BookingForm>::load(&conn).unwrap();
        ctl.open_create();
        for (k, v) in booking_fields(&seeded) {
            if k != "surgeon_id" {
                ctl.set_field(&k, &v);
            }
        }

        assert!(ctl.submit(&conn, "t").is_err());
        assert_eq!(ctl.error(), Some(MISSING_REQUIRED_MESSAGE));
        assert!(db::list_case_views(&conn, &CaseFilter::default()).unwrap().is_empty());
    }

    #[test]
    fn created_booking_embeds_display_fields() {
        let conn = open_memory_database().unwrap();
        let seeded = seed_reference(&conn);
        let view = submit_create::<BookingForm>(&conn, &booking_fields(&seeded), "scheduler").unwrap();

        assert_eq!(view.surgeon_name, "Dr. Ana Ruiz");
        assert_eq!(view.procedure_code, "TKA");
        assert!(view.case.case_number.starts_with("CASE-"));
        assert_eq!(view.case.audit.created_by.as_deref(), Some("scheduler"));
    }

    #[test]
    fn edit_form_round_trips_and_keeps_case_number() {
        let conn = open_memory_database().unwrap();
        let seeded = seed_reference(&conn);
        let view = submit_create::<BookingForm>(&conn, &booking_fields(&seeded), "t").unwrap();

        let mut fields = BookingForm::fields_from_row(&view);
        assert_eq!(fields["scheduled_date"], "2025-04-02");
        assert_eq!(fields["scheduled_time"], "07:30");
        assert_eq!(fields["estimated_cost"], "18250.5");
        fields.insert("status".into(), "in_progress".into());

        let updated = submit_update::<BookingForm>(&conn, view.case.id, &fields, "t").unwrap();
        assert_eq!(updated.case.case_number, view.case.case_number);
        assert_eq!(updated.case.status, CaseStatus::InProgress);
        assert!(updated.case.actual_start.is_some());
    }

    #[test]
    fn create_form_rejects_completed_booking() {
        let conn = open_memory_database().unwrap();
        let seeded = seed_reference(&conn);
        let mut fields = booking_fields(&seeded);
        fields.insert("status".into(), "completed".into());

        let err = submit_create::<BookingForm>(&conn, &fields, "t").unwrap_err();
        assert!(matches!(err, FormError::Database(DatabaseError::ConstraintViolation(_))));
        assert!(db::list_case_views(&conn, &CaseFilter::default()).unwrap().is_empty());
    }

    #[test]
    fn unknown_status_is_invalid_value() {
        let conn = open_memory_database().unwrap();
        let seeded = seed_reference(&conn);
        let mut fields = booking_fields(&seeded);
        fields.insert("status".into(), "maybe".into());
        assert!(matches!(
            BookingForm::payload_from_fields(&fields),
            Err(FormError::InvalidValue { .. })
        ));
    }
}
