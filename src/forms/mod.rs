//! Form controller: flat string inputs → typed payload → create or update.
//!
//! Each editable entity implements [`EntityForm`]. The same pipeline
//! serves the stateless HTTP handlers ([`submit_create`], [`submit_update`])
//! and the stateful [`FormController`] that owns a local list.

pub mod booking;
pub mod convert;
pub mod organization;
pub mod team;

pub use booking::BookingForm;
pub use organization::{HospitalForm, HospitalSystemForm};
pub use team::{RepTeamForm, TerritoryForm};

use std::collections::BTreeMap;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::db::{soft_delete, DatabaseError, Table};
use crate::listing::ListState;
use crate::models::Identified;

/// Field name → raw input value, independent of the stored row shape.
pub type FormFields = BTreeMap<String, String>;

pub const MISSING_REQUIRED_MESSAGE: &str = "Please fill in all required fields";

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("{}", MISSING_REQUIRED_MESSAGE)]
    MissingRequired,
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("This form is read-only")]
    ReadOnly,
    #[error("No form is open")]
    Closed,
    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl FormError {
    /// The single line shown inline inside the form.
    pub fn user_message(&self) -> String {
        match self {
            FormError::Database(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

/// Which of the three form variants is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "id", rename_all = "snake_case")]
pub enum FormMode {
    Create,
    Edit(i64),
    View(i64),
}

/// One editable entity kind.
pub trait EntityForm {
    type Row: Identified + Clone;
    type Payload;

    const TABLE: Table;
    const REQUIRED: &'static [&'static str];

    /// Blank form state.
    fn defaults() -> FormFields;

    /// Flatten a stored row (including nested JSON attributes) into fields.
    fn fields_from_row(row: &Self::Row) -> FormFields;

    /// Convert validated fields into the persisted types.
    fn payload_from_fields(fields: &FormFields) -> Result<Self::Payload, FormError>;

    fn create(conn: &Connection, payload: &Self::Payload, actor: &str) -> Result<Self::Row, DatabaseError>;

    fn update(conn: &Connection, id: i64, payload: &Self::Payload, actor: &str) -> Result<(), DatabaseError>;

    /// Live row by id. Soft-deleted rows read as `None`; the repository
    /// getters still return them for history.
    fn fetch(conn: &Connection, id: i64) -> Result<Option<Self::Row>, DatabaseError>;

    fn reload(conn: &Connection) -> Result<Vec<Self::Row>, DatabaseError>;
}

/// Fail fast on the first blank required field.
pub fn validate_required(fields: &FormFields, required: &[&str]) -> Result<(), FormError> {
    let blank = required
        .iter()
        .any(|name| fields.get(*name).map_or(true, |v| v.trim().is_empty()));
    if blank {
        return Err(FormError::MissingRequired);
    }
    Ok(())
}

/// Validate and convert without touching the store.
pub fn prepare<F: EntityForm>(fields: &FormFields) -> Result<F::Payload, FormError> {
    validate_required(fields, F::REQUIRED)?;
    F::payload_from_fields(fields)
}

pub fn submit_create<F: EntityForm>(conn: &Connection, fields: &FormFields, actor: &str) -> Result<F::Row, FormError> {
    let payload = prepare::<F>(fields)?;
    Ok(F::create(conn, &payload, actor)?)
}

/// Overwrite one row and return its fresh copy.
pub fn submit_update<F: EntityForm>(
    conn: &Connection,
    id: i64,
    fields: &FormFields,
    actor: &str,
) -> Result<F::Row, FormError> {
    let payload = prepare::<F>(fields)?;
    F::update(conn, id, &payload, actor)?;
    F::fetch(conn, id)?
        .ok_or_else(|| FormError::Database(DatabaseError::not_found(F::TABLE.entity_name(), id)))
}

/// What a successful submit did.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<R> {
    Created(R),
    Updated(i64),
}

/// Stateful form plus the list it feeds.
///
/// `submit` takes `&mut self`, so a second write cannot start while one
/// is running.
#[derive(Debug)]
pub struct FormController<F: EntityForm> {
    mode: Option<FormMode>,
    fields: FormFields,
    error: Option<String>,
    list: ListState<F::Row>,
}

impl<F: EntityForm> FormController<F> {
    pub fn new(rows: Vec<F::Row>) -> Self {
        Self {
            mode: None,
            fields: F::defaults(),
            error: None,
            list: ListState::new(rows),
        }
    }

    pub fn load(conn: &Connection) -> Result<Self, DatabaseError> {
        Ok(Self::new(F::reload(conn)?))
    }

    pub fn mode(&self) -> Option<FormMode> {
        self.mode
    }

    pub fn is_open(&self) -> bool {
        self.mode.is_some()
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn list(&self) -> &ListState<F::Row> {
        &self.list
    }

    pub fn open_create(&mut self) {
        self.error = None;
        self.fields = F::defaults();
        self.mode = Some(FormMode::Create);
    }

    pub fn open_edit(&mut self, row: &F::Row) {
        self.error = None;
        self.fields = F::fields_from_row(row);
        self.mode = Some(FormMode::Edit(row.id()));
    }

    pub fn open_view(&mut self, row: &F::Row) {
        self.error = None;
        self.fields = F::fields_from_row(row);
        self.mode = Some(FormMode::View(row.id()));
    }

    /// Ignored unless a create or edit form is open.
    pub fn set_field(&mut self, name: &str, value: &str) {
        if matches!(self.mode, Some(FormMode::Create) | Some(FormMode::Edit(_))) {
            self.fields.insert(name.to_string(), value.to_string());
        }
    }

    /// Persist the open form. On success the list is patched and the form
    /// closes; on failure the message is kept and the form stays open.
    pub fn submit(&mut self, conn: &Connection, actor: &str) -> Result<SubmitOutcome<F::Row>, FormError> {
        let result = match self.mode {
            None => Err(FormError::Closed),
            Some(FormMode::View(_)) => Err(FormError::ReadOnly),
            Some(FormMode::Create) => submit_create::<F>(conn, &self.fields, actor).map(|row| {
                self.list.prepend(row.clone());
                SubmitOutcome::Created(row)
            }),
            Some(FormMode::Edit(id)) => submit_update::<F>(conn, id, &self.fields, actor)
                .and_then(|_| Ok(F::reload(conn)?))
                .map(|rows| {
                    self.list.reset(rows);
                    SubmitOutcome::Updated(id)
                }),
        };

        match result {
            Ok(outcome) => {
                self.close();
                Ok(outcome)
            }
            Err(err) => {
                tracing::warn!(table = F::TABLE.as_str(), error = %err, "Form submit failed");
                self.error = Some(err.user_message());
                Err(err)
            }
        }
    }

    /// Soft-delete one listed row, then drop it locally.
    pub fn delete(&mut self, conn: &Connection, id: i64, actor: &str) -> Result<(), FormError> {
        match soft_delete(conn, F::TABLE, id, actor) {
            Ok(()) => {
                self.list.remove(id);
                Ok(())
            }
            Err(err) => {
                self.error = Some(err.user_message());
                Err(err.into())
            }
        }
    }

    /// Always clears the error and resets the fields.
    pub fn close(&mut self) {
        self.mode = None;
        self.error = None;
        self.fields = F::defaults();
    }
}
