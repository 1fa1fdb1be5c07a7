//! Form-backed handlers shared by every editable entity.
//!
//! Bodies are flat `FormFields`; conversion and required-field checks
//! happen in the entity's `EntityForm` impl.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{Actor, ApiContext};
use crate::db;
use crate::forms::{self, EntityForm, FormFields, FormMode};
use crate::models::Identified;

/// A row opened read-only, with the flat fields an edit form would start from.
#[derive(Debug, Serialize)]
pub struct FormView<R> {
    pub mode: FormMode,
    pub fields: FormFields,
    pub row: R,
}

/// `GET /api/<entity>/:id`
pub async fn detail<F>(State(ctx): State<ApiContext>, Path(id): Path<i64>) -> Result<Json<FormView<F::Row>>, ApiError>
where
    F: EntityForm + Send + Sync + 'static,
    F::Row: Serialize,
{
    let conn = ctx.core.open_db()?;
    let row = F::fetch(&conn, id)?.ok_or_else(|| db::DatabaseError::not_found(F::TABLE.entity_name(), id))?;
    Ok(Json(FormView {
        mode: FormMode::View(id),
        fields: F::fields_from_row(&row),
        row,
    }))
}

/// `POST /api/<entity>`
pub async fn create<F>(
    State(ctx): State<ApiContext>,
    actor: Actor,
    Json(fields): Json<FormFields>,
) -> Result<(StatusCode, Json<F::Row>), ApiError>
where
    F: EntityForm + Send + Sync + 'static,
    F::Row: Serialize,
{
    let conn = ctx.core.open_db()?;
    let row = forms::submit_create::<F>(&conn, &fields, actor.as_str())?;
    tracing::info!(entity = F::TABLE.entity_name(), id = row.id(), actor = actor.as_str(), "Created");
    Ok((StatusCode::CREATED, Json(row)))
}

/// `PUT /api/<entity>/:id`
pub async fn update<F>(
    State(ctx): State<ApiContext>,
    actor: Actor,
    Path(id): Path<i64>,
    Json(fields): Json<FormFields>,
) -> Result<Json<F::Row>, ApiError>
where
    F: EntityForm + Send + Sync + 'static,
    F::Row: Serialize,
{
    let conn = ctx.core.open_db()?;
    let row = forms::submit_update::<F>(&conn, id, &fields, actor.as_str())?;
    tracing::info!(entity = F::TABLE.entity_name(), id, actor = actor.as_str(), "Updated");
    Ok(Json(row))
}

/// `DELETE /api/<entity>/:id`. Soft delete only.
pub async fn delete<F>(State(ctx): State<ApiContext>, actor: Actor, Path(id): Path<i64>) -> Result<StatusCode, ApiError>
where
    F: EntityForm + Send + Sync + 'static,
{
    let conn = ctx.core.open_db()?;
    db::soft_delete(&conn, F::TABLE, id, actor.as_str())?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/<entity>/new`: the blank create form.
pub async fn defaults<F>() -> Json<FormView<Option<()>>>
where
    F: EntityForm + Send + Sync + 'static,
{
    Json(FormView {
        mode: FormMode::Create,
        fields: F::defaults(),
        row: None,
    })
}
