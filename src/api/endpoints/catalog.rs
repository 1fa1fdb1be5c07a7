//! Reference-data maintenance: regions, surgeons and procedures.
//!
//! These take typed JSON rather than form fields.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{Actor, ApiContext};
use crate::db;
use crate::forms::MISSING_REQUIRED_MESSAGE;
use crate::models::{NewProcedure, NewRegion, NewSurgeon, Procedure, Region, Surgeon};

fn require(values: &[&str]) -> Result<(), ApiError> {
    if values.iter().any(|v| v.trim().is_empty()) {
        return Err(ApiError::Validation(MISSING_REQUIRED_MESSAGE.into()));
    }
    Ok(())
}

/// `GET /api/regions`
pub async fn list_regions(State(ctx): State<ApiContext>) -> Result<Json<Vec<Region>>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(db::list_active_regions(&conn)?))
}

/// `POST /api/regions`
pub async fn create_region(
    State(ctx): State<ApiContext>,
    actor: Actor,
    Json(body): Json<NewRegion>,
) -> Result<(StatusCode, Json<Region>), ApiError> {
    require(&[body.name.as_str(), body.code.as_str()])?;
    let conn = ctx.core.open_db()?;
    let region = db::insert_region(&conn, &body, actor.as_str())?;
    Ok((StatusCode::CREATED, Json(region)))
}

/// `GET /api/surgeons`
pub async fn list_surgeons(State(ctx): State<ApiContext>) -> Result<Json<Vec<Surgeon>>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(db::list_active_surgeons(&conn)?))
}

/// `POST /api/surgeons`
pub async fn create_surgeon(
    State(ctx): State<ApiContext>,
    actor: Actor,
    Json(body): Json<NewSurgeon>,
) -> Result<(StatusCode, Json<Surgeon>), ApiError> {
    require(&[body.name.as_str()])?;
    let conn = ctx.core.open_db()?;
    let surgeon = db::insert_surgeon(&conn, &body, actor.as_str())?;
    Ok((StatusCode::CREATED, Json(surgeon)))
}

/// `GET /api/procedures`
pub async fn list_procedures(State(ctx): State<ApiContext>) -> Result<Json<Vec<Procedure>>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(db::list_active_procedures(&conn)?))
}

/// `POST /api/procedures`
pub async fn create_procedure(
    State(ctx): State<ApiContext>,
    actor: Actor,
    Json(body): Json<NewProcedure>,
) -> Result<(StatusCode, Json<Procedure>), ApiError> {
    require(&[body.name.as_str(), body.code.as_str()])?;
    let conn = ctx.core.open_db()?;
    let procedure = db::insert_procedure(&conn, &body, actor.as_str())?;
    Ok((StatusCode::CREATED, Json(procedure)))
}
