//! Sales report endpoint.

use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db::repository::now_local;
use crate::reports::SalesReport;

/// `GET /api/reports/sales`: sections whose table is missing come back as null.
pub async fn sales(State(ctx): State<ApiContext>) -> Result<Json<SalesReport>, ApiError> {
    let conn = ctx.core.open_db()?;
    let report = SalesReport::build(&conn, ctx.core.capabilities, now_local())?;
    Ok(Json(report))
}
