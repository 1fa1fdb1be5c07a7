//! Surgery case bookings, lifecycle moves and the week schedule.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{Actor, ApiContext};
use crate::db;
use crate::db::repository::now_local;
use crate::listing::TimeWindow;
use crate::models::enums::CaseStatus;
use crate::models::{SurgeryCase, SurgeryCaseView};
use crate::scheduling::{self, WeekSchedule};
use crate::stats::BookingStats;

/// Trailing window used when `days` is omitted.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    pub days: Option<i64>,
    pub status: Option<CaseStatus>,
}

fn load_window(ctx: &ApiContext, query: &WindowQuery) -> Result<Vec<SurgeryCaseView>, ApiError> {
    let days = query.days.unwrap_or(DEFAULT_WINDOW_DAYS);
    if days <= 0 {
        return Err(ApiError::BadRequest("days must be a positive number".into()));
    }
    let mut filter = TimeWindow::TrailingDays(days).to_case_filter(now_local());
    filter.status = query.status;

    let conn = ctx.core.open_db()?;
    Ok(db::list_case_views(&conn, &filter)?)
}

/// `GET /api/cases?days=30&status=scheduled`: newest bookings first.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<Vec<SurgeryCaseView>>, ApiError> {
    Ok(Json(load_window(&ctx, &query)?))
}

/// `GET /api/cases/stats?days=30`: figures over the same window as the list.
pub async fn stats(
    State(ctx): State<ApiContext>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<BookingStats>, ApiError> {
    let cases = load_window(&ctx, &query)?;
    Ok(Json(BookingStats::compute(&cases, now_local())))
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: CaseStatus,
}

/// `POST /api/cases/:id/status`
pub async fn change_status(
    State(ctx): State<ApiContext>,
    actor: Actor,
    Path(id): Path<i64>,
    Json(body): Json<StatusChange>,
) -> Result<Json<SurgeryCase>, ApiError> {
    let conn = ctx.core.open_db()?;
    let case = scheduling::transition_case(&conn, id, body.status, actor.as_str(), now_local())?;
    tracing::info!(id, status = %case.status, actor = actor.as_str(), "Case status changed");
    Ok(Json(case))
}

#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    pub week: Option<NaiveDate>,
}

/// `GET /api/schedule?week=2025-06-04`: defaults to the current week.
pub async fn schedule(
    State(ctx): State<ApiContext>,
    Query(query): Query<WeekQuery>,
) -> Result<Json<WeekSchedule>, ApiError> {
    let anchor = query.week.unwrap_or_else(|| now_local().date());
    let conn = ctx.core.open_db()?;
    Ok(Json(scheduling::week_schedule(&conn, anchor)?))
}
