//! Rep teams and territories.

use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db;
use crate::listing::{order_hierarchy, HierarchyRow};
use crate::models::{RepTeam, Territory};

pub const UNASSIGNED_TERRITORIES: &str = "Unassigned territories";

/// `GET /api/rep-teams`
pub async fn hierarchy(State(ctx): State<ApiContext>) -> Result<Json<Vec<HierarchyRow<RepTeam, Territory>>>, ApiError> {
    let conn = ctx.core.open_db()?;
    let teams = db::list_active_rep_teams(&conn)?;
    let territories = db::list_active_territories(&conn)?;
    Ok(Json(order_hierarchy(teams, territories, UNASSIGNED_TERRITORIES)))
}

/// `GET /api/territories`
pub async fn list_territories(State(ctx): State<ApiContext>) -> Result<Json<Vec<Territory>>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(db::list_active_territories(&conn)?))
}
