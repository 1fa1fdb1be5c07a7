//! Hospital systems and hospitals.

use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db;
use crate::listing::{order_hierarchy, HierarchyRow};
use crate::models::{Hospital, HospitalSystem};

pub const INDEPENDENT_HOSPITALS: &str = "Independent hospitals";

/// `GET /api/hospital-systems`: each system followed by its hospitals,
/// then the hospitals that belong to none.
pub async fn hierarchy(
    State(ctx): State<ApiContext>,
) -> Result<Json<Vec<HierarchyRow<HospitalSystem, Hospital>>>, ApiError> {
    let conn = ctx.core.open_db()?;
    let systems = db::list_active_hospital_systems(&conn)?;
    let hospitals = db::list_active_hospitals(&conn)?;
    Ok(Json(order_hierarchy(systems, hospitals, INDEPENDENT_HOSPITALS)))
}

/// `GET /api/hospitals`
pub async fn list_hospitals(State(ctx): State<ApiContext>) -> Result<Json<Vec<Hospital>>, ApiError> {
    let conn = ctx.core.open_db()?;
    Ok(Json(db::list_active_hospitals(&conn)?))
}
