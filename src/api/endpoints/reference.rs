//! Reference-data loader endpoint.

use axum::extract::{Query, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::reference::{load_reference_data, ReferenceData, ReferenceRequest};

/// `GET /api/reference?hospitals=true&surgeons=true`
///
/// No flags set means every lookup.
pub async fn load(
    State(ctx): State<ApiContext>,
    Query(request): Query<ReferenceRequest>,
) -> Result<Json<ReferenceData>, ApiError> {
    let request = if request.is_empty() { ReferenceRequest::all() } else { request };
    let data = load_reference_data(ctx.core.db_path(), request).await?;
    Ok(Json(data))
}
