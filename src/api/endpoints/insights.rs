//! Insight board and the generator refresh.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::db;
use crate::db::repository::now_local;
use crate::insights::{refresh_insights, InsightBoard, InsightError, RefreshOutcome};
use crate::models::enums::InsightCategory;
use crate::models::AiInsight;

#[derive(Debug, Default, Deserialize)]
pub struct InsightQuery {
    pub category: Option<InsightCategory>,
    #[serde(default)]
    pub unviewed: bool,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct InsightPage {
    pub insights: Vec<AiInsight>,
    /// Size of the loaded page before the category filter.
    pub loaded: usize,
    pub unviewed: usize,
    pub by_category: BTreeMap<InsightCategory, usize>,
}

/// `GET /api/insights?category=inventory&limit=50`
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<InsightQuery>,
) -> Result<Json<InsightPage>, ApiError> {
    let limit = query.limit.unwrap_or(ctx.core.insight_limit);
    let conn = ctx.core.open_db()?;
    let mut board = InsightBoard::load(&conn, now_local(), limit)?;
    board.filter.category = query.category;
    board.filter.unviewed_only = query.unviewed;

    Ok(Json(InsightPage {
        insights: board.visible(),
        loaded: board.all().len(),
        unviewed: board.unviewed_count(),
        by_category: board.category_counts(),
    }))
}

/// `POST /api/insights/:id/viewed`
pub async fn mark_viewed(State(ctx): State<ApiContext>, Path(id): Path<i64>) -> Result<Json<AiInsight>, ApiError> {
    let conn = ctx.core.open_db()?;
    db::mark_insight_viewed(&conn, id, now_local())?;
    let insight = db::get_insight(&conn, id)?.ok_or_else(|| db::DatabaseError::not_found("insight", id))?;
    Ok(Json(insight))
}

/// `POST /api/insights/refresh`: trigger a run, wait for it to settle,
/// then return the fresh page.
pub async fn refresh(State(ctx): State<ApiContext>) -> Result<Json<RefreshOutcome<Vec<AiInsight>>>, ApiError> {
    let generator = ctx.core.generator().ok_or(InsightError::NotConfigured)?;
    let core = ctx.core.clone();
    let limit = core.insight_limit;

    let outcome = refresh_insights(generator.as_ref(), ctx.core.refresh_policy, || async move {
        let conn = db::open_database(core.db_path())?;
        Ok::<_, InsightError>(db::list_recent_insights(&conn, now_local(), limit)?)
    })
    .await?;

    Ok(Json(outcome))
}
