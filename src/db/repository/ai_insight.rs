use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{
    audit_from_row, collect_rows, get_enum, get_json, get_ts_opt, now_local, to_json_column,
};
use crate::db::{to_db_timestamp, DatabaseError};
use crate::models::*;

const INSIGHT_COLUMNS: &str = "id, category, title, description, confidence_score,
     recommendations, data, is_viewed, viewed_at, expires_at,
     is_active, created_at, updated_at, created_by, updated_by";

fn map_insight(row: &Row<'_>) -> rusqlite::Result<AiInsight> {
    Ok(AiInsight {
        id: row.get("id")?,
        category: get_enum(row, "category")?,
        title: row.get("title")?,
        description: row.get("description")?,
        confidence_score: row.get("confidence_score")?,
        recommendations: get_json(row, "recommendations")?.unwrap_or_default(),
        data: get_json(row, "data")?,
        is_viewed: row.get::<_, i64>("is_viewed")? != 0,
        viewed_at: get_ts_opt(row, "viewed_at")?,
        expires_at: get_ts_opt(row, "expires_at")?,
        audit: audit_from_row(row)?,
    })
}

/// Write path used by the generation process (and by fixtures).
pub fn insert_insight(conn: &Connection, insight: &NewInsight, actor: &str) -> Result<AiInsight, DatabaseError> {
    let now = to_db_timestamp(&now_local());
    let recommendations = serde_json::to_string(&insight.recommendations)
        .map_err(|e| DatabaseError::InvalidData(e.to_string()))?;
    conn.execute(
        "INSERT INTO ai_insights
         (category, title, description, confidence_score, recommendations, data, expires_at,
          created_at, updated_at, created_by, updated_by)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8, ?9, ?9)",
        params![
            insight.category.as_str(),
            insight.title,
            insight.description,
            insight.confidence_score,
            recommendations,
            to_json_column(insight.data.as_ref())?,
            insight.expires_at.as_ref().map(to_db_timestamp),
            now,
            actor,
        ],
    )?;
    let id = conn.last_insert_rowid();
    get_insight(conn, id)?.ok_or_else(|| DatabaseError::not_found("insight", id))
}

pub fn get_insight(conn: &Connection, id: i64) -> Result<Option<AiInsight>, DatabaseError> {
    let sql = format!("SELECT {INSIGHT_COLUMNS} FROM ai_insights WHERE id = ?1");
    Ok(conn.query_row(&sql, params![id], map_insight).optional()?)
}

/// Newest-first page of live, unexpired insights.
pub fn list_recent_insights(
    conn: &Connection,
    now: NaiveDateTime,
    limit: u32,
) -> Result<Vec<AiInsight>, DatabaseError> {
    let sql = format!(
        "SELECT {INSIGHT_COLUMNS} FROM ai_insights
         WHERE is_active = 1 AND (expires_at IS NULL OR expires_at > ?1)
         ORDER BY created_at DESC, id DESC
         LIMIT ?2"
    );
    collect_rows(conn, &sql, params![to_db_timestamp(&now), limit], map_insight)
}

/// Set only `is_viewed` and `viewed_at` on one insight.
pub fn mark_insight_viewed(conn: &Connection, id: i64, viewed_at: NaiveDateTime) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE ai_insights SET is_viewed = 1, viewed_at = ?1 WHERE id = ?2 AND is_active = 1",
        params![to_db_timestamp(&viewed_at), id],
    )?;
    if changed == 0 {
        return Err(DatabaseError::not_found("insight", id));
    }
    Ok(())
}
