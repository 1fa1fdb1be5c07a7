use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::audit::{AuditInfo, Identified};
use super::enums::InsightCategory;

/// An analytical record written by the external generation process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiInsight {
    pub id: i64,
    pub category: InsightCategory,
    pub title: String,
    pub description: String,
    pub confidence_score: f64,
    pub recommendations: Vec<String>,
    pub data: Option<serde_json::Value>,
    pub is_viewed: bool,
    pub viewed_at: Option<NaiveDateTime>,
    pub expires_at: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub audit: AuditInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInsight {
    pub category: InsightCategory,
    pub title: String,
    pub description: String,
    pub confidence_score: f64,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub expires_at: Option<NaiveDateTime>,
}

impl Identified for AiInsight {
    fn id(&self) -> i64 {
        self.id
    }
}
