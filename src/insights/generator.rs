use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::InsightError;

/// Handle for one generation run, returned by the trigger call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationTicket {
    pub run_id: String,
}

/// Definitive state of a generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationStatus {
    Pending,
    Completed {
        #[serde(default)]
        generated: u32,
    },
    Failed {
        #[serde(default)]
        reason: String,
    },
}

/// The external process that writes insight rows.
#[async_trait]
pub trait InsightGenerator: Send + Sync {
    async fn trigger(&self) -> Result<GenerationTicket, InsightError>;

    async fn status(&self, run_id: &str) -> Result<GenerationStatus, InsightError>;
}

/// Generator reached over HTTP.
///
/// - `POST {base}/generate-insights` with `{}` → `{"run_id": "..."}`
/// - `GET {base}/generate-insights/{run_id}` → `{"status": "pending" | "completed" | "failed", ...}`
pub struct HttpInsightGenerator {
    base_url: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpInsightGenerator {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, InsightError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| InsightError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn map_send_error(&self, e: reqwest::Error) -> InsightError {
        if e.is_connect() {
            InsightError::Connection(self.base_url.clone())
        } else if e.is_timeout() {
            InsightError::HttpClient(format!("Request timed out after {}s", self.timeout_secs))
        } else {
            InsightError::HttpClient(e.to_string())
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, InsightError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(InsightError::Remote { status: status.as_u16(), body })
    }
}

#[async_trait]
impl InsightGenerator for HttpInsightGenerator {
    async fn trigger(&self) -> Result<GenerationTicket, InsightError> {
        let url = format!("{}/generate-insights", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let ticket: GenerationTicket = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| InsightError::ResponseParsing(e.to_string()))?;
        tracing::info!(run_id = %ticket.run_id, "Insight generation triggered");
        Ok(ticket)
    }

    async fn status(&self, run_id: &str) -> Result<GenerationStatus, InsightError> {
        let url = format!("{}/generate-insights/{run_id}", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| InsightError::ResponseParsing(e.to_string()))
    }
}
