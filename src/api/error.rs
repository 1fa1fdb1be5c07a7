//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::core_state::CoreError;
use crate::db::DatabaseError;
use crate::forms::FormError;
use crate::insights::InsightError;
use crate::reference::ReferenceError;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    /// Input that parsed but cannot be saved as given.
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Reference data unavailable: {0}")]
    ReferenceLoad(&'static str),
    #[error("Insight generation unavailable: {0}")]
    GeneratorUnavailable(String),
    #[error("Insight generation failed: {0}")]
    Upstream(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail.clone()),
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail.clone()),
            ApiError::Validation(detail) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_FAILED",
                detail.clone(),
            ),
            ApiError::Conflict(detail) => (StatusCode::CONFLICT, "CONFLICT", detail.clone()),
            ApiError::ReferenceLoad(collection) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "REFERENCE_LOAD_FAILED",
                format!("Could not load {collection}. Please try again."),
            ),
            ApiError::GeneratorUnavailable(detail) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "GENERATOR_UNAVAILABLE",
                detail.clone(),
            ),
            ApiError::Upstream(detail) => (StatusCode::BAD_GATEWAY, "GENERATION_FAILED", detail.clone()),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail { code, message },
        };
        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Database(e) => e.into(),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        if err.is_unique_violation() {
            return ApiError::Conflict(err.user_message());
        }
        if err.is_foreign_key_violation() {
            return ApiError::Validation(err.user_message());
        }
        match err {
            DatabaseError::NotFound { .. } => ApiError::NotFound(err.user_message()),
            DatabaseError::InactiveReference { .. } => ApiError::Validation(err.user_message()),
            DatabaseError::ConstraintViolation(detail) => ApiError::Conflict(detail),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<FormError> for ApiError {
    fn from(err: FormError) -> Self {
        match err {
            FormError::Database(e) => e.into(),
            FormError::MissingRequired | FormError::InvalidValue { .. } => ApiError::Validation(err.user_message()),
            FormError::ReadOnly | FormError::Closed => ApiError::BadRequest(err.user_message()),
        }
    }
}

impl From<InsightError> for ApiError {
    fn from(err: InsightError) -> Self {
        match err {
            InsightError::Database(e) => e.into(),
            InsightError::NotConfigured | InsightError::Connection(_) => {
                ApiError::GeneratorUnavailable(err.to_string())
            }
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl From<ReferenceError> for ApiError {
    fn from(err: ReferenceError) -> Self {
        tracing::error!(error = %err, "Reference data load failed");
        ApiError::ReferenceLoad(err.collection())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn json_of(response: Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn not_found_returns_404() {
        let response = ApiError::NotFound("Hospital not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = json_of(response).await;
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn internal_hides_details() {
        let response = ApiError::Internal("disk I/O error at page 7".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = json_of(response).await;
        assert_eq!(json["error"]["message"], "An internal error occurred");
    }

    #[tokio::test]
    async fn missing_required_is_422_with_single_message() {
        let response = ApiError::from(FormError::MissingRequired).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = json_of(response).await;
        assert_eq!(json["error"]["message"], crate::forms::MISSING_REQUIRED_MESSAGE);
    }

    #[tokio::test]
    async fn db_not_found_maps_to_404_with_friendly_text() {
        let response = ApiError::from(DatabaseError::not_found("territory", 9)).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = json_of(response).await;
        assert!(json["error"]["message"].as_str().unwrap().contains("territory"));
    }

    #[tokio::test]
    async fn inactive_reference_is_422_asking_for_reload() {
        let err = DatabaseError::InactiveReference {
            entity_type: "surgeon".into(),
            id: "4".into(),
        };
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let json = json_of(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_FAILED");
        let message = json["error"]["message"].as_str().unwrap();
        assert!(message.contains("surgeon no longer exists"));
    }

    #[tokio::test]
    async fn reference_failure_names_collection() {
        let err = ReferenceError::Lookup {
            collection: "surgeons",
            source: DatabaseError::InvalidData("x".into()),
        };
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = json_of(response).await;
        assert_eq!(json["error"]["code"], "REFERENCE_LOAD_FAILED");
        assert!(json["error"]["message"].as_str().unwrap().contains("surgeons"));
    }

    #[tokio::test]
    async fn unconfigured_generator_is_503() {
        let response = ApiError::from(InsightError::NotConfigured).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn timed_out_generation_is_502() {
        let err = InsightError::TimedOut { run_id: "r1".into(), polls: 3 };
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
