//! Access logging middleware.
//!
//! Logs every API request with actor, method, path, status and latency.

use std::time::Instant;

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::{ACTOR_HEADER, DEFAULT_ACTOR};

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let actor = req
        .headers()
        .get(ACTOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(DEFAULT_ACTOR)
        .to_string();

    let started = Instant::now();
    let response = next.run(req).await;
    let latency_ms = started.elapsed().as_millis() as u64;
    let status = response.status().as_u16();

    if response.status().is_server_error() {
        tracing::warn!(%method, %path, %actor, status, latency_ms, "API request failed");
    } else {
        tracing::info!(%method, %path, %actor, status, latency_ms, "API request");
    }

    response
}
