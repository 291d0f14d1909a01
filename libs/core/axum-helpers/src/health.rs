//! Liveness and readiness probes.

use axum::{Json, Router, http::StatusCode, response::IntoResponse, routing::get};
use serde::Serialize;
use std::time::Instant;

/// Probe payload: how long the handler took, in nanoseconds.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResponse {
    pub response_time: u64,
}

async fn probe() -> impl IntoResponse {
    let started = Instant::now();
    let response = ProbeResponse {
        response_time: started.elapsed().as_nanos() as u64,
    };
    (StatusCode::OK, Json(response))
}

/// Liveness endpoint handler. Always 200 while the process is serving.
pub async fn liveness_handler() -> impl IntoResponse {
    probe().await
}

/// Readiness endpoint handler. Always 200 while the process is serving.
pub async fn readiness_handler() -> impl IntoResponse {
    probe().await
}

/// Router with `{prefix}/liveness` and `{prefix}/readiness`.
///
/// `prefix` must be empty or start with `/` and have no trailing slash.
pub fn probe_router(prefix: &str) -> Router {
    Router::new()
        .route(&format!("{prefix}/liveness"), get(liveness_handler))
        .route(&format!("{prefix}/readiness"), get(readiness_handler))
}
