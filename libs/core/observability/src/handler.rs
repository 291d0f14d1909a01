//! Axum handler for the Prometheus scrape endpoint.

use crate::GaugeRegistry;
use axum::{
    Router,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};

/// Content type of the Prometheus text exposition format.
pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Axum handler rendering the registry at scrape time.
pub async fn metrics_handler(State(registry): State<GaugeRegistry>) -> Response {
    (
        [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
        registry.render(),
    )
        .into_response()
}

/// Router serving `registry` under `path`.
pub fn metrics_router(path: &str, registry: GaugeRegistry) -> Router {
    Router::new()
        .route(path, get(metrics_handler))
        .with_state(registry)
}
