//! HTTP surface: Prometheus scrape endpoint, probes and the JSON 404 fallback.

use axum::Router;
use axum_helpers::{not_found, probe_router};
use observability::{GaugeRegistry, metrics_router};

/// Router for `{prefix}/metrics`, `{prefix}/liveness` and `{prefix}/readiness`.
///
/// `prefix` must already be normalised (`/x` or empty).
pub fn router(prefix: &str, registry: GaugeRegistry) -> Router {
    Router::new()
        .merge(metrics_router(&format!("{prefix}/metrics"), registry))
        .merge(probe_router(prefix))
        .fallback(not_found)
}
