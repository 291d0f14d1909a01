//! Observability utilities for the cloud billing exporter.
//!
//! This crate provides:
//! - A gauge registry with fixed label schemas and full-replace publishing
//! - Prometheus text exposition of the registry
//! - An Axum handler serving the rendered metrics
//!
//! # Example
//!
//! ```rust,ignore
//! use observability::{GaugeRegistry, metrics_router};
//!
//! let registry = GaugeRegistry::new();
//! let balance = registry.gauge("available_amount_balance", "Account balance");
//! let instances = registry.gauge_vec("ecs_instances", "ECS instances", ["RegionId", "Workload"]);
//!
//! balance.set(42.0);
//! instances.replace_counts(vec![["ap-southeast-1".to_string(), "web".to_string()]]);
//!
//! let app = Router::new().merge(metrics_router("/metrics", registry));
//! ```

pub mod handler;
pub mod registry;

pub use handler::{PROMETHEUS_CONTENT_TYPE, metrics_handler, metrics_router};
pub use registry::{Gauge, GaugeRegistry, GaugeVec};
