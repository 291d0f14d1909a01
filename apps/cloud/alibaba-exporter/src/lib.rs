//! Alibaba Cloud Exporter
//!
//! Polls the Alibaba Cloud billing and compute APIs on a fixed interval and
//! exposes the aggregated snapshot as Prometheus gauges.

pub mod app;
pub mod collector;
pub mod config;
pub mod metrics;
pub mod models;
pub mod pagination;
pub mod providers;
pub mod server;
pub mod units;

pub use collector::{Collector, CollectorSettings, CycleError, CycleReport};
pub use config::Config;
pub use metrics::ExporterMetrics;
pub use providers::{AlibabaClient, CloudApi, ProviderError, ProviderResult};
