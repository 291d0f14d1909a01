//! Process wiring: registry, collector and HTTP server under one shutdown signal.

use axum_helpers::{ShutdownCoordinator, create_app};
use eyre::{Result, WrapErr};
use observability::GaugeRegistry;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::collector::{Collector, CollectorSettings};
use crate::config::Config;
use crate::metrics::ExporterMetrics;
use crate::providers::CloudApi;
use crate::server;

/// Time the collector gets to finish after a shutdown signal.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Intervals a gauge may go unwritten before the exposition drops it.
const IDLE_INTERVALS: u32 = 3;

/// Run the collector and the HTTP server until SIGINT/SIGTERM or `shutdown`.
///
/// A server failure, including a failed bind, stops the collector and is
/// returned as an error.
pub async fn run<C>(config: &Config, client: C, shutdown: ShutdownCoordinator) -> Result<()>
where
    C: CloudApi + 'static,
{
    let registry = GaugeRegistry::with_idle_timeout(config.interval() * IDLE_INTERVALS);
    let metrics = ExporterMetrics::register(&registry);

    let collector = Collector::new(
        client,
        metrics,
        CollectorSettings::from_config(config),
        shutdown.clone(),
    );
    let mut collector_task = tokio::spawn(async move { collector.run().await });

    let router = server::router(&config.http.normalized_prefix(), registry);
    let http_config = config.http.clone();
    let server_shutdown = shutdown.clone();
    let mut server_task =
        tokio::spawn(async move { create_app(router, &http_config, server_shutdown).await });

    info!("Alibaba Cloud exporter started");

    let early_exit = tokio::select! {
        _ = shutdown.wait_for_signal() => None,
        joined = &mut server_task => {
            shutdown.shutdown();
            Some(joined)
        }
    };

    match tokio::time::timeout(SHUTDOWN_GRACE, &mut collector_task).await {
        Ok(Ok(())) => info!("Collector stopped"),
        Ok(Err(e)) => error!(error = %e, "Collector task failed"),
        Err(_) => {
            warn!(
                grace_secs = SHUTDOWN_GRACE.as_secs(),
                "Collector did not stop within the grace period"
            );
            collector_task.abort();
        }
    }

    let joined = match early_exit {
        Some(joined) => joined,
        None => server_task.await,
    };
    joined
        .wrap_err("HTTP server task panicked")?
        .wrap_err("HTTP server failed")?;

    info!("Shutdown complete");
    Ok(())
}
