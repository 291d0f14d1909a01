//! Collection Orchestrator
//!
//! Runs one collection cycle per tick: prepaid packages, account balance,
//! compute inventory across regions, then the billing instance inventory.
//! Every step publishes its own series as soon as it finishes, so a failure in
//! one step never blanks the others.

use axum_helpers::ShutdownCoordinator;
use chrono::Utc;
use futures::FutureExt;
use serde::Serialize;
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};
use strum::{Display, EnumIter, IntoEnumIterator};
use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::metrics::ExporterMetrics;
use crate::models::{ComputeInstance, ResourcePackage};
use crate::pagination::{Page, PageRequest, paginate};
use crate::providers::{CloudApi, ProviderError, ProviderResult};
use crate::units::to_bytes;

/// Why a cycle did not run to completion.
#[derive(Error, Debug)]
pub enum CycleError {
    #[error("cycle cancelled by shutdown")]
    Cancelled,

    #[error("cycle panicked: {0}")]
    Panicked(String),
}

/// Aggregation steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Step {
    PrepaidCommodities,
    AccountBalance,
    ComputeInstances,
    AvailableInstances,
}

/// Outcome of one completed cycle.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleReport {
    pub failed_steps: Vec<Step>,
    /// Regions whose instance listing failed; they contribute nothing.
    pub failed_regions: Vec<String>,
    pub compute_instances: usize,
    pub billing_instances: usize,
    pub duration: Duration,
}

impl CycleReport {
    /// Failed remote listings: whole steps plus individual regions.
    pub fn failures(&self) -> usize {
        self.failed_steps.len() + self.failed_regions.len()
    }
}

/// Orchestrator settings, fixed for the process lifetime.
#[derive(Debug, Clone)]
pub struct CollectorSettings {
    pub interval: Duration,
    pub excluded_region_prefixes: Vec<String>,
    pub prepaid_traffic_commodity: String,
    pub page_size: u32,
}

impl CollectorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            interval: config.interval(),
            excluded_region_prefixes: config.collector.excluded_region_prefixes.clone(),
            prepaid_traffic_commodity: config.collector.prepaid_traffic_commodity.clone(),
            page_size: config.collector.page_size,
        }
    }

    pub fn is_excluded(&self, region: &str) -> bool {
        self.excluded_region_prefixes
            .iter()
            .any(|prefix| region.starts_with(prefix.as_str()))
    }
}

#[derive(Error, Debug)]
enum StepError {
    #[error("cancelled")]
    Cancelled,

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Drives collection cycles against a [`CloudApi`] and publishes the results.
pub struct Collector<C> {
    client: C,
    metrics: ExporterMetrics,
    settings: CollectorSettings,
    shutdown: ShutdownCoordinator,
}

impl<C: CloudApi> Collector<C> {
    pub fn new(
        client: C,
        metrics: ExporterMetrics,
        settings: CollectorSettings,
        shutdown: ShutdownCoordinator,
    ) -> Self {
        Self {
            client,
            metrics,
            settings,
            shutdown,
        }
    }

    /// Run a cycle now, then one per interval until shutdown.
    ///
    /// Cycles never overlap: ticks missed while a cycle overruns are skipped.
    pub async fn run(&self) {
        info!(
            interval_secs = self.settings.interval.as_secs(),
            "Starting collection loop"
        );

        let mut ticker = tokio::time::interval(self.settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    match self.run_guarded().await {
                        Ok(_) => {}
                        Err(CycleError::Cancelled) => {
                            info!("Collection cycle interrupted by shutdown");
                        }
                        Err(e) => {
                            error!(error = %e, "Collection cycle aborted");
                        }
                    }
                }
            }
        }

        info!("Collection loop stopped");
    }

    /// One cycle behind a panic boundary.
    pub async fn run_guarded(&self) -> Result<CycleReport, CycleError> {
        match AssertUnwindSafe(self.run_cycle()).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(CycleError::Panicked(panic_message(payload.as_ref()))),
        }
    }

    /// Execute every step in order, publishing each as it completes.
    pub async fn run_cycle(&self) -> Result<CycleReport, CycleError> {
        let start = Instant::now();
        info!("Collection cycle started");

        let mut report = CycleReport::default();

        for step in Step::iter() {
            if self.shutdown.is_shutting_down() {
                return Err(CycleError::Cancelled);
            }

            let outcome = match step {
                Step::PrepaidCommodities => self.collect_commodities().await,
                Step::AccountBalance => self.collect_balance().await,
                Step::ComputeInstances => self.collect_compute(&mut report).await,
                Step::AvailableInstances => self.collect_inventory(&mut report).await,
            };

            match outcome {
                Ok(()) => {}
                Err(StepError::Cancelled) => return Err(CycleError::Cancelled),
                Err(StepError::Provider(e)) => {
                    warn!(step = %step, error = %e, "Collection step failed");
                    self.publish_empty(step);
                    report.failed_steps.push(step);
                }
            }
        }

        report.duration = start.elapsed();
        self.metrics
            .cycle_duration
            .set(report.duration.as_secs_f64());
        self.metrics.cycle_failed_steps.set(report.failures() as f64);
        self.metrics
            .last_cycle_timestamp
            .set(Utc::now().timestamp() as f64);

        info!(
            elapsed_ms = report.duration.as_millis() as u64,
            failed_steps = report.failures(),
            "Collection cycle finished"
        );
        Ok(report)
    }

    async fn listing<T, F, Fut>(&self, label: &str, fetch: F) -> Result<Vec<T>, StepError>
    where
        F: FnMut(PageRequest) -> Fut,
        Fut: Future<Output = ProviderResult<Page<T>>>,
    {
        let result = paginate(label, self.settings.page_size, &self.shutdown, fetch).await?;
        if result.cancelled {
            return Err(StepError::Cancelled);
        }
        Ok(result.items)
    }

    async fn collect_commodities(&self) -> Result<(), StepError> {
        let packages = self
            .listing("resource_packages", |page| self.client.resource_packages(page))
            .await?;

        let commodities = sum_commodities(&packages);
        let traffic = commodities
            .get(&self.settings.prepaid_traffic_commodity)
            .copied()
            .unwrap_or_default();

        self.metrics
            .prepaid_commodities
            .replace(commodities.into_iter().map(|(code, bytes)| ([code], bytes)));
        self.metrics.prepaid_traffic.set(traffic);
        Ok(())
    }

    async fn collect_balance(&self) -> Result<(), StepError> {
        let raw = self.client.account_balance().await?;
        let balance = match parse_balance(&raw) {
            Some(balance) => balance,
            None => {
                warn!(raw = %raw, "Unparseable account balance, publishing 0");
                0.0
            }
        };
        debug!(balance = balance, "Account balance");
        self.metrics.available_amount.set(balance);
        Ok(())
    }

    async fn collect_compute(&self, report: &mut CycleReport) -> Result<(), StepError> {
        let regions = self.client.regions().await?;
        let mut instances: Vec<ComputeInstance> = Vec::new();

        for region in &regions {
            if self.settings.is_excluded(region) {
                debug!(region = %region, "Skipping excluded region");
                continue;
            }

            match self
                .listing("compute_instances", |page| {
                    self.client.compute_instances(region, page)
                })
                .await
            {
                Ok(found) => {
                    debug!(region = %region, count = found.len(), "Fetched compute instances");
                    instances.extend(found);
                }
                Err(StepError::Cancelled) => return Err(StepError::Cancelled),
                Err(StepError::Provider(e)) => {
                    warn!(region = %region, error = %e, "Compute instance listing failed");
                    report.failed_regions.push(region.clone());
                }
            }
        }

        let (cpu, ram) = compute_totals(&instances);
        self.metrics.ecs_cpu.set(cpu);
        self.metrics.ecs_ram.set(ram);
        self.metrics
            .ecs_instances
            .replace_counts(instances.iter().map(ComputeInstance::dimensions));

        report.compute_instances = instances.len();
        Ok(())
    }

    async fn collect_inventory(&self, report: &mut CycleReport) -> Result<(), StepError> {
        let instances = self
            .listing("available_instances", |page| {
                self.client.available_instances(page)
            })
            .await?;

        self.metrics
            .total_instances
            .replace_counts(instances.iter().map(|instance| instance.dimensions()));

        report.billing_instances = instances.len();
        Ok(())
    }

    /// Zero the series a failed step owns.
    fn publish_empty(&self, step: Step) {
        match step {
            Step::PrepaidCommodities => {
                self.metrics.prepaid_commodities.reset();
                self.metrics.prepaid_traffic.set(0.0);
            }
            Step::AccountBalance => self.metrics.available_amount.set(0.0),
            Step::ComputeInstances => {
                self.metrics.ecs_cpu.set(0.0);
                self.metrics.ecs_ram.set(0.0);
                self.metrics.ecs_instances.reset();
            }
            Step::AvailableInstances => self.metrics.total_instances.reset(),
        }
    }
}

/// Parse a comma-grouped decimal such as `"1,234,567.89"`.
pub fn parse_balance(raw: &str) -> Option<f64> {
    raw.trim().replace(',', "").parse().ok()
}

/// Byte-equivalent remaining amount per commodity code.
///
/// Only available packages with a commodity code count; unparseable amounts
/// are skipped.
pub fn sum_commodities(packages: &[ResourcePackage]) -> HashMap<String, f64> {
    let mut commodities: HashMap<String, f64> = HashMap::new();

    for package in packages {
        let code = package.commodity_code();
        if !package.is_available() || code.is_empty() {
            continue;
        }

        let raw = package.remaining_amount.as_deref().unwrap_or_default();
        let amount: f64 = match raw.trim().parse() {
            Ok(amount) => amount,
            Err(_) => {
                debug!(
                    instance_id = package.instance_id.as_deref().unwrap_or_default(),
                    amount = raw,
                    "Skipping package with unparseable amount"
                );
                continue;
            }
        };

        let unit = package.remaining_amount_unit.as_deref().unwrap_or_default();
        *commodities.entry(code.to_string()).or_insert(0.0) += to_bytes(amount, unit);
    }

    commodities
}

/// Total vCPUs and memory (MiB) across `instances`.
pub fn compute_totals(instances: &[ComputeInstance]) -> (f64, f64) {
    instances.iter().fold((0.0, 0.0), |(cpu, ram), instance| {
        (
            cpu + f64::from(instance.cpu.unwrap_or_default()),
            ram + instance.memory.unwrap_or_default() as f64,
        )
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
