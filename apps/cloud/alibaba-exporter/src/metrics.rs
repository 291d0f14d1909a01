//! Series published by the exporter.

use observability::{Gauge, GaugeRegistry, GaugeVec};

/// Handles to every series, registered once at startup.
#[derive(Clone)]
pub struct ExporterMetrics {
    pub available_amount: Gauge,
    pub prepaid_traffic: Gauge,
    pub prepaid_commodities: GaugeVec<1>,
    pub total_instances: GaugeVec<6>,
    pub ecs_cpu: Gauge,
    pub ecs_ram: Gauge,
    pub ecs_instances: GaugeVec<4>,
    pub cycle_duration: Gauge,
    pub cycle_failed_steps: Gauge,
    pub last_cycle_timestamp: Gauge,
}

impl ExporterMetrics {
    pub fn register(registry: &GaugeRegistry) -> Self {
        Self {
            available_amount: registry.gauge(
                "available_amount_balance",
                "QueryAccountBalance availableAmount",
            ),
            prepaid_traffic: registry.gauge(
                "prepaid_traffic",
                "Total prepaid traffic available, in bytes.",
            ),
            prepaid_commodities: registry.gauge_vec(
                "prepaid_commodities",
                "Remaining amount of available prepaid resource packages, byte-equivalent.",
                ["CommodityCode"],
            ),
            total_instances: registry.gauge_vec(
                "total_instances",
                "Total instances by payment method.",
                [
                    "ProductCode",
                    "SubscriptionType",
                    "Region",
                    "RenewStatus",
                    "Status",
                    "SubStatus",
                ],
            ),
            ecs_cpu: registry.gauge("ecs_cpu_total", "Total vCPUs across ECS instances."),
            ecs_ram: registry.gauge(
                "ecs_ram_total",
                "Total memory across ECS instances, in MiB.",
            ),
            ecs_instances: registry.gauge_vec(
                "ecs_instances",
                "ECS instances by region, charge type, instance type and workload.",
                ["RegionId", "InstanceChargeType", "InstanceType", "Workload"],
            ),
            cycle_duration: registry.gauge(
                "exporter_cycle_duration_seconds",
                "Duration of the last collection cycle.",
            ),
            cycle_failed_steps: registry.gauge(
                "exporter_cycle_failed_steps",
                "Fetch steps that failed in the last collection cycle.",
            ),
            last_cycle_timestamp: registry.gauge(
                "exporter_last_cycle_timestamp_seconds",
                "Unix time of the last completed collection cycle.",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_scalar_series_exposed_at_startup() {
        let registry = GaugeRegistry::new();
        let _metrics = ExporterMetrics::register(&registry);

        let text = registry.render();
        for name in [
            "available_amount_balance",
            "prepaid_traffic",
            "ecs_cpu_total",
            "ecs_ram_total",
            "exporter_cycle_duration_seconds",
            "exporter_cycle_failed_steps",
            "exporter_last_cycle_timestamp_seconds",
        ] {
            assert!(text.contains(&format!("{name} 0")), "missing {name}");
        }
    }

    #[test]
    fn test_vector_label_schemas() {
        let registry = GaugeRegistry::new();
        let metrics = ExporterMetrics::register(&registry);

        assert_eq!(metrics.prepaid_commodities.label_names(), &["CommodityCode"]);
        assert_eq!(metrics.total_instances.label_names()[5], "SubStatus");
        assert_eq!(metrics.ecs_instances.label_names()[3], "Workload");

        metrics
            .ecs_instances
            .replace_counts([["ap-southeast-1", "PrePaid", "ecs.g6.large", "web"].map(String::from)]);
        let text = registry.render();
        let line = text
            .lines()
            .find(|line| line.starts_with("ecs_instances{"))
            .expect("series line");
        assert!(line.contains(r#"InstanceChargeType="PrePaid""#));
        assert!(line.contains(r#"InstanceType="ecs.g6.large""#));
        assert!(line.ends_with(" 1"));
    }
}
