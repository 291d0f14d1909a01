//! Records returned by the billing and compute APIs.
//!
//! Field names follow the provider's PascalCase JSON. Every field is optional
//! on the wire; accessors fall back to empty strings or zero.

use serde::{Deserialize, Serialize};

/// Status value of a resource package that still has usable balance.
pub const AVAILABLE_STATUS: &str = "Available";

/// Tag key carrying the workload name of a compute instance.
pub const WORKLOAD_TAG: &str = "workload";

/// Workload label used when an instance has no workload tag.
pub const UNKNOWN_WORKLOAD: &str = "unknown";

/// A prepaid resource package (commodity) instance.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ResourcePackage {
    pub instance_id: Option<String>,
    pub status: Option<String>,
    pub remaining_amount: Option<String>,
    pub remaining_amount_unit: Option<String>,
    pub commodity_code: Option<String>,
}

impl ResourcePackage {
    pub fn is_available(&self) -> bool {
        self.status.as_deref() == Some(AVAILABLE_STATUS)
    }

    pub fn commodity_code(&self) -> &str {
        self.commodity_code.as_deref().unwrap_or_default()
    }
}

/// A subscription known to the billing inventory.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AvailableInstance {
    pub product_code: Option<String>,
    pub subscription_type: Option<String>,
    pub region: Option<String>,
    pub renew_status: Option<String>,
    pub status: Option<String>,
    pub sub_status: Option<String>,
}

impl AvailableInstance {
    /// Label values in `total_instances` order.
    pub fn dimensions(&self) -> [String; 6] {
        [
            &self.product_code,
            &self.subscription_type,
            &self.region,
            &self.renew_status,
            &self.status,
            &self.sub_status,
        ]
        .map(|value| value.clone().unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Tag {
    pub tag_key: Option<String>,
    pub tag_value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Tags {
    pub tag: Vec<Tag>,
}

/// An ECS compute instance.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ComputeInstance {
    pub instance_id: Option<String>,
    pub region_id: Option<String>,
    pub instance_charge_type: Option<String>,
    pub instance_type: Option<String>,
    pub cpu: Option<u32>,
    /// Memory in MiB
    pub memory: Option<u64>,
    pub tags: Option<Tags>,
}

impl ComputeInstance {
    /// Value of the `workload` tag, or `unknown`.
    ///
    /// When the tag appears more than once the last occurrence wins.
    pub fn workload(&self) -> &str {
        self.tags
            .iter()
            .flat_map(|tags| tags.tag.iter())
            .filter(|tag| tag.tag_key.as_deref() == Some(WORKLOAD_TAG))
            .filter_map(|tag| tag.tag_value.as_deref())
            .last()
            .unwrap_or(UNKNOWN_WORKLOAD)
    }

    /// Label values in `ecs_instances` order.
    pub fn dimensions(&self) -> [String; 4] {
        [
            self.region_id.clone().unwrap_or_default(),
            self.instance_charge_type.clone().unwrap_or_default(),
            self.instance_type.clone().unwrap_or_default(),
            self.workload().to_string(),
        ]
    }
}
