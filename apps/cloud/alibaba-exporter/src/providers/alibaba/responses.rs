//! Response envelopes of the BSS and ECS RPC APIs.

use serde::Deserialize;

use crate::models::{AvailableInstance, ComputeInstance, ResourcePackage};

/// Error body returned alongside non-2xx statuses, and by BSS on `Success=false`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ErrorBody {
    pub code: Option<String>,
    pub message: Option<String>,
    pub request_id: Option<String>,
}

/// Fields shared by every BSS response.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct BssStatus {
    pub success: Option<bool>,
    pub code: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct QueryAccountBalanceResponse {
    #[serde(flatten)]
    pub status: BssStatus,
    pub data: Option<AccountBalanceData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AccountBalanceData {
    pub available_amount: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct QueryResourcePackageInstancesResponse {
    #[serde(flatten)]
    pub status: BssStatus,
    pub data: Option<ResourcePackageData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ResourcePackageData {
    pub total_count: Option<u64>,
    pub instances: Option<ResourcePackageList>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ResourcePackageList {
    pub instance: Vec<ResourcePackage>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct QueryAvailableInstancesResponse {
    #[serde(flatten)]
    pub status: BssStatus,
    pub data: Option<AvailableInstanceData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AvailableInstanceData {
    pub total_count: Option<u64>,
    pub instance_list: Vec<AvailableInstance>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DescribeRegionsResponse {
    pub regions: Option<RegionList>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RegionList {
    pub region: Vec<Region>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Region {
    pub region_id: Option<String>,
    pub local_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DescribeInstancesResponse {
    pub total_count: Option<u64>,
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
    pub instances: Option<ComputeInstanceList>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ComputeInstanceList {
    pub instance: Vec<ComputeInstance>,
}
