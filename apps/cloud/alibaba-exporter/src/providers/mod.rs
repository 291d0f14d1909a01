//! Cloud API facade
//!
//! The collector talks to the provider only through [`CloudApi`]; the Alibaba
//! Cloud implementation lives in [`alibaba`].

pub mod alibaba;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{AvailableInstance, ComputeInstance, ResourcePackage};
use crate::pagination::{Page, PageRequest};

pub use alibaba::AlibabaClient;

/// Error type for cloud API operations
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {code}: {message}")]
    Api { code: String, message: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Billing and compute queries the collector depends on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CloudApi: Send + Sync {
    /// Raw available balance, e.g. `"1,234.56"`
    async fn account_balance(&self) -> ProviderResult<String>;

    /// One page of prepaid resource packages
    async fn resource_packages(&self, page: PageRequest) -> ProviderResult<Page<ResourcePackage>>;

    /// One page of the billing instance inventory
    async fn available_instances(
        &self,
        page: PageRequest,
    ) -> ProviderResult<Page<AvailableInstance>>;

    /// Ids of every region visible to the account
    async fn regions(&self) -> ProviderResult<Vec<String>>;

    /// One page of compute instances in `region`
    async fn compute_instances(
        &self,
        region: &str,
        page: PageRequest,
    ) -> ProviderResult<Page<ComputeInstance>>;
}
