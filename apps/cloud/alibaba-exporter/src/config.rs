//! Configuration for the Alibaba Cloud exporter
//!
//! Layers, lowest precedence first: built-in defaults, the YAML file, then
//! environment variables.

use core_config::server::ServerConfig;
use core_config::{ApplyEnv, ConfigError, Environment, env_list, override_from_env};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    #[serde(skip)]
    pub environment: Environment,
    pub log_level: String,
    /// Seconds between collection cycles
    pub interval: u64,
    pub alibaba: AlibabaConfig,
    pub collector: CollectorConfig,
    pub http: ServerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            log_level: "info".to_string(),
            interval: 600,
            alibaba: AlibabaConfig::default(),
            collector: CollectorConfig::default(),
            http: ServerConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AlibabaConfig {
    /// Region used for region discovery
    pub region_id: String,
    pub access_key_id: String,
    pub access_key_secret: Secret,
    /// Billing (BSS OpenAPI) base URL
    pub bss_endpoint: String,
    /// ECS base URL override; when unset each region uses `https://ecs.{region}.aliyuncs.com`
    pub ecs_endpoint: Option<String>,
    pub request_timeout_secs: u64,
}

impl Default for AlibabaConfig {
    fn default() -> Self {
        Self {
            region_id: "ap-southeast-1".to_string(),
            access_key_id: String::new(),
            access_key_secret: Secret::default(),
            bss_endpoint: "https://business.ap-southeast-1.aliyuncs.com".to_string(),
            ecs_endpoint: None,
            request_timeout_secs: 30,
        }
    }
}

impl AlibabaConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// ECS base URL for `region`.
    pub fn ecs_endpoint_for(&self, region: &str) -> String {
        match &self.ecs_endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://ecs.{region}.aliyuncs.com"),
        }
    }
}

impl ApplyEnv for AlibabaConfig {
    fn apply_env(&mut self) -> Result<(), ConfigError> {
        override_from_env("REGION_ID", &mut self.region_id)?;
        override_from_env("ACCESS_KEY_ID", &mut self.access_key_id)?;
        if let Ok(secret) = std::env::var("ACCESS_KEY_SECRET") {
            self.access_key_secret = Secret::new(secret);
        }
        override_from_env("BSS_ENDPOINT", &mut self.bss_endpoint)?;
        if let Ok(endpoint) = std::env::var("ECS_ENDPOINT") {
            self.ecs_endpoint = Some(endpoint);
        }
        override_from_env("REQUEST_TIMEOUT", &mut self.request_timeout_secs)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CollectorConfig {
    /// Regions whose id starts with one of these are skipped for ECS aggregation
    pub excluded_region_prefixes: Vec<String>,
    /// Commodity code reported as `prepaid_traffic`
    pub prepaid_traffic_commodity: String,
    pub page_size: u32,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            excluded_region_prefixes: vec!["cn".to_string()],
            prepaid_traffic_commodity: "flowbag_intl".to_string(),
            page_size: 100,
        }
    }
}

impl ApplyEnv for CollectorConfig {
    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(prefixes) = env_list("EXCLUDED_REGION_PREFIXES") {
            self.excluded_region_prefixes = prefixes;
        }
        override_from_env("PREPAID_TRAFFIC_COMMODITY", &mut self.prepaid_traffic_commodity)?;
        override_from_env("PAGE_SIZE", &mut self.page_size)?;
        Ok(())
    }
}

impl Config {
    /// Load defaults, overlay `path` if it exists, then the environment.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config: Config = core_config::file::load_yaml(path)?;
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.interval == 0 {
            return Err(ConfigError::Invalid {
                key: "interval".to_string(),
                details: "must be greater than zero".to_string(),
            });
        }
        if self.collector.page_size == 0 {
            return Err(ConfigError::Invalid {
                key: "collector.pageSize".to_string(),
                details: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// JSON rendering with the access secret masked, for startup logging.
    pub fn masked_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!("<unserializable config: {e}>"))
    }
}

impl ApplyEnv for Config {
    fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.environment = Environment::from_env();
        override_from_env("LOG_LEVEL", &mut self.log_level)?;
        override_from_env("INTERVAL", &mut self.interval)?;
        self.alibaba.apply_env()?;
        self.collector.apply_env()?;
        self.http.apply_env()?;
        Ok(())
    }
}

/// A credential that never prints.
///
/// Serializes as `"XXX"` (or `""` when empty) and debug-formats the same way.
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn masked(&self) -> &'static str {
        if self.0.is_empty() { "" } else { "XXX" }
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.masked())
    }
}

impl Serialize for Secret {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.masked())
    }
}
