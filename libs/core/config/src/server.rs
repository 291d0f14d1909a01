use crate::{ApplyEnv, ConfigError, override_from_env};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// HTTP server configuration for the metrics endpoint
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Prefix prepended to every route, e.g. `/exporter`
    pub route_prefix: String,
}

impl ServerConfig {
    pub fn new(host: String, port: u16) -> Self {
        Self {
            host,
            port,
            route_prefix: String::new(),
        }
    }

    /// Get the server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Route prefix with a single leading slash and no trailing slash.
    ///
    /// An empty or `/` prefix normalises to the empty string.
    pub fn normalized_prefix(&self) -> String {
        let trimmed = self.route_prefix.trim().trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{}", trimmed)
        }
    }
}

impl ApplyEnv for ServerConfig {
    /// Reads from environment variables when set:
    /// - HTTP_HOST
    /// - HTTP_PORT
    /// - HTTP_ROUTE_PREFIX
    fn apply_env(&mut self) -> Result<(), ConfigError> {
        override_from_env("HTTP_HOST", &mut self.host)?;
        override_from_env("HTTP_PORT", &mut self.port)?;
        if let Ok(prefix) = std::env::var("HTTP_ROUTE_PREFIX") {
            self.route_prefix = prefix;
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::UNSPECIFIED.to_string(),
            port: 8080,
            route_prefix: String::new(),
        }
    }
}
