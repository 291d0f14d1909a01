//! Alibaba Cloud Exporter
//!
//! Collects billing and compute metrics from Alibaba Cloud and serves them
//! for Prometheus to scrape.

use alibaba_exporter::{AlibabaClient, Config, app};
use axum_helpers::ShutdownCoordinator;
use clap::Parser;
use core_config::tracing::{init_tracing, install_color_eyre};
use eyre::{Result, WrapErr};
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "alibaba-exporter")]
#[command(about = "Export Alibaba Cloud billing and compute metrics to Prometheus")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, env = "CONFIG_PATH", default_value = "config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();
    let cli = Cli::parse();

    let config = Config::load(&cli.config)
        .wrap_err_with(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    init_tracing(&config.environment, &config.log_level);
    debug!(config = %config.masked_json(), "Effective configuration");

    let client = AlibabaClient::new(&config.alibaba)
        .wrap_err("Failed to create Alibaba Cloud client")?;

    app::run(&config, client, ShutdownCoordinator::new()).await
}
