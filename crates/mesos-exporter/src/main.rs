//! mesos-exporter — Prometheus exporter for a Mesos master.
//!
//! Every `GET /metrics` polls the master's `/state`, `/metrics/snapshot`
//! and `/version` endpoints and renders the result.
//!
//! # Usage
//!
//! ```text
//! mesos-exporter --config /etc/mesos-exporter.toml
//! mesos-exporter --master-url http://leader.mesos:5050 --slave-attributes rack,zone
//! ```

mod config;
mod server;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use tokio::sync::Mutex;
use tracing::info;

use mesos_client::HttpClient;
use mesos_collectors::master_registry;
use mesos_metrics::ErrorCounter;

use crate::config::ExporterConfig;

#[derive(Parser)]
#[command(name = "mesos-exporter", about = "Prometheus exporter for Mesos masters")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to serve /metrics on.
    #[arg(long)]
    listen: Option<SocketAddr>,

    /// Master base URL; overrides the config file.
    #[arg(long)]
    master_url: Option<String>,

    /// Comma-separated agent attributes exported as labels.
    #[arg(long, value_delimiter = ',')]
    slave_attributes: Option<Vec<String>>,

    /// DC/OS service account secret (JSON); enables strict mode.
    #[arg(long)]
    service_account_secret: Option<PathBuf>,

    /// Accept invalid TLS certificates from the master.
    #[arg(long)]
    skip_ssl_verify: bool,

    /// Emit logs as JSON.
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<ExporterConfig> {
        let mut config = match (&self.config, &self.master_url) {
            (Some(path), _) => ExporterConfig::from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            (None, Some(url)) => ExporterConfig::for_master(url),
            (None, None) => bail!("either --config or --master-url is required"),
        };

        if let Some(url) = self.master_url {
            config.master.url = url;
        }
        if let Some(listen) = self.listen {
            config.listen = listen;
        }
        if let Some(labels) = self.slave_attributes {
            config.slave_attribute_labels = labels;
        }
        if self.service_account_secret.is_some() {
            config.service_account_secret = self.service_account_secret;
        }
        config.master.skip_ssl_verify |= self.skip_ssl_verify;
        config.log.json |= self.log_json;

        config.resolve_secret().context("loading service account secret")?;
        Ok(config)
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,mesos_exporter=debug"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Cli::parse().into_config()?;
    init_tracing(config.log.json);

    info!(
        master = %config.master.url,
        strict = config.master.strict.is_some(),
        attributes = ?config.slave_attribute_labels,
        "mesos exporter starting"
    );

    // ── Client and collectors ──────────────────────────────────

    let errors = ErrorCounter::new();
    let client = HttpClient::new(&config.master, errors).context("building HTTP client")?;
    let registry = master_registry(client, config.slave_attribute_labels.as_slice())?;
    info!(metrics = registry.describe().len(), "registry initialized");

    // ── Serve ──────────────────────────────────────────────────

    let router = server::build_router(Arc::new(Mutex::new(registry)));
    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    info!(addr = %config.listen, "serving /metrics");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to install CTRL+C handler");
                std::future::pending::<()>().await;
            }
            info!("shutdown signal received");
        })
        .await?;

    info!("mesos exporter stopped");
    Ok(())
}
