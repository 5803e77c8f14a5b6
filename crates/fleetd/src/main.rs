//! fleetd — the fleetscale daemon.
//!
//! Assembles the autoscaling control plane from its collaborators:
//! - File-backed service discovery ([`source::FileServiceSource`])
//! - The backlog workload analyser ([`analyser::FileMetricAnalyserFactory`])
//! - A dry-run scaling backend ([`scaler::DryRunScaler`])
//! - The null election backend (single-instance leadership)
//! - A `/healthz` endpoint polling every collaborator
//!
//! # Usage
//!
//! ```text
//! fleetd run --config /etc/fleetscale/fleetd.toml
//! fleetd check --config /etc/fleetscale/fleetd.toml
//! ```

mod analyser;
mod api;
mod config;
mod scaler;
mod source;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use fleetscale_core::{CoreResult, ServiceScaler, ServiceSource};
use fleetscale_engine::{AnalyserRegistry, ControlPlane, NullElection, ServiceValidator};

use crate::analyser::FileMetricAnalyserFactory;
use crate::config::FleetConfig;
use crate::scaler::DryRunScaler;
use crate::source::FileServiceSource;

#[derive(Parser)]
#[command(name = "fleetd", about = "fleetscale autoscaling control plane")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the control plane.
    Run {
        /// Path to the fleetd config file.
        #[arg(long, default_value = "/etc/fleetscale/fleetd.toml")]
        config: PathBuf,

        /// Override the health endpoint port from the config file.
        #[arg(long)]
        health_port: Option<u16>,
    },
    /// Validate the config file and service manifest, then exit.
    Check {
        /// Path to the fleetd config file.
        #[arg(long, default_value = "/etc/fleetscale/fleetd.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,fleetd=debug,fleetscale=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            config,
            health_port,
        } => run(config, health_port).await,
        Command::Check { config } => check(config).await,
    }
}

fn build_registry() -> CoreResult<AnalyserRegistry> {
    AnalyserRegistry::new(vec![Arc::new(FileMetricAnalyserFactory)])
}

async fn run(config_path: PathBuf, health_port: Option<u16>) -> anyhow::Result<()> {
    let config = FleetConfig::load(&config_path)?;
    info!(config = ?config_path, group = %config.group, "fleetd starting");

    let registry = build_registry()?;
    let source = Arc::new(FileServiceSource::new(
        config.services_file.clone(),
        config.group.clone(),
    ));
    let scaler = Arc::new(DryRunScaler::new());
    let election = Arc::new(NullElection::new());

    let plane = Arc::new(ControlPlane::new(
        source,
        Arc::clone(&scaler) as Arc<dyn ServiceScaler>,
        election,
        registry,
    ));
    plane
        .start(Duration::from_secs(config.refresh_interval_secs))
        .await?;

    let port = health_port.unwrap_or(config.health_port);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "health endpoint starting");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    let router = api::build_router(Arc::clone(&plane));
    let server = axum::serve(listener, router).with_graceful_shutdown(async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
        info!("shutdown signal received");
    });
    server.await?;

    plane.shutdown().await;
    info!(
        scale_commands = scaler.commands_issued(),
        "fleetd stopped"
    );
    Ok(())
}

/// Load the config, read the manifest once, and validate every record the
/// way the engine would on a refresh.
async fn check(config_path: PathBuf) -> anyhow::Result<()> {
    let config = FleetConfig::load(&config_path)?;
    let registry = build_registry()?;
    let source = FileServiceSource::new(config.services_file.clone(), config.group.clone());

    let services = source.get_services().await?;
    let validator = ServiceValidator::new(registry.names().map(str::to_string));

    let mut invalid = 0usize;
    for (id, record) in &services {
        match validator.validate(record) {
            Ok(()) => info!(service_id = %id, analyser = %record.analyser, "valid"),
            Err(e) => {
                invalid += 1;
                warn!(service_id = %id, error = %e, "invalid");
            }
        }
    }

    if invalid > 0 {
        anyhow::bail!("{invalid} of {} service(s) failed validation", services.len());
    }
    info!(count = services.len(), "configuration ok");
    Ok(())
}
