mod config;
mod gateway;
mod trigger;

use anyhow::{Context, Result};
use clap::Parser;
use planpin_core::storage::OfflineQueue;
use planpin_core::sync::SyncEngine;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::load_syncd_config;
use crate::gateway::{HttpGateway, HttpProbe};
use crate::trigger::{ConnectivityTrigger, TriggerEvent};

#[derive(Parser)]
#[command(name = "planpin-syncd", about = "Background sync daemon for planpin")]
struct Args {
    /// Path to sync daemon configuration file
    #[arg(long, default_value = "~/.config/planpin/config.toml")]
    config: String,

    /// Run in foreground mode (don't daemonize)
    #[arg(long)]
    foreground: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .init();

    // Expand config path
    let config_path = if let Some(rest) = args.config.strip_prefix("~/") {
        dirs::home_dir()
            .context("Could not determine home directory")?
            .join(rest)
    } else {
        PathBuf::from(&args.config)
    };

    let config = load_syncd_config(&config_path)?;

    let base_url = config
        .backend
        .base_url
        .clone()
        .context("backend.base_url must be configured for sync")?;
    let probe_url = config
        .backend
        .probe_url()
        .context("backend.health_url or base_url must be configured")?;

    let gateway = HttpGateway::new(&base_url, config.backend.api_key.clone());
    let probe = HttpProbe::new(probe_url);

    let queue_path = config.storage.queue_db_path()?;
    let mut queue = OfflineQueue::open(&queue_path)
        .with_context(|| format!("Failed to open offline queue: {}", queue_path.display()))?;

    let engine = SyncEngine::new(gateway, probe.clone());
    let mut trigger = ConnectivityTrigger::spawn(
        probe,
        Duration::from_secs(config.sync.probe_interval_seconds),
    );

    if !args.foreground {
        info!("planpin-syncd daemon started");
        // TODO: Daemonize process (platform-specific)
    }

    // Drain anything left behind by previous runs before settling into the loop.
    match engine.sync_all(&mut queue).await {
        Ok(report) => info!(
            attempted = report.attempted,
            succeeded = report.succeeded,
            retained = report.retained,
            "startup sync complete"
        ),
        Err(err) => warn!(%err, "startup sync failed"),
    }

    // Main event loop
    loop {
        tokio::select! {
            // Connectivity came back: drain immediately
            event = trigger.recv() => {
                if let Some(TriggerEvent::ConnectivityRegained) = event {
                    info!("connectivity regained, syncing");
                    if let Err(err) = engine.sync_all(&mut queue).await {
                        warn!(%err, "sync failed");
                    }
                }
            }

            // Periodic sync check
            _ = tokio::time::sleep(Duration::from_secs(config.sync.interval_seconds)) => {
                debug!("performing periodic sync check");
                if let Err(err) = engine.sync_all(&mut queue).await {
                    warn!(%err, "periodic sync failed");
                }
            }

            // Handle shutdown signals
            _ = tokio::signal::ctrl_c() => {
                info!("received shutdown signal, stopping planpin-syncd");
                break;
            }
        }
    }

    Ok(())
}
