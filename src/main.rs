//! connectivity-monitor
//!
//! Watches one backend and prints every committed connectivity transition.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌──────────────────────── watch loop ────────────────────────┐
//!   │  TCP connect to origin ──▶ set_connection_live             │
//!   │  GET health path       ──▶ report_success / report_failure │
//!   └──────────────────────────────┬─────────────────────────────┘
//!                                  ▼
//!                       ┌──────────────────────┐
//!                       │ ConnectivityMonitor  │──▶ recovery probe (Degraded)
//!                       └──────────┬───────────┘
//!                                  ▼
//!                       subscriber: stdout / JSON lines
//! ```

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serde::Serialize;
use tokio::net::TcpStream;
use tokio::time::{self, MissedTickBehavior};
use url::Url;

use connectivity_monitor::config::{load_config, validate_config, ConfigError, MonitorConfig};
use connectivity_monitor::lifecycle::signals::shutdown_signal;
use connectivity_monitor::observability::{logging, metrics};
use connectivity_monitor::probe::{HttpProbe, ReachabilityProbe};
use connectivity_monitor::{ConnectivityMonitor, ConnectivityState};

#[derive(Parser)]
#[command(name = "connectivity-monitor")]
#[command(about = "Monitor reachability of a backend and report debounced connectivity state", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend origin, overrides `backend.origin`.
    #[arg(short, long)]
    origin: Option<String>,

    /// Print transitions as JSON lines.
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct TransitionLine {
    state: ConnectivityState,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => MonitorConfig::default(),
    };
    if let Some(origin) = cli.origin {
        config.backend.origin = origin;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    logging::init_logging(&config.observability);
    tracing::info!(
        origin = %config.backend.origin,
        health_path = %config.backend.health_path,
        debounce_window_ms = config.connectivity.debounce_window_ms,
        failure_threshold = config.connectivity.failure_threshold,
        recovery_interval_secs = config.connectivity.recovery_interval_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let monitor = ConnectivityMonitor::from_config(&config)?;

    let json = cli.json;
    let subscription = monitor.subscribe(move |state| {
        if json {
            match serde_json::to_string(&TransitionLine { state }) {
                Ok(line) => println!("{}", line),
                Err(e) => eprintln!("failed to encode transition: {}", e),
            }
        } else {
            println!("connectivity: {}", state);
        }
    });

    // No host network notification is available to a CLI; assume up.
    monitor.set_network_available(true);

    tokio::select! {
        result = watch(&monitor, &config) => result?,
        _ = shutdown_signal() => {}
    }

    subscription.unsubscribe();
    monitor.shutdown();
    tracing::info!("Shutdown complete");
    Ok(())
}

/// Play the transport and HTTP client roles against the configured backend.
async fn watch(monitor: &ConnectivityMonitor, config: &MonitorConfig) -> Result<(), Box<dyn std::error::Error>> {
    let origin = Url::parse(&config.backend.origin)?;
    let host = origin.host_str().ok_or("backend origin has no host")?.to_string();
    let port = origin.port_or_known_default().ok_or("backend origin has no port")?;
    let traffic = HttpProbe::new(
        &origin,
        &config.backend.health_path,
        Duration::from_millis(config.backend.probe_timeout_ms),
    )?;
    let connect_timeout = Duration::from_millis(config.watch.connect_timeout_ms);

    let mut ticker = time::interval(Duration::from_secs(config.watch.poll_interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut live: Option<bool> = None;

    loop {
        ticker.tick().await;

        let connected = match time::timeout(connect_timeout, TcpStream::connect((host.as_str(), port))).await {
            Ok(Ok(_stream)) => true,
            Ok(Err(e)) => {
                tracing::debug!(host = %host, port, error = %e, "Connect failed");
                false
            }
            Err(_) => {
                tracing::debug!(host = %host, port, "Connect timed out");
                false
            }
        };

        // Report edges only.
        if live != Some(connected) {
            monitor.set_connection_live(connected);
            live = Some(connected);
        }

        if !connected {
            continue;
        }

        match traffic.probe().await {
            Ok(outcome) => {
                tracing::trace!(status = outcome.status, "Request completed");
                monitor.report_success();
            }
            Err(e) => {
                tracing::debug!(error = %e, "Request failed");
                monitor.report_failure();
            }
        }
    }
}
