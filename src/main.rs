//! Probe service entry point.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::error;

use probe_service::api::create_router;
use probe_service::clock::SystemClock;
use probe_service::config::Config;
use probe_service::logging::{self, JsonLogFormat};
use probe_service::metrics::MetricsRegistry;
use probe_service::state::{resolve_hostname, AppState};
use probe_service::utils::shutdown_signal;
use probe_service::{server, ServiceError};

const METRICS_UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

/// HTTP microservice with health, readiness and metrics endpoints.
#[derive(Parser, Debug)]
#[command(name = "probe-service")]
#[command(about = "HTTP microservice with health, readiness and Prometheus metrics")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP listen port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve HTTP traffic (default).
    Serve {
        /// HTTP listen port (overrides PORT).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print the resolved configuration and exit.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    let mut config = Config::load().map_err(ServiceError::from)?;
    config.validate().map_err(ServiceError::InvalidConfig)?;

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(&config),
        Some(Command::Serve { port }) => {
            if let Some(port) = port.or(args.port) {
                config.port = port;
            }
            cmd_serve(config, args.verbose).await
        }
        None => {
            if let Some(port) = args.port {
                config.port = port;
            }
            cmd_serve(config, args.verbose).await
        }
    }
}

/// Print the resolved configuration.
fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

/// Run the HTTP service until a shutdown signal arrives.
async fn cmd_serve(config: Config, verbose: bool) -> anyhow::Result<()> {
    let hostname = resolve_hostname();
    let clock = Arc::new(SystemClock);

    // Initialize logging
    logging::init(
        JsonLogFormat::new(config.app_name.clone(), hostname.clone(), clock.clone()),
        logging::env_filter(&config.rust_log, verbose),
    );

    // Initialize metrics
    let metrics = MetricsRegistry::new().map_err(|e| {
        error!(error = %e, "Failed to build metrics registry");
        ServiceError::from(e)
    })?;

    let upkeep = metrics.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(METRICS_UPKEEP_INTERVAL);
        loop {
            interval.tick().await;
            upkeep.run_upkeep();
        }
    });

    let grace = config.shutdown_grace();
    let state = AppState::with_parts(config, metrics, clock, hostname);

    // Start HTTP server
    let listener = server::bind(&state.config).await.map_err(|e| {
        error!(error = %e, port = state.config.port, "Failed to bind listener");
        e
    })?;
    let router = create_router(state);

    server::serve(listener, router, grace, shutdown_signal()).await?;
    Ok(())
}
