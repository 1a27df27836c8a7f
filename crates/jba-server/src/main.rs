use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use jba_common::config::{Config, LogLevel, default_config_path};
use jba_exporter::{ExporterState, exporter_router};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "prometheus-juju-backup-all-exporter",
    about = "Collects juju-backup-all results and exports them as Prometheus metrics"
)]
struct Cli {
    /// Configuration file; defaults to $SNAP_DATA/config.yaml.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn init_logging(level: LogLevel) {
    // RUST_LOG wins over the configured level when set.
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_filter_directive()));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = Config::load(&config_path)?;
    init_logging(config.level);
    info!(
        path = %config_path.display(),
        level = %config.level,
        backup_path = %config.backup_path.display(),
        "loaded exporter configuration"
    );

    let state = Arc::new(ExporterState::new(&config)?);
    let app = exporter_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("started prometheus juju-backup-all exporter at {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
