use std::sync::Arc;

use axum::{Router, routing::get};
use jba_common::{config::Config, error::Result};

use crate::{
    handlers,
    metrics::{BackupEventSource, BackupStatsSource, Collector, MetricsRegistry},
};

pub struct ExporterState {
    pub registry: Arc<MetricsRegistry>,
}

impl ExporterState {
    /// Registers the backup stats and backup event collectors for `config.backup_path`.
    pub fn new(config: &Config) -> Result<Self> {
        let registry = Arc::new(MetricsRegistry::new());
        registry.register(Collector::new(BackupStatsSource::new(&config.backup_path))?)?;
        registry.register(Collector::new(BackupEventSource::new(&config.backup_path))?)?;

        Ok(Self { registry })
    }

    pub fn with_registry(registry: Arc<MetricsRegistry>) -> Self {
        Self { registry }
    }
}

pub fn exporter_router(state: Arc<ExporterState>) -> Router {
    Router::new()
        .route("/", get(handlers::metrics::prometheus_metrics))
        .route("/metrics", get(handlers::metrics::prometheus_metrics))
        .with_state(state)
}
