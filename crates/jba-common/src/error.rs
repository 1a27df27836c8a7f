use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("metric already registered: {0}")]
    DuplicateMetric(String),
    #[error("internal error: {0}")]
    InternalError(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, ExporterError>;
