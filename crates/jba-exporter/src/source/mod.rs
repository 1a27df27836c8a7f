//! Readers for the artifacts the juju-backup-all job leaves in `backup_path`.
//!
//! Missing or malformed artifacts never fail a read; the reader logs and
//! falls back to defaults. Only a failure to even check whether the artifact
//! exists is surfaced to the caller.

pub mod event;
pub mod stats;

use std::path::Path;

use serde::de::DeserializeOwned;
use thiserror::Error;

pub use event::{BackupEvent, EVENT_FILE_NAME, EventReader};
pub use stats::{BackupStats, ResultCode, STATS_FILE_NAME, StatsReader};

#[derive(Debug, Error)]
enum ArtifactError {
    #[error("failed to read artifact: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse artifact: {0}")]
    Parse(#[from] serde_json::Error),
}

fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let content = std::fs::read(path)?;
    Ok(serde_json::from_slice(&content)?)
}
