use std::path::{Path, PathBuf};

use jba_common::error::Result;
use serde::Deserialize;
use tracing::{debug, error, warn};

use super::read_artifact;

pub const STATS_FILE_NAME: &str = "backup_stats.json";

/// Nagios-style status of the last backup command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCode {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl ResultCode {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Ok),
            1 => Some(Self::Warning),
            2 => Some(Self::Critical),
            3 => Some(Self::Unknown),
            _ => None,
        }
    }

    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Ok => "StatusOK",
            Self::Warning => "StatusWarning",
            Self::Critical => "StatusCritical",
            Self::Unknown => "StatusUnknown",
        }
    }

    /// Label for a raw code, including codes outside the known range.
    /// Fractional codes are truncated toward zero.
    pub fn label_for(code: f64) -> &'static str {
        Self::from_code(code as i64)
            .map(|result_code| result_code.as_label())
            .unwrap_or("InvalidResultCode")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BackupStats {
    pub duration: f64,
    pub status_ok: f64,
    pub result_code: f64,
}

impl Default for BackupStats {
    fn default() -> Self {
        Self {
            duration: 0.0,
            status_ok: 0.0,
            result_code: 3.0,
        }
    }
}

/// Non-destructive reader for `backup_stats.json`.
#[derive(Debug, Clone)]
pub struct StatsReader {
    path: PathBuf,
}

impl StatsReader {
    pub fn new(backup_path: impl AsRef<Path>) -> Self {
        Self {
            path: backup_path.as_ref().join(STATS_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<BackupStats> {
        if !self.path.try_exists()? {
            warn!(
                path = %self.path.display(),
                "backup stats file does not exist, using default values"
            );
            return Ok(BackupStats::default());
        }

        match read_artifact::<BackupStats>(&self.path) {
            Ok(stats) => {
                debug!(path = %self.path.display(), ?stats, "loaded backup stats");
                Ok(stats)
            }
            Err(err) => {
                error!(
                    path = %self.path.display(),
                    error = %err,
                    "invalid backup stats file, using default values"
                );
                Ok(BackupStats::default())
            }
        }
    }
}
