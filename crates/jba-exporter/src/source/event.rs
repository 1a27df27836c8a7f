use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use jba_common::error::Result;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use super::read_artifact;

pub const EVENT_FILE_NAME: &str = "backup_state.json";

/// Outcome counts written by one backup run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct BackupEvent {
    pub failed: f64,
    pub purged: f64,
    pub completed: f64,
}

/// Destructive reader for `backup_state.json`.
///
/// Every read of an existing file removes it afterwards, whether or not it
/// parsed, so the same backup run is never counted twice. Assumes a single
/// writer (the backup job) and a single reader (this process).
#[derive(Debug, Clone)]
pub struct EventReader {
    path: PathBuf,
}

impl EventReader {
    pub fn new(backup_path: impl AsRef<Path>) -> Self {
        Self {
            path: backup_path.as_ref().join(EVENT_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<BackupEvent> {
        if !self.path.try_exists()? {
            warn!(
                path = %self.path.display(),
                "backup event file does not exist, using default values"
            );
            return Ok(BackupEvent::default());
        }

        // A partially valid file counts as nothing at all.
        let event = match read_artifact::<BackupEvent>(&self.path) {
            Ok(event) => {
                debug!(path = %self.path.display(), ?event, "loaded backup event");
                event
            }
            Err(err) => {
                error!(
                    path = %self.path.display(),
                    error = %err,
                    "invalid backup event file, using default values"
                );
                BackupEvent::default()
            }
        };

        self.remove();
        Ok(event)
    }

    fn remove(&self) {
        info!(path = %self.path.display(), "removing backup event file");
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "backup event file already removed");
            }
            Err(err) => {
                error!(
                    path = %self.path.display(),
                    error = %err,
                    "failed to remove backup event file"
                );
            }
        }
    }
}
