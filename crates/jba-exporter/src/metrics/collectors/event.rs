use std::path::Path;

use jba_common::error::Result;

use crate::{
    metrics::{
        collector::MetricSource,
        types::{Payload, Specification},
    },
    source::EventReader,
};

pub const BACKUP_FAILED_TOTAL: &str = "juju_backup_all_backup_failed_total";
pub const BACKUP_PURGED_TOTAL: &str = "juju_backup_all_backup_purged_total";
pub const BACKUP_COMPLETED_TOTAL: &str = "juju_backup_all_backup_completed_total";

/// Counters fed by the one-shot event file. Each fetch yields only the
/// delta since the previous read; the collector carries the running total.
pub struct BackupEventSource {
    reader: EventReader,
}

impl BackupEventSource {
    pub fn new(backup_path: impl AsRef<Path>) -> Self {
        Self {
            reader: EventReader::new(backup_path),
        }
    }
}

impl MetricSource for BackupEventSource {
    fn specifications(&self) -> Vec<Specification> {
        vec![
            Specification::counter(BACKUP_FAILED_TOTAL, "The number of failed backups.", &[]),
            Specification::counter(BACKUP_PURGED_TOTAL, "The number of purged backups.", &[]),
            Specification::counter(
                BACKUP_COMPLETED_TOTAL,
                "The number of completed backups.",
                &[],
            ),
        ]
    }

    fn fetch(&self) -> Result<Vec<Payload>> {
        let event = self.reader.load()?;
        Ok(vec![
            Payload::new(BACKUP_FAILED_TOTAL, Vec::new(), event.failed),
            Payload::new(BACKUP_PURGED_TOTAL, Vec::new(), event.purged),
            Payload::new(BACKUP_COMPLETED_TOTAL, Vec::new(), event.completed),
        ])
    }
}
