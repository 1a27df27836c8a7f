use std::path::Path;

use jba_common::error::Result;

use crate::{
    metrics::{
        collector::MetricSource,
        types::{Payload, Specification},
    },
    source::{ResultCode, StatsReader},
};

pub const COMMAND_DURATION_SECONDS: &str = "juju_backup_all_command_duration_seconds";
pub const COMMAND_OK_INFO: &str = "juju_backup_all_command_ok_info";

/// Gauges describing the most recent backup command.
pub struct BackupStatsSource {
    reader: StatsReader,
}

impl BackupStatsSource {
    pub fn new(backup_path: impl AsRef<Path>) -> Self {
        Self {
            reader: StatsReader::new(backup_path),
        }
    }
}

impl MetricSource for BackupStatsSource {
    fn specifications(&self) -> Vec<Specification> {
        vec![
            Specification::gauge(
                COMMAND_DURATION_SECONDS,
                "Length of time the charm-juju-backup-all backup command took.",
                &["status_ok", "result_code"],
            ),
            Specification::gauge(
                COMMAND_OK_INFO,
                "Indicates whether or not the charm-juju-backup-all backup command was a success.",
                &["result_code"],
            ),
        ]
    }

    fn fetch(&self) -> Result<Vec<Payload>> {
        let stats = self.reader.load()?;
        let result_code = ResultCode::label_for(stats.result_code).to_string();
        let status_ok = (stats.status_ok as i64).to_string();

        Ok(vec![
            Payload::new(
                COMMAND_DURATION_SECONDS,
                vec![status_ok, result_code.clone()],
                stats.duration,
            ),
            Payload::new(COMMAND_OK_INFO, vec![result_code], stats.status_ok),
        ])
    }
}
