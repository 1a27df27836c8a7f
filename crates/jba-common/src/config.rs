use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::Deserialize;

use crate::error::{ExporterError, Result};

pub const DEFAULT_PORT: i64 = 10000;
pub const DEFAULT_ADDRESS: &str = "0.0.0.0";
pub const CONFIG_FILE_NAME: &str = "config.yaml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter_directive(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warn",
            Self::Error | Self::Critical => "error",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ExporterError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Self::Debug),
            "INFO" => Ok(Self::Info),
            "WARNING" => Ok(Self::Warning),
            "ERROR" => Ok(Self::Error),
            "CRITICAL" => Ok(Self::Critical),
            _ => Err(ExporterError::InvalidConfig(format!(
                "level must be one of DEBUG, INFO, WARNING, ERROR, CRITICAL (case-insensitive), got {value:?}"
            ))),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// On-disk shape of the configuration file, before validation.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct ConfigFile {
    port: i64,
    level: String,
    backup_path: Option<PathBuf>,
    address: String,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            level: LogLevel::Debug.as_str().to_string(),
            backup_path: None,
            address: DEFAULT_ADDRESS.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub level: LogLevel,
    pub backup_path: PathBuf,
    pub address: String,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ExporterError::ConfigNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to an empty mapping.
        let raw: ConfigFile = if content.trim().is_empty() {
            ConfigFile::default()
        } else {
            serde_yaml::from_str(content)?
        };
        Self::validate(raw)
    }

    fn validate(raw: ConfigFile) -> Result<Self> {
        let port = u16::try_from(raw.port)
            .ok()
            .filter(|port| *port >= 1)
            .ok_or_else(|| {
                ExporterError::InvalidConfig(format!(
                    "port must be in [1, 65535], got {}",
                    raw.port
                ))
            })?;

        let level = raw.level.parse::<LogLevel>()?;

        let backup_path = raw.backup_path.ok_or_else(|| {
            ExporterError::InvalidConfig("backup_path is required".to_string())
        })?;
        if !backup_path.is_dir() {
            return Err(ExporterError::InvalidConfig(format!(
                "backup_path {} is not an existing directory",
                backup_path.display()
            )));
        }

        if raw.address.trim().is_empty() {
            return Err(ExporterError::InvalidConfig(
                "address must not be empty".to_string(),
            ));
        }

        Ok(Self {
            port,
            level,
            backup_path,
            address: raw.address,
        })
    }

    pub fn bind_address(&self) -> String {
        if self.address.contains(':') {
            format!("[{}]:{}", self.address, self.port)
        } else {
            format!("{}:{}", self.address, self.port)
        }
    }
}

/// `$SNAP_DATA/config.yaml` when running as a snap, `./config.yaml` otherwise.
pub fn default_config_path() -> PathBuf {
    let base = std::env::var_os("SNAP_DATA")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("./"));
    base.join(CONFIG_FILE_NAME)
}
