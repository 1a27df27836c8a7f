pub mod config;
pub mod error;

pub use config::{Config, LogLevel};
pub use error::{ExporterError, Result};
