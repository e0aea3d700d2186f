//! # Scanner Errors

use crate::execution::SchedulerError;
use crate::probe::RegistryError;

/// Configuration loading and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Errors surfaced by the scanner facade
#[derive(Debug, thiserror::Error)]
pub enum ScannerError {
    #[error("No scan target configured")]
    MissingTarget,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("Result serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ScannerError {
    /// Whether retrying the scan against another target could succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ScannerError::MissingTarget)
    }
}
