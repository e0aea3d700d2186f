//! # Public API
//!
//! Configuration, errors and the [`TlsScanner`] facade.

pub mod config;
pub mod errors;
pub mod scanner;

pub use config::ScannerConfig;
pub use errors::{ConfigError, ScannerError};
pub use scanner::{BatchScanResult, BatchStatistics, TlsScanner};
