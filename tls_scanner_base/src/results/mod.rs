//! # Scan Results Module
//!
//! Result documents produced at the end of a scan.
//!
//! ## Core Types
//! - [`ScanResult`] - complete result for one target
//! - [`PropertyEntry`] - serialized property value
//! - [`ResultGenerator`] - builds a `ScanResult` from a finished report

pub mod generator;
pub mod types;

pub use generator::ResultGenerator;
pub use types::*;
