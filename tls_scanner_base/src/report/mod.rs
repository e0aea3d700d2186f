//! # Scan Report
//!
//! The single mutable object of a scan. Probes write into it through the
//! scheduler's merge stage; requirements and guideline checks only read it.

pub mod error;
pub mod scan_report;

pub use error::ReportError;
pub use scan_report::ScanReport;
