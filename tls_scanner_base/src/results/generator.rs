//! # Result Generator
//!
//! Converts a finished report into a [`ScanResult`] document.

use super::types::{HostContext, PropertyEntry, ScanMetadata, ScanResult, TimestampInfo};
use crate::execution::SchedulerSummary;
use crate::guideline::GuidelineReport;
use crate::report::ScanReport;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

pub struct ResultGenerator;

impl ResultGenerator {
    pub fn generate(
        report: &ScanReport,
        engine_id: &str,
        scheduler: SchedulerSummary,
        guidelines: Vec<GuidelineReport>,
        scan_start: DateTime<Utc>,
    ) -> ScanResult {
        let scan_end = Utc::now();
        ScanResult {
            scan_id: uuid::Uuid::new_v4().to_string(),
            metadata: ScanMetadata {
                target: report.target().clone(),
                engine_id: engine_id.to_string(),
                scanner_version: env!("CARGO_PKG_VERSION").to_string(),
                host: HostContext::from_system(),
                timestamp: TimestampInfo {
                    scan_start,
                    scan_end,
                    duration_ms: (scan_end - scan_start).num_milliseconds().max(0) as u64,
                },
            },
            properties: Self::property_map(report),
            executed_probes: report.executed_probes().collect(),
            guidelines,
            scheduler,
        }
    }

    /// Property results keyed by stable property name
    pub fn property_map(report: &ScanReport) -> BTreeMap<String, PropertyEntry> {
        report.to_property_map()
    }
}
