//! # Scan Result Types
//!
//! Serializable scan documents for storage and downstream tooling.

use crate::execution::SchedulerSummary;
use crate::guideline::GuidelineReport;
use crate::types::{ListValue, ProbeType, ScanTarget, TestResults};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Complete result of scanning one target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Unique identifier for this scan execution
    pub scan_id: String,

    pub metadata: ScanMetadata,

    /// Every recorded property, keyed by property name
    pub properties: BTreeMap<String, PropertyEntry>,

    /// Probes whose results were merged, in property-name independent order
    pub executed_probes: Vec<ProbeType>,

    pub guidelines: Vec<GuidelineReport>,

    pub scheduler: SchedulerSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanMetadata {
    pub target: ScanTarget,

    /// Protocol engine the probes ran against
    pub engine_id: String,

    pub scanner_version: String,

    /// Host the scan was executed from
    pub host: HostContext,

    pub timestamp: TimestampInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostContext {
    pub hostname: String,
    pub os_info: String,
}

impl HostContext {
    pub fn from_system() -> Self {
        Self {
            hostname: hostname::get()
                .unwrap_or_else(|_| std::ffi::OsString::from("unknown"))
                .to_string_lossy()
                .to_string(),
            os_info: format!("{} {}", std::env::consts::OS, std::env::consts::ARCH),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimestampInfo {
    pub scan_start: DateTime<Utc>,
    pub scan_end: DateTime<Utc>,
    pub duration_ms: u64,
}

/// Serialized form of one property result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PropertyEntry {
    Scalar {
        result: TestResults,
    },
    List {
        /// `None` when the property was not tested
        values: Option<Vec<ListValue>>,
    },
}

impl PropertyEntry {
    pub fn as_scalar(&self) -> Option<TestResults> {
        match self {
            PropertyEntry::Scalar { result } => Some(*result),
            PropertyEntry::List { .. } => None,
        }
    }
}

impl ScanResult {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_json_compact(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn property(&self, name: &str) -> Option<&PropertyEntry> {
        self.properties.get(name)
    }

    pub fn has_guideline_failures(&self) -> bool {
        self.guidelines.iter().any(GuidelineReport::has_failures)
    }

    pub fn duration_seconds(&self) -> f64 {
        self.metadata.timestamp.duration_ms as f64 / 1000.0
    }

    /// Human-readable overview
    pub fn summary(&self) -> String {
        let count = |f: fn(&TestResults) -> bool| {
            self.properties
                .values()
                .filter_map(PropertyEntry::as_scalar)
                .filter(|result| f(result))
                .count()
        };
        let mut lines = vec![
            format!("Scan {} of {}", self.scan_id, self.metadata.target),
            format!(
                "Rounds: {}  Probes executed: {}  failed: {}  skipped: {}  cancelled: {}",
                self.scheduler.rounds,
                self.scheduler.executed,
                self.scheduler.failed,
                self.scheduler.skipped,
                self.scheduler.cancelled
            ),
            format!(
                "Properties: {} (TRUE {}, FALSE {}, undetermined {})",
                self.properties.len(),
                count(|r| r.is_true()),
                count(|r| r.is_false()),
                count(|r| !r.is_definite())
            ),
        ];
        for guideline in &self.guidelines {
            lines.push(format!(
                "Guideline '{}': {} passed, {} failed, {} uncertain",
                guideline.guideline_name,
                guideline.passed().len(),
                guideline.failed().len(),
                guideline.uncertain().len()
            ));
        }
        lines.join("\n")
    }
}
