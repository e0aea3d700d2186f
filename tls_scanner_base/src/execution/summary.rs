//! Per-scan scheduling statistics

use crate::types::ProbeType;
use serde::{Deserialize, Serialize};

/// Final state of one probe after a scheduler run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// Executed and merged its own findings
    Executed,
    /// Executed but the execute phase failed; properties hold ERROR_DURING_TEST
    Failed { reason: String },
    /// Requirement never held; properties hold COULD_NOT_TEST
    Skipped,
    /// Scan stopped before dispatch; properties hold COULD_NOT_TEST
    Cancelled,
    /// Report already carried this probe's results
    AlreadyExecuted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeRunRecord {
    pub probe_type: ProbeType,
    pub outcome: ProbeOutcome,
    /// Scheduling round the probe ran in, if it ran
    pub round: Option<usize>,
    pub duration_ms: u64,
}

/// Why a run stopped before reaching its fixed point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Cancelled,
    DeadlineExceeded,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerSummary {
    pub rounds: usize,
    pub executed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub cancelled: usize,
    pub already_executed: usize,
    pub interrupted: Option<StopReason>,
    pub duration_ms: u64,
    /// One record per probe, in registration order
    pub records: Vec<ProbeRunRecord>,
}

impl SchedulerSummary {
    pub(crate) fn from_records(
        rounds: usize,
        interrupted: Option<StopReason>,
        duration_ms: u64,
        records: Vec<ProbeRunRecord>,
    ) -> Self {
        let count = |f: fn(&ProbeOutcome) -> bool| records.iter().filter(|r| f(&r.outcome)).count();
        Self {
            rounds,
            executed: count(|o| matches!(o, ProbeOutcome::Executed)),
            failed: count(|o| matches!(o, ProbeOutcome::Failed { .. })),
            skipped: count(|o| matches!(o, ProbeOutcome::Skipped)),
            cancelled: count(|o| matches!(o, ProbeOutcome::Cancelled)),
            already_executed: count(|o| matches!(o, ProbeOutcome::AlreadyExecuted)),
            interrupted,
            duration_ms,
            records,
        }
    }

    pub fn record_for(&self, probe_type: ProbeType) -> Option<&ProbeRunRecord> {
        self.records.iter().find(|record| record.probe_type == probe_type)
    }

    /// Probes whose engine work actually ran (successfully or not)
    pub fn dispatched(&self) -> usize {
        self.executed + self.failed
    }
}
