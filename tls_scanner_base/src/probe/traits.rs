//! The probe lifecycle contract

use super::errors::ProbeError;
use crate::engine::ProtocolEngine;
use crate::report::{ReportError, ScanReport};
use crate::requirements::Requirement;
use crate::types::{AnalyzedProperty, ProbeType, ScanTarget, TestResults};

/// One self-contained test against the target
///
/// The scheduler drives each probe through three phases, at most once per
/// report:
///
/// 1. [`adjust_config`](Probe::adjust_config) reads prior results before
///    dispatch. No other probe writes while it runs.
/// 2. [`execute_test`](Probe::execute_test) runs on a worker thread and may
///    only talk to the protocol engine. It keeps its findings in `self`.
/// 3. [`merge_data`](Probe::merge_data) writes those findings into the report
///    on the scheduling thread, one probe at a time.
///
/// A probe must write every property in its write-set during `merge_data`;
/// the scheduler fills anything left out with COULD_NOT_TEST.
pub trait Probe: Send {
    fn probe_type(&self) -> ProbeType;

    /// Properties this probe owns and writes
    fn registered_properties(&self) -> Vec<AnalyzedProperty>;

    /// Predicate gating execution
    fn requirement(&self) -> Requirement {
        Requirement::NoRequirement
    }

    fn adjust_config(&mut self, _report: &ScanReport) {}

    fn execute_test(
        &mut self,
        engine: &dyn ProtocolEngine,
        target: &ScanTarget,
    ) -> Result<(), ProbeError>;

    fn merge_data(&self, report: &mut ScanReport) -> Result<(), ReportError>;

    /// Write `status` to every registered property
    ///
    /// Used when the probe never ran (requirement unmet, scan cancelled) or
    /// when its execute phase failed. List properties receive an absent list.
    fn merge_could_not_execute(
        &self,
        report: &mut ScanReport,
        status: TestResults,
    ) -> Result<(), ReportError> {
        for property in self.registered_properties() {
            report.put_fallback(property, status)?;
        }
        Ok(())
    }
}
