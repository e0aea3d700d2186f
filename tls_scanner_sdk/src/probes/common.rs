//! Helpers shared by the probe implementations

use tls_scanner_base::engine::{ExecutedTrace, ProtocolEngine, WorkflowSpec};
use tls_scanner_base::log_debug;
use tls_scanner_base::probe::ProbeError;
use tls_scanner_base::report::ScanReport;
use tls_scanner_base::types::{CipherSuite, ProbeType, ProtocolVersion, ScanTarget};

/// Run one workflow, attributing engine failures to `probe_type`
pub(crate) fn run_workflow(
    engine: &dyn ProtocolEngine,
    target: &ScanTarget,
    probe_type: ProbeType,
    workflow: &WorkflowSpec,
) -> Result<ExecutedTrace, ProbeError> {
    log_debug!(
        "Executing workflow",
        "probe" => probe_type,
        "workflow" => workflow.trace_type,
        "version" => workflow.highest_version
    );
    engine
        .execute(target, workflow)
        .map_err(|source| ProbeError::engine(probe_type, source))
}

/// Suites the report found for `version`, or every suite valid for it
pub(crate) fn suites_for(report: &ScanReport, version: ProtocolVersion) -> Vec<CipherSuite> {
    let found: Vec<CipherSuite> = report
        .supported_cipher_suites()
        .into_iter()
        .filter(|suite| suite.is_supported_in(version))
        .collect();
    if found.is_empty() {
        CipherSuite::for_version(version)
    } else {
        found
    }
}

/// Highest supported version matching `filter`
pub(crate) fn highest_supported<F>(report: &ScanReport, filter: F) -> Option<ProtocolVersion>
where
    F: Fn(&ProtocolVersion) -> bool,
{
    report
        .supported_protocol_versions()
        .into_iter()
        .filter(|version| filter(version))
        .max()
}

/// Default version for probes that run before version support is known
pub(crate) fn baseline_version(dtls: bool) -> ProtocolVersion {
    if dtls {
        ProtocolVersion::Dtls12
    } else {
        ProtocolVersion::Tls12
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::engine::{ProfileEngine, ServerProfile};
    use tls_scanner_base::api::ScannerConfig;
    use tls_scanner_base::probe::Probe;
    use tls_scanner_base::report::ScanReport;
    use tls_scanner_base::types::{AnalyzedProperty, ScanTarget, TestResult, TestResults};

    pub fn target() -> ScanTarget {
        ScanTarget::new("localhost", 443)
    }

    pub fn config() -> ScannerConfig {
        ScannerConfig::default()
    }

    /// Drive one probe through all phases against a profile
    pub fn run_probe(probe: &mut dyn Probe, profile: ServerProfile, report: &mut ScanReport) {
        let engine = ProfileEngine::new(profile);
        probe.adjust_config(report);
        probe.execute_test(&engine, &target()).unwrap();
        probe.merge_data(report).unwrap();
        report.mark_executed(probe.probe_type());
    }

    pub fn scalar(report: &ScanReport, property: AnalyzedProperty) -> Option<TestResults> {
        report.get_result(property).and_then(TestResult::as_scalar)
    }
}
