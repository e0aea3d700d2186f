//! Early ChangeCipherSpec acceptance (CVE-2014-0224)

use super::common::{baseline_version, run_workflow};
use tls_scanner_base::api::ScannerConfig;
use tls_scanner_base::engine::{ProtocolEngine, WorkflowSpec, WorkflowTraceType};
use tls_scanner_base::probe::{Probe, ProbeError};
use tls_scanner_base::report::{ReportError, ScanReport};
use tls_scanner_base::types::{AnalyzedProperty, ProbeType, ProtocolVersion, ScanTarget, TestResults};

pub struct EarlyCcsProbe {
    version: ProtocolVersion,
    timeout_ms: u64,
    result: TestResults,
}

impl EarlyCcsProbe {
    pub fn new(config: &ScannerConfig) -> Self {
        Self {
            version: baseline_version(config.dtls),
            timeout_ms: config.probe_timeout_ms,
            result: TestResults::CouldNotTest,
        }
    }
}

impl Probe for EarlyCcsProbe {
    fn probe_type(&self) -> ProbeType {
        ProbeType::EarlyCcs
    }

    fn registered_properties(&self) -> Vec<AnalyzedProperty> {
        vec![AnalyzedProperty::VulnerableToEarlyCcs]
    }

    fn execute_test(
        &mut self,
        engine: &dyn ProtocolEngine,
        target: &ScanTarget,
    ) -> Result<(), ProbeError> {
        let workflow = WorkflowSpec::new(WorkflowTraceType::EarlyChangeCipherSpec, self.version)
            .with_timeout_ms(self.timeout_ms);
        let trace = run_workflow(engine, target, self.probe_type(), &workflow)?;
        if trace.received_server_hello() {
            self.result = TestResults::of(trace.executed_as_planned);
        }
        Ok(())
    }

    fn merge_data(&self, report: &mut ScanReport) -> Result<(), ReportError> {
        report.put_scalar(AnalyzedProperty::VulnerableToEarlyCcs, self.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ServerProfile;
    use crate::probes::common::test_support::{config, run_probe, scalar, target};

    fn scan(profile: ServerProfile) -> Option<TestResults> {
        let mut report = ScanReport::new(target());
        run_probe(&mut EarlyCcsProbe::new(&config()), profile, &mut report);
        scalar(&report, AnalyzedProperty::VulnerableToEarlyCcs)
    }

    #[test]
    fn test_vulnerable_server() {
        assert_eq!(scan(ServerProfile::legacy()), Some(TestResults::True));
    }

    #[test]
    fn test_patched_server() {
        assert_eq!(scan(ServerProfile::modern()), Some(TestResults::False));
    }
}
