//! Server name indication requirement

use super::common::{highest_supported, run_workflow, suites_for};
use tls_scanner_base::api::ScannerConfig;
use tls_scanner_base::engine::{ProtocolEngine, WorkflowSpec, WorkflowTraceType};
use tls_scanner_base::probe::{Probe, ProbeError};
use tls_scanner_base::report::{ReportError, ScanReport};
use tls_scanner_base::requirements::Requirement;
use tls_scanner_base::types::{
    AnalyzedProperty, CipherSuite, ProbeType, ProtocolVersion, ScanTarget, TestResults,
};

pub struct SniProbe {
    timeout_ms: u64,
    connection: Option<(ProtocolVersion, Vec<CipherSuite>)>,
    result: TestResults,
}

impl SniProbe {
    pub fn new(config: &ScannerConfig) -> Self {
        Self {
            timeout_ms: config.probe_timeout_ms,
            connection: None,
            result: TestResults::CouldNotTest,
        }
    }
}

impl Probe for SniProbe {
    fn probe_type(&self) -> ProbeType {
        ProbeType::Sni
    }

    fn registered_properties(&self) -> Vec<AnalyzedProperty> {
        vec![AnalyzedProperty::RequiresSni]
    }

    fn requirement(&self) -> Requirement {
        Requirement::probe_executed(ProbeType::ProtocolVersion)
    }

    fn adjust_config(&mut self, report: &ScanReport) {
        self.connection = highest_supported(report, |version| *version != ProtocolVersion::Ssl2)
            .map(|version| (version, suites_for(report, version)));
    }

    fn execute_test(
        &mut self,
        engine: &dyn ProtocolEngine,
        target: &ScanTarget,
    ) -> Result<(), ProbeError> {
        let Some((version, suites)) = &self.connection else {
            return Ok(());
        };
        let hello = WorkflowSpec::new(WorkflowTraceType::Hello, *version)
            .with_cipher_suites(suites.clone())
            .with_timeout_ms(self.timeout_ms);

        let anonymous = hello.clone().without_server_name();
        let trace = run_workflow(engine, target, self.probe_type(), &anonymous)?;
        if trace.received_server_hello() {
            self.result = TestResults::False;
            return Ok(());
        }

        let trace = run_workflow(engine, target, self.probe_type(), &hello)?;
        self.result = if trace.received_server_hello() {
            TestResults::True
        } else {
            // neither hello succeeded, so the missing name is not the cause
            TestResults::Uncertain
        };
        Ok(())
    }

    fn merge_data(&self, report: &mut ScanReport) -> Result<(), ReportError> {
        report.put_scalar(AnalyzedProperty::RequiresSni, self.result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ServerProfile;
    use crate::probes::common::test_support::{config, run_probe, scalar, target};
    use crate::probes::ProtocolVersionProbe;

    fn scan(profile: ServerProfile) -> Option<TestResults> {
        let mut report = ScanReport::new(target());
        run_probe(
            &mut ProtocolVersionProbe::new(&config()),
            profile.clone(),
            &mut report,
        );
        run_probe(&mut SniProbe::new(&config()), profile, &mut report);
        scalar(&report, AnalyzedProperty::RequiresSni)
    }

    #[test]
    fn test_server_without_sni_requirement() {
        assert_eq!(scan(ServerProfile::modern()), Some(TestResults::False));
    }

    #[test]
    fn test_server_requiring_sni() {
        let profile = ServerProfile {
            requires_sni: true,
            ..ServerProfile::modern()
        };
        assert_eq!(scan(profile), Some(TestResults::True));
    }

    #[test]
    fn test_no_supported_version_could_not_test() {
        let profile = ServerProfile {
            versions: Vec::new(),
            ..ServerProfile::modern()
        };
        assert_eq!(scan(profile), Some(TestResults::CouldNotTest));
    }

    #[test]
    fn test_both_hellos_failing_is_uncertain() {
        let profile = ServerProfile::modern();
        let mut report = ScanReport::new(target());
        run_probe(
            &mut ProtocolVersionProbe::new(&config()),
            profile.clone(),
            &mut report,
        );
        // the server stops accepting any suite after version detection
        let profile = ServerProfile {
            cipher_suites: Vec::new(),
            ..profile
        };
        run_probe(&mut SniProbe::new(&config()), profile, &mut report);
        assert_eq!(
            scalar(&report, AnalyzedProperty::RequiresSni),
            Some(TestResults::Uncertain)
        );
    }
}
