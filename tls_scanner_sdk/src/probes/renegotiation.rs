//! Secure and insecure renegotiation

use super::common::{highest_supported, run_workflow, suites_for};
use tls_scanner_base::api::ScannerConfig;
use tls_scanner_base::engine::{ExecutedTrace, ProtocolEngine, WorkflowSpec, WorkflowTraceType};
use tls_scanner_base::probe::{Probe, ProbeError};
use tls_scanner_base::report::{ReportError, ScanReport};
use tls_scanner_base::requirements::Requirement;
use tls_scanner_base::types::{
    AnalyzedProperty, CipherSuite, ProbeType, ProtocolVersion, ScanTarget, TestResults,
};

const RENEGOTIATING_VERSIONS: [ProtocolVersion; 3] = [
    ProtocolVersion::Tls10,
    ProtocolVersion::Tls11,
    ProtocolVersion::Tls12,
];

#[derive(Debug, Clone, Copy)]
struct Findings {
    extension: TestResults,
    secure: TestResults,
    insecure: TestResults,
}

pub struct RenegotiationProbe {
    timeout_ms: u64,
    connection: Option<(ProtocolVersion, Vec<CipherSuite>)>,
    findings: Option<Findings>,
}

impl RenegotiationProbe {
    pub fn new(config: &ScannerConfig) -> Self {
        Self {
            timeout_ms: config.probe_timeout_ms,
            connection: None,
            findings: None,
        }
    }

    fn workflow(&self, trace_type: WorkflowTraceType) -> Option<WorkflowSpec> {
        self.connection.as_ref().map(|(version, suites)| {
            WorkflowSpec::new(trace_type, *version)
                .with_cipher_suites(suites.clone())
                .with_timeout_ms(self.timeout_ms)
        })
    }

    fn renegotiated(trace: &ExecutedTrace) -> TestResults {
        TestResults::of(trace.executed_as_planned && trace.server_hello_count() >= 2)
    }
}

impl Probe for RenegotiationProbe {
    fn probe_type(&self) -> ProbeType {
        ProbeType::Renegotiation
    }

    fn registered_properties(&self) -> Vec<AnalyzedProperty> {
        vec![
            AnalyzedProperty::SupportsSecureRenegotiationExtension,
            AnalyzedProperty::SupportsClientSideSecureRenegotiation,
            AnalyzedProperty::SupportsClientSideInsecureRenegotiation,
        ]
    }

    fn requirement(&self) -> Requirement {
        Requirement::probe_executed(ProbeType::CipherSuite).and(Requirement::any_property_true(
            RENEGOTIATING_VERSIONS.map(AnalyzedProperty::support_for),
        ))
    }

    fn adjust_config(&mut self, report: &ScanReport) {
        self.connection = highest_supported(report, |version| {
            RENEGOTIATING_VERSIONS.contains(version)
        })
        .map(|version| (version, suites_for(report, version)));
    }

    fn execute_test(
        &mut self,
        engine: &dyn ProtocolEngine,
        target: &ScanTarget,
    ) -> Result<(), ProbeError> {
        let (Some(hello), Some(secure), Some(insecure)) = (
            self.workflow(WorkflowTraceType::Hello),
            self.workflow(WorkflowTraceType::SecureRenegotiation),
            self.workflow(WorkflowTraceType::InsecureRenegotiation),
        ) else {
            return Ok(());
        };

        let hello = run_workflow(engine, target, self.probe_type(), &hello)?;
        let extension = if hello.received_server_hello() {
            TestResults::of(hello.negotiated.secure_renegotiation)
        } else {
            TestResults::CouldNotTest
        };
        let secure = run_workflow(engine, target, self.probe_type(), &secure)?;
        let insecure = run_workflow(engine, target, self.probe_type(), &insecure)?;

        self.findings = Some(Findings {
            extension,
            secure: Self::renegotiated(&secure),
            insecure: Self::renegotiated(&insecure),
        });
        Ok(())
    }

    fn merge_data(&self, report: &mut ScanReport) -> Result<(), ReportError> {
        let Some(findings) = self.findings else {
            return self.merge_could_not_execute(report, TestResults::CouldNotTest);
        };
        report.put_scalar(
            AnalyzedProperty::SupportsSecureRenegotiationExtension,
            findings.extension,
        )?;
        report.put_scalar(
            AnalyzedProperty::SupportsClientSideSecureRenegotiation,
            findings.secure,
        )?;
        report.put_scalar(
            AnalyzedProperty::SupportsClientSideInsecureRenegotiation,
            findings.insecure,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ServerProfile;
    use crate::probes::common::test_support::{config, run_probe, scalar, target};
    use crate::probes::{CipherSuiteProbe, ProtocolVersionProbe};

    fn scan(profile: ServerProfile) -> ScanReport {
        let mut report = ScanReport::new(target());
        run_probe(
            &mut ProtocolVersionProbe::new(&config()),
            profile.clone(),
            &mut report,
        );
        run_probe(
            &mut CipherSuiteProbe::new(&config()),
            profile.clone(),
            &mut report,
        );
        let mut probe = RenegotiationProbe::new(&config());
        assert!(probe.requirement().evaluate(&report));
        run_probe(&mut probe, profile, &mut report);
        report
    }

    #[test]
    fn test_legacy_insecure_renegotiation() {
        let report = scan(ServerProfile::legacy());
        assert_eq!(
            scalar(&report, AnalyzedProperty::SupportsSecureRenegotiationExtension),
            Some(TestResults::False)
        );
        assert_eq!(
            scalar(&report, AnalyzedProperty::SupportsClientSideInsecureRenegotiation),
            Some(TestResults::True)
        );
        assert_eq!(
            scalar(&report, AnalyzedProperty::SupportsClientSideSecureRenegotiation),
            Some(TestResults::False)
        );
    }

    #[test]
    fn test_secure_client_renegotiation() {
        let profile = ServerProfile {
            client_renegotiation: true,
            ..ServerProfile::modern()
        };
        let report = scan(profile);
        assert_eq!(
            scalar(&report, AnalyzedProperty::SupportsSecureRenegotiationExtension),
            Some(TestResults::True)
        );
        assert_eq!(
            scalar(&report, AnalyzedProperty::SupportsClientSideSecureRenegotiation),
            Some(TestResults::True)
        );
    }

    #[test]
    fn test_requires_pre_tls13_version() {
        let profile = ServerProfile {
            versions: vec![ProtocolVersion::Tls13],
            ..ServerProfile::modern()
        };
        let mut report = ScanReport::new(target());
        run_probe(
            &mut ProtocolVersionProbe::new(&config()),
            profile.clone(),
            &mut report,
        );
        run_probe(&mut CipherSuiteProbe::new(&config()), profile, &mut report);

        assert!(!RenegotiationProbe::new(&config())
            .requirement()
            .evaluate(&report));
    }
}
