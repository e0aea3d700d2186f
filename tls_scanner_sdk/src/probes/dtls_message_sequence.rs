//! DTLS handshake message_seq validation

use super::common::{highest_supported, run_workflow, suites_for};
use tls_scanner_base::api::ScannerConfig;
use tls_scanner_base::engine::{
    ProtocolEngine, SequenceManipulation, WorkflowSpec, WorkflowTraceType,
};
use tls_scanner_base::probe::{Probe, ProbeError};
use tls_scanner_base::report::{ReportError, ScanReport};
use tls_scanner_base::requirements::Requirement;
use tls_scanner_base::types::{
    AnalyzedProperty, CipherSuite, ProbeType, ProtocolVersion, ScanTarget, TestResults,
};

const CHECKS: [(SequenceManipulation, AnalyzedProperty); 4] = [
    (
        SequenceManipulation::StartWithInvalidSequence,
        AnalyzedProperty::AcceptsStartedWithInvalidMessageSequence,
    ),
    (
        SequenceManipulation::SkipOnce,
        AnalyzedProperty::AcceptsSkippedMessageSequencesOnce,
    ),
    (
        SequenceManipulation::SkipMultiple,
        AnalyzedProperty::AcceptsSkippedMessageSequencesMultiple,
    ),
    (
        SequenceManipulation::Random,
        AnalyzedProperty::AcceptsRandomMessageSequences,
    ),
];

pub struct DtlsMessageSequenceProbe {
    timeout_ms: u64,
    version: ProtocolVersion,
    suites: Vec<CipherSuite>,
    accepted: Vec<(SequenceManipulation, bool)>,
}

impl DtlsMessageSequenceProbe {
    pub fn new(config: &ScannerConfig) -> Self {
        Self {
            timeout_ms: config.probe_timeout_ms,
            version: ProtocolVersion::Dtls12,
            suites: CipherSuite::for_version(ProtocolVersion::Dtls12),
            accepted: Vec::new(),
        }
    }

    fn accepts(&self, manipulation: SequenceManipulation) -> Option<bool> {
        self.accepted
            .iter()
            .find(|(tested, _)| *tested == manipulation)
            .map(|(_, accepted)| *accepted)
    }
}

impl Probe for DtlsMessageSequenceProbe {
    fn probe_type(&self) -> ProbeType {
        ProbeType::DtlsMessageSequenceNumber
    }

    fn registered_properties(&self) -> Vec<AnalyzedProperty> {
        CHECKS
            .iter()
            .map(|(_, property)| *property)
            .chain(std::iter::once(AnalyzedProperty::MissesMessageSequenceChecks))
            .collect()
    }

    fn requirement(&self) -> Requirement {
        Requirement::any_property_true([
            AnalyzedProperty::SupportsDtls10,
            AnalyzedProperty::SupportsDtls12,
        ])
    }

    fn adjust_config(&mut self, report: &ScanReport) {
        if let Some(version) = highest_supported(report, ProtocolVersion::is_dtls) {
            self.version = version;
            self.suites = suites_for(report, version);
        }
    }

    fn execute_test(
        &mut self,
        engine: &dyn ProtocolEngine,
        target: &ScanTarget,
    ) -> Result<(), ProbeError> {
        let mut accepted = Vec::new();
        for (manipulation, _) in CHECKS {
            let workflow = WorkflowSpec::new(
                WorkflowTraceType::DtlsMessageSequence(manipulation),
                self.version,
            )
            .with_cipher_suites(self.suites.clone())
            .with_timeout_ms(self.timeout_ms);
            let trace = run_workflow(engine, target, self.probe_type(), &workflow)?;
            accepted.push((manipulation, trace.executed_as_planned));
        }
        self.accepted = accepted;
        Ok(())
    }

    fn merge_data(&self, report: &mut ScanReport) -> Result<(), ReportError> {
        for (manipulation, property) in CHECKS {
            let status = self
                .accepts(manipulation)
                .map_or(TestResults::CouldNotTest, TestResults::of);
            report.put_scalar(property, status)?;
        }

        let misses = [
            SequenceManipulation::SkipOnce,
            SequenceManipulation::SkipMultiple,
            SequenceManipulation::Random,
        ]
        .iter()
        .map(|manipulation| self.accepts(*manipulation))
        .collect::<Option<Vec<bool>>>()
        .map_or(TestResults::CouldNotTest, |accepted| {
            TestResults::of(accepted.contains(&true))
        });
        report.put_scalar(AnalyzedProperty::MissesMessageSequenceChecks, misses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{DtlsSequenceHandling, ServerProfile};
    use crate::probes::common::test_support::{config, run_probe, scalar, target};
    use crate::probes::ProtocolVersionProbe;

    fn dtls_profile(dtls_sequence: DtlsSequenceHandling) -> ServerProfile {
        ServerProfile {
            name: "dtls".to_string(),
            versions: vec![ProtocolVersion::Dtls10, ProtocolVersion::Dtls12],
            cipher_suites: vec![CipherSuite::TLS_RSA_WITH_AES_128_CBC_SHA],
            dtls_sequence,
            ..ServerProfile::default()
        }
    }

    fn scan(profile: ServerProfile) -> ScanReport {
        let config = config().with_dtls(true);
        let mut report = ScanReport::new(target());
        run_probe(
            &mut ProtocolVersionProbe::new(&config),
            profile.clone(),
            &mut report,
        );
        let mut probe = DtlsMessageSequenceProbe::new(&config);
        assert!(probe.requirement().evaluate(&report));
        run_probe(&mut probe, profile, &mut report);
        report
    }

    #[test]
    fn test_strict_server() {
        let report = scan(dtls_profile(DtlsSequenceHandling::default()));
        assert_eq!(
            scalar(&report, AnalyzedProperty::MissesMessageSequenceChecks),
            Some(TestResults::False)
        );
        assert_eq!(
            scalar(&report, AnalyzedProperty::AcceptsRandomMessageSequences),
            Some(TestResults::False)
        );
    }

    #[test]
    fn test_lenient_server() {
        let report = scan(dtls_profile(DtlsSequenceHandling {
            accepts_invalid_start: true,
            accepts_skip_multiple: true,
            ..DtlsSequenceHandling::default()
        }));
        assert_eq!(
            scalar(&report, AnalyzedProperty::AcceptsStartedWithInvalidMessageSequence),
            Some(TestResults::True)
        );
        assert_eq!(
            scalar(&report, AnalyzedProperty::AcceptsSkippedMessageSequencesOnce),
            Some(TestResults::False)
        );
        assert_eq!(
            scalar(&report, AnalyzedProperty::MissesMessageSequenceChecks),
            Some(TestResults::True)
        );
    }

    #[test]
    fn test_not_runnable_without_dtls() {
        let mut report = ScanReport::new(target());
        run_probe(
            &mut ProtocolVersionProbe::new(&config()),
            ServerProfile::modern(),
            &mut report,
        );
        assert!(!DtlsMessageSequenceProbe::new(&config())
            .requirement()
            .evaluate(&report));
    }
}
