//! Server key exchange and TLS 1.3 signature algorithms
//!
//! Offers one signature algorithm at a time. A server that signs with an
//! algorithm the client never offered does not respect the
//! signature_algorithms extension.

use super::common::{highest_supported, run_workflow};
use tls_scanner_base::api::ScannerConfig;
use tls_scanner_base::engine::{ProtocolEngine, WorkflowSpec, WorkflowTraceType};
use tls_scanner_base::probe::{Probe, ProbeError};
use tls_scanner_base::report::{ReportError, ScanReport};
use tls_scanner_base::requirements::Requirement;
use tls_scanner_base::types::{
    AnalyzedProperty, CipherSuite, ProbeType, ProtocolVersion, ScanTarget,
    SignatureAndHashAlgorithm, TestResults,
};

pub struct SignatureAndHashAlgorithmProbe {
    timeout_ms: u64,
    /// TLS 1.2 style connection with ephemeral suites
    legacy: Option<(ProtocolVersion, Vec<CipherSuite>)>,
    test_tls13: bool,
    ske: Option<Vec<SignatureAndHashAlgorithm>>,
    tls13: Option<Vec<SignatureAndHashAlgorithm>>,
    respects_extension: Option<bool>,
}

impl SignatureAndHashAlgorithmProbe {
    pub fn new(config: &ScannerConfig) -> Self {
        Self {
            timeout_ms: config.probe_timeout_ms,
            legacy: None,
            test_tls13: false,
            ske: None,
            tls13: None,
            respects_extension: None,
        }
    }

    fn offer(
        &self,
        engine: &dyn ProtocolEngine,
        target: &ScanTarget,
        version: ProtocolVersion,
        suites: Vec<CipherSuite>,
        algorithm: SignatureAndHashAlgorithm,
    ) -> Result<Option<SignatureAndHashAlgorithm>, ProbeError> {
        let workflow = WorkflowSpec::new(WorkflowTraceType::Hello, version)
            .with_cipher_suites(suites)
            .with_signature_and_hash_algorithms(vec![algorithm])
            .with_timeout_ms(self.timeout_ms);
        let trace = run_workflow(engine, target, self.probe_type(), &workflow)?;
        if !trace.received_server_hello() {
            return Ok(None);
        }
        Ok(trace.negotiated.server_key_exchange_signature)
    }
}

impl Probe for SignatureAndHashAlgorithmProbe {
    fn probe_type(&self) -> ProbeType {
        ProbeType::SignatureAndHash
    }

    fn registered_properties(&self) -> Vec<AnalyzedProperty> {
        vec![
            AnalyzedProperty::SupportedSignatureAndHashAlgorithmsSke,
            AnalyzedProperty::SupportedSignatureAndHashAlgorithmsTls13,
            AnalyzedProperty::RespectsSignatureAlgorithmsExtension,
        ]
    }

    fn requirement(&self) -> Requirement {
        Requirement::probe_executed(ProbeType::CipherSuite)
    }

    fn adjust_config(&mut self, report: &ScanReport) {
        self.legacy = highest_supported(report, ProtocolVersion::is_tls12_or_dtls12).and_then(
            |version| {
                let suites: Vec<CipherSuite> = report
                    .supported_cipher_suites()
                    .into_iter()
                    .filter(|suite| suite.is_ephemeral() && suite.is_supported_in(version))
                    .collect();
                (!suites.is_empty()).then_some((version, suites))
            },
        );
        self.test_tls13 = report
            .supported_protocol_versions()
            .contains(&ProtocolVersion::Tls13);
    }

    fn execute_test(
        &mut self,
        engine: &dyn ProtocolEngine,
        target: &ScanTarget,
    ) -> Result<(), ProbeError> {
        if let Some((version, suites)) = &self.legacy {
            let mut supported = Vec::new();
            let mut respects = true;
            for algorithm in SignatureAndHashAlgorithm::ALL {
                match self.offer(engine, target, *version, suites.clone(), *algorithm)? {
                    Some(selected) if selected == *algorithm => supported.push(selected),
                    Some(_) => respects = false,
                    None => {}
                }
            }
            self.ske = Some(supported);
            self.respects_extension = Some(respects);
        }

        if self.test_tls13 {
            let suites = CipherSuite::for_version(ProtocolVersion::Tls13);
            let mut supported = Vec::new();
            for algorithm in SignatureAndHashAlgorithm::ALL
                .iter()
                .filter(|algorithm| algorithm.is_tls13_compatible())
            {
                let selected =
                    self.offer(engine, target, ProtocolVersion::Tls13, suites.clone(), *algorithm)?;
                if selected == Some(*algorithm) {
                    supported.push(*algorithm);
                }
            }
            self.tls13 = Some(supported);
        }
        Ok(())
    }

    fn merge_data(&self, report: &mut ScanReport) -> Result<(), ReportError> {
        match &self.ske {
            Some(algorithms) => report.put_list(
                AnalyzedProperty::SupportedSignatureAndHashAlgorithmsSke,
                algorithms.iter().copied(),
            )?,
            None => report.put_absent_list(AnalyzedProperty::SupportedSignatureAndHashAlgorithmsSke)?,
        }
        match &self.tls13 {
            Some(algorithms) => report.put_list(
                AnalyzedProperty::SupportedSignatureAndHashAlgorithmsTls13,
                algorithms.iter().copied(),
            )?,
            None => {
                report.put_absent_list(AnalyzedProperty::SupportedSignatureAndHashAlgorithmsTls13)?
            }
        }
        report.put_scalar(
            AnalyzedProperty::RespectsSignatureAlgorithmsExtension,
            self.respects_extension
                .map_or(TestResults::CouldNotTest, TestResults::of),
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
        run_probe(
            &mut SignatureAndHashAlgorithmProbe::new(&config()),
            profile,
            &mut report,
        );
        report
    }

    fn algorithms(report: &ScanReport, property: AnalyzedProperty) -> Option<Vec<SignatureAndHashAlgorithm>> {
        report
            .get_list_result(property)
            .unwrap()
            .filter(|list| !list.is_absent())
            .map(|list| list.signature_and_hash_algorithms())
    }

    #[test]
    fn test_modern_server_algorithms() {
        let report = scan(ServerProfile::modern());

        assert_eq!(
            algorithms(&report, AnalyzedProperty::SupportedSignatureAndHashAlgorithmsSke),
            Some(vec![
                SignatureAndHashAlgorithm::RsaSha256,
                SignatureAndHashAlgorithm::RsaSha384,
                SignatureAndHashAlgorithm::RsaPssRsaeSha256,
            ])
        );
        assert_eq!(
            algorithms(&report, AnalyzedProperty::SupportedSignatureAndHashAlgorithmsTls13),
            Some(vec![
                SignatureAndHashAlgorithm::RsaPssRsaeSha256,
                SignatureAndHashAlgorithm::RsaPssRsaeSha384,
            ])
        );
        assert_eq!(
            scalar(&report, AnalyzedProperty::RespectsSignatureAlgorithmsExtension),
            Some(TestResults::True)
        );
    }

    #[test]
    fn test_server_ignoring_extension() {
        let report = scan(ServerProfile::legacy());

        assert_eq!(
            algorithms(&report, AnalyzedProperty::SupportedSignatureAndHashAlgorithmsSke),
            Some(vec![SignatureAndHashAlgorithm::RsaSha1])
        );
        assert_eq!(
            algorithms(&report, AnalyzedProperty::SupportedSignatureAndHashAlgorithmsTls13),
            None
        );
        assert_eq!(
            scalar(&report, AnalyzedProperty::RespectsSignatureAlgorithmsExtension),
            Some(TestResults::False)
        );
    }
}
