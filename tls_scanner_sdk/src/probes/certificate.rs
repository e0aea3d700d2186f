//! Server certificates, one handshake per key type
//!
//! Suites found by the cipher suite probe are grouped by the certificate key
//! type they need. Each group gets its own hello so a server holding RSA and
//! ECDSA certificates reveals both. TLS 1.3 selects the certificate by
//! signature scheme instead, so those hellos vary the offered schemes.

use super::common::{highest_supported, run_workflow, suites_for};
use tls_scanner_base::api::ScannerConfig;
use tls_scanner_base::engine::{ProtocolEngine, WorkflowSpec, WorkflowTraceType};
use tls_scanner_base::log_debug;
use tls_scanner_base::probe::{Probe, ProbeError};
use tls_scanner_base::report::{ReportError, ScanReport};
use tls_scanner_base::requirements::Requirement;
use tls_scanner_base::types::{
    AnalyzedProperty, CertificateKeyType, CipherSuite, ProbeType, ProtocolVersion, ScanTarget,
    ServerCertificate, SignatureAndHashAlgorithm, TestResults,
};

/// Key types a TLS 1.3 server can authenticate with
const TLS13_KEY_TYPES: [CertificateKeyType; 3] = [
    CertificateKeyType::Rsa,
    CertificateKeyType::Ecdsa,
    CertificateKeyType::Ed25519,
];

pub struct CertificateProbe {
    timeout_ms: u64,
    workflows: Vec<WorkflowSpec>,
    certificates: Option<Vec<ServerCertificate>>,
}

impl CertificateProbe {
    pub fn new(config: &ScannerConfig) -> Self {
        Self {
            timeout_ms: config.probe_timeout_ms,
            workflows: Vec::new(),
            certificates: None,
        }
    }

    fn hello(&self, version: ProtocolVersion) -> WorkflowSpec {
        WorkflowSpec::new(WorkflowTraceType::Hello, version).with_timeout_ms(self.timeout_ms)
    }

    /// One hello per certificate key type among the suites valid for `version`
    fn key_type_hellos(
        &self,
        version: ProtocolVersion,
        suites: &[CipherSuite],
    ) -> Vec<WorkflowSpec> {
        let mut groups: Vec<(CertificateKeyType, Vec<CipherSuite>)> = Vec::new();
        for suite in suites.iter().filter(|suite| suite.is_supported_in(version)) {
            let Some(key_type) = suite.certificate_key_type() else {
                continue;
            };
            match groups.iter_mut().find(|(group, _)| *group == key_type) {
                Some((_, members)) => members.push(*suite),
                None => groups.push((key_type, vec![*suite])),
            }
        }
        groups
            .into_iter()
            .map(|(_, members)| self.hello(version).with_cipher_suites(members))
            .collect()
    }

    /// One TLS 1.3 hello per key type, offering only schemes that key can sign with
    fn tls13_hellos(&self) -> Vec<WorkflowSpec> {
        TLS13_KEY_TYPES
            .iter()
            .map(|key_type| {
                let schemes: Vec<SignatureAndHashAlgorithm> = SignatureAndHashAlgorithm::ALL
                    .iter()
                    .copied()
                    .filter(|scheme| {
                        scheme.is_tls13_compatible()
                            && CertificateKeyType::for_signature(scheme.signature_algorithm())
                                == *key_type
                    })
                    .collect();
                self.hello(ProtocolVersion::Tls13)
                    .with_signature_and_hash_algorithms(schemes)
            })
            .collect()
    }

    fn signature_algorithms(certificates: &[ServerCertificate]) -> Vec<SignatureAndHashAlgorithm> {
        let mut algorithms = Vec::new();
        for certificate in certificates {
            if !algorithms.contains(&certificate.signature_algorithm) {
                algorithms.push(certificate.signature_algorithm);
            }
        }
        algorithms
    }
}

impl Probe for CertificateProbe {
    fn probe_type(&self) -> ProbeType {
        ProbeType::Certificate
    }

    fn registered_properties(&self) -> Vec<AnalyzedProperty> {
        vec![
            AnalyzedProperty::SupportedCertificates,
            AnalyzedProperty::SupportedSignatureAndHashAlgorithmsCert,
        ]
    }

    fn requirement(&self) -> Requirement {
        Requirement::probe_executed(ProbeType::ProtocolVersion)
            .and(Requirement::probe_executed(ProbeType::CipherSuite))
    }

    fn adjust_config(&mut self, report: &ScanReport) {
        let mut workflows = Vec::new();
        let legacy = highest_supported(report, |version| {
            *version != ProtocolVersion::Ssl2 && !version.is_tls13()
        });
        if let Some(version) = legacy {
            workflows = self.key_type_hellos(version, &report.supported_cipher_suites());
            if workflows.is_empty() {
                // suite enumeration found nothing usable, fall back to a plain hello
                let suites = suites_for(report, version);
                workflows.push(self.hello(version).with_cipher_suites(suites));
            }
        }
        if report
            .supported_protocol_versions()
            .contains(&ProtocolVersion::Tls13)
        {
            workflows.extend(self.tls13_hellos());
        }
        self.workflows = workflows;
    }

    fn execute_test(
        &mut self,
        engine: &dyn ProtocolEngine,
        target: &ScanTarget,
    ) -> Result<(), ProbeError> {
        let mut found: Vec<ServerCertificate> = Vec::new();
        for workflow in &self.workflows {
            let trace = run_workflow(engine, target, self.probe_type(), workflow)?;
            if !trace.received_server_hello() {
                continue;
            }
            if let Some(certificate) = trace.negotiated.certificate {
                if !found.contains(&certificate) {
                    log_debug!("Found certificate", "certificate" => certificate);
                    found.push(certificate);
                }
            }
        }
        if !found.is_empty() {
            self.certificates = Some(found);
        }
        Ok(())
    }

    fn merge_data(&self, report: &mut ScanReport) -> Result<(), ReportError> {
        let Some(certificates) = &self.certificates else {
            return self.merge_could_not_execute(report, TestResults::CouldNotTest);
        };
        report.put_list(
            AnalyzedProperty::SupportedSignatureAndHashAlgorithmsCert,
            Self::signature_algorithms(certificates),
        )?;
        report.put_list(AnalyzedProperty::SupportedCertificates, certificates.iter().copied())
    }
}
