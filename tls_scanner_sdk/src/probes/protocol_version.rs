//! Protocol version support
//!
//! Offers each version as the highest one and checks whether the server
//! answers with exactly that version.

use super::common::run_workflow;
use tls_scanner_base::api::ScannerConfig;
use tls_scanner_base::engine::{ProtocolEngine, WorkflowSpec, WorkflowTraceType};
use tls_scanner_base::log_debug;
use tls_scanner_base::probe::{Probe, ProbeError};
use tls_scanner_base::report::{ReportError, ScanReport};
use tls_scanner_base::types::{
    AnalyzedProperty, CipherSuite, ProbeType, ProtocolVersion, ScanTarget, TestResults,
};

/// Suites offered on the retry pass, for servers that choke on long hellos
const REDUCED_SUITES: &[CipherSuite] = &[
    CipherSuite::TLS_AES_128_GCM_SHA256,
    CipherSuite::TLS_AES_256_GCM_SHA384,
    CipherSuite::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256,
    CipherSuite::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,
    CipherSuite::TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA,
    CipherSuite::TLS_RSA_WITH_AES_128_CBC_SHA,
    CipherSuite::TLS_RSA_WITH_AES_256_CBC_SHA,
    CipherSuite::TLS_RSA_WITH_3DES_EDE_CBC_SHA,
];

pub struct ProtocolVersionProbe {
    dtls: bool,
    timeout_ms: u64,
    results: Vec<(ProtocolVersion, bool)>,
}

impl ProtocolVersionProbe {
    pub fn new(config: &ScannerConfig) -> Self {
        Self {
            dtls: config.dtls,
            timeout_ms: config.probe_timeout_ms,
            results: Vec::new(),
        }
    }

    fn versions_to_test(&self) -> &'static [ProtocolVersion] {
        if self.dtls {
            &ProtocolVersion::DTLS
        } else {
            &ProtocolVersion::TLS
        }
    }

    fn is_version_supported(
        &self,
        engine: &dyn ProtocolEngine,
        target: &ScanTarget,
        version: ProtocolVersion,
        suites: Vec<CipherSuite>,
    ) -> Result<bool, ProbeError> {
        if version == ProtocolVersion::Ssl2 {
            let workflow = WorkflowSpec::new(WorkflowTraceType::Ssl2Hello, version)
                .with_cipher_suites(Vec::new())
                .with_timeout_ms(self.timeout_ms);
            let trace = run_workflow(engine, target, self.probe_type(), &workflow)?;
            return Ok(trace.executed_as_planned);
        }

        let workflow = WorkflowSpec::new(WorkflowTraceType::Hello, version)
            .with_cipher_suites(suites)
            .with_timeout_ms(self.timeout_ms);
        let trace = run_workflow(engine, target, self.probe_type(), &workflow)?;
        Ok(trace.received_server_hello() && trace.negotiated.version == Some(version))
    }
}

impl Probe for ProtocolVersionProbe {
    fn probe_type(&self) -> ProbeType {
        ProbeType::ProtocolVersion
    }

    fn registered_properties(&self) -> Vec<AnalyzedProperty> {
        ProtocolVersion::TLS
            .iter()
            .chain(ProtocolVersion::DTLS.iter())
            .map(|version| AnalyzedProperty::support_for(*version))
            .chain(std::iter::once(AnalyzedProperty::SupportedProtocolVersions))
            .collect()
    }

    fn execute_test(
        &mut self,
        engine: &dyn ProtocolEngine,
        target: &ScanTarget,
    ) -> Result<(), ProbeError> {
        let mut results = Vec::new();
        for version in self.versions_to_test() {
            let supported = self.is_version_supported(
                engine,
                target,
                *version,
                CipherSuite::for_version(*version),
            )?;
            results.push((*version, supported));
        }

        if results.iter().all(|(_, supported)| !supported) {
            log_debug!("No version supported, retrying with reduced suite list", "target" => target);
            for entry in results.iter_mut().filter(|(v, _)| *v != ProtocolVersion::Ssl2) {
                let suites: Vec<CipherSuite> = REDUCED_SUITES
                    .iter()
                    .copied()
                    .filter(|suite| suite.is_supported_in(entry.0))
                    .collect();
                entry.1 = self.is_version_supported(engine, target, entry.0, suites)?;
            }
        }

        self.results = results;
        Ok(())
    }

    fn merge_data(&self, report: &mut ScanReport) -> Result<(), ReportError> {
        for version in ProtocolVersion::TLS.iter().chain(ProtocolVersion::DTLS.iter()) {
            let status = self
                .results
                .iter()
                .find(|(tested, _)| tested == version)
                .map_or(TestResults::CouldNotTest, |(_, supported)| {
                    TestResults::of(*supported)
                });
            report.put_scalar(AnalyzedProperty::support_for(*version), status)?;
        }

        let supported = self
            .results
            .iter()
            .filter(|(_, supported)| *supported)
            .map(|(version, _)| *version);
        report.put_list(AnalyzedProperty::SupportedProtocolVersions, supported)
    }
}
