//! DTLS cookie binding
//!
//! Retrieves a cookie with one source port and replays it from another. A
//! server that still answers derived the cookie from the client address alone.

use super::common::{highest_supported, run_workflow, suites_for};
use tls_scanner_base::api::ScannerConfig;
use tls_scanner_base::engine::{HandshakeMessage, ProtocolEngine, WorkflowSpec, WorkflowTraceType};
use tls_scanner_base::probe::{Probe, ProbeError};
use tls_scanner_base::report::{ReportError, ScanReport};
use tls_scanner_base::requirements::Requirement;
use tls_scanner_base::types::{
    AnalyzedProperty, CipherSuite, ProbeType, ProtocolVersion, ScanTarget, TestResults,
};

pub struct DtlsIpAddressInCookieProbe {
    timeout_ms: u64,
    version: ProtocolVersion,
    suites: Vec<CipherSuite>,
    result: TestResults,
}

impl DtlsIpAddressInCookieProbe {
    pub fn new(config: &ScannerConfig) -> Self {
        Self {
            timeout_ms: config.probe_timeout_ms,
            version: ProtocolVersion::Dtls12,
            suites: CipherSuite::for_version(ProtocolVersion::Dtls12),
            result: TestResults::CouldNotTest,
        }
    }
}

impl Probe for DtlsIpAddressInCookieProbe {
    fn probe_type(&self) -> ProbeType {
        ProbeType::DtlsIpAddressInCookie
    }

    fn registered_properties(&self) -> Vec<AnalyzedProperty> {
        vec![AnalyzedProperty::UsesIpAddressForCookie]
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
        let workflow = WorkflowSpec::new(WorkflowTraceType::DtlsCookieReuse, self.version)
            .with_cipher_suites(self.suites.clone())
            .with_timeout_ms(self.timeout_ms);
        let trace = run_workflow(engine, target, self.probe_type(), &workflow)?;
        self.result = if trace.did_receive(HandshakeMessage::HelloVerifyRequest) {
            TestResults::of(trace.received_server_hello())
        } else {
            TestResults::CouldNotTest
        };
        Ok(())
    }

    fn merge_data(&self, report: &mut ScanReport) -> Result<(), ReportError> {
        report.put_scalar(AnalyzedProperty::UsesIpAddressForCookie, self.result)
    }
}
