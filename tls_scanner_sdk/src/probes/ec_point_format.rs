//! Elliptic curve point format support

use super::common::{highest_supported, run_workflow};
use tls_scanner_base::api::ScannerConfig;
use tls_scanner_base::engine::{ProtocolEngine, WorkflowSpec, WorkflowTraceType};
use tls_scanner_base::probe::{Probe, ProbeError};
use tls_scanner_base::report::{ReportError, ScanReport};
use tls_scanner_base::requirements::Requirement;
use tls_scanner_base::types::{
    AnalyzedProperty, CipherSuite, EcPointFormat, ProbeType, ProtocolVersion, ScanTarget,
    TestResults,
};

pub struct EcPointFormatProbe {
    timeout_ms: u64,
    /// ECDHE handshake below TLS 1.3 with the given suites
    legacy: Option<(ProtocolVersion, Vec<CipherSuite>)>,
    test_tls13: bool,
    formats: Option<Vec<EcPointFormat>>,
    tls13_secp_compression: Option<TestResults>,
}

impl EcPointFormatProbe {
    pub fn new(config: &ScannerConfig) -> Self {
        Self {
            timeout_ms: config.probe_timeout_ms,
            legacy: None,
            test_tls13: false,
            formats: None,
            tls13_secp_compression: None,
        }
    }

    fn supported_formats(
        &self,
        engine: &dyn ProtocolEngine,
        target: &ScanTarget,
        version: ProtocolVersion,
        suites: &[CipherSuite],
    ) -> Result<Vec<EcPointFormat>, ProbeError> {
        let mut formats = Vec::new();
        for format in EcPointFormat::ALL {
            let workflow = WorkflowSpec::new(WorkflowTraceType::Hello, version)
                .with_cipher_suites(suites.to_vec())
                .with_point_formats(vec![format])
                .with_timeout_ms(self.timeout_ms);
            let trace = run_workflow(engine, target, self.probe_type(), &workflow)?;
            if trace.received_server_hello() {
                formats.push(format);
            }
        }
        Ok(formats)
    }

    /// TLS 1.3 hello offering only compressed secp points
    fn check_tls13_secp_compression(
        &self,
        engine: &dyn ProtocolEngine,
        target: &ScanTarget,
    ) -> Result<TestResults, ProbeError> {
        let workflow = WorkflowSpec::new(WorkflowTraceType::Hello, ProtocolVersion::Tls13)
            .with_point_formats(vec![EcPointFormat::AnsiX962CompressedPrime])
            .with_timeout_ms(self.timeout_ms);
        let trace = run_workflow(engine, target, self.probe_type(), &workflow)?;
        Ok(TestResults::of(
            trace.received_server_hello()
                && trace.negotiated.version == Some(ProtocolVersion::Tls13),
        ))
    }
}

impl Probe for EcPointFormatProbe {
    fn probe_type(&self) -> ProbeType {
        ProbeType::EcPointFormat
    }

    fn registered_properties(&self) -> Vec<AnalyzedProperty> {
        vec![
            AnalyzedProperty::SupportedPointFormats,
            AnalyzedProperty::SupportsUncompressedPoint,
            AnalyzedProperty::SupportsAnsiX962CompressedPrime,
            AnalyzedProperty::SupportsAnsiX962CompressedChar2,
            AnalyzedProperty::SupportsTls13SecpCompression,
        ]
    }

    fn requirement(&self) -> Requirement {
        Requirement::probe_executed(ProbeType::ProtocolVersion).and(
            Requirement::property_true([AnalyzedProperty::SupportsEcdhe])
                .or(Requirement::property_true([AnalyzedProperty::SupportsTls13])),
        )
    }

    fn adjust_config(&mut self, report: &ScanReport) {
        let ecdhe_suites: Vec<CipherSuite> = report
            .supported_cipher_suites()
            .into_iter()
            .filter(CipherSuite::is_ecdhe)
            .collect();
        let legacy = highest_supported(report, |version| {
            !version.is_tls13()
                && !version.is_ssl()
                && ecdhe_suites.iter().any(|suite| suite.is_supported_in(*version))
        });

        self.legacy = legacy.map(|version| {
            let suites = ecdhe_suites
                .iter()
                .copied()
                .filter(|suite| suite.is_supported_in(version))
                .collect();
            (version, suites)
        });
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
            self.formats = Some(self.supported_formats(engine, target, *version, suites)?);
        }
        if self.test_tls13 {
            self.tls13_secp_compression = Some(self.check_tls13_secp_compression(engine, target)?);
        }
        Ok(())
    }

    fn merge_data(&self, report: &mut ScanReport) -> Result<(), ReportError> {
        if self.formats.is_none() && self.tls13_secp_compression.is_none() {
            return self.merge_could_not_execute(report, TestResults::CouldNotTest);
        }
        report.put_scalar(
            AnalyzedProperty::SupportsTls13SecpCompression,
            self.tls13_secp_compression.unwrap_or(TestResults::CouldNotTest),
        )?;

        let Some(formats) = &self.formats else {
            for property in [
                AnalyzedProperty::SupportsUncompressedPoint,
                AnalyzedProperty::SupportsAnsiX962CompressedPrime,
                AnalyzedProperty::SupportsAnsiX962CompressedChar2,
            ] {
                report.put_scalar(property, TestResults::CouldNotTest)?;
            }
            return report.put_absent_list(AnalyzedProperty::SupportedPointFormats);
        };
        let supports = |format| TestResults::of(formats.contains(&format));
        report.put_scalar(
            AnalyzedProperty::SupportsUncompressedPoint,
            supports(EcPointFormat::Uncompressed),
        )?;
        report.put_scalar(
            AnalyzedProperty::SupportsAnsiX962CompressedPrime,
            supports(EcPointFormat::AnsiX962CompressedPrime),
        )?;
        report.put_scalar(
            AnalyzedProperty::SupportsAnsiX962CompressedChar2,
            supports(EcPointFormat::AnsiX962CompressedChar2),
        )?;
        report.put_list(AnalyzedProperty::SupportedPointFormats, formats.iter().copied())
    }
}
