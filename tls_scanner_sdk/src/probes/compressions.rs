//! TLS compression support (CRIME)

use super::common::{baseline_version, run_workflow};
use tls_scanner_base::api::ScannerConfig;
use tls_scanner_base::engine::{ProtocolEngine, WorkflowSpec, WorkflowTraceType};
use tls_scanner_base::probe::{Probe, ProbeError};
use tls_scanner_base::report::{ReportError, ScanReport};
use tls_scanner_base::types::{
    AnalyzedProperty, CompressionMethod, ProbeType, ProtocolVersion, ScanTarget, TestResults,
};

pub struct CompressionsProbe {
    version: ProtocolVersion,
    timeout_ms: u64,
    methods: Option<Vec<CompressionMethod>>,
}

impl CompressionsProbe {
    pub fn new(config: &ScannerConfig) -> Self {
        Self {
            version: baseline_version(config.dtls),
            timeout_ms: config.probe_timeout_ms,
            methods: None,
        }
    }
}

impl Probe for CompressionsProbe {
    fn probe_type(&self) -> ProbeType {
        ProbeType::Compressions
    }

    fn registered_properties(&self) -> Vec<AnalyzedProperty> {
        vec![
            AnalyzedProperty::SupportedCompressionMethods,
            AnalyzedProperty::SupportsTlsCompression,
            AnalyzedProperty::VulnerableToCrime,
        ]
    }

    fn execute_test(
        &mut self,
        engine: &dyn ProtocolEngine,
        target: &ScanTarget,
    ) -> Result<(), ProbeError> {
        let mut remaining = CompressionMethod::ALL.to_vec();
        let mut found = Vec::new();
        let mut answered = false;

        while !remaining.is_empty() {
            let workflow = WorkflowSpec::new(WorkflowTraceType::Hello, self.version)
                .with_compression_methods(remaining.clone())
                .with_timeout_ms(self.timeout_ms);
            let trace = run_workflow(engine, target, self.probe_type(), &workflow)?;
            if !trace.received_server_hello() {
                break;
            }
            answered = true;
            match trace.negotiated.compression_method {
                Some(selected) if remaining.contains(&selected) => {
                    remaining.retain(|method| *method != selected);
                    found.push(selected);
                }
                _ => break,
            }
        }

        // No handshake at this version at all tells us nothing
        self.methods = answered.then_some(found);
        Ok(())
    }

    fn merge_data(&self, report: &mut ScanReport) -> Result<(), ReportError> {
        let Some(methods) = &self.methods else {
            return self.merge_could_not_execute(report, TestResults::CouldNotTest);
        };
        let compresses = TestResults::of(
            methods
                .iter()
                .any(|method| *method != CompressionMethod::Null),
        );
        report.put_scalar(AnalyzedProperty::SupportsTlsCompression, compresses)?;
        report.put_scalar(AnalyzedProperty::VulnerableToCrime, compresses)?;
        report.put_list(
            AnalyzedProperty::SupportedCompressionMethods,
            methods.iter().copied(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ServerProfile;
    use crate::probes::common::test_support::{config, run_probe, scalar, target};

    #[test]
    fn test_deflate_is_vulnerable_to_crime() {
        let mut report = ScanReport::new(target());
        run_probe(
            &mut CompressionsProbe::new(&config()),
            ServerProfile::legacy(),
            &mut report,
        );

        assert_eq!(
            scalar(&report, AnalyzedProperty::VulnerableToCrime),
            Some(TestResults::True)
        );
        let list = report
            .get_list_result(AnalyzedProperty::SupportedCompressionMethods)
            .unwrap()
            .unwrap();
        assert_eq!(list.list().map(<[_]>::len), Some(2));
    }

    #[test]
    fn test_null_only() {
        let mut report = ScanReport::new(target());
        run_probe(
            &mut CompressionsProbe::new(&config()),
            ServerProfile::modern(),
            &mut report,
        );

        assert_eq!(
            scalar(&report, AnalyzedProperty::SupportsTlsCompression),
            Some(TestResults::False)
        );
    }

    #[test]
    fn test_no_handshake_could_not_test() {
        let tls13_only = ServerProfile {
            versions: vec![ProtocolVersion::Tls13],
            ..ServerProfile::modern()
        };
        let mut report = ScanReport::new(target());
        run_probe(&mut CompressionsProbe::new(&config()), tls13_only, &mut report);

        assert_eq!(
            scalar(&report, AnalyzedProperty::VulnerableToCrime),
            Some(TestResults::CouldNotTest)
        );
    }
}
