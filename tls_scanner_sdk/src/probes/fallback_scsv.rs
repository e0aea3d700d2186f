//! TLS_FALLBACK_SCSV downgrade protection
//!
//! Connects with the second-highest supported version and the fallback
//! signalling suite. A protected server answers with inappropriate_fallback.

use super::common::{run_workflow, suites_for};
use tls_scanner_base::api::ScannerConfig;
use tls_scanner_base::engine::{AlertDescription, ProtocolEngine, WorkflowSpec, WorkflowTraceType};
use tls_scanner_base::probe::{Probe, ProbeError};
use tls_scanner_base::report::{ReportError, ScanReport};
use tls_scanner_base::requirements::Requirement;
use tls_scanner_base::types::{
    AnalyzedProperty, CipherSuite, ProbeType, ProtocolVersion, ScanTarget, TestResults,
};

pub struct TlsFallbackScsvProbe {
    timeout_ms: u64,
    /// Version and suites for the downgraded connection
    fallback: Option<(ProtocolVersion, Vec<CipherSuite>)>,
    result: TestResults,
}

impl TlsFallbackScsvProbe {
    pub fn new(config: &ScannerConfig) -> Self {
        Self {
            timeout_ms: config.probe_timeout_ms,
            fallback: None,
            result: TestResults::CouldNotTest,
        }
    }
}

impl Probe for TlsFallbackScsvProbe {
    fn probe_type(&self) -> ProbeType {
        ProbeType::TlsFallbackScsv
    }

    fn registered_properties(&self) -> Vec<AnalyzedProperty> {
        vec![AnalyzedProperty::SupportsTlsFallbackScsv]
    }

    fn requirement(&self) -> Requirement {
        Requirement::probe_executed(ProbeType::ProtocolVersion)
    }

    fn adjust_config(&mut self, report: &ScanReport) {
        let versions: Vec<ProtocolVersion> = report
            .supported_protocol_versions()
            .into_iter()
            .filter(|version| *version != ProtocolVersion::Ssl2)
            .collect();
        self.fallback = versions.len().checked_sub(2).map(|index| {
            let version = versions[index];
            (version, suites_for(report, version))
        });
    }

    fn execute_test(
        &mut self,
        engine: &dyn ProtocolEngine,
        target: &ScanTarget,
    ) -> Result<(), ProbeError> {
        let Some((version, suites)) = &self.fallback else {
            return Ok(());
        };

        let mut offered = suites.clone();
        offered.push(CipherSuite::TLS_FALLBACK_SCSV);
        let workflow = WorkflowSpec::new(WorkflowTraceType::FallbackScsv, *version)
            .with_cipher_suites(offered)
            .with_timeout_ms(self.timeout_ms);
        let trace = run_workflow(engine, target, self.probe_type(), &workflow)?;

        self.result = if trace.did_receive_alert(AlertDescription::InappropriateFallback) {
            TestResults::True
        } else if trace.received_server_hello() {
            TestResults::False
        } else {
            TestResults::Uncertain
        };
        Ok(())
    }

    fn merge_data(&self, report: &mut ScanReport) -> Result<(), ReportError> {
        report.put_scalar(AnalyzedProperty::SupportsTlsFallbackScsv, self.result)
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
        run_probe(&mut TlsFallbackScsvProbe::new(&config()), profile, &mut report);
        scalar(&report, AnalyzedProperty::SupportsTlsFallbackScsv)
    }

    #[test]
    fn test_protected_server() {
        assert_eq!(scan(ServerProfile::modern()), Some(TestResults::True));
    }

    #[test]
    fn test_unprotected_server() {
        assert_eq!(scan(ServerProfile::legacy()), Some(TestResults::False));
    }

    #[test]
    fn test_single_version_could_not_test() {
        let profile = ServerProfile {
            versions: vec![ProtocolVersion::Tls12],
            ..ServerProfile::modern()
        };
        assert_eq!(scan(profile), Some(TestResults::CouldNotTest));
    }
}
