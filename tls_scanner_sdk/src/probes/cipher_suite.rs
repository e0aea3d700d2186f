//! Cipher suite enumeration
//!
//! For every supported version the probe offers all remaining suites, drops
//! the one the server picks and repeats until the server stops answering.

use super::common::run_workflow;
use tls_scanner_base::api::ScannerConfig;
use tls_scanner_base::engine::{ProtocolEngine, WorkflowSpec, WorkflowTraceType};
use tls_scanner_base::probe::{Probe, ProbeError};
use tls_scanner_base::report::{ReportError, ScanReport};
use tls_scanner_base::requirements::Requirement;
use tls_scanner_base::types::{
    AnalyzedProperty, CipherSuite, ProbeType, ProtocolVersion, ScanTarget, TestResults,
    VersionSuitePair,
};

pub struct CipherSuiteProbe {
    timeout_ms: u64,
    versions: Vec<ProtocolVersion>,
    supported: Option<Vec<(ProtocolVersion, Vec<CipherSuite>)>>,
}

impl CipherSuiteProbe {
    pub fn new(config: &ScannerConfig) -> Self {
        Self {
            timeout_ms: config.probe_timeout_ms,
            versions: Vec::new(),
            supported: None,
        }
    }

    fn enumerate(
        &self,
        engine: &dyn ProtocolEngine,
        target: &ScanTarget,
        version: ProtocolVersion,
    ) -> Result<Vec<CipherSuite>, ProbeError> {
        let mut remaining = CipherSuite::for_version(version);
        let mut found = Vec::new();

        while !remaining.is_empty() {
            let workflow = WorkflowSpec::new(WorkflowTraceType::Hello, version)
                .with_cipher_suites(remaining.clone())
                .with_timeout_ms(self.timeout_ms);
            let trace = run_workflow(engine, target, self.probe_type(), &workflow)?;
            if !trace.received_server_hello() || trace.negotiated.version != Some(version) {
                break;
            }
            match trace.negotiated.cipher_suite {
                Some(selected) if remaining.contains(&selected) => {
                    remaining.retain(|suite| *suite != selected);
                    found.push(selected);
                }
                _ => break,
            }
        }
        Ok(found)
    }

    /// Union over all versions, in first-seen order
    fn all_suites(&self) -> Vec<CipherSuite> {
        let mut all = Vec::new();
        for (_, suites) in self.supported.iter().flatten() {
            for suite in suites {
                if !all.contains(suite) {
                    all.push(*suite);
                }
            }
        }
        all
    }

    fn pairs(&self) -> Vec<VersionSuitePair> {
        self.supported
            .iter()
            .flatten()
            .flat_map(|(version, suites)| {
                suites
                    .iter()
                    .map(move |suite| VersionSuitePair::new(*version, *suite))
            })
            .collect()
    }
}

impl Probe for CipherSuiteProbe {
    fn probe_type(&self) -> ProbeType {
        ProbeType::CipherSuite
    }

    fn registered_properties(&self) -> Vec<AnalyzedProperty> {
        vec![
            AnalyzedProperty::SupportedCipherSuites,
            AnalyzedProperty::SupportedVersionSuitePairs,
            AnalyzedProperty::SupportsNullCiphers,
            AnalyzedProperty::SupportsAnon,
            AnalyzedProperty::SupportsExport,
            AnalyzedProperty::SupportsRc4,
            AnalyzedProperty::Supports3des,
            AnalyzedProperty::SupportsAead,
            AnalyzedProperty::SupportsPfs,
            AnalyzedProperty::SupportsOnlyPfs,
            AnalyzedProperty::SupportsEcdhe,
        ]
    }

    fn requirement(&self) -> Requirement {
        Requirement::probe_executed(ProbeType::ProtocolVersion)
    }

    fn adjust_config(&mut self, report: &ScanReport) {
        self.versions = report
            .supported_protocol_versions()
            .into_iter()
            .filter(|version| *version != ProtocolVersion::Ssl2)
            .collect();
    }

    fn execute_test(
        &mut self,
        engine: &dyn ProtocolEngine,
        target: &ScanTarget,
    ) -> Result<(), ProbeError> {
        if self.versions.is_empty() {
            return Ok(());
        }
        let mut supported = Vec::new();
        for version in &self.versions {
            supported.push((*version, self.enumerate(engine, target, *version)?));
        }
        self.supported = Some(supported);
        Ok(())
    }

    fn merge_data(&self, report: &mut ScanReport) -> Result<(), ReportError> {
        if self.supported.is_none() {
            return self.merge_could_not_execute(report, TestResults::CouldNotTest);
        }

        let suites = self.all_suites();
        let any = |predicate: fn(&CipherSuite) -> bool| TestResults::of(suites.iter().any(predicate));

        report.put_scalar(AnalyzedProperty::SupportsNullCiphers, any(CipherSuite::is_null))?;
        report.put_scalar(AnalyzedProperty::SupportsAnon, any(CipherSuite::is_anon))?;
        report.put_scalar(AnalyzedProperty::SupportsExport, any(CipherSuite::is_export))?;
        report.put_scalar(AnalyzedProperty::SupportsRc4, any(CipherSuite::is_rc4))?;
        report.put_scalar(AnalyzedProperty::Supports3des, any(CipherSuite::is_3des))?;
        report.put_scalar(AnalyzedProperty::SupportsAead, any(CipherSuite::is_aead))?;
        report.put_scalar(AnalyzedProperty::SupportsPfs, any(CipherSuite::is_ephemeral))?;
        report.put_scalar(
            AnalyzedProperty::SupportsOnlyPfs,
            TestResults::of(!suites.is_empty() && suites.iter().all(CipherSuite::is_ephemeral)),
        )?;
        report.put_scalar(AnalyzedProperty::SupportsEcdhe, any(CipherSuite::is_ecdhe))?;
        report.put_list(AnalyzedProperty::SupportedVersionSuitePairs, self.pairs())?;
        report.put_list(AnalyzedProperty::SupportedCipherSuites, suites)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ServerProfile;
    use crate::probes::common::test_support::{config, run_probe, scalar, target};
    use crate::probes::ProtocolVersionProbe;

    fn scan(profile: ServerProfile) -> ScanReport {
        let mut report = ScanReport::new(target());
        run_probe(
            &mut ProtocolVersionProbe::new(&config()),
            profile.clone(),
            &mut report,
        );
        run_probe(&mut CipherSuiteProbe::new(&config()), profile, &mut report);
        report
    }

    #[test]
    fn test_enumerates_in_server_order() {
        let report = scan(ServerProfile::legacy());

        assert_eq!(
            report.supported_cipher_suites(),
            vec![
                CipherSuite::TLS_RSA_WITH_RC4_128_SHA,
                CipherSuite::TLS_RSA_WITH_3DES_EDE_CBC_SHA,
                CipherSuite::TLS_RSA_EXPORT_WITH_RC4_40_MD5,
                CipherSuite::TLS_RSA_WITH_AES_128_CBC_SHA,
                CipherSuite::TLS_DHE_RSA_WITH_AES_128_CBC_SHA,
                CipherSuite::TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA,
            ]
        );
        assert_eq!(scalar(&report, AnalyzedProperty::SupportsRc4), Some(TestResults::True));
        assert_eq!(scalar(&report, AnalyzedProperty::SupportsExport), Some(TestResults::True));
        assert_eq!(scalar(&report, AnalyzedProperty::SupportsAead), Some(TestResults::False));
        assert_eq!(scalar(&report, AnalyzedProperty::SupportsOnlyPfs), Some(TestResults::False));
        assert_eq!(scalar(&report, AnalyzedProperty::SupportsEcdhe), Some(TestResults::True));
    }

    #[test]
    fn test_modern_server_only_pfs() {
        let report = scan(ServerProfile::modern());

        assert_eq!(report.supported_cipher_suites().len(), 7);
        assert_eq!(scalar(&report, AnalyzedProperty::SupportsOnlyPfs), Some(TestResults::True));
        assert_eq!(scalar(&report, AnalyzedProperty::SupportsRc4), Some(TestResults::False));
        assert_eq!(scalar(&report, AnalyzedProperty::SupportsAead), Some(TestResults::True));
    }

    #[test]
    fn test_pairs_record_version_of_each_suite() {
        let mut profile = ServerProfile {
            versions: vec![ProtocolVersion::Tls10, ProtocolVersion::Tls12],
            cipher_suites: vec![CipherSuite::TLS_RSA_WITH_AES_128_GCM_SHA256],
            ..ServerProfile::default()
        };
        profile.version_cipher_suites.insert(
            ProtocolVersion::Tls10,
            vec![CipherSuite::TLS_RSA_WITH_AES_128_CBC_SHA],
        );
        let report = scan(profile);

        let pairs = report
            .get_list_result(AnalyzedProperty::SupportedVersionSuitePairs)
            .unwrap()
            .unwrap()
            .version_suite_pairs();
        assert_eq!(
            pairs,
            vec![
                VersionSuitePair::new(
                    ProtocolVersion::Tls10,
                    CipherSuite::TLS_RSA_WITH_AES_128_CBC_SHA
                ),
                VersionSuitePair::new(
                    ProtocolVersion::Tls12,
                    CipherSuite::TLS_RSA_WITH_AES_128_GCM_SHA256
                ),
            ]
        );
        assert_eq!(report.supported_cipher_suites().len(), 2);
    }

    #[test]
    fn test_no_supported_version_could_not_test() {
        let mut report = ScanReport::new(target());
        let mut probe = CipherSuiteProbe::new(&config());
        run_probe(&mut probe, ServerProfile::modern(), &mut report);

        assert_eq!(
            scalar(&report, AnalyzedProperty::SupportsRc4),
            Some(TestResults::CouldNotTest)
        );
        assert!(report
            .get_list_result(AnalyzedProperty::SupportedCipherSuites)
            .unwrap()
            .unwrap()
            .is_absent());
        assert!(report
            .get_list_result(AnalyzedProperty::SupportedVersionSuitePairs)
            .unwrap()
            .unwrap()
            .is_absent());
    }
}
