//! TLS guideline checks and the built-in guideline

pub mod cipher_suite;
pub mod protocol_version;
pub mod signature_algorithms;
pub mod signature_and_hash;

pub use cipher_suite::CipherSuiteGuidelineCheck;
pub use protocol_version::ProtocolVersionGuidelineCheck;
pub use signature_algorithms::SignatureAlgorithmsGuidelineCheck;
pub use signature_and_hash::SignatureAndHashAlgorithmsGuidelineCheck;

use tls_scanner_base::guideline::{AnalyzedPropertyGuidelineCheck, Guideline, RequirementLevel};
use tls_scanner_base::types::{
    AnalyzedProperty, CipherSuite, ProtocolVersion, SignatureAlgorithm,
    SignatureAndHashAlgorithm, TestResults,
};

pub const DEFAULT_GUIDELINE_NAME: &str = "TLS server baseline";

fn property(
    name: &str,
    level: RequirementLevel,
    property: AnalyzedProperty,
    expected: TestResults,
) -> Box<AnalyzedPropertyGuidelineCheck> {
    Box::new(AnalyzedPropertyGuidelineCheck::new(name, level, property, expected))
}

/// Baseline for modern servers: TLS 1.2+, AEAD with forward secrecy,
/// no compression and safe renegotiation.
pub fn default_guideline() -> Guideline {
    use RequirementLevel::*;

    Guideline::new(DEFAULT_GUIDELINE_NAME)
        .with_check(Box::new(ProtocolVersionGuidelineCheck::new(
            "Only TLS 1.2, TLS 1.3 or DTLS 1.2",
            Must,
            vec![
                ProtocolVersion::Tls12,
                ProtocolVersion::Tls13,
                ProtocolVersion::Dtls12,
            ],
        )))
        .with_check(Box::new(CipherSuiteGuidelineCheck::new(
            "AEAD cipher suites with forward secrecy",
            Should,
            vec![
                CipherSuite::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,
                CipherSuite::TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384,
                CipherSuite::TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256,
                CipherSuite::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256,
                CipherSuite::TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384,
                CipherSuite::TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256,
                CipherSuite::TLS_DHE_RSA_WITH_AES_128_GCM_SHA256,
                CipherSuite::TLS_DHE_RSA_WITH_AES_256_GCM_SHA384,
            ],
            vec![ProtocolVersion::Tls12, ProtocolVersion::Dtls12],
        )))
        .with_check(Box::new(CipherSuiteGuidelineCheck::new(
            "TLS 1.3 cipher suites",
            Must,
            vec![
                CipherSuite::TLS_AES_128_GCM_SHA256,
                CipherSuite::TLS_AES_256_GCM_SHA384,
                CipherSuite::TLS_CHACHA20_POLY1305_SHA256,
            ],
            vec![ProtocolVersion::Tls13],
        )))
        .with_check(Box::new(SignatureAlgorithmsGuidelineCheck::new(
            "No DSA signatures",
            Must,
            vec![
                SignatureAlgorithm::Rsa,
                SignatureAlgorithm::Ecdsa,
                SignatureAlgorithm::RsaPss,
                SignatureAlgorithm::Ed25519,
            ],
        )))
        .with_check(Box::new(SignatureAndHashAlgorithmsGuidelineCheck::new(
            "SHA-2 signature and hash algorithms",
            Should,
            vec![
                SignatureAndHashAlgorithm::RsaSha256,
                SignatureAndHashAlgorithm::RsaSha384,
                SignatureAndHashAlgorithm::RsaSha512,
                SignatureAndHashAlgorithm::EcdsaSha256,
                SignatureAndHashAlgorithm::EcdsaSha384,
                SignatureAndHashAlgorithm::EcdsaSha512,
                SignatureAndHashAlgorithm::RsaPssRsaeSha256,
                SignatureAndHashAlgorithm::RsaPssRsaeSha384,
                SignatureAndHashAlgorithm::RsaPssRsaeSha512,
                SignatureAndHashAlgorithm::Ed25519,
            ],
            false,
        )))
        .with_check(Box::new(SignatureAndHashAlgorithmsGuidelineCheck::new(
            "TLS 1.3 signature schemes",
            Must,
            vec![
                SignatureAndHashAlgorithm::EcdsaSha256,
                SignatureAndHashAlgorithm::EcdsaSha384,
                SignatureAndHashAlgorithm::EcdsaSha512,
                SignatureAndHashAlgorithm::RsaPssRsaeSha256,
                SignatureAndHashAlgorithm::RsaPssRsaeSha384,
                SignatureAndHashAlgorithm::RsaPssRsaeSha512,
                SignatureAndHashAlgorithm::Ed25519,
            ],
            true,
        )))
        .with_check(property(
            "TLS compression disabled",
            MustNot,
            AnalyzedProperty::SupportsTlsCompression,
            TestResults::False,
        ))
        .with_check(property(
            "Secure renegotiation extension",
            Must,
            AnalyzedProperty::SupportsSecureRenegotiationExtension,
            TestResults::True,
        ))
        .with_check(property(
            "No insecure client renegotiation",
            MustNot,
            AnalyzedProperty::SupportsClientSideInsecureRenegotiation,
            TestResults::False,
        ))
        .with_check(property(
            "TLS_FALLBACK_SCSV honoured",
            Should,
            AnalyzedProperty::SupportsTlsFallbackScsv,
            TestResults::True,
        ))
        .with_check(property(
            "Not vulnerable to early CCS",
            MustNot,
            AnalyzedProperty::VulnerableToEarlyCcs,
            TestResults::False,
        ))
        .with_check(property(
            "DTLS message sequence checks",
            Must,
            AnalyzedProperty::MissesMessageSequenceChecks,
            TestResults::False,
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tls_scanner_base::report::ScanReport;
    use tls_scanner_base::types::ScanTarget;

    #[test]
    fn test_default_guideline_has_unique_checks() {
        let guideline = default_guideline();
        assert_eq!(guideline.len(), 12);
        assert_eq!(guideline.name(), DEFAULT_GUIDELINE_NAME);
    }

    #[test]
    fn test_empty_report_is_all_uncertain() {
        let report = ScanReport::new(ScanTarget::new("localhost", 443));
        let guideline_report = default_guideline().evaluate(&report);
        assert_eq!(guideline_report.uncertain().len(), 12);
        assert!(!guideline_report.has_failures());
    }
}
