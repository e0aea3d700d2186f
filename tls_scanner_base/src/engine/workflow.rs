//! Declarative workflow descriptions handed to the protocol engine

use crate::types::{
    CipherSuite, CompressionMethod, EcPointFormat, ProtocolVersion, SignatureAndHashAlgorithm,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default per-workflow timeout in milliseconds
pub const DEFAULT_WORKFLOW_TIMEOUT_MS: u64 = 1000;

/// DTLS handshake message_seq manipulation applied by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SequenceManipulation {
    /// First ClientHello carries a non-zero message_seq
    StartWithInvalidSequence,
    /// One sequence number is skipped before the second ClientHello
    SkipOnce,
    /// Several sequence numbers are skipped
    SkipMultiple,
    /// message_seq values are randomised
    Random,
}

/// Shape of the message exchange the engine should run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowTraceType {
    /// ClientHello until ServerHelloDone (or the TLS 1.3 equivalent)
    Hello,
    FullHandshake,
    Ssl2Hello,
    /// ChangeCipherSpec sent before the key exchange completes
    EarlyChangeCipherSpec,
    /// ClientHello at a lowered version carrying TLS_FALLBACK_SCSV
    FallbackScsv,
    /// Full handshake followed by a renegotiation carrying renegotiation_info
    SecureRenegotiation,
    /// Full handshake followed by a renegotiation without renegotiation_info
    InsecureRenegotiation,
    DtlsMessageSequence(SequenceManipulation),
    /// ClientHello answered by HelloVerifyRequest, then the ClientHello is
    /// resent with the received cookie from a different source port
    DtlsCookieReuse,
}

impl fmt::Display for WorkflowTraceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowTraceType::Hello => f.write_str("HELLO"),
            WorkflowTraceType::FullHandshake => f.write_str("FULL_HANDSHAKE"),
            WorkflowTraceType::Ssl2Hello => f.write_str("SSL2_HELLO"),
            WorkflowTraceType::EarlyChangeCipherSpec => f.write_str("EARLY_CHANGE_CIPHER_SPEC"),
            WorkflowTraceType::FallbackScsv => f.write_str("FALLBACK_SCSV"),
            WorkflowTraceType::SecureRenegotiation => f.write_str("SECURE_RENEGOTIATION"),
            WorkflowTraceType::InsecureRenegotiation => f.write_str("INSECURE_RENEGOTIATION"),
            WorkflowTraceType::DtlsMessageSequence(manipulation) => {
                write!(f, "DTLS_MESSAGE_SEQUENCE({:?})", manipulation)
            }
            WorkflowTraceType::DtlsCookieReuse => f.write_str("DTLS_COOKIE_REUSE"),
        }
    }
}

/// Everything the engine needs to run one connection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSpec {
    pub trace_type: WorkflowTraceType,
    pub highest_version: ProtocolVersion,
    pub cipher_suites: Vec<CipherSuite>,
    pub compression_methods: Vec<CompressionMethod>,
    pub signature_and_hash_algorithms: Vec<SignatureAndHashAlgorithm>,
    pub point_formats: Vec<EcPointFormat>,
    /// Send the server_name extension naming the target host
    pub include_server_name: bool,
    pub timeout_ms: u64,
}

impl WorkflowSpec {
    /// Workflow offering every suite valid for `highest_version`
    pub fn new(trace_type: WorkflowTraceType, highest_version: ProtocolVersion) -> Self {
        Self {
            trace_type,
            highest_version,
            cipher_suites: CipherSuite::for_version(highest_version),
            compression_methods: vec![CompressionMethod::Null],
            signature_and_hash_algorithms: SignatureAndHashAlgorithm::ALL.to_vec(),
            point_formats: vec![EcPointFormat::Uncompressed],
            include_server_name: true,
            timeout_ms: DEFAULT_WORKFLOW_TIMEOUT_MS,
        }
    }

    pub fn with_cipher_suites(mut self, suites: Vec<CipherSuite>) -> Self {
        self.cipher_suites = suites;
        self
    }

    pub fn with_compression_methods(mut self, methods: Vec<CompressionMethod>) -> Self {
        self.compression_methods = methods;
        self
    }

    pub fn with_signature_and_hash_algorithms(
        mut self,
        algorithms: Vec<SignatureAndHashAlgorithm>,
    ) -> Self {
        self.signature_and_hash_algorithms = algorithms;
        self
    }

    pub fn with_point_formats(mut self, formats: Vec<EcPointFormat>) -> Self {
        self.point_formats = formats;
        self
    }

    pub fn without_server_name(mut self) -> Self {
        self.include_server_name = false;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn offers_suite(&self, suite: CipherSuite) -> bool {
        self.cipher_suites.contains(&suite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_offers_version_suites() {
        let spec = WorkflowSpec::new(WorkflowTraceType::Hello, ProtocolVersion::Tls13);
        assert!(spec.cipher_suites.iter().all(CipherSuite::is_tls13));
        assert_eq!(spec.compression_methods, vec![CompressionMethod::Null]);
        assert_eq!(spec.timeout_ms, DEFAULT_WORKFLOW_TIMEOUT_MS);
        assert!(spec.include_server_name);
    }

    #[test]
    fn test_builders() {
        let spec = WorkflowSpec::new(WorkflowTraceType::FallbackScsv, ProtocolVersion::Tls11)
            .with_cipher_suites(vec![CipherSuite::TLS_FALLBACK_SCSV])
            .with_timeout_ms(250);
        assert!(spec.offers_suite(CipherSuite::TLS_FALLBACK_SCSV));
        assert_eq!(spec.timeout_ms, 250);
        assert_eq!(spec.trace_type.to_string(), "FALLBACK_SCSV");

        let spec = WorkflowSpec::new(WorkflowTraceType::Hello, ProtocolVersion::Tls12)
            .without_server_name();
        assert!(!spec.include_server_name);
    }
}
