//! Server profiles
//!
//! Declarative description of a TLS server's configuration, loaded from JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tls_scanner_base::engine::{SequenceManipulation, WorkflowTraceType};
use tls_scanner_base::types::{
    CertificateKeyType, CipherSuite, CompressionMethod, EcPointFormat, ProtocolVersion,
    ServerCertificate, SignatureAndHashAlgorithm,
};

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("Failed to read profile '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse profile: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid profile: {reason}")]
    Invalid { reason: String },
}

/// Which manipulated DTLS message sequences the server still answers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DtlsSequenceHandling {
    pub accepts_invalid_start: bool,
    pub accepts_skip_once: bool,
    pub accepts_skip_multiple: bool,
    pub accepts_random: bool,
}

impl DtlsSequenceHandling {
    pub fn accepts(&self, manipulation: SequenceManipulation) -> bool {
        match manipulation {
            SequenceManipulation::StartWithInvalidSequence => self.accepts_invalid_start,
            SequenceManipulation::SkipOnce => self.accepts_skip_once,
            SequenceManipulation::SkipMultiple => self.accepts_skip_multiple,
            SequenceManipulation::Random => self.accepts_random,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerProfile {
    pub name: String,
    pub versions: Vec<ProtocolVersion>,

    /// Suites in server preference order
    pub cipher_suites: Vec<CipherSuite>,
    /// Per-version replacements for `cipher_suites`
    pub version_cipher_suites: BTreeMap<ProtocolVersion, Vec<CipherSuite>>,

    pub compression_methods: Vec<CompressionMethod>,
    pub point_formats: Vec<EcPointFormat>,
    /// Accepts a TLS 1.3 hello offering only compressed secp points
    pub tls13_secp_compression: bool,
    /// One certificate per key type, in preference order
    pub certificates: Vec<ServerCertificate>,
    pub ske_signature_algorithms: Vec<SignatureAndHashAlgorithm>,
    pub tls13_signature_algorithms: Vec<SignatureAndHashAlgorithm>,

    pub supports_fallback_scsv: bool,
    pub secure_renegotiation: bool,
    /// Accepts client-initiated renegotiation with renegotiation_info
    pub client_renegotiation: bool,
    /// Accepts client-initiated renegotiation without renegotiation_info
    pub insecure_renegotiation: bool,
    pub vulnerable_to_early_ccs: bool,
    pub respects_signature_algorithms_extension: bool,
    pub dtls_sequence: DtlsSequenceHandling,
    /// Cookie binds only the client address, so a new source port may reuse it
    pub dtls_cookie_ip_only: bool,
    /// Abort hellos without a server_name extension
    pub requires_sni: bool,

    /// Refuse every connection
    pub unreachable: bool,

    /// Workflows that time out instead of completing
    pub failing_workflows: Vec<WorkflowTraceType>,
}

impl Default for ServerProfile {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            versions: Vec::new(),
            cipher_suites: Vec::new(),
            version_cipher_suites: BTreeMap::new(),
            compression_methods: vec![CompressionMethod::Null],
            point_formats: vec![EcPointFormat::Uncompressed],
            tls13_secp_compression: false,
            certificates: vec![ServerCertificate::new(
                CertificateKeyType::Rsa,
                SignatureAndHashAlgorithm::RsaSha256,
            )],
            ske_signature_algorithms: Vec::new(),
            tls13_signature_algorithms: Vec::new(),
            supports_fallback_scsv: false,
            secure_renegotiation: false,
            client_renegotiation: false,
            insecure_renegotiation: false,
            vulnerable_to_early_ccs: false,
            respects_signature_algorithms_extension: true,
            dtls_sequence: DtlsSequenceHandling::default(),
            dtls_cookie_ip_only: false,
            requires_sni: false,
            unreachable: false,
            failing_workflows: Vec::new(),
        }
    }
}

impl ServerProfile {
    pub fn from_json(input: &str) -> Result<Self, ProfileError> {
        let profile: ServerProfile = serde_json::from_str(input)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ProfileError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.versions.iter().any(ProtocolVersion::is_dtls)
            && self.versions.iter().any(|v| !v.is_dtls())
        {
            return Err(ProfileError::Invalid {
                reason: "a profile cannot mix TLS and DTLS versions".to_string(),
            });
        }
        let mut suites = self
            .cipher_suites
            .iter()
            .chain(self.version_cipher_suites.values().flatten());
        if let Some(scsv) = suites.find(|suite| suite.is_scsv()) {
            return Err(ProfileError::Invalid {
                reason: format!("{} is not a negotiable cipher suite", scsv),
            });
        }
        Ok(())
    }

    /// Hardened TLS 1.2/1.3 server
    pub fn modern() -> Self {
        Self {
            name: "modern".to_string(),
            versions: vec![ProtocolVersion::Tls12, ProtocolVersion::Tls13],
            cipher_suites: vec![
                CipherSuite::TLS_AES_128_GCM_SHA256,
                CipherSuite::TLS_AES_256_GCM_SHA384,
                CipherSuite::TLS_CHACHA20_POLY1305_SHA256,
                CipherSuite::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256,
                CipherSuite::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256,
                CipherSuite::TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384,
                CipherSuite::TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256,
            ],
            certificates: vec![
                ServerCertificate::new(
                    CertificateKeyType::Rsa,
                    SignatureAndHashAlgorithm::RsaSha256,
                ),
                ServerCertificate::new(
                    CertificateKeyType::Ecdsa,
                    SignatureAndHashAlgorithm::EcdsaSha256,
                ),
            ],
            ske_signature_algorithms: vec![
                SignatureAndHashAlgorithm::RsaPssRsaeSha256,
                SignatureAndHashAlgorithm::RsaSha256,
                SignatureAndHashAlgorithm::RsaSha384,
            ],
            tls13_signature_algorithms: vec![
                SignatureAndHashAlgorithm::RsaPssRsaeSha256,
                SignatureAndHashAlgorithm::RsaPssRsaeSha384,
            ],
            supports_fallback_scsv: true,
            secure_renegotiation: true,
            ..Self::default()
        }
    }

    /// Outdated server with weak suites and insecure behaviour
    pub fn legacy() -> Self {
        Self {
            name: "legacy".to_string(),
            versions: vec![
                ProtocolVersion::Ssl3,
                ProtocolVersion::Tls10,
                ProtocolVersion::Tls11,
                ProtocolVersion::Tls12,
            ],
            cipher_suites: vec![
                CipherSuite::TLS_RSA_WITH_RC4_128_SHA,
                CipherSuite::TLS_RSA_WITH_3DES_EDE_CBC_SHA,
                CipherSuite::TLS_RSA_EXPORT_WITH_RC4_40_MD5,
                CipherSuite::TLS_RSA_WITH_AES_128_CBC_SHA,
                CipherSuite::TLS_DHE_RSA_WITH_AES_128_CBC_SHA,
                CipherSuite::TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA,
            ],
            compression_methods: vec![CompressionMethod::Deflate, CompressionMethod::Null],
            point_formats: vec![
                EcPointFormat::Uncompressed,
                EcPointFormat::AnsiX962CompressedPrime,
            ],
            certificates: vec![ServerCertificate::new(
                CertificateKeyType::Rsa,
                SignatureAndHashAlgorithm::RsaSha1,
            )],
            ske_signature_algorithms: vec![
                SignatureAndHashAlgorithm::RsaSha1,
                SignatureAndHashAlgorithm::RsaMd5,
            ],
            insecure_renegotiation: true,
            vulnerable_to_early_ccs: true,
            respects_signature_algorithms_extension: false,
            ..Self::default()
        }
    }

    /// Suites offered under `version`, in preference order
    pub fn cipher_suites_for(&self, version: ProtocolVersion) -> &[CipherSuite] {
        self.version_cipher_suites
            .get(&version)
            .unwrap_or(&self.cipher_suites)
    }

    /// Certificate presented for a TLS 1.2 and earlier `suite`
    pub fn certificate_for(&self, suite: CipherSuite) -> Option<ServerCertificate> {
        let key_type = suite.certificate_key_type()?;
        self.certificates
            .iter()
            .copied()
            .find(|certificate| certificate.key_type == key_type)
    }

    /// Anonymous and TLS 1.3 suites need no certificate of a particular key type
    pub fn can_serve(&self, suite: CipherSuite) -> bool {
        suite.certificate_key_type().is_none() || self.certificate_for(suite).is_some()
    }

    pub fn supports(&self, version: ProtocolVersion) -> bool {
        self.versions.contains(&version)
    }

    /// Highest supported version of the same family not above `offered`
    ///
    /// SSL 2 uses its own hello format and is never selected here.
    pub fn select_version(&self, offered: ProtocolVersion) -> Option<ProtocolVersion> {
        self.versions
            .iter()
            .copied()
            .filter(|v| *v != ProtocolVersion::Ssl2)
            .filter(|v| v.is_dtls() == offered.is_dtls() && *v <= offered)
            .max()
    }

    pub fn highest_version(&self) -> Option<ProtocolVersion> {
        self.versions
            .iter()
            .copied()
            .filter(|v| *v != ProtocolVersion::Ssl2)
            .max()
    }
}
