//! TLS protocol value types
//!
//! Closed sets of the protocol parameters the scanner reasons about. Only the
//! classification needed to build workflows and interpret traces lives here.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// PROTOCOL VERSIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProtocolVersion {
    #[serde(rename = "SSL2")]
    Ssl2,
    #[serde(rename = "SSL3")]
    Ssl3,
    #[serde(rename = "TLS10")]
    Tls10,
    #[serde(rename = "TLS11")]
    Tls11,
    #[serde(rename = "TLS12")]
    Tls12,
    #[serde(rename = "TLS13")]
    Tls13,
    #[serde(rename = "DTLS10")]
    Dtls10,
    #[serde(rename = "DTLS12")]
    Dtls12,
}

impl ProtocolVersion {
    /// Stream protocol versions, oldest first
    pub const TLS: [ProtocolVersion; 6] = [
        ProtocolVersion::Ssl2,
        ProtocolVersion::Ssl3,
        ProtocolVersion::Tls10,
        ProtocolVersion::Tls11,
        ProtocolVersion::Tls12,
        ProtocolVersion::Tls13,
    ];

    /// Datagram protocol versions, oldest first
    pub const DTLS: [ProtocolVersion; 2] = [ProtocolVersion::Dtls10, ProtocolVersion::Dtls12];

    pub fn name(&self) -> &'static str {
        match self {
            ProtocolVersion::Ssl2 => "SSL2",
            ProtocolVersion::Ssl3 => "SSL3",
            ProtocolVersion::Tls10 => "TLS10",
            ProtocolVersion::Tls11 => "TLS11",
            ProtocolVersion::Tls12 => "TLS12",
            ProtocolVersion::Tls13 => "TLS13",
            ProtocolVersion::Dtls10 => "DTLS10",
            ProtocolVersion::Dtls12 => "DTLS12",
        }
    }

    pub fn is_dtls(&self) -> bool {
        matches!(self, ProtocolVersion::Dtls10 | ProtocolVersion::Dtls12)
    }

    pub fn is_ssl(&self) -> bool {
        matches!(self, ProtocolVersion::Ssl2 | ProtocolVersion::Ssl3)
    }

    pub fn is_tls13(&self) -> bool {
        matches!(self, ProtocolVersion::Tls13)
    }

    /// Versions that negotiate the TLS 1.2 record layer features (AEAD, SHA-2 PRF)
    pub fn is_tls12_or_dtls12(&self) -> bool {
        matches!(self, ProtocolVersion::Tls12 | ProtocolVersion::Dtls12)
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// CIPHER SUITES
// ============================================================================

macro_rules! cipher_suites {
    ($($suite:ident = $value:expr),+ $(,)?) => {
        /// Cipher suites known to the scanner, named by their IANA registry name
        #[allow(non_camel_case_types)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum CipherSuite {
            $($suite),+
        }

        impl CipherSuite {
            pub const ALL: &'static [CipherSuite] = &[$(CipherSuite::$suite),+];

            pub fn name(&self) -> &'static str {
                match self {
                    $(CipherSuite::$suite => stringify!($suite)),+
                }
            }

            /// Two-byte registry value
            pub fn value(&self) -> u16 {
                match self {
                    $(CipherSuite::$suite => $value),+
                }
            }

            pub fn from_value(value: u16) -> Option<CipherSuite> {
                Self::ALL.iter().copied().find(|suite| suite.value() == value)
            }
        }
    };
}

cipher_suites! {
    TLS_NULL_WITH_NULL_NULL = 0x0000,
    TLS_RSA_WITH_NULL_MD5 = 0x0001,
    TLS_RSA_WITH_NULL_SHA = 0x0002,
    TLS_RSA_EXPORT_WITH_RC4_40_MD5 = 0x0003,
    TLS_RSA_WITH_RC4_128_MD5 = 0x0004,
    TLS_RSA_WITH_RC4_128_SHA = 0x0005,
    TLS_RSA_EXPORT_WITH_DES40_CBC_SHA = 0x0008,
    TLS_RSA_WITH_3DES_EDE_CBC_SHA = 0x000A,
    TLS_DHE_RSA_WITH_3DES_EDE_CBC_SHA = 0x0016,
    TLS_DH_anon_WITH_RC4_128_MD5 = 0x0018,
    TLS_RSA_WITH_AES_128_CBC_SHA = 0x002F,
    TLS_DHE_DSS_WITH_AES_128_CBC_SHA = 0x0032,
    TLS_DHE_RSA_WITH_AES_128_CBC_SHA = 0x0033,
    TLS_DH_anon_WITH_AES_128_CBC_SHA = 0x0034,
    TLS_RSA_WITH_AES_256_CBC_SHA = 0x0035,
    TLS_DHE_DSS_WITH_AES_256_CBC_SHA = 0x0038,
    TLS_DHE_RSA_WITH_AES_256_CBC_SHA = 0x0039,
    TLS_RSA_WITH_AES_128_CBC_SHA256 = 0x003C,
    TLS_RSA_WITH_AES_256_CBC_SHA256 = 0x003D,
    TLS_RSA_WITH_AES_128_GCM_SHA256 = 0x009C,
    TLS_RSA_WITH_AES_256_GCM_SHA384 = 0x009D,
    TLS_DHE_RSA_WITH_AES_128_GCM_SHA256 = 0x009E,
    TLS_DHE_RSA_WITH_AES_256_GCM_SHA384 = 0x009F,
    TLS_EMPTY_RENEGOTIATION_INFO_SCSV = 0x00FF,
    TLS_AES_128_GCM_SHA256 = 0x1301,
    TLS_AES_256_GCM_SHA384 = 0x1302,
    TLS_CHACHA20_POLY1305_SHA256 = 0x1303,
    TLS_FALLBACK_SCSV = 0x5600,
    TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA = 0xC009,
    TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA = 0xC00A,
    TLS_ECDHE_RSA_WITH_RC4_128_SHA = 0xC011,
    TLS_ECDHE_RSA_WITH_3DES_EDE_CBC_SHA = 0xC012,
    TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA = 0xC013,
    TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA = 0xC014,
    TLS_ECDH_anon_WITH_AES_128_CBC_SHA = 0xC018,
    TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA256 = 0xC027,
    TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256 = 0xC02B,
    TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384 = 0xC02C,
    TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256 = 0xC02F,
    TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384 = 0xC030,
    TLS_GOSTR341112_256_WITH_KUZNYECHIK_CTR_OMAC = 0xC100,
    TLS_GOSTR341112_256_WITH_MAGMA_CTR_OMAC = 0xC101,
    TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256 = 0xCCA8,
    TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256 = 0xCCA9,
}

impl CipherSuite {
    /// Signalling values that are not negotiable suites
    pub fn is_scsv(&self) -> bool {
        self.name().ends_with("_SCSV")
    }

    pub fn is_tls13(&self) -> bool {
        matches!(self.value(), 0x1301..=0x1303)
    }

    pub fn is_null(&self) -> bool {
        self.name().contains("_WITH_NULL_")
    }

    pub fn is_anon(&self) -> bool {
        self.name().contains("_anon_")
    }

    pub fn is_export(&self) -> bool {
        self.name().contains("_EXPORT_")
    }

    pub fn is_rc4(&self) -> bool {
        self.name().contains("_RC4_")
    }

    pub fn is_3des(&self) -> bool {
        self.name().contains("_3DES_")
    }

    pub fn is_aead(&self) -> bool {
        let name = self.name();
        name.contains("_GCM_") || name.contains("_CHACHA20_POLY1305_")
    }

    pub fn is_ecdhe(&self) -> bool {
        self.name().starts_with("TLS_ECDHE_")
    }

    pub fn is_gost(&self) -> bool {
        self.name().starts_with("TLS_GOSTR")
    }

    /// Forward secret key exchange (TLS 1.3 suites always are)
    pub fn is_ephemeral(&self) -> bool {
        self.is_tls13() || self.is_ecdhe() || self.name().starts_with("TLS_DHE_")
    }

    /// Whether a server may negotiate this suite under `version`
    pub fn is_supported_in(&self, version: ProtocolVersion) -> bool {
        if self.is_scsv() || version == ProtocolVersion::Ssl2 {
            return false;
        }
        if version.is_tls13() || self.is_tls13() {
            return version.is_tls13() && self.is_tls13();
        }
        if version.is_dtls() && self.is_rc4() {
            return false;
        }
        if self.is_export() {
            return matches!(version, ProtocolVersion::Ssl3 | ProtocolVersion::Tls10);
        }
        let name = self.name();
        let requires_tls12 = self.is_aead()
            || self.is_gost()
            || name.ends_with("_SHA256")
            || name.ends_with("_SHA384");
        !requires_tls12 || version.is_tls12_or_dtls12()
    }

    /// Key type of the certificate a server needs to negotiate this suite
    ///
    /// `None` for suites that authenticate without a certificate, and for
    /// TLS 1.3 suites whose certificate is chosen by signature scheme instead.
    pub fn certificate_key_type(&self) -> Option<CertificateKeyType> {
        if self.is_scsv()
            || self.is_tls13()
            || self.is_anon()
            || *self == CipherSuite::TLS_NULL_WITH_NULL_NULL
        {
            return None;
        }
        let name = self.name();
        let key_type = if name.contains("_ECDSA_") {
            CertificateKeyType::Ecdsa
        } else if name.contains("_DSS_") {
            CertificateKeyType::Dss
        } else if self.is_gost() {
            CertificateKeyType::Gost
        } else {
            CertificateKeyType::Rsa
        };
        Some(key_type)
    }

    /// Every negotiable suite valid under `version`
    pub fn for_version(version: ProtocolVersion) -> Vec<CipherSuite> {
        Self::ALL
            .iter()
            .copied()
            .filter(|suite| suite.is_supported_in(version))
            .collect()
    }
}

impl fmt::Display for CipherSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A cipher suite together with the version it was negotiated under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VersionSuitePair {
    pub version: ProtocolVersion,
    pub suite: CipherSuite,
}

impl VersionSuitePair {
    pub fn new(version: ProtocolVersion, suite: CipherSuite) -> Self {
        Self { version, suite }
    }
}

impl fmt::Display for VersionSuitePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.version, self.suite)
    }
}

// ============================================================================
// COMPRESSION / POINT FORMATS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompressionMethod {
    Null,
    Deflate,
    Lzs,
}

impl CompressionMethod {
    pub const ALL: [CompressionMethod; 3] = [
        CompressionMethod::Null,
        CompressionMethod::Deflate,
        CompressionMethod::Lzs,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CompressionMethod::Null => "NULL",
            CompressionMethod::Deflate => "DEFLATE",
            CompressionMethod::Lzs => "LZS",
        }
    }
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EcPointFormat {
    Uncompressed,
    #[serde(rename = "ANSIX962_COMPRESSED_PRIME")]
    AnsiX962CompressedPrime,
    #[serde(rename = "ANSIX962_COMPRESSED_CHAR2")]
    AnsiX962CompressedChar2,
}

impl EcPointFormat {
    pub const ALL: [EcPointFormat; 3] = [
        EcPointFormat::Uncompressed,
        EcPointFormat::AnsiX962CompressedPrime,
        EcPointFormat::AnsiX962CompressedChar2,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EcPointFormat::Uncompressed => "UNCOMPRESSED",
            EcPointFormat::AnsiX962CompressedPrime => "ANSIX962_COMPRESSED_PRIME",
            EcPointFormat::AnsiX962CompressedChar2 => "ANSIX962_COMPRESSED_CHAR2",
        }
    }
}

impl fmt::Display for EcPointFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// SIGNATURE ALGORITHMS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignatureAlgorithm {
    Rsa,
    Dsa,
    Ecdsa,
    RsaPss,
    Ed25519,
}

impl SignatureAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            SignatureAlgorithm::Rsa => "RSA",
            SignatureAlgorithm::Dsa => "DSA",
            SignatureAlgorithm::Ecdsa => "ECDSA",
            SignatureAlgorithm::RsaPss => "RSA_PSS",
            SignatureAlgorithm::Ed25519 => "ED25519",
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Public key type of a server certificate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CertificateKeyType {
    Rsa,
    Dss,
    Ecdsa,
    Ed25519,
    Gost,
}

impl CertificateKeyType {
    pub fn name(&self) -> &'static str {
        match self {
            CertificateKeyType::Rsa => "RSA",
            CertificateKeyType::Dss => "DSS",
            CertificateKeyType::Ecdsa => "ECDSA",
            CertificateKeyType::Ed25519 => "ED25519",
            CertificateKeyType::Gost => "GOST",
        }
    }

    /// Key type able to produce signatures of `algorithm`
    pub fn for_signature(algorithm: SignatureAlgorithm) -> CertificateKeyType {
        match algorithm {
            SignatureAlgorithm::Rsa | SignatureAlgorithm::RsaPss => CertificateKeyType::Rsa,
            SignatureAlgorithm::Dsa => CertificateKeyType::Dss,
            SignatureAlgorithm::Ecdsa => CertificateKeyType::Ecdsa,
            SignatureAlgorithm::Ed25519 => CertificateKeyType::Ed25519,
        }
    }
}

impl fmt::Display for CertificateKeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Intrinsic,
}

macro_rules! signature_and_hash_algorithms {
    ($($variant:ident => $name:literal ($signature:ident, $hash:ident)),+ $(,)?) => {
        /// Signature scheme as offered in the signature_algorithms extension
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum SignatureAndHashAlgorithm {
            $(
                #[serde(rename = $name)]
                $variant
            ),+
        }

        impl SignatureAndHashAlgorithm {
            pub const ALL: &'static [SignatureAndHashAlgorithm] =
                &[$(SignatureAndHashAlgorithm::$variant),+];

            pub fn name(&self) -> &'static str {
                match self {
                    $(SignatureAndHashAlgorithm::$variant => $name),+
                }
            }

            pub fn signature_algorithm(&self) -> SignatureAlgorithm {
                match self {
                    $(SignatureAndHashAlgorithm::$variant => SignatureAlgorithm::$signature),+
                }
            }

            pub fn hash_algorithm(&self) -> HashAlgorithm {
                match self {
                    $(SignatureAndHashAlgorithm::$variant => HashAlgorithm::$hash),+
                }
            }
        }
    };
}

signature_and_hash_algorithms! {
    RsaMd5 => "RSA_MD5" (Rsa, Md5),
    RsaSha1 => "RSA_SHA1" (Rsa, Sha1),
    RsaSha224 => "RSA_SHA224" (Rsa, Sha224),
    RsaSha256 => "RSA_SHA256" (Rsa, Sha256),
    RsaSha384 => "RSA_SHA384" (Rsa, Sha384),
    RsaSha512 => "RSA_SHA512" (Rsa, Sha512),
    DsaSha1 => "DSA_SHA1" (Dsa, Sha1),
    DsaSha256 => "DSA_SHA256" (Dsa, Sha256),
    EcdsaSha1 => "ECDSA_SHA1" (Ecdsa, Sha1),
    EcdsaSha256 => "ECDSA_SHA256" (Ecdsa, Sha256),
    EcdsaSha384 => "ECDSA_SHA384" (Ecdsa, Sha384),
    EcdsaSha512 => "ECDSA_SHA512" (Ecdsa, Sha512),
    RsaPssRsaeSha256 => "RSA_PSS_RSAE_SHA256" (RsaPss, Sha256),
    RsaPssRsaeSha384 => "RSA_PSS_RSAE_SHA384" (RsaPss, Sha384),
    RsaPssRsaeSha512 => "RSA_PSS_RSAE_SHA512" (RsaPss, Sha512),
    Ed25519 => "ED25519" (Ed25519, Intrinsic),
}

impl SignatureAndHashAlgorithm {
    /// Schemes a TLS 1.3 server may use for CertificateVerify
    pub fn is_tls13_compatible(&self) -> bool {
        !matches!(
            self.signature_algorithm(),
            SignatureAlgorithm::Dsa | SignatureAlgorithm::Rsa
        ) && !matches!(
            self.hash_algorithm(),
            HashAlgorithm::Md5 | HashAlgorithm::Sha1 | HashAlgorithm::Sha224
        )
    }
}

impl fmt::Display for SignatureAndHashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A certificate a server presented, identified by key type and the scheme it is signed with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServerCertificate {
    pub key_type: CertificateKeyType,
    pub signature_algorithm: SignatureAndHashAlgorithm,
}

impl ServerCertificate {
    pub fn new(
        key_type: CertificateKeyType,
        signature_algorithm: SignatureAndHashAlgorithm,
    ) -> Self {
        Self {
            key_type,
            signature_algorithm,
        }
    }

    /// Whether the certificate key can sign with `scheme` (TLS 1.3 CertificateVerify)
    pub fn can_sign(&self, scheme: SignatureAndHashAlgorithm) -> bool {
        CertificateKeyType::for_signature(scheme.signature_algorithm()) == self.key_type
    }
}

impl fmt::Display for ServerCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.key_type, self.signature_algorithm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cipher_suite_classification() {
        assert!(CipherSuite::TLS_RSA_WITH_NULL_SHA.is_null());
        assert!(CipherSuite::TLS_DH_anon_WITH_AES_128_CBC_SHA.is_anon());
        assert!(CipherSuite::TLS_RSA_EXPORT_WITH_RC4_40_MD5.is_export());
        assert!(CipherSuite::TLS_RSA_EXPORT_WITH_RC4_40_MD5.is_rc4());
        assert!(CipherSuite::TLS_RSA_WITH_3DES_EDE_CBC_SHA.is_3des());
        assert!(CipherSuite::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256.is_aead());
        assert!(CipherSuite::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256.is_ephemeral());
        assert!(CipherSuite::TLS_AES_128_GCM_SHA256.is_ephemeral());
        assert!(!CipherSuite::TLS_RSA_WITH_AES_128_CBC_SHA.is_ephemeral());
        assert!(CipherSuite::TLS_FALLBACK_SCSV.is_scsv());
        assert!(!CipherSuite::TLS_NULL_WITH_NULL_NULL.is_scsv());
    }

    #[test]
    fn test_cipher_suite_version_applicability() {
        let gcm = CipherSuite::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256;
        assert!(gcm.is_supported_in(ProtocolVersion::Tls12));
        assert!(!gcm.is_supported_in(ProtocolVersion::Tls10));
        assert!(!gcm.is_supported_in(ProtocolVersion::Tls13));

        let tls13 = CipherSuite::TLS_AES_256_GCM_SHA384;
        assert!(tls13.is_supported_in(ProtocolVersion::Tls13));
        assert!(!tls13.is_supported_in(ProtocolVersion::Tls12));

        assert!(!CipherSuite::TLS_RSA_WITH_RC4_128_SHA.is_supported_in(ProtocolVersion::Dtls12));
        assert!(CipherSuite::for_version(ProtocolVersion::Ssl2).is_empty());
        assert!(CipherSuite::for_version(ProtocolVersion::Tls12)
            .iter()
            .all(|suite| !suite.is_scsv()));
    }

    #[test]
    fn test_cipher_suite_values() {
        assert_eq!(CipherSuite::TLS_RSA_WITH_AES_128_CBC_SHA.value(), 0x002F);
        assert_eq!(
            CipherSuite::from_value(0x1301),
            Some(CipherSuite::TLS_AES_128_GCM_SHA256)
        );
        assert_eq!(CipherSuite::from_value(0xFFFF), None);
    }

    #[test]
    fn test_certificate_key_type_of_suites() {
        assert_eq!(
            CipherSuite::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256.certificate_key_type(),
            Some(CertificateKeyType::Ecdsa)
        );
        assert_eq!(
            CipherSuite::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256.certificate_key_type(),
            Some(CertificateKeyType::Rsa)
        );
        assert_eq!(
            CipherSuite::TLS_DHE_DSS_WITH_AES_128_CBC_SHA.certificate_key_type(),
            Some(CertificateKeyType::Dss)
        );
        assert_eq!(
            CipherSuite::TLS_GOSTR341112_256_WITH_MAGMA_CTR_OMAC.certificate_key_type(),
            Some(CertificateKeyType::Gost)
        );
        assert_eq!(CipherSuite::TLS_DH_anon_WITH_AES_128_CBC_SHA.certificate_key_type(), None);
        assert_eq!(CipherSuite::TLS_AES_128_GCM_SHA256.certificate_key_type(), None);
        assert_eq!(CipherSuite::TLS_NULL_WITH_NULL_NULL.certificate_key_type(), None);

        let gost = CipherSuite::TLS_GOSTR341112_256_WITH_KUZNYECHIK_CTR_OMAC;
        assert!(gost.is_supported_in(ProtocolVersion::Tls12));
        assert!(!gost.is_supported_in(ProtocolVersion::Tls11));
    }

    #[test]
    fn test_certificate_signing_capability() {
        let rsa =
            ServerCertificate::new(CertificateKeyType::Rsa, SignatureAndHashAlgorithm::RsaSha256);
        assert!(rsa.can_sign(SignatureAndHashAlgorithm::RsaPssRsaeSha256));
        assert!(!rsa.can_sign(SignatureAndHashAlgorithm::EcdsaSha256));
        assert_eq!(rsa.to_string(), "RSA/RSA_SHA256");
    }

    #[test]
    fn test_signature_and_hash_components() {
        let scheme = SignatureAndHashAlgorithm::EcdsaSha384;
        assert_eq!(scheme.signature_algorithm(), SignatureAlgorithm::Ecdsa);
        assert_eq!(scheme.hash_algorithm(), HashAlgorithm::Sha384);
        assert!(scheme.is_tls13_compatible());
        assert!(!SignatureAndHashAlgorithm::RsaSha256.is_tls13_compatible());
        assert_eq!(SignatureAndHashAlgorithm::DsaSha1.to_string(), "DSA_SHA1");
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&ProtocolVersion::Tls12).unwrap();
        assert_eq!(json, "\"TLS12\"");
        let suite: CipherSuite =
            serde_json::from_str("\"TLS_RSA_WITH_AES_128_CBC_SHA\"").unwrap();
        assert_eq!(suite, CipherSuite::TLS_RSA_WITH_AES_128_CBC_SHA);
        let scheme: SignatureAndHashAlgorithm = serde_json::from_str("\"RSA_SHA1\"").unwrap();
        assert_eq!(scheme, SignatureAndHashAlgorithm::RsaSha1);
        let format: EcPointFormat =
            serde_json::from_str("\"ANSIX962_COMPRESSED_PRIME\"").unwrap();
        assert_eq!(format, EcPointFormat::AnsiX962CompressedPrime);
    }
}
