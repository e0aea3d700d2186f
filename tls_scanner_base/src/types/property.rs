//! Property and probe identifiers
//!
//! Every fact the scanner can record is an [`AnalyzedProperty`] with a fixed
//! result shape. Shapes are decided here, once, and the report enforces them.

use super::protocol::ProtocolVersion;
use super::test_result::{ListKind, ResultShape};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

macro_rules! analyzed_properties {
    ($($variant:ident => $name:literal : $shape:expr),+ $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum AnalyzedProperty {
            $($variant),+
        }

        impl AnalyzedProperty {
            pub const ALL: &'static [AnalyzedProperty] = &[$(AnalyzedProperty::$variant),+];

            /// Stable upper-snake-case name used in result documents
            pub fn name(&self) -> &'static str {
                match self {
                    $(AnalyzedProperty::$variant => $name),+
                }
            }

            pub fn shape(&self) -> ResultShape {
                match self {
                    $(AnalyzedProperty::$variant => $shape),+
                }
            }
        }
    };
}

analyzed_properties! {
    // protocol versions
    SupportsSsl2 => "SUPPORTS_SSL_2": ResultShape::Scalar,
    SupportsSsl3 => "SUPPORTS_SSL_3": ResultShape::Scalar,
    SupportsTls10 => "SUPPORTS_TLS_1_0": ResultShape::Scalar,
    SupportsTls11 => "SUPPORTS_TLS_1_1": ResultShape::Scalar,
    SupportsTls12 => "SUPPORTS_TLS_1_2": ResultShape::Scalar,
    SupportsTls13 => "SUPPORTS_TLS_1_3": ResultShape::Scalar,
    SupportsDtls10 => "SUPPORTS_DTLS_1_0": ResultShape::Scalar,
    SupportsDtls12 => "SUPPORTS_DTLS_1_2": ResultShape::Scalar,
    SupportedProtocolVersions => "LIST_SUPPORTED_PROTOCOL_VERSIONS":
        ResultShape::List(ListKind::ProtocolVersion),

    // cipher suites
    SupportedCipherSuites => "LIST_SUPPORTED_CIPHER_SUITES": ResultShape::List(ListKind::CipherSuite),
    SupportsNullCiphers => "SUPPORTS_NULL_CIPHERS": ResultShape::Scalar,
    SupportsAnon => "SUPPORTS_ANON": ResultShape::Scalar,
    SupportsExport => "SUPPORTS_EXPORT": ResultShape::Scalar,
    SupportsRc4 => "SUPPORTS_RC4": ResultShape::Scalar,
    Supports3des => "SUPPORTS_3DES": ResultShape::Scalar,
    SupportsAead => "SUPPORTS_AEAD": ResultShape::Scalar,
    SupportsPfs => "SUPPORTS_PFS": ResultShape::Scalar,
    SupportsOnlyPfs => "SUPPORTS_ONLY_PFS": ResultShape::Scalar,
    SupportsEcdhe => "SUPPORTS_ECDHE": ResultShape::Scalar,
    SupportedVersionSuitePairs => "LIST_VERSION_SUITE_PAIRS":
        ResultShape::List(ListKind::VersionSuitePair),

    // compression
    SupportedCompressionMethods => "LIST_SUPPORTED_COMPRESSION_METHODS":
        ResultShape::List(ListKind::CompressionMethod),
    SupportsTlsCompression => "SUPPORTS_TLS_COMPRESSION": ResultShape::Scalar,
    VulnerableToCrime => "VULNERABLE_TO_CRIME": ResultShape::Scalar,

    // downgrade and renegotiation
    SupportsTlsFallbackScsv => "SUPPORTS_TLS_FALLBACK_SCSV": ResultShape::Scalar,
    SupportsSecureRenegotiationExtension => "SUPPORTS_SECURE_RENEGOTIATION_EXTENSION":
        ResultShape::Scalar,
    SupportsClientSideSecureRenegotiation => "SUPPORTS_CLIENT_SIDE_SECURE_RENEGOTIATION":
        ResultShape::Scalar,
    SupportsClientSideInsecureRenegotiation => "SUPPORTS_CLIENT_SIDE_INSECURE_RENEGOTIATION":
        ResultShape::Scalar,

    // elliptic curves
    SupportedPointFormats => "LIST_SUPPORTED_POINT_FORMATS": ResultShape::List(ListKind::PointFormat),
    SupportsUncompressedPoint => "SUPPORTS_UNCOMPRESSED_POINT": ResultShape::Scalar,
    SupportsAnsiX962CompressedPrime => "SUPPORTS_ANSIX962_COMPRESSED_PRIME": ResultShape::Scalar,
    SupportsAnsiX962CompressedChar2 => "SUPPORTS_ANSIX962_COMPRESSED_CHAR2": ResultShape::Scalar,
    SupportsTls13SecpCompression => "SUPPORTS_TLS13_SECP_COMPRESSION": ResultShape::Scalar,

    // state machine
    VulnerableToEarlyCcs => "VULNERABLE_TO_EARLY_CCS": ResultShape::Scalar,

    // certificates and signatures
    SupportedCertificates => "LIST_SUPPORTED_CERTIFICATES": ResultShape::List(ListKind::Certificate),
    SupportedSignatureAndHashAlgorithmsCert => "LIST_SUPPORTED_SIGNATURE_AND_HASH_ALGORITHMS_CERT":
        ResultShape::List(ListKind::SignatureAndHashAlgorithm),
    SupportedSignatureAndHashAlgorithmsSke => "LIST_SUPPORTED_SIGNATURE_AND_HASH_ALGORITHMS_SKE":
        ResultShape::List(ListKind::SignatureAndHashAlgorithm),
    SupportedSignatureAndHashAlgorithmsTls13 => "LIST_SUPPORTED_SIGNATURE_AND_HASH_ALGORITHMS_TLS13":
        ResultShape::List(ListKind::SignatureAndHashAlgorithm),
    RespectsSignatureAlgorithmsExtension => "RESPECTS_SIGNATURE_ALGORITHMS_EXTENSION":
        ResultShape::Scalar,

    // DTLS message sequence handling
    AcceptsStartedWithInvalidMessageSequence => "ACCEPTS_STARTED_WITH_INVALID_MESSAGE_SEQUENCE":
        ResultShape::Scalar,
    AcceptsSkippedMessageSequencesOnce => "ACCEPTS_SKIPPED_MESSAGE_SEQUENCES_ONCE":
        ResultShape::Scalar,
    AcceptsSkippedMessageSequencesMultiple => "ACCEPTS_SKIPPED_MESSAGE_SEQUENCES_MULTIPLE":
        ResultShape::Scalar,
    AcceptsRandomMessageSequences => "ACCEPTS_RANDOM_MESSAGE_SEQUENCES": ResultShape::Scalar,
    MissesMessageSequenceChecks => "MISSES_MESSAGE_SEQUENCE_CHECKS": ResultShape::Scalar,

    // DTLS cookie
    UsesIpAddressForCookie => "USES_IP_ADDRESS_FOR_COOKIE": ResultShape::Scalar,

    // server name indication
    RequiresSni => "REQUIRES_SNI": ResultShape::Scalar,
}

impl AnalyzedProperty {
    /// Scalar property recording support for a single protocol version
    pub fn support_for(version: ProtocolVersion) -> AnalyzedProperty {
        match version {
            ProtocolVersion::Ssl2 => AnalyzedProperty::SupportsSsl2,
            ProtocolVersion::Ssl3 => AnalyzedProperty::SupportsSsl3,
            ProtocolVersion::Tls10 => AnalyzedProperty::SupportsTls10,
            ProtocolVersion::Tls11 => AnalyzedProperty::SupportsTls11,
            ProtocolVersion::Tls12 => AnalyzedProperty::SupportsTls12,
            ProtocolVersion::Tls13 => AnalyzedProperty::SupportsTls13,
            ProtocolVersion::Dtls10 => AnalyzedProperty::SupportsDtls10,
            ProtocolVersion::Dtls12 => AnalyzedProperty::SupportsDtls12,
        }
    }

    pub fn from_name(name: &str) -> Option<AnalyzedProperty> {
        Self::ALL.iter().copied().find(|property| property.name() == name)
    }

    pub fn is_list(&self) -> bool {
        matches!(self.shape(), ResultShape::List(_))
    }
}

impl fmt::Display for AnalyzedProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AnalyzedProperty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown property '{}'", s))
    }
}

impl Serialize for AnalyzedProperty {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for AnalyzedProperty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// PROBE TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProbeType {
    ProtocolVersion,
    CipherSuite,
    Compressions,
    TlsFallbackScsv,
    Renegotiation,
    EcPointFormat,
    EarlyCcs,
    Certificate,
    SignatureAndHash,
    DtlsMessageSequenceNumber,
    DtlsIpAddressInCookie,
    Sni,
}

impl ProbeType {
    pub const ALL: [ProbeType; 12] = [
        ProbeType::ProtocolVersion,
        ProbeType::CipherSuite,
        ProbeType::Compressions,
        ProbeType::TlsFallbackScsv,
        ProbeType::Renegotiation,
        ProbeType::EcPointFormat,
        ProbeType::EarlyCcs,
        ProbeType::Certificate,
        ProbeType::SignatureAndHash,
        ProbeType::DtlsMessageSequenceNumber,
        ProbeType::DtlsIpAddressInCookie,
        ProbeType::Sni,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProbeType::ProtocolVersion => "PROTOCOL_VERSION",
            ProbeType::CipherSuite => "CIPHER_SUITE",
            ProbeType::Compressions => "COMPRESSIONS",
            ProbeType::TlsFallbackScsv => "TLS_FALLBACK_SCSV",
            ProbeType::Renegotiation => "RENEGOTIATION",
            ProbeType::EcPointFormat => "EC_POINT_FORMAT",
            ProbeType::EarlyCcs => "EARLY_CCS",
            ProbeType::Certificate => "CERTIFICATE",
            ProbeType::SignatureAndHash => "SIGNATURE_AND_HASH",
            ProbeType::DtlsMessageSequenceNumber => "DTLS_MESSAGE_SEQUENCE_NUMBER",
            ProbeType::DtlsIpAddressInCookie => "DTLS_IP_ADDRESS_IN_COOKIE",
            ProbeType::Sni => "SNI",
        }
    }
}

impl fmt::Display for ProbeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProbeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|probe| probe.name() == normalized)
            .ok_or_else(|| format!("unknown probe type '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_property_names_are_unique() {
        let names: HashSet<&str> = AnalyzedProperty::ALL.iter().map(|p| p.name()).collect();
        assert_eq!(names.len(), AnalyzedProperty::ALL.len());
    }

    #[test]
    fn test_property_name_lookup() {
        assert_eq!(
            "SUPPORTS_TLS_1_2".parse::<AnalyzedProperty>(),
            Ok(AnalyzedProperty::SupportsTls12)
        );
        assert!("SUPPORTS_TLS_9".parse::<AnalyzedProperty>().is_err());
    }

    #[test]
    fn test_shapes() {
        assert_eq!(AnalyzedProperty::SupportsTls13.shape(), ResultShape::Scalar);
        assert_eq!(
            AnalyzedProperty::SupportedCipherSuites.shape(),
            ResultShape::List(ListKind::CipherSuite)
        );
        assert!(AnalyzedProperty::SupportedSignatureAndHashAlgorithmsTls13.is_list());
    }

    #[test]
    fn test_support_for_version() {
        for version in ProtocolVersion::TLS.iter().chain(ProtocolVersion::DTLS.iter()) {
            let property = AnalyzedProperty::support_for(*version);
            assert_eq!(property.shape(), ResultShape::Scalar);
        }
    }

    #[test]
    fn test_probe_type_parsing() {
        assert_eq!("cipher-suite".parse::<ProbeType>(), Ok(ProbeType::CipherSuite));
        assert_eq!(
            "EARLY_CCS".parse::<ProbeType>(),
            Ok(ProbeType::EarlyCcs)
        );
        assert!("heartbleed".parse::<ProbeType>().is_err());
    }

    #[test]
    fn test_property_serde_uses_name() {
        let json = serde_json::to_string(&AnalyzedProperty::VulnerableToCrime).unwrap();
        assert_eq!(json, "\"VULNERABLE_TO_CRIME\"");
        let back: AnalyzedProperty = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AnalyzedProperty::VulnerableToCrime);
    }
}
