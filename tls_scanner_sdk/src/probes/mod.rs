//! # Probes Module
//!
//! One probe per [`ProbeType`](tls_scanner_base::types::ProbeType):
//! - ProtocolVersionProbe: SSL 2 through TLS 1.3, or DTLS 1.0/1.2
//! - CipherSuiteProbe: suite enumeration and derived weakness flags
//! - CompressionsProbe: TLS compression (CRIME)
//! - TlsFallbackScsvProbe: downgrade protection
//! - RenegotiationProbe: secure and insecure client renegotiation
//! - EcPointFormatProbe: EC point formats
//! - EarlyCcsProbe: early ChangeCipherSpec injection
//! - CertificateProbe: server certificates per key type
//! - SignatureAndHashAlgorithmProbe: SKE and TLS 1.3 signature algorithms
//! - DtlsMessageSequenceProbe: DTLS message_seq validation
//! - DtlsIpAddressInCookieProbe: whether the DTLS cookie ignores the source port
//! - SniProbe: whether the server insists on server_name

pub(crate) mod common;

pub mod certificate;
pub mod cipher_suite;
pub mod compressions;
pub mod dtls_ip_address_in_cookie;
pub mod dtls_message_sequence;
pub mod early_ccs;
pub mod ec_point_format;
pub mod fallback_scsv;
pub mod protocol_version;
pub mod renegotiation;
pub mod signature_and_hash;
pub mod sni;

pub use certificate::CertificateProbe;
pub use cipher_suite::CipherSuiteProbe;
pub use compressions::CompressionsProbe;
pub use dtls_ip_address_in_cookie::DtlsIpAddressInCookieProbe;
pub use dtls_message_sequence::DtlsMessageSequenceProbe;
pub use early_ccs::EarlyCcsProbe;
pub use ec_point_format::EcPointFormatProbe;
pub use fallback_scsv::TlsFallbackScsvProbe;
pub use protocol_version::ProtocolVersionProbe;
pub use renegotiation::RenegotiationProbe;
pub use signature_and_hash::SignatureAndHashAlgorithmProbe;
pub use sni::SniProbe;
