//! Core value types shared by probes, the report and guideline checks

pub mod property;
pub mod protocol;
pub mod target;
pub mod test_result;

pub use property::{AnalyzedProperty, ProbeType};
pub use protocol::{
    CertificateKeyType, CipherSuite, CompressionMethod, EcPointFormat, HashAlgorithm,
    ProtocolVersion, ServerCertificate, SignatureAlgorithm, SignatureAndHashAlgorithm,
    VersionSuitePair,
};
pub use target::ScanTarget;
pub use test_result::{ListKind, ListResult, ListValue, ResultShape, TestResult, TestResults};
