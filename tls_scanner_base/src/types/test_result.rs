//! Probe outcome model
//!
//! A property holds either a six-valued scalar or a typed list. List results
//! distinguish "tested, nothing supported" (empty list) from "not tested"
//! (no list at all).

use super::property::AnalyzedProperty;
use super::protocol::{
    CipherSuite, CompressionMethod, EcPointFormat, ProtocolVersion, ServerCertificate,
    SignatureAlgorithm, SignatureAndHashAlgorithm, VersionSuitePair,
};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// SCALAR RESULTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestResults {
    True,
    False,
    Uncertain,
    CouldNotTest,
    ErrorDuringTest,
    NotTestedYet,
}

impl TestResults {
    pub const ALL: [TestResults; 6] = [
        TestResults::True,
        TestResults::False,
        TestResults::Uncertain,
        TestResults::CouldNotTest,
        TestResults::ErrorDuringTest,
        TestResults::NotTestedYet,
    ];

    pub fn of(value: bool) -> Self {
        if value {
            TestResults::True
        } else {
            TestResults::False
        }
    }

    pub fn is_true(&self) -> bool {
        matches!(self, TestResults::True)
    }

    pub fn is_false(&self) -> bool {
        matches!(self, TestResults::False)
    }

    /// TRUE or FALSE, as opposed to one of the "no answer" states
    pub fn is_definite(&self) -> bool {
        matches!(self, TestResults::True | TestResults::False)
    }

    /// Invert a definite result; other states pass through unchanged
    pub fn negate(&self) -> Self {
        match self {
            TestResults::True => TestResults::False,
            TestResults::False => TestResults::True,
            other => *other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TestResults::True => "TRUE",
            TestResults::False => "FALSE",
            TestResults::Uncertain => "UNCERTAIN",
            TestResults::CouldNotTest => "COULD_NOT_TEST",
            TestResults::ErrorDuringTest => "ERROR_DURING_TEST",
            TestResults::NotTestedYet => "NOT_TESTED_YET",
        }
    }
}

impl fmt::Display for TestResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// LIST RESULTS
// ============================================================================

/// Element type a list-shaped property is declared to hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListKind {
    ProtocolVersion,
    CipherSuite,
    CompressionMethod,
    PointFormat,
    SignatureAndHashAlgorithm,
    SignatureAlgorithm,
    VersionSuitePair,
    Certificate,
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ListKind::ProtocolVersion => "protocol versions",
            ListKind::CipherSuite => "cipher suites",
            ListKind::CompressionMethod => "compression methods",
            ListKind::PointFormat => "point formats",
            ListKind::SignatureAndHashAlgorithm => "signature and hash algorithms",
            ListKind::SignatureAlgorithm => "signature algorithms",
            ListKind::VersionSuitePair => "version and cipher suite pairs",
            ListKind::Certificate => "certificates",
        };
        f.write_str(name)
    }
}

/// One element of a list result or of guideline evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum ListValue {
    ProtocolVersion(ProtocolVersion),
    CipherSuite(CipherSuite),
    CompressionMethod(CompressionMethod),
    PointFormat(EcPointFormat),
    SignatureAndHashAlgorithm(SignatureAndHashAlgorithm),
    SignatureAlgorithm(SignatureAlgorithm),
    VersionSuitePair(VersionSuitePair),
    Certificate(ServerCertificate),
}

impl ListValue {
    pub fn kind(&self) -> ListKind {
        match self {
            ListValue::ProtocolVersion(_) => ListKind::ProtocolVersion,
            ListValue::CipherSuite(_) => ListKind::CipherSuite,
            ListValue::CompressionMethod(_) => ListKind::CompressionMethod,
            ListValue::PointFormat(_) => ListKind::PointFormat,
            ListValue::SignatureAndHashAlgorithm(_) => ListKind::SignatureAndHashAlgorithm,
            ListValue::SignatureAlgorithm(_) => ListKind::SignatureAlgorithm,
            ListValue::VersionSuitePair(_) => ListKind::VersionSuitePair,
            ListValue::Certificate(_) => ListKind::Certificate,
        }
    }
}

impl fmt::Display for ListValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListValue::ProtocolVersion(v) => v.fmt(f),
            ListValue::CipherSuite(v) => v.fmt(f),
            ListValue::CompressionMethod(v) => v.fmt(f),
            ListValue::PointFormat(v) => v.fmt(f),
            ListValue::SignatureAndHashAlgorithm(v) => v.fmt(f),
            ListValue::SignatureAlgorithm(v) => v.fmt(f),
            ListValue::VersionSuitePair(v) => v.fmt(f),
            ListValue::Certificate(v) => v.fmt(f),
        }
    }
}

macro_rules! list_value_from {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$ty> for ListValue {
                fn from(value: $ty) -> Self {
                    ListValue::$variant(value)
                }
            }
        )+
    };
}

list_value_from! {
    ProtocolVersion => ProtocolVersion,
    CipherSuite => CipherSuite,
    CompressionMethod => CompressionMethod,
    EcPointFormat => PointFormat,
    SignatureAndHashAlgorithm => SignatureAndHashAlgorithm,
    SignatureAlgorithm => SignatureAlgorithm,
    VersionSuitePair => VersionSuitePair,
    ServerCertificate => Certificate,
}

/// Ordered list outcome for a list-shaped property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListResult {
    property: AnalyzedProperty,
    list: Option<Vec<ListValue>>,
}

impl ListResult {
    pub fn new<T, I>(property: AnalyzedProperty, values: I) -> Self
    where
        T: Into<ListValue>,
        I: IntoIterator<Item = T>,
    {
        Self {
            property,
            list: Some(values.into_iter().map(Into::into).collect()),
        }
    }

    /// Result for a property that was never tested (or whose test failed)
    pub fn absent(property: AnalyzedProperty) -> Self {
        Self {
            property,
            list: None,
        }
    }

    pub fn property(&self) -> AnalyzedProperty {
        self.property
    }

    pub fn list(&self) -> Option<&[ListValue]> {
        self.list.as_deref()
    }

    pub fn is_absent(&self) -> bool {
        self.list.is_none()
    }

    pub fn contains(&self, value: &ListValue) -> bool {
        self.list.as_ref().map_or(false, |list| list.contains(value))
    }

    pub fn protocol_versions(&self) -> Vec<ProtocolVersion> {
        self.values()
            .filter_map(|value| match value {
                ListValue::ProtocolVersion(v) => Some(*v),
                _ => None,
            })
            .collect()
    }

    pub fn cipher_suites(&self) -> Vec<CipherSuite> {
        self.values()
            .filter_map(|value| match value {
                ListValue::CipherSuite(v) => Some(*v),
                _ => None,
            })
            .collect()
    }

    pub fn signature_and_hash_algorithms(&self) -> Vec<SignatureAndHashAlgorithm> {
        self.values()
            .filter_map(|value| match value {
                ListValue::SignatureAndHashAlgorithm(v) => Some(*v),
                _ => None,
            })
            .collect()
    }

    pub fn version_suite_pairs(&self) -> Vec<VersionSuitePair> {
        self.values()
            .filter_map(|value| match value {
                ListValue::VersionSuitePair(v) => Some(*v),
                _ => None,
            })
            .collect()
    }

    pub fn certificates(&self) -> Vec<ServerCertificate> {
        self.values()
            .filter_map(|value| match value {
                ListValue::Certificate(v) => Some(*v),
                _ => None,
            })
            .collect()
    }

    fn values(&self) -> impl Iterator<Item = &ListValue> {
        self.list.iter().flatten()
    }
}

// ============================================================================
// RESULT SUM TYPE
// ============================================================================

/// Shape a property is registered with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultShape {
    Scalar,
    List(ListKind),
}

impl fmt::Display for ResultShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultShape::Scalar => f.write_str("scalar"),
            ResultShape::List(kind) => write!(f, "list of {}", kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestResult {
    Scalar(TestResults),
    List(ListResult),
}

impl TestResult {
    pub fn as_scalar(&self) -> Option<TestResults> {
        match self {
            TestResult::Scalar(value) => Some(*value),
            TestResult::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListResult> {
        match self {
            TestResult::List(list) => Some(list),
            TestResult::Scalar(_) => None,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, TestResult::List(_))
    }
}

impl From<TestResults> for TestResult {
    fn from(value: TestResults) -> Self {
        TestResult::Scalar(value)
    }
}

impl From<ListResult> for TestResult {
    fn from(value: ListResult) -> Self {
        TestResult::List(value)
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestResult::Scalar(value) => value.fmt(f),
            TestResult::List(list) => match list.list() {
                None => f.write_str("<not tested>"),
                Some(values) => {
                    let rendered: Vec<String> = values.iter().map(ToString::to_string).collect();
                    write!(f, "[{}]", rendered.join(", "))
                }
            },
        }
    }
}
