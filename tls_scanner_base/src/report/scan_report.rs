//! Shared key-to-result store for one scan

use super::error::ReportError;
use crate::results::PropertyEntry;
use crate::types::{
    AnalyzedProperty, CipherSuite, ListResult, ListValue, ProbeType, ProtocolVersion,
    ResultShape, ScanTarget, TestResult, TestResults,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Accumulated scan knowledge about one target
///
/// Writes are validated against each property's registered shape, so a
/// property never changes from scalar to list (or between list element
/// types) across writes. Every write is also journaled for the scheduler,
/// which uses the journal to spot writes outside a probe's declared set.
#[derive(Debug, Clone)]
pub struct ScanReport {
    target: ScanTarget,
    results: HashMap<AnalyzedProperty, TestResult>,
    executed_probes: BTreeSet<ProbeType>,
    write_journal: Vec<AnalyzedProperty>,
}

impl ScanReport {
    pub fn new(target: ScanTarget) -> Self {
        Self {
            target,
            results: HashMap::new(),
            executed_probes: BTreeSet::new(),
            write_journal: Vec::new(),
        }
    }

    pub fn target(&self) -> &ScanTarget {
        &self.target
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Store a result, replacing any previous one
    pub fn put_result(
        &mut self,
        property: AnalyzedProperty,
        result: TestResult,
    ) -> Result<(), ReportError> {
        Self::validate_shape(property, &result)?;
        self.results.insert(property, result);
        self.write_journal.push(property);
        Ok(())
    }

    pub fn put_scalar(
        &mut self,
        property: AnalyzedProperty,
        value: TestResults,
    ) -> Result<(), ReportError> {
        self.put_result(property, TestResult::Scalar(value))
    }

    pub fn put_list<T, I>(&mut self, property: AnalyzedProperty, values: I) -> Result<(), ReportError>
    where
        T: Into<ListValue>,
        I: IntoIterator<Item = T>,
    {
        self.put_result(property, TestResult::List(ListResult::new(property, values)))
    }

    /// Record that a list-shaped property could not be determined
    pub fn put_absent_list(&mut self, property: AnalyzedProperty) -> Result<(), ReportError> {
        self.put_result(property, TestResult::List(ListResult::absent(property)))
    }

    /// Write a "no answer" state in whatever shape the property expects
    pub fn put_fallback(
        &mut self,
        property: AnalyzedProperty,
        status: TestResults,
    ) -> Result<(), ReportError> {
        match property.shape() {
            ResultShape::Scalar => self.put_scalar(property, status),
            ResultShape::List(_) => self.put_absent_list(property),
        }
    }

    fn validate_shape(property: AnalyzedProperty, result: &TestResult) -> Result<(), ReportError> {
        let expected = property.shape();
        if let TestResult::List(list) = result {
            if list.property() != property {
                return Err(ReportError::ListPropertyMismatch {
                    property,
                    list_property: list.property(),
                });
            }
        }

        match (expected, result) {
            (ResultShape::Scalar, TestResult::Scalar(_)) => Ok(()),
            (ResultShape::Scalar, TestResult::List(_)) => Err(ReportError::ShapeMismatch {
                property,
                expected,
                actual: "list".to_string(),
            }),
            (ResultShape::List(_), TestResult::Scalar(value)) => Err(ReportError::ShapeMismatch {
                property,
                expected,
                actual: format!("scalar {}", value),
            }),
            (ResultShape::List(kind), TestResult::List(list)) => {
                match list.list().into_iter().flatten().find(|v| v.kind() != kind) {
                    Some(wrong) => Err(ReportError::ShapeMismatch {
                        property,
                        expected,
                        actual: ResultShape::List(wrong.kind()).to_string(),
                    }),
                    None => Ok(()),
                }
            }
        }
    }

    pub fn mark_executed(&mut self, probe_type: ProbeType) {
        self.executed_probes.insert(probe_type);
    }

    /// Properties written since the last drain, in write order
    pub fn drain_writes(&mut self) -> Vec<AnalyzedProperty> {
        std::mem::take(&mut self.write_journal)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub fn get_result(&self, property: AnalyzedProperty) -> Option<&TestResult> {
        self.results.get(&property)
    }

    pub fn has_result(&self, property: AnalyzedProperty) -> bool {
        self.results.contains_key(&property)
    }

    /// Scalar read that fails when the property is list-shaped
    pub fn get_scalar_result(
        &self,
        property: AnalyzedProperty,
    ) -> Result<Option<TestResults>, ReportError> {
        if property.shape() != ResultShape::Scalar {
            return Err(ReportError::TypeMismatch {
                property,
                expected: property.shape(),
                requested: "scalar",
            });
        }
        Ok(self.results.get(&property).and_then(TestResult::as_scalar))
    }

    /// List read that fails when the property is scalar-shaped
    pub fn get_list_result(
        &self,
        property: AnalyzedProperty,
    ) -> Result<Option<&ListResult>, ReportError> {
        let expected = property.shape();
        if expected == ResultShape::Scalar {
            return Err(ReportError::TypeMismatch {
                property,
                expected,
                requested: "list",
            });
        }
        Ok(self.results.get(&property).and_then(TestResult::as_list))
    }

    /// Lenient scalar read used by requirement evaluation
    pub fn scalar_or_none(&self, property: AnalyzedProperty) -> Option<TestResults> {
        self.results.get(&property).and_then(TestResult::as_scalar)
    }

    pub fn is_probe_already_executed(&self, probe_type: ProbeType) -> bool {
        self.executed_probes.contains(&probe_type)
    }

    pub fn executed_probes(&self) -> impl Iterator<Item = ProbeType> + '_ {
        self.executed_probes.iter().copied()
    }

    pub fn result_map(&self) -> &HashMap<AnalyzedProperty, TestResult> {
        &self.results
    }

    /// Results keyed by stable property name, in name order
    pub fn to_property_map(&self) -> BTreeMap<String, PropertyEntry> {
        self.results
            .iter()
            .map(|(property, result)| {
                let entry = match result {
                    TestResult::Scalar(result) => PropertyEntry::Scalar { result: *result },
                    TestResult::List(list) => PropertyEntry::List {
                        values: list.list().map(<[_]>::to_vec),
                    },
                };
                (property.name().to_string(), entry)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    // ========================================================================
    // Typed convenience reads
    // ========================================================================

    /// Versions whose support property is TRUE, oldest first
    pub fn supported_protocol_versions(&self) -> Vec<ProtocolVersion> {
        ProtocolVersion::TLS
            .iter()
            .chain(ProtocolVersion::DTLS.iter())
            .copied()
            .filter(|version| {
                self.scalar_or_none(AnalyzedProperty::support_for(*version))
                    == Some(TestResults::True)
            })
            .collect()
    }

    pub fn supported_cipher_suites(&self) -> Vec<CipherSuite> {
        self.results
            .get(&AnalyzedProperty::SupportedCipherSuites)
            .and_then(TestResult::as_list)
            .map(ListResult::cipher_suites)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ListKind, SignatureAndHashAlgorithm};
    use assert_matches::assert_matches;

    fn report() -> ScanReport {
        ScanReport::new(ScanTarget::new("localhost", 443))
    }

    #[test]
    fn test_last_write_wins() {
        let mut report = report();
        report
            .put_scalar(AnalyzedProperty::SupportsTls12, TestResults::CouldNotTest)
            .unwrap();
        report
            .put_scalar(AnalyzedProperty::SupportsTls12, TestResults::True)
            .unwrap();

        assert_eq!(
            report.get_result(AnalyzedProperty::SupportsTls12),
            Some(&TestResult::Scalar(TestResults::True))
        );
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn test_scalar_into_list_property_is_rejected() {
        let mut report = report();
        let result = report.put_scalar(AnalyzedProperty::SupportedCipherSuites, TestResults::True);
        assert_matches!(
            result,
            Err(ReportError::ShapeMismatch {
                expected: ResultShape::List(ListKind::CipherSuite),
                ref actual,
                ..
            }) if actual == "scalar TRUE"
        );
        assert!(!report.has_result(AnalyzedProperty::SupportedCipherSuites));
    }

    #[test]
    fn test_wrong_element_kind_is_rejected() {
        let mut report = report();
        let result = report.put_list(
            AnalyzedProperty::SupportedCipherSuites,
            [ProtocolVersion::Tls12],
        );
        assert_matches!(
            result,
            Err(ReportError::ShapeMismatch { ref actual, .. }) if actual == "list of protocol versions"
        );
    }

    #[test]
    fn test_list_bound_to_other_property_is_rejected() {
        let mut report = report();
        let list = ListResult::new(
            AnalyzedProperty::SupportedSignatureAndHashAlgorithmsCert,
            [SignatureAndHashAlgorithm::RsaSha256],
        );
        let result = report.put_result(
            AnalyzedProperty::SupportedSignatureAndHashAlgorithmsSke,
            TestResult::List(list),
        );
        assert_matches!(result, Err(ReportError::ListPropertyMismatch { .. }));
    }

    #[test]
    fn test_get_list_result_on_scalar_is_type_mismatch() {
        let mut report = report();
        report
            .put_scalar(AnalyzedProperty::SupportsTls13, TestResults::True)
            .unwrap();
        assert_matches!(
            report.get_list_result(AnalyzedProperty::SupportsTls13),
            Err(ReportError::TypeMismatch { .. })
        );
        assert_matches!(
            report.get_scalar_result(AnalyzedProperty::SupportedProtocolVersions),
            Err(ReportError::TypeMismatch { .. })
        );
    }

    #[test]
    fn test_absent_list_reads_back_as_absent() {
        let mut report = report();
        report
            .put_fallback(AnalyzedProperty::SupportedCompressionMethods, TestResults::CouldNotTest)
            .unwrap();
        let list = report
            .get_list_result(AnalyzedProperty::SupportedCompressionMethods)
            .unwrap()
            .unwrap();
        assert!(list.is_absent());
    }

    #[test]
    fn test_executed_markers() {
        let mut report = report();
        assert!(!report.is_probe_already_executed(ProbeType::CipherSuite));
        report.mark_executed(ProbeType::CipherSuite);
        assert!(report.is_probe_already_executed(ProbeType::CipherSuite));
        assert_eq!(report.executed_probes().collect::<Vec<_>>(), vec![ProbeType::CipherSuite]);
    }

    #[test]
    fn test_write_journal_is_drained() {
        let mut report = report();
        report
            .put_scalar(AnalyzedProperty::SupportsTls10, TestResults::False)
            .unwrap();
        report
            .put_absent_list(AnalyzedProperty::SupportedPointFormats)
            .unwrap();
        assert_eq!(
            report.drain_writes(),
            vec![
                AnalyzedProperty::SupportsTls10,
                AnalyzedProperty::SupportedPointFormats
            ]
        );
        assert!(report.drain_writes().is_empty());
    }

    #[test]
    fn test_supported_protocol_versions_reads_true_flags() {
        let mut report = report();
        report
            .put_scalar(AnalyzedProperty::SupportsTls12, TestResults::True)
            .unwrap();
        report
            .put_scalar(AnalyzedProperty::SupportsTls10, TestResults::False)
            .unwrap();
        report
            .put_scalar(AnalyzedProperty::SupportsTls13, TestResults::True)
            .unwrap();
        assert_eq!(
            report.supported_protocol_versions(),
            vec![ProtocolVersion::Tls12, ProtocolVersion::Tls13]
        );
    }
}
