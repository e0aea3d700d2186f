//! Allowed signature and hash algorithm pairs

use tls_scanner_base::guideline::{
    allow_list_verdict, check_id, conditional_id, GuidelineCheck, GuidelineCheckResult,
    RequirementLevel,
};
use tls_scanner_base::report::ScanReport;
use tls_scanner_base::requirements::Requirement;
use tls_scanner_base::types::{AnalyzedProperty, SignatureAndHashAlgorithm};

pub struct SignatureAndHashAlgorithmsGuidelineCheck {
    name: String,
    level: RequirementLevel,
    condition: Option<Requirement>,
    recommended: Vec<SignatureAndHashAlgorithm>,
    tls13: bool,
}

impl SignatureAndHashAlgorithmsGuidelineCheck {
    pub fn new(
        name: impl Into<String>,
        level: RequirementLevel,
        recommended: Vec<SignatureAndHashAlgorithm>,
        tls13: bool,
    ) -> Self {
        Self {
            name: name.into(),
            level,
            condition: None,
            recommended,
            tls13,
        }
    }

    pub fn with_condition(mut self, condition: Requirement) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn recommended(&self) -> &[SignatureAndHashAlgorithm] {
        &self.recommended
    }

    pub fn is_tls13(&self) -> bool {
        self.tls13
    }

    /// Observed algorithms: the TLS 1.3 list, or certificate plus SKE
    fn observed(&self, report: &ScanReport) -> Vec<SignatureAndHashAlgorithm> {
        let properties: &[AnalyzedProperty] = if self.tls13 {
            &[AnalyzedProperty::SupportedSignatureAndHashAlgorithmsTls13]
        } else {
            &[
                AnalyzedProperty::SupportedSignatureAndHashAlgorithmsCert,
                AnalyzedProperty::SupportedSignatureAndHashAlgorithmsSke,
            ]
        };
        properties
            .iter()
            .filter_map(|property| report.get_list_result(*property).ok().flatten())
            .flat_map(|list| list.signature_and_hash_algorithms())
            .collect()
    }
}

impl GuidelineCheck for SignatureAndHashAlgorithmsGuidelineCheck {
    fn name(&self) -> &str {
        &self.name
    }

    fn requirement_level(&self) -> RequirementLevel {
        self.level
    }

    fn condition(&self) -> Option<&Requirement> {
        self.condition.as_ref()
    }

    fn evaluate(&self, report: &ScanReport) -> GuidelineCheckResult {
        let observed = self.observed(report);
        if observed.is_empty() {
            return GuidelineCheckResult::uncertain(self);
        }
        let (result, evidence) = allow_list_verdict(&observed, &self.recommended);
        GuidelineCheckResult::new(self, result).with_evidence(evidence)
    }

    fn id(&self) -> String {
        let prefix = if self.tls13 {
            "SignatureAndHashAlgorithms_TLS13"
        } else {
            "SignatureAndHashAlgorithms"
        };
        conditional_id(
            check_id(prefix, self.level, &self.recommended),
            self.condition.as_ref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tls_scanner_base::guideline::evaluate_check;
    use tls_scanner_base::types::{ListValue, ScanTarget, TestResults};

    fn report_with_cert(algorithms: &[SignatureAndHashAlgorithm]) -> ScanReport {
        let mut report = ScanReport::new(ScanTarget::new("localhost", 443));
        report
            .put_list(
                AnalyzedProperty::SupportedSignatureAndHashAlgorithmsCert,
                algorithms.iter().copied(),
            )
            .unwrap();
        report
    }

    fn check() -> SignatureAndHashAlgorithmsGuidelineCheck {
        SignatureAndHashAlgorithmsGuidelineCheck::new(
            "Signature algorithms",
            RequirementLevel::Should,
            vec![SignatureAndHashAlgorithm::RsaSha1],
            false,
        )
    }

    #[test]
    fn test_recommended_algorithm_passes() {
        let result = evaluate_check(&check(), &report_with_cert(&[SignatureAndHashAlgorithm::RsaSha1]));
        assert_eq!(result.result, TestResults::True);
        assert_eq!(result.evidence, Some(Vec::new()));
    }

    #[test]
    fn test_unrecommended_algorithm_fails_with_evidence() {
        let result = evaluate_check(&check(), &report_with_cert(&[SignatureAndHashAlgorithm::DsaSha1]));
        assert_eq!(result.result, TestResults::False);
        assert_eq!(
            result.evidence,
            Some(vec![ListValue::SignatureAndHashAlgorithm(
                SignatureAndHashAlgorithm::DsaSha1
            )])
        );
    }

    #[test]
    fn test_missing_property_is_uncertain() {
        let report = ScanReport::new(ScanTarget::new("localhost", 443));
        let result = evaluate_check(&check(), &report);
        assert_eq!(result.result, TestResults::Uncertain);
        assert_eq!(result.evidence, None);
    }

    #[test]
    fn test_combines_cert_and_ske() {
        let mut report = report_with_cert(&[SignatureAndHashAlgorithm::RsaSha1]);
        report
            .put_list(
                AnalyzedProperty::SupportedSignatureAndHashAlgorithmsSke,
                [SignatureAndHashAlgorithm::RsaMd5, SignatureAndHashAlgorithm::RsaMd5],
            )
            .unwrap();

        let result = evaluate_check(&check(), &report);
        assert_eq!(result.result, TestResults::False);
        assert_eq!(
            result.evidence,
            Some(vec![ListValue::SignatureAndHashAlgorithm(
                SignatureAndHashAlgorithm::RsaMd5
            )])
        );
    }

    #[test]
    fn test_tls13_reads_only_tls13_list() {
        let check = SignatureAndHashAlgorithmsGuidelineCheck::new(
            "TLS 1.3 signature schemes",
            RequirementLevel::Must,
            vec![SignatureAndHashAlgorithm::RsaPssRsaeSha256],
            true,
        );
        let report = report_with_cert(&[SignatureAndHashAlgorithm::DsaSha1]);
        assert_eq!(evaluate_check(&check, &report).result, TestResults::Uncertain);
        assert_eq!(
            check.id(),
            "SignatureAndHashAlgorithms_TLS13_MUST_[RSA_PSS_RSAE_SHA256]"
        );
    }
}
