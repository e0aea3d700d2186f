//! Allowed protocol versions

use tls_scanner_base::guideline::{
    allow_list_verdict, check_id, conditional_id, GuidelineCheck, GuidelineCheckResult,
    RequirementLevel,
};
use tls_scanner_base::report::ScanReport;
use tls_scanner_base::requirements::Requirement;
use tls_scanner_base::types::{AnalyzedProperty, ProtocolVersion};

pub struct ProtocolVersionGuidelineCheck {
    name: String,
    level: RequirementLevel,
    condition: Option<Requirement>,
    recommended: Vec<ProtocolVersion>,
}

impl ProtocolVersionGuidelineCheck {
    pub fn new(
        name: impl Into<String>,
        level: RequirementLevel,
        recommended: Vec<ProtocolVersion>,
    ) -> Self {
        Self {
            name: name.into(),
            level,
            condition: None,
            recommended,
        }
    }

    pub fn with_condition(mut self, condition: Requirement) -> Self {
        self.condition = Some(condition);
        self
    }
}

impl GuidelineCheck for ProtocolVersionGuidelineCheck {
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
        match report.get_list_result(AnalyzedProperty::SupportedProtocolVersions) {
            Ok(Some(list)) if !list.is_absent() => {
                let (result, evidence) =
                    allow_list_verdict(&list.protocol_versions(), &self.recommended);
                GuidelineCheckResult::new(self, result).with_evidence(evidence)
            }
            _ => GuidelineCheckResult::uncertain(self),
        }
    }

    fn id(&self) -> String {
        conditional_id(
            check_id("ProtocolVersion", self.level, &self.recommended),
            self.condition.as_ref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tls_scanner_base::guideline::evaluate_check;
    use tls_scanner_base::types::{ListValue, ScanTarget, TestResults};

    fn check() -> ProtocolVersionGuidelineCheck {
        ProtocolVersionGuidelineCheck::new(
            "Modern versions only",
            RequirementLevel::Must,
            vec![ProtocolVersion::Tls12, ProtocolVersion::Tls13],
        )
    }

    #[test]
    fn test_legacy_version_fails() {
        let mut report = ScanReport::new(ScanTarget::new("localhost", 443));
        report
            .put_list(
                AnalyzedProperty::SupportedProtocolVersions,
                [ProtocolVersion::Ssl3, ProtocolVersion::Tls12],
            )
            .unwrap();

        let result = evaluate_check(&check(), &report);
        assert_eq!(result.result, TestResults::False);
        assert_eq!(
            result.evidence,
            Some(vec![ListValue::ProtocolVersion(ProtocolVersion::Ssl3)])
        );
        assert_eq!(check().id(), "ProtocolVersion_MUST_[TLS12, TLS13]");
    }

    #[test]
    fn test_absent_list_is_uncertain() {
        let mut report = ScanReport::new(ScanTarget::new("localhost", 443));
        report
            .put_absent_list(AnalyzedProperty::SupportedProtocolVersions)
            .unwrap();
        let result = evaluate_check(&check(), &report);
        assert_eq!(result.result, TestResults::Uncertain);
        assert_eq!(result.evidence, None);
    }
}
