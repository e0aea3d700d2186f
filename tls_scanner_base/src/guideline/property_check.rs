use super::check::{conditional_id, GuidelineCheck, GuidelineCheckResult, RequirementLevel};
use crate::report::ScanReport;
use crate::requirements::Requirement;
use crate::types::{AnalyzedProperty, TestResults};

/// Expects a scalar property to hold a specific value
pub struct AnalyzedPropertyGuidelineCheck {
    name: String,
    level: RequirementLevel,
    property: AnalyzedProperty,
    expected: TestResults,
    condition: Option<Requirement>,
}

impl AnalyzedPropertyGuidelineCheck {
    pub fn new(
        name: impl Into<String>,
        level: RequirementLevel,
        property: AnalyzedProperty,
        expected: TestResults,
    ) -> Self {
        Self {
            name: name.into(),
            level,
            property,
            expected,
            condition: None,
        }
    }

    pub fn with_condition(mut self, condition: Requirement) -> Self {
        self.condition = Some(condition);
        self
    }
}

impl GuidelineCheck for AnalyzedPropertyGuidelineCheck {
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
        match report.scalar_or_none(self.property) {
            Some(actual) if actual == self.expected => {
                GuidelineCheckResult::new(self, TestResults::True)
            }
            Some(actual) if actual.is_definite() => GuidelineCheckResult::new(self, TestResults::False),
            _ => GuidelineCheckResult::uncertain(self),
        }
    }

    fn id(&self) -> String {
        let id = format!(
            "AnalyzedProperty_{}_{}_{}",
            self.level, self.property, self.expected
        );
        conditional_id(id, self.condition.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guideline::Guideline;
    use crate::types::ScanTarget;

    fn check() -> AnalyzedPropertyGuidelineCheck {
        AnalyzedPropertyGuidelineCheck::new(
            "Servers must not support SSL 3.0",
            RequirementLevel::MustNot,
            AnalyzedProperty::SupportsSsl3,
            TestResults::False,
        )
    }

    #[test]
    fn test_matching_value_passes() {
        let mut report = ScanReport::new(ScanTarget::new("localhost", 443));
        report
            .put_scalar(AnalyzedProperty::SupportsSsl3, TestResults::False)
            .unwrap();
        assert_eq!(check().evaluate(&report).result, TestResults::True);
    }

    #[test]
    fn test_other_definite_value_fails() {
        let mut report = ScanReport::new(ScanTarget::new("localhost", 443));
        report
            .put_scalar(AnalyzedProperty::SupportsSsl3, TestResults::True)
            .unwrap();
        let result = check().evaluate(&report);
        assert_eq!(result.result, TestResults::False);
        assert_eq!(result.evidence, None);
    }

    #[test]
    fn test_missing_or_inconclusive_is_uncertain() {
        let mut report = ScanReport::new(ScanTarget::new("localhost", 443));
        assert_eq!(check().evaluate(&report).result, TestResults::Uncertain);
        report
            .put_scalar(AnalyzedProperty::SupportsSsl3, TestResults::ErrorDuringTest)
            .unwrap();
        assert_eq!(check().evaluate(&report).result, TestResults::Uncertain);
    }

    #[test]
    fn test_id_is_stable() {
        assert_eq!(check().id(), "AnalyzedProperty_MUST_NOT_SUPPORTS_SSL_3_FALSE");
        assert_eq!(check().id(), check().id());
    }

    #[test]
    fn test_checks_differing_by_condition_are_distinct() {
        let when_tls12 =
            check().with_condition(Requirement::property_true([AnalyzedProperty::SupportsTls12]));
        let when_tls13 =
            check().with_condition(Requirement::property_true([AnalyzedProperty::SupportsTls13]));
        assert_eq!(
            when_tls12.id(),
            "AnalyzedProperty_MUST_NOT_SUPPORTS_SSL_3_FALSE_WHEN_SUPPORTS_TLS_1_2 == TRUE"
        );
        assert_ne!(when_tls12.id(), when_tls13.id());
        assert_ne!(when_tls12.id(), check().id());

        let mut guideline = Guideline::new("baseline");
        assert!(guideline.add_check(Box::new(check())));
        assert!(guideline.add_check(Box::new(when_tls12)));
        assert!(guideline.add_check(Box::new(when_tls13)));
        assert!(!guideline.add_check(Box::new(check())));
        assert_eq!(guideline.len(), 3);
    }
}
