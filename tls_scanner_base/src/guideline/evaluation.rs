//! Named check collections and their evaluation

use super::check::{GuidelineCheck, GuidelineCheckResult};
use crate::logging::codes;
use crate::report::ScanReport;
use crate::types::TestResults;
use serde::{Deserialize, Serialize};

/// Evaluate one check, honouring its applicability condition
pub fn evaluate_check(check: &dyn GuidelineCheck, report: &ScanReport) -> GuidelineCheckResult {
    if let Some(condition) = check.condition() {
        if !condition.evaluate(report) {
            log_debug!(
                "Guideline check not applicable",
                "check" => check.id(),
                "condition" => condition
            );
            return GuidelineCheckResult::condition_not_met(check);
        }
    }
    check.evaluate(report)
}

/// Stateless entry points over guidelines and single checks
pub struct GuidelineEvaluator;

impl GuidelineEvaluator {
    pub fn evaluate_check(check: &dyn GuidelineCheck, report: &ScanReport) -> GuidelineCheckResult {
        evaluate_check(check, report)
    }

    pub fn evaluate(guideline: &Guideline, report: &ScanReport) -> GuidelineReport {
        guideline.evaluate(report)
    }
}

/// Ordered set of checks, unique by id
pub struct Guideline {
    name: String,
    link: Option<String>,
    checks: Vec<Box<dyn GuidelineCheck>>,
}

impl Guideline {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            link: None,
            checks: Vec::new(),
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Add a check; returns false and drops it when an equal id is present
    pub fn add_check(&mut self, check: Box<dyn GuidelineCheck>) -> bool {
        let id = check.id();
        if self.checks.iter().any(|existing| existing.id() == id) {
            log_warning!(
                codes::guideline::DUPLICATE_CHECK,
                "Ignoring duplicate guideline check",
                "guideline" => self.name,
                "check" => id
            );
            return false;
        }
        self.checks.push(check);
        true
    }

    pub fn with_check(mut self, check: Box<dyn GuidelineCheck>) -> Self {
        self.add_check(check);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    pub fn checks(&self) -> &[Box<dyn GuidelineCheck>] {
        &self.checks
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Evaluate every check against a finished report
    pub fn evaluate(&self, report: &ScanReport) -> GuidelineReport {
        let results: Vec<GuidelineCheckResult> = self
            .checks
            .iter()
            .map(|check| evaluate_check(check.as_ref(), report))
            .collect();

        for failed in results.iter().filter(|r| r.result == TestResults::False) {
            log_info!(
                "Guideline check failed",
                "code" => codes::guideline::CHECK_FAILED,
                "guideline" => self.name,
                "check" => failed.id,
                "level" => failed.level
            );
        }

        GuidelineReport {
            guideline_name: self.name.clone(),
            link: self.link.clone(),
            results,
        }
    }
}

impl std::fmt::Debug for Guideline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<String> = self.checks.iter().map(|check| check.id()).collect();
        f.debug_struct("Guideline")
            .field("name", &self.name)
            .field("checks", &ids)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidelineReport {
    pub guideline_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub results: Vec<GuidelineCheckResult>,
}

impl GuidelineReport {
    pub fn passed(&self) -> Vec<&GuidelineCheckResult> {
        self.with_result(TestResults::True)
    }

    pub fn failed(&self) -> Vec<&GuidelineCheckResult> {
        self.with_result(TestResults::False)
    }

    pub fn uncertain(&self) -> Vec<&GuidelineCheckResult> {
        self.results
            .iter()
            .filter(|r| !r.result.is_definite())
            .collect()
    }

    pub fn has_failures(&self) -> bool {
        self.results.iter().any(|r| r.result == TestResults::False)
    }

    fn with_result(&self, result: TestResults) -> Vec<&GuidelineCheckResult> {
        self.results.iter().filter(|r| r.result == result).collect()
    }

    pub fn summary(&self) -> String {
        format!(
            "Guideline: {}\n\
             Checks: {}\n\
             Passed: {}\n\
             Failed: {}\n\
             Uncertain: {}",
            self.guideline_name,
            self.results.len(),
            self.passed().len(),
            self.failed().len(),
            self.uncertain().len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guideline::{AnalyzedPropertyGuidelineCheck, RequirementLevel};
    use crate::requirements::Requirement;
    use crate::types::{AnalyzedProperty, ScanTarget};

    fn ssl3_check() -> Box<dyn GuidelineCheck> {
        Box::new(AnalyzedPropertyGuidelineCheck::new(
            "No SSL 3.0",
            RequirementLevel::MustNot,
            AnalyzedProperty::SupportsSsl3,
            TestResults::False,
        ))
    }

    fn report() -> ScanReport {
        let mut report = ScanReport::new(ScanTarget::new("localhost", 443));
        report
            .put_scalar(AnalyzedProperty::SupportsSsl3, TestResults::True)
            .unwrap();
        report
            .put_scalar(AnalyzedProperty::SupportsTls13, TestResults::False)
            .unwrap();
        report
    }

    #[test]
    fn test_duplicate_ids_are_ignored() {
        let mut guideline = Guideline::new("test");
        assert!(guideline.add_check(ssl3_check()));
        assert!(!guideline.add_check(ssl3_check()));
        assert_eq!(guideline.len(), 1);
    }

    #[test]
    fn test_unmet_condition_yields_uncertain() {
        let check = AnalyzedPropertyGuidelineCheck::new(
            "TLS 1.3 only check",
            RequirementLevel::Should,
            AnalyzedProperty::SupportsSsl3,
            TestResults::False,
        )
        .with_condition(Requirement::property_true([AnalyzedProperty::SupportsTls13]));

        let result = evaluate_check(&check, &report());
        assert_eq!(result.result, TestResults::Uncertain);
        assert!(!result.condition_met);
        assert_eq!(result.evidence, None);
    }

    #[test]
    fn test_evaluate_partitions_results() {
        let guideline = Guideline::new("test")
            .with_link("https://example.org/guideline")
            .with_check(ssl3_check())
            .with_check(Box::new(AnalyzedPropertyGuidelineCheck::new(
                "TLS 1.3 recommended",
                RequirementLevel::Should,
                AnalyzedProperty::SupportsTls13,
                TestResults::False,
            )))
            .with_check(Box::new(AnalyzedPropertyGuidelineCheck::new(
                "Compression disabled",
                RequirementLevel::MustNot,
                AnalyzedProperty::SupportsTlsCompression,
                TestResults::False,
            )));

        let guideline_report = guideline.evaluate(&report());
        assert_eq!(guideline_report.results.len(), 3);
        assert_eq!(guideline_report.failed().len(), 1);
        assert_eq!(guideline_report.passed().len(), 1);
        assert_eq!(guideline_report.uncertain().len(), 1);
        assert!(guideline_report.has_failures());
        assert!(guideline_report.summary().contains("Failed: 1"));
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let guideline = Guideline::new("test").with_check(ssl3_check());
        let report = report();
        assert_eq!(guideline.evaluate(&report), guideline.evaluate(&report));
    }
}
