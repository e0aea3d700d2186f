//! Allowed cipher suites, optionally scoped to protocol versions

use tls_scanner_base::guideline::{
    allow_list_verdict, check_id, GuidelineCheck, GuidelineCheckResult, RequirementLevel,
};
use tls_scanner_base::report::ScanReport;
use tls_scanner_base::requirements::Requirement;
use tls_scanner_base::types::{AnalyzedProperty, CipherSuite, ProtocolVersion};

pub struct CipherSuiteGuidelineCheck {
    name: String,
    level: RequirementLevel,
    condition: Option<Requirement>,
    recommended: Vec<CipherSuite>,
    versions: Vec<ProtocolVersion>,
}

impl CipherSuiteGuidelineCheck {
    /// With non-empty `versions` the check only applies when one of them is
    /// supported, and only suites the server negotiated under those versions
    /// are judged.
    pub fn new(
        name: impl Into<String>,
        level: RequirementLevel,
        recommended: Vec<CipherSuite>,
        versions: Vec<ProtocolVersion>,
    ) -> Self {
        let condition = if versions.is_empty() {
            None
        } else {
            Some(Requirement::any_property_true(
                versions.iter().map(|v| AnalyzedProperty::support_for(*v)),
            ))
        };
        Self {
            name: name.into(),
            level,
            condition,
            recommended,
            versions,
        }
    }

    pub fn versions(&self) -> &[ProtocolVersion] {
        &self.versions
    }

    /// Suites under judgement, or `None` when the needed list was not tested
    fn observed(&self, report: &ScanReport) -> Option<Vec<CipherSuite>> {
        if self.versions.is_empty() {
            return match report.get_list_result(AnalyzedProperty::SupportedCipherSuites) {
                Ok(Some(list)) if !list.is_absent() => Some(list.cipher_suites()),
                _ => None,
            };
        }
        let pairs = match report.get_list_result(AnalyzedProperty::SupportedVersionSuitePairs) {
            Ok(Some(list)) if !list.is_absent() => list.version_suite_pairs(),
            _ => return None,
        };
        let mut observed = Vec::new();
        for pair in pairs {
            if self.versions.contains(&pair.version) && !observed.contains(&pair.suite) {
                observed.push(pair.suite);
            }
        }
        Some(observed)
    }
}

impl GuidelineCheck for CipherSuiteGuidelineCheck {
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
        let observed = match self.observed(report) {
            Some(observed) => observed,
            None => return GuidelineCheckResult::uncertain(self),
        };
        let (result, evidence) = allow_list_verdict(&observed, &self.recommended);
        GuidelineCheckResult::new(self, result).with_evidence(evidence)
    }

    fn id(&self) -> String {
        let prefix = if self.versions.is_empty() {
            "CipherSuite".to_string()
        } else {
            let versions: Vec<&str> = self.versions.iter().map(|v| v.name()).collect();
            format!("CipherSuite_{}", versions.join("_"))
        };
        check_id(&prefix, self.level, &self.recommended)
    }
}
