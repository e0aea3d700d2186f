//! Allowed signature algorithms, ignoring the hash component

use tls_scanner_base::guideline::{
    allow_list_verdict, check_id, conditional_id, GuidelineCheck, GuidelineCheckResult,
    RequirementLevel,
};
use tls_scanner_base::report::ScanReport;
use tls_scanner_base::requirements::Requirement;
use tls_scanner_base::types::{AnalyzedProperty, SignatureAlgorithm};

const SOURCES: [AnalyzedProperty; 2] = [
    AnalyzedProperty::SupportedSignatureAndHashAlgorithmsCert,
    AnalyzedProperty::SupportedSignatureAndHashAlgorithmsSke,
];

pub struct SignatureAlgorithmsGuidelineCheck {
    name: String,
    level: RequirementLevel,
    condition: Option<Requirement>,
    recommended: Vec<SignatureAlgorithm>,
}

impl SignatureAlgorithmsGuidelineCheck {
    pub fn new(
        name: impl Into<String>,
        level: RequirementLevel,
        recommended: Vec<SignatureAlgorithm>,
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

impl GuidelineCheck for SignatureAlgorithmsGuidelineCheck {
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
        let lists: Vec<_> = SOURCES
            .iter()
            .filter_map(|property| report.get_list_result(*property).ok().flatten())
            .filter(|list| !list.is_absent())
            .collect();
        if lists.is_empty() {
            return GuidelineCheckResult::uncertain(self);
        }

        let observed: Vec<SignatureAlgorithm> = lists
            .iter()
            .flat_map(|list| list.signature_and_hash_algorithms())
            .map(|algorithm| algorithm.signature_algorithm())
            .collect();
        let (result, evidence) = allow_list_verdict(&observed, &self.recommended);
        GuidelineCheckResult::new(self, result).with_evidence(evidence)
    }

    fn id(&self) -> String {
        conditional_id(
            check_id("SignatureAlgorithms", self.level, &self.recommended),
            self.condition.as_ref(),
        )
    }
}
