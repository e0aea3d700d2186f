//! Guideline check contract and result type

use crate::report::ScanReport;
use crate::requirements::Requirement;
use crate::types::{ListValue, TestResults};
use serde::{Deserialize, Serialize};
use std::fmt;

/// RFC 2119 requirement level attached to a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequirementLevel {
    Must,
    MustNot,
    Should,
    ShouldNot,
    May,
}

impl RequirementLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequirementLevel::Must => "MUST",
            RequirementLevel::MustNot => "MUST_NOT",
            RequirementLevel::Should => "SHOULD",
            RequirementLevel::ShouldNot => "SHOULD_NOT",
            RequirementLevel::May => "MAY",
        }
    }

    /// Whether a FALSE verdict at this level is a hard failure
    pub fn is_mandatory(&self) -> bool {
        matches!(self, RequirementLevel::Must | RequirementLevel::MustNot)
    }
}

impl fmt::Display for RequirementLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named rule evaluated over a finished report
///
/// Checks are pure: the same report always yields the same result. A check
/// whose input properties are absent returns UNCERTAIN without evidence.
pub trait GuidelineCheck: Send + Sync {
    fn name(&self) -> &str;

    fn requirement_level(&self) -> RequirementLevel;

    /// Applicability predicate; when it does not hold the check is UNCERTAIN
    fn condition(&self) -> Option<&Requirement> {
        None
    }

    fn evaluate(&self, report: &ScanReport) -> GuidelineCheckResult;

    /// Stable identity built from the check kind, level and parameters
    fn id(&self) -> String;
}

/// Append `_WHEN_<condition>` to an id when the check is conditional
pub fn conditional_id(id: String, condition: Option<&Requirement>) -> String {
    match condition {
        Some(condition) => format!("{}_WHEN_{}", id, condition),
        None => id,
    }
}

/// Build an id of the form `Prefix_LEVEL_[p1, p2]`
pub fn check_id<T: fmt::Display>(prefix: &str, level: RequirementLevel, parameters: &[T]) -> String {
    let rendered: Vec<String> = parameters.iter().map(ToString::to_string).collect();
    format!("{}_{}_[{}]", prefix, level, rendered.join(", "))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidelineCheckResult {
    pub id: String,
    pub name: String,
    pub level: RequirementLevel,
    pub result: TestResults,
    /// False when the check's condition did not hold
    pub condition_met: bool,
    /// Offending items, sorted and de-duplicated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Vec<ListValue>>,
}

impl GuidelineCheckResult {
    pub fn new(check: &dyn GuidelineCheck, result: TestResults) -> Self {
        Self {
            id: check.id(),
            name: check.name().to_string(),
            level: check.requirement_level(),
            result,
            condition_met: true,
            evidence: None,
        }
    }

    /// UNCERTAIN because the required data is missing
    pub fn uncertain(check: &dyn GuidelineCheck) -> Self {
        Self::new(check, TestResults::Uncertain)
    }

    /// UNCERTAIN because the check does not apply to this target
    pub fn condition_not_met(check: &dyn GuidelineCheck) -> Self {
        Self {
            condition_met: false,
            ..Self::uncertain(check)
        }
    }

    pub fn with_evidence(mut self, evidence: impl IntoIterator<Item = ListValue>) -> Self {
        let mut evidence: Vec<ListValue> = evidence.into_iter().collect();
        evidence.sort();
        evidence.dedup();
        self.evidence = Some(evidence);
        self
    }
}

/// Allow-list verdict over observed items
///
/// FALSE with the disallowed subset as evidence, or TRUE with empty evidence.
/// Callers decide UNCERTAIN before calling when the data is missing.
pub fn allow_list_verdict<T>(observed: &[T], allowed: &[T]) -> (TestResults, Vec<ListValue>)
where
    T: Copy + PartialEq + Into<ListValue>,
{
    let disallowed: Vec<ListValue> = observed
        .iter()
        .filter(|item| !allowed.contains(*item))
        .map(|item| (*item).into())
        .collect();
    (TestResults::of(disallowed.is_empty()), disallowed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SignatureAndHashAlgorithm;

    #[test]
    fn test_check_id_format() {
        let id = check_id(
            "SignatureAndHashAlgorithms",
            RequirementLevel::Should,
            &[SignatureAndHashAlgorithm::RsaSha256, SignatureAndHashAlgorithm::EcdsaSha256],
        );
        assert_eq!(
            id,
            "SignatureAndHashAlgorithms_SHOULD_[RSA_SHA256, ECDSA_SHA256]"
        );
    }

    #[test]
    fn test_allow_list_verdict() {
        let allowed = [SignatureAndHashAlgorithm::RsaSha1];
        let (result, evidence) = allow_list_verdict(&[SignatureAndHashAlgorithm::RsaSha1], &allowed);
        assert_eq!(result, TestResults::True);
        assert!(evidence.is_empty());

        let (result, evidence) = allow_list_verdict(&[SignatureAndHashAlgorithm::DsaSha1], &allowed);
        assert_eq!(result, TestResults::False);
        assert_eq!(
            evidence,
            vec![ListValue::SignatureAndHashAlgorithm(SignatureAndHashAlgorithm::DsaSha1)]
        );
    }

    #[test]
    fn test_level_strings() {
        assert_eq!(RequirementLevel::MustNot.to_string(), "MUST_NOT");
        assert!(RequirementLevel::Must.is_mandatory());
        assert!(!RequirementLevel::May.is_mandatory());
    }
}
