//! # Requirements
//!
//! Composable predicates over a [`ScanReport`]. A probe becomes runnable once
//! its requirement holds, and guideline checks use the same tree to decide
//! whether they apply at all.
//!
//! Evaluation is pure and total: a property missing from the report, or a
//! list-shaped property compared against a scalar, simply evaluates false.

use crate::report::ScanReport;
use crate::types::{AnalyzedProperty, ProbeType, TestResults};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Always satisfied
    NoRequirement,

    /// Every listed property holds `expected`; an empty list is satisfied
    PropertyEquals {
        properties: Vec<AnalyzedProperty>,
        expected: TestResults,
    },

    /// The probe's results are already merged into the report
    ProbeExecuted(ProbeType),

    And(Vec<Requirement>),
    Or(Vec<Requirement>),
    Not(Box<Requirement>),
}

impl Requirement {
    // ========================================================================
    // Construction helpers
    // ========================================================================

    pub fn property_equals(
        properties: impl IntoIterator<Item = AnalyzedProperty>,
        expected: TestResults,
    ) -> Self {
        Requirement::PropertyEquals {
            properties: properties.into_iter().collect(),
            expected,
        }
    }

    pub fn property_true(properties: impl IntoIterator<Item = AnalyzedProperty>) -> Self {
        Self::property_equals(properties, TestResults::True)
    }

    pub fn property_false(properties: impl IntoIterator<Item = AnalyzedProperty>) -> Self {
        Self::property_equals(properties, TestResults::False)
    }

    pub fn probe_executed(probe_type: ProbeType) -> Self {
        Requirement::ProbeExecuted(probe_type)
    }

    /// Disjunction of single-property TRUE checks
    pub fn any_property_true(properties: impl IntoIterator<Item = AnalyzedProperty>) -> Self {
        Requirement::Or(
            properties
                .into_iter()
                .map(|property| Self::property_true([property]))
                .collect(),
        )
    }

    /// Conjoin with `other`, flattening nested conjunctions
    pub fn and(self, other: Requirement) -> Self {
        match (self, other) {
            (Requirement::NoRequirement, other) => other,
            (this, Requirement::NoRequirement) => this,
            (Requirement::And(mut left), Requirement::And(right)) => {
                left.extend(right);
                Requirement::And(left)
            }
            (Requirement::And(mut left), other) => {
                left.push(other);
                Requirement::And(left)
            }
            (this, other) => Requirement::And(vec![this, other]),
        }
    }

    /// Disjoin with `other`, flattening nested disjunctions
    pub fn or(self, other: Requirement) -> Self {
        match (self, other) {
            (Requirement::Or(mut left), Requirement::Or(right)) => {
                left.extend(right);
                Requirement::Or(left)
            }
            (Requirement::Or(mut left), other) => {
                left.push(other);
                Requirement::Or(left)
            }
            (this, other) => Requirement::Or(vec![this, other]),
        }
    }

    pub fn negate(self) -> Self {
        Requirement::Not(Box::new(self))
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    pub fn evaluate(&self, report: &ScanReport) -> bool {
        match self {
            Requirement::NoRequirement => true,
            Requirement::PropertyEquals {
                properties,
                expected,
            } => properties
                .iter()
                .all(|property| report.scalar_or_none(*property) == Some(*expected)),
            Requirement::ProbeExecuted(probe_type) => report.is_probe_already_executed(*probe_type),
            Requirement::And(children) => children.iter().all(|child| child.evaluate(report)),
            Requirement::Or(children) => children.iter().any(|child| child.evaluate(report)),
            Requirement::Not(inner) => !inner.evaluate(report),
        }
    }

    /// Unsatisfied parts of this requirement, for diagnostics
    ///
    /// Conjunctions are descended into; any other unsatisfied node is
    /// reported whole, except property checks which are narrowed to the
    /// properties that failed.
    pub fn missing(&self, report: &ScanReport) -> Vec<Requirement> {
        if self.evaluate(report) {
            return Vec::new();
        }
        match self {
            Requirement::And(children) => children
                .iter()
                .flat_map(|child| child.missing(report))
                .collect(),
            Requirement::PropertyEquals {
                properties,
                expected,
            } => vec![Requirement::PropertyEquals {
                properties: properties
                    .iter()
                    .copied()
                    .filter(|property| report.scalar_or_none(*property) != Some(*expected))
                    .collect(),
                expected: *expected,
            }],
            other => vec![other.clone()],
        }
    }

    pub fn referenced_properties(&self) -> Vec<AnalyzedProperty> {
        let mut out = Vec::new();
        self.visit(&mut |node| {
            if let Requirement::PropertyEquals { properties, .. } = node {
                out.extend(properties.iter().copied());
            }
        });
        out.sort();
        out.dedup();
        out
    }

    pub fn referenced_probe_types(&self) -> Vec<ProbeType> {
        let mut out = Vec::new();
        self.visit(&mut |node| {
            if let Requirement::ProbeExecuted(probe_type) = node {
                out.push(*probe_type);
            }
        });
        out.sort();
        out.dedup();
        out
    }

    fn visit(&self, f: &mut dyn FnMut(&Requirement)) {
        f(self);
        match self {
            Requirement::And(children) | Requirement::Or(children) => {
                for child in children {
                    child.visit(f);
                }
            }
            Requirement::Not(inner) => inner.visit(f),
            _ => {}
        }
    }
}

impl Default for Requirement {
    fn default() -> Self {
        Requirement::NoRequirement
    }
}

impl std::ops::Not for Requirement {
    type Output = Requirement;

    fn not(self) -> Self::Output {
        self.negate()
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::NoRequirement => f.write_str("ALWAYS"),
            Requirement::PropertyEquals {
                properties,
                expected,
            } => {
                let names: Vec<&str> = properties.iter().map(|p| p.name()).collect();
                match names.as_slice() {
                    [single] => write!(f, "{} == {}", single, expected),
                    _ => write!(f, "[{}] == {}", names.join(", "), expected),
                }
            }
            Requirement::ProbeExecuted(probe_type) => write!(f, "EXECUTED({})", probe_type),
            Requirement::And(children) => write_joined(f, children, " AND ", "ALWAYS"),
            Requirement::Or(children) => write_joined(f, children, " OR ", "NEVER"),
            Requirement::Not(inner) => write!(f, "NOT({})", inner),
        }
    }
}

fn write_joined(
    f: &mut fmt::Formatter<'_>,
    children: &[Requirement],
    separator: &str,
    empty: &str,
) -> fmt::Result {
    if children.is_empty() {
        return f.write_str(empty);
    }
    let parts: Vec<String> = children.iter().map(ToString::to_string).collect();
    write!(f, "({})", parts.join(separator))
}
