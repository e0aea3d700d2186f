//! # Guideline Engine
//!
//! Evaluates named checks over a finished [`ScanReport`](crate::report::ScanReport)
//! and produces tri-state verdicts with evidence.

pub mod check;
pub mod evaluation;
pub mod property_check;

pub use check::{
    allow_list_verdict, check_id, conditional_id, GuidelineCheck, GuidelineCheckResult,
    RequirementLevel,
};
pub use evaluation::{evaluate_check, Guideline, GuidelineEvaluator, GuidelineReport};
pub use property_check::AnalyzedPropertyGuidelineCheck;
