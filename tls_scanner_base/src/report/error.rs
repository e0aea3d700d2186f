use crate::types::{AnalyzedProperty, ResultShape};

/// Report contract violations. These indicate a programming error in a probe
/// or check, never a property of the scanned server.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportError {
    #[error("Type mismatch reading '{property}': registered as {expected}, requested {requested}")]
    TypeMismatch {
        property: AnalyzedProperty,
        expected: ResultShape,
        requested: &'static str,
    },

    #[error("Shape mismatch writing '{property}': registered as {expected}, got {actual}")]
    ShapeMismatch {
        property: AnalyzedProperty,
        expected: ResultShape,
        actual: String,
    },

    #[error("List result for '{list_property}' cannot be stored under '{property}'")]
    ListPropertyMismatch {
        property: AnalyzedProperty,
        list_property: AnalyzedProperty,
    },
}
