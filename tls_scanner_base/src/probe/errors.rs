//! Error types for probes and the probe registry

use crate::engine::EngineError;
use crate::types::{AnalyzedProperty, ProbeType};

/// Failure of a probe's execute phase
///
/// The scheduler recovers from every variant by writing ERROR_DURING_TEST to
/// the probe's properties.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("Engine failure in probe '{probe_type}': {source}")]
    Engine {
        probe_type: ProbeType,
        source: EngineError,
    },

    #[error("Unexpected trace in probe '{probe_type}': {reason}")]
    UnexpectedTrace { probe_type: ProbeType, reason: String },

    #[error("Probe '{probe_type}' is not configured: {reason}")]
    NotConfigured { probe_type: ProbeType, reason: String },

    #[error("Probe '{probe_type}' panicked: {message}")]
    Panicked { probe_type: ProbeType, message: String },
}

impl ProbeError {
    pub fn engine(probe_type: ProbeType, source: EngineError) -> Self {
        ProbeError::Engine { probe_type, source }
    }

    pub fn probe_type(&self) -> ProbeType {
        match self {
            ProbeError::Engine { probe_type, .. }
            | ProbeError::UnexpectedTrace { probe_type, .. }
            | ProbeError::NotConfigured { probe_type, .. }
            | ProbeError::Panicked { probe_type, .. } => *probe_type,
        }
    }
}

/// Probe registration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Probe type '{probe_type}' is already registered")]
    DuplicateProbeType { probe_type: ProbeType },

    #[error("Property '{property}' is already written by '{owner}', cannot register '{probe_type}'")]
    PropertyAlreadyOwned {
        property: AnalyzedProperty,
        owner: ProbeType,
        probe_type: ProbeType,
    },

    #[error("Probe '{probe_type}' declares no properties")]
    EmptyWriteSet { probe_type: ProbeType },

    #[error("Registry contains no probes")]
    EmptyRegistry,
}
