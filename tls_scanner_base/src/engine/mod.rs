//! # Protocol Engine Boundary
//!
//! Probes never touch the network. They describe a connection as a
//! [`WorkflowSpec`], hand it to a [`ProtocolEngine`], and interpret the
//! [`ExecutedTrace`] that comes back.

pub mod error;
pub mod trace;
pub mod workflow;

pub use error::EngineError;
pub use trace::{
    AlertDescription, Direction, ExecutedTrace, HandshakeMessage, NegotiatedParameters,
    TraceEntry,
};
pub use workflow::{SequenceManipulation, WorkflowSpec, WorkflowTraceType};

use crate::types::ScanTarget;

/// Executes declarative workflows against a target
///
/// Engines are shared by every worker thread of a scan, so `execute` takes
/// `&self` and may be called concurrently. It is the only blocking call a
/// probe makes.
pub trait ProtocolEngine: Send + Sync {
    fn execute(
        &self,
        target: &ScanTarget,
        workflow: &WorkflowSpec,
    ) -> Result<ExecutedTrace, EngineError>;

    /// Identifier recorded in scan metadata
    fn engine_id(&self) -> &str;
}
