/// Failures reported by a protocol engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("Connection to {target} refused")]
    ConnectionRefused { target: String },

    #[error("Connection to {target} timed out after {timeout_ms}ms")]
    Timeout { target: String, timeout_ms: u64 },

    #[error("Protocol violation: {reason}")]
    ProtocolViolation { reason: String },

    #[error("Workflow '{trace_type}' is not supported by engine '{engine_id}'")]
    UnsupportedWorkflow { engine_id: String, trace_type: String },

    #[error("Engine I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for EngineError {
    fn from(error: std::io::Error) -> Self {
        EngineError::Io(error.to_string())
    }
}
