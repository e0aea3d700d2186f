//! Event codes attached to scanner log lines
//!
//! Codes are grouped by the component that emits them so log consumers can
//! filter on a prefix (`S` scheduler, `P` probe, `R` report, `G` guideline,
//! `C` configuration).

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Static event code wrapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// Component that owns this code, derived from its prefix
    pub fn component(&self) -> &'static str {
        match self.0.as_bytes().first() {
            Some(b'S') => "scheduler",
            Some(b'P') => "probe",
            Some(b'R') => "report",
            Some(b'G') => "guideline",
            Some(b'C') => "config",
            _ => "scanner",
        }
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// SCHEDULER CODES
// ============================================================================

pub mod scheduler {
    use super::Code;

    pub const ROUND_STARTED: Code = Code::new("S001");
    pub const FIXED_POINT_REACHED: Code = Code::new("S002");
    pub const CANCELLED: Code = Code::new("S003");
    pub const DEADLINE_EXCEEDED: Code = Code::new("S004");
    pub const REPORT_CONTRACT_VIOLATION: Code = Code::new("S010");
    pub const WORKER_PANIC: Code = Code::new("S011");
    pub const SCAN_FAILED: Code = Code::new("S012");
}

// ============================================================================
// PROBE CODES
// ============================================================================

pub mod probe {
    use super::Code;

    pub const EXECUTION_FAILED: Code = Code::new("P001");
    pub const UNDECLARED_WRITE: Code = Code::new("P002");
    pub const PROPERTY_DEFAULTED: Code = Code::new("P003");
    pub const DUPLICATE_REGISTRATION: Code = Code::new("P010");
}

// ============================================================================
// REPORT / GUIDELINE / CONFIG CODES
// ============================================================================

pub mod report {
    use super::Code;

    pub const SHAPE_MISMATCH: Code = Code::new("R001");
}

pub mod guideline {
    use super::Code;

    pub const CHECK_FAILED: Code = Code::new("G001");
    pub const DUPLICATE_CHECK: Code = Code::new("G002");
}

pub mod config {
    use super::Code;

    pub const INVALID_ENV_OVERRIDE: Code = Code::new("C001");
}
