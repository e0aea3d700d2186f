//! # TLS Scanner Base
//!
//! Orchestration core of the TLS scanner: the typed scan report, the
//! requirement algebra, the probe contract and registry, the round-based
//! scheduler and the guideline engine. Probes and protocol engines live in
//! downstream crates.

#[macro_use]
pub mod logging;

pub mod api;
pub mod engine;
pub mod execution;
pub mod guideline;
pub mod probe;
pub mod report;
pub mod requirements;
pub mod results;
pub mod types;

// Convenience re-exports
pub use api::*;

pub mod prelude {
    pub use crate::api::{
        BatchScanResult, ConfigError, ScannerConfig, ScannerError, TlsScanner,
    };

    pub use crate::engine::{
        EngineError, ExecutedTrace, NegotiatedParameters, ProtocolEngine, WorkflowSpec,
        WorkflowTraceType,
    };
    pub use crate::execution::{CancellationToken, ProbeScheduler, SchedulerSummary};
    pub use crate::guideline::{
        Guideline, GuidelineCheck, GuidelineCheckResult, GuidelineReport, RequirementLevel,
    };
    pub use crate::probe::{Probe, ProbeError, ProbeRegistry, RegistryBuilder};
    pub use crate::report::{ReportError, ScanReport};
    pub use crate::requirements::Requirement;
    pub use crate::results::{ResultGenerator, ScanResult};

    pub use crate::types::{
        AnalyzedProperty, CipherSuite, ListResult, ListValue, ProbeType, ProtocolVersion,
        ScanTarget, TestResult, TestResults,
    };
}
