//! # Execution
//!
//! Round-based probe scheduling to a fixed point.

pub mod cancellation;
pub mod scheduler;
pub mod summary;

pub use cancellation::CancellationToken;
pub use scheduler::{ProbeScheduler, SchedulerError};
pub use summary::{ProbeOutcome, ProbeRunRecord, SchedulerSummary, StopReason};
