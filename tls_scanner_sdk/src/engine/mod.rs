//! # Simulated Protocol Engine
//!
//! [`ProfileEngine`] answers workflows from a declarative [`ServerProfile`]
//! instead of a network peer. The CLI uses it for `--profile` scans.

pub mod profile;
pub mod simulated;

pub use profile::{DtlsSequenceHandling, ProfileError, ServerProfile};
pub use simulated::ProfileEngine;
