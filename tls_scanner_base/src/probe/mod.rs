//! # Probes
//!
//! The [`Probe`] trait and the registry the scanner instantiates probes from.

pub mod errors;
pub mod registry;
pub mod traits;

pub use errors::{ProbeError, RegistryError};
pub use registry::{ProbeRegistry, RegistryBuilder, RegistryHealth, RegistryStatistics};
pub use traits::Probe;
