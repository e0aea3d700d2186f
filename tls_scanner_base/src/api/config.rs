//! # Scanner Configuration
//!
//! Loaded from defaults, an optional TOML file, then `TLS_SCANNER_*`
//! environment overrides, in that order.

use super::errors::ConfigError;
use crate::logging::codes;
use crate::types::{ProbeType, ScanTarget};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default timeout for a single engine workflow
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 1000;

/// Upper bound on the default worker pool size
pub const MAX_DEFAULT_WORKER_THREADS: usize = 8;

pub const ENV_WORKER_THREADS: &str = "TLS_SCANNER_WORKER_THREADS";
pub const ENV_PROBE_TIMEOUT_MS: &str = "TLS_SCANNER_PROBE_TIMEOUT_MS";
pub const ENV_SCAN_TIMEOUT_MS: &str = "TLS_SCANNER_SCAN_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Target used when a scan is started without an explicit one
    pub target: Option<ScanTarget>,

    /// Size of the probe worker pool
    pub worker_threads: usize,

    /// Timeout handed to every engine workflow
    pub probe_timeout_ms: u64,

    /// Wall-clock budget for one scan; probes not dispatched in time are
    /// recorded as COULD_NOT_TEST
    pub scan_timeout_ms: Option<u64>,

    /// Scan DTLS versions instead of TLS
    pub dtls: bool,

    /// Probe types left out of every scan
    pub excluded_probes: Vec<ProbeType>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            target: None,
            worker_threads: default_worker_threads(),
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            scan_timeout_ms: None,
            dtls: false,
            excluded_probes: Vec::new(),
        }
    }
}

/// Number of CPUs, capped at [`MAX_DEFAULT_WORKER_THREADS`]
pub fn default_worker_threads() -> usize {
    num_cpus::get().clamp(1, MAX_DEFAULT_WORKER_THREADS)
}

impl ScannerConfig {
    /// Defaults with environment overrides applied
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: ScannerConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(threads) = parse_override::<usize>(&lookup, ENV_WORKER_THREADS) {
            self.worker_threads = threads.max(1);
        }
        if let Some(timeout) = parse_override::<u64>(&lookup, ENV_PROBE_TIMEOUT_MS) {
            self.probe_timeout_ms = timeout;
        }
        if let Some(timeout) = parse_override::<u64>(&lookup, ENV_SCAN_TIMEOUT_MS) {
            self.scan_timeout_ms = Some(timeout);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_threads == 0 {
            return Err(ConfigError::InvalidValue {
                field: "worker_threads".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if self.probe_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "probe_timeout_ms".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.scan_timeout_ms == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "scan_timeout_ms".to_string(),
                reason: "must be greater than 0 when set".to_string(),
            });
        }
        Ok(())
    }

    pub fn with_target(mut self, target: ScanTarget) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads.max(1);
        self
    }

    pub fn with_probe_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.probe_timeout_ms = timeout_ms;
        self
    }

    pub fn with_scan_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.scan_timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_dtls(mut self, dtls: bool) -> Self {
        self.dtls = dtls;
        self
    }

    pub fn with_excluded_probe(mut self, probe_type: ProbeType) -> Self {
        if !self.excluded_probes.contains(&probe_type) {
            self.excluded_probes.push(probe_type);
        }
        self
    }
}

fn parse_override<T: std::str::FromStr>(
    lookup: &dyn Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            log_warning!(
                codes::config::INVALID_ENV_OVERRIDE,
                "Ignoring unparseable configuration override",
                "key" => key,
                "value" => raw
            );
            None
        }
    }
}
