//! # TLS Scanner Implementation
//!
//! Facade that ties the probe registry, the scheduler and the guideline
//! engine together for one or more targets.

use super::config::ScannerConfig;
use super::errors::ScannerError;
use crate::engine::ProtocolEngine;
use crate::execution::{CancellationToken, ProbeScheduler};
use crate::guideline::Guideline;
use crate::probe::ProbeRegistry;
use crate::report::ScanReport;
use crate::results::{ResultGenerator, ScanResult};
use crate::types::ScanTarget;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

/// Complete TLS scanner
pub struct TlsScanner {
    registry: Arc<ProbeRegistry>,
    config: ScannerConfig,
    guidelines: Vec<Guideline>,
    cancellation: CancellationToken,
}

impl TlsScanner {
    /// Create scanner with a validated registry and config
    pub fn new(registry: ProbeRegistry, config: ScannerConfig) -> Result<Self, ScannerError> {
        registry.validate()?;
        config.validate()?;
        Ok(Self {
            registry: Arc::new(registry),
            config,
            guidelines: Vec::new(),
            cancellation: CancellationToken::new(),
        })
    }

    /// Add a guideline evaluated after every scan
    pub fn with_guideline(mut self, guideline: Guideline) -> Self {
        self.guidelines.push(guideline);
        self
    }

    pub fn registry(&self) -> &ProbeRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub fn guidelines(&self) -> &[Guideline] {
        &self.guidelines
    }

    /// Token that stops every scan started by this scanner
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Scan the target from the config
    pub fn scan(&self, engine: &dyn ProtocolEngine) -> Result<ScanResult, ScannerError> {
        let target = self.config.target.clone().ok_or(ScannerError::MissingTarget)?;
        self.scan_target(engine, &target)
    }

    /// Scan one target and return the structured result
    pub fn scan_target(
        &self,
        engine: &dyn ProtocolEngine,
        target: &ScanTarget,
    ) -> Result<ScanResult, ScannerError> {
        let started = Utc::now();
        log_info!(
            "Starting scan",
            "target" => target,
            "engine" => engine.engine_id(),
            "probes" => self.registry.len()
        );

        // Phase 1: run probes to a fixed point
        let mut report = ScanReport::new(target.clone());
        let probes = self.registry.instantiate(&self.config);
        let mut scheduler = ProbeScheduler::new(engine)
            .with_worker_threads(self.config.worker_threads)
            .with_cancellation(self.cancellation.clone());
        if let Some(timeout_ms) = self.config.scan_timeout_ms {
            scheduler = scheduler.with_timeout(Duration::from_millis(timeout_ms));
        }
        let summary = scheduler.run(probes, &mut report)?;

        // Phase 2: evaluate guidelines over the finished report
        let guidelines = self
            .guidelines
            .iter()
            .map(|guideline| guideline.evaluate(&report))
            .collect();

        let result =
            ResultGenerator::generate(&report, engine.engine_id(), summary, guidelines, started);
        log_info!(
            "Scan completed",
            "target" => target,
            "properties" => result.properties.len(),
            "duration_ms" => result.metadata.timestamp.duration_ms
        );
        Ok(result)
    }

    /// Scan several targets one after the other
    pub fn scan_targets(&self, engine: &dyn ProtocolEngine, targets: &[ScanTarget]) -> BatchScanResult {
        let mut scan_results = Vec::new();
        let mut failed_targets = Vec::new();

        for target in targets {
            if self.cancellation.is_cancelled() {
                failed_targets.push((target.to_string(), "Scan cancelled".to_string()));
                continue;
            }
            match self.scan_target(engine, target) {
                Ok(result) => scan_results.push(result),
                Err(e) => {
                    log_error!(
                        crate::logging::codes::scheduler::SCAN_FAILED,
                        "Scan failed",
                        "target" => target,
                        "error" => e
                    );
                    failed_targets.push((target.to_string(), e.to_string()));
                }
            }
        }

        BatchScanResult::new(scan_results, failed_targets)
    }
}

/// Results of scanning several targets
#[derive(Debug)]
pub struct BatchScanResult {
    pub scan_results: Vec<ScanResult>,
    pub failed_targets: Vec<(String, String)>,
    pub statistics: BatchStatistics,
}

#[derive(Debug)]
pub struct BatchStatistics {
    pub total_targets: usize,
    pub successful_scans: usize,
    pub failed_scans: usize,
    pub guideline_failures: usize,
    pub total_properties: usize,
}

impl BatchScanResult {
    fn new(scan_results: Vec<ScanResult>, failed_targets: Vec<(String, String)>) -> Self {
        let statistics = BatchStatistics {
            total_targets: scan_results.len() + failed_targets.len(),
            successful_scans: scan_results.len(),
            failed_scans: failed_targets.len(),
            guideline_failures: scan_results
                .iter()
                .filter(|r| r.has_guideline_failures())
                .count(),
            total_properties: scan_results.iter().map(|r| r.properties.len()).sum(),
        };
        Self {
            scan_results,
            failed_targets,
            statistics,
        }
    }

    /// Export all results as JSON array
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.scan_results)
    }

    pub fn summary(&self) -> String {
        format!(
            "Batch Scan Summary:\n\
         Total Targets: {}\n\
         Successful Scans: {}\n\
         Failed Scans: {}\n\
         Guideline Failures: {}\n\
         Total Properties: {}",
            self.statistics.total_targets,
            self.statistics.successful_scans,
            self.statistics.failed_scans,
            self.statistics.guideline_failures,
            self.statistics.total_properties
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineError, ExecutedTrace, WorkflowSpec};
    use crate::guideline::{AnalyzedPropertyGuidelineCheck, RequirementLevel};
    use crate::probe::{Probe, ProbeError, RegistryBuilder};
    use crate::report::ReportError;
    use crate::types::{AnalyzedProperty, ProbeType, TestResults};
    use assert_matches::assert_matches;

    struct NullEngine;

    impl ProtocolEngine for NullEngine {
        fn execute(
            &self,
            _target: &ScanTarget,
            _workflow: &WorkflowSpec,
        ) -> Result<ExecutedTrace, EngineError> {
            Ok(ExecutedTrace::new())
        }

        fn engine_id(&self) -> &str {
            "null"
        }
    }

    struct CompressionStub;

    impl Probe for CompressionStub {
        fn probe_type(&self) -> ProbeType {
            ProbeType::Compressions
        }

        fn registered_properties(&self) -> Vec<AnalyzedProperty> {
            vec![AnalyzedProperty::VulnerableToCrime]
        }

        fn execute_test(
            &mut self,
            _engine: &dyn ProtocolEngine,
            _target: &ScanTarget,
        ) -> Result<(), ProbeError> {
            Ok(())
        }

        fn merge_data(&self, report: &mut ScanReport) -> Result<(), ReportError> {
            report.put_scalar(AnalyzedProperty::VulnerableToCrime, TestResults::True)
        }
    }

    fn scanner(config: ScannerConfig) -> TlsScanner {
        let registry = RegistryBuilder::new()
            .add_probe(|_: &ScannerConfig| -> Box<dyn Probe> { Box::new(CompressionStub) })
            .unwrap()
            .build()
            .unwrap();
        TlsScanner::new(registry, config.with_worker_threads(2)).unwrap()
    }

    #[test]
    fn test_scan_without_target_fails() {
        let scanner = scanner(ScannerConfig::default());
        assert_matches!(scanner.scan(&NullEngine), Err(ScannerError::MissingTarget));
    }

    #[test]
    fn test_scan_evaluates_guidelines() {
        let guideline = Guideline::new("No CRIME").with_check(Box::new(
            AnalyzedPropertyGuidelineCheck::new(
                "CRIME",
                RequirementLevel::MustNot,
                AnalyzedProperty::VulnerableToCrime,
                TestResults::False,
            ),
        ));
        let config = ScannerConfig::default().with_target(ScanTarget::new("localhost", 443));
        let scanner = scanner(config).with_guideline(guideline);

        let result = scanner.scan(&NullEngine).unwrap();

        assert_eq!(result.executed_probes, vec![ProbeType::Compressions]);
        assert_eq!(result.scheduler.executed, 1);
        assert!(result.has_guideline_failures());
        assert_eq!(result.metadata.engine_id, "null");
    }

    #[test]
    fn test_scan_targets_after_cancel() {
        let scanner = scanner(ScannerConfig::default());
        scanner.cancellation_token().cancel();

        let batch = scanner.scan_targets(
            &NullEngine,
            &[ScanTarget::new("a.example", 443), ScanTarget::new("b.example", 443)],
        );

        assert_eq!(batch.statistics.total_targets, 2);
        assert_eq!(batch.statistics.failed_scans, 2);
        assert!(batch.summary().contains("Failed Scans: 2"));
    }
}
