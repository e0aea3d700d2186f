//! # Probe Scheduler
//!
//! Runs probes in rounds until no pending probe's requirement holds.
//!
//! Each round:
//! 1. evaluates every pending probe's requirement against the report, in
//!    registration order;
//! 2. calls `adjust_config` on each runnable probe (all reads happen here);
//! 3. hands the runnable probes to a bounded pool of scoped worker threads
//!    that call `execute_test` against the shared engine;
//! 4. merges finished probes one at a time on the scheduling thread as their
//!    results arrive over a channel.
//!
//! A round only starts once the previous round is fully merged, so a probe
//! never observes results of probes running in the same round.

use super::cancellation::CancellationToken;
use super::summary::{ProbeOutcome, ProbeRunRecord, SchedulerSummary, StopReason};
use crate::engine::ProtocolEngine;
use crate::logging::{codes, Code};
use crate::probe::{Probe, ProbeError};
use crate::report::{ReportError, ScanReport};
use crate::types::{ProbeType, ScanTarget, TestResults};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("Probe '{probe_type}' violated the report contract: {source}")]
    ReportContract {
        probe_type: ProbeType,
        source: ReportError,
    },
}

impl SchedulerError {
    pub fn code(&self) -> Code {
        match self {
            SchedulerError::ReportContract {
                source: ReportError::ShapeMismatch { .. },
                ..
            } => codes::report::SHAPE_MISMATCH,
            SchedulerError::ReportContract { .. } => codes::scheduler::REPORT_CONTRACT_VIOLATION,
        }
    }
}

type Job = (usize, Box<dyn Probe>);

struct CompletedProbe {
    index: usize,
    probe: Box<dyn Probe>,
    result: Result<(), ProbeError>,
    duration: Duration,
}

pub struct ProbeScheduler<'e> {
    engine: &'e dyn ProtocolEngine,
    worker_threads: usize,
    deadline: Option<Instant>,
    cancellation: CancellationToken,
}

impl<'e> ProbeScheduler<'e> {
    pub fn new(engine: &'e dyn ProtocolEngine) -> Self {
        Self {
            engine,
            worker_threads: 1,
            deadline: None,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_worker_threads(mut self, worker_threads: usize) -> Self {
        self.worker_threads = worker_threads.max(1);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Drive `probes` to a fixed point over `report`
    ///
    /// On success every property in the union of the probes' write-sets is
    /// present in the report. Execution failures are recorded as
    /// ERROR_DURING_TEST and never abort the run; only a report contract
    /// violation does.
    pub fn run(
        &self,
        probes: Vec<Box<dyn Probe>>,
        report: &mut ScanReport,
    ) -> Result<SchedulerSummary, SchedulerError> {
        let started = Instant::now();
        let target = report.target().clone();
        let mut records: Vec<(usize, ProbeRunRecord)> = Vec::new();
        let mut pending: Vec<Job> = Vec::new();

        for (index, probe) in probes.into_iter().enumerate() {
            if report.is_probe_already_executed(probe.probe_type()) {
                records.push((
                    index,
                    record(probe.probe_type(), ProbeOutcome::AlreadyExecuted, None, 0),
                ));
            } else {
                pending.push((index, probe));
            }
        }

        let mut round = 0;
        let mut interrupted = None;
        let mut undispatched: Vec<Job> = Vec::new();

        loop {
            if let Some(reason) = self.stop_reason() {
                interrupted = Some(reason);
                break;
            }

            let (mut runnable, waiting): (Vec<Job>, Vec<Job>) = pending
                .into_iter()
                .partition(|(_, probe)| probe.requirement().evaluate(report));
            pending = waiting;

            if runnable.is_empty() {
                log_info!(
                    "Scheduler reached fixed point",
                    "code" => completion_code(None),
                    "rounds" => round,
                    "waiting" => pending.len()
                );
                break;
            }

            round += 1;
            log_info!(
                "Starting scheduling round",
                "code" => codes::scheduler::ROUND_STARTED,
                "round" => round,
                "runnable" => runnable.len(),
                "target" => target
            );

            for (_, probe) in runnable.iter_mut() {
                probe.adjust_config(report);
            }

            let leftovers = self.execute_round(round, runnable, &target, report, &mut records)?;
            undispatched.extend(leftovers);
        }

        if interrupted.is_some() {
            log_warning!(
                completion_code(interrupted),
                "Scan stopped before reaching a fixed point",
                "rounds" => round,
                "remaining" => pending.len() + undispatched.len()
            );
        }

        for (index, probe) in undispatched {
            self.default_probe(index, probe.as_ref(), ProbeOutcome::Cancelled, report, &mut records)?;
        }
        for (index, probe) in pending {
            let outcome = if interrupted.is_some() {
                ProbeOutcome::Cancelled
            } else {
                ProbeOutcome::Skipped
            };
            if outcome == ProbeOutcome::Skipped {
                let missing: Vec<String> = probe
                    .requirement()
                    .missing(report)
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                log_debug!(
                    "Probe requirement never satisfied",
                    "probe" => probe.probe_type(),
                    "missing" => missing.join("; ")
                );
            }
            self.default_probe(index, probe.as_ref(), outcome, report, &mut records)?;
        }

        records.sort_by_key(|(index, _)| *index);
        let records = records.into_iter().map(|(_, record)| record).collect();

        Ok(SchedulerSummary::from_records(
            round,
            interrupted,
            started.elapsed().as_millis() as u64,
            records,
        ))
    }

    fn stop_reason(&self) -> Option<StopReason> {
        if self.cancellation.is_cancelled() {
            return Some(StopReason::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(StopReason::DeadlineExceeded),
            _ => None,
        }
    }

    /// Execute one round on the worker pool and merge the results
    ///
    /// Returns the probes that were never dispatched because the scan was
    /// stopped mid-round.
    fn execute_round(
        &self,
        round: usize,
        runnable: Vec<Job>,
        target: &ScanTarget,
        report: &mut ScanReport,
        records: &mut Vec<(usize, ProbeRunRecord)>,
    ) -> Result<Vec<Job>, SchedulerError> {
        let worker_count = self.worker_threads.clamp(1, runnable.len());
        let queue: Mutex<VecDeque<Job>> = Mutex::new(runnable.into_iter().collect());
        let abort = AtomicBool::new(false);
        let (sender, receiver) = mpsc::channel::<CompletedProbe>();
        let mut merge_error = None;

        thread::scope(|scope| {
            for _ in 0..worker_count {
                let sender = sender.clone();
                let queue = &queue;
                let abort = &abort;
                scope.spawn(move || loop {
                    if abort.load(Ordering::SeqCst) || self.stop_reason().is_some() {
                        break;
                    }
                    let job = queue
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .pop_front();
                    let Some((index, mut probe)) = job else {
                        break;
                    };

                    let started = Instant::now();
                    let result = execute_contained(probe.as_mut(), self.engine, target);
                    let completed = CompletedProbe {
                        index,
                        probe,
                        result,
                        duration: started.elapsed(),
                    };
                    if sender.send(completed).is_err() {
                        break;
                    }
                });
            }
            drop(sender);

            // Single writer: only this thread touches the report.
            for completed in receiver {
                if merge_error.is_some() {
                    continue;
                }
                match self.merge_completed(round, completed, report) {
                    Ok(entry) => records.push(entry),
                    Err(error) => {
                        abort.store(true, Ordering::SeqCst);
                        merge_error = Some(error);
                    }
                }
            }
        });

        if let Some(error) = merge_error {
            log_error!(
                error.code(),
                "Aborting scan after report contract violation",
                "error" => error
            );
            return Err(error);
        }

        let leftovers = queue.into_inner().unwrap_or_else(PoisonError::into_inner);
        Ok(leftovers.into_iter().collect())
    }

    fn merge_completed(
        &self,
        round: usize,
        completed: CompletedProbe,
        report: &mut ScanReport,
    ) -> Result<(usize, ProbeRunRecord), SchedulerError> {
        let CompletedProbe {
            index,
            probe,
            result,
            duration,
        } = completed;
        let probe_type = probe.probe_type();
        let contract = |source: ReportError| SchedulerError::ReportContract { probe_type, source };

        report.drain_writes();
        let outcome = match result {
            Ok(()) => {
                probe.merge_data(report).map_err(contract)?;
                ProbeOutcome::Executed
            }
            Err(error) => {
                let code = match error {
                    ProbeError::Panicked { .. } => codes::scheduler::WORKER_PANIC,
                    _ => codes::probe::EXECUTION_FAILED,
                };
                log_error!(
                    code,
                    "Probe execution failed",
                    "probe" => probe_type,
                    "error" => error
                );
                probe
                    .merge_could_not_execute(report, TestResults::ErrorDuringTest)
                    .map_err(contract)?;
                ProbeOutcome::Failed {
                    reason: error.to_string(),
                }
            }
        };

        let declared = probe.registered_properties();
        let written = report.drain_writes();
        for property in written.iter().filter(|p| !declared.contains(p)) {
            log_warning!(
                codes::probe::UNDECLARED_WRITE,
                "Probe wrote a property outside its write-set",
                "probe" => probe_type,
                "property" => property
            );
        }
        for property in declared.into_iter().filter(|p| !written.contains(p)) {
            log_debug!(
                "Defaulting unwritten property",
                "code" => codes::probe::PROPERTY_DEFAULTED,
                "probe" => probe_type,
                "property" => property
            );
            report
                .put_fallback(property, TestResults::CouldNotTest)
                .map_err(contract)?;
        }
        report.drain_writes();
        report.mark_executed(probe_type);

        Ok((
            index,
            record(
                probe_type,
                outcome,
                Some(round),
                duration.as_millis() as u64,
            ),
        ))
    }

    fn default_probe(
        &self,
        index: usize,
        probe: &dyn Probe,
        outcome: ProbeOutcome,
        report: &mut ScanReport,
        records: &mut Vec<(usize, ProbeRunRecord)>,
    ) -> Result<(), SchedulerError> {
        let probe_type = probe.probe_type();
        probe
            .merge_could_not_execute(report, TestResults::CouldNotTest)
            .map_err(|source| SchedulerError::ReportContract { probe_type, source })?;
        report.drain_writes();
        records.push((index, record(probe_type, outcome, None, 0)));
        Ok(())
    }
}

/// Event code for the end of a run
fn completion_code(interrupted: Option<StopReason>) -> Code {
    match interrupted {
        None => codes::scheduler::FIXED_POINT_REACHED,
        Some(StopReason::Cancelled) => codes::scheduler::CANCELLED,
        Some(StopReason::DeadlineExceeded) => codes::scheduler::DEADLINE_EXCEEDED,
    }
}

fn record(
    probe_type: ProbeType,
    outcome: ProbeOutcome,
    round: Option<usize>,
    duration_ms: u64,
) -> ProbeRunRecord {
    ProbeRunRecord {
        probe_type,
        outcome,
        round,
        duration_ms,
    }
}

/// Run the execute phase, turning a panic into a probe error
fn execute_contained(
    probe: &mut dyn Probe,
    engine: &dyn ProtocolEngine,
    target: &ScanTarget,
) -> Result<(), ProbeError> {
    let probe_type = probe.probe_type();
    match panic::catch_unwind(AssertUnwindSafe(|| probe.execute_test(engine, target))) {
        Ok(result) => result,
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(ProbeError::Panicked {
                probe_type,
                message,
            })
        }
    }
}
