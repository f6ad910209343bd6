// src/miner/coordinator.rs
//! Mining call coordination
//!
//! Owns everything shared by the workers of one call (batch queue, stop
//! flag, result slot), spawns the workers as scoped threads, waits for
//! their reports and folds them into a [`MiningResult`].

use crate::miner::evaluator::CandidateEvaluator;
use crate::miner::partition::WorkPartitioner;
use crate::miner::stop::{StopFlag, StopReason};
use crate::miner::worker::{ResultSlot, Worker, WorkerReport};
use crate::types::{Candidate, SearchSpace, Termination};
use crate::utils::error::MinerError;
use alloy_primitives::{Address, B256};
use serde::Serialize;
use std::any::Any;
use std::thread;
use std::time::Instant;

/// A validated, fully resolved mining request
///
/// Built by the engine facade; workers only ever see it by shared reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiningJob {
    /// Transaction sender
    pub address: Address,
    /// Transaction nonce
    pub nonce: u64,
    /// Gas the transaction needs granted
    pub gas: u64,
    /// Candidates per batch
    pub batch_size: u64,
    /// Worker threads to run (already clamped to the core count)
    pub thread_count: usize,
    /// Candidates to scan
    pub space: SearchSpace,
}

/// Outcome of one mining call
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MiningResult {
    /// Whether a matching candidate was found
    pub found: bool,
    /// The matching gas price
    pub candidate: Option<Candidate>,
    /// Digest of the matching gas price
    pub digest: Option<B256>,
    /// Candidates actually evaluated across all workers
    pub candidates_tried: u64,
    /// Wall time from call start to return
    pub duration_seconds: f64,
    /// Worker threads that ran
    pub thread_count: usize,
    /// Why the call stopped
    pub termination: Termination,
    /// Worker that published the match
    pub worker: Option<usize>,
}

/// Runs one mining call over a prepared job
pub struct Coordinator<'a, E: CandidateEvaluator> {
    evaluator: &'a E,
    job: &'a MiningJob,
    stop: StopFlag,
}

impl<'a, E: CandidateEvaluator> Coordinator<'a, E> {
    /// Creates a coordinator for `job`
    ///
    /// # Arguments
    /// * `evaluator` - Candidate evaluator shared by all workers
    /// * `job` - The validated job
    /// * `stop` - Stop flag for this call; keep a clone to cancel externally
    pub fn new(evaluator: &'a E, job: &'a MiningJob, stop: StopFlag) -> Self {
        Coordinator {
            evaluator,
            job,
            stop,
        }
    }

    /// Handle to this call's stop flag
    pub fn stop_handle(&self) -> StopFlag {
        self.stop.clone()
    }

    /// Runs the search to completion, cancellation or failure
    ///
    /// # Returns
    /// - `Ok(MiningResult)` for a match, an exhausted space or a
    ///   cancellation
    /// - `Err(MinerError::Domain)` with the first out-of-domain candidate
    /// - `Err(MinerError::WorkerFailure)` if a worker panicked or could not
    ///   be spawned
    pub fn run(&self) -> Result<MiningResult, MinerError> {
        let started = Instant::now();
        let partitioner = WorkPartitioner::new(self.job.space, self.job.batch_size)?;
        let workers = partitioner.active_workers(self.job.thread_count);

        log::info!(
            "Searching {} in {} batches of {} with {} workers",
            self.job.space,
            partitioner.batch_count(),
            self.job.batch_size,
            workers
        );

        let queue = partitioner.queue();
        let slot = ResultSlot::empty();
        let prepared = self.evaluator.prepare(self.job);
        let (report_tx, report_rx) = crossbeam_channel::unbounded();

        let mut reports: Vec<WorkerReport> = Vec::with_capacity(workers);
        let mut domain_error: Option<MinerError> = None;
        let mut failures: Vec<MinerError> = Vec::new();

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(workers);

            for id in 0..workers {
                let worker = Worker::new(id, self.evaluator, &prepared, &queue, &self.stop, &slot);
                let report_tx = report_tx.clone();
                let stop = &self.stop;

                let spawned = thread::Builder::new()
                    .name(format!("gas-miner-{}", id))
                    .spawn_scoped(scope, move || {
                        let _guard = PanicGuard { stop };
                        let _ = report_tx.send(worker.run());
                    });

                match spawned {
                    Ok(handle) => handles.push((id, handle)),
                    Err(e) => {
                        self.stop.trigger(StopReason::Failed);
                        log::error!("Failed to spawn worker {}: {}", id, e);
                        failures.push(MinerError::WorkerFailure {
                            worker: id,
                            reason: format!("spawn failed: {}", e),
                        });
                        break;
                    }
                }
            }
            // Only the workers' senders remain, so the receive loop ends
            // once every worker has reported or died.
            drop(report_tx);

            for message in report_rx.iter() {
                match message {
                    Ok(report) => reports.push(report),
                    Err(e) => {
                        if domain_error.is_none() {
                            domain_error = Some(e);
                        }
                    }
                }
            }

            for (id, handle) in handles {
                if let Err(payload) = handle.join() {
                    let reason = panic_message(payload.as_ref());
                    log::error!("Worker {} panicked: {}", id, reason);
                    failures.push(MinerError::WorkerFailure { worker: id, reason });
                }
            }
        });

        if let Some(err) = domain_error {
            return Err(err);
        }
        if let Some(err) = failures.into_iter().next() {
            return Err(err);
        }

        let candidates_tried: u64 = reports.iter().map(|r| r.candidates_tried).sum();
        let published = slot.load_full();
        // A cancel that lands after the last evaluation still leaves the
        // space fully scanned.
        let scanned = u128::from(candidates_tried) == self.job.space.len();
        let termination = match (self.stop.reason(), &published) {
            (Some(StopReason::Matched), Some(_)) => Termination::Matched,
            (Some(StopReason::Cancelled), None) if scanned => Termination::Exhausted,
            (Some(StopReason::Cancelled), _) => Termination::Cancelled,
            _ => Termination::Exhausted,
        };

        let result = MiningResult {
            found: termination == Termination::Matched,
            candidate: published.as_ref().map(|p| p.candidate),
            digest: published.as_ref().map(|p| p.digest),
            candidates_tried,
            duration_seconds: started.elapsed().as_secs_f64(),
            thread_count: workers,
            termination,
            worker: published.as_ref().map(|p| p.worker),
        };

        log::info!(
            "Search {} after {} candidates in {:.3}s",
            result.termination,
            result.candidates_tried,
            result.duration_seconds
        );
        Ok(result)
    }
}

/// Trips the stop flag if a worker unwinds, so its peers drain instead of
/// scanning the rest of the space
struct PanicGuard<'a> {
    stop: &'a StopFlag,
}

impl Drop for PanicGuard<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.stop.trigger(StopReason::Failed);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
