// src/miner/worker.rs
//! Worker thread implementation
//!
//! A worker claims batches from the shared queue, evaluates their
//! candidates in ascending order and stops at the first of: a match, an
//! empty queue, or a set stop flag. The flag is checked before every
//! evaluation, so a stopped worker overshoots by at most one candidate.

use crate::miner::evaluator::{CandidateEvaluator, Evaluation};
use crate::miner::partition::BatchQueue;
use crate::miner::stop::{StopFlag, StopReason};
use crate::types::Candidate;
use crate::utils::error::MinerError;
use alloy_primitives::B256;
use arc_swap::ArcSwapOption;
use std::fmt;
use std::sync::Arc;

/// A match claimed by the worker that won the stop flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    /// Worker that found the candidate
    pub worker: usize,
    /// The matching gas price
    pub candidate: Candidate,
    /// Digest the match was decided on
    pub digest: B256,
}

/// Shared best-result slot
///
/// Only the worker whose `StopReason::Matched` trigger succeeded writes it,
/// and it is read after every worker has been joined.
pub type ResultSlot = ArcSwapOption<Published>;

/// Lifecycle of a worker; the last three states are terminal
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WorkerState {
    /// Constructed, not yet running
    Idle,
    /// Claiming and evaluating batches
    Running,
    /// Found a matching candidate
    Matched,
    /// Ran out of batches without a match
    Exhausted,
    /// Observed the stop flag before finding anything
    Stopped,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerState::Idle => write!(f, "idle"),
            WorkerState::Running => write!(f, "running"),
            WorkerState::Matched => write!(f, "matched"),
            WorkerState::Exhausted => write!(f, "exhausted"),
            WorkerState::Stopped => write!(f, "stopped"),
        }
    }
}

/// What a worker hands back to the coordinator when it finishes
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WorkerReport {
    /// Worker identifier
    pub worker: usize,
    /// Terminal state reached
    pub state: WorkerState,
    /// Candidates actually evaluated
    pub candidates_tried: u64,
    /// Batches claimed from the queue
    pub batches_claimed: u64,
    /// Whether this worker's match is the published result
    pub published: bool,
}

/// Worker that evaluates batches for one mining call
///
/// Everything shared is borrowed; the counters are the worker's own and
/// only leave it through the final [`WorkerReport`].
pub struct Worker<'a, E: CandidateEvaluator> {
    id: usize,
    evaluator: &'a E,
    prepared: &'a E::Prepared,
    queue: &'a BatchQueue,
    stop: &'a StopFlag,
    slot: &'a ResultSlot,
    state: WorkerState,
    candidates_tried: u64,
    batches_claimed: u64,
    published: bool,
}

impl<'a, E: CandidateEvaluator> Worker<'a, E> {
    /// Creates an idle worker
    ///
    /// # Arguments
    /// * `id` - Worker identifier used in logs and reports
    /// * `evaluator` - Candidate evaluator
    /// * `prepared` - The evaluator's per-job state
    /// * `queue` - Shared batch queue
    /// * `stop` - Stop flag of this mining call
    /// * `slot` - Shared best-result slot
    pub fn new(
        id: usize,
        evaluator: &'a E,
        prepared: &'a E::Prepared,
        queue: &'a BatchQueue,
        stop: &'a StopFlag,
        slot: &'a ResultSlot,
    ) -> Self {
        Worker {
            id,
            evaluator,
            prepared,
            queue,
            stop,
            slot,
            state: WorkerState::Idle,
            candidates_tried: 0,
            batches_claimed: 0,
            published: false,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Runs until a terminal state and reports
    ///
    /// # Returns
    /// - `Ok(WorkerReport)` once matched, exhausted or stopped
    /// - `Err(MinerError::Domain)` if the evaluator rejected a candidate;
    ///   the stop flag is set first so the other workers drain
    pub fn run(mut self) -> Result<WorkerReport, MinerError> {
        self.state = WorkerState::Running;

        'claim: loop {
            if self.stop.is_set() {
                self.state = WorkerState::Stopped;
                break;
            }
            let Some(batch) = self.queue.claim() else {
                self.state = WorkerState::Exhausted;
                break;
            };
            self.batches_claimed += 1;
            log::trace!("Worker {} claimed batch {}", self.id, batch);

            for candidate in batch.candidates() {
                if self.stop.is_set() {
                    self.state = WorkerState::Stopped;
                    break 'claim;
                }

                let evaluation = match self.evaluator.evaluate(self.prepared, candidate) {
                    Ok(evaluation) => evaluation,
                    Err(source) => {
                        self.stop.trigger(StopReason::Failed);
                        log::error!("Worker {} aborted: {}", self.id, source);
                        return Err(MinerError::Domain {
                            worker: self.id,
                            source,
                        });
                    }
                };
                self.candidates_tried += 1;

                if evaluation.is_match {
                    self.publish(candidate, evaluation);
                    self.state = WorkerState::Matched;
                    break 'claim;
                }
            }
        }

        log::debug!(
            "Worker {} {} after {} candidates in {} batches",
            self.id,
            self.state,
            self.candidates_tried,
            self.batches_claimed
        );

        Ok(WorkerReport {
            worker: self.id,
            state: self.state,
            candidates_tried: self.candidates_tried,
            batches_claimed: self.batches_claimed,
            published: self.published,
        })
    }

    /// Offers a match to the shared slot; only the first publisher wins
    fn publish(&mut self, candidate: Candidate, evaluation: Evaluation) {
        if self.stop.trigger(StopReason::Matched) {
            self.slot.store(Some(Arc::new(Published {
                worker: self.id,
                candidate,
                digest: evaluation.digest,
            })));
            self.published = true;
            log::info!(
                "Worker {} found gas price {} (digest {})",
                self.id,
                candidate,
                evaluation.digest
            );
        } else {
            log::debug!(
                "Worker {} discarded gas price {}: search already stopped",
                self.id,
                candidate
            );
        }
    }
}
