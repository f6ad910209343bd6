// src/miner/mod.rs
//! Core search engine
//!
//! This module contains all components of a mining call:
//! - Candidate evaluation (gas price proof-of-work, custom predicates)
//! - Work partitioning and the shared batch queue
//! - Worker threads and the coordinator that runs them

/// Candidate evaluator implementations
///
/// Contains the [`CandidateEvaluator`] trait and:
/// - [`GasPriceEvaluator`] for the proof-of-work gas price scheme
/// - [`PredicateEvaluator`] for caller-supplied match predicates
pub mod evaluator;

/// Search space partitioning
///
/// Splits the space into ordered batches and hands them out atomically.
pub mod partition;

/// One-shot stop signal
///
/// Shared by the workers of a call; also the external cancellation trigger.
pub mod stop;

/// Worker thread implementation
///
/// Claims batches, evaluates candidates and publishes the first match.
pub mod worker;

/// Mining call coordinator
///
/// Spawns the workers, joins them and aggregates their reports.
pub mod coordinator;

// Re-export main components for cleaner imports
pub use self::coordinator::{Coordinator, MiningJob, MiningResult};
pub use self::evaluator::{
    CandidateEvaluator, DomainError, Evaluation, GasPriceEvaluator, PredicateEvaluator,
};
pub use self::partition::{BatchQueue, WorkPartitioner, partition};
pub use self::stop::{StopFlag, StopReason};
pub use self::worker::{Worker, WorkerReport, WorkerState};
