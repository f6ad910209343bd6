//! Gas Miner - parallel proof-of-work gas price search in Rust
//!
//! This crate searches for a transaction gas price whose hash satisfies a
//! proof-of-work target:
//! - Pluggable candidate evaluation (gas price scheme, custom predicates)
//! - Batched work partitioning over a lock-free claim queue
//! - Worker threads with cooperative, first-match-wins cancellation
//! - A validating facade with blocking, deadline and async entry points

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Search engine core: evaluators, partitioning, workers and coordination
pub mod miner;

/// Request validation and the public mining entry points
pub mod engine;

/// Statistics derived from finished mining calls
pub mod stats;

/// Utility functions and error handling
pub mod utils;

/// Command-line interface definitions
pub mod cli;

/// Configuration management
pub mod config;

/// Shared type definitions
pub mod types;

// Core exports
pub use cli::Commands;
pub use config::{Config, MiningRequest};
pub use engine::{CoreCount, FixedCores, MiningEngine, SystemCores, get_cpu_count};
pub use miner::{
    CandidateEvaluator, DomainError, GasPriceEvaluator, MiningJob, MiningResult,
    PredicateEvaluator, StopFlag,
};
pub use stats::{MiningStats, StatsReporter};
pub use types::{Batch, CandidateRange, SearchSpace, Termination};
pub use utils::{MinerError, init_logging};
