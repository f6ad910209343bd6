//! Statistics for finished mining calls
//!
//! Turns a [`MiningResult`](crate::miner::MiningResult) into throughput
//! figures (candidates per second overall and per thread) and logs them.

/// Submodule containing the statistics reporter implementation
pub mod reporter;

// Re-export main components
pub use reporter::{MiningStats, StatsReporter};
