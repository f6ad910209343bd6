// src/stats/reporter.rs
use crate::miner::coordinator::MiningResult;
use crate::types::Termination;
use serde::Serialize;

/// Throughput figures derived from a finished mining call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MiningStats {
    /// Candidates evaluated across all workers
    pub candidates_tried: u64,
    /// Wall time of the call in seconds
    pub duration_seconds: f64,
    /// Worker threads that ran
    pub thread_count: usize,
    /// Candidates per second across all workers
    pub rate: f64,
    /// Candidates per second per worker
    pub rate_per_thread: f64,
}

impl MiningStats {
    /// Derives throughput from a result
    pub fn from_result(result: &MiningResult) -> Self {
        let rate = if result.duration_seconds > 0.0 {
            result.candidates_tried as f64 / result.duration_seconds
        } else {
            0.0
        };
        let rate_per_thread = if result.thread_count > 0 {
            rate / result.thread_count as f64
        } else {
            0.0
        };

        MiningStats {
            candidates_tried: result.candidates_tried,
            duration_seconds: result.duration_seconds,
            thread_count: result.thread_count,
            rate,
            rate_per_thread,
        }
    }
}

/// Writes mining results and their statistics to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsReporter;

impl StatsReporter {
    /// Logs the outcome and throughput of a mining call
    ///
    /// # Returns
    /// The statistics that were logged
    pub fn log_summary(&self, result: &MiningResult) -> MiningStats {
        let stats = MiningStats::from_result(result);

        match (result.termination, result.candidate) {
            (Termination::Matched, Some(candidate)) => {
                log::info!("Found gas price: {}", candidate)
            }
            (Termination::Cancelled, _) => log::warn!("Mining cancelled before a match"),
            _ => log::info!("No gas price in the search space satisfies the target"),
        }

        log::info!(
            "Tried {} candidates in {:.2}s | {:.0} c/s ({:.0} c/s per thread, {} threads)",
            stats.candidates_tried,
            stats.duration_seconds,
            stats.rate,
            stats.rate_per_thread,
            stats.thread_count
        );
        stats
    }
}
