// src/utils/error.rs
use crate::miner::evaluator::DomainError;
use std::io;
use thiserror::Error;

/// Main error type for the gas price miner
///
/// Separates request problems caught before any thread spawns
/// (`ValidationError`) from faults raised while the search runs
/// (`Domain`, `WorkerFailure`) and from the ambient I/O and configuration
/// errors of the calling surface.
#[derive(Error, Debug)]
pub enum MinerError {
    /// Malformed request: bad address, zero batch size or thread count,
    /// inverted range bounds
    #[error("Invalid request: {0}")]
    ValidationError(String),

    /// A worker reached a candidate outside the evaluator's domain
    #[error("Worker {worker} hit an out-of-domain candidate: {source}")]
    Domain {
        /// Worker that evaluated the offending candidate
        worker: usize,
        /// The evaluator's report, naming the candidate
        #[source]
        source: DomainError,
    },

    /// A worker thread died without reporting a terminal state
    #[error("Worker {worker} failed: {reason}")]
    WorkerFailure {
        /// Worker that failed
        worker: usize,
        /// Panic message or spawn error
        reason: String,
    },

    /// Configuration file or parameter errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Standard I/O operation errors
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Async task execution errors
    #[error("Task execution error: {0}")]
    TaskError(String),
}

impl MinerError {
    /// Whether the error was raised before any work started
    pub fn is_validation(&self) -> bool {
        matches!(self, MinerError::ValidationError(_))
    }
}

/// Converts TOML parse errors into MinerError
///
/// Wraps the original error in a `ConfigError` variant.
impl From<toml::de::Error> for MinerError {
    fn from(e: toml::de::Error) -> Self {
        MinerError::ConfigError(format!("Invalid config format: {}", e))
    }
}

/// Converts address parse errors into MinerError
///
/// Raised for non-hex input and wrong length.
impl From<alloy_primitives::AddressError> for MinerError {
    fn from(e: alloy_primitives::AddressError) -> Self {
        MinerError::ValidationError(format!("Invalid address: {}", e))
    }
}

/// Converts async task join errors into MinerError
///
/// Used when the blocking mining call offloaded to the tokio runtime
/// panics or is cancelled.
impl From<tokio::task::JoinError> for MinerError {
    fn from(e: tokio::task::JoinError) -> Self {
        MinerError::TaskError(format!("Async task failed: {}", e))
    }
}
