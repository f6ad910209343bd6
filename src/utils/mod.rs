// src/utils/mod.rs
//! Utilities module for common functionality
//!
//! Shared error handling and logging infrastructure.

/// Error types and handling utilities
///
/// Contains the [`MinerError`] enum which defines all possible error conditions
/// for the miner, along with conversion implementations.
pub mod error;

/// Logging configuration and utilities
///
/// Provides logging initialization for the binary, including formatting
/// and output destinations.
pub mod logging;

// Re-export for easier access
pub use error::MinerError;
pub use logging::{init_bench_logging, init_logging};
