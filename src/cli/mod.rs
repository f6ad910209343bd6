// src/cli/mod.rs
//! Command-line interface definitions for the `gas-miner` binary

/// clap command and option structs
pub mod commands;

pub use commands::{Action, BenchmarkOptions, Commands, ConfigOptions, MineOptions};
