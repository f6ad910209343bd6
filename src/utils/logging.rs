// src/utils/logging.rs
//! Logging configuration and utilities
//!
//! The library only emits through the `log` facade. The binary picks a
//! backend here:
//! - Standard logging configuration
//! - Benchmark-specific logging
//! - Custom log formatting
//!
//! Uses `env_logger` under the hood with custom formatting and filtering.

use env_logger::{Builder, Target};
use log::LevelFilter;
use std::env;

/// Initializes the logging subsystem with sensible defaults
///
/// # Configuration
/// - Logs to stdout
/// - Default log level: Info
/// - Custom timestamp and source location formatting
/// - Respects `RUST_LOG` environment variable if set
pub fn init_logging() {
    init_with_default(LevelFilter::Info);
}

/// Configures benchmark-specific logging
///
/// Same as [`init_logging`] but defaults to Debug so per-worker exit lines
/// are visible.
pub fn init_bench_logging() {
    init_with_default(LevelFilter::Debug);
}

fn init_with_default(level: LevelFilter) {
    let mut builder = common_log_config();

    if env::var("RUST_LOG").is_err() {
        builder.filter_level(level);
    } else {
        builder.parse_env("RUST_LOG");
    }

    // A second initialisation (tests, embedding hosts) keeps the first logger.
    let _ = builder.try_init();
}

/// Creates and configures a base logger builder with common settings
///
/// # Features
/// - Custom log format including:
///   - Timestamp (seconds since epoch)
///   - Log level
///   - Module path
///   - Line number
///   - Thread name (workers are named `gas-miner-<id>`)
///   - Message
/// - Output to stdout
fn common_log_config() -> Builder {
    let mut builder = Builder::new();

    builder
        .format(|buf, record| {
            use std::io::Write;
            let ts = buf.timestamp_seconds();
            let level = record.level();
            let module = record.module_path().unwrap_or_default();
            let line = record.line().unwrap_or(0);
            let current = std::thread::current();
            let thread = current.name().unwrap_or("main");

            writeln!(
                buf,
                "[{} {} {}:{} {}] {}",
                ts,
                level,
                module,
                line,
                thread,
                record.args()
            )
        })
        .target(Target::Stdout);

    builder
}
