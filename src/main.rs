// src/main.rs
use clap::Parser;
use gas_miner_rs::cli::{Action, BenchmarkOptions, ConfigOptions, MineOptions};
use gas_miner_rs::utils::{init_bench_logging, init_logging};
use gas_miner_rs::{
    Config, GasPriceEvaluator, MinerError, MiningEngine, MiningRequest, StatsReporter,
    SystemCores, get_cpu_count,
};
use std::time::Duration;

/// Main entry point for the gas price miner
///
/// # Returns
/// - `Ok(())` on successful execution
/// - `Err(MinerError)` if any operation fails
fn main() -> Result<(), MinerError> {
    let cli = gas_miner_rs::Commands::parse();

    match cli.action {
        Action::Mine(opts) => mine(opts),
        Action::Benchmark(opts) => run_benchmark(opts),
        Action::Config(opts) => generate_config(opts),
        Action::Cpus => {
            println!("{}", get_cpu_count());
            Ok(())
        }
    }
}

/// Runs one mining call
///
/// # Operations
/// 1. Initializes logging
/// 2. Loads the config file, if any, and applies CLI overrides
/// 3. Mines, with a deadline when one is configured
/// 4. Prints the result
fn mine(opts: MineOptions) -> Result<(), MinerError> {
    init_logging();

    let config = resolve_config(&opts)?;
    let engine = MiningEngine::gas_price(config.difficulty)?;

    let result = match config.timeout_secs {
        Some(secs) => engine.mine_with_timeout(&config.request, Duration::from_secs(secs))?,
        None => engine.mine(&config.request)?,
    };

    StatsReporter.log_summary(&result);
    if opts.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if let Some(candidate) = result.candidate {
        println!("{}", candidate);
    }
    Ok(())
}

/// Merges the optional config file with command line overrides
fn resolve_config(opts: &MineOptions) -> Result<Config, MinerError> {
    let mut config = match &opts.config {
        Some(path) => gas_miner_rs::config::load(path)?,
        None => {
            let (Some(address), Some(nonce), Some(gas)) = (&opts.address, opts.nonce, opts.gas)
            else {
                return Err(MinerError::ConfigError(
                    "Either --config or all of --address, --nonce and --gas are required"
                        .to_string(),
                ));
            };
            Config::new(MiningRequest::new(address.clone(), nonce, gas))
        }
    };

    let request = &mut config.request;
    if let Some(address) = &opts.address {
        request.address = address.clone();
    }
    if let Some(nonce) = opts.nonce {
        request.nonce = nonce;
    }
    if let Some(gas) = opts.gas {
        request.gas = gas;
    }
    if opts.batch_size.is_some() {
        request.batch_size = opts.batch_size;
    }
    if opts.threads.is_some() {
        request.thread_count = opts.threads;
    }
    if let (Some(lower), Some(upper)) = (opts.lower, opts.upper) {
        request.range = Some(gas_miner_rs::CandidateRange::new(lower, upper));
    }
    if let Some(difficulty) = opts.difficulty {
        config.difficulty = difficulty;
    }
    if opts.timeout.is_some() {
        config.timeout_secs = opts.timeout;
    }

    Ok(config)
}

/// Measures evaluation throughput
///
/// Scans `[1, candidates]` needing `u64::MAX` gas, which no candidate in a
/// realistic range grants, so every candidate is evaluated.
fn run_benchmark(opts: BenchmarkOptions) -> Result<(), MinerError> {
    init_bench_logging();

    let engine = MiningEngine::new(GasPriceEvaluator::default(), SystemCores);
    let request = MiningRequest::new(alloy_primitives::Address::ZERO.to_string(), 0, u64::MAX)
        .with_batch_size(opts.batch_size)
        .with_thread_count(opts.threads)
        .with_range(1, opts.candidates.max(1));

    log::info!(
        "Starting benchmark over {} candidates with {} threads",
        opts.candidates,
        opts.threads
    );

    let result = engine.mine(&request)?;
    let stats = StatsReporter.log_summary(&result);
    log::info!("Benchmark result: {:.0} candidates/s", stats.rate);
    log::logger().flush();
    Ok(())
}

/// Generates configuration template file
fn generate_config(opts: ConfigOptions) -> Result<(), MinerError> {
    let template = gas_miner_rs::config::generate_template();
    std::fs::write(&opts.output, template)?;
    println!("Wrote {}", opts.output.display());
    Ok(())
}
