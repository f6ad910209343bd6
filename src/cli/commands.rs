// src/cli/commands.rs
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Gas Miner CLI - parallel proof-of-work gas price search
#[derive(Parser, Debug)]
#[command(name = "gas-miner")]
#[command(version, about, long_about = None)]
pub struct Commands {
    /// The action to perform
    #[command(subcommand)]
    pub action: Action,
}

/// Top-level commands for the miner application
#[derive(Subcommand, Debug)]
pub enum Action {
    /// Search for a gas price satisfying the proof-of-work target
    Mine(MineOptions),

    /// Measure candidate throughput with a target that never matches
    #[command(name = "bench")]
    Benchmark(BenchmarkOptions),

    /// Generate configuration file template
    Config(ConfigOptions),

    /// Print the number of CPU cores available
    Cpus,
}

/// Options for a mining run
///
/// Request fields given here override the config file.
#[derive(Args, Debug)]
pub struct MineOptions {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Sender address (hex)
    #[arg(short, long)]
    pub address: Option<String>,

    /// Transaction nonce
    #[arg(short, long)]
    pub nonce: Option<u64>,

    /// Gas the transaction needs granted
    #[arg(short, long)]
    pub gas: Option<u64>,

    /// Candidates per batch
    #[arg(short, long)]
    pub batch_size: Option<u64>,

    /// Number of threads to use
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// First gas price to try
    #[arg(long, requires = "upper")]
    pub lower: Option<u64>,

    /// Last gas price to try
    #[arg(long, requires = "lower")]
    pub upper: Option<u64>,

    /// Proof-of-work difficulty divisor
    #[arg(short, long)]
    pub difficulty: Option<u64>,

    /// Cancel after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Options for running a throughput benchmark
#[derive(Args, Debug)]
pub struct BenchmarkOptions {
    /// Number of gas prices to evaluate
    #[arg(short, long, default_value_t = 10_000_000)]
    pub candidates: u64,

    /// Number of threads to use
    #[arg(short, long, default_value_t = num_cpus::get())]
    pub threads: usize,

    /// Candidates per batch
    #[arg(short, long, default_value_t = crate::engine::DEFAULT_BATCH_SIZE)]
    pub batch_size: u64,
}

/// Options for generating configuration files
#[derive(Args, Debug)]
pub struct ConfigOptions {
    /// Output file path
    #[arg(short, long, default_value = "gas-miner.toml")]
    pub output: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bench_subcommand() {
        let cli = Commands::try_parse_from(["gas-miner", "bench", "-t", "2", "-c", "500"]).unwrap();
        match cli.action {
            Action::Benchmark(opts) => {
                assert_eq!(opts.threads, 2);
                assert_eq!(opts.candidates, 500);
                assert_eq!(opts.batch_size, crate::engine::DEFAULT_BATCH_SIZE);
            }
            other => panic!("unexpected action: {:?}", other),
        }
        assert!(Commands::try_parse_from(["gas-miner", "benchmark"]).is_err());
    }

    #[test]
    fn test_range_bounds_come_in_pairs() {
        let cli = Commands::try_parse_from([
            "gas-miner", "mine", "-a", "0x00", "-n", "1", "-g", "2", "--lower", "5", "--upper", "9",
        ])
        .unwrap();
        let Action::Mine(opts) = cli.action else {
            panic!("expected mine");
        };
        assert_eq!((opts.lower, opts.upper), (Some(5), Some(9)));
        assert!(!opts.json);

        assert!(Commands::try_parse_from(["gas-miner", "mine", "--lower", "5"]).is_err());
    }
}
