// src/config/config.rs
use crate::miner::evaluator::GasPriceEvaluator;
use crate::types::CandidateRange;
use crate::utils::error::MinerError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A mining request as supplied by the caller
///
/// Nothing here is trusted: the engine validates every field and resolves
/// the optional ones before any worker starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiningRequest {
    /// Sender address, 20 bytes of hex with optional `0x` prefix
    pub address: String,

    /// Transaction nonce
    pub nonce: u64,

    /// Gas the transaction needs granted
    pub gas: u64,

    /// Candidates per batch
    /// (default: 4096, maximum: 1,000,000)
    #[serde(default)]
    pub batch_size: Option<u64>,

    /// Worker threads
    /// (default: number of CPU cores, clamped to it when larger)
    #[serde(default)]
    pub thread_count: Option<usize>,

    /// Gas prices to scan
    /// (default: every non-zero gas price)
    #[serde(default)]
    pub range: Option<CandidateRange>,
}

impl MiningRequest {
    /// Creates a request with every optional setting left to its default
    pub fn new(address: impl Into<String>, nonce: u64, gas: u64) -> Self {
        MiningRequest {
            address: address.into(),
            nonce,
            gas,
            batch_size: None,
            thread_count: None,
            range: None,
        }
    }

    /// Sets the batch size
    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Sets the thread count
    pub fn with_thread_count(mut self, thread_count: usize) -> Self {
        self.thread_count = Some(thread_count);
        self
    }

    /// Narrows the search to `[lower, upper]`
    pub fn with_range(mut self, lower: u64, upper: u64) -> Self {
        self.range = Some(CandidateRange::new(lower, upper));
        self
    }
}

/// Main configuration structure for the gas price miner
///
/// Holds the request plus the evaluator and caller-side settings that are
/// not part of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Proof-of-work difficulty divisor
    /// (default: 1)
    #[serde(default = "default_difficulty")]
    pub difficulty: u64,

    /// Give up and cancel after this many seconds
    /// (default: no limit)
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// The mining request
    pub request: MiningRequest,
}

fn default_difficulty() -> u64 {
    GasPriceEvaluator::DEFAULT_DIFFICULTY
}

impl Config {
    /// Wraps a request with default settings
    pub fn new(request: MiningRequest) -> Self {
        Config {
            difficulty: default_difficulty(),
            timeout_secs: None,
            request,
        }
    }

    /// Loads configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Ok(Config)` - Successfully loaded configuration
    /// * `Err(MinerError)` - If file couldn't be read or parsed
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, MinerError> {
        let path = path.into();
        let config_str = std::fs::read_to_string(&path).map_err(|e| {
            MinerError::ConfigError(format!(
                "Failed to read config at {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_toml_str(&config_str)
    }

    /// Parses configuration from TOML text
    pub fn from_toml_str(config_str: &str) -> Result<Self, MinerError> {
        Ok(toml::from_str(config_str)?)
    }

    /// Generates a configuration template string
    ///
    /// # Returns
    /// String containing a commented TOML configuration template
    pub fn generate_template() -> String {
        let mut template = String::new();
        template.push_str("# Gas Price Miner Configuration\n\n");
        template.push_str("# Proof-of-work difficulty divisor\n");
        template.push_str("difficulty = 1\n");
        template.push_str("# Cancel the search after this many seconds\n");
        template.push_str("# timeout_secs = 60\n\n");
        template.push_str("[request]\n");
        template.push_str("address = \"0x0000000000000000000000000000000000000000\"\n");
        template.push_str("nonce = 0\n");
        template.push_str("gas = 21000\n");
        template.push_str("# Candidates per batch (default 4096, max 1000000)\n");
        template.push_str("# batch_size = 4096\n");
        template.push_str("# Worker threads (default: all CPU cores)\n");
        template.push_str("# thread_count = 4\n\n");
        template.push_str("# Narrow the gas prices to scan (default: every non-zero price)\n");
        template.push_str("# [request.range]\n");
        template.push_str("# lower = 1\n");
        template.push_str("# upper = 1000000000\n");
        template
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parses_with_defaults() {
        let config = Config::from_toml_str(&Config::generate_template()).unwrap();
        assert_eq!(config.difficulty, 1);
        assert_eq!(config.timeout_secs, None);
        assert_eq!(
            config.request,
            MiningRequest::new("0x0000000000000000000000000000000000000000", 0, 21_000)
        );
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_toml_str(
            r#"
            difficulty = 3
            timeout_secs = 30

            [request]
            address = "0x742d35cc6634c0532925a3b844bc454e4438f44e"
            nonce = 42
            gas = 21000
            batch_size = 4096
            thread_count = 2

            [request.range]
            lower = 10
            upper = 20
            "#,
        )
        .unwrap();

        assert_eq!(config.difficulty, 3);
        assert_eq!(config.timeout_secs, Some(30));
        assert_eq!(config.request.batch_size, Some(4096));
        assert_eq!(config.request.thread_count, Some(2));
        assert_eq!(config.request.range, Some(CandidateRange::new(10, 20)));
    }

    #[test]
    fn test_missing_request_is_config_error() {
        let err = Config::from_toml_str("difficulty = 1\n").unwrap_err();
        assert!(matches!(err, MinerError::ConfigError(_)));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = Config::load("/nonexistent/gas-miner.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }

    #[test]
    fn test_builder_sets_options() {
        let request = MiningRequest::new("0xabc", 1, 2)
            .with_batch_size(8)
            .with_thread_count(3)
            .with_range(5, 6);
        assert_eq!(request.batch_size, Some(8));
        assert_eq!(request.thread_count, Some(3));
        assert_eq!(request.range, Some(CandidateRange::new(5, 6)));
    }
}
