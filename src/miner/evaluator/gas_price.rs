// src/miner/evaluator/gas_price.rs
//! Proof-of-work gas price evaluation
//!
//! A transaction `(nonce, gas, from)` is granted its gas when the chosen gas
//! price hashes close enough to zero:
//!
//! ```text
//! seed        = keccak256(uint256(nonce)) ^ keccak256(from)
//! digest      = keccak256(uint256(gas_price)) ^ seed
//! externalGas = ((2^256 - 1) / difficulty) / digest
//! match       = externalGas >= gas
//! ```
//!
//! The seed and the digest threshold only depend on the job, so they are
//! computed once in [`CandidateEvaluator::prepare`]. Each evaluation is then
//! one Keccak over a stack buffer, a XOR and a compare.

use crate::miner::coordinator::MiningJob;
use crate::miner::evaluator::{CandidateEvaluator, DomainError, Evaluation, candidate_hash};
use crate::types::{Candidate, SearchSpace};
use crate::utils::error::MinerError;
use alloy_primitives::{Address, B256, U256, keccak256};

/// Gas price evaluator for the proof-of-work gas scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasPriceEvaluator {
    /// Divisor applied to the digest space (never zero)
    difficulty: U256,
}

/// Job constants shared by every evaluation of one mining call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasPriceSeed {
    /// `keccak256(uint256(nonce)) ^ keccak256(from)`
    pub seed: B256,
    /// Largest digest that still yields enough external gas
    pub threshold: B256,
}

impl GasPriceEvaluator {
    /// Difficulty used when a config does not set one
    pub const DEFAULT_DIFFICULTY: u64 = 1;

    /// Creates an evaluator with the given difficulty
    ///
    /// # Errors
    /// `ValidationError` if `difficulty` is zero
    pub fn new(difficulty: u64) -> Result<Self, MinerError> {
        if difficulty == 0 {
            return Err(MinerError::ValidationError(
                "Difficulty must be greater than zero".to_string(),
            ));
        }
        Ok(GasPriceEvaluator {
            difficulty: U256::from(difficulty),
        })
    }

    /// The seed for a `(nonce, from)` pair
    pub fn seed(nonce: u64, from: &Address) -> B256 {
        keccak256(U256::from(nonce).to_be_bytes::<32>()) ^ keccak256(from.as_slice())
    }

    /// The largest digest granting at least `gas`
    ///
    /// `floor(M / d) >= g` holds exactly when `d <= floor(M / g)`, so the
    /// per-candidate division collapses into one compare.
    pub fn threshold(&self, gas: u64) -> U256 {
        let ceiling = U256::MAX / self.difficulty;
        if gas == 0 {
            U256::MAX
        } else {
            ceiling / U256::from(gas)
        }
    }

    /// Gas granted by a digest; a zero digest grants everything
    pub fn external_gas(&self, digest: &B256) -> U256 {
        let digest = U256::from_be_bytes(digest.0);
        if digest.is_zero() {
            U256::MAX
        } else {
            (U256::MAX / self.difficulty) / digest
        }
    }
}

impl Default for GasPriceEvaluator {
    fn default() -> Self {
        GasPriceEvaluator {
            difficulty: U256::from(Self::DEFAULT_DIFFICULTY),
        }
    }
}

impl CandidateEvaluator for GasPriceEvaluator {
    type Prepared = GasPriceSeed;

    /// Any non-zero gas price
    fn domain(&self) -> SearchSpace {
        SearchSpace::at_least(1)
    }

    fn prepare(&self, job: &MiningJob) -> GasPriceSeed {
        GasPriceSeed {
            seed: Self::seed(job.nonce, &job.address),
            threshold: B256::from(self.threshold(job.gas).to_be_bytes::<32>()),
        }
    }

    #[inline]
    fn evaluate(
        &self,
        prepared: &GasPriceSeed,
        candidate: Candidate,
    ) -> Result<Evaluation, DomainError> {
        if candidate == 0 {
            return Err(DomainError {
                candidate,
                domain: self.domain(),
            });
        }

        let digest = candidate_hash(candidate) ^ prepared.seed;
        // Big-endian bytes order the same way as the integers they encode.
        Ok(Evaluation {
            digest,
            is_match: digest <= prepared.threshold,
        })
    }
}
