// src/miner/evaluator/mod.rs
//! Candidate evaluation
//!
//! An evaluator maps a `(job, candidate)` pair to a 32-byte digest and a
//! match verdict. Implementations shipped with the crate:
//! - [`GasPriceEvaluator`] (proof-of-work gas price scheme)
//! - [`PredicateEvaluator`] (any `Fn(u64) -> bool` over a declared domain)

/// Proof-of-work gas price evaluator
pub mod gas_price;

/// Closure-driven evaluator
pub mod predicate;

pub use gas_price::GasPriceEvaluator;
pub use predicate::PredicateEvaluator;

use crate::miner::coordinator::MiningJob;
use crate::types::{Candidate, SearchSpace};
use alloy_primitives::{B256, U256, keccak256};
use thiserror::Error;

/// Outcome of evaluating a single candidate
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Evaluation {
    /// Digest the match predicate was applied to
    pub digest: B256,
    /// Whether the candidate satisfies the target condition
    pub is_match: bool,
}

/// A candidate fell outside the evaluator's valid domain
///
/// Always fatal to the mining call: it means the search space handed to
/// the workers was wrong, not that one candidate should be skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("candidate {candidate} outside evaluator domain {domain}")]
pub struct DomainError {
    /// The offending candidate
    pub candidate: Candidate,
    /// The domain the evaluator accepts
    pub domain: SearchSpace,
}

/// Common interface for all candidate evaluators
///
/// `evaluate` must be pure and deterministic: the same prepared job and
/// candidate always give the same [`Evaluation`], and calls from many
/// threads need no synchronisation.
pub trait CandidateEvaluator: Send + Sync {
    /// Per-job state computed once before any worker starts
    type Prepared: Send + Sync;

    /// Every candidate this evaluator accepts
    ///
    /// Used as the search space when a request does not narrow it.
    fn domain(&self) -> SearchSpace;

    /// Precomputes whatever the job contributes to every evaluation
    fn prepare(&self, job: &MiningJob) -> Self::Prepared;

    /// Evaluates one candidate against a prepared job
    ///
    /// # Returns
    /// - `Ok(Evaluation)` with the digest and match verdict
    /// - `Err(DomainError)` if `candidate` is outside [`Self::domain`]
    fn evaluate(
        &self,
        prepared: &Self::Prepared,
        candidate: Candidate,
    ) -> Result<Evaluation, DomainError>;

    /// Checks a single candidate against a job from scratch
    ///
    /// Convenience for callers verifying a published result.
    fn verify(&self, job: &MiningJob, candidate: Candidate) -> Result<bool, DomainError> {
        let prepared = self.prepare(job);
        Ok(self.evaluate(&prepared, candidate)?.is_match)
    }

    /// Rejects candidates outside [`Self::domain`]
    fn check_domain(&self, candidate: Candidate) -> Result<(), DomainError> {
        let domain = self.domain();
        if domain.contains(candidate) {
            Ok(())
        } else {
            Err(DomainError { candidate, domain })
        }
    }
}

/// Keccak-256 of the 32-byte big-endian encoding of `candidate`
#[inline(always)]
pub fn candidate_hash(candidate: Candidate) -> B256 {
    keccak256(U256::from(candidate).to_be_bytes::<32>())
}
