// src/miner/evaluator/predicate.rs
//! Evaluator driven by a plain match predicate
//!
//! Lets callers plug in their own target condition without writing a full
//! [`CandidateEvaluator`]: the digest is the Keccak-256 of the candidate's
//! 32-byte encoding and the verdict comes from the closure.

use crate::miner::coordinator::MiningJob;
use crate::miner::evaluator::{CandidateEvaluator, DomainError, Evaluation, candidate_hash};
use crate::types::{Candidate, SearchSpace};
use std::fmt;

/// Evaluator wrapping a `Fn(u64) -> bool` over a declared domain
pub struct PredicateEvaluator<F> {
    domain: SearchSpace,
    predicate: F,
}

impl<F> PredicateEvaluator<F>
where
    F: Fn(Candidate) -> bool + Send + Sync,
{
    /// Creates an evaluator accepting every `u64`
    pub fn new(predicate: F) -> Self {
        Self::with_domain(SearchSpace::FULL, predicate)
    }

    /// Creates an evaluator that raises `DomainError` outside `domain`
    pub fn with_domain(domain: SearchSpace, predicate: F) -> Self {
        PredicateEvaluator { domain, predicate }
    }
}

impl<F> fmt::Debug for PredicateEvaluator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateEvaluator")
            .field("domain", &self.domain)
            .finish_non_exhaustive()
    }
}

impl<F> CandidateEvaluator for PredicateEvaluator<F>
where
    F: Fn(Candidate) -> bool + Send + Sync,
{
    type Prepared = ();

    fn domain(&self) -> SearchSpace {
        self.domain
    }

    fn prepare(&self, _job: &MiningJob) -> Self::Prepared {}

    fn evaluate(&self, _prepared: &(), candidate: Candidate) -> Result<Evaluation, DomainError> {
        self.check_domain(candidate)?;
        Ok(Evaluation {
            digest: candidate_hash(candidate),
            is_match: (self.predicate)(candidate),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicate_verdicts() {
        let evaluator = PredicateEvaluator::new(|c| c % 7 == 0);
        assert!(evaluator.evaluate(&(), 14).unwrap().is_match);
        assert!(!evaluator.evaluate(&(), 15).unwrap().is_match);
        assert_eq!(evaluator.evaluate(&(), 15).unwrap().digest, candidate_hash(15));
    }

    #[test]
    fn test_declared_domain_enforced() {
        let domain = SearchSpace::inclusive(0, 9).unwrap();
        let evaluator = PredicateEvaluator::with_domain(domain, |_| false);
        assert!(evaluator.evaluate(&(), 9).is_ok());

        let err = evaluator.evaluate(&(), 10).unwrap_err();
        assert_eq!(err, DomainError { candidate: 10, domain });
    }
}
