// src/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// A gas price value under test
pub type Candidate = u64;

/// Inclusive `[lower, upper]` bounds narrowing the search space of a request
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRange {
    /// First candidate to evaluate
    pub lower: Candidate,
    /// Last candidate to evaluate (inclusive)
    pub upper: Candidate,
}

impl CandidateRange {
    /// Creates a range without checking the bound order
    pub fn new(lower: Candidate, upper: Candidate) -> Self {
        CandidateRange { lower, upper }
    }

    /// The search space covered by this range, `None` if the bounds are inverted
    pub fn to_space(self) -> Option<SearchSpace> {
        SearchSpace::inclusive(self.lower, self.upper)
    }
}

/// The finite set of candidates a single mining call scans
///
/// Either empty or an inclusive, monotonically increasing range of `u64`.
/// The length is a `u128` because the full domain holds 2^64 values.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SearchSpace {
    bounds: Option<(Candidate, Candidate)>,
}

impl SearchSpace {
    /// Every representable candidate
    pub const FULL: SearchSpace = SearchSpace {
        bounds: Some((0, u64::MAX)),
    };

    /// Creates the inclusive space `[lower, upper]`
    ///
    /// Returns `None` when `lower > upper`.
    pub fn inclusive(lower: Candidate, upper: Candidate) -> Option<Self> {
        (lower <= upper).then_some(SearchSpace {
            bounds: Some((lower, upper)),
        })
    }

    /// Every candidate from `lower` up to `u64::MAX`
    pub const fn at_least(lower: Candidate) -> Self {
        SearchSpace {
            bounds: Some((lower, u64::MAX)),
        }
    }

    /// The space with no candidates
    pub fn empty() -> Self {
        SearchSpace { bounds: None }
    }

    /// First candidate, if any
    pub fn lower(&self) -> Option<Candidate> {
        self.bounds.map(|(lower, _)| lower)
    }

    /// Last candidate, if any
    pub fn upper(&self) -> Option<Candidate> {
        self.bounds.map(|(_, upper)| upper)
    }

    /// Number of candidates in the space
    pub fn len(&self) -> u128 {
        match self.bounds {
            Some((lower, upper)) => (upper - lower) as u128 + 1,
            None => 0,
        }
    }

    /// Whether the space holds no candidates
    pub fn is_empty(&self) -> bool {
        self.bounds.is_none()
    }

    /// Whether `candidate` lies inside the space
    pub fn contains(&self, candidate: Candidate) -> bool {
        self.bounds
            .is_some_and(|(lower, upper)| (lower..=upper).contains(&candidate))
    }
}

impl fmt::Display for SearchSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bounds {
            Some((lower, upper)) => write!(f, "[{}, {}]", lower, upper),
            None => write!(f, "[]"),
        }
    }
}

/// A contiguous run of candidates claimed by one worker at a time
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Batch {
    /// Position of this batch in the ordered partition
    pub index: u64,
    /// First candidate of the batch
    pub start: Candidate,
    /// Last candidate of the batch (inclusive)
    pub end: Candidate,
}

impl Batch {
    /// Number of candidates in the batch
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Batches always hold at least one candidate
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Candidates of the batch in ascending order
    pub fn candidates(&self) -> std::ops::RangeInclusive<Candidate> {
        self.start..=self.end
    }
}

impl fmt::Display for Batch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} [{}-{}]", self.index, self.start, self.end)
    }
}

/// Why a mining call stopped
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Termination {
    /// A worker published a matching candidate
    Matched,
    /// Every candidate was evaluated without a match
    Exhausted,
    /// An external stop trigger fired before any match
    Cancelled,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Matched => write!(f, "matched"),
            Termination::Exhausted => write!(f, "exhausted"),
            Termination::Cancelled => write!(f, "cancelled"),
        }
    }
}
