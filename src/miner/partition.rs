// src/miner/partition.rs
//! Work partitioning
//!
//! Splits a [`SearchSpace`] into contiguous, non-overlapping batches of
//! `batch_size` candidates (the last one may be shorter) and hands them out
//! through a [`BatchQueue`]. Batch boundaries are pure arithmetic on the
//! batch index, so nothing is materialised up front and the partition of
//! the full `u64` domain costs the same as a ten-candidate one.

use crate::types::{Batch, SearchSpace};
use crate::utils::error::MinerError;
use std::sync::atomic::{AtomicU64, Ordering};

/// Deterministic split of a search space into ordered batches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkPartitioner {
    space: SearchSpace,
    batch_size: u64,
    batch_count: u64,
}

impl WorkPartitioner {
    /// Creates a partitioner for `space` with batches of `batch_size`
    ///
    /// # Errors
    /// - `ValidationError` if `batch_size` is zero
    /// - `ValidationError` if the space would need more than `u64::MAX`
    ///   batches (only the full 2^64 space with batch size 1)
    pub fn new(space: SearchSpace, batch_size: u64) -> Result<Self, MinerError> {
        if batch_size == 0 {
            return Err(MinerError::ValidationError(
                "Batch size must be greater than zero".to_string(),
            ));
        }

        let batch_count = space.len().div_ceil(batch_size as u128);
        let batch_count = u64::try_from(batch_count).map_err(|_| {
            MinerError::ValidationError(format!(
                "Search space {} needs a batch size of at least 2",
                space
            ))
        })?;

        Ok(WorkPartitioner {
            space,
            batch_size,
            batch_count,
        })
    }

    /// The partitioned space
    pub fn space(&self) -> SearchSpace {
        self.space
    }

    /// Candidates per full batch
    pub fn batch_size(&self) -> u64 {
        self.batch_size
    }

    /// Total number of batches
    pub fn batch_count(&self) -> u64 {
        self.batch_count
    }

    /// Workers that will actually receive work
    ///
    /// Threads beyond the number of batches would exit immediately, so they
    /// are not counted.
    pub fn active_workers(&self, thread_count: usize) -> usize {
        let batches = usize::try_from(self.batch_count).unwrap_or(usize::MAX);
        thread_count.min(batches)
    }

    /// The batch at `index`, if it exists
    pub fn batch(&self, index: u64) -> Option<Batch> {
        if index >= self.batch_count {
            return None;
        }
        let lower = self.space.lower()?;
        let upper = self.space.upper()?;

        // index < batch_count keeps the offset inside the space, so the
        // start never overflows; the end is clamped to the upper bound.
        let start = lower + index * self.batch_size;
        let end = start.saturating_add(self.batch_size - 1).min(upper);
        Some(Batch { index, start, end })
    }

    /// All batches in increasing order of their lower bound
    pub fn batches(&self) -> Batches {
        Batches {
            partitioner: *self,
            next: 0,
        }
    }

    /// A queue handing out this partition's batches to workers
    pub fn queue(&self) -> BatchQueue {
        BatchQueue {
            partitioner: *self,
            cursor: AtomicU64::new(0),
        }
    }
}

/// Ordered iterator over a partition's batches
#[derive(Debug, Clone)]
pub struct Batches {
    partitioner: WorkPartitioner,
    next: u64,
}

impl Iterator for Batches {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        let batch = self.partitioner.batch(self.next)?;
        self.next += 1;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.partitioner.batch_count - self.next;
        match usize::try_from(remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

/// Shared queue of unclaimed batches
///
/// Claims are a single atomic cursor step, so no two workers ever receive
/// the same batch and batches leave the queue in increasing order.
#[derive(Debug)]
pub struct BatchQueue {
    partitioner: WorkPartitioner,
    cursor: AtomicU64,
}

impl BatchQueue {
    /// Claims the next unclaimed batch, `None` once the queue is drained
    pub fn claim(&self) -> Option<Batch> {
        let count = self.partitioner.batch_count;
        let index = self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |next| {
                (next < count).then_some(next + 1)
            })
            .ok()?;
        self.partitioner.batch(index)
    }

    /// Number of batches handed out so far
    pub fn claimed(&self) -> u64 {
        self.cursor.load(Ordering::Acquire)
    }

    /// Number of batches still waiting to be claimed
    pub fn remaining(&self) -> u64 {
        self.partitioner.batch_count - self.claimed()
    }
}

/// Splits `space` into ordered batches of `batch_size`
///
/// Returns the lazy batch sequence together with the number of worker
/// slots that receive work. `thread_count` never changes the batches.
pub fn partition(
    space: SearchSpace,
    batch_size: u64,
    thread_count: usize,
) -> Result<(Batches, usize), MinerError> {
    let partitioner = WorkPartitioner::new(space, batch_size)?;
    Ok((partitioner.batches(), partitioner.active_workers(thread_count)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn space(lower: u64, upper: u64) -> SearchSpace {
        SearchSpace::inclusive(lower, upper).unwrap()
    }

    #[test]
    fn test_ten_candidates_in_batches_of_three() {
        let (batches, active) = partition(space(0, 9), 3, 2).unwrap();
        let bounds: Vec<_> = batches.map(|b| (b.start, b.end)).collect();
        assert_eq!(bounds, vec![(0, 2), (3, 5), (6, 8), (9, 9)]);
        assert_eq!(active, 2);
    }

    #[test]
    fn test_excess_threads_get_no_work() {
        let partitioner = WorkPartitioner::new(space(0, 9), 3).unwrap();
        assert_eq!(partitioner.batch_count(), 4);
        assert_eq!(partitioner.active_workers(8), 4);
    }

    #[test]
    fn test_empty_space_has_no_batches() {
        let (mut batches, active) = partition(SearchSpace::empty(), 3, 4).unwrap();
        assert!(batches.next().is_none());
        assert_eq!(active, 0);
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        assert!(WorkPartitioner::new(space(0, 9), 0).unwrap_err().is_validation());
    }

    #[test]
    fn test_coverage_without_overlap() {
        let spaces = [
            space(0, 0),
            space(0, 9),
            space(5, 104),
            space(1, 1000),
            space(u64::MAX - 20, u64::MAX),
        ];
        for space in spaces {
            for batch_size in [1, 2, 3, 7, 64, 5000] {
                for threads in [1, 2, 8] {
                    let (batches, active) = partition(space, batch_size, threads).unwrap();
                    let batches: Vec<Batch> = batches.collect();
                    assert!(active <= threads);
                    assert!(active <= batches.len());

                    // Ascending, contiguous, and exactly spanning the space.
                    let mut expected = space.lower().unwrap();
                    for (i, batch) in batches.iter().enumerate() {
                        assert_eq!(batch.index, i as u64);
                        assert_eq!(batch.start, expected);
                        assert!(batch.len() <= batch_size);
                        if i + 1 < batches.len() {
                            assert_eq!(batch.len(), batch_size);
                        }
                        expected = batch.end.wrapping_add(1);
                    }
                    assert_eq!(batches.last().unwrap().end, space.upper().unwrap());
                    let covered: u128 = batches.iter().map(|b| b.len() as u128).sum();
                    assert_eq!(covered, space.len());
                }
            }
        }
    }

    #[test]
    fn test_full_domain_partition() {
        let partitioner = WorkPartitioner::new(SearchSpace::FULL, 4096).unwrap();
        assert_eq!(partitioner.batch_count(), 1u64 << 52);
        let last = partitioner.batch(partitioner.batch_count() - 1).unwrap();
        assert_eq!(last.end, u64::MAX);
        assert_eq!(last.len(), 4096);

        assert!(WorkPartitioner::new(SearchSpace::FULL, 1).is_err());
        assert!(WorkPartitioner::new(SearchSpace::at_least(1), 1).is_ok());
    }

    #[test]
    fn test_queue_claims_in_order() {
        let queue = WorkPartitioner::new(space(0, 9), 3).unwrap().queue();
        let claimed: Vec<_> = std::iter::from_fn(|| queue.claim()).map(|b| b.index).collect();
        assert_eq!(claimed, vec![0, 1, 2, 3]);
        assert!(queue.claim().is_none());
        assert_eq!(queue.remaining(), 0);
    }

    #[test]
    fn test_concurrent_claims_are_disjoint() {
        let queue = Arc::new(WorkPartitioner::new(space(0, 99_999), 10).unwrap().queue());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let queue = queue.clone();
                std::thread::spawn(move || {
                    let mut mine = Vec::new();
                    while let Some(batch) = queue.claim() {
                        mine.push(batch.index);
                    }
                    mine
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            let claimed = handle.join().unwrap();
            // Each worker sees its own claims in increasing order.
            assert!(claimed.windows(2).all(|w| w[0] < w[1]));
            for index in claimed {
                assert!(seen.insert(index), "batch {} claimed twice", index);
            }
        }
        assert_eq!(seen.len(), 10_000);
    }
}
