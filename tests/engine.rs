// tests/engine.rs
//! End-to-end behaviour of the mining engine

use gas_miner_rs::miner::partition;
use gas_miner_rs::{
    CandidateEvaluator, FixedCores, GasPriceEvaluator, MinerError, MiningEngine, MiningRequest,
    PredicateEvaluator, SearchSpace, StopFlag, Termination,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

const ADDRESS: &str = "0x742d35cc6634c0532925a3b844bc454e4438f44e";

fn equals(target: u64) -> PredicateEvaluator<impl Fn(u64) -> bool + Send + Sync> {
    PredicateEvaluator::new(move |c| c == target)
}

fn small_request(thread_count: usize) -> MiningRequest {
    MiningRequest::new(ADDRESS, 0, 0)
        .with_range(0, 9)
        .with_batch_size(3)
        .with_thread_count(thread_count)
}

#[test]
fn scenario_match_inside_ten_candidates() {
    let (batches, _) = partition(SearchSpace::inclusive(0, 9).unwrap(), 3, 2).unwrap();
    let bounds: Vec<_> = batches.map(|b| (b.start, b.end)).collect();
    assert_eq!(bounds, vec![(0, 2), (3, 5), (6, 8), (9, 9)]);

    let engine = MiningEngine::new(equals(7), FixedCores(8));
    let result = engine.mine(&small_request(2)).unwrap();
    assert!(result.found);
    assert_eq!(result.candidate, Some(7));
    assert!(result.candidates_tried <= 9);
    assert_eq!(result.termination, Termination::Matched);
}

#[test]
fn scenario_target_outside_range() {
    let engine = MiningEngine::new(equals(20), FixedCores(8));
    let result = engine.mine(&small_request(2)).unwrap();
    assert!(!result.found);
    assert_eq!(result.candidate, None);
    assert_eq!(result.candidates_tried, 10);
    assert_eq!(result.termination, Termination::Exhausted);
}

#[test]
fn scenario_more_threads_than_batches() {
    let engine = MiningEngine::new(equals(20), FixedCores(8));
    let result = engine.mine(&small_request(8)).unwrap();
    assert_eq!(result.thread_count, 4);
    assert_eq!(result.candidates_tried, 10);
}

#[test]
fn single_thread_returns_lowest_match() {
    let matches = |c: u64| c % 97 == 41 || c % 89 == 13;
    let engine = MiningEngine::new(PredicateEvaluator::new(matches), FixedCores(1));
    let request = MiningRequest::new(ADDRESS, 0, 0)
        .with_range(1_000, 50_000)
        .with_batch_size(16)
        .with_thread_count(1);

    let expected = (1_000..=50_000).find(|&c| matches(c)).unwrap();
    let result = engine.mine(&request).unwrap();
    assert_eq!(result.candidate, Some(expected));
    assert_eq!(result.candidates_tried, expected - 1_000 + 1);
}

#[test]
fn multi_thread_result_is_sound() {
    let engine = MiningEngine::new(GasPriceEvaluator::default(), FixedCores(4));
    let request = MiningRequest::new(ADDRESS, 42, 21_000)
        .with_range(1, 5_000_000)
        .with_batch_size(256)
        .with_thread_count(4);

    let result = engine.mine(&request).unwrap();
    assert!(result.found);
    assert!(result.worker.is_some());

    let job = engine.validate(&request).unwrap();
    let candidate = result.candidate.unwrap();
    assert!(job.space.contains(candidate));
    assert!(engine.evaluator().verify(&job, candidate).unwrap());

    let prepared = engine.evaluator().prepare(&job);
    let evaluation = engine.evaluator().evaluate(&prepared, candidate).unwrap();
    assert_eq!(result.digest, Some(evaluation.digest));
}

#[test]
fn exhaustion_counts_whole_space() {
    let engine = MiningEngine::new(GasPriceEvaluator::default(), FixedCores(3));
    for (lower, upper, batch_size) in [(1, 1, 1), (1, 1_000, 7), (500, 20_499, 4096)] {
        let request = MiningRequest::new(ADDRESS, 1, u64::MAX)
            .with_range(lower, upper)
            .with_batch_size(batch_size)
            .with_thread_count(3);
        let result = engine.mine(&request).unwrap();
        assert!(!result.found);
        assert_eq!(result.termination, Termination::Exhausted);
        assert_eq!(result.candidates_tried, upper - lower + 1);
    }
}

#[test]
fn single_thread_runs_are_reproducible() {
    let engine = MiningEngine::new(GasPriceEvaluator::default(), FixedCores(1));
    let request = MiningRequest::new(ADDRESS, 42, 21_000)
        .with_range(1, 5_000_000)
        .with_thread_count(1);

    let first = engine.mine(&request).unwrap();
    assert!(first.found);
    for _ in 0..3 {
        let again = engine.mine(&request).unwrap();
        assert_eq!(again.candidate, first.candidate);
        assert_eq!(again.digest, first.digest);
        assert_eq!(again.candidates_tried, first.candidates_tried);
    }
}

#[test]
fn external_cancel_bounds_overshoot() {
    let evaluated = AtomicU64::new(0);
    let stop = StopFlag::new();
    let batch_size = 64;
    let threads = 4;

    let engine = MiningEngine::new(
        PredicateEvaluator::new(|_| {
            evaluated.fetch_add(1, Ordering::Relaxed);
            false
        }),
        FixedCores(threads),
    );
    let request = MiningRequest::new(ADDRESS, 0, 0)
        .with_batch_size(batch_size)
        .with_thread_count(threads);

    let worker_stop = stop.clone();
    let (result, seen_at_cancel) = std::thread::scope(|s| {
        let run = s.spawn(|| engine.mine_with_stop(&request, &worker_stop));

        while evaluated.load(Ordering::Relaxed) < 10_000 {
            std::thread::yield_now();
        }
        assert!(stop.cancel());
        let seen = evaluated.load(Ordering::Relaxed);
        (run.join().unwrap().unwrap(), seen)
    });

    assert!(!result.found);
    assert_eq!(result.termination, Termination::Cancelled);
    assert_eq!(result.candidates_tried, evaluated.load(Ordering::Relaxed));
    assert!(result.candidates_tried <= seen_at_cancel + threads as u64 * batch_size);
}

#[test]
fn cancelled_before_start_evaluates_nothing() {
    let engine = MiningEngine::new(equals(3), FixedCores(2));
    let stop = StopFlag::new();
    stop.cancel();

    let result = engine.mine_with_stop(&small_request(2), &stop).unwrap();
    assert!(!result.found);
    assert_eq!(result.candidates_tried, 0);
    assert_eq!(result.termination, Termination::Cancelled);
}

#[test]
fn out_of_domain_range_is_fatal() {
    let engine = MiningEngine::new(GasPriceEvaluator::default(), FixedCores(2));
    let request = MiningRequest::new(ADDRESS, 0, u64::MAX)
        .with_range(0, 100)
        .with_thread_count(2);

    match engine.mine(&request).unwrap_err() {
        MinerError::Domain { source, .. } => assert_eq!(source.candidate, 0),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn domain_error_stops_other_workers() {
    let domain = SearchSpace::inclusive(0, 1_000).unwrap();
    let engine = MiningEngine::new(PredicateEvaluator::with_domain(domain, |_| false), FixedCores(4));
    let request = MiningRequest::new(ADDRESS, 0, 0)
        .with_range(0, u64::MAX - 1)
        .with_batch_size(100)
        .with_thread_count(4);

    let started = Instant::now();
    let err = engine.mine(&request).unwrap_err();
    assert!(matches!(err, MinerError::Domain { .. }));
    assert!(started.elapsed() < Duration::from_secs(30));
}

#[test]
fn validation_happens_before_work() {
    let evaluated = AtomicU64::new(0);
    let engine = MiningEngine::new(
        PredicateEvaluator::new(|_| {
            evaluated.fetch_add(1, Ordering::Relaxed);
            true
        }),
        FixedCores(2),
    );

    for request in [
        small_request(0),
        small_request(2).with_batch_size(0),
        small_request(2).with_range(9, 0),
        MiningRequest::new("0xnothex", 0, 0),
    ] {
        assert!(engine.mine(&request).unwrap_err().is_validation());
    }
    assert_eq!(evaluated.load(Ordering::Relaxed), 0);
}
