// src/engine.rs
//! Mining engine facade
//!
//! The only entry point external callers need. It validates a
//! [`MiningRequest`], resolves its defaults against an injected core count
//! and runs a [`Coordinator`] on the calling thread. Callers that must stay
//! responsive use [`MiningEngine::mine_async`] or cancel through a
//! [`StopFlag`].

use crate::config::MiningRequest;
use crate::miner::coordinator::{Coordinator, MiningJob, MiningResult};
use crate::miner::evaluator::{CandidateEvaluator, GasPriceEvaluator};
use crate::miner::stop::StopFlag;
use crate::utils::error::MinerError;
use alloy_primitives::{Address, AddressError};
use crossbeam_channel::{after, select};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Batch size used when a request does not set one
pub const DEFAULT_BATCH_SIZE: u64 = 4096;

/// Largest batch size a request may ask for
pub const MAX_BATCH_SIZE: u64 = 1_000_000;

/// Source of the number of usable CPU cores
pub trait CoreCount: Send + Sync {
    /// Logical cores available to the engine
    fn available(&self) -> usize;
}

/// Core count detected from the running system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCores;

impl CoreCount for SystemCores {
    fn available(&self) -> usize {
        num_cpus::get()
    }
}

/// A fixed core count, for hosts that budget threads themselves
#[derive(Debug, Clone, Copy)]
pub struct FixedCores(pub usize);

impl CoreCount for FixedCores {
    fn available(&self) -> usize {
        self.0
    }
}

/// Number of logical CPU cores on this machine
///
/// Purely informational; callers may use it to pick a thread count.
pub fn get_cpu_count() -> usize {
    num_cpus::get()
}

/// Validates requests and runs mining calls
#[derive(Debug, Clone)]
pub struct MiningEngine<E, C = SystemCores> {
    evaluator: E,
    cores: C,
}

impl MiningEngine<GasPriceEvaluator, SystemCores> {
    /// Gas price engine using every detected core
    ///
    /// # Errors
    /// `ValidationError` if `difficulty` is zero
    pub fn gas_price(difficulty: u64) -> Result<Self, MinerError> {
        Ok(MiningEngine::new(GasPriceEvaluator::new(difficulty)?, SystemCores))
    }
}

impl<E: CandidateEvaluator, C: CoreCount> MiningEngine<E, C> {
    /// Creates an engine from an evaluator and a core count source
    pub fn new(evaluator: E, cores: C) -> Self {
        MiningEngine { evaluator, cores }
    }

    /// The engine's evaluator
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Checks a request and resolves its defaults
    ///
    /// # Errors
    /// `ValidationError` for a malformed address, a zero or oversized batch
    /// size, a zero thread count, or inverted range bounds
    pub fn validate(&self, request: &MiningRequest) -> Result<MiningJob, MinerError> {
        let address = parse_address(&request.address)?;

        let batch_size = match request.batch_size {
            Some(0) => {
                return Err(MinerError::ValidationError(
                    "Batch size must be greater than zero".to_string(),
                ));
            }
            Some(size) if size > MAX_BATCH_SIZE => {
                return Err(MinerError::ValidationError(format!(
                    "Batch size too large, must be at most {}",
                    MAX_BATCH_SIZE
                )));
            }
            Some(size) => size,
            None => DEFAULT_BATCH_SIZE,
        };

        let available = self.cores.available().max(1);
        let thread_count = match request.thread_count {
            Some(0) => {
                return Err(MinerError::ValidationError(
                    "Thread count must be greater than zero".to_string(),
                ));
            }
            Some(threads) if threads > available => {
                log::warn!(
                    "Requested {} threads but only {} CPUs available, limiting to available CPUs",
                    threads,
                    available
                );
                available
            }
            Some(threads) => threads,
            None => available,
        };

        let space = match request.range {
            Some(range) => range.to_space().ok_or_else(|| {
                MinerError::ValidationError(format!(
                    "Range lower bound {} exceeds upper bound {}",
                    range.lower, range.upper
                ))
            })?,
            None => self.evaluator.domain(),
        };

        Ok(MiningJob {
            address,
            nonce: request.nonce,
            gas: request.gas,
            batch_size,
            thread_count,
            space,
        })
    }

    /// Runs a mining call to completion
    ///
    /// Blocks the calling thread until a match is published or the space
    /// is exhausted.
    pub fn mine(&self, request: &MiningRequest) -> Result<MiningResult, MinerError> {
        self.mine_with_stop(request, &StopFlag::new())
    }

    /// Runs a mining call that `stop` can cancel from another thread
    ///
    /// The flag must be fresh: one that is already set makes the call
    /// return a cancelled result without evaluating anything.
    pub fn mine_with_stop(
        &self,
        request: &MiningRequest,
        stop: &StopFlag,
    ) -> Result<MiningResult, MinerError> {
        let job = self.validate(request)?;
        log::info!(
            "Mining gas price for {} (nonce {}, gas {}) with {} threads",
            job.address,
            job.nonce,
            job.gas,
            job.thread_count
        );
        Coordinator::new(&self.evaluator, &job, stop.clone()).run()
    }

    /// Runs a mining call that is cancelled once `timeout` elapses
    pub fn mine_with_timeout(
        &self,
        request: &MiningRequest,
        timeout: Duration,
    ) -> Result<MiningResult, MinerError> {
        let stop = StopFlag::new();
        let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(0);

        std::thread::scope(|scope| {
            let watchdog_stop = stop.clone();
            scope.spawn(move || {
                select! {
                    recv(done_rx) -> _ => {},
                    recv(after(timeout)) -> _ => {
                        if watchdog_stop.cancel() {
                            log::warn!("Mining timed out after {:?}, cancelling", timeout);
                        }
                    }
                }
            });

            let result = self.mine_with_stop(request, &stop);
            // Disconnecting wakes the watchdog if the deadline has not passed.
            drop(done_tx);
            result
        })
    }
}

impl<E, C> MiningEngine<E, C>
where
    E: CandidateEvaluator + 'static,
    C: CoreCount + 'static,
{
    /// Runs a mining call on tokio's blocking pool
    ///
    /// The returned future resolves when the search finishes; the async
    /// runtime stays free in the meantime.
    pub async fn mine_async(
        self: Arc<Self>,
        request: MiningRequest,
    ) -> Result<MiningResult, MinerError> {
        tokio::task::spawn_blocking(move || self.mine(&request)).await?
    }
}

/// Parses a sender address
///
/// Any 20-byte hex string is accepted in any letter case; checksums are not
/// enforced.
fn parse_address(input: &str) -> Result<Address, MinerError> {
    Ok(Address::from_str(input).map_err(AddressError::from)?)
}
