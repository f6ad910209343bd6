// src/miner/stop.rs
//! Cooperative stop signal shared by the workers of one mining call
//!
//! The flag starts out running and moves to a stopped state exactly once.
//! The first trigger wins and records why the call stopped; later triggers
//! are no-ops. Workers poll [`StopFlag::is_set`] between evaluations.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// Why the stop flag was set
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// A worker found a matching candidate and owns the result slot
    Matched,
    /// An external caller asked the search to stop
    Cancelled,
    /// A worker hit a fatal error or died
    Failed,
}

const RUNNING: u8 = 0;
const MATCHED: u8 = 1;
const CANCELLED: u8 = 2;
const FAILED: u8 = 3;

impl StopReason {
    fn as_u8(self) -> u8 {
        match self {
            StopReason::Matched => MATCHED,
            StopReason::Cancelled => CANCELLED,
            StopReason::Failed => FAILED,
        }
    }

    fn from_u8(state: u8) -> Option<Self> {
        match state {
            MATCHED => Some(StopReason::Matched),
            CANCELLED => Some(StopReason::Cancelled),
            FAILED => Some(StopReason::Failed),
            _ => None,
        }
    }
}

/// Handle to a one-shot stop signal
///
/// Clones share the same signal, so a caller can keep one handle to cancel
/// from another thread while the engine runs with the other. A flag belongs
/// to a single mining call and is never reset: passing an already-set flag
/// makes the call return immediately.
#[derive(Clone, Default)]
pub struct StopFlag {
    state: Arc<AtomicU8>,
}

impl StopFlag {
    /// Creates a flag in the running state
    pub fn new() -> Self {
        StopFlag {
            state: Arc::new(AtomicU8::new(RUNNING)),
        }
    }

    /// Sets the flag if nobody has yet
    ///
    /// # Returns
    /// `true` for the one caller whose trigger took effect
    pub fn trigger(&self, reason: StopReason) -> bool {
        self.state
            .compare_exchange(RUNNING, reason.as_u8(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// External stop trigger
    pub fn cancel(&self) -> bool {
        self.trigger(StopReason::Cancelled)
    }

    /// Whether any trigger has fired
    #[inline]
    pub fn is_set(&self) -> bool {
        self.state.load(Ordering::Acquire) != RUNNING
    }

    /// The reason recorded by the winning trigger
    pub fn reason(&self) -> Option<StopReason> {
        StopReason::from_u8(self.state.load(Ordering::Acquire))
    }
}

impl fmt::Debug for StopFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopFlag")
            .field("reason", &self.reason())
            .finish()
    }
}
