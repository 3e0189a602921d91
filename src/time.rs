//! Time primitives (§3 C1) and the `Clock` host capability (§4.10 C10).
//!
//! The engine never calls `Instant::now()` directly; it goes through a
//! `Clock` so tests can supply a deterministic clock instead of the wall
//! clock, the same way the reference implementation's `gettime()` is a thin
//! indirection the simulator host overrides.

use std::time::{Duration, Instant};

/// A source of monotonic time.
pub trait Clock: Send + Sync {
    /// The current instant, monotonic, microsecond resolution or better.
    fn now(&self) -> Instant;
}

/// The real wall clock, backed by `std::time::Instant`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
