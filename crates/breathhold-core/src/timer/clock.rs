//! Time sources.
//!
//! Every component reads time through [`Clock`]: a monotonic reading for
//! measuring durations and a wall reading for stamping sessions. The state
//! machine never calls `Instant::now()` or `Utc::now()` directly, so tests can
//! drive it with [`ManualClock`].

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub trait Clock {
    /// Monotonic time elapsed since the clock's origin.
    fn monotonic(&self) -> Duration;

    /// Current wall-clock time.
    fn wall(&self) -> DateTime<Utc>;
}

/// Real clock backed by `Instant` and the system wall clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn monotonic(&self) -> Duration {
        self.origin.elapsed()
    }

    fn wall(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Hand-driven clock for tests and simulations.
///
/// Clones share the same reading, so a test can keep one handle and give
/// another to the machine under test. Wall time moves in lockstep with the
/// monotonic reading.
#[derive(Debug, Clone)]
pub struct ManualClock {
    wall_origin: DateTime<Utc>,
    offset_ns: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(wall_origin: DateTime<Utc>) -> Self {
        Self {
            wall_origin,
            offset_ns: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn wall_origin(&self) -> DateTime<Utc> {
        self.wall_origin
    }

    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.offset_ns.fetch_add(nanos, Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: f64) {
        self.advance(Duration::from_secs_f64(secs.max(0.0)));
    }

    /// Advance in `step` increments, invoking `on_step` after each one.
    ///
    /// Mimics a host that calls `tick()` on every frame.
    pub fn run_for(&self, total: Duration, step: Duration, mut on_step: impl FnMut()) {
        let mut elapsed = Duration::ZERO;
        while elapsed < total {
            let next = step.min(total - elapsed);
            self.advance(next);
            elapsed += next;
            on_step();
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn monotonic(&self) -> Duration {
        Duration::from_nanos(self.offset_ns.load(Ordering::SeqCst))
    }

    fn wall(&self) -> DateTime<Utc> {
        let offset = chrono::Duration::from_std(self.monotonic()).unwrap_or_else(|_| chrono::Duration::zero());
        self.wall_origin + offset
    }
}
