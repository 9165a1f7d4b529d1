//! Hold stopwatch.
//!
//! Elapsed time is always `now - start`, recomputed from the recorded start
//! instant on every frame tick. Nothing is accumulated per tick, so a host
//! that stops ticking while suspended catches up on the first tick after
//! resume.

use std::time::Duration;

use super::tick::{FrameTicker, TickSource};

#[derive(Debug, Clone)]
pub struct HoldStopwatch<T: TickSource = FrameTicker> {
    ticker: T,
    started_at: Option<Duration>,
    elapsed: Duration,
}

impl HoldStopwatch<FrameTicker> {
    pub fn new() -> Self {
        Self::with_ticker(FrameTicker::default())
    }
}

impl Default for HoldStopwatch<FrameTicker> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TickSource> HoldStopwatch<T> {
    pub fn with_ticker(mut ticker: T) -> Self {
        ticker.disarm();
        Self {
            ticker,
            started_at: None,
            elapsed: Duration::ZERO,
        }
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_armed()
    }

    /// Monotonic instant the current or last run started at.
    pub fn started_at(&self) -> Option<Duration> {
        self.started_at
    }

    /// Last computed elapsed value.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Record `now` as the start instant. Returns `false` if already running.
    pub fn start(&mut self, now: Duration) -> bool {
        if self.is_running() {
            return false;
        }
        self.started_at = Some(now);
        self.elapsed = Duration::ZERO;
        self.ticker.arm(now);
        true
    }

    /// Recompute elapsed time if a frame is due.
    pub fn tick(&mut self, now: Duration) -> Option<Duration> {
        if !self.ticker.poll(now) {
            return None;
        }
        self.refresh(now);
        Some(self.elapsed)
    }

    /// Stop and return the elapsed time at `now`.
    ///
    /// When not running this returns the last value without side effects.
    pub fn stop(&mut self, now: Duration) -> Duration {
        if self.is_running() {
            self.refresh(now);
            self.ticker.disarm();
        }
        self.elapsed
    }

    pub fn reset(&mut self) {
        self.ticker.disarm();
        self.started_at = None;
        self.elapsed = Duration::ZERO;
    }

    fn refresh(&mut self, now: Duration) {
        if let Some(start) = self.started_at {
            self.elapsed = now.saturating_sub(start);
        }
    }
}
