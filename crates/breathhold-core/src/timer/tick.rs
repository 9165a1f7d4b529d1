//! Repeating tick sources.
//!
//! Nothing here owns a thread. A tick source is armed with the current
//! monotonic reading and then polled by its owner whenever the host calls
//! `tick()`; `poll` reports whether a tick is due. Once disarmed, `poll`
//! always returns `false`, which is what makes cancellation synchronous.
//!
//! Two implementations:
//! - [`IntervalTicker`]: coarse fixed-interval tick (10 Hz by default) used
//!   for breathing guidance. Missed ticks are coalesced, not replayed, like
//!   a run-loop timer that was not serviced while suspended.
//! - [`FrameTicker`]: display-refresh tick (~60 Hz) used for hold
//!   measurement. Fires at most once per frame period.

use std::time::Duration;

/// Default breathing guidance resolution.
pub const BREATHING_TICK: Duration = Duration::from_millis(100);

/// Default frame period (~60 Hz).
pub const FRAME_TICK: Duration = Duration::from_micros(16_667);

pub trait TickSource {
    fn interval(&self) -> Duration;

    /// Arm the source. The first tick becomes due one interval after `now`.
    fn arm(&mut self, now: Duration);

    fn disarm(&mut self);

    fn is_armed(&self) -> bool;

    /// Returns `true` if a tick is due at `now`, consuming it.
    fn poll(&mut self, now: Duration) -> bool;
}

#[derive(Debug, Clone)]
pub struct IntervalTicker {
    interval: Duration,
    next_due: Option<Duration>,
}

impl IntervalTicker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            next_due: None,
        }
    }
}

impl Default for IntervalTicker {
    fn default() -> Self {
        Self::new(BREATHING_TICK)
    }
}

impl TickSource for IntervalTicker {
    fn interval(&self) -> Duration {
        self.interval
    }

    fn arm(&mut self, now: Duration) {
        self.next_due = Some(now + self.interval);
    }

    fn disarm(&mut self) {
        self.next_due = None;
    }

    fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    fn poll(&mut self, now: Duration) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };
        if now < due {
            return false;
        }
        // Skip to the next boundary after `now`; missed ticks are dropped.
        let missed = (now - due).as_nanos() / self.interval.as_nanos();
        let steps = u32::try_from(missed + 1).unwrap_or(u32::MAX);
        self.next_due = Some(due + self.interval * steps);
        true
    }
}

#[derive(Debug, Clone)]
pub struct FrameTicker {
    period: Duration,
    last_frame: Option<Duration>,
}

impl FrameTicker {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            last_frame: None,
        }
    }
}

impl Default for FrameTicker {
    fn default() -> Self {
        Self::new(FRAME_TICK)
    }
}

impl TickSource for FrameTicker {
    fn interval(&self) -> Duration {
        self.period
    }

    fn arm(&mut self, now: Duration) {
        self.last_frame = Some(now);
    }

    fn disarm(&mut self) {
        self.last_frame = None;
    }

    fn is_armed(&self) -> bool {
        self.last_frame.is_some()
    }

    fn poll(&mut self, now: Duration) -> bool {
        match self.last_frame {
            Some(last) if now.saturating_sub(last) >= self.period => {
                self.last_frame = Some(now);
                true
            }
            _ => false,
        }
    }
}
