#![forbid(unsafe_code)]

//! Monotonic time for tour timers.
//!
//! The controller never reads wall-clock time directly; all time flows
//! through [`TourClock`]. Hosts with a real event loop use [`SystemClock`],
//! tests and frame-driven hosts advance a [`ManualClock`] explicitly.

use core::time::Duration;

/// Monotonic clock abstraction.
pub trait TourClock {
    /// Elapsed time since an unspecified epoch, monotonically increasing.
    fn now_mono(&self) -> Duration;
}

/// Real monotonic time (`performance.now()` on wasm).
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: web_time::Instant,
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: web_time::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TourClock for SystemClock {
    fn now_mono(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: Duration,
}

impl ManualClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Set current monotonic time. Moving backwards is ignored.
    pub fn set(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

impl TourClock for ManualClock {
    fn now_mono(&self) -> Duration {
        self.now
    }
}
