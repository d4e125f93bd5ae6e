//! Time conversion helpers and injectable time sources.
//!
//! The scheduler never reads the system clock directly. Every
//! [`RunService`](crate::run_service::RunService) and the
//! [`Driver`](crate::driver::Driver) ask a [`TimeSource`] for "now" and for
//! sleeping, so tests can drive frames deterministically with a
//! [`ManualClock`] while the engine uses a [`MonotonicClock`].
//!
//! Timestamps are [`Duration`]s measured from the time source's origin.
//! One tick is one nanosecond.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Ticks (nanoseconds) per second.
pub const TICKS_PER_SECOND: u64 = 1_000_000_000;

/// Errors that can occur during time conversions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// A seconds value was negative, NaN, or too large to represent.
    #[error("invalid seconds value: {value}")]
    InvalidSeconds {
        /// The offending value, formatted.
        value: String,
    },
}

/// Convert a tick count to seconds.
#[allow(clippy::cast_precision_loss)]
pub const fn ticks_to_seconds(ticks: u64) -> f64 {
    ticks as f64 / TICKS_PER_SECOND as f64
}

/// Convert a duration to a tick count, saturating at `u64::MAX`.
pub fn duration_to_ticks(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

/// Convert a duration to fractional seconds.
pub const fn duration_to_seconds(duration: Duration) -> f64 {
    duration.as_secs_f64()
}

/// Convert fractional seconds to a duration.
///
/// # Errors
///
/// Returns [`ClockError::InvalidSeconds`] for negative, NaN, or overflowing
/// input.
pub fn seconds_to_duration(seconds: f64) -> Result<Duration, ClockError> {
    Duration::try_from_secs_f64(seconds).map_err(|_err| ClockError::InvalidSeconds {
        value: seconds.to_string(),
    })
}

/// Minimum interval between pulses for a target frame rate.
///
/// An fps of 0 means uncapped and yields [`Duration::ZERO`].
pub const fn fps_to_interval(fps: u32) -> Duration {
    if fps == 0 {
        return Duration::ZERO;
    }
    match Duration::from_secs(1).checked_div(fps) {
        Some(interval) => interval,
        None => Duration::ZERO,
    }
}

/// A monotonic clock that can also pace the caller.
pub trait TimeSource: Send + Sync {
    /// Time elapsed since this source's origin.
    fn now(&self) -> Duration;

    /// Block the calling thread for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Real time, backed by [`Instant`] and [`std::thread::sleep`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Start a clock whose origin is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Hand-driven time for tests.
///
/// Clones share the same reading. [`TimeSource::sleep`] advances the
/// reading instead of blocking, so a paced loop runs instantly while still
/// seeing the time it would have waited.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    /// A clock reading zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the reading forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        let step = duration_to_ticks(duration);
        let _ = self
            .nanos
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                Some(n.saturating_add(step))
            });
    }

    /// Move the reading forward by `millis` milliseconds.
    pub fn advance_ms(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    /// Set the reading to an absolute value.
    pub fn set(&self, now: Duration) {
        self.nanos.store(duration_to_ticks(now), Ordering::Release);
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::Acquire))
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}
