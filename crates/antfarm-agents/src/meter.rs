//! Bounded integer counters with edge events.
//!
//! A [`ValueMeter`] clamps its value to `[min, max]` and exposes three
//! signals: value changed, max reached, min reached. Hunger, breeding
//! cooldown, generation, and time alive are all meters.
//!
//! # Firing order
//!
//! [`ValueMeter::set_value`] clamps, stores, fires `on_value_changed` with
//! the clamped value, then fires `on_max_value_reached` if the value equals
//! `max` (snapping back to `min` afterwards when auto-reset is on, without
//! firing anything for the snap), then fires `on_min_value_reached` if the
//! clamped value equals `min`.
//!
//! # Re-entrancy
//!
//! Handlers receive values, not the meter, so they cannot mutate it while
//! it is firing. Every mutation also returns [`MeterEdges`]; owners react
//! to those after the call returns and may mutate the meter again from
//! there, which re-runs the full firing sequence.

use crate::error::AgentError;
use crate::signal::EventSignal;

/// Which edges a single mutation crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeterEdges {
    /// The clamped value that was set (before any auto-reset snap).
    pub value: i64,
    /// The value equalled `max`.
    pub reached_max: bool,
    /// The value equalled `min`.
    pub reached_min: bool,
}

/// A clamped integer counter with change, max, and min events.
#[derive(Debug)]
pub struct ValueMeter {
    value: i64,
    min: i64,
    max: i64,
    auto_reset: bool,
    /// Fired with the new value on every mutation.
    pub on_value_changed: EventSignal<i64>,
    /// Fired when a mutation lands on `max`.
    pub on_max_value_reached: EventSignal<()>,
    /// Fired when a mutation lands on `min`.
    pub on_min_value_reached: EventSignal<()>,
}

impl ValueMeter {
    /// Create a meter starting at `min`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidArgument`] if `min > max`.
    pub fn new(min: i64, max: i64) -> Result<Self, AgentError> {
        if min > max {
            return Err(AgentError::InvalidArgument {
                reason: format!("meter min {min} exceeds max {max}"),
            });
        }
        Ok(Self {
            value: min,
            min,
            max,
            auto_reset: false,
            on_value_changed: EventSignal::new(),
            on_max_value_reached: EventSignal::new(),
            on_min_value_reached: EventSignal::new(),
        })
    }

    /// Enable or disable snapping back to `min` after reaching `max`.
    #[must_use]
    pub fn with_auto_reset(mut self, auto_reset: bool) -> Self {
        self.auto_reset = auto_reset;
        self
    }

    /// Current value.
    pub const fn value(&self) -> i64 {
        self.value
    }

    /// Lower bound.
    pub const fn min(&self) -> i64 {
        self.min
    }

    /// Upper bound.
    pub const fn max(&self) -> i64 {
        self.max
    }

    /// Whether the meter rewinds to `min` on reaching `max`.
    pub const fn auto_reset(&self) -> bool {
        self.auto_reset
    }

    /// `value / max`.
    ///
    /// Callers must guarantee `max > 0`: a zero `max` yields NaN or an
    /// infinity rather than an error.
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self) -> f64 {
        self.value as f64 / self.max as f64
    }

    /// Clamp `value` into range, store it, and fire events.
    pub fn set_value(&mut self, value: i64) -> MeterEdges {
        let clamped = value.clamp(self.min, self.max);
        self.value = clamped;
        self.on_value_changed.fire(&clamped);

        let reached_max = clamped == self.max;
        if reached_max {
            self.on_max_value_reached.fire(&());
            if self.auto_reset {
                self.value = self.min;
            }
        }

        let reached_min = clamped == self.min;
        if reached_min {
            self.on_min_value_reached.fire(&());
        }

        MeterEdges {
            value: clamped,
            reached_max,
            reached_min,
        }
    }

    /// Add `amount` to the value.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidArgument`] if `amount` is negative; the
    /// value is left untouched and no event fires.
    pub fn increment_by(&mut self, amount: i64) -> Result<MeterEdges, AgentError> {
        if amount < 0 {
            return Err(AgentError::InvalidArgument {
                reason: format!("meter increment must be non-negative, got {amount}"),
            });
        }
        Ok(self.set_value(self.value.saturating_add(amount)))
    }

    /// Subtract `amount` from the value.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::InvalidArgument`] if `amount` is negative; the
    /// value is left untouched and no event fires.
    pub fn decrement_by(&mut self, amount: i64) -> Result<MeterEdges, AgentError> {
        if amount < 0 {
            return Err(AgentError::InvalidArgument {
                reason: format!("meter decrement must be non-negative, got {amount}"),
            });
        }
        Ok(self.set_value(self.value.saturating_sub(amount)))
    }

    /// Set the value back to `min`, firing events as [`Self::set_value`] does.
    pub fn empty(&mut self) -> MeterEdges {
        self.set_value(self.min)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Attach recorders to all three signals, returning the shared log.
    fn record(meter: &mut ValueMeter) -> Arc<Mutex<Vec<String>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let changed = Arc::clone(&log);
        meter
            .on_value_changed
            .connect(move |v: &i64| changed.lock().unwrap().push(format!("changed:{v}")));
        let max = Arc::clone(&log);
        meter
            .on_max_value_reached
            .connect(move |_: &()| max.lock().unwrap().push("max".to_owned()));
        let min = Arc::clone(&log);
        meter
            .on_min_value_reached
            .connect(move |_: &()| min.lock().unwrap().push("min".to_owned()));
        log
    }

    #[test]
    fn clamps_to_range() {
        let mut meter = ValueMeter::new(0, 10).unwrap();
        meter.set_value(25);
        assert_eq!(meter.value(), 10);
        meter.set_value(-4);
        assert_eq!(meter.value(), 0);
    }

    #[test]
    fn increment_to_max_fires_once_and_auto_resets() {
        let mut meter = ValueMeter::new(0, 5).unwrap().with_auto_reset(true);
        let log = record(&mut meter);
        let edges = meter.increment_by(5).unwrap();
        assert!(edges.reached_max);
        assert!(!edges.reached_min);
        assert_eq!(meter.value(), 0);
        let log = log.lock().unwrap();
        assert_eq!(log.iter().filter(|e| *e == "max").count(), 1);
        // The snap back to min is silent.
        assert_eq!(*log, vec!["changed:5", "max"]);
    }

    #[test]
    fn without_auto_reset_value_stays_at_max() {
        let mut meter = ValueMeter::new(0, 3).unwrap();
        meter.increment_by(3).unwrap();
        assert_eq!(meter.value(), 3);
        assert_eq!(meter.ratio(), 1.0);
    }

    #[test]
    fn negative_steps_are_rejected_without_side_effects() {
        let mut meter = ValueMeter::new(0, 10).unwrap();
        meter.set_value(4);
        let log = record(&mut meter);
        assert!(matches!(
            meter.increment_by(-1),
            Err(AgentError::InvalidArgument { .. })
        ));
        assert!(matches!(
            meter.decrement_by(-1),
            Err(AgentError::InvalidArgument { .. })
        ));
        assert_eq!(meter.value(), 4);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn reaching_min_fires_min() {
        let mut meter = ValueMeter::new(0, 10).unwrap();
        meter.set_value(2);
        let log = record(&mut meter);
        let edges = meter.decrement_by(5).unwrap();
        assert!(edges.reached_min);
        assert_eq!(*log.lock().unwrap(), vec!["changed:0", "min"]);
    }

    #[test]
    fn owner_can_react_to_edges_by_mutating_again() {
        let mut meter = ValueMeter::new(0, 2).unwrap();
        let edges = meter.increment_by(2).unwrap();
        if edges.reached_max {
            let nested = meter.empty();
            assert!(nested.reached_min);
        }
        assert_eq!(meter.value(), 0);
    }

    #[test]
    fn ratio_is_value_over_max() {
        let mut meter = ValueMeter::new(0, 4).unwrap();
        meter.set_value(1);
        assert_eq!(meter.ratio(), 0.25);
    }

    #[test]
    fn zero_max_ratio_is_not_finite() {
        let meter = ValueMeter::new(0, 0).unwrap();
        assert!(!meter.ratio().is_finite());
    }

    #[test]
    fn inverted_bounds_rejected() {
        assert!(ValueMeter::new(5, 1).is_err());
    }
}
