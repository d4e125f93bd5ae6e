//! Run-state control shared between the loop thread and its owner.
//!
//! The loop thread polls this state between frames; any other thread may
//! pause, resume, stop, or globally suspend the simulation without locks.
//! Cancellation is cooperative: a stop request takes effect at the next
//! loop check and never preempts a step in flight.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::SimulationBoundsConfig;

/// Lifecycle of the simulation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// All phases pulse.
    Running,
    /// The loop stays alive; only phases that run while paused pulse.
    Paused,
    /// The loop exits at its next check.
    Stopped,
}

impl RunState {
    const fn to_raw(self) -> u8 {
        match self {
            Self::Running => 0,
            Self::Paused => 1,
            Self::Stopped => 2,
        }
    }

    const fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Running,
            1 => Self::Paused,
            _ => Self::Stopped,
        }
    }
}

/// A clonable handle to the global master suspend flag.
///
/// Every [`RunService`](crate::run_service::RunService) built with the same
/// switch is gated by it, independent of its own suspend state.
#[derive(Debug, Clone, Default)]
pub struct SuspendSwitch(Arc<AtomicBool>);

impl SuspendSwitch {
    /// A switch that starts released.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every gated phase.
    pub fn engage(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Release every gated phase.
    pub fn release(&self) {
        self.0.store(false, Ordering::Release);
    }

    /// Whether the switch is held.
    pub fn is_engaged(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Shared simulation control.
///
/// Wrapped in [`Arc`] and shared between the loop thread and whoever drives
/// it (the binary's signal handler, tests).
#[derive(Debug)]
pub struct SimulationControl {
    /// Encoded [`RunState`].
    state: AtomicU8,

    /// Global suspend flag handed to every phase.
    suspend: SuspendSwitch,

    /// Wall-clock time when the control was created.
    started_at: DateTime<Utc>,

    /// Maximum loop iterations (0 = unlimited).
    max_frames: u64,

    /// Maximum wall-clock seconds (0 = unlimited).
    max_real_time_seconds: u64,
}

impl SimulationControl {
    /// Create control state in [`RunState::Running`] with the given bounds.
    pub fn new(bounds: &SimulationBoundsConfig) -> Self {
        Self {
            state: AtomicU8::new(RunState::Running.to_raw()),
            suspend: SuspendSwitch::new(),
            started_at: Utc::now(),
            max_frames: bounds.max_frames,
            max_real_time_seconds: bounds.max_real_time_seconds,
        }
    }

    /// Control with no bounds.
    pub fn unbounded() -> Self {
        Self::new(&SimulationBoundsConfig::default())
    }

    /// Current run state.
    pub fn state(&self) -> RunState {
        RunState::from_raw(self.state.load(Ordering::Acquire))
    }

    /// Whether the loop should keep iterating.
    pub fn is_runnable(&self) -> bool {
        self.state() != RunState::Stopped
    }

    /// Pause a running simulation. Returns `false` if it was not running.
    pub fn pause(&self) -> bool {
        let changed = self.transition(RunState::Running, RunState::Paused);
        if changed {
            info!("simulation paused");
        }
        changed
    }

    /// Resume a paused simulation. Returns `false` if it was not paused.
    pub fn resume(&self) -> bool {
        let changed = self.transition(RunState::Paused, RunState::Running);
        if changed {
            info!("simulation resumed");
        }
        changed
    }

    /// Request a stop. Idempotent.
    pub fn request_stop(&self) {
        let previous = self
            .state
            .swap(RunState::Stopped.to_raw(), Ordering::AcqRel);
        if RunState::from_raw(previous) != RunState::Stopped {
            info!("simulation stop requested");
        }
    }

    fn transition(&self, from: RunState, to: RunState) -> bool {
        self.state
            .compare_exchange(from.to_raw(), to.to_raw(), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Handle to the global suspend flag.
    pub fn suspend_switch(&self) -> SuspendSwitch {
        self.suspend.clone()
    }

    /// Whether the global suspend flag is held.
    pub fn is_globally_suspended(&self) -> bool {
        self.suspend.is_engaged()
    }

    /// Wall-clock start time.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Configured frame limit (0 = unlimited).
    pub const fn max_frames(&self) -> u64 {
        self.max_frames
    }

    /// Configured wall-clock limit in seconds (0 = unlimited).
    pub const fn max_real_time_seconds(&self) -> u64 {
        self.max_real_time_seconds
    }

    /// Whether `frames` iterations reach the frame limit.
    pub const fn frame_limit_reached(&self, frames: u64) -> bool {
        self.max_frames > 0 && frames >= self.max_frames
    }
}
