//! Rate-limited phase runner.
//!
//! A [`RunService`] wraps one phase's step function and throttles it to a
//! target frame rate. Each successful pulse runs its pre-step tasks, the
//! step itself, then its post-step tasks, and records timing diagnostics.
//!
//! # Suspension
//!
//! Two independent layers gate a pulse: the instance's own
//! [`suspend`](RunService::suspend) state and a shared [`SuspendSwitch`]
//! that holds every service built with it.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use antfarm_agents::AgentError;

use crate::clock::{TimeSource, duration_to_seconds, fps_to_interval};
use crate::control::SuspendSwitch;
use crate::task::{TaskCycle, TaskQueue};

/// Slack allowed when comparing a pulse delta to the minimum interval.
pub const PULSE_TOLERANCE: Duration = Duration::from_millis(1);

/// Errors a phase step can raise.
#[derive(Debug, thiserror::Error)]
pub enum PhaseError {
    /// The step violated an entity or grid precondition.
    #[error("simulation step failed: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },

    /// A render sink failed to write.
    #[error("render failed: {source}")]
    Render {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

/// Result of one [`RunService::pulse`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseOutcome {
    /// Too soon since the last pulse. Nothing ran.
    Skipped,
    /// The instance or the global switch is suspended. Nothing ran.
    Suspended,
    /// The step ran and took this long.
    Stepped(Duration),
}

impl PulseOutcome {
    /// Whether the step ran.
    pub const fn stepped(self) -> bool {
        matches!(self, Self::Stepped(_))
    }
}

/// A phase step: receives the context and the delta in seconds.
pub type StepFn<C> = Box<dyn FnMut(&mut C, f64) -> Result<(), PhaseError> + Send>;

/// Timing diagnostics for one phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhaseStats {
    /// Clock reading when the last step started.
    pub last_step_started: Option<Duration>,
    /// Wall-clock duration of the last step.
    pub last_step_duration: Duration,
    /// Steps completed.
    pub steps: u64,
    /// Pulses that were skipped for rate limiting.
    pub skipped: u64,
    /// Task callbacks run across both queues.
    pub tasks_executed: u64,
    /// Tasks removed from either queue.
    pub tasks_dropped: u64,
}

impl PhaseStats {
    fn absorb(&mut self, cycle: TaskCycle) {
        let executed = u64::try_from(cycle.executed).unwrap_or(u64::MAX);
        let dropped = u64::try_from(cycle.dropped).unwrap_or(u64::MAX);
        self.tasks_executed = self.tasks_executed.saturating_add(executed);
        self.tasks_dropped = self.tasks_dropped.saturating_add(dropped);
    }
}

/// A throttled, suspendable phase.
pub struct RunService<C> {
    name: String,
    min_interval: Duration,
    clock: Arc<dyn TimeSource>,
    global: SuspendSwitch,
    suspended: bool,
    runs_while_paused: bool,
    last_pulse: Option<Duration>,
    stats: PhaseStats,
    step: StepFn<C>,
    /// Tasks run before each step.
    pub pre_step: TaskQueue<C>,
    /// Tasks run after each step.
    pub post_step: TaskQueue<C>,
}

impl<C> RunService<C> {
    /// Create a phase paced at `fps` (0 = uncapped).
    pub fn new(
        name: impl Into<String>,
        fps: u32,
        clock: Arc<dyn TimeSource>,
        step: impl FnMut(&mut C, f64) -> Result<(), PhaseError> + Send + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            min_interval: fps_to_interval(fps),
            clock,
            global: SuspendSwitch::new(),
            suspended: false,
            runs_while_paused: false,
            last_pulse: None,
            stats: PhaseStats::default(),
            step: Box::new(step),
            pre_step: TaskQueue::new(),
            post_step: TaskQueue::new(),
        }
    }

    /// Gate this phase with a shared suspend switch.
    #[must_use]
    pub fn with_global_suspend(mut self, switch: SuspendSwitch) -> Self {
        self.global = switch;
        self
    }

    /// Keep pulsing while the simulation is paused.
    #[must_use]
    pub fn with_runs_while_paused(mut self, runs: bool) -> Self {
        self.runs_while_paused = runs;
        self
    }

    /// Phase name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Minimum interval between steps.
    pub const fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Change the target rate (0 = uncapped).
    pub const fn set_fps(&mut self, fps: u32) {
        self.min_interval = fps_to_interval(fps);
    }

    /// Whether this phase keeps pulsing while the simulation is paused.
    pub const fn runs_while_paused(&self) -> bool {
        self.runs_while_paused
    }

    /// Hold this phase.
    pub const fn suspend(&mut self) {
        self.suspended = true;
    }

    /// Release this phase.
    pub const fn resume(&mut self) {
        self.suspended = false;
    }

    /// Whether this phase is individually suspended.
    pub const fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Timing diagnostics.
    pub const fn stats(&self) -> PhaseStats {
        self.stats
    }

    /// Attempt one step.
    ///
    /// Returns [`PulseOutcome::Suspended`] if either suspend layer is held
    /// and [`PulseOutcome::Skipped`] if less than the minimum interval
    /// (minus [`PULSE_TOLERANCE`]) has passed since the last step. The
    /// first step always runs and sees a zero delta.
    pub fn pulse(&mut self, ctx: &mut C) -> Result<PulseOutcome, PhaseError> {
        if self.suspended || self.global.is_engaged() {
            return Ok(PulseOutcome::Suspended);
        }

        let now = self.clock.now();
        let delta = match self.last_pulse {
            None => Duration::ZERO,
            Some(last) => {
                let delta = now.saturating_sub(last);
                if delta.saturating_add(PULSE_TOLERANCE) < self.min_interval {
                    self.stats.skipped = self.stats.skipped.saturating_add(1);
                    return Ok(PulseOutcome::Skipped);
                }
                delta
            }
        };
        self.last_pulse = Some(now);

        let pre = self.pre_step.execute(now, delta, ctx);
        self.stats.absorb(pre);

        let started = self.clock.now();
        self.stats.last_step_started = Some(started);
        (self.step)(ctx, duration_to_seconds(delta))?;
        let finished = self.clock.now();
        let took = finished.saturating_sub(started);

        let post = self.post_step.execute(finished, delta, ctx);
        self.stats.absorb(post);

        self.stats.last_step_duration = took;
        self.stats.steps = self.stats.steps.saturating_add(1);
        Ok(PulseOutcome::Stepped(took))
    }
}

impl<C> fmt::Debug for RunService<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunService")
            .field("name", &self.name)
            .field("min_interval", &self.min_interval)
            .field("suspended", &self.suspended)
            .field("runs_while_paused", &self.runs_while_paused)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
