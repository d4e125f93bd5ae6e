//! The game loop.
//!
//! A [`Driver`] owns one [`RunService`] per phase and pulses them in order,
//! once per loop iteration, then sleeps whatever is left of the frame
//! budget. It runs on a single thread; phases never overlap.
//!
//! # Loop
//!
//! 1. Stop if the control says so, or a frame or wall-clock bound is hit.
//! 2. Unless globally suspended, pulse each phase that is not individually
//!    suspended. While paused, only phases that run while paused pulse.
//! 3. Stop if the end condition holds (extinction by default in the binary).
//! 4. Sleep `budget - spent`, never a negative amount.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::clock::{TimeSource, fps_to_interval};
use crate::control::{RunState, SimulationControl};
use crate::run_service::{PhaseError, PhaseStats, RunService};

/// Errors that end a run early.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// A phase step failed.
    #[error("phase '{phase}' failed: {source}")]
    Phase {
        /// Name of the failing phase.
        phase: String,
        /// The step error.
        source: PhaseError,
    },
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The control was set to stopped.
    Stopped,
    /// The configured frame limit was reached.
    MaxFrames,
    /// The configured wall-clock limit was reached.
    MaxRealTime,
    /// The end condition held.
    Extinction,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Stopped => "stopped",
            Self::MaxFrames => "max_frames",
            Self::MaxRealTime => "max_real_time",
            Self::Extinction => "extinction",
        };
        f.write_str(s)
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverSummary {
    /// Why the loop exited.
    pub end_reason: EndReason,
    /// Loop iterations completed.
    pub frames: u64,
    /// Clock time from start to exit.
    pub elapsed: Duration,
    /// Diagnostics per phase, in pulse order.
    pub phases: Vec<(String, PhaseStats)>,
}

type EndCondition<C> = Box<dyn FnMut(&C) -> bool + Send>;

/// The simulation driver.
pub struct Driver<C> {
    phases: Vec<RunService<C>>,
    control: Arc<SimulationControl>,
    clock: Arc<dyn TimeSource>,
    frame_budget: Duration,
    end_condition: Option<EndCondition<C>>,
    frames: u64,
}

impl<C> Driver<C> {
    /// A driver with no phases, pacing the loop at `target_fps` (0 = uncapped).
    pub fn new(control: Arc<SimulationControl>, clock: Arc<dyn TimeSource>, target_fps: u32) -> Self {
        Self {
            phases: Vec::new(),
            control,
            clock,
            frame_budget: fps_to_interval(target_fps),
            end_condition: None,
            frames: 0,
        }
    }

    /// Append a phase. Phases pulse in insertion order.
    #[must_use]
    pub fn with_phase(mut self, phase: RunService<C>) -> Self {
        self.phases.push(phase);
        self
    }

    /// End the run with [`EndReason::Extinction`] once `condition` holds
    /// after a frame.
    #[must_use]
    pub fn with_end_condition(mut self, condition: impl FnMut(&C) -> bool + Send + 'static) -> Self {
        self.end_condition = Some(Box::new(condition));
        self
    }

    /// Shared control handle.
    pub fn control(&self) -> Arc<SimulationControl> {
        Arc::clone(&self.control)
    }

    /// Phases in pulse order.
    pub fn phases(&self) -> &[RunService<C>] {
        &self.phases
    }

    /// Mutable access to a phase by name.
    pub fn phase_mut(&mut self, name: &str) -> Option<&mut RunService<C>> {
        self.phases.iter_mut().find(|p| p.name() == name)
    }

    /// Frames completed so far.
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Pulse every eligible phase once. Returns the time spent.
    pub fn run_frame(&mut self, ctx: &mut C) -> Result<Duration, DriverError> {
        let started = self.clock.now();
        if !self.control.is_globally_suspended() {
            let paused = self.control.state() == RunState::Paused;
            for phase in &mut self.phases {
                if phase.is_suspended() || (paused && !phase.runs_while_paused()) {
                    continue;
                }
                phase.pulse(ctx).map_err(|source| DriverError::Phase {
                    phase: phase.name().to_owned(),
                    source,
                })?;
            }
        }
        self.frames = self.frames.saturating_add(1);
        Ok(self.clock.now().saturating_sub(started))
    }

    /// Run until stopped, bounded, or the end condition holds.
    pub fn run(&mut self, ctx: &mut C) -> Result<DriverSummary, DriverError> {
        let started = self.clock.now();
        let max_real_time = Duration::from_secs(self.control.max_real_time_seconds());
        info!(
            phases = self.phases.len(),
            frame_budget = ?self.frame_budget,
            max_frames = self.control.max_frames(),
            max_real_time_seconds = self.control.max_real_time_seconds(),
            started_at = %self.control.started_at(),
            "driver starting"
        );

        let end_reason = loop {
            if !self.control.is_runnable() {
                break EndReason::Stopped;
            }
            if self.control.frame_limit_reached(self.frames) {
                break EndReason::MaxFrames;
            }
            if !max_real_time.is_zero()
                && self.clock.now().saturating_sub(started) >= max_real_time
            {
                break EndReason::MaxRealTime;
            }

            let spent = self.run_frame(ctx)?;

            if let Some(condition) = self.end_condition.as_mut()
                && condition(ctx)
            {
                break EndReason::Extinction;
            }

            let remaining = self.frame_budget.saturating_sub(spent);
            if !remaining.is_zero() {
                self.clock.sleep(remaining);
            }
        };

        let summary = DriverSummary {
            end_reason,
            frames: self.frames,
            elapsed: self.clock.now().saturating_sub(started),
            phases: self
                .phases
                .iter()
                .map(|p| (p.name().to_owned(), p.stats()))
                .collect(),
        };
        for (name, stats) in &summary.phases {
            debug!(
                phase = %name,
                steps = stats.steps,
                skipped = stats.skipped,
                tasks_dropped = stats.tasks_dropped,
                "phase totals"
            );
        }
        info!(
            reason = %summary.end_reason,
            frames = summary.frames,
            elapsed = ?summary.elapsed,
            "driver finished"
        );
        Ok(summary)
    }
}

impl<C> fmt::Debug for Driver<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("phases", &self.phases)
            .field("frame_budget", &self.frame_budget)
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::SimulationBoundsConfig;

    #[derive(Debug, Default)]
    struct Counts {
        fast: u32,
        slow: u32,
        ui: u32,
    }

    fn driver(clock: &ManualClock, bounds: &SimulationBoundsConfig) -> Driver<Counts> {
        let control = Arc::new(SimulationControl::new(bounds));
        let time: Arc<dyn TimeSource> = Arc::new(clock.clone());
        let switch = control.suspend_switch();
        Driver::new(control, Arc::clone(&time), 100)
            .with_phase(
                RunService::new("fast", 0, Arc::clone(&time), |c: &mut Counts, _| {
                    c.fast += 1;
                    Ok(())
                })
                .with_global_suspend(switch.clone()),
            )
            .with_phase(
                RunService::new("slow", 10, Arc::clone(&time), |c: &mut Counts, _| {
                    c.slow += 1;
                    Ok(())
                })
                .with_global_suspend(switch.clone()),
            )
            .with_phase(
                RunService::new("ui", 0, time, |c: &mut Counts, _| {
                    c.ui += 1;
                    Ok(())
                })
                .with_global_suspend(switch)
                .with_runs_while_paused(true),
            )
    }

    fn frames(n: u64) -> SimulationBoundsConfig {
        SimulationBoundsConfig {
            max_frames: n,
            max_real_time_seconds: 0,
        }
    }

    #[test]
    fn frame_limit_and_pacing() {
        let clock = ManualClock::new();
        let mut driver = driver(&clock, &frames(20));
        let mut counts = Counts::default();
        let summary = driver.run(&mut counts).unwrap();

        assert_eq!(summary.end_reason, EndReason::MaxFrames);
        assert_eq!(summary.frames, 20);
        assert_eq!(summary.elapsed, Duration::from_millis(200));
        assert_eq!(counts.fast, 20);
        assert_eq!(counts.slow, 2);
        assert_eq!(summary.phases.len(), 3);
    }

    #[test]
    fn paused_runs_only_paused_phases() {
        let clock = ManualClock::new();
        let mut driver = driver(&clock, &frames(0));
        driver.control().pause();
        let mut counts = Counts::default();
        for _ in 0..3 {
            driver.run_frame(&mut counts).unwrap();
        }
        assert_eq!((counts.fast, counts.slow, counts.ui), (0, 0, 3));
    }

    #[test]
    fn global_suspend_holds_everything() {
        let clock = ManualClock::new();
        let mut driver = driver(&clock, &frames(0));
        driver.control().suspend_switch().engage();
        let mut counts = Counts::default();
        driver.run_frame(&mut counts).unwrap();
        assert_eq!((counts.fast, counts.slow, counts.ui), (0, 0, 0));
        assert_eq!(driver.frames(), 1);
    }

    #[test]
    fn individually_suspended_phase_is_skipped() {
        let clock = ManualClock::new();
        let mut driver = driver(&clock, &frames(0));
        driver.phase_mut("fast").unwrap().suspend();
        let mut counts = Counts::default();
        driver.run_frame(&mut counts).unwrap();
        assert_eq!((counts.fast, counts.slow, counts.ui), (0, 1, 1));
    }

    #[test]
    fn stopped_control_exits_immediately() {
        let clock = ManualClock::new();
        let mut driver = driver(&clock, &frames(0));
        driver.control().request_stop();
        let summary = driver.run(&mut Counts::default()).unwrap();
        assert_eq!(summary.end_reason, EndReason::Stopped);
        assert_eq!(summary.frames, 0);
    }

    #[test]
    fn end_condition_stops_the_run() {
        let clock = ManualClock::new();
        let mut driver = driver(&clock, &frames(0)).with_end_condition(|c: &Counts| c.fast >= 5);
        let summary = driver.run(&mut Counts::default()).unwrap();
        assert_eq!(summary.end_reason, EndReason::Extinction);
        assert_eq!(summary.frames, 5);
    }

    #[test]
    fn wall_clock_limit() {
        let clock = ManualClock::new();
        let bounds = SimulationBoundsConfig {
            max_frames: 0,
            max_real_time_seconds: 1,
        };
        let mut driver = driver(&clock, &bounds);
        let summary = driver.run(&mut Counts::default()).unwrap();
        assert_eq!(summary.end_reason, EndReason::MaxRealTime);
        assert_eq!(summary.frames, 100);
    }

    #[test]
    fn slow_frames_do_not_sleep() {
        let clock = ManualClock::new();
        let inner = clock.clone();
        let control = Arc::new(SimulationControl::new(&frames(3)));
        let time: Arc<dyn TimeSource> = Arc::new(clock.clone());
        let mut driver: Driver<Counts> = Driver::new(control, Arc::clone(&time), 100).with_phase(
            RunService::new("heavy", 0, time, move |_, _| {
                inner.advance_ms(25);
                Ok(())
            }),
        );
        let summary = driver.run(&mut Counts::default()).unwrap();
        assert_eq!(summary.elapsed, Duration::from_millis(75));
    }

    #[test]
    fn phase_errors_name_the_phase() {
        let clock = ManualClock::new();
        let control = Arc::new(SimulationControl::unbounded());
        let time: Arc<dyn TimeSource> = Arc::new(clock);
        let mut driver: Driver<Counts> = Driver::new(control, Arc::clone(&time), 0).with_phase(
            RunService::new("doomed", 0, time, |_, _| {
                Err(antfarm_agents::AgentError::IdExhausted.into())
            }),
        );
        let err = driver.run(&mut Counts::default()).unwrap_err();
        assert!(err.to_string().starts_with("phase 'doomed' failed"));
    }
}
