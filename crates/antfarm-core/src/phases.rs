//! The three standard phases over an [`Ecosystem`]: movement, render, and
//! simulated lag.

use std::sync::Arc;
use std::time::Duration;

use antfarm_agents::Ecosystem;
use tracing::{debug, info, trace, warn};

use crate::clock::TimeSource;
use crate::config::PhaseConfig;
use crate::control::{SimulationControl, SuspendSwitch};
use crate::driver::Driver;
use crate::render::{RenderFrame, RenderSink};
use crate::run_service::RunService;
use crate::task::{Task, TaskControl};

/// Name of the movement phase.
pub const MOVEMENT: &str = "movement";
/// Name of the render phase.
pub const RENDER: &str = "render";
/// Name of the simulated-lag phase.
pub const LAG: &str = "lag";

/// Seconds between census log lines from [`census_log_task`].
pub const CENSUS_LOG_SECONDS: f64 = 5.0;

/// Advances every bug by one turn per pulse.
pub fn movement_phase(
    fps: u32,
    clock: Arc<dyn TimeSource>,
    switch: SuspendSwitch,
) -> RunService<Ecosystem> {
    RunService::new(MOVEMENT, fps, clock, |eco: &mut Ecosystem, dt| {
        let report = eco.step()?;
        trace!(
            frame = eco.frame(),
            dt,
            acted = report.acted,
            moved = report.moved,
            births = report.births,
            meals = report.meals,
            starvations = report.starvations,
            "movement pulse"
        );
        Ok(())
    })
    .with_global_suspend(switch)
}

/// Captures a frame per pulse and hands it to `sink`. Keeps running while
/// the simulation is paused.
pub fn render_phase(
    fps: u32,
    clock: Arc<dyn TimeSource>,
    switch: SuspendSwitch,
    mut sink: Box<dyn RenderSink>,
) -> RunService<Ecosystem> {
    RunService::new(RENDER, fps, clock, move |eco: &mut Ecosystem, _dt| {
        let frame = RenderFrame::capture(eco);
        debug!(
            frame = frame.census.frame,
            ants = frame.census.ants,
            doodlebugs = frame.census.doodlebugs,
            "frame captured"
        );
        sink.render(&frame)?;
        Ok(())
    })
    .with_global_suspend(switch)
    .with_runs_while_paused(true)
}

/// Blocks for `lag` per pulse, standing in for a slow host.
pub fn lag_phase(
    fps: u32,
    lag: Duration,
    clock: Arc<dyn TimeSource>,
    switch: SuspendSwitch,
) -> RunService<Ecosystem> {
    let sleeper = Arc::clone(&clock);
    RunService::new(LAG, fps, clock, move |_eco: &mut Ecosystem, _dt| {
        sleeper.sleep(lag);
        Ok(())
    })
    .with_global_suspend(switch)
}

/// Logs the census at info level, then sleeps `interval_seconds`.
pub fn census_log_task(interval_seconds: f64) -> Task<Ecosystem> {
    Task::new("census-log", move |ctl: &mut TaskControl, eco: &mut Ecosystem| {
        let census = eco.census();
        info!(
            frame = census.frame,
            ants = census.ants,
            doodlebugs = census.doodlebugs,
            births = census.births,
            eaten = census.meals,
            starved = census.starvations,
            "census"
        );
        if let Err(err) = ctl.suspend_for(interval_seconds) {
            warn!(task = ctl.name(), error = %err, "census log disabled");
            ctl.kill();
        }
    })
}

/// Build a driver with the standard phases in pulse order: movement,
/// render, then lag (only when `lag_ms` is non-zero). The movement phase
/// carries a [`census_log_task`] and the run ends when no bugs remain.
pub fn standard_driver(
    phases: &PhaseConfig,
    control: Arc<SimulationControl>,
    clock: Arc<dyn TimeSource>,
    sink: Box<dyn RenderSink>,
) -> Driver<Ecosystem> {
    let switch = control.suspend_switch();
    let mut movement = movement_phase(phases.movement_fps, Arc::clone(&clock), switch.clone());
    movement.post_step.push(census_log_task(CENSUS_LOG_SECONDS));
    let mut driver = Driver::new(control, Arc::clone(&clock), phases.target_fps)
        .with_phase(movement)
        .with_phase(render_phase(
            phases.render_fps,
            Arc::clone(&clock),
            switch.clone(),
            sink,
        ));
    if phases.lag_ms > 0 {
        driver = driver.with_phase(lag_phase(
            phases.lag_fps,
            Duration::from_millis(phases.lag_ms),
            clock,
            switch,
        ));
    }
    driver.with_end_condition(|eco: &Ecosystem| eco.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use antfarm_agents::EcosystemConfig;

    struct Nowhere;

    impl RenderSink for Nowhere {
        fn render(&mut self, _frame: &RenderFrame) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn lag_phase_is_optional() {
        let clock: Arc<dyn TimeSource> = Arc::new(ManualClock::new());
        let control = Arc::new(SimulationControl::unbounded());
        let mut config = PhaseConfig::default();
        let driver = standard_driver(
            &config,
            Arc::clone(&control),
            Arc::clone(&clock),
            Box::new(Nowhere),
        );
        let names: Vec<&str> = driver.phases().iter().map(RunService::name).collect();
        assert_eq!(names, vec![MOVEMENT, RENDER]);

        config.lag_ms = 5;
        let driver = standard_driver(&config, control, clock, Box::new(Nowhere));
        assert_eq!(driver.phases().len(), 3);
    }

    #[test]
    fn lag_phase_consumes_clock_time() {
        let clock = ManualClock::new();
        let mut phase = lag_phase(
            0,
            Duration::from_millis(30),
            Arc::new(clock.clone()),
            SuspendSwitch::new(),
        );
        let mut eco = Ecosystem::new(2, 2, EcosystemConfig::default(), 1).unwrap();
        let outcome = phase.pulse(&mut eco).unwrap();
        assert_eq!(outcome, crate::run_service::PulseOutcome::Stepped(Duration::from_millis(30)));
        assert_eq!(clock.now(), Duration::from_millis(30));
    }

    #[test]
    fn census_task_sleeps_between_lines() {
        let clock = ManualClock::new();
        let mut phase = movement_phase(0, Arc::new(clock.clone()), SuspendSwitch::new());
        phase.post_step.push(census_log_task(1.0));
        let mut eco = Ecosystem::new(3, 3, EcosystemConfig::default(), 1).unwrap();
        let runs = |phase: &RunService<Ecosystem>| {
            phase.post_step.tasks().next().unwrap().control().runs()
        };

        phase.pulse(&mut eco).unwrap();
        assert_eq!(runs(&phase), 1);
        clock.advance_ms(500);
        phase.pulse(&mut eco).unwrap();
        assert_eq!(runs(&phase), 1);
        // The sleep is measured from the first cycle after the callback.
        clock.advance_ms(1100);
        phase.pulse(&mut eco).unwrap();
        assert_eq!(runs(&phase), 2);
    }

    #[test]
    fn bad_interval_kills_the_census_task() {
        let clock = ManualClock::new();
        let mut phase = movement_phase(0, Arc::new(clock), SuspendSwitch::new());
        phase.post_step.push(census_log_task(-1.0));
        let mut eco = Ecosystem::new(2, 2, EcosystemConfig::default(), 1).unwrap();
        phase.pulse(&mut eco).unwrap();
        phase.pulse(&mut eco).unwrap();
        assert!(phase.post_step.is_empty());
    }

    #[test]
    fn movement_phase_advances_frames() {
        let clock = ManualClock::new();
        let mut phase = movement_phase(0, Arc::new(clock), SuspendSwitch::new());
        let mut eco = Ecosystem::new(3, 3, EcosystemConfig::default(), 1).unwrap();
        eco.populate(2, 0).unwrap();
        phase.pulse(&mut eco).unwrap();
        phase.pulse(&mut eco).unwrap();
        assert_eq!(eco.frame(), 2);
    }
}
