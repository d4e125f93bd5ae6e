//! End-to-end driver runs over a real ecosystem with a hand-driven clock.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use antfarm_agents::{Census, Ecosystem, EcosystemConfig};
use antfarm_core::config::{PhaseConfig, SimulationBoundsConfig};
use antfarm_core::phases::{MOVEMENT, RENDER};
use antfarm_core::{
    EndReason, ManualClock, RenderFrame, RenderSink, SimulationControl, TimeSource,
    standard_driver,
};

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<Census>>>);

impl RenderSink for Recorder {
    fn render(&mut self, frame: &RenderFrame) -> std::io::Result<()> {
        self.0.lock().unwrap().push(frame.census);
        Ok(())
    }
}

fn control(max_frames: u64) -> Arc<SimulationControl> {
    Arc::new(SimulationControl::new(&SimulationBoundsConfig {
        max_frames,
        max_real_time_seconds: 0,
    }))
}

fn phases(movement_fps: u32, render_fps: u32, target_fps: u32) -> PhaseConfig {
    PhaseConfig {
        movement_fps,
        render_fps,
        lag_fps: 0,
        lag_ms: 0,
        target_fps,
    }
}

fn steps(driver: &antfarm_core::Driver<Ecosystem>, name: &str) -> u64 {
    driver
        .phases()
        .iter()
        .find(|p| p.name() == name)
        .map(|p| p.stats().steps)
        .unwrap()
}

#[test]
fn phases_run_at_their_own_rates() {
    let clock = ManualClock::new();
    let time: Arc<dyn TimeSource> = Arc::new(clock.clone());
    let recorder = Recorder::default();
    let mut driver = standard_driver(
        &phases(5, 20, 100),
        control(100),
        time,
        Box::new(recorder.clone()),
    );
    let mut eco = Ecosystem::new(10, 10, EcosystemConfig::default(), 3).unwrap();
    eco.populate(20, 2).unwrap();

    let summary = driver.run(&mut eco).unwrap();

    assert_eq!(summary.end_reason, EndReason::MaxFrames);
    assert_eq!(summary.frames, 100);
    assert_eq!(clock.now(), Duration::from_secs(1));
    // 10ms frames: movement every 200ms, render every 50ms, both from t=0.
    assert_eq!(steps(&driver, MOVEMENT), 5);
    assert_eq!(steps(&driver, RENDER), 20);
    assert_eq!(eco.frame(), 5);
    assert_eq!(recorder.0.lock().unwrap().len(), 20);
}

#[test]
fn paused_simulation_renders_but_does_not_move() {
    let clock = ManualClock::new();
    let recorder = Recorder::default();
    let control = control(30);
    control.pause();
    let mut driver = standard_driver(
        &phases(0, 0, 60),
        Arc::clone(&control),
        Arc::new(clock),
        Box::new(recorder.clone()),
    );
    let mut eco = Ecosystem::new(6, 6, EcosystemConfig::default(), 11).unwrap();
    eco.populate(5, 1).unwrap();
    let before = eco.views();

    let summary = driver.run(&mut eco).unwrap();

    assert_eq!(summary.frames, 30);
    assert_eq!(eco.frame(), 0);
    assert_eq!(eco.views(), before);
    assert_eq!(recorder.0.lock().unwrap().len(), 30);
}

#[test]
fn run_ends_on_extinction() {
    let clock = ManualClock::new();
    let mut driver = standard_driver(
        &phases(0, 0, 0),
        control(1000),
        Arc::new(clock),
        Box::new(Recorder::default()),
    );
    let mut eco = Ecosystem::new(5, 5, EcosystemConfig::default(), 5).unwrap();
    eco.populate(0, 4).unwrap();

    let summary = driver.run(&mut eco).unwrap();

    assert_eq!(summary.end_reason, EndReason::Extinction);
    assert_eq!(summary.frames, 3);
    assert_eq!(eco.census().starvations, 4);
}

#[test]
fn stop_from_another_thread() {
    let clock = ManualClock::new();
    let control = control(0);
    let mut driver = standard_driver(
        &phases(0, 0, 0),
        Arc::clone(&control),
        Arc::new(clock),
        Box::new(Recorder::default()),
    );
    let mut eco = Ecosystem::new(8, 8, EcosystemConfig::default(), 2).unwrap();
    eco.populate(10, 0).unwrap();

    let handle = std::thread::spawn(move || {
        let summary = driver.run(&mut eco).unwrap();
        (summary, eco)
    });
    control.request_stop();
    let (summary, eco) = handle.join().unwrap();

    assert_eq!(summary.end_reason, EndReason::Stopped);
    assert_eq!(eco.frame(), summary.frames);
}
