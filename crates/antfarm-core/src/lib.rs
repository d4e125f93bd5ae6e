//! Scheduler, phase runner, and game loop for the Antfarm simulation.
//!
//! This crate drives an [`Ecosystem`](antfarm_agents::Ecosystem) through
//! time. It never touches the terminal or the filesystem beyond reading its
//! configuration; rendering goes through the [`RenderSink`] trait.
//!
//! # Modules
//!
//! - [`clock`] -- Time conversions and injectable [`TimeSource`]s.
//! - [`config`] -- YAML configuration ([`SimulationConfig`]).
//! - [`control`] -- Shared run state and the global suspend switch.
//! - [`driver`] -- The [`Driver`] game loop.
//! - [`phases`] -- Movement, render, and lag phases over an ecosystem.
//! - [`render`] -- Read-only frames and the [`RenderSink`] trait.
//! - [`run_service`] -- Rate-limited phase runner ([`RunService`]).
//! - [`task`] -- Pre/post-step tasks ([`Task`], [`TaskQueue`]).

pub mod clock;
pub mod config;
pub mod control;
pub mod driver;
pub mod phases;
pub mod render;
pub mod run_service;
pub mod task;

// Re-export primary types at crate root for convenience.
pub use clock::{ClockError, ManualClock, MonotonicClock, TimeSource};
pub use config::{ConfigError, SimulationConfig};
pub use control::{RunState, SimulationControl, SuspendSwitch};
pub use driver::{Driver, DriverError, DriverSummary, EndReason};
pub use phases::standard_driver;
pub use render::{RenderFrame, RenderSink};
pub use run_service::{PhaseError, PhaseStats, PulseOutcome, RunService};
pub use task::{Task, TaskControl, TaskError, TaskQueue};
