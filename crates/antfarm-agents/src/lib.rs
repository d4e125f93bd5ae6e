//! Bug state, meters, signals, and species behaviour for the Antfarm
//! simulation.
//!
//! This crate contains the logic layer for entities: everything that
//! operates on bug state and grid occupancy without touching I/O or time.
//! It sits between `antfarm-world` (the grid) and `antfarm-core` (the
//! scheduler and game loop).
//!
//! # Modules
//!
//! - [`behaviour`] -- Ant and doodlebug turn logic.
//! - [`bug`] -- The [`Bug`] entity with its meters and cell back-reference.
//! - [`config`] -- Per-species tunables ([`EcosystemConfig`]).
//! - [`ecosystem`] -- The simulation context ([`Ecosystem`]) owning grid
//!   and entities and enforcing the bug/cell link invariant.
//! - [`error`] -- Error types for all entity operations ([`AgentError`]).
//! - [`meter`] -- Clamped counters with edge events ([`ValueMeter`]).
//! - [`signal`] -- Ordered synchronous notification ([`EventSignal`]).
//! - [`snapshot`] -- Serializable population snapshots ([`Snapshot`]).
//! - [`species`] -- Fixed per-species traits.

pub mod behaviour;
pub mod bug;
pub mod config;
pub mod ecosystem;
pub mod error;
pub mod meter;
pub mod signal;
pub mod snapshot;
pub mod species;

// Re-export primary types at crate root for convenience.
pub use bug::Bug;
pub use config::{EcosystemConfig, SpeciesConfig};
pub use ecosystem::{
    Activity, BirthEvent, BugView, Census, DeathCause, DeathEvent, Ecosystem, StepReport,
};
pub use error::AgentError;
pub use meter::{MeterEdges, ValueMeter};
pub use signal::{EventSignal, SubscriptionId};
pub use snapshot::{BugRecord, Snapshot};
