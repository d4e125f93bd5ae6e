//! Error types for the antfarm-agents crate.
//!
//! All operations that can fail return typed errors rather than panicking.
//! Each variant is a precondition violation that aborts the offending
//! operation; the ecosystem validates before mutating so a failed call
//! leaves the grid and every entity link exactly as they were.

use antfarm_types::{EntityId, GridPos};
use antfarm_world::WorldError;

/// Errors that can occur during entity and meter operations.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    /// A caller-supplied argument is invalid (negative meter step, bad bounds).
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// Explanation of what is wrong with the argument.
        reason: String,
    },

    /// The entity has no assigned cell, or the requested cell does not exist.
    #[error("no cell found for entity {entity} (requested {pos:?})")]
    NoCellFound {
        /// The entity being operated on.
        entity: EntityId,
        /// The requested coordinate, when one was given.
        pos: Option<GridPos>,
    },

    /// No live entity has this id.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    /// The entity id counter overflowed.
    #[error("entity id space exhausted")]
    IdExhausted,

    /// Not enough empty cells to place the requested population.
    #[error("cannot place {requested} bugs: only {available} empty cells")]
    NotEnoughSpace {
        /// Bugs requested.
        requested: usize,
        /// Empty cells available.
        available: usize,
    },

    /// A grid or cell operation failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// Snapshot (de)serialization failed.
    #[error("snapshot codec error: {source}")]
    Snapshot {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
