//! Shared type definitions for the Antfarm simulation.
//!
//! This crate is the single source of truth for the small vocabulary types
//! used across the workspace: identifiers, grid coordinates, species and
//! direction enumerations, and the vector math used for facing/direction
//! computation.
//!
//! # Modules
//!
//! - [`ids`] -- Numeric identifier newtypes for entities and grids
//! - [`enums`] -- Species, direction, cell classification, task state
//! - [`position`] -- Integer grid coordinates
//! - [`vector`] -- N-dimensional float vectors with checked arithmetic

pub mod enums;
pub mod ids;
pub mod position;
pub mod vector;

// Re-export all public types at crate root for convenience.
pub use enums::{Boundary, Direction, Species, TaskState, Vacancy};
pub use ids::{EntityId, GridId};
pub use position::GridPos;
pub use vector::{VecN, VectorError};
