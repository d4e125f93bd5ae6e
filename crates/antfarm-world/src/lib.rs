//! Geography of the Antfarm simulation: a fixed-size grid of cells.
//!
//! This crate models the physical board: a dense 2-D array of owned
//! [`Cell`]s, each holding at most one occupant id, plus a memoized table
//! of out-of-bounds sentinel cells so that neighbour queries at the edge
//! of the board stay uniform.
//!
//! # Modules
//!
//! - [`cell`] -- A single grid position with occupancy tracking.
//! - [`error`] -- Error types for grid and occupancy operations.
//! - [`grid`] -- [`CellGrid`]: bounds checks, sentinel cache, adjacency,
//!   direction tie-break, and random available-cell selection.

pub mod cell;
pub mod error;
pub mod grid;

// Re-export primary types at crate root.
pub use cell::Cell;
pub use error::WorldError;
pub use grid::{CellGrid, direction_relative_to, random_available_cell};
