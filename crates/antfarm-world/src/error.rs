//! Error types for the `antfarm-world` crate.
//!
//! All fallible operations in this crate return [`WorldError`]. Every
//! variant is a precondition violation: the grid never retries or silently
//! corrects them, and no variant is returned after a partial mutation.

use antfarm_types::{EntityId, GridPos, VectorError};

/// Errors that can occur during grid and cell operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// The target cell already holds an occupant.
    #[error("cell {pos} is already occupied by entity {occupant}")]
    CellOccupied {
        /// The contested cell.
        pos: GridPos,
        /// The entity currently holding it.
        occupant: EntityId,
    },

    /// Tried to remove the occupant of an empty cell.
    #[error("cell {pos} has no occupant")]
    NoOccupant {
        /// The empty cell.
        pos: GridPos,
    },

    /// An in-bounds coordinate has no live cell (it was destroyed).
    #[error("no cell at {0}")]
    CellMissing(GridPos),

    /// The coordinate lies outside the grid where an in-bounds one is required.
    #[error("coordinate {0} is out of bounds")]
    OutOfBounds(GridPos),

    /// A caller-supplied argument is invalid.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// Explanation of what is wrong with the argument.
        reason: String,
    },

    /// The grid dimensions are zero or too large to address.
    #[error("invalid grid dimensions {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
    },

    /// Vector arithmetic failed while computing a direction.
    #[error("vector error: {source}")]
    Vector {
        /// The underlying vector error.
        #[from]
        source: VectorError,
    },
}
