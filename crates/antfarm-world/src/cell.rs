//! A single addressable grid position.
//!
//! A [`Cell`] stores at most one occupant id. Vacancy is derived from the
//! occupant slot, so "occupied iff an occupant is present" holds by
//! construction. The cell does not own the entity; the simulation context
//! does, and keeps the entity's back-reference in step with this slot.

use antfarm_types::{Boundary, EntityId, GridId, GridPos, Vacancy};

use crate::error::WorldError;

/// One grid position, holding at most one occupant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Where the cell sits on the grid.
    pos: GridPos,
    /// In-bounds cell or out-of-bounds sentinel.
    boundary: Boundary,
    /// The entity standing here, if any.
    occupant: Option<EntityId>,
    /// The grid this cell is attached to; `None` once destroyed.
    grid: Option<GridId>,
}

impl Cell {
    /// Create a detached, empty, in-bounds cell at `pos`.
    pub const fn new(pos: GridPos) -> Self {
        Self {
            pos,
            boundary: Boundary::Normal,
            occupant: None,
            grid: None,
        }
    }

    /// Create an out-of-bounds sentinel at `pos`.
    pub(crate) const fn sentinel(pos: GridPos, grid: GridId) -> Self {
        Self {
            pos,
            boundary: Boundary::OutOfBounds,
            occupant: None,
            grid: Some(grid),
        }
    }

    /// The cell's coordinate.
    pub const fn position(&self) -> GridPos {
        self.pos
    }

    /// Whether this is a real cell or an out-of-bounds sentinel.
    pub const fn boundary(&self) -> Boundary {
        self.boundary
    }

    /// Occupancy status, derived from the occupant slot.
    pub const fn vacancy(&self) -> Vacancy {
        match self.occupant {
            Some(_) => Vacancy::Occupied,
            None => Vacancy::Empty,
        }
    }

    /// The occupant id, if any.
    pub const fn occupant(&self) -> Option<EntityId> {
        self.occupant
    }

    /// True if no entity stands here.
    pub const fn is_empty(&self) -> bool {
        self.occupant.is_none()
    }

    /// True for an in-bounds, empty cell: the only kind an entity may move into.
    pub const fn is_available(&self) -> bool {
        matches!(self.boundary, Boundary::Normal) && self.occupant.is_none()
    }

    /// The grid this cell belongs to, or `None` if detached.
    pub const fn grid(&self) -> Option<GridId> {
        self.grid
    }

    pub(crate) const fn attach(&mut self, grid: GridId) {
        self.grid = Some(grid);
    }

    pub(crate) const fn detach(&mut self) {
        self.grid = None;
    }

    /// Claim the occupant slot for `entity`.
    ///
    /// This only updates the cell side of the link. Callers that track the
    /// entity's own back-reference must update both sides together.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::CellOccupied`] if the slot is taken, or
    /// [`WorldError::OutOfBounds`] for a sentinel cell.
    pub fn set_occupant(&mut self, entity: EntityId) -> Result<(), WorldError> {
        if self.boundary == Boundary::OutOfBounds {
            return Err(WorldError::OutOfBounds(self.pos));
        }
        if let Some(occupant) = self.occupant {
            return Err(WorldError::CellOccupied {
                pos: self.pos,
                occupant,
            });
        }
        self.occupant = Some(entity);
        Ok(())
    }

    /// Vacate the occupant slot, returning the previous occupant.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::NoOccupant`] if the cell is already empty.
    pub fn remove_occupant(&mut self) -> Result<EntityId, WorldError> {
        self.occupant
            .take()
            .ok_or(WorldError::NoOccupant { pos: self.pos })
    }
}
