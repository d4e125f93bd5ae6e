//! The cell grid: a dense, fixed-size board of owned cells.
//!
//! [`CellGrid`] owns every in-bounds [`Cell`] in a row-major `Vec`, sized
//! at construction and never resized. Coordinates outside the board are
//! answered with sentinel cells that are synthesized on first access and
//! memoized by coordinate key, so the same sentinel is returned on every
//! later query.
//!
//! Occupancy is stored as entity ids. Keeping each entity's back-reference
//! consistent with these slots is the job of the simulation context that
//! owns the entities.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use antfarm_types::{Direction, EntityId, GridId, GridPos};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::trace;

use crate::cell::Cell;
use crate::error::WorldError;

/// Source of process-unique grid identifiers.
static NEXT_GRID_ID: AtomicU64 = AtomicU64::new(1);

/// A fixed-size 2-D grid of cells plus the out-of-bounds sentinel cache.
///
/// Not `Clone`: every cell is stamped with its grid's id, and a copy would
/// share it.
#[derive(Debug)]
pub struct CellGrid {
    /// Identity stamped onto every attached cell.
    id: GridId,
    /// Number of columns.
    width: u32,
    /// Number of rows.
    height: u32,
    /// Row-major cell storage; `None` only after `destroy_cell`.
    cells: Vec<Option<Cell>>,
    /// Synthesized out-of-bounds cells keyed by [`GridPos::key`].
    meta: BTreeMap<String, Cell>,
}

impl CellGrid {
    /// Create a grid of `width x height` empty cells.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::InvalidDimensions`] if either dimension is zero
    /// or the grid is too large to address with `i32` coordinates.
    pub fn new(width: u32, height: u32) -> Result<Self, WorldError> {
        let invalid = WorldError::InvalidDimensions { width, height };
        if width == 0 || height == 0 || i32::try_from(width).is_err() || i32::try_from(height).is_err()
        {
            return Err(invalid);
        }
        let area = usize::try_from(u64::from(width).saturating_mul(u64::from(height)))
            .map_err(|_err| invalid)?;

        let mut grid = Self {
            id: GridId(NEXT_GRID_ID.fetch_add(1, Ordering::Relaxed)),
            width,
            height,
            cells: Vec::with_capacity(area),
            meta: BTreeMap::new(),
        };
        grid.cells.resize(area, None);
        grid.populate();
        Ok(grid)
    }

    /// Fill every missing in-bounds slot with a fresh empty cell.
    ///
    /// Returns the number of cells created.
    pub fn populate(&mut self) -> usize {
        let id = self.id;
        let width = self.width;
        let mut created: usize = 0;
        for (index, slot) in self.cells.iter_mut().enumerate() {
            if slot.is_none() {
                let mut cell = Cell::new(position_of(index, width));
                cell.attach(id);
                *slot = Some(cell);
                created = created.saturating_add(1);
            }
        }
        created
    }

    /// This grid's identity.
    pub const fn id(&self) -> GridId {
        self.id
    }

    /// Number of columns.
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows.
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Number of in-bounds positions.
    pub fn area(&self) -> usize {
        self.cells.len()
    }

    /// True if `pos` lies within `[0, width) x [0, height)`.
    pub fn is_in_bounds(&self, pos: GridPos) -> bool {
        self.index_of(pos).is_some()
    }

    fn index_of(&self, pos: GridPos) -> Option<usize> {
        let x = u32::try_from(pos.x).ok()?;
        let y = u32::try_from(pos.y).ok()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = u64::from(y)
            .checked_mul(u64::from(self.width))?
            .checked_add(u64::from(x))?;
        usize::try_from(index).ok()
    }

    /// Look up a cell without synthesizing anything.
    ///
    /// Returns the stored cell for in-bounds coordinates (`None` if it was
    /// destroyed) or a previously synthesized sentinel for out-of-bounds ones.
    pub fn cell(&self, pos: GridPos) -> Option<&Cell> {
        match self.index_of(pos) {
            Some(index) => self.cells.get(index).and_then(Option::as_ref),
            None => self.meta.get(&pos.key()),
        }
    }

    /// Mutable access to an in-bounds cell.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] for coordinates outside the grid
    /// and [`WorldError::CellMissing`] for a destroyed cell.
    pub fn cell_mut(&mut self, pos: GridPos) -> Result<&mut Cell, WorldError> {
        let index = self.index_of(pos).ok_or(WorldError::OutOfBounds(pos))?;
        self.cells
            .get_mut(index)
            .and_then(Option::as_mut)
            .ok_or(WorldError::CellMissing(pos))
    }

    /// Return the cell at `pos`, synthesizing and caching an out-of-bounds
    /// sentinel on first access.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::CellMissing`] if an in-bounds cell was destroyed.
    pub fn get_cell(&mut self, pos: GridPos) -> Result<&Cell, WorldError> {
        if let Some(index) = self.index_of(pos) {
            return self
                .cells
                .get(index)
                .and_then(Option::as_ref)
                .ok_or(WorldError::CellMissing(pos));
        }
        Ok(self.sentinel(pos))
    }

    fn sentinel(&mut self, pos: GridPos) -> &Cell {
        let id = self.id;
        self.meta.entry(pos.key()).or_insert_with(|| {
            trace!(%pos, "synthesized out-of-bounds cell");
            Cell::sentinel(pos, id)
        })
    }

    /// Number of sentinel cells synthesized so far.
    pub fn sentinel_count(&self) -> usize {
        self.meta.len()
    }

    /// Install `cell` at `pos`, attaching it to this grid.
    ///
    /// Returns the cell previously stored there, detached.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if `pos` is outside the grid and
    /// [`WorldError::InvalidArgument`] if the cell's own position differs
    /// from `pos`.
    pub fn set_cell(&mut self, pos: GridPos, mut cell: Cell) -> Result<Option<Cell>, WorldError> {
        let index = self.index_of(pos).ok_or(WorldError::OutOfBounds(pos))?;
        if cell.position() != pos {
            return Err(WorldError::InvalidArgument {
                reason: format!("cell at {} cannot be stored at {pos}", cell.position()),
            });
        }
        let slot = self
            .cells
            .get_mut(index)
            .ok_or(WorldError::OutOfBounds(pos))?;
        cell.attach(self.id);
        let mut previous = slot.replace(cell);
        if let Some(old) = previous.as_mut() {
            old.detach();
        }
        Ok(previous)
    }

    /// Remove the cell at `pos` from the grid and return it detached.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] or [`WorldError::CellMissing`].
    pub fn destroy_cell(&mut self, pos: GridPos) -> Result<Cell, WorldError> {
        let index = self.index_of(pos).ok_or(WorldError::OutOfBounds(pos))?;
        let mut cell = self
            .cells
            .get_mut(index)
            .and_then(Option::take)
            .ok_or(WorldError::CellMissing(pos))?;
        cell.detach();
        Ok(cell)
    }

    /// The four 4-connected neighbours of `pos` in top, bottom, left, right
    /// order. Out-of-bounds neighbours are returned as sentinel cells;
    /// destroyed in-bounds cells are skipped.
    pub fn cells_adjacent_to(&mut self, pos: GridPos) -> Vec<&Cell> {
        let neighbours = pos.neighbours();
        for n in neighbours {
            if !self.is_in_bounds(n) {
                self.sentinel(n);
            }
        }
        let this: &Self = self;
        neighbours.iter().filter_map(|n| this.cell(*n)).collect()
    }

    /// Coordinates of the in-bounds, empty neighbours of `pos`, in
    /// top, bottom, left, right order.
    pub fn available_neighbours(&self, pos: GridPos) -> Vec<GridPos> {
        pos.neighbours()
            .into_iter()
            .filter(|n| self.cell(*n).is_some_and(Cell::is_available))
            .collect()
    }

    /// Pick a uniformly random available neighbour of `pos`.
    pub fn random_available_neighbour<R: Rng + ?Sized>(
        &self,
        pos: GridPos,
        rng: &mut R,
    ) -> Option<GridPos> {
        let candidates: Vec<&Cell> = pos.neighbours().iter().filter_map(|n| self.cell(*n)).collect();
        random_available_cell(candidates, rng).map(Cell::position)
    }

    /// Iterate over all live in-bounds cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter_map(Option::as_ref)
    }

    /// Snapshot of every occupied in-bounds cell as `(position, occupant)`,
    /// in row-major order.
    pub fn occupied(&self) -> Vec<(GridPos, EntityId)> {
        self.cells()
            .filter_map(|cell| cell.occupant().map(|id| (cell.position(), id)))
            .collect()
    }
}

/// Row-major index back to a coordinate.
fn position_of(index: usize, width: u32) -> GridPos {
    let width = usize::try_from(width).unwrap_or(usize::MAX).max(1);
    let x = index.checked_rem(width).unwrap_or(0);
    let y = index.checked_div(width).unwrap_or(0);
    GridPos::new(
        i32::try_from(x).unwrap_or(i32::MAX),
        i32::try_from(y).unwrap_or(i32::MAX),
    )
}

/// Uniformly select one in-bounds, empty cell from `candidates`.
///
/// Returns `None` if no candidate qualifies.
pub fn random_available_cell<'a, I, R>(candidates: I, rng: &mut R) -> Option<&'a Cell>
where
    I: IntoIterator<Item = &'a Cell>,
    R: Rng + ?Sized,
{
    let available: Vec<&Cell> = candidates.into_iter().filter(|c| c.is_available()).collect();
    available.choose(rng).copied()
}

/// Which way `target` lies relative to `origin`.
///
/// The normalized displacement `origin - target` is classified with a
/// fixed precedence: negative x is [`Direction::Right`], positive x is
/// [`Direction::Left`], positive y is [`Direction::Top`], anything else is
/// [`Direction::Bottom`]. Diagonal displacements therefore resolve
/// horizontally first, and identical positions resolve to `Bottom`.
///
/// # Errors
///
/// Returns [`WorldError::Vector`] if the displacement cannot be computed.
pub fn direction_relative_to(origin: GridPos, target: GridPos) -> Result<Direction, WorldError> {
    let displacement = origin
        .to_vector()
        .checked_sub(&target.to_vector())?
        .normalized();
    let x = displacement.get(0).unwrap_or(0.0);
    let y = displacement.get(1).unwrap_or(0.0);

    let direction = if x < 0.0 {
        Direction::Right
    } else if x > 0.0 {
        Direction::Left
    } else if y > 0.0 {
        Direction::Top
    } else {
        Direction::Bottom
    };
    Ok(direction)
}
