//! Integer grid coordinates.

use serde::{Deserialize, Serialize};

use crate::enums::Direction;
use crate::vector::VecN;

/// A coordinate on the cell grid.
///
/// Coordinates are signed so that out-of-bounds neighbours of edge cells
/// (for example `(-1, 0)`) can be represented and looked up as sentinel
/// cells. `y` grows downward, so [`Direction::Top`] is `y - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridPos {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl GridPos {
    /// Create a coordinate from its components.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Return the neighbouring coordinate one step in `direction`.
    ///
    /// Saturates at the `i32` range instead of overflowing.
    pub const fn step(self, direction: Direction) -> Self {
        match direction {
            Direction::Top => Self::new(self.x, self.y.saturating_sub(1)),
            Direction::Bottom => Self::new(self.x, self.y.saturating_add(1)),
            Direction::Left => Self::new(self.x.saturating_sub(1), self.y),
            Direction::Right => Self::new(self.x.saturating_add(1), self.y),
        }
    }

    /// Return the four 4-connected neighbours in the fixed order
    /// top, bottom, left, right.
    pub const fn neighbours(self) -> [Self; 4] {
        [
            self.step(Direction::Top),
            self.step(Direction::Bottom),
            self.step(Direction::Left),
            self.step(Direction::Right),
        ]
    }

    /// Key used to memoize synthesized out-of-bounds cells.
    pub fn key(self) -> String {
        format!("{},{}", self.x, self.y)
    }

    /// Convert to a 2-dimensional float vector.
    pub fn to_vector(self) -> VecN {
        VecN::new(vec![f64::from(self.x), f64::from(self.y)])
    }
}

impl core::fmt::Display for GridPos {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbours_are_four_connected() {
        let n = GridPos::new(1, 1).neighbours();
        assert_eq!(
            n,
            [
                GridPos::new(1, 0),
                GridPos::new(1, 2),
                GridPos::new(0, 1),
                GridPos::new(2, 1),
            ]
        );
    }

    #[test]
    fn key_is_stable() {
        assert_eq!(GridPos::new(-1, 4).key(), "-1,4");
    }
}
