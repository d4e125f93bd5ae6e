//! Enumeration types for the Antfarm simulation.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Species
// ---------------------------------------------------------------------------

/// The closed set of bug species that can occupy a cell.
///
/// Behaviour differences between species are resolved by matching on this
/// tag (see the species profiles in `antfarm-agents`), never by downcasting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Species {
    /// Prey. Wanders and breeds, never starves.
    Ant,
    /// Predator. Eats adjacent ants, breeds, starves when it goes hungry.
    Doodlebug,
}

impl Species {
    /// All species in a stable order.
    pub const ALL: [Self; 2] = [Self::Ant, Self::Doodlebug];

    /// Single-character glyph used by text renderers.
    pub const fn glyph(self) -> char {
        match self {
            Self::Ant => 'o',
            Self::Doodlebug => 'X',
        }
    }

    /// Human-readable lowercase name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ant => "ant",
            Self::Doodlebug => "doodlebug",
        }
    }
}

impl core::fmt::Display for Species {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// One of the four grid directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward smaller `y`.
    Top,
    /// Toward larger `y`.
    Bottom,
    /// Toward smaller `x`.
    Left,
    /// Toward larger `x`.
    Right,
}

impl Direction {
    /// Facing angle in degrees, clockwise from [`Direction::Top`].
    pub const fn facing_degrees(self) -> u16 {
        match self {
            Self::Top => 0,
            Self::Right => 90,
            Self::Bottom => 180,
            Self::Left => 270,
        }
    }
}

// ---------------------------------------------------------------------------
// Cell classification
// ---------------------------------------------------------------------------

/// Whether a cell lies inside the grid or is a synthesized sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Boundary {
    /// An in-bounds cell that can hold an occupant.
    Normal,
    /// A sentinel standing in for a coordinate outside the grid.
    OutOfBounds,
}

/// Occupancy status of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Vacancy {
    /// No occupant.
    Empty,
    /// Exactly one occupant.
    Occupied,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Lifecycle state of a scheduled task.
///
/// `Suspended -> Running -> End`; `End` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskState {
    /// Waiting for its wake time (a freshly created task starts here).
    Suspended,
    /// Eligible to run each cycle.
    Running,
    /// Finished; will never run again.
    End,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn species_serializes_snake_case() {
        let json = serde_json::to_string(&Species::Doodlebug).unwrap_or_default();
        assert_eq!(json, "\"doodlebug\"");
    }

    #[test]
    fn facing_is_clockwise() {
        assert_eq!(Direction::Top.facing_degrees(), 0);
        assert_eq!(Direction::Right.facing_degrees(), 90);
        assert_eq!(Direction::Bottom.facing_degrees(), 180);
        assert_eq!(Direction::Left.facing_degrees(), 270);
    }
}
