//! Read-only frames handed to render collaborators.
//!
//! The render phase captures a [`RenderFrame`] between movement pulses and
//! passes it to a [`RenderSink`]. Sinks never see the live ecosystem, so
//! they cannot mutate grid or entity state.

use antfarm_agents::{BugView, Census, Ecosystem};
use antfarm_types::GridPos;

/// An owned view of the grid and its occupants at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    /// Grid columns.
    pub width: u32,
    /// Grid rows.
    pub height: u32,
    /// Population counters at capture time.
    pub census: Census,
    /// Every live, placed bug in row-major order of its cell.
    pub bugs: Vec<BugView>,
}

impl RenderFrame {
    /// Capture the current state of `ecosystem`.
    pub fn capture(ecosystem: &Ecosystem) -> Self {
        let grid = ecosystem.grid();
        Self {
            width: grid.width(),
            height: grid.height(),
            census: ecosystem.census(),
            bugs: ecosystem.views(),
        }
    }

    /// The bug drawn at `pos`, if any.
    pub fn occupant_at(&self, pos: GridPos) -> Option<&BugView> {
        self.bugs.iter().find(|bug| bug.pos == pos)
    }
}

/// Something that draws frames.
pub trait RenderSink: Send {
    /// Draw one frame.
    fn render(&mut self, frame: &RenderFrame) -> std::io::Result<()>;
}
