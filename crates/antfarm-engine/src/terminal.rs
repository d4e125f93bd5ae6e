//! ASCII renderer for the terminal.

use std::fmt::Write as _;
use std::io::Write;

use antfarm_core::{RenderFrame, RenderSink};
use antfarm_types::GridPos;

/// Glyph for an empty cell.
const EMPTY: char = '.';

/// ANSI: clear screen and move the cursor home.
const CLEAR: &str = "\x1b[2J\x1b[H";

/// Draw `frame` as one row of glyphs per grid row followed by a census line.
pub fn format_frame(frame: &RenderFrame) -> String {
    let mut out = String::new();
    let width = i32::try_from(frame.width).unwrap_or(i32::MAX);
    let height = i32::try_from(frame.height).unwrap_or(i32::MAX);
    for y in 0..height {
        for x in 0..width {
            let glyph = frame
                .occupant_at(GridPos::new(x, y))
                .map_or(EMPTY, |bug| bug.species.glyph());
            out.push(glyph);
        }
        out.push('\n');
    }
    let c = &frame.census;
    let _ = writeln!(
        out,
        "frame {} | ants {} | doodlebugs {} | births {} | eaten {} | starved {}",
        c.frame, c.ants, c.doodlebugs, c.births, c.meals, c.starvations
    );
    out
}

/// Writes frames to any [`Write`] target, clearing the screen first.
#[derive(Debug)]
pub struct TerminalRenderer<W> {
    out: W,
    clear: bool,
}

impl<W: Write> TerminalRenderer<W> {
    /// A renderer that clears the screen between frames.
    pub const fn new(out: W) -> Self {
        Self { out, clear: true }
    }

    /// A renderer that appends frames without clearing.
    pub const fn plain(out: W) -> Self {
        Self { out, clear: false }
    }

    /// Recover the underlying writer.
    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> RenderSink for TerminalRenderer<W> {
    fn render(&mut self, frame: &RenderFrame) -> std::io::Result<()> {
        if self.clear {
            self.out.write_all(CLEAR.as_bytes())?;
        }
        self.out.write_all(format_frame(frame).as_bytes())?;
        self.out.flush()
    }
}

/// Discards every frame. Used with `--quiet`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl RenderSink for NullRenderer {
    fn render(&mut self, _frame: &RenderFrame) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use antfarm_agents::{Ecosystem, EcosystemConfig};
    use antfarm_types::Species;

    fn sample() -> RenderFrame {
        let mut eco = Ecosystem::new(3, 2, EcosystemConfig::default(), 0).unwrap();
        eco.spawn(Species::Ant, GridPos::new(0, 0), 0, None).unwrap();
        eco.spawn(Species::Doodlebug, GridPos::new(2, 1), 0, None)
            .unwrap();
        RenderFrame::capture(&eco)
    }

    #[test]
    fn grid_and_census_line() {
        let text = format_frame(&sample());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "o..");
        assert_eq!(lines[1], "..X");
        assert_eq!(
            lines[2],
            "frame 0 | ants 1 | doodlebugs 1 | births 0 | eaten 0 | starved 0"
        );
    }

    #[test]
    fn plain_renderer_writes_without_escape_codes() {
        let mut renderer = TerminalRenderer::plain(Vec::new());
        renderer.render(&sample()).unwrap();
        let written = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(written.starts_with("o..\n"));
    }

    #[test]
    fn clearing_renderer_prefixes_escape() {
        let mut renderer = TerminalRenderer::new(Vec::new());
        renderer.render(&sample()).unwrap();
        let written = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(written.starts_with(CLEAR));
    }
}
