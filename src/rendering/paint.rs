//! Paint command set and the drawing-surface seam.
//!
//! The interaction logic never touches pixels directly: it emits
//! [`PaintCommand`]s against a [`DrawSurface`]. The raster backend executes
//! them; the [`Recorder`] backend just logs them so interaction tests can
//! assert on repaint behavior without a rendering stack.

/// RGBA color, straight (non-premultiplied) alpha.
pub type Rgba = (u8, u8, u8, u8);

/// Commands the mask pipeline needs from a canvas-like surface.
///
/// Spans may be negative (an in-progress drag moving up/left); surfaces
/// fold them into an origin shift when executing.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    /// Clear the whole surface, then flood it with `rgba`.
    Reset { rgba: Rgba },
    /// Source-over fill of a rectangle.
    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        rgba: Rgba,
    },
    /// Punch a fully transparent hole.
    ClearRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    /// Stroke a rectangle border, centered on the edge.
    StrokeRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        line_width: f64,
        rgba: Rgba,
    },
}

/// A canvas-like surface the repaint pipeline draws on.
pub trait DrawSurface {
    fn size(&self) -> (u32, u32);

    fn resize(&mut self, width: u32, height: u32);

    fn apply(&mut self, cmd: &PaintCommand);

    /// Raw RGBA pixels for surfaces that keep them; recording surfaces
    /// return `None`.
    fn snapshot_rgba(&self) -> Option<(u32, u32, Vec<u8>)> {
        None
    }
}

/// A surface that records every command it receives.
#[derive(Debug, Default)]
pub struct Recorder {
    width: u32,
    height: u32,
    pub commands: Vec<PaintCommand>,
}

impl Recorder {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, commands: Vec::new() }
    }

    /// Commands recorded since the last [`Reset`](PaintCommand::Reset),
    /// i.e. the most recent full repaint.
    pub fn last_repaint(&self) -> &[PaintCommand] {
        let start = self
            .commands
            .iter()
            .rposition(|c| matches!(c, PaintCommand::Reset { .. }))
            .unwrap_or(0);
        &self.commands[start..]
    }
}

impl DrawSurface for Recorder {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn apply(&mut self, cmd: &PaintCommand) {
        self.commands.push(cmd.clone());
    }
}
