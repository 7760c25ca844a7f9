//! Drag handling for the floating draw-options toolbar.
//!
//! The toolbar is dragged in viewport coordinates. Limits are computed once
//! at drag start from the toolbar's current bounding box, so a clamped
//! delta can never push the toolbar outside the viewport. The committed
//! transform is only advanced when an actual move happened, which is what
//! distinguishes a click on the drag handle from a drag.

use crate::geometry::Rect;
use crate::Viewport;

/// A composed translation offset, in CSS-transform style.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Translation {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct DragLimits {
    x_neg: f64,
    x_pos: f64,
    y_neg: f64,
    y_pos: f64,
}

#[derive(Debug, Default)]
pub struct ToolbarDrag {
    dragging: bool,
    moved: bool,
    start_x: f64,
    start_y: f64,
    committed: Translation,
    pending: Translation,
    limits: DragLimits,
}

impl ToolbarDrag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// The current composed offset: the committed transform plus any
    /// pending drag delta.
    pub fn offset(&self) -> Translation {
        if self.dragging && self.moved {
            Translation {
                x: self.committed.x + self.pending.x,
                y: self.committed.y + self.pending.y,
            }
        } else {
            self.committed
        }
    }

    /// Begin a drag. `bounds` is the toolbar's current bounding box in
    /// viewport coordinates (already reflecting the committed transform).
    pub fn start(&mut self, client_x: f64, client_y: f64, bounds: Rect, viewport: Viewport) {
        if self.dragging {
            return;
        }
        self.dragging = true;
        self.moved = false;
        self.start_x = client_x;
        self.start_y = client_y;
        self.pending = Translation::default();
        self.limits = DragLimits {
            x_neg: -bounds.x,
            x_pos: viewport.width as f64 - bounds.right(),
            y_neg: -bounds.y,
            y_pos: viewport.height as f64 - bounds.bottom(),
        };
    }

    /// Track a pointer move. Returns the composed offset to apply, or
    /// `None` when no drag is active.
    pub fn drag(&mut self, client_x: f64, client_y: f64) -> Option<Translation> {
        if !self.dragging {
            return None;
        }
        let next_x = (client_x - self.start_x)
            .max(self.limits.x_neg)
            .min(self.limits.x_pos)
            .round();
        let next_y = (client_y - self.start_y)
            .max(self.limits.y_neg)
            .min(self.limits.y_pos)
            .round();
        self.pending = Translation { x: next_x, y: next_y };
        self.moved = true;
        Some(self.offset())
    }

    /// End the drag, committing the pending translation only if the pointer
    /// actually moved.
    pub fn stop(&mut self) {
        if self.dragging && self.moved {
            self.committed.x += self.pending.x;
            self.committed.y += self.pending.y;
        }
        self.dragging = false;
        self.moved = false;
        self.pending = Translation::default();
    }

    /// Forget any committed transform (widget close).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
