//! Rectangle geometry for the annotation engine.
//!
//! Coordinates are always page coordinates (relative to the full scrollable
//! document, independent of the current scroll offset). The in-progress
//! [`Area`] keeps signed spans while a drag is active; a committed [`Rect`]
//! is the normalized form with non-negative spans. Sign normalization
//! happens exactly once, when a gesture is committed.

/// An axis-aligned rectangle with non-negative spans.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }
}

/// An in-progress drag rectangle anchored at `start_x`/`start_y`.
///
/// `width`/`height` are signed: negative spans mean the drag moved up/left
/// of the anchor. The signed form survives until the gesture is committed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Area {
    pub start_x: f64,
    pub start_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Area {
    /// Anchor a fresh area at the given page coordinates.
    pub fn anchored(page_x: f64, page_y: f64) -> Self {
        Self {
            start_x: page_x,
            start_y: page_y,
            width: 0.0,
            height: 0.0,
        }
    }

    /// View a committed rectangle as an area (used when re-running the
    /// commit path for an element-snapped candidate).
    pub fn from_rect(rect: &Rect) -> Self {
        Self {
            start_x: rect.x,
            start_y: rect.y,
            width: rect.width,
            height: rect.height,
        }
    }

    /// Recompute the signed spans as the delta from the anchor to the
    /// current pointer position (page coordinates).
    pub fn resize_to(&mut self, page_x: f64, page_y: f64) {
        self.width = page_x - self.start_x;
        self.height = page_y - self.start_y;
    }

    /// Clamp the spans so the rectangle (plus the stroke margin) never
    /// extends beyond the scrollable page bounds on any side.
    pub fn clamp_to_page(&mut self, scroll_width: f64, scroll_height: f64, margin: f64) {
        if self.start_x + self.width > scroll_width {
            self.width = scroll_width - self.start_x - margin;
        }
        if self.start_x + self.width < 0.0 {
            self.width = -self.start_x + margin;
        }
        if self.start_y + self.height > scroll_height {
            self.height = scroll_height - self.start_y - margin;
        }
        if self.start_y + self.height < 0.0 {
            self.height = -self.start_y + margin;
        }
    }

    /// Whether both spans meet the minimum committable size.
    pub fn spans_at_least(&self, min: f64) -> bool {
        self.width.abs() >= min && self.height.abs() >= min
    }

    /// Whether both spans strictly exceed `min` (the repaint pipeline only
    /// draws an in-progress rectangle once it is visibly larger than a
    /// click).
    pub fn exceeds(&self, min: f64) -> bool {
        self.width.abs() > min && self.height.abs() > min
    }

    /// Fold negative spans into an origin shift, producing the committed
    /// form. A drag from (100,100) to (40,60) yields origin (40,60) with
    /// spans 60x40.
    pub fn normalized(&self) -> Rect {
        let mut rect = Rect::new(self.start_x, self.start_y, self.width, self.height);
        if rect.width < 0.0 {
            rect.x += rect.width;
            rect.width = -rect.width;
        }
        if rect.height < 0.0 {
            rect.y += rect.height;
            rect.height = -rect.height;
        }
        rect
    }
}
