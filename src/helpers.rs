//! The rectangle store: committed annotation rectangles ("helpers").

use crate::geometry::{Area, Rect};

/// Whether a committed rectangle reveals or obscures its region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelperKind {
    /// Outline the region and cut transparency into the veil.
    Highlight,
    /// Fully obscure the region.
    Blackout,
}

/// A committed annotation rectangle.
///
/// `index` increases monotonically across the widget session and is the
/// stable identity used for hover and removal; it never shifts when other
/// helpers are removed.
#[derive(Debug, Clone, PartialEq)]
pub struct Helper {
    pub rect: Rect,
    pub kind: HelperKind,
    pub index: u64,
}

/// Ordered collection of committed helpers.
#[derive(Debug, Default)]
pub struct HelperStore {
    items: Vec<Helper>,
    next_index: u64,
}

impl HelperStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the commit path for a finished gesture: discard sub-threshold
    /// areas, normalize the spans, and append with a fresh index.
    ///
    /// Returns the committed helper, or `None` when the gesture was treated
    /// as a non-event.
    pub fn commit(&mut self, area: &Area, kind: HelperKind, min_size: f64) -> Option<&Helper> {
        if !area.spans_at_least(min_size) {
            return None;
        }
        let helper = Helper {
            rect: area.normalized(),
            kind,
            index: self.next_index,
        };
        self.next_index += 1;
        self.items.push(helper);
        self.items.last()
    }

    /// Remove exactly the helper with the given index. Other entries keep
    /// their positions and indices.
    pub fn remove(&mut self, index: u64) -> bool {
        match self.items.iter().position(|h| h.index == index) {
            Some(pos) => {
                self.items.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, index: u64) -> Option<&Helper> {
        self.items.iter().find(|h| h.index == index)
    }

    /// Topmost helper under a page-space point (later commits sit on top).
    pub fn at_point(&self, page_x: f64, page_y: f64) -> Option<&Helper> {
        self.items.iter().rev().find(|h| h.rect.contains(page_x, page_y))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Helper> {
        self.items.iter()
    }

    pub fn highlights(&self) -> impl Iterator<Item = &Helper> {
        self.items.iter().filter(|h| h.kind == HelperKind::Highlight)
    }

    pub fn blackouts(&self) -> impl Iterator<Item = &Helper> {
        self.items.iter().filter(|h| h.kind == HelperKind::Blackout)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Discard all helpers and reset identity allocation (widget close).
    pub fn clear(&mut self) {
        self.items.clear();
        self.next_index = 0;
    }
}
