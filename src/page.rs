//! Page backend seam: metrics, hit-testing, and content painting.
//!
//! The widget never talks to a real DOM. A [`Page`] implementation answers
//! the three questions the interaction logic asks: how big is the document,
//! which elements sit under a viewport point, and (for screenshot capture)
//! how does the content paint itself.

use crate::geometry::Rect;
use crate::rendering::paint::DrawSurface;
use crate::Viewport;

/// Document and viewport measurements, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMetrics {
    /// Full scrollable document size.
    pub scroll_width: f64,
    pub scroll_height: f64,
    /// Visible viewport size.
    pub client_width: f64,
    pub client_height: f64,
    /// Current scroll offset.
    pub scroll_x: f64,
    pub scroll_y: f64,
}

impl PageMetrics {
    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.client_width as u32,
            height: self.client_height as u32,
        }
    }
}

/// One element from a hit-test stack: its lowercase tag name and its
/// bounding box in page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementHit {
    pub tag: String,
    pub rect: Rect,
}

/// The page the widget overlays.
pub trait Page {
    fn metrics(&self) -> PageMetrics;

    /// Host and path carried in the submission payload.
    fn location(&self) -> PageLocation;

    /// Every element under a viewport point, topmost first.
    fn hit_stack(&self, client_x: f64, client_y: f64) -> Vec<ElementHit>;

    /// How many leading entries of [`hit_stack`](Page::hit_stack) belong to
    /// the widget's own overlay layers. Backends that expose the raw
    /// document (like the HTML backend) report zero; a DOM bridge that sees
    /// the mounted overlay reports its actual depth so the highlighter can
    /// skip past it.
    fn overlay_depth(&self) -> usize {
        0
    }

    /// Paint the page content onto a viewport-sized surface, offset by the
    /// given scroll position. Used by the software capture backend; pages
    /// with no visual representation may leave this as the no-op default.
    fn paint(&self, surface: &mut dyn DrawSurface, scroll_x: f64, scroll_y: f64) {
        let _ = (surface, scroll_x, scroll_y);
    }
}

/// Where the feedback was filed from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageLocation {
    pub host: String,
    pub path: String,
}
