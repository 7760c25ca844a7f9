//! Screenshot capture: the external collaborator seam and a software
//! implementation.
//!
//! Capture rasterizes what the user currently sees: the page content with
//! the annotation mask composited on top, cropped to the viewport at the
//! current scroll offset. The widget repaints the mask without highlight
//! borders before invoking capture, so borders never appear in the frame.

use crate::error::Result;
use crate::page::{Page, PageMetrics};
use crate::rendering::raster::RasterSurface;
use crate::rendering::Screenshot;

/// Options handed to the capture collaborator, mirroring the widget's view
/// of the page at capture time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureOptions {
    pub width: u32,
    pub height: u32,
    pub scroll_x: f64,
    pub scroll_y: f64,
    /// Allow content the backend cannot verify as same-origin.
    pub allow_taint: bool,
}

impl CaptureOptions {
    pub fn from_metrics(metrics: &PageMetrics, allow_taint: bool) -> Self {
        Self {
            width: metrics.client_width as u32,
            height: metrics.client_height as u32,
            scroll_x: metrics.scroll_x,
            scroll_y: metrics.scroll_y,
            allow_taint,
        }
    }
}

/// The capture collaborator interface.
///
/// `overlay` carries the annotation mask's raw pixels (page-sized) when the
/// widget's surface keeps any; backends composite it over the content.
pub trait Capture {
    fn capture(
        &self,
        page: &dyn Page,
        overlay: Option<&(u32, u32, Vec<u8>)>,
        options: &CaptureOptions,
    ) -> Result<Screenshot>;
}

/// Pure-software capture: paints the page's own wireframe into a
/// viewport-sized raster, composites the mask, and encodes PNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftwareCapture;

impl SoftwareCapture {
    pub fn new() -> Self {
        Self
    }
}

impl Capture for SoftwareCapture {
    fn capture(
        &self,
        page: &dyn Page,
        overlay: Option<&(u32, u32, Vec<u8>)>,
        options: &CaptureOptions,
    ) -> Result<Screenshot> {
        let mut surface = RasterSurface::new(options.width, options.height);
        page.paint(&mut surface, options.scroll_x, options.scroll_y);
        if let Some((w, h, pixels)) = overlay {
            surface.blend_rgba(
                *w,
                *h,
                pixels,
                -(options.scroll_x.round() as i64),
                -(options.scroll_y.round() as i64),
            );
        }
        surface.to_screenshot()
    }
}
