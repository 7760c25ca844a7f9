//! fbwidget: an embeddable feedback-collection widget engine
//!
//! The widget overlays a screenshot-annotation surface on a page, lets the
//! user draw highlight/blackout rectangles over a captured screenshot,
//! collects a text description, and submits the bundle to a configured
//! endpoint.
//!
//! The interaction logic is headless-first: it runs against a page backend
//! (hit-testing and metrics) and a drawing surface (the annotation mask),
//! so the whole flow of drawing, element snapping, capture and submission
//! works without a browser. Real backends for HTML pages, software
//! rasterization and HTTP submission are included.
//!
//! # Example
//!
//! ```no_run
//! use fbwidget::{HelperKind, WidgetOptions};
//!
//! # fn main() -> fbwidget::Result<()> {
//! let options = WidgetOptions {
//!     endpoint: "https://feedback.example.com/api".to_string(),
//!     ..Default::default()
//! };
//!
//! let mut widget = fbwidget::widget_for_url("https://example.com", options)?;
//! widget.open();
//! widget.open_drawer();
//! widget.set_mode(HelperKind::Highlight);
//! widget.draw_start(50.0, 50.0);
//! widget.draw_move(150.0, 120.0);
//! widget.draw_stop();
//! widget.close_drawer();
//! widget.set_description("The save button does nothing");
//! widget.submit()?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod capture;
pub mod geometry;
pub mod helpers;
pub mod page;
pub mod rendering;
pub mod submit;
pub mod toolbar;
pub mod widget;

// HTML-backed page implementation (scraper + block layout)
#[cfg(feature = "htmlpage")]
pub mod htmlpage;

// Async-friendly widget API (worker-thread-backed handle)
pub mod async_api;

pub use async_api::WidgetHandle;
pub use helpers::{Helper, HelperKind};
pub use page::{Page, PageLocation, PageMetrics};
pub use submit::SubmitStatus;
pub use widget::{Cursor, FeedbackWidget, View, WidgetState};

/// Configuration for the feedback widget
///
/// Options are merged over the defaults at construction and never mutated
/// afterwards: a `fb-` class prefix, a half-opaque veil, and the standard
/// whitelist of snappable tags.
///
/// # Examples
///
/// ```
/// let options = fbwidget::WidgetOptions::default();
/// assert_eq!(options.class_prefix, "fb-");
/// assert!(options.allowed_tags.iter().any(|t| t == "button"));
/// ```
#[derive(Debug, Clone)]
pub struct WidgetOptions {
    /// CSS class-name prefix for the widget's own DOM (cosmetic only).
    pub class_prefix: String,
    /// Veil opacity in `0..=1`.
    pub background_opacity: f64,
    /// Lowercase tag names eligible for element-snapping highlights.
    pub allowed_tags: Vec<String>,
    /// Hint shown under the screenshot preview.
    pub footnote: String,
    /// Submission endpoint URL; empty disables submission.
    pub endpoint: String,
    /// Highlight border width, also used as the page-clamp margin.
    pub line_width: f64,
    /// Minimum committable rectangle size in page pixels.
    pub min_helper_size: f64,
    /// How many leading hit-stack entries to skip before snapping. `None`
    /// derives the count from the page backend's own overlay depth.
    pub hit_test_skip: Option<usize>,
    /// Let the capture collaborator include cross-origin content.
    pub allow_taint: bool,
    /// Timeout for HTTP operations in milliseconds.
    pub timeout_ms: u64,
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            class_prefix: "fb-".to_string(),
            background_opacity: 0.5,
            allowed_tags: [
                "button", "a", "span", "h1", "h2", "h3", "h4", "h5", "p", "i", "strong", "small",
                "sub", "sup", "b", "time", "img", "caption", "input", "label", "legend", "select",
                "textarea", "details", "summary",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            footnote: "Click the image above to highlight or obscure areas of the screenshot."
                .to_string(),
            endpoint: String::new(),
            line_width: 4.0,
            min_helper_size: 6.0,
            hit_test_skip: None,
            allow_taint: true,
            timeout_ms: 30000,
        }
    }
}

/// Viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Create a widget over a fetched HTML page, with the software raster
/// surface and capture backend.
#[cfg(feature = "htmlpage")]
pub fn widget_for_url(
    url: &str,
    options: WidgetOptions,
) -> Result<FeedbackWidget<htmlpage::HtmlPage, rendering::raster::RasterSurface>> {
    let page = htmlpage::HtmlPage::fetch(url, Viewport::default(), options.timeout_ms)?;
    widget_over(page, options)
}

/// Create a widget over in-memory HTML (local files, tests).
#[cfg(feature = "htmlpage")]
pub fn widget_for_html(
    html: &str,
    base_url: Option<&str>,
    options: WidgetOptions,
) -> Result<FeedbackWidget<htmlpage::HtmlPage, rendering::raster::RasterSurface>> {
    let page = htmlpage::HtmlPage::from_html(html, base_url, Viewport::default())?;
    widget_over(page, options)
}

#[cfg(feature = "htmlpage")]
fn widget_over(
    page: htmlpage::HtmlPage,
    options: WidgetOptions,
) -> Result<FeedbackWidget<htmlpage::HtmlPage, rendering::raster::RasterSurface>> {
    let viewport = Viewport::default();
    FeedbackWidget::new(
        page,
        rendering::raster::RasterSurface::new(viewport.width, viewport.height),
        Box::new(capture::SoftwareCapture::new()),
        options,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = WidgetOptions::default();
        assert_eq!(options.class_prefix, "fb-");
        assert_eq!(options.background_opacity, 0.5);
        assert_eq!(options.allowed_tags.len(), 25);
        assert!(options.endpoint.is_empty());
        assert_eq!(options.min_helper_size, 6.0);
        assert!(options.hit_test_skip.is_none());
    }

    #[test]
    fn test_viewport() {
        let viewport = Viewport::default();
        assert_eq!(viewport.width, 1280);
        assert_eq!(viewport.height, 720);
    }
}
