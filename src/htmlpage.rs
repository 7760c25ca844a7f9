//! HTML-backed page implementation.
//!
//! Parses a document with `scraper` and computes a small block layout
//! (stacked boxes, nested children, estimated text heights), good enough to
//! answer hit-test queries and to paint a wireframe of the page for the
//! software capture backend. Pages can be fetched over HTTP or supplied as
//! a string (tests, local files).

use std::time::Duration;

use scraper::{ElementRef, Html, Selector};

use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::page::{ElementHit, Page, PageLocation, PageMetrics};
use crate::rendering::paint::{DrawSurface, PaintCommand};
use crate::Viewport;

const BLOCK_PADDING: f64 = 8.0;
const INLINE_PADDING: f64 = 2.0;
const BLOCK_GAP: f64 = 8.0;
const LINE_HEIGHT: f64 = 16.0;
const CHAR_WIDTH: f64 = 8.0;

// Elements that size to their content instead of the available width.
const INLINE_TAGS: &[&str] = &[
    "a", "span", "b", "i", "strong", "em", "small", "sub", "sup", "time", "label", "img",
    "button", "input", "select", "caption", "legend", "summary", "code",
];

// Non-rendered elements, skipped entirely.
const SKIP_TAGS: &[&str] = &["head", "script", "style", "meta", "link", "title", "noscript"];

#[derive(Debug, Clone)]
struct LayoutElement {
    tag: String,
    rect: Rect,
}

/// A laid-out HTML document implementing [`Page`].
#[derive(Debug, Clone)]
pub struct HtmlPage {
    html: String,
    location: PageLocation,
    viewport: Viewport,
    scroll_x: f64,
    scroll_y: f64,
    elements: Vec<LayoutElement>,
    content_height: f64,
}

impl HtmlPage {
    /// Fetch a document over HTTP and lay it out for the given viewport.
    pub fn fetch(url: &str, viewport: Viewport, timeout_ms: u64) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        let resp = client
            .get(url)
            .send()
            .map_err(|e| Error::NetworkError(format!("Failed to fetch {}: {}", url, e)))?;

        let body = resp
            .text()
            .map_err(|e| Error::LoadError(format!("Failed to read response body: {}", e)))?;

        Self::from_html(&body, Some(url), viewport)
    }

    /// Lay out a document from source. `base_url` feeds the submission
    /// location; without it the page reports an empty host and "/".
    pub fn from_html(html: &str, base_url: Option<&str>, viewport: Viewport) -> Result<Self> {
        let location = match base_url {
            Some(raw) => {
                let parsed = url::Url::parse(raw)
                    .map_err(|e| Error::LoadError(format!("Invalid page URL {}: {}", raw, e)))?;
                PageLocation {
                    host: parsed.host_str().unwrap_or_default().to_string(),
                    path: parsed.path().to_string(),
                }
            }
            None => PageLocation { host: String::new(), path: "/".to_string() },
        };

        let mut page = Self {
            html: html.to_string(),
            location,
            viewport,
            scroll_x: 0.0,
            scroll_y: 0.0,
            elements: Vec::new(),
            content_height: 0.0,
        };
        page.relayout();
        Ok(page)
    }

    /// Change the viewport and recompute the layout.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.relayout();
        self.set_scroll(self.scroll_x, self.scroll_y);
    }

    /// Bounding box of the first laid-out element with this tag name, in
    /// page coordinates.
    pub fn bounding_rect(&self, tag: &str) -> Option<Rect> {
        self.elements.iter().find(|e| e.tag == tag).map(|e| e.rect)
    }

    /// Scroll the viewport, clamped to the scrollable bounds.
    pub fn set_scroll(&mut self, x: f64, y: f64) {
        let m = self.metrics();
        self.scroll_x = x.clamp(0.0, (m.scroll_width - m.client_width).max(0.0));
        self.scroll_y = y.clamp(0.0, (m.scroll_height - m.client_height).max(0.0));
    }

    fn relayout(&mut self) {
        let document = Html::parse_document(&self.html);
        let mut elements = Vec::new();
        let body_sel = Selector::parse("body").unwrap();
        let height = match document.select(&body_sel).next() {
            Some(body) => layout_element(body, 0.0, 0.0, self.viewport.width as f64, &mut elements),
            None => 0.0,
        };
        self.elements = elements;
        self.content_height = height;
    }
}

impl Page for HtmlPage {
    fn metrics(&self) -> PageMetrics {
        PageMetrics {
            scroll_width: self.viewport.width as f64,
            scroll_height: self.content_height.max(self.viewport.height as f64),
            client_width: self.viewport.width as f64,
            client_height: self.viewport.height as f64,
            scroll_x: self.scroll_x,
            scroll_y: self.scroll_y,
        }
    }

    fn location(&self) -> PageLocation {
        self.location.clone()
    }

    fn hit_stack(&self, client_x: f64, client_y: f64) -> Vec<ElementHit> {
        let page_x = client_x + self.scroll_x;
        let page_y = client_y + self.scroll_y;
        // Children are laid out after their parents, so reverse document
        // order yields the innermost element first.
        self.elements
            .iter()
            .rev()
            .filter(|el| el.rect.contains(page_x, page_y))
            .map(|el| ElementHit { tag: el.tag.clone(), rect: el.rect })
            .collect()
    }

    fn paint(&self, surface: &mut dyn DrawSurface, scroll_x: f64, scroll_y: f64) {
        surface.apply(&PaintCommand::Reset { rgba: (255, 255, 255, 255) });
        for el in &self.elements {
            surface.apply(&PaintCommand::FillRect {
                x: el.rect.x - scroll_x,
                y: el.rect.y - scroll_y,
                width: el.rect.width,
                height: el.rect.height,
                rgba: (0, 0, 0, 8),
            });
            surface.apply(&PaintCommand::StrokeRect {
                x: el.rect.x - scroll_x,
                y: el.rect.y - scroll_y,
                width: el.rect.width,
                height: el.rect.height,
                line_width: 1.0,
                rgba: (180, 180, 180, 255),
            });
        }
    }
}

/// Lay out one element at (x, y) within `width`, record it and its
/// descendants, and return the element's height.
fn layout_element(el: ElementRef, x: f64, y: f64, width: f64, out: &mut Vec<LayoutElement>) -> f64 {
    let tag = el.value().name().to_ascii_lowercase();
    if SKIP_TAGS.contains(&tag.as_str()) {
        return 0.0;
    }

    // Deep nesting can exhaust the available width; never lay out below
    // one line-height of room.
    let width = width.max(LINE_HEIGHT);
    let inline = INLINE_TAGS.contains(&tag.as_str());
    let padding = if inline { INLINE_PADDING } else { BLOCK_PADDING };
    let text: String = el.text().collect::<String>().trim().to_string();

    let box_width = if inline {
        (text.chars().count() as f64 * CHAR_WIDTH + padding * 2.0).clamp(LINE_HEIGHT, width)
    } else {
        width
    };

    // Reserve the slot first so parents precede children in document order.
    let idx = out.len();
    out.push(LayoutElement { tag, rect: Rect::new(x, y, box_width, 0.0) });

    let children: Vec<ElementRef> = el.children().filter_map(ElementRef::wrap).collect();
    let inner_height = if children.is_empty() {
        text_height(&text, box_width - padding * 2.0)
    } else {
        let mut cursor = 0.0;
        let mut laid = 0usize;
        for child in children {
            let h = layout_element(child, x + padding, y + padding + cursor, width - padding * 2.0, out);
            if h > 0.0 {
                cursor += h + BLOCK_GAP;
                laid += 1;
            }
        }
        if laid > 0 {
            cursor -= BLOCK_GAP;
        }
        cursor.max(LINE_HEIGHT)
    };

    let height = inner_height.max(LINE_HEIGHT) + padding * 2.0;
    out[idx].rect.height = height;
    height
}

/// Estimate wrapped text height the same way the layout estimates width:
/// fixed-width characters, greedy word wrap.
fn text_height(text: &str, width: f64) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    let chars_per_line = ((width / CHAR_WIDTH) as usize).max(1);
    let mut lines = 1usize;
    let mut current = 0usize;
    for word in text.split_whitespace() {
        let len = word.chars().count();
        if current > 0 && current + len + 1 > chars_per_line {
            lines += 1;
            current = len;
        } else {
            current += if current > 0 { len + 1 } else { len };
        }
    }
    lines as f64 * LINE_HEIGHT
}
