//! The widget controller: explicit state, named transitions.
//!
//! Every event handler from the original interaction model is a method on
//! [`FeedbackWidget`]; all mutable state lives on the controller instance
//! and is reset to fixed defaults on close. The controller is generic over
//! the page backend and the drawing surface so the whole interaction logic
//! runs headless in tests.

use std::time::Duration;

use crate::capture::{Capture, CaptureOptions};
use crate::error::{Error, Result};
use crate::geometry::{Area, Rect};
use crate::helpers::{HelperKind, HelperStore};
use crate::page::Page;
use crate::rendering::mask::{ActiveArea, MaskPainter};
use crate::rendering::paint::DrawSurface;
use crate::rendering::Screenshot;
use crate::submit::{FeedbackPayload, SubmissionController, SubmitStatus};
use crate::toolbar::{ToolbarDrag, Translation};
use crate::WidgetOptions;

/// Widget state flags, mutated exclusively by the named event methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetState {
    pub open: bool,
    /// The toolbar is being dragged.
    pub dragging: bool,
    /// The current toolbar drag has actually moved.
    pub dragged: bool,
    /// Draw mode is active.
    pub can_draw: bool,
    pub include_screenshot: bool,
    /// Highlight mode (vs. blackout mode).
    pub highlight: bool,
    /// A rectangle drag is in progress.
    pub drawing: bool,
    pub sending: bool,
}

impl Default for WidgetState {
    fn default() -> Self {
        Self {
            open: false,
            dragging: false,
            dragged: false,
            can_draw: false,
            include_screenshot: true,
            highlight: true,
            drawing: false,
            sending: false,
        }
    }
}

/// What the user currently sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Form,
    Drawing,
    Sending,
    Sent,
    Error,
}

/// Cursor feedback over the annotation surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Default,
    /// Free drawing; the hovered element is not selectable.
    Crosshair,
    /// A snappable element is under the pointer.
    Pointer,
}

const TOOLBAR_WIDTH: f64 = 280.0;
const TOOLBAR_HEIGHT: f64 = 48.0;

pub struct FeedbackWidget<P: Page, S: DrawSurface> {
    options: WidgetOptions,
    page: P,
    surface: S,
    capture: Box<dyn Capture + Send>,
    painter: MaskPainter,
    state: WidgetState,
    helpers: HelperStore,
    area: Option<Area>,
    candidate: Option<Rect>,
    cursor: Cursor,
    toolbar: ToolbarDrag,
    toolbar_base: Rect,
    screenshot: Option<Screenshot>,
    submission: SubmissionController,
    description: String,
}

impl<P: Page, S: DrawSurface> FeedbackWidget<P, S> {
    /// Layers the widget itself stacks over the page: the overlay canvas,
    /// the helper layer, and the widget root. Page backends that see the
    /// mounted overlay in their hit stacks report this depth; the HTML
    /// backend reports zero.
    pub const OVERLAY_LAYERS: usize = 3;

    pub fn new(
        page: P,
        surface: S,
        capture: Box<dyn Capture + Send>,
        options: WidgetOptions,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&options.background_opacity) {
            return Err(Error::ConfigError(format!(
                "background_opacity must be within 0..=1, got {}",
                options.background_opacity
            )));
        }
        if options.min_helper_size <= 0.0 {
            return Err(Error::ConfigError("min_helper_size must be positive".into()));
        }

        let painter = MaskPainter::new(
            options.background_opacity,
            options.line_width,
            options.min_helper_size,
        );
        let submission = SubmissionController::new(&options.endpoint, options.timeout_ms)?;

        Ok(Self {
            options,
            page,
            surface,
            capture,
            painter,
            state: WidgetState::default(),
            helpers: HelperStore::new(),
            area: None,
            candidate: None,
            cursor: Cursor::Default,
            toolbar: ToolbarDrag::new(),
            toolbar_base: Rect::new(0.0, 0.0, TOOLBAR_WIDTH, TOOLBAR_HEIGHT),
            screenshot: None,
            submission,
            description: String::new(),
        })
    }

    // --- accessors ---

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.open
    }

    pub fn options(&self) -> &WidgetOptions {
        &self.options
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn helpers(&self) -> &HelperStore {
        &self.helpers
    }

    pub fn candidate(&self) -> Option<Rect> {
        self.candidate
    }

    pub fn page(&self) -> &P {
        &self.page
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn screenshot(&self) -> Option<&Screenshot> {
        self.screenshot.as_ref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, text: &str) {
        self.description = text.to_string();
    }

    pub fn submit_status(&self) -> SubmitStatus {
        self.submission.status()
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submission.last_error()
    }

    pub fn view(&self) -> View {
        match self.submission.status() {
            SubmitStatus::Sending => View::Sending,
            SubmitStatus::Sent => View::Sent,
            SubmitStatus::Error => View::Error,
            SubmitStatus::Idle => {
                if self.state.can_draw {
                    View::Drawing
                } else {
                    View::Form
                }
            }
        }
    }

    // --- lifecycle ---

    /// Mount the overlay: size the surface to the full scrollable page,
    /// paint the initial veil, and (when enabled) capture the first
    /// screenshot preview.
    pub fn open(&mut self) {
        if self.state.open {
            return;
        }
        self.state.open = true;
        self.sync_surface_size();
        self.repaint();
        if self.state.include_screenshot {
            self.refresh_screenshot();
        }
    }

    /// Tear everything down and reset to the initial state. Safe to call
    /// at any time; in-flight capture or submission completions are
    /// ignored afterwards.
    pub fn close(&mut self) {
        if !self.state.open {
            return;
        }
        self.state = WidgetState::default();
        self.helpers.clear();
        self.area = None;
        self.candidate = None;
        self.cursor = Cursor::Default;
        self.toolbar.reset();
        self.screenshot = None;
        self.description.clear();
        self.submission.reset();
    }

    /// Escape closes the widget unconditionally while open.
    pub fn key_down(&mut self, key: &str) {
        if key == "Escape" && self.state.open {
            self.close();
        }
    }

    /// The page viewport changed: re-size the overlay and repaint.
    pub fn on_resize(&mut self) {
        if !self.state.open {
            return;
        }
        self.sync_surface_size();
        self.repaint();
    }

    // --- draw mode ---

    /// Enter draw mode: the form hides, the canvas activates and the
    /// floating toolbar appears centered in the viewport.
    pub fn open_drawer(&mut self) {
        if !self.state.open || self.state.can_draw {
            return;
        }
        self.state.can_draw = true;
        let m = self.page.metrics();
        self.toolbar_base = Rect::new(
            (m.client_width - TOOLBAR_WIDTH) / 2.0,
            (m.client_height - TOOLBAR_HEIGHT) / 2.0,
            TOOLBAR_WIDTH,
            TOOLBAR_HEIGHT,
        );
        self.toolbar.reset();
        self.cursor = Cursor::Crosshair;
        self.repaint();
    }

    /// Leave draw mode and re-capture the screenshot, since the
    /// annotations just changed.
    pub fn close_drawer(&mut self) {
        if !self.state.can_draw {
            return;
        }
        self.state.can_draw = false;
        self.state.drawing = false;
        self.area = None;
        self.candidate = None;
        self.cursor = Cursor::Default;
        if self.state.include_screenshot {
            self.refresh_screenshot();
        } else {
            self.repaint();
        }
    }

    pub fn set_mode(&mut self, kind: HelperKind) {
        self.state.highlight = kind == HelperKind::Highlight;
    }

    pub fn mode(&self) -> HelperKind {
        if self.state.highlight {
            HelperKind::Highlight
        } else {
            HelperKind::Blackout
        }
    }

    /// Toggle screenshot inclusion; turning it on re-captures.
    pub fn toggle_screenshot(&mut self) {
        self.state.include_screenshot = !self.state.include_screenshot;
        if self.state.include_screenshot {
            self.refresh_screenshot();
        } else {
            self.screenshot = None;
        }
    }

    // --- rectangle drawing ---

    /// Pointer down over the canvas: anchor a new rectangle at the pointer
    /// position, converted to page coordinates.
    pub fn draw_start(&mut self, client_x: f64, client_y: f64) {
        if !self.state.can_draw {
            return;
        }
        self.state.drawing = true;
        let m = self.page.metrics();
        self.area = Some(Area::anchored(client_x + m.scroll_x, client_y + m.scroll_y));
    }

    /// Pointer move while drawing: recompute the clamped signed spans and
    /// repaint with the in-progress rectangle.
    pub fn draw_move(&mut self, client_x: f64, client_y: f64) {
        if !self.state.drawing {
            return;
        }
        let m = self.page.metrics();
        let mode = self.mode();
        let Some(area) = self.area.as_mut() else {
            return;
        };
        area.resize_to(client_x + m.scroll_x, client_y + m.scroll_y);
        area.clamp_to_page(m.scroll_width, m.scroll_height, self.painter.line_width());
        let active = ActiveArea::from_drag(*area, mode);
        self.painter.repaint(&mut self.surface, &self.helpers, Some(&active), true);
    }

    /// Pointer up: commit the gesture, or silently discard it when it is
    /// below the minimum size. Returns the committed helper's index.
    pub fn draw_stop(&mut self) -> Option<u64> {
        if !self.state.can_draw {
            return None;
        }
        self.state.drawing = false;
        let area = self.area.take()?;
        let committed = self
            .helpers
            .commit(&area, self.mode(), self.options.min_helper_size)
            .map(|h| h.index);
        self.repaint();
        committed
    }

    // --- element highlighter ---

    /// Pointer move in draw mode while not drawing: probe the page under
    /// the cursor and propose the first whitelisted element as a snap
    /// candidate.
    pub fn pointer_hover(&mut self, client_x: f64, client_y: f64) {
        self.candidate = None;
        if !self.state.can_draw || self.state.drawing {
            return;
        }

        let stack = self.page.hit_stack(client_x, client_y);
        let skip = self
            .options
            .hit_test_skip
            .unwrap_or_else(|| self.page.overlay_depth());
        let Some(hit) = stack.get(skip) else {
            return;
        };

        if !self.options.allowed_tags.iter().any(|t| t == &hit.tag) {
            self.cursor = Cursor::Crosshair;
            self.repaint();
            return;
        }

        self.cursor = Cursor::Pointer;
        self.candidate = Some(hit.rect);
        let active = ActiveArea::from_candidate(hit.rect, self.mode());
        self.painter.repaint(&mut self.surface, &self.helpers, Some(&active), true);
    }

    /// Click while a candidate is active: commit it exactly like a drawn
    /// rectangle.
    pub fn accept_candidate(&mut self) -> Option<u64> {
        if !self.state.can_draw {
            return None;
        }
        let rect = self.candidate.take()?;
        let committed = self
            .helpers
            .commit(&Area::from_rect(&rect), self.mode(), self.options.min_helper_size)
            .map(|h| h.index);
        self.repaint();
        committed
    }

    // --- committed-rectangle affordances ---

    /// Hover enter on a committed rectangle. Blackout rectangles get the
    /// emphasized overlap rendering.
    pub fn hover_helper(&mut self, index: u64) {
        if !self.state.can_draw || self.state.drawing {
            return;
        }
        let Some(helper) = self.helpers.get(index).cloned() else {
            return;
        };
        if helper.kind == HelperKind::Blackout {
            self.painter.repaint_hover(&mut self.surface, &self.helpers, &helper);
        }
    }

    /// Hover leave on a committed rectangle.
    pub fn leave_helper(&mut self, _index: u64) {
        if !self.state.can_draw || self.state.drawing {
            return;
        }
        self.repaint();
    }

    /// Remove a committed rectangle by its stable index.
    pub fn remove_helper(&mut self, index: u64) -> bool {
        let removed = self.helpers.remove(index);
        if removed {
            self.repaint();
        }
        removed
    }

    // --- toolbar drag ---

    pub fn toolbar_drag_start(&mut self, client_x: f64, client_y: f64) {
        if !self.state.can_draw || self.state.dragging {
            return;
        }
        self.state.dragging = true;
        let bounds = self.toolbar_bounds();
        self.toolbar.start(client_x, client_y, bounds, self.page.metrics().viewport());
    }

    pub fn toolbar_drag_move(&mut self, client_x: f64, client_y: f64) {
        if !self.state.dragging {
            return;
        }
        if self.toolbar.drag(client_x, client_y).is_some() {
            self.state.dragged = true;
        }
    }

    pub fn toolbar_drag_stop(&mut self) {
        self.toolbar.stop();
        self.state.dragging = false;
        self.state.dragged = false;
    }

    /// The toolbar's bounding box in viewport coordinates, reflecting the
    /// committed drag transform.
    pub fn toolbar_bounds(&self) -> Rect {
        let offset = self.toolbar.offset();
        Rect::new(
            self.toolbar_base.x + offset.x,
            self.toolbar_base.y + offset.y,
            self.toolbar_base.width,
            self.toolbar_base.height,
        )
    }

    pub fn toolbar_offset(&self) -> Translation {
        self.toolbar.offset()
    }

    // --- screenshot pipeline ---

    /// Re-run the capture collaborator. The mask is repainted without
    /// highlight borders first so they cannot appear in the frame; capture
    /// failure keeps the previous preview.
    pub fn refresh_screenshot(&mut self) {
        self.painter.repaint(&mut self.surface, &self.helpers, None, false);

        let m = self.page.metrics();
        let opts = CaptureOptions::from_metrics(&m, self.options.allow_taint);
        let overlay = self.surface.snapshot_rgba();
        match self.capture.capture(&self.page, overlay.as_ref(), &opts) {
            Ok(shot) => self.screenshot = Some(shot),
            Err(e) => log::warn!("screenshot capture failed, keeping previous preview: {}", e),
        }

        self.repaint();
    }

    // --- submission ---

    /// Transition Idle -> Sending: bundle description, screenshot and page
    /// location into the single POST.
    pub fn submit(&mut self) -> Result<()> {
        if !self.state.open {
            return Err(Error::SubmitError("widget is not open".into()));
        }
        let screenshot = match (&self.screenshot, self.state.include_screenshot) {
            (Some(shot), true) => shot.to_data_url()?,
            _ => String::new(),
        };
        let payload = FeedbackPayload::new(self.description.clone(), screenshot, &self.page.location());
        self.submission.submit(payload)?;
        self.state.sending = true;
        Ok(())
    }

    /// Apply any completed async outcome. Call between events; does
    /// nothing after close.
    pub fn pump(&mut self) {
        if !self.state.open {
            return;
        }
        if let Some(status) = self.submission.poll() {
            self.state.sending = status == SubmitStatus::Sending;
        }
    }

    /// Block until the in-flight submission resolves (CLI and tests).
    pub fn wait_submission(&mut self, timeout: Duration) -> SubmitStatus {
        let status = self.submission.wait(timeout);
        self.state.sending = status == SubmitStatus::Sending;
        status
    }

    /// The error view's "back" action.
    pub fn back_to_form(&mut self) {
        self.submission.back_to_form();
        self.state.sending = false;
    }

    // --- internals ---

    fn sync_surface_size(&mut self) {
        let m = self.page.metrics();
        self.surface.resize(m.scroll_width as u32, m.scroll_height as u32);
    }

    fn repaint(&mut self) {
        self.painter.repaint(&mut self.surface, &self.helpers, None, true);
    }
}
