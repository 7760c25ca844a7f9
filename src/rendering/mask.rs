//! The annotation-surface repaint pipeline.
//!
//! Every repaint is full: reset to the translucent veil, run the highlight
//! pass (border stroke, then a transparent hole per highlight rectangle),
//! then the blackout pass (opaque fill per blackout rectangle). Recomputing
//! from scratch keeps overlap, z-order and removal correct without any
//! incremental patching.

use crate::geometry::{Area, Rect};
use crate::helpers::{Helper, HelperKind, HelperStore};
use crate::rendering::paint::{DrawSurface, PaintCommand, Rgba};

/// The transient rectangle included in a repaint: either the in-progress
/// drag area or an element-snapped candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveArea {
    pub area: Area,
    pub kind: HelperKind,
}

impl ActiveArea {
    pub fn from_drag(area: Area, kind: HelperKind) -> Self {
        Self { area, kind }
    }

    pub fn from_candidate(rect: Rect, kind: HelperKind) -> Self {
        Self { area: Area::from_rect(&rect), kind }
    }
}

/// Paints the mask onto any [`DrawSurface`].
#[derive(Debug, Clone)]
pub struct MaskPainter {
    veil: Rgba,
    border: Rgba,
    blackout: Rgba,
    live_blackout: Rgba,
    hover_blackout: Rgba,
    line_width: f64,
    min_span: f64,
}

impl MaskPainter {
    /// `background_opacity` is the configured veil opacity in `0..=1`;
    /// `line_width` doubles as the highlight border width and the
    /// page-clamp margin; `min_span` is the visible-size threshold for
    /// transient rectangles.
    pub fn new(background_opacity: f64, line_width: f64, min_span: f64) -> Self {
        let veil_alpha = (background_opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self {
            veil: (102, 102, 102, veil_alpha),
            border: (255, 235, 59, 255),
            blackout: (0, 0, 0, 255),
            live_blackout: (0, 0, 0, 128),
            hover_blackout: (0, 0, 0, 191),
            line_width,
            min_span,
        }
    }

    pub fn line_width(&self) -> f64 {
        self.line_width
    }

    /// Full repaint. `active` carries the in-progress or candidate
    /// rectangle, if any; `with_borders` is false only for the
    /// pre-capture repaint (borders must not end up in the screenshot).
    pub fn repaint<S: DrawSurface + ?Sized>(
        &self,
        surface: &mut S,
        helpers: &HelperStore,
        active: Option<&ActiveArea>,
        with_borders: bool,
    ) {
        surface.apply(&PaintCommand::Reset { rgba: self.veil });

        if with_borders {
            for helper in helpers.highlights() {
                self.stroke(surface, &helper.rect);
            }
        }

        let live = active.filter(|a| a.area.exceeds(self.min_span));

        if let Some(a) = live.filter(|a| a.kind == HelperKind::Highlight) {
            self.stroke(surface, &a.area.normalized());
            self.clear_area(surface, &a.area);
        }

        for helper in helpers.highlights() {
            surface.apply(&PaintCommand::ClearRect {
                x: helper.rect.x,
                y: helper.rect.y,
                width: helper.rect.width,
                height: helper.rect.height,
            });
        }

        for helper in helpers.blackouts() {
            self.fill_rect(surface, &helper.rect, self.blackout);
        }

        if let Some(a) = live.filter(|a| a.kind == HelperKind::Blackout) {
            surface.apply(&PaintCommand::FillRect {
                x: a.area.start_x,
                y: a.area.start_y,
                width: a.area.width,
                height: a.area.height,
                rgba: self.live_blackout,
            });
        }
    }

    /// Hover emphasis for a blackout helper: the hovered rectangle is
    /// re-rendered semi-opaque so its overlap with the page shows through,
    /// while every other blackout stays fully opaque.
    pub fn repaint_hover<S: DrawSurface + ?Sized>(
        &self,
        surface: &mut S,
        helpers: &HelperStore,
        hovered: &Helper,
    ) {
        surface.apply(&PaintCommand::Reset { rgba: self.veil });

        for helper in helpers.highlights() {
            self.stroke(surface, &helper.rect);
        }
        for helper in helpers.highlights() {
            surface.apply(&PaintCommand::ClearRect {
                x: helper.rect.x,
                y: helper.rect.y,
                width: helper.rect.width,
                height: helper.rect.height,
            });
        }

        surface.apply(&PaintCommand::ClearRect {
            x: hovered.rect.x,
            y: hovered.rect.y,
            width: hovered.rect.width,
            height: hovered.rect.height,
        });
        self.fill_rect(surface, &hovered.rect, self.hover_blackout);

        for helper in helpers.blackouts().filter(|h| h.index != hovered.index) {
            self.fill_rect(surface, &helper.rect, self.blackout);
        }
    }

    fn stroke<S: DrawSurface + ?Sized>(&self, surface: &mut S, rect: &Rect) {
        surface.apply(&PaintCommand::StrokeRect {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            line_width: self.line_width,
            rgba: self.border,
        });
    }

    fn clear_area<S: DrawSurface + ?Sized>(&self, surface: &mut S, area: &Area) {
        surface.apply(&PaintCommand::ClearRect {
            x: area.start_x,
            y: area.start_y,
            width: area.width,
            height: area.height,
        });
    }

    fn fill_rect<S: DrawSurface + ?Sized>(&self, surface: &mut S, rect: &Rect, rgba: Rgba) {
        surface.apply(&PaintCommand::FillRect {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            rgba,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rendering::paint::Recorder;
    use crate::rendering::raster::RasterSurface;

    fn store_with(helpers: &[(f64, f64, f64, f64, HelperKind)]) -> HelperStore {
        let mut store = HelperStore::new();
        for &(x, y, w, h, kind) in helpers {
            let mut area = Area::anchored(x, y);
            area.resize_to(x + w, y + h);
            store.commit(&area, kind, 6.0).unwrap();
        }
        store
    }

    #[test]
    fn repaint_orders_veil_borders_holes_blackouts() {
        let painter = MaskPainter::new(0.5, 4.0, 6.0);
        let store = store_with(&[
            (10.0, 10.0, 40.0, 40.0, HelperKind::Highlight),
            (100.0, 100.0, 40.0, 40.0, HelperKind::Blackout),
        ]);
        let mut rec = Recorder::new(300, 300);
        painter.repaint(&mut rec, &store, None, true);

        assert!(matches!(rec.commands[0], PaintCommand::Reset { rgba: (102, 102, 102, 128) }));
        assert!(matches!(rec.commands[1], PaintCommand::StrokeRect { .. }));
        assert!(matches!(rec.commands[2], PaintCommand::ClearRect { .. }));
        assert!(matches!(rec.commands[3], PaintCommand::FillRect { rgba: (0, 0, 0, 255), .. }));
        assert_eq!(rec.commands.len(), 4);
    }

    #[test]
    fn capture_repaint_has_no_borders() {
        let painter = MaskPainter::new(0.5, 4.0, 6.0);
        let store = store_with(&[(10.0, 10.0, 40.0, 40.0, HelperKind::Highlight)]);
        let mut rec = Recorder::new(300, 300);
        painter.repaint(&mut rec, &store, None, false);
        assert!(!rec.commands.iter().any(|c| matches!(c, PaintCommand::StrokeRect { .. })));
        assert!(rec.commands.iter().any(|c| matches!(c, PaintCommand::ClearRect { .. })));
    }

    #[test]
    fn sub_threshold_active_area_is_not_painted() {
        let painter = MaskPainter::new(0.5, 4.0, 6.0);
        let store = HelperStore::new();
        let mut area = Area::anchored(10.0, 10.0);
        area.resize_to(14.0, 14.0);
        let mut rec = Recorder::new(100, 100);
        painter.repaint(
            &mut rec,
            &store,
            Some(&ActiveArea::from_drag(area, HelperKind::Highlight)),
            true,
        );
        assert_eq!(rec.commands.len(), 1);
    }

    #[test]
    fn highlight_pixels_cut_through_the_veil() {
        let painter = MaskPainter::new(0.5, 4.0, 6.0);
        let store = store_with(&[(20.0, 20.0, 30.0, 30.0, HelperKind::Highlight)]);
        let mut surface = RasterSurface::new(100, 100);
        painter.repaint(&mut surface, &store, None, true);

        // Inside the highlight: fully transparent window.
        assert_eq!(surface.pixel(35, 35), (0, 0, 0, 0));
        // Away from it: the veil.
        assert_eq!(surface.pixel(80, 80), (102, 102, 102, 128));
        // On the border ring (stroke extends half a line width outward).
        assert_eq!(surface.pixel(18, 35), (255, 235, 59, 255));
    }

    #[test]
    fn blackout_pixels_are_opaque() {
        let painter = MaskPainter::new(0.5, 4.0, 6.0);
        let store = store_with(&[(10.0, 10.0, 20.0, 20.0, HelperKind::Blackout)]);
        let mut surface = RasterSurface::new(64, 64);
        painter.repaint(&mut surface, &store, None, true);
        assert_eq!(surface.pixel(15, 15), (0, 0, 0, 255));
    }

    #[test]
    fn hover_softens_only_the_hovered_blackout() {
        let painter = MaskPainter::new(0.5, 4.0, 6.0);
        let store = store_with(&[
            (10.0, 10.0, 20.0, 20.0, HelperKind::Blackout),
            (40.0, 40.0, 20.0, 20.0, HelperKind::Blackout),
        ]);
        let hovered = store.get(0).unwrap().clone();
        let mut surface = RasterSurface::new(80, 80);
        painter.repaint_hover(&mut surface, &store, &hovered);
        assert_eq!(surface.pixel(15, 15), (0, 0, 0, 191));
        assert_eq!(surface.pixel(45, 45), (0, 0, 0, 255));
    }

    #[test]
    fn live_blackout_area_is_semi_opaque_over_the_veil() {
        let painter = MaskPainter::new(0.5, 4.0, 6.0);
        let store = HelperStore::new();
        let mut area = Area::anchored(10.0, 10.0);
        area.resize_to(40.0, 40.0);
        let mut surface = RasterSurface::new(64, 64);
        painter.repaint(
            &mut surface,
            &store,
            Some(&ActiveArea::from_drag(area, HelperKind::Blackout)),
            true,
        );
        let (_, _, _, alpha) = surface.pixel(20, 20);
        assert!(alpha > 128 && alpha < 255);
    }
}
