//! Rasters and view state of one loaded scene

use geometry::{Point, Rect, rect};
use painting::{BlendMode, DabOutput, Raster, Rgba, TRANSPARENT};
use tracing::debug;

use crate::canvas::CanvasSet;
use crate::render::render_layer;
use crate::view::ViewState;

/// Outline width of the selection box in canvas pixels
const SELECTION_THICKNESS: i64 = 2;

/// Colour and opacity applied by brush strokes
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PaintStyle {
    pub colour: Rgba,
    pub opacity: f32,
    pub blend_mode: BlendMode,
}

/// An in-progress pan or select drag
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Drag {
    pub gesture: scrim_ipc::Gesture,
    pub start: Point,
    pub end: Point,
    /// Pointer position already applied to the pan
    pub last_anim: Point,
}

impl Drag {
    pub fn new(gesture: scrim_ipc::Gesture, at: Point) -> Self {
        Self {
            gesture,
            start: at,
            end: at,
            last_anim: at,
        }
    }

    pub fn selection(&self) -> Rect {
        rect(self.start.x, self.start.y, self.end.x, self.end.y)
    }
}

pub(crate) struct Session {
    /// Full-resolution source
    pub background: Raster,
    /// Full-resolution overlay, the state that gets persisted
    pub overlay: Raster,
    /// Last committed visible overlay, restored before previews
    pub snapshot: Raster,
    pub view: ViewState,
    pub background_ref: String,
    pub overlay_ref: Option<String>,
}

impl Session {
    /// Redraw both canvases from the full-resolution rasters and commit the
    /// visible overlay as the new snapshot
    pub fn render_all(&mut self, canvases: &mut CanvasSet) {
        self.render_background(canvases);
        self.render_overlay(canvases);
    }

    pub fn render_background(&self, canvases: &mut CanvasSet) {
        render_layer(&self.background, canvases.background.raster_mut(), &self.view);
        canvases.background.present();
    }

    pub fn render_overlay(&mut self, canvases: &mut CanvasSet) {
        self.draw_overlay(canvases);
        self.commit_snapshot(canvases);
    }

    /// Redraw the visible overlay without touching the snapshot
    pub fn draw_overlay(&self, canvases: &mut CanvasSet) {
        render_layer(&self.overlay, canvases.overlay.raster_mut(), &self.view);
        canvases.overlay.present();
    }

    pub fn commit_snapshot(&mut self, canvases: &CanvasSet) {
        let visible = canvases.overlay.raster();
        if !self.snapshot.copy_from(visible) {
            self.snapshot = visible.clone();
        }
    }

    /// Throw away previews drawn since the last commit
    pub fn restore_snapshot(&self, canvases: &mut CanvasSet) {
        let visible = canvases.overlay.raster_mut();
        if !visible.copy_from(&self.snapshot) {
            debug!("Session::restore_snapshot: size changed, redrawing overlay");
            self.draw_overlay(canvases);
        }
    }

    /// Stamp brush dabs on the visible overlay and, mapped into image
    /// space, on the full-resolution overlay
    pub fn stamp(&mut self, canvases: &mut CanvasSet, dabs: &[DabOutput], style: PaintStyle) {
        let zoom = self.view.zoom() as f32;
        let visible = canvases.overlay.raster_mut();
        for dab in dabs {
            visible.apply_dab(
                dab.x,
                dab.y,
                dab.radius,
                style.colour,
                style.opacity,
                dab.hardness,
                style.blend_mode,
            );
            let at = self.view.canvas_to_image(Point::new(dab.x as f64, dab.y as f64));
            self.overlay.apply_dab(
                at.x as f32,
                at.y as f32,
                dab.radius * zoom,
                style.colour,
                style.opacity,
                dab.hardness,
                style.blend_mode,
            );
        }
        canvases.overlay.present();
    }

    /// Translucent brush outline on top of the committed overlay
    pub fn draw_preview(
        &self,
        canvases: &mut CanvasSet,
        at: Point,
        radius: f32,
        hardness: f32,
        colour: Rgba,
        opacity: f32,
    ) {
        self.restore_snapshot(canvases);
        canvases.overlay.raster_mut().apply_dab(
            at.x as f32,
            at.y as f32,
            radius,
            colour,
            opacity,
            hardness,
            BlendMode::Normal,
        );
        canvases.overlay.present();
    }

    /// Selection box on top of the committed overlay
    pub fn draw_selection(&self, canvases: &mut CanvasSet, selection: Rect, colour: Rgba) {
        self.restore_snapshot(canvases);
        canvases.overlay.raster_mut().stroke_rect(
            selection.x.round() as i64,
            selection.y.round() as i64,
            selection.width.round() as i64,
            selection.height.round() as i64,
            SELECTION_THICKNESS,
            colour,
            1.0,
        );
        canvases.overlay.present();
    }

    /// Apply the pointer movement since the last pan frame.
    /// Returns false if the pointer has not moved.
    pub fn pan_step(&mut self, canvases: &mut CanvasSet, drag: &mut Drag) -> bool {
        let dx = drag.end.x - drag.last_anim.x;
        let dy = drag.end.y - drag.last_anim.y;
        if dx == 0.0 && dy == 0.0 {
            return false;
        }
        self.view.pan_by(dx, dy);
        drag.last_anim = drag.end;
        self.render_background(canvases);
        self.draw_overlay(canvases);
        true
    }

    /// Fill (`Some(colour)`) or clear (`None`) a canvas rect on the
    /// full-resolution overlay, then redraw and commit the visible overlay.
    /// Returns false if the rect missed the image.
    pub fn apply_rect(&mut self, canvases: &mut CanvasSet, canvas_rect: Rect, fill: Option<Rgba>) -> bool {
        self.restore_snapshot(canvases);
        let area = self.view.canvas_rect_to_image(canvas_rect);
        let x0 = area.x.floor() as i64;
        let y0 = area.y.floor() as i64;
        let x1 = area.right().ceil() as i64;
        let y1 = area.bottom().ceil() as i64;

        let touched = match fill {
            Some(colour) => self.overlay.fill_rect(x0, y0, x1 - x0, y1 - y0, colour),
            None => self.overlay.clear_rect(x0, y0, x1 - x0, y1 - y0),
        };
        debug!(
            "Session::apply_rect: {} ({}, {}) to ({}, {}), touched={}",
            if fill.is_some() { "fill" } else { "clear" },
            x0,
            y0,
            x1,
            y1,
            touched
        );
        if touched {
            self.render_overlay(canvases);
        }
        touched
    }

    /// Blank the full-resolution and visible overlays
    pub fn clear_overlay(&mut self, canvases: &mut CanvasSet) {
        self.overlay.clear(TRANSPARENT);
        canvases.overlay.raster_mut().clear(TRANSPARENT);
        canvases.overlay.present();
        self.commit_snapshot(canvases);
    }
}
