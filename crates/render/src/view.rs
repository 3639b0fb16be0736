//! Pan/zoom/rotation state of one editing session
//!
//! Zoom is source pixels per canvas pixel. The image region window lives in
//! source-image space; the viewport is its rotated footprint on the canvas,
//! anchored at the canvas origin.

use geometry::{
    Point, Rect, Size, clamp_window, normalize_rect, project_to_background_orientation,
    project_to_screen_orientation, rect, rotate_point, rotate_size, rotated_size, scale_points,
    translate_points, unrotate_and_clamp_points, zoom_in_step, zoom_out_step,
};
use scrim_config::ZoomConfig;

const ZOOM_EPSILON: f64 = 1e-9;

/// Zoom level at which the rotated image exactly fits the canvas
pub fn max_zoom_for(canvas: Size, image: Size, angle: f64) -> f64 {
    if canvas.is_empty() || image.is_empty() {
        return 1.0;
    }
    let rotated = rotate_size(angle, image);
    (rotated.width / canvas.width).max(rotated.height / canvas.height)
}

/// Affine map from canvas pixels to source pixels:
/// `image = origin + canvas.x * du + canvas.y * dv`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasToImage {
    pub origin: Point,
    pub du: Point,
    pub dv: Point,
}

impl CanvasToImage {
    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.origin.x + x * self.du.x + y * self.dv.x,
            self.origin.y + x * self.du.y + y * self.dv.y,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    canvas: Size,
    image: Size,
    angle: f64,
    zoom: f64,
    max_zoom: f64,
    min_zoom: f64,
    step: f64,
    window: Rect,
    viewport: Rect,
}

impl ViewState {
    /// Fully zoomed out, whole image visible
    pub fn new(canvas: Size, image: Size, angle: f64, zoom: &ZoomConfig) -> Self {
        let max_zoom = max_zoom_for(canvas, image, angle);
        let mut view = Self {
            canvas,
            image,
            angle,
            zoom: max_zoom,
            max_zoom,
            min_zoom: zoom.min_zoom,
            step: zoom.step,
            window: Rect::from_size(image),
            viewport: Rect::default(),
        };
        view.window = clamp_window(view.window, image);
        view.update_viewport();
        view
    }

    pub fn canvas(&self) -> Size {
        self.canvas
    }

    pub fn image(&self) -> Size {
        self.image
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn max_zoom(&self) -> f64 {
        self.max_zoom
    }

    pub fn window(&self) -> Rect {
        self.window
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Lowest zoom allowed; images smaller than the floor stay at max
    pub fn zoom_floor(&self) -> f64 {
        self.min_zoom.min(self.max_zoom)
    }

    pub fn is_fully_zoomed_out(&self) -> bool {
        (self.zoom - self.max_zoom).abs() <= ZOOM_EPSILON
    }

    /// Canvas resized. Keeps the window centre; a fully zoomed out view
    /// stays fully zoomed out.
    pub fn resize(&mut self, canvas: Size) {
        self.canvas = canvas;
        self.rebound();
    }

    pub fn set_angle(&mut self, angle: f64) {
        self.angle = angle;
        self.rebound();
    }

    /// One step in, keeping the image point under `anchor` in place
    pub fn zoom_in(&mut self, anchor: Point) -> bool {
        let next = zoom_in_step(self.zoom, self.step, self.zoom_floor());
        self.zoom_about(next, anchor)
    }

    /// One step out, keeping the image point under `anchor` in place
    pub fn zoom_out(&mut self, anchor: Point) -> bool {
        let next = zoom_out_step(self.zoom, self.step, self.max_zoom);
        self.zoom_about(next, anchor)
    }

    /// Set zoom keeping the image point under `anchor` fixed on screen.
    /// The anchor may lie outside the viewport; only the resulting window is
    /// clamped. Returns false if the clamped zoom did not change.
    pub fn zoom_about(&mut self, zoom: f64, anchor: Point) -> bool {
        let zoom = zoom.clamp(self.zoom_floor(), self.max_zoom);
        if (zoom - self.zoom).abs() <= ZOOM_EPSILON {
            return false;
        }

        let world = self.unclamped(anchor.x, anchor.y);
        self.zoom = zoom;
        let size = self.window_size_for(zoom);
        self.window = Rect::new(self.window.x, self.window.y, size.width, size.height);
        self.update_viewport();

        let moved = self.unclamped(anchor.x, anchor.y);
        self.window.x += world.x - moved.x;
        self.window.y += world.y - moved.y;
        self.window = clamp_window(self.window, self.image);
        self.update_viewport();
        true
    }

    /// Pan by a canvas-space delta. The window moves opposite to the drag.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        let (rx, ry) = rotate_point(-self.angle, dx, dy);
        self.window.x -= rx * self.zoom;
        self.window.y -= ry * self.zoom;
        self.window = clamp_window(self.window, self.image);
        self.update_viewport();
    }

    /// Show `window` (source-image space) as large as the canvas allows.
    /// Used by the remote display; zoom may go below the editor floor.
    pub fn fit_window(&mut self, window: Rect) {
        self.window = clamp_window(window, self.image);
        let rotated = rotate_size(self.angle, self.window.size());
        let zoom = if self.canvas.is_empty() {
            0.0
        } else {
            (rotated.width / self.canvas.width).max(rotated.height / self.canvas.height)
        };
        self.zoom = if zoom > 0.0 { zoom } else { self.max_zoom };
        self.update_viewport();
    }

    /// Canvas point (clamped to the viewport) in window space, scaled to
    /// source pixels but not yet offset by the window origin
    pub fn canvas_to_window(&self, point: Point) -> Point {
        let unrotated = unrotate_and_clamp_points(self.angle, &self.viewport, self.canvas, &[point]);
        scale_points(&unrotated, self.zoom)[0]
    }

    /// Canvas point (clamped to the viewport) in full-image coordinates
    pub fn canvas_to_image(&self, point: Point) -> Point {
        let local = self.canvas_to_window(point);
        translate_points(&[local], self.window.x, self.window.y)[0]
    }

    /// Full-image point on the canvas
    pub fn image_to_canvas(&self, point: Point) -> Point {
        let (ow, oh) = rotated_size(self.angle, self.viewport.width, self.viewport.height);
        let local = project_to_screen_orientation(
            self.angle,
            (point.x - self.window.x) / self.zoom,
            (point.y - self.window.y) / self.zoom,
            ow,
            oh,
            self.viewport.width,
            self.viewport.height,
        );
        Point::new(local.x + self.viewport.x, local.y + self.viewport.y)
    }

    /// Canvas-space rect as a normalized full-image rect
    pub fn canvas_rect_to_image(&self, canvas_rect: Rect) -> Rect {
        let r = normalize_rect(canvas_rect);
        let a = self.canvas_to_image(Point::new(r.x, r.y));
        let b = self.canvas_to_image(Point::new(r.right(), r.bottom()));
        rect(a.x, a.y, b.x, b.y)
    }

    /// Unclamped affine canvas → image map for rendering
    pub fn canvas_to_image_affine(&self) -> CanvasToImage {
        let origin = self.unclamped(0.0, 0.0);
        let u = self.unclamped(1.0, 0.0);
        let v = self.unclamped(0.0, 1.0);
        CanvasToImage {
            origin,
            du: Point::new(u.x - origin.x, u.y - origin.y),
            dv: Point::new(v.x - origin.x, v.y - origin.y),
        }
    }

    fn unclamped(&self, x: f64, y: f64) -> Point {
        let vp = self.viewport;
        let (ow, oh) = rotated_size(self.angle, vp.width, vp.height);
        let p = project_to_background_orientation(
            self.angle,
            x - vp.x,
            y - vp.y,
            vp.width,
            vp.height,
            ow,
            oh,
        );
        Point::new(
            p.x * self.zoom + self.window.x,
            p.y * self.zoom + self.window.y,
        )
    }

    /// Source-space window that fills the canvas at `zoom`, limited to the image
    fn window_size_for(&self, zoom: f64) -> Size {
        let visible = rotate_size(
            self.angle,
            Size::new(self.canvas.width * zoom, self.canvas.height * zoom),
        );
        Size::new(
            visible.width.min(self.image.width),
            visible.height.min(self.image.height),
        )
    }

    fn update_viewport(&mut self) {
        let rotated = rotate_size(self.angle, self.window.size());
        self.viewport = if self.zoom > 0.0 {
            Rect::new(0.0, 0.0, rotated.width / self.zoom, rotated.height / self.zoom)
        } else {
            Rect::default()
        };
    }

    fn rebound(&mut self) {
        let at_max = self.is_fully_zoomed_out();
        let center = self.window.center();
        self.max_zoom = max_zoom_for(self.canvas, self.image, self.angle);
        self.zoom = if at_max {
            self.max_zoom
        } else {
            self.zoom.clamp(self.zoom_floor(), self.max_zoom)
        };

        let size = self.window_size_for(self.zoom);
        self.window = clamp_window(
            Rect::new(
                center.x - size.width / 2.0,
                center.y - size.height / 2.0,
                size.width,
                size.height,
            ),
            self.image,
        );
        self.update_viewport();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANGLES: [f64; 4] = [0.0, 90.0, 180.0, 270.0];

    fn view(canvas: (f64, f64), image: (f64, f64), angle: f64) -> ViewState {
        ViewState::new(
            Size::new(canvas.0, canvas.1),
            Size::new(image.0, image.1),
            angle,
            &ZoomConfig::default(),
        )
    }

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6
    }

    fn assert_window_inside(v: &ViewState) {
        let w = v.window();
        assert!(w.x >= 0.0 && w.y >= 0.0, "{w:?}");
        assert!(w.right() <= v.image().width + 1e-9, "{w:?}");
        assert!(w.bottom() <= v.image().height + 1e-9, "{w:?}");
    }

    #[test]
    fn test_initial_view_is_fully_zoomed_out() {
        let v = view((1000.0, 800.0), (4000.0, 3000.0), 0.0);
        assert_eq!(v.max_zoom(), 4.0);
        assert_eq!(v.zoom(), 4.0);
        assert_eq!(v.window(), Rect::new(0.0, 0.0, 4000.0, 3000.0));
        assert_eq!(v.viewport(), Rect::new(0.0, 0.0, 1000.0, 750.0));
    }

    #[test]
    fn test_rotation_swaps_long_axis() {
        let v = view((1000.0, 800.0), (4000.0, 3000.0), 90.0);
        assert_eq!(v.max_zoom(), 5.0);
        assert_eq!(v.viewport(), Rect::new(0.0, 0.0, 600.0, 800.0));
    }

    #[test]
    fn test_zoom_in_steps_down_to_floor() {
        let mut v = view((1000.0, 800.0), (4000.0, 3000.0), 0.0);
        let mut seen = Vec::new();
        while v.zoom_in(Point::new(500.0, 400.0)) {
            seen.push(v.zoom());
        }
        assert_eq!(seen, vec![3.5, 3.0, 2.5, 2.0, 1.5, 1.0, 0.5]);
        assert_window_inside(&v);
    }

    #[test]
    fn test_zoom_out_returns_to_max() {
        let mut v = view((1000.0, 800.0), (4300.0, 3000.0), 0.0);
        assert_eq!(v.max_zoom(), 4.3);
        v.zoom_in(Point::new(0.0, 0.0));
        assert_eq!(v.zoom(), 4.0);
        v.zoom_in(Point::new(0.0, 0.0));
        assert_eq!(v.zoom(), 3.5);
        v.zoom_out(Point::new(0.0, 0.0));
        v.zoom_out(Point::new(0.0, 0.0));
        assert!(v.is_fully_zoomed_out());
        assert!(!v.zoom_out(Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_zoom_keeps_anchor_fixed() {
        let mut v = view((1000.0, 800.0), (4000.0, 3000.0), 0.0);
        v.zoom_about(2.0, Point::new(500.0, 400.0));
        let anchor = Point::new(300.0, 200.0);
        let before = v.canvas_to_image(anchor);
        v.zoom_in(anchor);
        assert_eq!(v.zoom(), 1.5);
        assert!(close(v.canvas_to_image(anchor), before));
    }

    #[test]
    fn test_zoom_about_letterbox_point() {
        // Viewport is 1000x750; (500, 790) is below the image
        let mut v = view((1000.0, 800.0), (4000.0, 3000.0), 0.0);
        assert!(v.zoom_about(2.0, Point::new(500.0, 790.0)));
        assert_eq!(v.window(), Rect::new(1000.0, 1400.0, 2000.0, 1600.0));
        assert_window_inside(&v);

        // Right of a 500x1000 viewport: the anchor's image row stays put
        let mut v = view((1000.0, 1000.0), (2000.0, 4000.0), 0.0);
        assert!(v.zoom_about(3.0, Point::new(800.0, 300.0)));
        assert_eq!(v.window(), Rect::new(0.0, 300.0, 2000.0, 3000.0));
        assert_window_inside(&v);
    }

    #[test]
    fn test_small_image_never_zooms_past_max() {
        let mut v = view((1000.0, 800.0), (200.0, 100.0), 0.0);
        assert_eq!(v.max_zoom(), 0.2);
        assert_eq!(v.zoom_floor(), 0.2);
        assert!(!v.zoom_in(Point::new(10.0, 10.0)));
    }

    #[test]
    fn test_canvas_image_round_trip() {
        for angle in ANGLES {
            for zoom in [0.5, 1.0, 2.0] {
                let mut v = view((1000.0, 800.0), (4000.0, 3000.0), angle);
                v.zoom_about(zoom, Point::new(400.0, 300.0));
                assert_eq!(v.zoom(), zoom);
                for p in [
                    Point::new(0.0, 0.0),
                    Point::new(123.0, 456.0),
                    Point::new(999.0, 799.0),
                ] {
                    let image = v.canvas_to_image(p);
                    let back = v.image_to_canvas(image);
                    assert!(close(back, p), "angle {angle} zoom {zoom}: {p:?} -> {back:?}");
                }
            }
        }
    }

    #[test]
    fn test_affine_matches_point_mapping() {
        for angle in ANGLES {
            let mut v = view((640.0, 480.0), (1600.0, 1200.0), angle);
            v.zoom_about(1.0, Point::new(100.0, 100.0));
            let affine = v.canvas_to_image_affine();
            let p = Point::new(37.0, 211.0);
            let (x, y) = affine.apply(p.x, p.y);
            assert!(close(Point::new(x, y), v.canvas_to_image(p)), "angle {angle}");
        }
    }

    #[test]
    fn test_pan_is_clamped_to_image() {
        for angle in ANGLES {
            let mut v = view((1000.0, 800.0), (4000.0, 3000.0), angle);
            v.zoom_about(1.0, Point::new(0.0, 0.0));
            for (dx, dy) in [
                (5000.0, 0.0),
                (-12000.0, 300.0),
                (17.0, -9000.0),
                (0.5, 0.25),
                (9000.0, 9000.0),
            ] {
                v.pan_by(dx, dy);
                assert_window_inside(&v);
            }
        }
    }

    #[test]
    fn test_pan_follows_drag() {
        let mut v = view((1000.0, 800.0), (4000.0, 3000.0), 0.0);
        v.zoom_about(1.0, Point::new(500.0, 400.0));
        let before = v.window();
        v.pan_by(-10.0, -20.0);
        assert_eq!(v.window().x, before.x + 10.0);
        assert_eq!(v.window().y, before.y + 20.0);

        // Rotated: dragging right on screen moves along the image's y axis
        let mut v = view((1000.0, 800.0), (4000.0, 3000.0), 90.0);
        v.zoom_about(1.0, Point::new(500.0, 400.0));
        let before = v.window();
        v.pan_by(10.0, 0.0);
        assert_eq!(v.window().x, before.x);
        assert_eq!(v.window().y, before.y + 10.0);
    }

    #[test]
    fn test_resize_keeps_center_and_max() {
        let mut v = view((1000.0, 800.0), (4000.0, 3000.0), 0.0);
        v.resize(Size::new(2000.0, 1500.0));
        assert!(v.is_fully_zoomed_out());
        assert_eq!(v.max_zoom(), 2.0);

        v.zoom_about(1.0, Point::new(1000.0, 750.0));
        let center = v.window().center();
        v.resize(Size::new(1000.0, 1000.0));
        assert_eq!(v.zoom(), 1.0);
        assert!(close(v.window().center(), center));
    }

    #[test]
    fn test_canvas_rect_to_image_normalizes() {
        let mut v = view((1000.0, 800.0), (4000.0, 3000.0), 0.0);
        v.zoom_about(1.0, Point::new(0.0, 0.0));
        let r = v.canvas_rect_to_image(Rect::new(110.0, 60.0, -100.0, -50.0));
        assert_eq!(r, Rect::new(10.0, 10.0, 100.0, 50.0));
    }

    #[test]
    fn test_fit_window_fills_canvas() {
        let mut v = view((1600.0, 900.0), (4000.0, 3000.0), 0.0);
        v.fit_window(Rect::new(1000.0, 1000.0, 1600.0, 900.0));
        assert_eq!(v.zoom(), 1.0);
        assert_eq!(v.viewport(), Rect::new(0.0, 0.0, 1600.0, 900.0));
    }
}
