//! Rect, point and size primitives

use serde::{Deserialize, Serialize};

/// A 2-D coordinate in one of the four spaces
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width/height pair
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero or negative
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Axis-aligned rectangle.
///
/// Width and height may be negative while a drag is in progress; run the
/// rect through [`normalize_rect`] before using it for anything else.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rect covering `size` with its origin at (0, 0)
    pub const fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }

    /// Inclusive containment test (edges count as inside)
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Overlap of two normalized rects, `None` when they do not overlap
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 < x0 || y1 < y0 {
            return None;
        }
        Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
    }

    /// Grow or shrink about the centre by `factor`
    pub fn scale_about_center(&self, factor: f64) -> Rect {
        let center = self.center();
        let width = self.width * factor;
        let height = self.height * factor;
        Rect::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }
}

/// Build a normalized rect from two arbitrary corner points
pub fn rect(x1: f64, y1: f64, x2: f64, y2: f64) -> Rect {
    Rect::new(x1.min(x2), y1.min(y2), (x2 - x1).abs(), (y2 - y1).abs())
}

/// Flip a rect with negative extents so width and height are non-negative.
///
/// Idempotent: normalizing an already normalized rect returns it unchanged.
pub fn normalize_rect(r: Rect) -> Rect {
    let mut out = r;
    if out.width < 0.0 {
        out.x += out.width;
        out.width = -out.width;
    }
    if out.height < 0.0 {
        out.y += out.height;
        out.height = -out.height;
    }
    out
}

/// Clamp an image region window so it never extends past the image.
///
/// The window is first shrunk to fit the image on each axis, then shifted
/// back inside `[0, image.width] x [0, image.height]`.
pub fn clamp_window(window: Rect, image: Size) -> Rect {
    let window = normalize_rect(window);
    let width = window.width.min(image.width).max(0.0);
    let height = window.height.min(image.height).max(0.0);
    let x = window.x.min(image.width - width).max(0.0);
    let y = window.y.min(image.height - height).max(0.0);
    Rect::new(x, y, width, height)
}

/// Scale every point by `zoom`
pub fn scale_points(points: &[Point], zoom: f64) -> Vec<Point> {
    points
        .iter()
        .map(|p| Point::new(p.x * zoom, p.y * zoom))
        .collect()
}

/// Offset every point by `(dx, dy)`
pub fn translate_points(points: &[Point], dx: f64, dy: f64) -> Vec<Point> {
    points
        .iter()
        .map(|p| Point::new(p.x + dx, p.y + dy))
        .collect()
}
