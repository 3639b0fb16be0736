//! Quarter-turn rotation helpers
//!
//! Sine and cosine are rounded to -1/0/1, so every helper here is exact for
//! angles in {0, 90, 180, 270} (and their multiples of 360). Any other angle
//! gives a quadrant-rounded result that is not a real rotation; behaviour for
//! such angles is unspecified.

use crate::rect::{Point, Rect, Size, normalize_rect};

/// Rounded (cos, sin) for a quarter-turn angle in degrees
fn quarter_trig(angle_deg: f64) -> (f64, f64) {
    let radians = angle_deg.to_radians();
    (radians.cos().round(), radians.sin().round())
}

/// Normalize an angle into `[0, 360)`
pub fn normalize_angle(angle_deg: f64) -> f64 {
    angle_deg.rem_euclid(360.0)
}

/// Snap an arbitrary angle to the nearest quarter turn in `[0, 360)`
pub fn snap_angle(angle_deg: f64) -> f64 {
    normalize_angle((angle_deg / 90.0).round() * 90.0)
}

/// Rotate a point about the origin.
///
/// Positive angles turn clockwise on a y-down canvas.
pub fn rotate_point(angle_deg: f64, x: f64, y: f64) -> (f64, f64) {
    let (cos, sin) = quarter_trig(angle_deg);
    (x * cos - y * sin, x * sin + y * cos)
}

/// Bounding size of a `w x h` box after rotation (swaps for 90/270)
pub fn rotated_size(angle_deg: f64, w: f64, h: f64) -> (f64, f64) {
    let (rw, rh) = rotate_point(angle_deg, w, h);
    (rw.abs(), rh.abs())
}

/// [`rotated_size`] over a [`Size`]
pub fn rotate_size(angle_deg: f64, size: Size) -> Size {
    let (width, height) = rotated_size(angle_deg, size.width, size.height);
    Size::new(width, height)
}

/// Map a point drawn on a rotated `w x h` frame back into the un-rotated
/// `ow x oh` frame it was produced from.
pub fn project_to_background_orientation(
    angle_deg: f64,
    x: f64,
    y: f64,
    w: f64,
    h: f64,
    ow: f64,
    oh: f64,
) -> Point {
    let (rx, ry) = rotate_point(-angle_deg, x - w / 2.0, y - h / 2.0);
    Point::new(rx + ow / 2.0, ry + oh / 2.0)
}

/// Inverse of [`project_to_background_orientation`]: un-rotated `ow x oh`
/// frame onto the rotated `w x h` frame.
pub fn project_to_screen_orientation(
    angle_deg: f64,
    x: f64,
    y: f64,
    ow: f64,
    oh: f64,
    w: f64,
    h: f64,
) -> Point {
    let (rx, ry) = rotate_point(angle_deg, x - ow / 2.0, y - oh / 2.0);
    Point::new(rx + w / 2.0, ry + h / 2.0)
}

/// Clamp canvas-space points to the visible viewport and project them into
/// window space (un-rotated, not yet scaled by zoom).
///
/// The clamp bounds are the viewport intersected with `canvas`; the
/// projection frame is the viewport itself.
pub fn unrotate_and_clamp_points(
    angle_deg: f64,
    viewport: &Rect,
    canvas: Size,
    points: &[Point],
) -> Vec<Point> {
    let vp = normalize_rect(*viewport);
    let x0 = vp.x.max(0.0);
    let y0 = vp.y.max(0.0);
    let x1 = vp.right().min(canvas.width).max(x0);
    let y1 = vp.bottom().min(canvas.height).max(y0);
    let (ow, oh) = rotated_size(angle_deg, vp.width, vp.height);

    points
        .iter()
        .map(|p| {
            let cx = p.x.max(x0).min(x1);
            let cy = p.y.max(y0).min(y1);
            project_to_background_orientation(
                angle_deg,
                cx - vp.x,
                cy - vp.y,
                vp.width,
                vp.height,
                ow,
                oh,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANGLES: [f64; 4] = [0.0, 90.0, 180.0, 270.0];

    #[test]
    fn test_rotate_point_quarter_turns() {
        assert_eq!(rotate_point(0.0, 3.0, 4.0), (3.0, 4.0));
        assert_eq!(rotate_point(90.0, 3.0, 4.0), (-4.0, 3.0));
        assert_eq!(rotate_point(180.0, 3.0, 4.0), (-3.0, -4.0));
        assert_eq!(rotate_point(270.0, 3.0, 4.0), (4.0, -3.0));
    }

    #[test]
    fn test_rotated_size_swaps_for_odd_quarters() {
        assert_eq!(rotated_size(0.0, 40.0, 30.0), (40.0, 30.0));
        assert_eq!(rotated_size(90.0, 40.0, 30.0), (30.0, 40.0));
        assert_eq!(rotated_size(180.0, 40.0, 30.0), (40.0, 30.0));
        assert_eq!(rotated_size(270.0, 40.0, 30.0), (30.0, 40.0));
    }

    #[test]
    fn test_rotated_size_periodic() {
        for angle in ANGLES {
            for (w, h) in [(4000.0, 3000.0), (1.0, 0.0), (0.0, 0.0), (17.0, 933.0)] {
                assert_eq!(rotated_size(angle, w, h), rotated_size(angle + 360.0, w, h));
            }
        }
    }

    #[test]
    fn test_project_to_background_orientation_corners() {
        // A 40x30 image shown at 90 degrees is a 30x40 frame; the frame's
        // top-left corner is the image's bottom-left corner.
        let p = project_to_background_orientation(90.0, 0.0, 0.0, 30.0, 40.0, 40.0, 30.0);
        assert_eq!(p, Point::new(0.0, 30.0));
        let p = project_to_background_orientation(180.0, 0.0, 0.0, 40.0, 30.0, 40.0, 30.0);
        assert_eq!(p, Point::new(40.0, 30.0));
        let p = project_to_background_orientation(270.0, 0.0, 0.0, 30.0, 40.0, 40.0, 30.0);
        assert_eq!(p, Point::new(40.0, 0.0));
    }

    #[test]
    fn test_projection_round_trip() {
        let (ow, oh) = (40.0, 30.0);
        for angle in ANGLES {
            let (w, h) = rotated_size(angle, ow, oh);
            for (x, y) in [(0.0, 0.0), (3.0, 7.5), (w, h), (w / 2.0, 1.0)] {
                let back = project_to_background_orientation(angle, x, y, w, h, ow, oh);
                let forth = project_to_screen_orientation(angle, back.x, back.y, ow, oh, w, h);
                assert!((forth.x - x).abs() < 1e-9, "angle {angle}");
                assert!((forth.y - y).abs() < 1e-9, "angle {angle}");
            }
        }
    }

    #[test]
    fn test_unrotate_and_clamp_points_clamps_to_viewport() {
        let vp = Rect::new(0.0, 0.0, 100.0, 50.0);
        let out = unrotate_and_clamp_points(
            0.0,
            &vp,
            Size::new(200.0, 200.0),
            &[Point::new(-20.0, 10.0), Point::new(150.0, 80.0)],
        );
        assert_eq!(out, vec![Point::new(0.0, 10.0), Point::new(100.0, 50.0)]);
    }

    #[test]
    fn test_unrotate_and_clamp_points_rotated() {
        // 50x100 viewport shows a 100x50 window turned a quarter clockwise.
        let vp = Rect::new(0.0, 0.0, 50.0, 100.0);
        let out = unrotate_and_clamp_points(90.0, &vp, Size::new(50.0, 100.0), &[Point::new(50.0, 0.0)]);
        assert_eq!(out, vec![Point::new(0.0, 0.0)]);
    }

    #[test]
    fn test_snap_angle() {
        assert_eq!(snap_angle(-90.0), 270.0);
        assert_eq!(snap_angle(44.0), 0.0);
        assert_eq!(snap_angle(46.0), 90.0);
        assert_eq!(snap_angle(450.0), 90.0);
    }
}
