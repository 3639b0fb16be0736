//! Zoom step quantization
//!
//! Zoom is expressed as source-image pixels per canvas pixel, so larger
//! values are further out. `max_zoom` (whole image visible) is usually off
//! the step grid; every other level the editor reaches is a multiple of the
//! step.

/// Tolerance used when deciding whether a zoom level sits on the step grid
const GRID_EPSILON: f64 = 1e-9;

/// Largest multiple of `step` that is `<= max_zoom`.
///
/// `step` is scaled by a power of ten until it is at least 1 so the floor
/// division happens on whole-ish numbers, then the result is scaled back.
/// A non-positive `step` returns `max_zoom` unchanged.
pub fn first_zoom_step(max_zoom: f64, step: f64) -> f64 {
    if !(step > 0.0) {
        return max_zoom;
    }

    let mut scale = 1.0;
    while step * scale < 1.0 {
        scale *= 10.0;
    }

    let scaled_step = step * scale;
    let steps = ((max_zoom * scale) / scaled_step + GRID_EPSILON).floor();
    steps * scaled_step / scale
}

/// Next level when zooming in (towards `min_zoom`).
///
/// From `max_zoom` this lands on [`first_zoom_step`]; if `zoom` is already on
/// the grid it drops a whole step.
pub fn zoom_in_step(zoom: f64, step: f64, min_zoom: f64) -> f64 {
    let aligned = first_zoom_step(zoom, step);
    let next = if (zoom - aligned).abs() <= GRID_EPSILON {
        aligned - step
    } else {
        aligned
    };
    next.max(min_zoom)
}

/// Next level when zooming out (towards `max_zoom`)
pub fn zoom_out_step(zoom: f64, step: f64, max_zoom: f64) -> f64 {
    (first_zoom_step(zoom, step) + step).min(max_zoom)
}
