//! Viewport fitting for the passive remote display

use crate::rect::{Rect, Size, normalize_rect};
use crate::rotate::rotated_size;

/// Tolerance for the "whole image" short circuit
const IDENTITY_EPSILON: f64 = 1e-6;

/// Fit a stored viewport to a remote screen.
///
/// `viewport` is in `original_image` coordinates (the size recorded when the
/// viewport was saved). The result is expanded along its shorter axis to
/// match the screen's aspect ratio as seen in image orientation, shunted
/// inward at the image edges (centred if it is larger than the image on that
/// axis), and finally scaled into `full_image` coordinates, which differ from
/// the original when the displayed image was resized.
///
/// A viewport covering the whole original image maps straight to the whole
/// full image. Empty screens or viewports skip the aspect expansion.
pub fn compute_fit_viewport(
    screen: Size,
    full_image: Size,
    original_image: Size,
    angle_deg: f64,
    viewport: Rect,
) -> Rect {
    let vp = normalize_rect(viewport);
    if is_whole_image(&vp, original_image) {
        return Rect::from_size(full_image);
    }

    let mut fitted = vp;
    let (target_w, target_h) = rotated_size(angle_deg, screen.width, screen.height);
    if target_w > 0.0 && target_h > 0.0 && !vp.is_empty() {
        let target_aspect = target_w / target_h;
        if vp.width / vp.height < target_aspect {
            let width = vp.height * target_aspect;
            fitted.x -= (width - vp.width) / 2.0;
            fitted.width = width;
        } else {
            let height = vp.width / target_aspect;
            fitted.y -= (height - vp.height) / 2.0;
            fitted.height = height;
        }
        fitted.x = shunt_inward(fitted.x, fitted.width, original_image.width);
        fitted.y = shunt_inward(fitted.y, fitted.height, original_image.height);
    }

    let sx = ratio(full_image.width, original_image.width);
    let sy = ratio(full_image.height, original_image.height);
    Rect::new(fitted.x * sx, fitted.y * sy, fitted.width * sx, fitted.height * sy)
}

fn is_whole_image(vp: &Rect, image: Size) -> bool {
    vp.x.abs() < IDENTITY_EPSILON
        && vp.y.abs() < IDENTITY_EPSILON
        && (vp.width - image.width).abs() < IDENTITY_EPSILON
        && (vp.height - image.height).abs() < IDENTITY_EPSILON
}

fn shunt_inward(start: f64, len: f64, limit: f64) -> f64 {
    if len >= limit {
        (limit - len) / 2.0
    } else if start < 0.0 {
        0.0
    } else if start + len > limit {
        limit - len
    } else {
        start
    }
}

fn ratio(actual: f64, original: f64) -> f64 {
    if original > 0.0 { actual / original } else { 1.0 }
}
