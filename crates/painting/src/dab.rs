//! Dab application for brush strokes

use tracing::debug;

use crate::surface::Raster;
use crate::types::{BlendMode, Rgba};

impl Raster {
    /// Stamp a circular dab onto the surface.
    ///
    /// # Arguments
    /// * `center_x`, `center_y` - Dab center in pixel coordinates
    /// * `radius` - Radius in pixels
    /// * `color` - RGBA color to apply (ignored when erasing)
    /// * `opacity` - Overall opacity (0.0 to 1.0)
    /// * `hardness` - Edge hardness (0.0 = soft, 1.0 = hard)
    /// * `blend_mode` - How to combine with existing pixels
    ///
    /// # Returns
    /// Bounding box of affected region (x, y, width, height), or None if outside surface.
    pub fn apply_dab(
        &mut self,
        center_x: f32,
        center_y: f32,
        radius: f32,
        color: Rgba,
        opacity: f32,
        hardness: f32,
        blend_mode: BlendMode,
    ) -> Option<(u32, u32, u32, u32)> {
        if radius <= 0.0 || opacity <= 0.0 {
            debug!("Raster::apply_dab: skipped, radius={:.1} opacity={:.2}", radius, opacity);
            return None;
        }

        // Calculate bounding box
        let x_min_f = (center_x - radius).floor();
        let y_min_f = (center_y - radius).floor();
        let x_max_f = (center_x + radius).ceil();
        let y_max_f = (center_y + radius).ceil();

        // Clamp to surface bounds
        let x_min = (x_min_f.max(0.0) as u32).min(self.width);
        let y_min = (y_min_f.max(0.0) as u32).min(self.height);
        let x_max = (x_max_f.max(0.0) as u32).min(self.width);
        let y_max = (y_max_f.max(0.0) as u32).min(self.height);

        // Check if completely outside
        if x_min >= x_max || y_min >= y_max {
            return None;
        }

        let radius_sq = radius * radius;
        for py in y_min..y_max {
            for px in x_min..x_max {
                // Distance from center (use pixel center)
                let dx = (px as f32 + 0.5) - center_x;
                let dy = (py as f32 + 0.5) - center_y;
                let dist_sq = dx * dx + dy * dy;
                if dist_sq > radius_sq {
                    continue;
                }

                let falloff = calculate_hardness_falloff(dist_sq.sqrt() / radius, hardness);
                if falloff <= 0.0 {
                    continue;
                }

                let effective_opacity = opacity * falloff;
                match blend_mode {
                    BlendMode::Normal => self.blend_pixel(px, py, color, effective_opacity),
                    BlendMode::Erase => self.erase_pixel(px, py, effective_opacity),
                }
            }
        }

        Some((x_min, y_min, x_max - x_min, y_max - y_min))
    }
}

/// Calculate falloff based on hardness
/// distance_normalized is 0 at center, 1 at edge
/// hardness is 0.0 (soft) to 1.0 (hard)
#[inline]
pub fn calculate_hardness_falloff(distance_normalized: f32, hardness: f32) -> f32 {
    if hardness >= 1.0 {
        // Pure hard edge
        if distance_normalized <= 1.0 { 1.0 } else { 0.0 }
    } else {
        let t = distance_normalized.clamp(0.0, 1.0);
        let soft = 1.0 - t; // Linear falloff for soft brush
        let hard = if t <= 1.0 { 1.0 } else { 0.0 };
        // Interpolate between soft and hard based on hardness
        soft * (1.0 - hardness) + hard * hardness
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::TRANSPARENT;

    #[test]
    fn test_apply_dab_paints_center() {
        let mut surface = Raster::new(64, 64);
        let result = surface.apply_dab(32.0, 32.0, 5.0, [0, 0, 0, 255], 1.0, 1.0, BlendMode::Normal);

        let (_x, _y, w, h) = result.unwrap();
        assert!(w > 0 && h > 0);
        assert_eq!(surface.get_pixel(32, 32), Some([0, 0, 0, 255]));
        // Outside the radius stays untouched
        assert_eq!(surface.get_pixel(40, 40), Some(TRANSPARENT));
    }

    #[test]
    fn test_apply_dab_erase() {
        let mut surface = Raster::new(64, 64);
        surface.clear([0, 0, 0, 255]);
        surface.apply_dab(10.0, 10.0, 4.0, [0, 0, 0, 0], 1.0, 1.0, BlendMode::Erase);
        assert_eq!(surface.get_pixel(10, 10), Some(TRANSPARENT));
        assert_eq!(surface.get_pixel(30, 30), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_apply_dab_outside_surface() {
        let mut surface = Raster::new(16, 16);
        assert!(surface.apply_dab(-50.0, -50.0, 5.0, [0, 0, 0, 255], 1.0, 1.0, BlendMode::Normal).is_none());
        assert!(surface.is_blank());
    }

    #[test]
    fn test_apply_dab_clipped_bounds() {
        let mut surface = Raster::new(16, 16);
        let (x, y, w, h) = surface
            .apply_dab(0.0, 0.0, 4.0, [0, 0, 0, 255], 1.0, 1.0, BlendMode::Normal)
            .unwrap();
        assert_eq!((x, y), (0, 0));
        assert_eq!((w, h), (4, 4));
    }

    #[test]
    fn test_hardness_falloff() {
        assert_eq!(calculate_hardness_falloff(0.5, 1.0), 1.0);
        assert_eq!(calculate_hardness_falloff(1.5, 1.0), 0.0);
        assert!((calculate_hardness_falloff(0.5, 0.0) - 0.5).abs() < 1e-6);
        assert!((calculate_hardness_falloff(0.0, 0.0) - 1.0).abs() < 1e-6);
    }
}
