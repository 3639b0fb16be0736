//! CPU raster surface - straight-alpha RGBA8 storage

use crate::constants::TRANSPARENT;
use crate::types::{Rgba, alpha_to_u8};

/// An RGBA8 CPU surface.
/// Backs the background canvas, the visible overlay and the full-resolution overlay.
#[derive(Clone, PartialEq, Eq)]
pub struct Raster {
    /// Surface dimensions
    pub width: u32,
    pub height: u32,
    /// Pixel data in row-major order
    pixels: Vec<Rgba>,
}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl Raster {
    /// Create a new surface with the given dimensions, initialized to transparent
    pub fn new(width: u32, height: u32) -> Self {
        let pixel_count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            pixels: vec![TRANSPARENT; pixel_count],
        }
    }

    /// Wrap existing pixels. Returns None if the length does not match the dimensions
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgba>) -> Option<Self> {
        if pixels.len() != (width as usize) * (height as usize) {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Reallocate to new dimensions; contents become transparent
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels
            .resize((width as usize) * (height as usize), TRANSPARENT);
    }

    /// Clear the surface to a solid color
    pub fn clear(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some((y as usize) * (self.width as usize) + (x as usize))
    }

    /// Get a pixel at the given coordinates
    /// Returns None if coordinates are out of bounds
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Set a pixel at the given coordinates
    /// Does nothing if coordinates are out of bounds
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Source-over composite of `color` at `opacity` onto an existing pixel
    #[inline]
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: Rgba, opacity: f32) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        let dst = self.pixels[i];

        let src_a = (color[3] as f32 / 255.0) * opacity.clamp(0.0, 1.0);
        if src_a <= 0.0 {
            return;
        }
        let dst_a = dst[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);

        let mut out = [0u8; 4];
        for c in 0..3 {
            let src_c = color[c] as f32;
            let dst_c = dst[c] as f32;
            let value = (src_c * src_a + dst_c * dst_a * (1.0 - src_a)) / out_a;
            out[c] = value.round().clamp(0.0, 255.0) as u8;
        }
        out[3] = alpha_to_u8(out_a);
        self.pixels[i] = out;
    }

    /// Erase a pixel by reducing its alpha (destination-out)
    /// The erase_amount (0-1) determines how much alpha is removed
    #[inline]
    pub fn erase_pixel(&mut self, x: u32, y: u32, erase_amount: f32) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        let remaining = (1.0 - erase_amount).clamp(0.0, 1.0);
        let dst = self.pixels[i];
        let alpha = (dst[3] as f32 * remaining).round() as u8;
        self.pixels[i] = if alpha == 0 {
            TRANSPARENT
        } else {
            [dst[0], dst[1], dst[2], alpha]
        };
    }

    /// Clamp a signed pixel rect to the surface. Returns (x0, y0, x1, y1), exclusive end
    fn clip(&self, x: i64, y: i64, width: i64, height: i64) -> Option<(u32, u32, u32, u32)> {
        let x0 = x.max(0).min(self.width as i64);
        let y0 = y.max(0).min(self.height as i64);
        let x1 = (x + width).max(0).min(self.width as i64);
        let y1 = (y + height).max(0).min(self.height as i64);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }

    /// Overwrite a rectangle with `color`, clipped to the surface.
    /// Returns false when nothing was inside the surface.
    pub fn fill_rect(&mut self, x: i64, y: i64, width: i64, height: i64, color: Rgba) -> bool {
        let Some((x0, y0, x1, y1)) = self.clip(x, y, width, height) else {
            return false;
        };
        let stride = self.width as usize;
        for row in y0..y1 {
            let start = row as usize * stride;
            self.pixels[start + x0 as usize..start + x1 as usize].fill(color);
        }
        true
    }

    /// Make a rectangle fully transparent, clipped to the surface
    pub fn clear_rect(&mut self, x: i64, y: i64, width: i64, height: i64) -> bool {
        self.fill_rect(x, y, width, height, TRANSPARENT)
    }

    /// Blend a rectangle outline `thickness` pixels wide
    pub fn stroke_rect(
        &mut self,
        x: i64,
        y: i64,
        width: i64,
        height: i64,
        thickness: i64,
        color: Rgba,
        opacity: f32,
    ) {
        let t = thickness.max(1);
        let edges = [
            (x, y, width, t),
            (x, y + height - t, width, t),
            (x, y + t, t, height - 2 * t),
            (x + width - t, y + t, t, height - 2 * t),
        ];
        for (ex, ey, ew, eh) in edges {
            if ew <= 0 || eh <= 0 {
                continue;
            }
            if let Some((x0, y0, x1, y1)) = self.clip(ex, ey, ew, eh) {
                for py in y0..y1 {
                    for px in x0..x1 {
                        self.blend_pixel(px, py, color, opacity);
                    }
                }
            }
        }
    }

    /// Copy every pixel from a surface of the same size.
    /// Returns false (and copies nothing) on a size mismatch.
    pub fn copy_from(&mut self, other: &Raster) -> bool {
        if self.width != other.width || self.height != other.height {
            return false;
        }
        self.pixels.copy_from_slice(&other.pixels);
        true
    }

    /// Raw RGBA bytes, row-major
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Get the total number of pixels
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    /// True if every pixel has zero alpha
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|p| p[3] == 0)
    }

    /// Get direct access to pixel data
    #[inline]
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Get mutable access to pixel data
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [Rgba] {
        &mut self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_surface() {
        let surface = Raster::new(100, 100);
        assert_eq!(surface.width, 100);
        assert_eq!(surface.height, 100);
        assert_eq!(surface.pixel_count(), 10000);
        assert!(surface.is_blank());
    }

    #[test]
    fn test_get_set_pixel() {
        let mut surface = Raster::new(10, 10);
        let color = [255, 128, 64, 255];

        surface.set_pixel(5, 5, color);
        assert_eq!(surface.get_pixel(5, 5), Some(color));

        // Out of bounds should return None
        assert_eq!(surface.get_pixel(100, 100), None);
    }

    #[test]
    fn test_blend_pixel_half_over_white() {
        let mut surface = Raster::new(10, 10);
        surface.clear([255, 255, 255, 255]);

        surface.blend_pixel(5, 5, [255, 0, 0, 255], 0.5);

        let result = surface.get_pixel(5, 5).unwrap();
        assert_eq!(result[0], 255);
        assert!((result[1] as i32 - 128).abs() <= 1);
        assert!((result[2] as i32 - 128).abs() <= 1);
        assert_eq!(result[3], 255);
    }

    #[test]
    fn test_blend_pixel_onto_transparent_keeps_colour() {
        let mut surface = Raster::new(2, 2);
        surface.blend_pixel(0, 0, [10, 20, 30, 255], 0.5);
        let result = surface.get_pixel(0, 0).unwrap();
        assert_eq!(&result[..3], &[10, 20, 30]);
        assert!((result[3] as i32 - 128).abs() <= 1);
    }

    #[test]
    fn test_erase_pixel() {
        let mut surface = Raster::new(2, 2);
        surface.clear([0, 0, 0, 255]);
        surface.erase_pixel(1, 1, 1.0);
        assert_eq!(surface.get_pixel(1, 1), Some(TRANSPARENT));
        surface.erase_pixel(0, 0, 0.5);
        assert!((surface.get_pixel(0, 0).unwrap()[3] as i32 - 128).abs() <= 1);
    }

    #[test]
    fn test_fill_and_clear_rect_clip() {
        let mut surface = Raster::new(10, 10);
        assert!(surface.fill_rect(-5, -5, 8, 8, [0, 0, 0, 255]));
        assert_eq!(surface.get_pixel(2, 2), Some([0, 0, 0, 255]));
        assert_eq!(surface.get_pixel(3, 3), Some(TRANSPARENT));

        assert!(surface.clear_rect(0, 0, 1, 1));
        assert_eq!(surface.get_pixel(0, 0), Some(TRANSPARENT));
        assert_eq!(surface.get_pixel(1, 1), Some([0, 0, 0, 255]));

        assert!(!surface.fill_rect(20, 20, 5, 5, [1, 1, 1, 255]));
    }

    #[test]
    fn test_stroke_rect_leaves_interior() {
        let mut surface = Raster::new(20, 20);
        surface.stroke_rect(2, 2, 10, 10, 1, [255, 0, 0, 255], 1.0);
        assert_eq!(surface.get_pixel(2, 2), Some([255, 0, 0, 255]));
        assert_eq!(surface.get_pixel(11, 11), Some([255, 0, 0, 255]));
        assert_eq!(surface.get_pixel(6, 6), Some(TRANSPARENT));
    }

    #[test]
    fn test_copy_from_requires_same_size() {
        let mut a = Raster::new(4, 4);
        let mut b = Raster::new(4, 4);
        b.clear([9, 9, 9, 9]);
        assert!(a.copy_from(&b));
        assert_eq!(a, b);
        assert!(!a.copy_from(&Raster::new(3, 3)));
    }

    #[test]
    fn test_as_bytes() {
        let surface = Raster::new(2, 2);
        // 4 pixels * 4 channels
        assert_eq!(surface.as_bytes().len(), 16);
    }
}
