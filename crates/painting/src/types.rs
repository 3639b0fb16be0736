use serde::{Deserialize, Serialize};

/// Straight (non-premultiplied) RGBA8 pixel
pub type Rgba = [u8; 4];

/// Blend modes for painting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum BlendMode {
    #[default]
    Normal = 0,
    Erase = 1,
}

/// Build an opaque pixel from channels
pub const fn rgb(r: u8, g: u8, b: u8) -> Rgba {
    [r, g, b, 255]
}

/// Convert a 0.0-1.0 alpha into a channel value
#[inline]
pub fn alpha_to_u8(alpha: f32) -> u8 {
    (alpha.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alpha_to_u8_clamps() {
        assert_eq!(alpha_to_u8(0.5), 128);
        assert_eq!(alpha_to_u8(1.5), 255);
        assert_eq!(alpha_to_u8(-1.0), 0);
        assert_eq!(rgb(1, 2, 3), [1, 2, 3, 255]);
    }
}
