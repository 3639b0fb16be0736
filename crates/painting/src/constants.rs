/// Largest raster edge the codec will decode. Guards against decompression bombs.
pub const MAX_RASTER_DIMENSION: u32 = 16384;

/// Fully transparent pixel.
pub const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// Default brush radius in canvas pixels.
pub const DEFAULT_BRUSH_RADIUS: f32 = 20.0;

/// Smallest radius a brush may shrink to.
pub const MIN_BRUSH_RADIUS: f32 = 2.0;
