//! PNG encode/decode for rasters

use std::io::Cursor;

use image::codecs::png::PngEncoder;
use image::{ImageEncoder, ImageError, ImageReader, Limits};
use thiserror::Error;

use crate::constants::MAX_RASTER_DIMENSION;
use crate::surface::Raster;
use crate::types::Rgba;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Failed to decode image: {0}")]
    Decode(image::ImageError),
    #[error("Failed to encode image: {0}")]
    Encode(image::ImageError),
    #[error("Image is {width}x{height}, limit is {}", MAX_RASTER_DIMENSION)]
    TooLarge { width: u32, height: u32 },
    #[error("Image has no pixels")]
    Empty,
}

/// Decode any format the `image` crate understands into an RGBA8 raster.
/// The header is checked against [`MAX_RASTER_DIMENSION`] before any pixel
/// data is decoded.
pub fn decode_raster(bytes: &[u8]) -> Result<Raster, CodecError> {
    let (width, height) = reader(bytes)?
        .into_dimensions()
        .map_err(CodecError::Decode)?;
    if width == 0 || height == 0 {
        return Err(CodecError::Empty);
    }
    if width > MAX_RASTER_DIMENSION || height > MAX_RASTER_DIMENSION {
        return Err(CodecError::TooLarge { width, height });
    }

    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_RASTER_DIMENSION);
    limits.max_image_height = Some(MAX_RASTER_DIMENSION);
    let mut reader = reader(bytes)?;
    reader.limits(limits);
    let decoded = reader.decode().map_err(CodecError::Decode)?;

    let rgba = decoded.into_rgba8().into_raw();
    let pixels: Vec<Rgba> = bytemuck::cast_slice(&rgba).to_vec();
    Raster::from_pixels(width, height, pixels).ok_or(CodecError::Empty)
}

fn reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, CodecError> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|err| CodecError::Decode(ImageError::IoError(err)))
}

/// Encode a raster as PNG bytes
pub fn encode_png(raster: &Raster) -> Result<Vec<u8>, CodecError> {
    let mut buffer = Cursor::new(Vec::new());
    PngEncoder::new(&mut buffer)
        .write_image(
            raster.as_bytes(),
            raster.width,
            raster.height,
            image::ExtendedColorType::Rgba8,
        )
        .map_err(CodecError::Encode)?;
    Ok(buffer.into_inner())
}

/// Nearest-neighbour rescale, used when a stored overlay does not match its background
pub fn resample_raster(raster: &Raster, width: u32, height: u32) -> Option<Raster> {
    let source = image::RgbaImage::from_raw(raster.width, raster.height, raster.as_bytes().to_vec())?;
    let resized = image::imageops::resize(&source, width, height, image::imageops::FilterType::Nearest);
    let pixels: Vec<Rgba> = bytemuck::cast_slice(resized.as_raw()).to_vec();
    Raster::from_pixels(width, height, pixels)
}
