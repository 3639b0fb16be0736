//! Scrim painting system - raster surfaces and brush dabs
//!
//! This crate provides the pixel-level pieces the render worker draws with:
//! - [`surface::Raster`] - straight-alpha RGBA8 surface (background, overlays)
//! - [`dab`] - circular brush stamps with hardness falloff
//! - [`brush`] - brush engine that spaces dabs along a stroke
//! - [`codec`] - PNG encode/decode of rasters
//! - [`types`] - blend modes and colour helpers

pub mod brush;
pub mod codec;
pub mod constants;
pub mod dab;
pub mod surface;
pub mod types;

pub use brush::*;
pub use codec::*;
pub use constants::*;
pub use dab::*;
pub use surface::*;
pub use types::*;
