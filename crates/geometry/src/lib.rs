//! Scrim geometry - pure transforms between the four coordinate spaces
//!
//! Points and rects carry no tag for the space they live in; the caller keeps
//! track of that. The spaces are:
//! - source image: full-resolution background pixels
//! - window: the rotated/zoomed image region currently visible
//! - viewport: the on-screen footprint of the window, anchored at the canvas origin
//! - canvas: screen pixels
//!
//! Modules:
//! - [`rect`] - rect/point/size construction, normalization and pan clamping
//! - [`rotate`] - quarter-turn rotation and projection between orientations
//! - [`zoom`] - zoom step quantization
//! - [`fit`] - remote display viewport fitting

pub mod fit;
pub mod rect;
pub mod rotate;
pub mod zoom;

pub use fit::*;
pub use rect::*;
pub use rotate::*;
pub use zoom::*;
