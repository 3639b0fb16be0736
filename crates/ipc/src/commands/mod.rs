//! Command payload types.

mod paint;

pub use paint::*;
