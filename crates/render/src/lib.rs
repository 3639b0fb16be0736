//! Scrim render worker
//!
//! Owns the background and overlay canvases once they are transferred and
//! does all image work off the orchestrating thread:
//! - [`handle::WorkerHandle`] - spawns the worker thread and posts commands
//! - [`view::ViewState`] - pan, zoom and quarter-turn rotation
//! - [`fetch`] - image fetching collaborators with progress reporting
//! - [`render`] - resampling full-resolution rasters onto a canvas
//!
//! The worker answers with [`scrim_ipc::WorkerEvent`]s on the channel
//! returned by [`WorkerHandle::spawn`].

pub mod canvas;
pub mod error;
pub mod fetch;
mod frame;
pub mod handle;
pub mod render;
mod session;
pub mod view;
mod worker;

pub use canvas::*;
pub use error::*;
pub use fetch::*;
pub use handle::*;
pub use render::render_layer;
pub use view::*;
pub use worker::Envelope;
