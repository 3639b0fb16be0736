//! Type definitions for IPC messages.

mod scene;

pub use scene::*;
