//! Message protocol for the Scrim render worker
//!
//! Defines every message exchanged between the orchestrating thread and the
//! render worker, plus the scene records handed to the persistence
//! collaborators. Messages are struct-shaped and order preserving; nothing
//! crosses the boundary except these values and PNG bytes.

mod commands;
mod error;
mod input;
mod messages;
mod types;

pub use commands::*;
pub use error::*;
pub use input::*;
pub use messages::*;
pub use types::*;

pub use geometry::{Point, Rect, Size};

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Serialize a message to JSON.
pub fn encode<T: Serialize>(message: &T) -> Result<String, IpcError> {
    Ok(serde_json::to_string(message)?)
}

/// Parse a message from JSON.
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T, IpcError> {
    if text.trim().is_empty() {
        return Err(IpcError::InvalidFormat("empty message".into()));
    }
    serde_json::from_str(text).map_err(|e| IpcError::InvalidFormat(e.to_string()))
}
