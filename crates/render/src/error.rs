//! Error types for the render worker

use std::time::Duration;

use painting::CodecError;
use scrim_ipc::ImageSlot;
use thiserror::Error;

/// Failures of an [`ImageFetcher`](crate::ImageFetcher)
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Unsupported image reference: {0}")]
    Unsupported(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

/// Failure loading one of the session images
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to fetch {slot}: {source}")]
    Fetch {
        slot: ImageSlot,
        #[source]
        source: FetchError,
    },

    #[error("Failed to decode {slot}: {source}")]
    Decode {
        slot: ImageSlot,
        #[source]
        source: CodecError,
    },

    #[error("Decode task for {slot} failed: {reason}")]
    Task { slot: ImageSlot, reason: String },
}

impl LoadError {
    pub fn slot(&self) -> ImageSlot {
        match self {
            LoadError::Fetch { slot, .. }
            | LoadError::Decode { slot, .. }
            | LoadError::Task { slot, .. } => *slot,
        }
    }
}

/// Canvas ownership errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransferError {
    #[error("Canvas surfaces were already transferred")]
    AlreadyTransferred,
}

/// Worker lifecycle errors
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Failed to spawn render worker thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Render worker is no longer running")]
    Closed,
}
