//! Session-level errors

use std::time::Duration;

use scrim_config::ConfigError;
use scrim_ipc::SceneId;
use scrim_render::{TransferError, WorkerError};
use thiserror::Error;

/// Failures reported by a [`SceneStore`](crate::SceneStore)
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Unknown scene: {0}")]
    UnknownScene(SceneId),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Errors from an editing session or remote display
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Worker(#[from] WorkerError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Scene {0} has no background image")]
    MissingBackground(SceneId),

    #[error("No scene is open")]
    NoScene,

    #[error("Render worker stopped")]
    WorkerStopped,

    #[error("No worker event after {0:?}")]
    TimedOut(Duration),
}
