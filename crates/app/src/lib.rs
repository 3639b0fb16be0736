//! Scrim - overlay-masked scene renderer
//!
//! Ties the gesture machine to the render worker for an editing session
//! ([`Orchestrator`]) and mirrors pushed scenes on a passive
//! [`RemoteDisplay`]. Persistence and credentials are reached only through
//! the [`SceneStore`] and [`CredentialProvider`] traits.

pub mod cli;
pub mod collaborators;
pub mod error;
pub mod logging;
pub mod orchestrator;
pub mod remote;
pub mod revisions;

pub use collaborators::*;
pub use error::*;
pub use orchestrator::{DEFAULT_EVENT_TIMEOUT, ImageSizes, OpacityTarget, Orchestrator};
pub use remote::RemoteDisplay;
pub use revisions::RevisionTracker;
