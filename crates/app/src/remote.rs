//! Passive remote display
//!
//! Mirrors pushed scene snapshots onto its own render worker. It only ever
//! sends `init`, `resize` and `update`; edit gestures never reach it.

use std::time::Duration;

use geometry::snap_angle;
use scrim_config::ScrimConfig;
use scrim_ipc::{ContentLayer, DisplayUpdate, SceneDescription, WorkerCommand, WorkerEvent};
use scrim_render::{CanvasSet, CanvasSlot, ImageFetcher, WorkerHandle};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info};

use crate::collaborators::{CredentialProvider, StaticCredential};
use crate::error::SessionError;
use crate::orchestrator::DEFAULT_EVENT_TIMEOUT;
use crate::revisions::RevisionTracker;

pub struct RemoteDisplay {
    worker: WorkerHandle,
    events: UnboundedReceiver<WorkerEvent>,
    canvases: CanvasSlot,
    credentials: Box<dyn CredentialProvider>,
    revisions: RevisionTracker,
    /// Last update sent, with `reload_overlay` cleared
    shown: Option<DisplayUpdate>,
    notice: Option<String>,
    event_timeout: Duration,
}

impl RemoteDisplay {
    pub fn new<F: ImageFetcher>(
        config: ScrimConfig,
        fetcher: F,
        canvases: CanvasSet,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let (worker, events) = WorkerHandle::spawn(config, fetcher)?;
        Ok(Self {
            worker,
            events,
            canvases: CanvasSlot::new(canvases),
            credentials: Box::new(StaticCredential::default()),
            revisions: RevisionTracker::new(),
            shown: None,
            notice: None,
            event_timeout: DEFAULT_EVENT_TIMEOUT,
        })
    }

    pub fn with_credentials(mut self, credentials: impl CredentialProvider + 'static) -> Self {
        self.credentials = Box::new(credentials);
        self
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Show a pushed snapshot. Returns false when nothing visible changed
    /// and the worker was left alone.
    pub fn show(&mut self, scene: &SceneDescription) -> Result<bool, SessionError> {
        let Some(background) = scene.background.clone() else {
            return Err(SessionError::MissingBackground(scene.id.clone()));
        };

        let switched = self.revisions.set_scene(&scene.id);
        let changed = self.revisions.changed_layers(&scene.id, &scene.revisions);
        let reload_overlay = switched || changed.contains(&ContentLayer::Overlay);

        let mut update = DisplayUpdate {
            background,
            overlay: scene.overlay.clone(),
            reload_overlay: false,
            viewport: scene.viewport,
            background_size: scene.background_size,
            angle: snap_angle(scene.angle),
            credential: None,
        };
        if !reload_overlay && self.shown.as_ref() == Some(&update) {
            debug!("RemoteDisplay: snapshot of {} unchanged", scene.id);
            return Ok(false);
        }
        self.shown = Some(update.clone());

        let credential = self.credentials.request_token();
        update.credential = credential.clone();
        if self.canvases.is_transferred() {
            update.reload_overlay = reload_overlay;
            if switched {
                info!("RemoteDisplay: showing scene {}", scene.id);
            }
            self.worker.post(WorkerCommand::Update(update))?;
        } else {
            info!("RemoteDisplay: first snapshot, scene {}", scene.id);
            let canvases = self.canvases.take()?;
            let init = WorkerCommand::Init {
                angle: update.angle,
                background: update.background.clone(),
                overlay: update.overlay.clone(),
                credential,
            };
            self.worker.post_with_transfer(init, canvases)?;
            self.worker.post(WorkerCommand::Update(update))?;
        }
        Ok(true)
    }

    pub fn resize(&self, width: u32, height: u32) -> Result<(), SessionError> {
        self.worker.post(WorkerCommand::Resize { width, height })?;
        Ok(())
    }

    /// Handle worker events until one matches
    pub async fn wait_for(
        &mut self,
        mut matches: impl FnMut(&WorkerEvent) -> bool,
    ) -> Result<WorkerEvent, SessionError> {
        let limit = self.event_timeout;
        loop {
            let event = tokio::time::timeout(limit, self.events.recv())
                .await
                .map_err(|_| SessionError::TimedOut(limit))?
                .ok_or(SessionError::WorkerStopped)?;
            if let WorkerEvent::LoadFailed { image, reason } = &event {
                error!("RemoteDisplay: failed to load {}: {}", image, reason);
                self.notice = Some(format!("Could not load the {image} image: {reason}"));
            }
            if matches(&event) {
                return Ok(event);
            }
        }
    }
}
