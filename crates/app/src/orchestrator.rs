//! Editing session glue
//!
//! Pointer and toolbar input drives the [`EditorMachine`]; its state
//! callbacks queue worker commands and persistence effects on an
//! [`EditorContext`], which the orchestrator flushes after each input.
//! Worker events flow the other way into the [`SceneStore`].

use std::time::Duration;

use geometry::{Rect, Size, clamp_window, normalize_angle, snap_angle};
use scrim_config::ScrimConfig;
use scrim_input::{EditorInput, EditorMachine, EditorState, Pointer};
use scrim_ipc::{
    ContentLayer, Gesture, PRIMARY_BUTTON, PointerEvent, PointerKind, SceneDescription,
    ViewportRecord, WorkerCommand, WorkerEvent,
};
use scrim_render::{CanvasSet, CanvasSlot, ImageFetcher, WorkerHandle};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info, trace, warn};

use crate::collaborators::{CredentialProvider, SceneStore, StaticCredential};
use crate::error::SessionError;
use crate::revisions::RevisionTracker;

/// How long `wait_for` waits for the next worker event
pub const DEFAULT_EVENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Which opacity slider an `OpacityTarget` change applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpacityTarget {
    /// Overlay opacity on the remote display
    Display,
    /// Brush opacity in the editor
    Render,
}

/// Persistence work requested by a gesture
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Effect {
    PersistViewport,
    /// Scale the stored remote viewport about its centre
    RemoteZoom { factor: f64 },
}

/// What the gesture callbacks act on
#[derive(Debug, Default)]
pub(crate) struct EditorContext {
    commands: Vec<WorkerCommand>,
    effects: Vec<Effect>,
    selection: Option<Rect>,
    angle: f64,
    render_opacity: f32,
    display_opacity: f32,
}

impl EditorContext {
    fn post(&mut self, command: WorkerCommand) {
        self.commands.push(command);
    }
}

/// Sizes reported by the worker's `initialized` event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageSizes {
    /// Fully zoomed out viewport on the canvas
    pub visible: Size,
    pub full: Size,
}

/// Register the callback for every state that talks to the worker
pub(crate) fn register_callbacks(machine: &mut EditorMachine<EditorContext>, zoom_factor: f64) {
    use EditorState as S;

    // Pan drag
    machine.on(S::RecordMouse, |_, args, ctx, _| {
        ctx.post(WorkerCommand::Record {
            x: args.pointer.x,
            y: args.pointer.y,
            gesture: Gesture::Pan,
        });
    });
    machine.on(S::Complete, |step, _, ctx, deferred| {
        if step.from == S::RecordMouse {
            ctx.post(WorkerCommand::EndPanning);
        }
        deferred.push(EditorInput::Done);
    });

    machine.on(S::RecordMouseWheel, |_, args, ctx, deferred| {
        let (x, y) = (args.pointer.x, args.pointer.y);
        if args.delta_y < 0.0 {
            ctx.post(WorkerCommand::ZoomIn { x, y });
        } else if args.delta_y > 0.0 {
            ctx.post(WorkerCommand::ZoomOut { x, y });
        }
        deferred.push(EditorInput::Done);
    });

    // Paint: hover previews, drags commit
    machine.on(S::Paint, |step, args, ctx, _| match step.from {
        S::Painting => ctx.post(WorkerCommand::EndPainting),
        S::Paint => ctx.post(WorkerCommand::Paint {
            x: args.pointer.x,
            y: args.pointer.y,
            buttons: 0,
        }),
        _ => {}
    });
    machine.on(S::Painting, |_, args, ctx, _| {
        ctx.post(WorkerCommand::Paint {
            x: args.pointer.x,
            y: args.pointer.y,
            buttons: args.pointer.buttons | PRIMARY_BUTTON,
        });
    });

    // Selection box and the operations that use it
    machine.on(S::Selecting, |_, args, ctx, _| {
        ctx.post(WorkerCommand::Record {
            x: args.pointer.x,
            y: args.pointer.y,
            gesture: Gesture::Select,
        });
    });
    machine.on(S::Select, |step, _, ctx, _| {
        if step.from == S::Selecting {
            ctx.post(WorkerCommand::EndSelecting);
        }
    });
    machine.on(S::Obscure, |_, _, ctx, deferred| {
        match ctx.selection {
            Some(rect) => ctx.post(WorkerCommand::Obscure { rect }),
            None => warn!("Obscure without a selection"),
        }
        deferred.push(EditorInput::Done);
    });
    machine.on(S::Reveal, |_, _, ctx, deferred| {
        match ctx.selection {
            Some(rect) => ctx.post(WorkerCommand::Reveal { rect }),
            None => warn!("Reveal without a selection"),
        }
        deferred.push(EditorInput::Done);
    });
    machine.on(S::Zoom, |_, _, ctx, deferred| {
        match ctx.selection {
            Some(rect) => ctx.post(WorkerCommand::Zoom { rect }),
            None => warn!("Zoom without a selection"),
        }
        deferred.push(EditorInput::Done);
    });

    machine.on(S::RotateClock, |_, _, ctx, deferred| {
        ctx.angle = normalize_angle(ctx.angle + 90.0);
        ctx.post(WorkerCommand::Rotate { angle: ctx.angle });
        ctx.effects.push(Effect::PersistViewport);
        deferred.push(EditorInput::Done);
    });
    machine.on(S::Push, |_, _, ctx, deferred| {
        ctx.effects.push(Effect::PersistViewport);
        deferred.push(EditorInput::Done);
    });
    machine.on(S::RemoteZoomIn, move |_, _, ctx, deferred| {
        ctx.effects.push(Effect::RemoteZoom {
            factor: 1.0 / zoom_factor,
        });
        deferred.push(EditorInput::Done);
    });
    machine.on(S::RemoteZoomOut, move |_, _, ctx, deferred| {
        ctx.effects.push(Effect::RemoteZoom {
            factor: zoom_factor,
        });
        deferred.push(EditorInput::Done);
    });

    machine.on(S::UpdateRenderOpacity, |_, _, ctx, _| {
        ctx.post(WorkerCommand::Opacity {
            value: ctx.render_opacity,
        });
    });
    machine.on(S::UpdateDisplayOpacity, |_, _, ctx, _| {
        debug!("Display opacity {:.2}", ctx.display_opacity);
    });
}

/// One editing session: the gesture machine, the render worker and the
/// scene store it reports to.
pub struct Orchestrator<S> {
    machine: EditorMachine<EditorContext>,
    ctx: EditorContext,
    worker: WorkerHandle,
    events: UnboundedReceiver<WorkerEvent>,
    canvases: CanvasSlot,
    canvas_size: (u32, u32),
    store: S,
    credentials: Box<dyn CredentialProvider>,
    revisions: RevisionTracker,
    scene: Option<SceneDescription>,
    sizes: Option<ImageSizes>,
    notice: Option<String>,
    event_timeout: Duration,
}

impl<S: SceneStore> Orchestrator<S> {
    /// Spawn the render worker. The canvases stay here until the first
    /// scene is opened.
    pub fn new<F: ImageFetcher>(
        config: ScrimConfig,
        fetcher: F,
        store: S,
        canvases: CanvasSet,
    ) -> Result<Self, SessionError> {
        config.validate()?;

        let mut machine = EditorMachine::new();
        register_callbacks(&mut machine, config.remote.zoom_factor);
        let ctx = EditorContext {
            render_opacity: config.brush.opacity,
            display_opacity: 1.0,
            ..Default::default()
        };

        let canvas_size = (canvases.width(), canvases.height());
        let (worker, events) = WorkerHandle::spawn(config, fetcher)?;
        info!(
            "Orchestrator: worker started for {}x{} canvases",
            canvas_size.0, canvas_size.1
        );

        Ok(Self {
            machine,
            ctx,
            worker,
            events,
            canvases: CanvasSlot::new(canvases),
            canvas_size,
            store,
            credentials: Box::new(StaticCredential::default()),
            revisions: RevisionTracker::new(),
            scene: None,
            sizes: None,
            notice: None,
            event_timeout: DEFAULT_EVENT_TIMEOUT,
        })
    }

    pub fn with_credentials(mut self, credentials: impl CredentialProvider + 'static) -> Self {
        self.credentials = Box::new(credentials);
        self
    }

    pub fn with_event_timeout(mut self, timeout: Duration) -> Self {
        self.event_timeout = timeout;
        self
    }

    pub fn state(&self) -> EditorState {
        self.machine.state()
    }

    pub fn scene(&self) -> Option<&SceneDescription> {
        self.scene.as_ref()
    }

    pub fn sizes(&self) -> Option<ImageSizes> {
        self.sizes
    }

    pub fn selection(&self) -> Option<Rect> {
        self.ctx.selection
    }

    pub fn angle(&self) -> f64 {
        self.ctx.angle
    }

    pub fn display_opacity(&self) -> f32 {
        self.ctx.display_opacity
    }

    /// Last load failure shown to the user
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn revisions(&self) -> &RevisionTracker {
        &self.revisions
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Stop the worker and hand back the store
    pub fn into_store(self) -> S {
        let Self { store, .. } = self;
        store
    }

    /// Hand the canvases to the worker. Only possible once.
    pub fn transfer_canvases(&mut self) -> Result<(), SessionError> {
        let canvases = self.take_canvases()?;
        let (width, height) = self.canvas_size;
        self.worker
            .post_with_transfer(WorkerCommand::Resize { width, height }, canvases)?;
        Ok(())
    }

    fn take_canvases(&mut self) -> Result<CanvasSet, SessionError> {
        self.canvases.take().map_err(|err| {
            error!("Orchestrator: {}", err);
            SessionError::from(err)
        })
    }

    /// Load a scene into the worker, transferring the canvases on first use
    pub fn open_scene(&mut self, scene: SceneDescription) -> Result<(), SessionError> {
        let Some(background) = scene.background.clone() else {
            return Err(SessionError::MissingBackground(scene.id.clone()));
        };

        if self.revisions.set_scene(&scene.id) {
            info!("Orchestrator: opening scene {}", scene.id);
        }
        for layer in ContentLayer::ALL {
            self.revisions.accept(layer, scene.revisions.get(layer));
        }

        let angle = snap_angle(scene.angle);
        let command = WorkerCommand::Init {
            angle,
            background,
            overlay: scene.overlay.clone(),
            credential: self.credentials.request_token(),
        };
        if self.canvases.is_transferred() {
            self.worker.post(command)?;
        } else {
            let canvases = self.take_canvases()?;
            self.worker.post_with_transfer(command, canvases)?;
        }

        self.ctx.angle = angle;
        self.ctx.selection = None;
        self.sizes = None;
        self.notice = None;
        self.scene = Some(scene);
        Ok(())
    }

    /// Post a command that needs no gesture (colour, brush size, clear)
    pub fn post(&self, command: WorkerCommand) -> Result<(), SessionError> {
        self.worker.post(command)?;
        Ok(())
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), SessionError> {
        self.canvas_size = (width, height);
        self.post(WorkerCommand::Resize { width, height })
    }

    /// Feed a pointer event. Returns false if the current state ignores it.
    pub async fn pointer(&mut self, event: PointerEvent) -> Result<bool, SessionError> {
        let input = match event.kind {
            PointerKind::Down => EditorInput::Down,
            PointerKind::Move => EditorInput::Move,
            PointerKind::Up => EditorInput::Up,
            PointerKind::Out => EditorInput::Out,
            PointerKind::Wheel => EditorInput::Wheel,
        };
        let pointer = Pointer::new(event.x, event.y, event.buttons);
        let applied = self
            .machine
            .input(input, pointer, event.delta_y, &mut self.ctx);
        self.settle().await?;
        Ok(applied)
    }

    /// Feed a toolbar action. Returns false if the current state ignores it.
    pub async fn action(&mut self, input: EditorInput) -> Result<bool, SessionError> {
        let applied = self.machine.action(input, &mut self.ctx);
        self.settle().await?;
        Ok(applied)
    }

    /// Move an opacity slider; takes effect in the matching opacity state
    pub async fn set_opacity(&mut self, target: OpacityTarget, value: f32) -> Result<bool, SessionError> {
        let value = value.clamp(0.0, 1.0);
        match target {
            OpacityTarget::Display => self.ctx.display_opacity = value,
            OpacityTarget::Render => self.ctx.render_opacity = value,
        }
        self.action(EditorInput::Change).await
    }

    /// Flush what callbacks queued, then apply their deferred inputs until
    /// nothing is left
    async fn settle(&mut self) -> Result<(), SessionError> {
        loop {
            for command in std::mem::take(&mut self.ctx.commands) {
                trace!("Orchestrator: posting {}", command.name());
                self.worker.post(command)?;
            }
            for effect in std::mem::take(&mut self.ctx.effects) {
                self.apply_effect(effect).await?;
            }
            if self.machine.pending() == 0 {
                return Ok(());
            }
            self.machine.pump(&mut self.ctx);
        }
    }

    async fn apply_effect(&mut self, effect: Effect) -> Result<(), SessionError> {
        let Some(scene) = self.scene.as_mut() else {
            warn!("Orchestrator: {:?} without a scene", effect);
            return Ok(());
        };
        let Some(size) = scene.background_size.or(self.sizes.map(|s| s.full)) else {
            warn!("Orchestrator: {:?} before the image size is known", effect);
            return Ok(());
        };

        let current = scene.viewport.unwrap_or(Rect::from_size(size));
        let viewport = match effect {
            Effect::PersistViewport => current,
            Effect::RemoteZoom { factor } => clamp_window(current.scale_about_center(factor), size),
        };
        let record = ViewportRecord {
            viewport,
            background_size: size,
            angle: self.ctx.angle,
        };
        scene.viewport = Some(viewport);
        scene.background_size = Some(size);
        scene.angle = self.ctx.angle;
        debug!("Orchestrator: persisting viewport {:?}", viewport);
        self.store.put_viewport(&scene.id, record).await?;
        Ok(())
    }

    /// Receive and handle the next worker event. `None` once the worker
    /// has stopped.
    pub async fn next_event(&mut self) -> Result<Option<WorkerEvent>, SessionError> {
        let Some(event) = self.events.recv().await else {
            return Ok(None);
        };
        self.handle_event(&event).await?;
        Ok(Some(event))
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
            self.handle_event(&event).await?;
            if matches(&event) {
                return Ok(event);
            }
        }
    }

    async fn handle_event(&mut self, event: &WorkerEvent) -> Result<(), SessionError> {
        match event {
            WorkerEvent::Initialized {
                width,
                height,
                full_width,
                full_height,
            } => {
                let full = Size::new(*full_width as f64, *full_height as f64);
                self.sizes = Some(ImageSizes {
                    visible: Size::new(*width as f64, *height as f64),
                    full,
                });
                if let Some(scene) = self.scene.as_mut()
                    && scene.background_size.is_none()
                {
                    scene.background_size = Some(full);
                }
                info!("Orchestrator: scene ready, {}x{}", full_width, full_height);
            }
            WorkerEvent::Progress { image, fraction } => {
                trace!("Orchestrator: {} {:.0}%", image, fraction * 100.0);
            }
            WorkerEvent::Overlay { blob } => {
                let Some(scene) = self.scene.as_mut() else {
                    warn!("Orchestrator: overlay without a scene, dropped");
                    return Ok(());
                };
                let rev = self
                    .store
                    .put_layer_content(&scene.id, ContentLayer::Overlay, blob.clone())
                    .await?;
                if self.revisions.accept(ContentLayer::Overlay, rev) {
                    scene.revisions.overlay = rev;
                } else {
                    warn!("Orchestrator: store returned stale overlay rev {}", rev.0);
                }
            }
            WorkerEvent::Viewport { rect } => {
                let Some(scene) = self.scene.as_mut() else {
                    warn!("Orchestrator: viewport without a scene, dropped");
                    return Ok(());
                };
                let size = self
                    .sizes
                    .map(|s| s.full)
                    .or(scene.background_size)
                    .unwrap_or(rect.size());
                let record = ViewportRecord {
                    viewport: *rect,
                    background_size: size,
                    angle: self.ctx.angle,
                };
                scene.viewport = Some(*rect);
                scene.background_size = Some(size);
                self.store.put_viewport(&scene.id, record).await?;
            }
            WorkerEvent::PanComplete => debug!("Orchestrator: pan complete"),
            WorkerEvent::SelectComplete { rect } => {
                debug!("Orchestrator: selected {:?}", rect);
                self.ctx.selection = Some(*rect);
            }
            WorkerEvent::LoadFailed { image, reason } => {
                error!("Orchestrator: failed to load {}: {}", image, reason);
                self.notice = Some(format!("Could not load the {image} image: {reason}"));
            }
        }
        Ok(())
    }
}
