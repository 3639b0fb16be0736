//! The render worker: command dispatch, image loading and gesture frames

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use geometry::{Point, Rect, Size, compute_fit_viewport, normalize_angle, snap_angle};
use painting::{
    BrushEngine, BrushSettings, Raster, decode_raster, encode_png, resample_raster, rgb,
};
use scrim_config::ScrimConfig;
use scrim_ipc::{DisplayUpdate, Gesture, ImageSlot, PRIMARY_BUTTON, WorkerCommand, WorkerEvent};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::canvas::CanvasSet;
use crate::error::{FetchError, LoadError, TransferError};
use crate::fetch::{FetchRequest, ImageFetcher, ProgressCallback};
use crate::frame::FrameLoop;
use crate::session::{Drag, PaintStyle, Session};
use crate::view::ViewState;

/// A command plus any canvases transferred with it
#[derive(Debug)]
pub struct Envelope {
    pub command: WorkerCommand,
    pub transfer: Option<CanvasSet>,
}

impl Envelope {
    pub fn new(command: WorkerCommand) -> Self {
        Self {
            command,
            transfer: None,
        }
    }

    pub fn with_transfer(command: WorkerCommand, canvases: CanvasSet) -> Self {
        Self {
            command,
            transfer: Some(canvases),
        }
    }
}

/// Messages the worker sends itself
#[derive(Debug)]
pub(crate) enum Internal {
    Frame,
    Loaded {
        generation: u64,
        result: Result<LoadedImages, LoadError>,
    },
}

#[derive(Debug)]
pub(crate) struct LoadedImages {
    background: Option<Raster>,
    overlay: Option<Raster>,
}

/// What to do with the overlay when a load completes
#[derive(Debug, Clone, PartialEq)]
enum OverlayPlan {
    Keep,
    Blank,
    Fetch(String),
}

#[derive(Debug)]
struct LoadPlan {
    generation: u64,
    angle: f64,
    /// `None` keeps the current background
    background: Option<String>,
    overlay: OverlayPlan,
    /// Remote display update to apply once loaded; `None` for `init`
    fit: Option<DisplayUpdate>,
}

/// Hover preview waiting for the next frame
#[derive(Debug, Clone, Copy)]
struct Preview {
    at: Point,
    dirty: bool,
}

pub(crate) struct RenderWorker<F> {
    config: ScrimConfig,
    fetcher: Arc<F>,
    events: UnboundedSender<WorkerEvent>,
    internal: UnboundedSender<Internal>,
    canvases: Option<CanvasSet>,
    session: Option<Session>,
    generation: u64,
    loading: Option<LoadPlan>,
    /// Commands received while loading, replayed in order afterwards
    queued: VecDeque<WorkerCommand>,
    style: PaintStyle,
    brush: BrushEngine,
    stroke_dirty: bool,
    drag: Option<Drag>,
    preview: Option<Preview>,
    frames: Option<FrameLoop>,
}

impl<F: ImageFetcher> RenderWorker<F> {
    pub(crate) fn new(
        config: ScrimConfig,
        fetcher: F,
        events: UnboundedSender<WorkerEvent>,
    ) -> (Self, UnboundedReceiver<Internal>) {
        let (internal, internal_rx) = mpsc::unbounded_channel();
        let brush = &config.brush;
        let settings = BrushSettings::new(
            brush.radius,
            brush.min_radius,
            brush.radius_step,
            brush.hardness,
            brush.spacing,
        );
        let style = PaintStyle {
            colour: rgb(brush.colour[0], brush.colour[1], brush.colour[2]),
            opacity: brush.opacity,
            blend_mode: painting::BlendMode::Normal,
        };

        let worker = Self {
            fetcher: Arc::new(fetcher),
            events,
            internal,
            canvases: None,
            session: None,
            generation: 0,
            loading: None,
            queued: VecDeque::new(),
            style,
            brush: BrushEngine::new(settings),
            stroke_dirty: false,
            drag: None,
            preview: None,
            frames: None,
            config,
        };
        (worker, internal_rx)
    }

    /// Process commands until every sender is gone
    pub(crate) async fn run(
        mut self,
        mut commands: UnboundedReceiver<Envelope>,
        mut internal: UnboundedReceiver<Internal>,
    ) {
        info!("Render worker started");
        loop {
            tokio::select! {
                biased;
                envelope = commands.recv() => match envelope {
                    Some(envelope) => self.handle_envelope(envelope),
                    None => break,
                },
                Some(message) = internal.recv() => self.handle_internal(message),
            }
        }
        self.stop_frames();
        info!("Render worker stopped");
    }

    pub(crate) fn handle_envelope(&mut self, envelope: Envelope) {
        if let Some(canvases) = envelope.transfer {
            self.accept_canvases(canvases);
        }
        self.handle_command(envelope.command);
    }

    pub(crate) fn handle_internal(&mut self, message: Internal) {
        match message {
            Internal::Frame => self.on_frame(),
            Internal::Loaded { generation, result } => self.on_loaded(generation, result),
        }
    }

    fn accept_canvases(&mut self, canvases: CanvasSet) {
        if self.canvases.is_some() {
            error!("Render worker: {}, keeping current canvases", TransferError::AlreadyTransferred);
            return;
        }
        info!(
            "Render worker: received {}x{} canvases",
            canvases.width(),
            canvases.height()
        );
        self.canvases = Some(canvases);
    }

    fn handle_command(&mut self, command: WorkerCommand) {
        if self.loading.is_some() && !matches!(command, WorkerCommand::Init { .. }) {
            debug!("Render worker: loading, queued {}", command.name());
            self.queued.push_back(command);
            return;
        }

        match command {
            WorkerCommand::Init {
                angle,
                background,
                overlay,
                credential,
            } => {
                let overlay = overlay.map_or(OverlayPlan::Blank, OverlayPlan::Fetch);
                self.begin_load(angle, Some(background), overlay, credential, None);
            }
            WorkerCommand::Resize { width, height } => self.resize(width, height),
            WorkerCommand::Colour { r, g, b } => {
                self.style.colour = rgb(r, g, b);
                self.mark_preview_dirty();
            }
            WorkerCommand::Opacity { value } => {
                self.style.opacity = value.clamp(0.0, 1.0);
                self.mark_preview_dirty();
            }
            WorkerCommand::BrushInc => {
                let radius = self.brush.grow();
                debug!("Render worker: brush radius {:.1}", radius);
                self.mark_preview_dirty();
            }
            WorkerCommand::BrushDec => {
                let radius = self.brush.shrink();
                debug!("Render worker: brush radius {:.1}", radius);
                self.mark_preview_dirty();
            }
            WorkerCommand::SetBlendMode { mode } => {
                self.style.blend_mode = match mode {
                    scrim_ipc::BlendMode::Normal => painting::BlendMode::Normal,
                    scrim_ipc::BlendMode::Erase => painting::BlendMode::Erase,
                };
            }
            WorkerCommand::Update(update) => self.update_display(update),
            command => {
                if self.session.is_none() || self.canvases.is_none() {
                    warn!("Render worker: {} before init, ignoring", command.name());
                    return;
                }
                self.handle_session_command(command);
            }
        }
    }

    /// Commands that need loaded images and canvases
    fn handle_session_command(&mut self, command: WorkerCommand) {
        match command {
            WorkerCommand::Rotate { angle } => self.rotate(angle),
            WorkerCommand::Paint { x, y, buttons } => self.paint(x, y, buttons),
            WorkerCommand::Record { x, y, gesture } => self.record(x, y, gesture),
            WorkerCommand::EndPainting => self.end_painting(),
            WorkerCommand::EndSelecting => self.end_selecting(),
            WorkerCommand::EndPanning => self.end_panning(),
            WorkerCommand::Obscure { rect } => {
                let fog = self.config.worker.fog_colour;
                self.edit_rect(rect, Some(fog));
            }
            WorkerCommand::Reveal { rect } => self.edit_rect(rect, None),
            WorkerCommand::Clear => self.clear(),
            WorkerCommand::Zoom { rect } => self.propose_viewport(rect),
            WorkerCommand::ZoomIn { x, y } => self.zoom(Point::new(x, y), true),
            WorkerCommand::ZoomOut { x, y } => self.zoom(Point::new(x, y), false),
            other => debug!("Render worker: {} needs no session", other.name()),
        }
    }

    // --- Loading ---

    fn begin_load(
        &mut self,
        angle: f64,
        background: Option<String>,
        overlay: OverlayPlan,
        credential: Option<String>,
        fit: Option<DisplayUpdate>,
    ) {
        if self.canvases.is_none() {
            error!("Render worker: cannot load images before canvases are transferred");
            self.emit(WorkerEvent::LoadFailed {
                image: ImageSlot::Background,
                reason: "no canvas transferred".into(),
            });
            return;
        }
        if self.loading.is_some() && !self.queued.is_empty() {
            debug!(
                "Render worker: load superseded, dropping {} queued commands",
                self.queued.len()
            );
            self.queued.clear();
        }

        self.generation += 1;
        let generation = self.generation;
        let overlay_url = match &overlay {
            OverlayPlan::Fetch(url) => Some(url.clone()),
            _ => None,
        };
        info!(
            "Render worker: load #{} background={:?} overlay={:?}",
            generation, background, overlay_url
        );

        let fetcher = Arc::clone(&self.fetcher);
        let events = self.events.clone();
        let internal = self.internal.clone();
        let timeout = self.config.worker.fetch_timeout();
        let background_url = background.clone();
        tokio::spawn(async move {
            let background = async {
                match background_url {
                    Some(url) => {
                        let request = FetchRequest::new(url, credential.clone());
                        load_image(&*fetcher, ImageSlot::Background, request, timeout, &events)
                            .await
                            .map(Some)
                    }
                    None => Ok(None),
                }
            };
            let overlay = async {
                match overlay_url {
                    Some(url) => {
                        let request = FetchRequest::new(url, credential.clone());
                        load_image(&*fetcher, ImageSlot::Overlay, request, timeout, &events)
                            .await
                            .map(Some)
                    }
                    None => Ok(None),
                }
            };

            let (background, overlay) = tokio::join!(background, overlay);
            let result = background.and_then(|background| {
                overlay.map(|overlay| LoadedImages {
                    background,
                    overlay,
                })
            });
            let _ = internal.send(Internal::Loaded { generation, result });
        });

        self.loading = Some(LoadPlan {
            generation,
            angle,
            background,
            overlay,
            fit,
        });
    }

    fn on_loaded(&mut self, generation: u64, result: Result<LoadedImages, LoadError>) {
        let Some(plan) = self.loading.take_if(|plan| plan.generation == generation) else {
            debug!("Render worker: ignoring superseded load #{}", generation);
            return;
        };

        match result {
            Ok(images) => {
                if self.install(plan, images) {
                    self.replay_queued();
                } else {
                    self.queued.clear();
                }
            }
            Err(err) => {
                error!("Render worker: load #{} failed: {}", generation, err);
                if !self.queued.is_empty() {
                    warn!(
                        "Render worker: dropping {} commands queued behind the failed load",
                        self.queued.len()
                    );
                    self.queued.clear();
                }
                self.emit(WorkerEvent::LoadFailed {
                    image: err.slot(),
                    reason: err.to_string(),
                });
            }
        }
    }

    /// Build the new session from loaded images. Returns false if nothing
    /// could be installed.
    fn install(&mut self, plan: LoadPlan, images: LoadedImages) -> bool {
        let Some(canvases) = self.canvases.as_mut() else {
            error!("Render worker: canvases missing after load");
            return false;
        };

        let previous = self.session.take();
        let (old_background, old_overlay, old_background_ref, old_overlay_ref) = match previous {
            Some(s) => (Some(s.background), Some(s.overlay), Some(s.background_ref), s.overlay_ref),
            None => (None, None, None, None),
        };

        let Some(background) = images.background.or(old_background) else {
            error!("Render worker: load finished without a background");
            return false;
        };
        let background_ref = plan
            .background
            .or(old_background_ref)
            .unwrap_or_default();
        let (width, height) = (background.width, background.height);

        let (overlay, overlay_ref) = match plan.overlay {
            OverlayPlan::Fetch(url) => (
                images
                    .overlay
                    .map(|overlay| match_size(overlay, width, height))
                    .unwrap_or_else(|| Raster::new(width, height)),
                Some(url),
            ),
            OverlayPlan::Blank => (Raster::new(width, height), None),
            OverlayPlan::Keep => (
                old_overlay
                    .filter(|overlay| overlay.width == width && overlay.height == height)
                    .unwrap_or_else(|| Raster::new(width, height)),
                old_overlay_ref,
            ),
        };

        let canvas = Size::new(canvases.width() as f64, canvases.height() as f64);
        let image = Size::new(width as f64, height as f64);
        let angle = quarter_angle(plan.angle);
        let mut view = ViewState::new(canvas, image, angle, &self.config.zoom);
        if let Some(update) = &plan.fit {
            fit_view(&mut view, update);
        }

        let mut session = Session {
            background,
            overlay,
            snapshot: Raster::new(canvases.width(), canvases.height()),
            view,
            background_ref,
            overlay_ref,
        };
        session.render_all(canvases);

        self.stop_frames();
        self.drag = None;
        self.preview = None;
        self.brush.end_stroke();
        self.stroke_dirty = false;

        let viewport = session.view.viewport();
        self.session = Some(session);
        info!(
            "Render worker: session ready, {}x{} image, viewport {:.0}x{:.0}",
            width, height, viewport.width, viewport.height
        );

        if plan.fit.is_none() {
            self.emit(WorkerEvent::Initialized {
                width: viewport.width.round() as u32,
                height: viewport.height.round() as u32,
                full_width: width,
                full_height: height,
            });
        }
        true
    }

    fn replay_queued(&mut self) {
        while self.loading.is_none() {
            let Some(command) = self.queued.pop_front() else {
                break;
            };
            debug!("Render worker: replaying {}", command.name());
            self.handle_command(command);
        }
    }

    // --- Geometry changes ---

    fn resize(&mut self, width: u32, height: u32) {
        let Some(canvases) = self.canvases.as_mut() else {
            warn!("Render worker: resize before canvases were transferred");
            return;
        };
        canvases.resize(width, height);
        if let Some(session) = self.session.as_mut() {
            session
                .view
                .resize(Size::new(width as f64, height as f64));
            session.render_all(canvases);
        }
        self.mark_preview_dirty();
    }

    fn rotate(&mut self, angle: f64) {
        let (Some(session), Some(canvases)) = (self.session.as_mut(), self.canvases.as_mut()) else {
            return;
        };
        session.view.set_angle(quarter_angle(angle));
        session.render_all(canvases);
        self.mark_preview_dirty();
    }

    fn zoom(&mut self, anchor: Point, zoom_in: bool) {
        let (Some(session), Some(canvases)) = (self.session.as_mut(), self.canvases.as_mut()) else {
            return;
        };
        let changed = if zoom_in {
            session.view.zoom_in(anchor)
        } else {
            session.view.zoom_out(anchor)
        };
        if !changed {
            debug!("Render worker: zoom already at its limit ({:.2})", session.view.zoom());
            return;
        }
        debug!("Render worker: zoom {:.2}", session.view.zoom());
        session.render_all(canvases);
        self.mark_preview_dirty();
    }

    fn update_display(&mut self, update: DisplayUpdate) {
        let (background, overlay) = match &self.session {
            None => (
                Some(update.background.clone()),
                update.overlay.clone().map_or(OverlayPlan::Blank, OverlayPlan::Fetch),
            ),
            Some(session) => {
                let background =
                    (session.background_ref != update.background).then(|| update.background.clone());
                let overlay = match &update.overlay {
                    Some(url) if update.reload_overlay || session.overlay_ref.as_ref() != Some(url) => {
                        OverlayPlan::Fetch(url.clone())
                    }
                    None if session.overlay_ref.is_some() => OverlayPlan::Blank,
                    _ => OverlayPlan::Keep,
                };
                (background, overlay)
            }
        };

        // A new background invalidates the kept overlay
        let overlay = match (&background, overlay) {
            (Some(_), OverlayPlan::Keep) => update
                .overlay
                .clone()
                .map_or(OverlayPlan::Blank, OverlayPlan::Fetch),
            (_, overlay) => overlay,
        };

        if background.is_some() || overlay != OverlayPlan::Keep {
            let credential = update.credential.clone();
            self.begin_load(update.angle, background, overlay, credential, Some(update));
            return;
        }

        let (Some(session), Some(canvases)) = (self.session.as_mut(), self.canvases.as_mut()) else {
            return;
        };
        fit_view(&mut session.view, &update);
        session.render_all(canvases);
    }

    // --- Painting ---

    fn paint(&mut self, x: f64, y: f64, buttons: u32) {
        if buttons & PRIMARY_BUTTON == 0 {
            if self.brush.is_stroking() {
                debug!("Render worker: hover during stroke ignored");
                return;
            }
            self.preview = Some(Preview {
                at: Point::new(x, y),
                dirty: true,
            });
            self.restart_frames();
            return;
        }

        self.preview = None;
        self.stop_frames();
        let (Some(session), Some(canvases)) = (self.session.as_mut(), self.canvases.as_mut()) else {
            return;
        };
        if !self.brush.is_stroking() {
            session.restore_snapshot(canvases);
            self.brush.begin_stroke();
        }
        let dabs = self.brush.stroke_to(x as f32, y as f32);
        if !dabs.is_empty() {
            session.stamp(canvases, &dabs, self.style);
            self.stroke_dirty = true;
        }
    }

    fn end_painting(&mut self) {
        self.preview = None;
        self.stop_frames();
        let stroked = self.stroke_dirty;
        self.brush.end_stroke();
        self.stroke_dirty = false;
        if !stroked {
            debug!("Render worker: end_painting without a stroke");
            return;
        }

        let (Some(session), Some(canvases)) = (self.session.as_mut(), self.canvases.as_ref()) else {
            return;
        };
        session.commit_snapshot(canvases);
        self.emit_overlay();
    }

    // --- Drags ---

    fn record(&mut self, x: f64, y: f64, gesture: Gesture) {
        let at = Point::new(x, y);
        match self.drag.as_mut() {
            Some(drag) => {
                if drag.gesture != gesture {
                    debug!(
                        "Render worker: {:?} record during {:?} drag",
                        gesture, drag.gesture
                    );
                }
                drag.end = at;
            }
            None => {
                if self.preview.take().is_some()
                    && let (Some(session), Some(canvases)) =
                        (self.session.as_ref(), self.canvases.as_mut())
                {
                    session.restore_snapshot(canvases);
                }
                debug!("Render worker: {:?} drag from ({:.1}, {:.1})", gesture, x, y);
                self.drag = Some(Drag::new(gesture, at));
                self.restart_frames();
            }
        }
    }

    fn end_selecting(&mut self) {
        let Some(drag) = self.drag.take() else {
            debug!("Render worker: end_selecting without a drag");
            return;
        };
        match drag.gesture {
            Gesture::Select => {
                self.stop_frames();
                if let (Some(session), Some(canvases)) = (self.session.as_ref(), self.canvases.as_mut())
                {
                    session.restore_snapshot(canvases);
                    canvases.overlay.present();
                }
                self.emit(WorkerEvent::SelectComplete {
                    rect: drag.selection(),
                });
            }
            Gesture::Pan => self.finish_pan(drag),
        }
    }

    fn end_panning(&mut self) {
        let Some(drag) = self.drag.take() else {
            debug!("Render worker: end_panning without a drag");
            return;
        };
        match drag.gesture {
            Gesture::Pan => self.finish_pan(drag),
            Gesture::Select => {
                self.stop_frames();
                if let (Some(session), Some(canvases)) = (self.session.as_ref(), self.canvases.as_mut())
                {
                    session.restore_snapshot(canvases);
                    canvases.overlay.present();
                }
                debug!("Render worker: selection discarded");
            }
        }
    }

    /// Apply the last movement, commit the panned overlay silently
    fn finish_pan(&mut self, mut drag: Drag) {
        self.stop_frames();
        if let (Some(session), Some(canvases)) = (self.session.as_mut(), self.canvases.as_mut()) {
            session.pan_step(canvases, &mut drag);
            session.render_overlay(canvases);
            let window = session.view.window();
            debug!(
                "Render worker: pan ended at ({:.0}, {:.0})",
                window.x, window.y
            );
        }
        self.emit(WorkerEvent::PanComplete);
    }

    fn on_frame(&mut self) {
        let (Some(session), Some(canvases)) = (self.session.as_mut(), self.canvases.as_mut()) else {
            return;
        };

        if let Some(drag) = self.drag.as_mut() {
            match drag.gesture {
                Gesture::Pan => {
                    session.pan_step(canvases, drag);
                }
                Gesture::Select => {
                    let colour = self.config.worker.selection_colour;
                    session.draw_selection(canvases, drag.selection(), colour);
                }
            }
            return;
        }

        if let Some(preview) = self.preview.as_mut() {
            if preview.dirty {
                let opacity = self.style.opacity * self.config.worker.preview_alpha;
                let settings = self.brush.settings();
                session.draw_preview(
                    canvases,
                    preview.at,
                    settings.radius,
                    settings.hardness,
                    self.style.colour,
                    opacity,
                );
                preview.dirty = false;
            }
            return;
        }

        // Nothing left to animate
        self.stop_frames();
    }

    // --- Overlay edits ---

    fn edit_rect(&mut self, rect: Rect, fill: Option<painting::Rgba>) {
        self.preview = None;
        self.drag = None;
        self.stop_frames();
        let (Some(session), Some(canvases)) = (self.session.as_mut(), self.canvases.as_mut()) else {
            return;
        };
        if session.apply_rect(canvases, rect, fill) {
            self.emit_overlay();
        } else {
            debug!("Render worker: {:?} is outside the image", rect);
        }
    }

    fn clear(&mut self) {
        self.preview = None;
        self.stop_frames();
        let (Some(session), Some(canvases)) = (self.session.as_mut(), self.canvases.as_mut()) else {
            return;
        };
        session.clear_overlay(canvases);
        self.emit_overlay();
    }

    fn propose_viewport(&mut self, rect: Rect) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let proposed = session.view.canvas_rect_to_image(rect);
        debug!("Render worker: proposing viewport {:?}", proposed);
        self.emit(WorkerEvent::Viewport { rect: proposed });
    }

    // --- Helpers ---

    fn emit_overlay(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        match encode_png(&session.overlay) {
            Ok(blob) => {
                debug!("Render worker: overlay encoded, {} bytes", blob.len());
                self.emit(WorkerEvent::Overlay { blob });
            }
            Err(err) => error!("Render worker: failed to encode overlay: {}", err),
        }
    }

    fn emit(&self, event: WorkerEvent) {
        if self.events.send(event).is_err() {
            debug!("Render worker: event receiver dropped");
        }
    }

    fn mark_preview_dirty(&mut self) {
        if let Some(preview) = self.preview.as_mut() {
            preview.dirty = true;
        }
    }

    /// Start a fresh frame loop, superseding any running one
    fn restart_frames(&mut self) {
        self.stop_frames();
        self.frames = Some(FrameLoop::start(
            self.frame_interval(),
            self.internal.clone(),
            || Internal::Frame,
        ));
    }

    fn stop_frames(&mut self) {
        if let Some(frames) = self.frames.take() {
            frames.stop();
        }
    }

    fn frame_interval(&self) -> Duration {
        self.config.worker.frame_interval()
    }
}

/// Fetch and decode one image, reporting progress as events
async fn load_image<F: ImageFetcher>(
    fetcher: &F,
    slot: ImageSlot,
    request: FetchRequest,
    timeout: Option<Duration>,
    events: &UnboundedSender<WorkerEvent>,
) -> Result<Raster, LoadError> {
    let progress_events = events.clone();
    let progress: ProgressCallback = Box::new(move |fraction| {
        let _ = progress_events.send(WorkerEvent::Progress {
            image: slot,
            fraction,
        });
    });

    let url = request.url.clone();
    let fetch = fetcher.fetch(request, progress);
    let fetched = match timeout {
        Some(limit) => match tokio::time::timeout(limit, fetch).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::TimedOut(limit)),
        },
        None => fetch.await,
    };
    let bytes = fetched.map_err(|source| LoadError::Fetch { slot, source })?;

    let raster = tokio::task::spawn_blocking(move || decode_raster(&bytes))
        .await
        .map_err(|err| LoadError::Task {
            slot,
            reason: err.to_string(),
        })?
        .map_err(|source| LoadError::Decode { slot, source })?;

    debug!(
        "Render worker: decoded {} {} ({}x{})",
        slot, url, raster.width, raster.height
    );
    Ok(raster)
}

/// Snap to a quarter turn, warning when the input was off-quadrant
fn quarter_angle(angle: f64) -> f64 {
    let snapped = snap_angle(angle);
    if (snapped - normalize_angle(angle)).abs() > 1e-9 {
        warn!("Render worker: angle {} snapped to {}", angle, snapped);
    }
    snapped
}

/// Apply a remote display snapshot's angle and stored viewport
fn fit_view(view: &mut ViewState, update: &DisplayUpdate) {
    view.set_angle(quarter_angle(update.angle));
    let Some(viewport) = update.viewport else {
        let image = view.image();
        view.fit_window(Rect::from_size(image));
        return;
    };
    let original = update.background_size.unwrap_or_else(|| view.image());
    let fit = compute_fit_viewport(view.canvas(), view.image(), original, view.angle(), viewport);
    view.fit_window(fit);
}

fn match_size(overlay: Raster, width: u32, height: u32) -> Raster {
    if overlay.width == width && overlay.height == height {
        return overlay;
    }
    warn!(
        "Render worker: overlay is {}x{}, background is {}x{}; rescaling",
        overlay.width, overlay.height, width, height
    );
    resample_raster(&overlay, width, height).unwrap_or_else(|| Raster::new(width, height))
}
