//! Command and event enums exchanged with the render worker.

use serde::{Deserialize, Serialize};

use crate::commands::{BlendMode, Gesture};
use geometry::{Rect, Size};

/// Which of the two fetched images a progress or failure event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSlot {
    Background,
    Overlay,
}

impl std::fmt::Display for ImageSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageSlot::Background => f.write_str("background"),
            ImageSlot::Overlay => f.write_str("overlay"),
        }
    }
}

/// Snapshot pushed to a passive remote display.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplayUpdate {
    pub background: String,
    pub overlay: Option<String>,
    /// Refetch the overlay even if its reference is unchanged
    #[serde(default)]
    pub reload_overlay: bool,
    /// Stored viewport in `background_size` coordinates
    pub viewport: Option<Rect>,
    /// Background size recorded with the viewport
    pub background_size: Option<Size>,
    #[serde(default)]
    pub angle: f64,
    pub credential: Option<String>,
}

/// Messages from the orchestrator to the render worker.
///
/// Canvas surfaces travel next to the command (see the render crate's
/// envelope), never inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum WorkerCommand {
    /// Take the canvases, load both images and render
    Init {
        angle: f64,
        background: String,
        overlay: Option<String>,
        credential: Option<String>,
    },

    /// Canvas size changed
    Resize { width: u32, height: u32 },

    Rotate { angle: f64 },

    /// Brush preview when `buttons == 0`, stroke while the primary button is held
    Paint { x: f64, y: f64, buttons: u32 },

    /// Begin or continue a pan/select drag
    #[serde(alias = "move")]
    Record {
        x: f64,
        y: f64,
        #[serde(default)]
        gesture: Gesture,
    },

    EndPainting,
    EndSelecting,
    EndPanning,

    /// Fill a canvas-space rect with fog
    Obscure { rect: Rect },
    /// Clear a canvas-space rect
    Reveal { rect: Rect },
    /// Blank the whole overlay
    Clear,

    /// Propose a canvas-space selection as the new remote viewport
    Zoom { rect: Rect },
    ZoomIn { x: f64, y: f64 },
    ZoomOut { x: f64, y: f64 },

    Colour { r: u8, g: u8, b: u8 },
    Opacity { value: f32 },
    BrushInc,
    BrushDec,
    #[serde(rename = "blend_mode")]
    SetBlendMode { mode: BlendMode },

    /// Remote display snapshot
    Update(DisplayUpdate),
}

impl WorkerCommand {
    /// Wire name of the command, for logging
    pub fn name(&self) -> &'static str {
        match self {
            WorkerCommand::Init { .. } => "init",
            WorkerCommand::Resize { .. } => "resize",
            WorkerCommand::Rotate { .. } => "rotate",
            WorkerCommand::Paint { .. } => "paint",
            WorkerCommand::Record { .. } => "record",
            WorkerCommand::EndPainting => "end_painting",
            WorkerCommand::EndSelecting => "end_selecting",
            WorkerCommand::EndPanning => "end_panning",
            WorkerCommand::Obscure { .. } => "obscure",
            WorkerCommand::Reveal { .. } => "reveal",
            WorkerCommand::Clear => "clear",
            WorkerCommand::Zoom { .. } => "zoom",
            WorkerCommand::ZoomIn { .. } => "zoom_in",
            WorkerCommand::ZoomOut { .. } => "zoom_out",
            WorkerCommand::Colour { .. } => "colour",
            WorkerCommand::Opacity { .. } => "opacity",
            WorkerCommand::BrushInc => "brush_inc",
            WorkerCommand::BrushDec => "brush_dec",
            WorkerCommand::SetBlendMode { .. } => "blend_mode",
            WorkerCommand::Update(_) => "update",
        }
    }
}

/// Messages from the render worker back to the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum WorkerEvent {
    /// Both images decoded and rendered
    Initialized {
        /// Viewport size in canvas pixels
        width: u32,
        height: u32,
        /// Background size in source pixels
        full_width: u32,
        full_height: u32,
    },

    /// Fetch progress for one image, 0.0..=1.0
    Progress { image: ImageSlot, fraction: f32 },

    /// PNG bytes of the full-resolution overlay
    Overlay { blob: Vec<u8> },

    /// Proposed remote viewport in full-image coordinates
    Viewport { rect: Rect },

    PanComplete,

    /// Normalized selection in canvas coordinates
    SelectComplete { rect: Rect },

    /// Fetch or decode failed; the worker kept its previous state
    LoadFailed { image: ImageSlot, reason: String },
}

impl WorkerEvent {
    /// Wire name of the event, for logging
    pub fn name(&self) -> &'static str {
        match self {
            WorkerEvent::Initialized { .. } => "initialized",
            WorkerEvent::Progress { .. } => "progress",
            WorkerEvent::Overlay { .. } => "overlay",
            WorkerEvent::Viewport { .. } => "viewport",
            WorkerEvent::PanComplete => "pan_complete",
            WorkerEvent::SelectComplete { .. } => "select_complete",
            WorkerEvent::LoadFailed { .. } => "load_failed",
        }
    }
}
