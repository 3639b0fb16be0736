//! Raw pointer input as delivered by the UI layer.

use serde::{Deserialize, Serialize};

/// Bit set in `buttons` while the primary button is held.
pub const PRIMARY_BUTTON: u32 = 1;

/// Pointer event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    Down,
    Move,
    Up,
    Out,
    Wheel,
}

/// A pointer event in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub x: f64,
    pub y: f64,
    /// Held buttons bitmask (1 = primary)
    pub buttons: u32,
    /// Wheel delta, negative scrolls away from the user
    #[serde(default)]
    pub delta_y: f64,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, x: f64, y: f64, buttons: u32) -> Self {
        Self {
            kind,
            x,
            y,
            buttons,
            delta_y: 0.0,
        }
    }

    pub fn wheel(x: f64, y: f64, delta_y: f64) -> Self {
        Self {
            kind: PointerKind::Wheel,
            x,
            y,
            buttons: 0,
            delta_y,
        }
    }
}
