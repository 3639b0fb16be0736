//! Paint and gesture payloads.

use serde::{Deserialize, Serialize};

/// Blend mode for painting operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    #[default]
    Normal = 0,
    Erase = 1,
}

/// What a drag gesture does. Fixed by the first `record` of the gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gesture {
    #[default]
    Pan,
    Select,
}
