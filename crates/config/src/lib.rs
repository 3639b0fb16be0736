//! Shared configuration for Scrim
//!
//! This crate provides the single source of truth for canvas dimensions,
//! zoom stepping, brush limits and worker timing, shared by the editor,
//! the remote display and the headless CLI.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default canvas width in pixels
pub const DEFAULT_WIDTH: u32 = 1920;

/// Default canvas height in pixels
pub const DEFAULT_HEIGHT: u32 = 1080;

/// Default scale factor (1.0 = no scaling)
pub const DEFAULT_SCALE: f32 = 1.0;

/// Zoom changes by this much per wheel click
pub const DEFAULT_ZOOM_STEP: f64 = 0.5;

/// Lowest zoom (source pixels per canvas pixel) the editor allows
pub const DEFAULT_MIN_ZOOM: f64 = 0.5;

/// Errors loading or validating configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Canvas size for editor and display windows
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Canvas width in logical pixels
    pub width: u32,
    /// Canvas height in logical pixels
    pub height: u32,
    /// Scale factor for DPI scaling
    pub scale: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            scale: DEFAULT_SCALE,
        }
    }
}

impl CanvasConfig {
    /// Create a new canvas config with the given dimensions
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            scale: DEFAULT_SCALE,
        }
    }

    /// Get scaled width (for physical pixel calculations)
    pub fn scaled_width(&self) -> u32 {
        (self.width as f32 * self.scale) as u32
    }

    /// Get scaled height (for physical pixel calculations)
    pub fn scaled_height(&self) -> u32 {
        (self.height as f32 * self.scale) as u32
    }
}

/// Zoom stepping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub step: f64,
    pub min_zoom: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            step: DEFAULT_ZOOM_STEP,
            min_zoom: DEFAULT_MIN_ZOOM,
        }
    }
}

/// Brush defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushConfig {
    pub radius: f32,
    /// `brush_dec` never goes below this
    pub min_radius: f32,
    pub radius_step: f32,
    pub hardness: f32,
    /// Dab spacing as a fraction of the diameter
    pub spacing: f32,
    pub colour: [u8; 3],
    pub opacity: f32,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            radius: 20.0,
            min_radius: 2.0,
            radius_step: 2.0,
            hardness: 1.0,
            spacing: 0.25,
            colour: [0, 0, 0],
            opacity: 1.0,
        }
    }
}

/// Render worker timing and appearance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Gesture frame loop period
    pub frame_interval_ms: u64,
    /// Per-image fetch timeout, 0 disables it
    pub fetch_timeout_ms: u64,
    /// Alpha multiplier for the hover brush preview
    pub preview_alpha: f32,
    /// Colour used by `obscure`
    pub fog_colour: [u8; 4],
    /// Outline colour of the selection box
    pub selection_colour: [u8; 4],
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 16,
            fetch_timeout_ms: 30_000,
            preview_alpha: 0.5,
            fog_colour: [0, 0, 0, 255],
            selection_colour: [255, 255, 255, 255],
        }
    }
}

impl WorkerConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms.max(1))
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        (self.fetch_timeout_ms > 0).then(|| Duration::from_millis(self.fetch_timeout_ms))
    }
}

/// Remote display controls driven from the editor
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Scale applied to the stored viewport by remote zoom in/out
    pub zoom_factor: f64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self { zoom_factor: 1.25 }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrimConfig {
    pub canvas: CanvasConfig,
    pub zoom: ZoomConfig,
    pub brush: BrushConfig,
    pub worker: WorkerConfig,
    pub remote: RemoteConfig,
}

impl ScrimConfig {
    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: ScrimConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Reject values the worker cannot operate with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(invalid("canvas", "width and height must be non-zero"));
        }
        if !(self.zoom.step > 0.0) {
            return Err(invalid("zoom.step", "must be positive"));
        }
        if !(self.zoom.min_zoom > 0.0) {
            return Err(invalid("zoom.min_zoom", "must be positive"));
        }
        if !(self.brush.min_radius > 0.0) || self.brush.radius < self.brush.min_radius {
            return Err(invalid("brush.radius", "must be at least brush.min_radius"));
        }
        if !(0.0..=1.0).contains(&self.brush.opacity) {
            return Err(invalid("brush.opacity", "must be within 0..=1"));
        }
        if !(0.0..=1.0).contains(&self.worker.preview_alpha) {
            return Err(invalid("worker.preview_alpha", "must be within 0..=1"));
        }
        if !(self.remote.zoom_factor > 1.0) {
            return Err(invalid("remote.zoom_factor", "must be greater than 1"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScrimConfig::default();
        assert_eq!(config.canvas.width, DEFAULT_WIDTH);
        assert_eq!(config.canvas.height, DEFAULT_HEIGHT);
        assert_eq!(config.zoom.step, DEFAULT_ZOOM_STEP);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_scaled_dimensions() {
        let mut canvas = CanvasConfig::default();
        canvas.scale = 2.0;
        assert_eq!(canvas.scaled_width(), 3840);
        assert_eq!(canvas.scaled_height(), 2160);
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config =
            ScrimConfig::from_json_str(r#"{"canvas": {"width": 1000, "height": 800}}"#).unwrap();
        assert_eq!(config.canvas.width, 1000);
        assert_eq!(config.brush.radius, 20.0);
        assert_eq!(config.worker.fetch_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_zero_timeout_disables_it() {
        let config = ScrimConfig::from_json_str(r#"{"worker": {"fetch_timeout_ms": 0}}"#).unwrap();
        assert_eq!(config.worker.fetch_timeout(), None);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = ScrimConfig::from_json_str(r#"{"zoom": {"step": 0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "zoom.step", .. }));

        let err = ScrimConfig::from_json_str(r#"{"brush": {"radius": 1, "min_radius": 2}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "brush.radius", .. }));

        assert!(matches!(
            ScrimConfig::from_json_str("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
