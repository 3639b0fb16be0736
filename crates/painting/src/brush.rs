//! Brush engine for dab generation
//!
//! The engine interpolates between input points and spaces dabs along the
//! path so fast pointer moves still leave a continuous stroke.

use tracing::debug;

use crate::constants::{DEFAULT_BRUSH_RADIUS, MIN_BRUSH_RADIUS};

/// Brush configuration
#[derive(Debug, Clone)]
pub struct BrushSettings {
    /// Radius in canvas pixels
    pub radius: f32,
    /// Radius floor for `shrink`
    pub min_radius: f32,
    /// Amount `grow`/`shrink` change the radius by
    pub radius_step: f32,
    /// Hardness: 0.0 = soft, 1.0 = hard
    pub hardness: f32,
    /// Spacing as fraction of diameter (e.g., 0.25 = 25% of diameter)
    pub spacing: f32,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            radius: DEFAULT_BRUSH_RADIUS,
            min_radius: MIN_BRUSH_RADIUS,
            radius_step: 2.0,
            hardness: 1.0,
            spacing: 0.25,
        }
    }
}

impl BrushSettings {
    /// Create brush settings, clamping everything into a usable range
    pub fn new(radius: f32, min_radius: f32, radius_step: f32, hardness: f32, spacing: f32) -> Self {
        let min_radius = min_radius.max(0.5);
        Self {
            radius: radius.max(min_radius),
            min_radius,
            radius_step: radius_step.max(0.0),
            hardness: hardness.clamp(0.0, 1.0),
            spacing: spacing.max(0.01), // Prevent zero spacing
        }
    }
}

/// Output from brush engine for a single dab
#[derive(Debug, Clone, PartialEq)]
pub struct DabOutput {
    /// X position in surface coordinates
    pub x: f32,
    /// Y position in surface coordinates
    pub y: f32,
    /// Radius in pixels
    pub radius: f32,
    /// Hardness 0.0-1.0
    pub hardness: f32,
}

/// Brush engine that generates dabs from input
pub struct BrushEngine {
    settings: BrushSettings,
    /// Last position (None if stroke not started)
    last_pos: Option<(f32, f32)>,
    /// Accumulated distance since last dab
    distance_accumulator: f32,
}

impl BrushEngine {
    pub fn new(settings: BrushSettings) -> Self {
        Self {
            settings,
            last_pos: None,
            distance_accumulator: 0.0,
        }
    }

    pub fn settings(&self) -> &BrushSettings {
        &self.settings
    }

    pub fn radius(&self) -> f32 {
        self.settings.radius
    }

    /// Grow the radius by one step
    pub fn grow(&mut self) -> f32 {
        self.settings.radius += self.settings.radius_step;
        self.settings.radius
    }

    /// Shrink the radius by one step, never below `min_radius`
    pub fn shrink(&mut self) -> f32 {
        self.settings.radius =
            (self.settings.radius - self.settings.radius_step).max(self.settings.min_radius);
        self.settings.radius
    }

    /// Whether a stroke is in progress
    pub fn is_stroking(&self) -> bool {
        self.last_pos.is_some()
    }

    /// Start a new stroke
    pub fn begin_stroke(&mut self) {
        self.last_pos = None;
        self.distance_accumulator = 0.0;
    }

    fn dab_at(&self, x: f32, y: f32) -> DabOutput {
        DabOutput {
            x,
            y,
            radius: self.settings.radius,
            hardness: self.settings.hardness,
        }
    }

    /// Process input and generate dabs
    ///
    /// The first call of a stroke yields one dab at the input point; later
    /// calls place dabs every `spacing * diameter` along the segment from the
    /// previous point.
    pub fn stroke_to(&mut self, x: f32, y: f32) -> Vec<DabOutput> {
        let mut dabs = Vec::new();

        // First point in stroke - generate initial dab
        let Some((last_x, last_y)) = self.last_pos else {
            self.last_pos = Some((x, y));
            self.distance_accumulator = 0.0;
            debug!("BrushEngine::stroke_to: first dab at ({:.1}, {:.1})", x, y);
            dabs.push(self.dab_at(x, y));
            return dabs;
        };

        let dx = x - last_x;
        let dy = y - last_y;
        let distance = (dx * dx + dy * dy).sqrt();
        if distance < 0.001 {
            // No significant movement
            return dabs;
        }

        let spacing_distance = self.settings.radius * 2.0 * self.settings.spacing;
        if spacing_distance < 0.001 {
            self.last_pos = Some((x, y));
            return dabs;
        }

        // Distance already travelled since the last dab counts towards the next one
        let mut dab_start = (spacing_distance - self.distance_accumulator).max(0.0);
        let mut last_dab_at = None;
        while dab_start <= distance {
            let t = dab_start / distance;
            dabs.push(self.dab_at(last_x + dx * t, last_y + dy * t));
            last_dab_at = Some(dab_start);
            dab_start += spacing_distance;
        }

        self.distance_accumulator = match last_dab_at {
            Some(at) => distance - at,
            None => self.distance_accumulator + distance,
        };
        self.last_pos = Some((x, y));

        if !dabs.is_empty() {
            debug!(
                "BrushEngine::stroke_to: {} dabs from ({:.1}, {:.1}) to ({:.1}, {:.1})",
                dabs.len(),
                last_x,
                last_y,
                x,
                y
            );
        }

        dabs
    }

    /// End the current stroke
    pub fn end_stroke(&mut self) {
        self.last_pos = None;
        self.distance_accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_brush(radius: f32, spacing: f32) -> BrushEngine {
        BrushEngine::new(BrushSettings {
            radius,
            spacing,
            ..Default::default()
        })
    }

    #[test]
    fn test_brush_engine_first_dab() {
        let mut engine = fixed_brush(10.0, 0.5);
        engine.begin_stroke();

        let dabs = engine.stroke_to(100.0, 100.0);

        assert_eq!(dabs.len(), 1);
        assert!((dabs[0].x - 100.0).abs() < 0.001);
        assert!((dabs[0].y - 100.0).abs() < 0.001);
        assert!(engine.is_stroking());
    }

    #[test]
    fn test_brush_engine_interpolation() {
        // diameter 20 * spacing 0.5 = one dab every 10 pixels
        let mut engine = fixed_brush(10.0, 0.5);
        engine.begin_stroke();
        engine.stroke_to(0.0, 0.0);

        let dabs = engine.stroke_to(50.0, 0.0);
        assert_eq!(dabs.len(), 5);
        assert!((dabs[0].x - 10.0).abs() < 0.001);
        assert!((dabs[4].x - 50.0).abs() < 0.001);
    }

    #[test]
    fn test_brush_engine_accumulates_small_moves() {
        let mut engine = fixed_brush(10.0, 0.5);
        engine.begin_stroke();
        engine.stroke_to(0.0, 0.0);

        assert!(engine.stroke_to(4.0, 0.0).is_empty());
        assert!(engine.stroke_to(8.0, 0.0).is_empty());
        let dabs = engine.stroke_to(12.0, 0.0);
        assert_eq!(dabs.len(), 1);
        assert!((dabs[0].x - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_brush_engine_end_stroke() {
        let mut engine = fixed_brush(10.0, 0.25);
        engine.begin_stroke();
        engine.stroke_to(0.0, 0.0);
        engine.stroke_to(50.0, 0.0);
        engine.end_stroke();
        assert!(!engine.is_stroking());

        // After ending, next stroke_to should generate first dab again
        engine.begin_stroke();
        let dabs = engine.stroke_to(100.0, 100.0);
        assert_eq!(dabs.len(), 1);
    }

    #[test]
    fn test_shrink_has_floor() {
        let mut engine = BrushEngine::new(BrushSettings::new(6.0, 2.0, 3.0, 1.0, 0.25));
        assert_eq!(engine.shrink(), 3.0);
        assert_eq!(engine.shrink(), 2.0);
        assert_eq!(engine.shrink(), 2.0);
        assert_eq!(engine.grow(), 5.0);
    }
}
