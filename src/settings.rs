//! Level boundary constants and simulation tuning
//!
//! Everything here is configuration rather than per-level data. Loaded from
//! JSON with camelCase keys; missing keys fall back to the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::error::{ConfigIssue, SimError};

/// World and simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    // === World ===
    /// Horizontal extent of the level, pixels
    pub world_width: f32,
    /// Ground line as a fraction of the viewport height
    pub ground_line_fraction: f32,
    /// How far below the ground line the player may sink before dying
    pub death_epsilon: f32,
    /// Distance before the world's right edge that counts as the finish
    pub end_margin: f32,
    /// Thickness of generated ground segments
    pub ground_thickness: f32,

    // === Physics ===
    /// Gravity used when a character does not specify its own (px/s²)
    pub default_gravity: f32,
    /// Vertical slack for the "standing on top" test
    pub support_tolerance: f32,

    // === Viewport ===
    pub viewport_width: f32,
    pub viewport_height: f32,
    /// Fraction of the remaining distance the camera closes each tick (1.0 = locked)
    pub camera_damping: f32,

    // === Scoring ===
    pub coin_value: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            world_width: WORLD_WIDTH,
            ground_line_fraction: GROUND_LINE_FRACTION,
            death_epsilon: DEATH_EPSILON,
            end_margin: END_MARGIN,
            ground_thickness: GROUND_THICKNESS,

            default_gravity: DEFAULT_GRAVITY,
            support_tolerance: SUPPORT_TOLERANCE,

            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,
            camera_damping: CAMERA_DAMPING,

            coin_value: COIN_VALUE,
        }
    }
}

impl Settings {
    /// Y coordinate of the nominal ground line
    pub fn ground_line(&self) -> f32 {
        self.viewport_height * self.ground_line_fraction
    }

    /// Player top edge below this is a fall death
    pub fn death_y(&self) -> f32 {
        self.ground_line() + self.death_epsilon
    }

    /// Player x at or past this completes the level
    pub fn end_boundary(&self) -> f32 {
        self.world_width - self.end_margin
    }

    /// Largest camera offset
    pub fn camera_max(&self) -> f32 {
        (self.world_width - self.viewport_width).max(0.0)
    }

    /// Check that the settings describe a playable world
    pub fn validate(&self) -> Result<(), SimError> {
        let mut issues = Vec::new();
        let mut positive = |field: &'static str, value: f32| {
            if !(value.is_finite() && value > 0.0) {
                issues.push(ConfigIssue::new("settings", field, format!("must be positive, got {value}")));
            }
        };

        positive("worldWidth", self.world_width);
        positive("viewportWidth", self.viewport_width);
        positive("viewportHeight", self.viewport_height);
        positive("defaultGravity", self.default_gravity);
        positive("groundThickness", self.ground_thickness);

        if !(self.ground_line_fraction > 0.0 && self.ground_line_fraction < 1.0) {
            issues.push(ConfigIssue::new(
                "settings",
                "groundLineFraction",
                format!("must be in (0, 1), got {}", self.ground_line_fraction),
            ));
        }
        if !(self.death_epsilon.is_finite() && self.death_epsilon >= 0.0) {
            issues.push(ConfigIssue::new("settings", "deathEpsilon", "must be non-negative"));
        }
        if !(self.support_tolerance.is_finite() && self.support_tolerance >= 0.0) {
            issues.push(ConfigIssue::new("settings", "supportTolerance", "must be non-negative"));
        }
        if !(self.camera_damping > 0.0 && self.camera_damping <= 1.0) {
            issues.push(ConfigIssue::new(
                "settings",
                "cameraDamping",
                format!("must be in (0, 1], got {}", self.camera_damping),
            ));
        }
        if !(self.end_margin.is_finite() && self.end_margin >= 0.0 && self.end_margin < self.world_width) {
            issues.push(ConfigIssue::new("settings", "endMargin", "must be within the world width"));
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(SimError::Configuration(issues))
        }
    }

    /// Parse settings from a JSON document and validate them
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let settings: Settings = serde_json::from_str(json)
            .map_err(|e| SimError::config("settings", "document", format!("Parse error: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            SimError::config(path.display().to_string(), "file", format!("IO error: {e}"))
        })?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}
