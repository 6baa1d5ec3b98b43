//! Follow camera
//!
//! Horizontal only; the vertical offset is fixed. The target is derived from
//! the player every tick and clamped to the world, then the camera closes a
//! fixed fraction of the distance to it.

use super::state::{Body, CameraState};
use crate::lerp;
use crate::settings::Settings;

/// Offset that centres the player, clamped to the world
pub fn camera_target(player: &Body, settings: &Settings) -> f32 {
    (player.center_x() - settings.viewport_width / 2.0).clamp(0.0, settings.camera_max())
}

/// Advance the camera one tick toward the player
pub fn track(prev: CameraState, player: &Body, settings: &Settings) -> CameraState {
    let target = camera_target(player, settings);
    let x = lerp(prev.x, target, settings.camera_damping).clamp(0.0, settings.camera_max());
    CameraState { x }
}

/// Camera locked onto the player with no smoothing (level start, restart)
pub fn snap(player: &Body, settings: &Settings) -> CameraState {
    CameraState {
        x: camera_target(player, settings),
    }
}
