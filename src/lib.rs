//! Gap Dash - a side-scrolling platformer simulation
//!
//! Core modules:
//! - `sim`: Deterministic level simulation (world building, physics, collisions)
//! - `session`: Fixed-timestep driver, restart and character selection
//! - `settings`: World boundary constants and tuning
//! - `highscores`: Leaderboard of finished runs

pub mod highscores;
pub mod session;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use session::Session;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame the session will catch up on (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// World defaults
    pub const WORLD_WIDTH: f32 = 24_500.0;
    pub const END_MARGIN: f32 = 100.0;
    pub const GROUND_LINE_FRACTION: f32 = 0.7;
    pub const DEATH_EPSILON: f32 = 1.0;
    pub const GROUND_THICKNESS: f32 = 8.0;

    /// Viewport defaults
    pub const VIEWPORT_WIDTH: f32 = 1500.0;
    pub const VIEWPORT_HEIGHT: f32 = 800.0;
    pub const CAMERA_DAMPING: f32 = 0.5;

    /// Physics defaults
    pub const DEFAULT_GRAVITY: f32 = 1000.0;
    pub const SUPPORT_TOLERANCE: f32 = 4.0;

    /// Motion pattern defaults
    pub const SHUTTLE_DISTANCE: f32 = 200.0;
    pub const SHUTTLE_HALF_PERIOD: f32 = 2.0;
    pub const OSCILLATE_AMPLITUDE: f32 = 100.0;
    pub const OSCILLATE_HALF_PERIOD: f32 = 2.0;

    /// Points per coin
    pub const COIN_VALUE: u64 = 100;
}

/// Triangle wave over a half-period: 0 → 1 at `t = half_period` → 0 at `2 * half_period`
#[inline]
pub fn triangle_wave(t: f32, half_period: f32) -> f32 {
    if half_period <= 0.0 {
        return 0.0;
    }
    let phase = (t / half_period).rem_euclid(2.0);
    if phase <= 1.0 { phase } else { 2.0 - phase }
}

/// Sine ease-in-out on [0, 1]
#[inline]
pub fn sine_ease_in_out(p: f32) -> f32 {
    0.5 * (1.0 - (std::f32::consts::PI * p).cos())
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_wave() {
        assert_eq!(triangle_wave(0.0, 2.0), 0.0);
        assert!((triangle_wave(1.0, 2.0) - 0.5).abs() < 1e-6);
        assert!((triangle_wave(2.0, 2.0) - 1.0).abs() < 1e-6);
        assert!((triangle_wave(3.0, 2.0) - 0.5).abs() < 1e-6);
        assert!(triangle_wave(4.0, 2.0).abs() < 1e-6);
        assert_eq!(triangle_wave(1.0, 0.0), 0.0);
    }

    #[test]
    fn test_sine_ease_endpoints() {
        assert!(sine_ease_in_out(0.0).abs() < 1e-6);
        assert!((sine_ease_in_out(0.5) - 0.5).abs() < 1e-6);
        assert!((sine_ease_in_out(1.0) - 1.0).abs() < 1e-6);
    }
}
