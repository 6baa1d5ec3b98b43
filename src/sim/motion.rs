//! Motion patterns for moving platforms and enemies
//!
//! A pattern is a pure function of elapsed time. Bodies keep the anchor they
//! were built with and are re-placed at `anchor + offset(t)` every tick, so
//! no error accumulates however long the level runs.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::level::{MovementKind, MovementSpec};
use crate::{sine_ease_in_out, triangle_wave};

/// How a body moves relative to its anchor
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum MovementPattern {
    #[default]
    None,
    /// Linear back-and-forth between `0` and `+distance` on x
    HorizontalShuttle { distance: f32, half_period: f32 },
    /// Sine-eased bob between `0` and `+amplitude` on y
    VerticalOscillate { amplitude: f32, half_period: f32 },
}

impl MovementPattern {
    /// Pattern declared in level data (`frequency` is ms per sweep)
    pub fn from_spec(spec: &MovementSpec) -> Self {
        let half_period = spec.frequency / 1000.0;
        match spec.kind {
            MovementKind::None => MovementPattern::None,
            MovementKind::Horizontal => MovementPattern::HorizontalShuttle {
                distance: spec.amplitude,
                half_period,
            },
            MovementKind::Sine => MovementPattern::VerticalOscillate {
                amplitude: spec.amplitude,
                half_period,
            },
        }
    }

    /// Offset from the anchor at elapsed time `t` (seconds)
    pub fn offset(&self, t: f32) -> Vec2 {
        match *self {
            MovementPattern::None => Vec2::ZERO,
            MovementPattern::HorizontalShuttle {
                distance,
                half_period,
            } => Vec2::new(distance * triangle_wave(t, half_period), 0.0),
            MovementPattern::VerticalOscillate {
                amplitude,
                half_period,
            } => Vec2::new(0.0, amplitude * sine_ease_in_out(triangle_wave(t, half_period))),
        }
    }

    pub fn is_moving(&self) -> bool {
        !matches!(self, MovementPattern::None)
    }
}

/// A pattern bound to the position it was placed at
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionBinding {
    pub anchor: Vec2,
    pub pattern: MovementPattern,
}

impl MotionBinding {
    pub fn new(anchor: Vec2, pattern: MovementPattern) -> Self {
        Self { anchor, pattern }
    }

    /// World position at elapsed time `t`
    #[inline]
    pub fn position_at(&self, t: f32) -> Vec2 {
        self.anchor + self.pattern.offset(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shuttle_triangle() {
        let p = MovementPattern::HorizontalShuttle {
            distance: 200.0,
            half_period: 2.0,
        };
        assert_eq!(p.offset(0.0), Vec2::ZERO);
        assert!((p.offset(1.0).x - 100.0).abs() < 1e-3);
        assert!((p.offset(2.0).x - 200.0).abs() < 1e-3);
        assert!((p.offset(3.0).x - 100.0).abs() < 1e-3);
        assert!(p.offset(4.0).x.abs() < 1e-3);
        assert_eq!(p.offset(1.3).y, 0.0);
    }

    #[test]
    fn test_vertical_oscillate_sine_ease() {
        let p = MovementPattern::VerticalOscillate {
            amplitude: 80.0,
            half_period: 1.5,
        };
        assert!(p.offset(0.0).y.abs() < 1e-4);
        assert!((p.offset(0.75).y - 40.0).abs() < 1e-3);
        assert!((p.offset(1.5).y - 80.0).abs() < 1e-3);
        assert_eq!(p.offset(0.4).x, 0.0);
        // Eased: slower than linear near the ends
        assert!(p.offset(0.15).y < 80.0 * 0.1);
    }

    #[test]
    fn test_from_spec_converts_milliseconds() {
        let spec = MovementSpec {
            kind: MovementKind::Horizontal,
            amplitude: 150.0,
            frequency: 2500.0,
        };
        assert_eq!(
            MovementPattern::from_spec(&spec),
            MovementPattern::HorizontalShuttle {
                distance: 150.0,
                half_period: 2.5
            }
        );
    }

    #[test]
    fn test_binding_does_not_drift() {
        let binding = MotionBinding::new(
            Vec2::new(1000.0, 300.0),
            MovementPattern::HorizontalShuttle {
                distance: 200.0,
                half_period: 2.0,
            },
        );
        // Many small steps land exactly where a single evaluation would
        let mut t = 0.0_f64;
        for _ in 0..4800 {
            t += 1.0 / 120.0;
        }
        let pos = binding.position_at(t as f32);
        assert!((pos - binding.position_at(40.0)).length() < 0.01);
        assert!(pos.x >= 1000.0 && pos.x <= 1200.0);
    }
}
