//! Axis-aligned rectangle geometry
//!
//! World space is y-down: `min` is the top-left corner, `max` the
//! bottom-right. Overlap tests are strict, so rectangles that only share an
//! edge do not overlap.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Build from a top-left position and a size
    #[inline]
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.max.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Strict horizontal overlap of the two x-extents
    #[inline]
    pub fn overlaps_x(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x && self.max.x > other.min.x
    }

    /// Strict overlap on both axes
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.overlaps_x(other) && self.min.y < other.max.y && self.max.y > other.min.y
    }

    /// Smallest translation that moves `self` out of `other`.
    ///
    /// Returns `None` when the boxes do not overlap. The push is along the
    /// axis with the shallower penetration, signed away from `other`'s centre.
    pub fn separation_from(&self, other: &Aabb) -> Option<Vec2> {
        if !self.overlaps(other) {
            return None;
        }

        let push_left = other.min.x - self.max.x;
        let push_right = other.max.x - self.min.x;
        let push_up = other.min.y - self.max.y;
        let push_down = other.max.y - self.min.y;

        let dx = if push_right < -push_left {
            push_right
        } else {
            push_left
        };
        let dy = if push_down < -push_up { push_down } else { push_up };

        if dx.abs() < dy.abs() {
            Some(Vec2::new(dx, 0.0))
        } else {
            Some(Vec2::new(0.0, dy))
        }
    }
}
