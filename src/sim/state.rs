//! Simulation state and core runtime types
//!
//! Everything a level needs between ticks lives in `SimulationState`, so a
//! snapshot of it is enough to resume a run deterministically.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::motion::MotionBinding;
use super::rect::Aabb;
use crate::settings::Settings;

/// Where the run stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    /// Ticks mutate state
    Running,
    /// Reached the end boundary
    Won,
    /// Died
    Lost,
}

impl Lifecycle {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Lifecycle::Running)
    }
}

/// Runtime body category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    Player,
    Platform,
    FlyingPlatform,
    Enemy,
    FlyingEnemy,
    Trap,
    Collectible,
}

/// A rectangular entity taking part in collision
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: u32,
    pub kind: BodyKind,
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    /// Standing on a surface this tick (player only)
    pub grounded: bool,
    /// Never moves
    pub is_static: bool,
    /// Anchor + pattern for moving bodies
    pub motion: Option<MotionBinding>,
    /// Displacement applied by the last reposition
    #[serde(default)]
    pub delta: Vec2,
    /// Index of the `WorldObjectSpec` this body was placed from
    pub spec_index: Option<usize>,
}

impl Body {
    pub fn new(id: u32, kind: BodyKind, pos: Vec2, size: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            size,
            grounded: false,
            is_static: true,
            motion: None,
            delta: Vec2::ZERO,
            spec_index: None,
        }
    }

    #[inline]
    pub fn rect(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, self.size)
    }

    /// Rectangle before the last reposition
    #[inline]
    pub fn prev_rect(&self) -> Aabb {
        Aabb::from_pos_size(self.pos - self.delta, self.size)
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.pos.x + self.size.x * 0.5
    }

    pub fn is_moving(&self) -> bool {
        self.motion.is_some_and(|m| m.pattern.is_moving())
    }

    /// Place a patterned body for elapsed time `t`, recording the displacement
    pub fn reposition(&mut self, t: f32, dt: f32) {
        if let Some(binding) = self.motion {
            let next = binding.position_at(t);
            self.delta = next - self.pos;
            self.vel = if dt > 0.0 { self.delta / dt } else { Vec2::ZERO };
            self.pos = next;
        }
    }
}

/// A solid run of ground between gaps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundSegment {
    pub x: f32,
    pub width: f32,
    /// Surface y (the ground line)
    pub top: f32,
    pub thickness: f32,
}

impl GroundSegment {
    #[inline]
    pub fn end(&self) -> f32 {
        self.x + self.width
    }

    pub fn rect(&self) -> Aabb {
        Aabb::new(
            Vec2::new(self.x, self.top),
            Vec2::new(self.end(), self.top + self.thickness),
        )
    }
}

/// A horizontal interval with no ground
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gap {
    pub x: f32,
    pub width: f32,
    /// Declared pit depth (informational; the death line decides)
    pub depth: f32,
}

impl Gap {
    #[inline]
    pub fn end(&self) -> f32 {
        self.x + self.width
    }

    /// Half-open containment `[x, x + width)`
    #[inline]
    pub fn contains(&self, x: f32) -> bool {
        x >= self.x && x < self.end()
    }
}

/// Movement constants of the selected character
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerPhysics {
    pub gravity: f32,
    pub run_speed: f32,
    pub jump_speed: f32,
}

/// Why the run was lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Enemy,
    Trap,
    FlyingEnemy,
    /// Dropped through a gap below the death line
    FellInGap,
    /// Below the death line outside any gap
    Fell,
}

/// Discrete outcomes of a tick, for the UI collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PickedUpCoin { body_id: u32, value: u64 },
    Died { cause: DeathCause, score: u64 },
    Won { score: u64 },
}

/// Horizontal viewport offset
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraState {
    pub x: f32,
}

/// Complete level state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationState {
    /// Boundary constants the world was built with
    pub settings: Settings,
    /// Selected character key
    pub character: String,
    pub physics: PlayerPhysics,
    pub player: Body,
    /// Static and moving platforms, flying platforms included
    pub platforms: Vec<Body>,
    /// Ground enemies, stable enemies and traps (blocking, lethal)
    pub hazards: Vec<Body>,
    /// Flying enemies (pass-through, lethal)
    pub flyers: Vec<Body>,
    pub collectibles: Vec<Body>,
    /// Sorted, disjoint
    pub ground: Vec<GroundSegment>,
    /// Merged gap intervals, sorted
    pub gaps: Vec<Gap>,
    pub score: u64,
    /// Seconds simulated
    pub elapsed: f64,
    pub time_ticks: u64,
    pub lifecycle: Lifecycle,
    pub camera: CameraState,
    next_id: u32,
}

impl SimulationState {
    /// Empty world around a player; the world builder fills the collections
    pub fn new(settings: Settings, character: String, physics: PlayerPhysics, player: Body) -> Self {
        let next_id = player.id + 1;
        Self {
            settings,
            character,
            physics,
            player,
            platforms: Vec::new(),
            hazards: Vec::new(),
            flyers: Vec::new(),
            collectibles: Vec::new(),
            ground: Vec::new(),
            gaps: Vec::new(),
            score: 0,
            elapsed: 0.0,
            time_ticks: 0,
            lifecycle: Lifecycle::Running,
            camera: CameraState::default(),
            next_id,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    /// Gap under the player's centre, if the player is unsupported
    pub fn gap_under_player(&self) -> Option<&Gap> {
        if self.player.grounded {
            return None;
        }
        let cx = self.player.center_x();
        self.gaps.iter().find(|g| g.contains(cx))
    }

    /// Every moving body, in collection order
    pub fn moving_bodies_mut(&mut self) -> impl Iterator<Item = &mut Body> {
        self.platforms
            .iter_mut()
            .chain(self.hazards.iter_mut())
            .chain(self.flyers.iter_mut())
            .filter(|b| b.is_moving())
    }
}
