//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied timestep only
//! - Seeded RNG only (level generation)
//! - Stable iteration order (collection order, fixed at build time)
//! - No rendering, audio or input-device dependencies

pub mod camera;
pub mod collision;
pub mod error;
pub mod generate;
pub mod level;
pub mod motion;
pub mod rect;
pub mod state;
pub mod tick;
pub mod world;

pub use camera::{camera_target, snap, track};
pub use collision::{Support, Verdict, is_supported_by, resolve};
pub use error::{ConfigIssue, SimError};
pub use generate::{LevelConfig, default_roster, generate_level};
pub use level::{
    Category, CharacterSpec, Hitbox, LevelDescriptor, MovementKind, MovementSpec, ObjectType, Palette,
    PhysicsSpec, Point, SpeedSpec, WorldObjectSpec,
};
pub use motion::{MotionBinding, MovementPattern};
pub use rect::Aabb;
pub use state::{
    Body, BodyKind, CameraState, DeathCause, Gap, GameEvent, GroundSegment, Lifecycle, PlayerPhysics,
    SimulationState,
};
pub use tick::{Intent, TickOutput, autopilot, tick};
pub use world::{PLAYER_ID, build_ground, build_world};
