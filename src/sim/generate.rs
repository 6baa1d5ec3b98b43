//! Procedural level generation
//!
//! Produces a `LevelDescriptor` from a `LevelConfig` and a seed. The same
//! seed and config always give the same level. The world is laid out in
//! fixed-width chunks after a hazard-free start zone; each chunk rolls for a
//! gap, a patrolling enemy, a flyer, a coin row and a lift.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::error::{ConfigIssue, SimError};
use super::level::{
    Category, CharacterSpec, Hitbox, LevelDescriptor, MovementKind, MovementSpec, ObjectType, Palette,
    PhysicsSpec, Point, SpeedSpec, WorldObjectSpec,
};
use crate::settings::Settings;

/// Width of one generation chunk
pub const CHUNK_WIDTH: f32 = 800.0;
/// Nothing dangerous spawns before this x
pub const SAFE_ZONE: f32 = 800.0;
/// Clear run-up before the finish
const FINISH_RUNWAY: f32 = 400.0;

const SPAWN_X: f32 = 100.0;
const PLAYER_HITBOX: Hitbox = Hitbox {
    width: 40.0,
    height: 60.0,
};
const PLAYER_GRAVITY: f32 = 1200.0;
/// (run, jump) per character model
const CHARACTER_STATS: [(f32, f32); 4] = [(300.0, 600.0), (320.0, 580.0), (280.0, 640.0), (340.0, 560.0)];

const ENEMY_SIZE: f32 = 40.0;
const ENEMY_PATROL: f32 = 120.0;
const FLYER_SIZE: f32 = 40.0;
/// Anchor height above the ground; the lowest point clears every roster jump
const FLYER_ALTITUDE: f32 = 400.0;
const FLYER_AMPLITUDE: f32 = 100.0;
const FLYER_SWEEP_MS: f32 = 2000.0;
const COIN_SIZE: f32 = 24.0;
const COIN_ROW: usize = 3;
const COIN_SPACING: f32 = 40.0;
const LIFT_WIDTH: f32 = 120.0;
const LIFT_HEIGHT: f32 = 20.0;
const LIFT_TRAVEL: f32 = 100.0;
const LIFT_CHANCE: f64 = 0.5;

/// Tuning for generated levels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LevelConfig {
    /// Lift speed in px/s; 0 disables lifts
    pub platform_speed: f32,
    /// Ground enemy patrol speed in px/s
    pub enemy_speed: f32,
    /// Per-chunk chance of a ground enemy
    pub enemy_spawn_rate: f64,
    /// Per-chunk chance of a flying enemy
    pub flying_enemy_spawn_rate: f64,
    /// Per-chunk chance of a coin row
    pub coin_spawn_rate: f64,
    /// Per-chunk chance of a gap
    pub gap_spawn_rate: f64,
    pub platform_gap_min: f32,
    pub platform_gap_max: f32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            platform_speed: 100.0,
            enemy_speed: 100.0,
            enemy_spawn_rate: 0.3,
            flying_enemy_spawn_rate: 0.2,
            coin_spawn_rate: 0.5,
            gap_spawn_rate: 0.4,
            platform_gap_min: 120.0,
            platform_gap_max: 220.0,
        }
    }
}

impl LevelConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        let mut issues = Vec::new();
        for (field, rate) in [
            ("enemySpawnRate", self.enemy_spawn_rate),
            ("flyingEnemySpawnRate", self.flying_enemy_spawn_rate),
            ("coinSpawnRate", self.coin_spawn_rate),
            ("gapSpawnRate", self.gap_spawn_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                issues.push(ConfigIssue::new("level config", field, format!("must be in [0, 1], got {rate}")));
            }
        }
        if !(self.platform_speed.is_finite() && self.platform_speed >= 0.0) {
            issues.push(ConfigIssue::new("level config", "platformSpeed", "must be non-negative"));
        }
        if !(self.enemy_speed.is_finite() && self.enemy_speed > 0.0) {
            issues.push(ConfigIssue::new("level config", "enemySpeed", "must be positive"));
        }
        if !(self.platform_gap_min > 0.0 && self.platform_gap_min <= self.platform_gap_max) {
            issues.push(ConfigIssue::new(
                "level config",
                "platformGapMin",
                "must be positive and no larger than platformGapMax",
            ));
        }
        if !(self.platform_gap_max <= CHUNK_WIDTH / 2.0) {
            issues.push(ConfigIssue::new(
                "level config",
                "platformGapMax",
                format!("must be at most {}", CHUNK_WIDTH / 2.0),
            ));
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(SimError::Configuration(issues))
        }
    }
}

/// Selectable characters: four models in each palette
pub fn default_roster() -> Vec<CharacterSpec> {
    let mut roster = Vec::with_capacity(CHARACTER_STATS.len() * Palette::ALL.len());
    for (n, &(run, jump)) in CHARACTER_STATS.iter().enumerate() {
        for palette in Palette::ALL {
            roster.push(CharacterSpec {
                key: format!("player{}_{}", n + 1, palette.as_str()),
                spawn_point: Point { x: SPAWN_X, y: 0.0 },
                hitbox: PLAYER_HITBOX,
                physics: PhysicsSpec {
                    gravity: Some(PLAYER_GRAVITY),
                    speed: SpeedSpec { run, jump },
                },
                palette: Some(palette),
                scale: 1.0,
            });
        }
    }
    roster
}

/// Placements collected while walking the chunks
#[derive(Default)]
struct Layout {
    gaps: Vec<(f32, f32)>,
    enemies: Vec<Point>,
    flyers: Vec<Point>,
    coins: Vec<Point>,
    lifts: Vec<Point>,
}

fn object(key: &str, kind: ObjectType, positions: Vec<Point>, width: f32, height: f32) -> WorldObjectSpec {
    WorldObjectSpec {
        key: key.to_string(),
        kind,
        category: None,
        positions,
        hitbox: Hitbox { width, height },
        scale: 1.0,
        is_static: true,
        movement: None,
    }
}

/// Generate a level for `settings` from `seed`
pub fn generate_level(config: &LevelConfig, settings: &Settings, seed: u64) -> Result<LevelDescriptor, SimError> {
    config.validate()?;
    settings.validate()?;

    let mut rng = Pcg32::seed_from_u64(seed);
    let ground = settings.ground_line();
    let last_chunk = settings.end_boundary() - FINISH_RUNWAY - CHUNK_WIDTH;
    let mut layout = Layout::default();

    let mut x = SAFE_ZONE;
    while x <= last_chunk {
        // Enemy patrols the first quarter; the gap sits in the middle half
        if rng.random_bool(config.enemy_spawn_rate) {
            layout.enemies.push(Point {
                x: x + 30.0,
                y: ground - ENEMY_SIZE,
            });
        }

        if rng.random_bool(config.gap_spawn_rate) {
            let width = rng
                .random_range(config.platform_gap_min..=config.platform_gap_max)
                .round()
                .clamp(config.platform_gap_min, config.platform_gap_max);
            let lo = x + CHUNK_WIDTH * 0.25;
            let hi = x + CHUNK_WIDTH * 0.75 - width;
            let gap_x = rng.random_range(lo..=hi).round().clamp(lo, hi);
            layout.gaps.push((gap_x, width));

            if config.platform_speed > 0.0 && rng.random_bool(LIFT_CHANCE) {
                layout.lifts.push(Point {
                    x: gap_x - LIFT_WIDTH / 2.0,
                    y: ground - 120.0,
                });
            }
        }

        if rng.random_bool(config.flying_enemy_spawn_rate) {
            let fx = rng.random_range(x + CHUNK_WIDTH * 0.5..=x + CHUNK_WIDTH - FLYER_SIZE).round();
            layout.flyers.push(Point {
                x: fx,
                y: ground - FLYER_ALTITUDE,
            });
        }

        if rng.random_bool(config.coin_spawn_rate) {
            for i in 0..COIN_ROW {
                layout.coins.push(Point {
                    x: x + CHUNK_WIDTH * 0.55 + i as f32 * COIN_SPACING,
                    y: ground - 90.0,
                });
            }
        }

        x += CHUNK_WIDTH;
    }

    let mut objects = Vec::new();

    if !layout.enemies.is_empty() {
        let mut crab = object("crab", ObjectType::Enemy, layout.enemies, ENEMY_SIZE, ENEMY_SIZE);
        crab.category = Some(Category::Ground);
        crab.is_static = false;
        crab.movement = Some(MovementSpec {
            kind: MovementKind::Horizontal,
            amplitude: ENEMY_PATROL,
            frequency: ENEMY_PATROL / config.enemy_speed * 1000.0,
        });
        objects.push(crab);
    }
    if !layout.flyers.is_empty() {
        let mut bird = object("bird", ObjectType::Enemy, layout.flyers, FLYER_SIZE, FLYER_SIZE);
        bird.category = Some(Category::Flying);
        bird.is_static = false;
        bird.movement = Some(MovementSpec {
            kind: MovementKind::Sine,
            amplitude: FLYER_AMPLITUDE,
            frequency: FLYER_SWEEP_MS,
        });
        objects.push(bird);
    }
    if !layout.lifts.is_empty() {
        let mut lift = object("lift", ObjectType::Platform, layout.lifts, LIFT_WIDTH, LIFT_HEIGHT);
        lift.is_static = false;
        lift.movement = Some(MovementSpec {
            kind: MovementKind::Horizontal,
            amplitude: LIFT_TRAVEL,
            frequency: LIFT_TRAVEL / config.platform_speed * 1000.0,
        });
        objects.push(lift);
    }
    if !layout.coins.is_empty() {
        objects.push(object("coin", ObjectType::Collectible, layout.coins, COIN_SIZE, COIN_SIZE));
    }
    for (i, &(gap_x, width)) in layout.gaps.iter().enumerate() {
        objects.push(object(
            &format!("pit_{i}"),
            ObjectType::Gap,
            vec![Point { x: gap_x, y: ground }],
            width,
            settings.viewport_height - ground,
        ));
    }

    let level = LevelDescriptor {
        players: default_roster(),
        objects,
    };
    level.validate()?;

    log::info!(
        "Generated level from seed {seed}: {} gaps, {} object kinds",
        layout.gaps.len(),
        level.objects.len()
    );
    Ok(level)
}
