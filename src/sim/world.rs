//! World builder: level descriptor → initial simulation state
//!
//! Runs once per level load. Either the whole world is produced or a
//! configuration error is returned; nothing partial escapes.

use glam::Vec2;

use super::error::{ConfigIssue, SimError};
use super::level::{Category, CharacterSpec, LevelDescriptor, ObjectType, WorldObjectSpec};
use super::motion::{MotionBinding, MovementPattern};
use super::state::{Body, BodyKind, Gap, GroundSegment, PlayerPhysics, SimulationState};
use crate::consts::*;
use crate::settings::Settings;

/// Player entity ID; world bodies are numbered after it
pub const PLAYER_ID: u32 = 1;

/// Build the world for the selected character
pub fn build_world(
    level: &LevelDescriptor,
    character_key: &str,
    settings: &Settings,
) -> Result<SimulationState, SimError> {
    settings.validate()?;
    level.validate()?;

    let character = level.character(character_key).ok_or_else(|| {
        SimError::config(
            format!("character '{character_key}'"),
            "key",
            "not found in the roster",
        )
    })?;

    // Clamping keeps the player's left edge at most `world_width - w`
    let reachable = settings.world_width - character.hitbox.width;
    if settings.end_boundary() > reachable {
        return Err(SimError::Configuration(vec![ConfigIssue::new(
            format!("character '{character_key}'"),
            "hitbox",
            format!(
                "end boundary {} is past the furthest reachable x {reachable}",
                settings.end_boundary()
            ),
        )]));
    }

    let mut state = SimulationState::new(
        settings.clone(),
        character.key.clone(),
        player_physics(character, settings),
        spawn_player(character, settings),
    );

    let gaps: Vec<Gap> = level
        .objects
        .iter()
        .filter(|o| o.kind == ObjectType::Gap)
        .flat_map(|o| {
            o.positions.iter().map(|p| Gap {
                x: p.x,
                width: o.hitbox.width,
                depth: o.hitbox.height,
            })
        })
        .collect();

    let (ground, merged) = build_ground(&gaps, settings);
    state.ground = ground;
    state.gaps = merged;

    for (index, object) in level.objects.iter().enumerate() {
        place_object(&mut state, index, object);
    }

    log::info!(
        "Built world for '{}': {} ground segments, {} gaps, {} platforms, {} hazards, {} flyers, {} coins",
        state.character,
        state.ground.len(),
        state.gaps.len(),
        state.platforms.len(),
        state.hazards.len(),
        state.flyers.len(),
        state.collectibles.len()
    );

    Ok(state)
}

fn player_physics(character: &CharacterSpec, settings: &Settings) -> PlayerPhysics {
    PlayerPhysics {
        gravity: character.physics.gravity.unwrap_or(settings.default_gravity),
        run_speed: character.physics.speed.run,
        jump_speed: character.physics.speed.jump,
    }
}

/// Player stands with its hitbox bottom on the ground line
fn spawn_player(character: &CharacterSpec, settings: &Settings) -> Body {
    let size = character.hitbox.size();
    let max_x = (settings.world_width - size.x).max(0.0);
    let pos = Vec2::new(
        character.spawn_point.x.clamp(0.0, max_x),
        settings.ground_line() - size.y,
    );
    let mut player = Body::new(PLAYER_ID, BodyKind::Player, pos, size);
    player.is_static = false;
    player
}

/// Subtract gaps from `[0, world_width)`.
///
/// Gaps are clipped to the world, sorted by x (narrower first on ties), and
/// overlapping or touching gaps are merged. Returns the ground segments and
/// the merged gap intervals.
pub fn build_ground(gaps: &[Gap], settings: &Settings) -> (Vec<GroundSegment>, Vec<Gap>) {
    let world_width = settings.world_width;
    let top = settings.ground_line();
    let thickness = settings.ground_thickness;

    let mut sorted: Vec<Gap> = gaps
        .iter()
        .filter_map(|g| {
            let start = g.x.max(0.0);
            let end = g.end().min(world_width);
            (end > start).then_some(Gap {
                x: start,
                width: end - start,
                depth: g.depth,
            })
        })
        .collect();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.width.total_cmp(&b.width)));

    let mut merged: Vec<Gap> = Vec::with_capacity(sorted.len());
    for gap in sorted {
        match merged.last_mut() {
            Some(last) if gap.x <= last.end() => {
                log::debug!(
                    "Merging gap [{}, {}) into [{}, {})",
                    gap.x,
                    gap.end(),
                    last.x,
                    last.end()
                );
                let end = last.end().max(gap.end());
                last.width = end - last.x;
                last.depth = last.depth.max(gap.depth);
            }
            _ => merged.push(gap),
        }
    }

    let segment = |x: f32, end: f32| GroundSegment {
        x,
        width: end - x,
        top,
        thickness,
    };

    let mut segments = Vec::with_capacity(merged.len() + 1);
    let mut cursor = 0.0_f32;
    for gap in &merged {
        if cursor < gap.x {
            segments.push(segment(cursor, gap.x));
        }
        cursor = cursor.max(gap.end());
    }
    if cursor < world_width {
        segments.push(segment(cursor, world_width));
    }

    if let Err(e) = verify_ground(&segments) {
        log::warn!("{e}; merging ground segments");
        segments = merge_segments(segments);
    }

    (segments, merged)
}

/// Check that ground segments are sorted, non-empty and disjoint
pub fn verify_ground(segments: &[GroundSegment]) -> Result<(), SimError> {
    for (i, seg) in segments.iter().enumerate() {
        if seg.width <= 0.0 {
            return Err(SimError::InvariantViolation(format!(
                "ground segment {i} at x={} is empty",
                seg.x
            )));
        }
    }
    for (i, pair) in segments.windows(2).enumerate() {
        if pair[1].x < pair[0].end() {
            return Err(SimError::InvariantViolation(format!(
                "ground segments {i} [{}, {}) and {} [{}, {}) overlap or are unsorted",
                pair[0].x,
                pair[0].end(),
                i + 1,
                pair[1].x,
                pair[1].end()
            )));
        }
    }
    Ok(())
}

/// Repair overlapping segments by taking their union
pub fn merge_segments(mut segments: Vec<GroundSegment>) -> Vec<GroundSegment> {
    segments.retain(|s| s.width > 0.0);
    segments.sort_by(|a, b| a.x.total_cmp(&b.x));

    let mut merged: Vec<GroundSegment> = Vec::with_capacity(segments.len());
    for seg in segments {
        match merged.last_mut() {
            Some(last) if seg.x < last.end() => {
                let end = last.end().max(seg.end());
                last.width = end - last.x;
            }
            _ => merged.push(seg),
        }
    }
    merged
}

/// Default pattern for a non-static object without explicit movement
fn default_pattern(object: &WorldObjectSpec) -> MovementPattern {
    let vertical = MovementPattern::VerticalOscillate {
        amplitude: OSCILLATE_AMPLITUDE,
        half_period: OSCILLATE_HALF_PERIOD,
    };
    let shuttle = MovementPattern::HorizontalShuttle {
        distance: SHUTTLE_DISTANCE,
        half_period: SHUTTLE_HALF_PERIOD,
    };

    match (object.kind, object.category) {
        (ObjectType::FlyingPlatform, _) => vertical,
        (ObjectType::Enemy, Some(Category::Flying)) => vertical,
        (ObjectType::Enemy, Some(Category::Ground)) => shuttle,
        (ObjectType::Platform, _) => shuttle,
        _ => MovementPattern::None,
    }
}

fn pattern_for(object: &WorldObjectSpec) -> MovementPattern {
    if object.is_static {
        return MovementPattern::None;
    }
    match object.movement {
        Some(spec) => MovementPattern::from_spec(&spec),
        None => default_pattern(object),
    }
}

fn place_object(state: &mut SimulationState, index: usize, object: &WorldObjectSpec) {
    let kind = match (object.kind, object.category) {
        (ObjectType::Gap, _) => return,
        (ObjectType::Platform, _) => BodyKind::Platform,
        (ObjectType::FlyingPlatform, _) => BodyKind::FlyingPlatform,
        (ObjectType::Enemy, Some(Category::Flying)) => BodyKind::FlyingEnemy,
        (ObjectType::Enemy, _) => BodyKind::Enemy,
        (ObjectType::Trap, _) => BodyKind::Trap,
        (ObjectType::Collectible, _) => BodyKind::Collectible,
    };

    let pattern = match kind {
        BodyKind::Collectible | BodyKind::Trap => MovementPattern::None,
        _ => pattern_for(object),
    };

    for placement in &object.positions {
        let anchor = Vec2::from(*placement);
        let id = state.next_entity_id();
        let mut body = Body::new(id, kind, anchor, object.hitbox.size());
        body.spec_index = Some(index);
        if pattern.is_moving() {
            body.is_static = false;
            body.motion = Some(MotionBinding::new(anchor, pattern));
        }

        match kind {
            BodyKind::Platform | BodyKind::FlyingPlatform => state.platforms.push(body),
            BodyKind::Enemy | BodyKind::Trap => state.hazards.push(body),
            BodyKind::FlyingEnemy => state.flyers.push(body),
            BodyKind::Collectible => state.collectibles.push(body),
            BodyKind::Player => {}
        }
    }
}
