//! Collision resolution between the player and the world
//!
//! Every tick the player is tested against each body category in a fixed
//! order. Categories are independent: standing on a platform does not cancel
//! an enemy hit on the same tick.
//!
//! 1. Support: ground, static platforms, then moving platforms
//! 2. Hazards (ground/stable enemies, traps): blocking and lethal
//! 3. Flyers: pass-through and lethal
//! 4. Collectibles: removed on overlap

use super::rect::Aabb;
use super::state::{Body, BodyKind, DeathCause, SimulationState};

/// What held the player up this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Support {
    /// Index into the ground segments
    Ground(usize),
    /// A platform body; `carried` is the horizontal shift it imparted
    Platform { id: u32, carried: f32 },
}

/// Outcome of resolving one tick of contacts
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Verdict {
    pub support: Option<Support>,
    /// First lethal contact found
    pub lethal: Option<DeathCause>,
    /// IDs of collectibles removed this tick
    pub picked_up: Vec<u32>,
}

/// Would `surface` hold the player up?
///
/// The player must overlap it horizontally, be moving down or resting,
/// have its bottom no higher than `tolerance` above the top, and have been
/// above the surface's previous top (within tolerance) before this tick.
#[inline]
pub fn is_supported_by(
    player: &Aabb,
    prev_bottom: f32,
    vel_y: f32,
    surface: &Aabb,
    surface_prev_top: f32,
    tolerance: f32,
) -> bool {
    vel_y >= 0.0
        && player.overlaps_x(surface)
        && player.bottom() >= surface.top() - tolerance
        && prev_bottom <= surface_prev_top + tolerance
}

fn land_on(player: &mut Body, top: f32) {
    player.pos.y = top - player.size.y;
    player.vel.y = 0.0;
    player.grounded = true;
}

fn find_platform_support<'a>(
    player: &Body,
    prev_bottom: f32,
    platforms: &'a [Body],
    moving: bool,
    tolerance: f32,
) -> Option<&'a Body> {
    let rect = player.rect();
    platforms.iter().filter(|p| p.is_moving() == moving).find(|p| {
        is_supported_by(
            &rect,
            prev_bottom,
            player.vel.y,
            &p.rect(),
            p.prev_rect().top(),
            tolerance,
        )
    })
}

/// Push the player out of a solid it overlaps without standing on it
fn push_out_of_solid(player: &mut Body, solid: &Aabb) {
    let Some(push) = player.rect().separation_from(solid) else {
        return;
    };

    player.pos += push;
    if push.x != 0.0 {
        player.vel.x = 0.0;
    } else if push.y > 0.0 {
        // Head bump
        player.vel.y = player.vel.y.max(0.0);
    }
}

fn death_cause(kind: BodyKind) -> DeathCause {
    match kind {
        BodyKind::Trap => DeathCause::Trap,
        BodyKind::FlyingEnemy => DeathCause::FlyingEnemy,
        _ => DeathCause::Enemy,
    }
}

/// Resolve the player's contacts after integration.
///
/// `prev_bottom` is the player's bottom edge before this tick's movement.
/// `grounded` is recomputed from scratch every call.
pub fn resolve(state: &mut SimulationState, prev_bottom: f32) -> Verdict {
    let tolerance = state.settings.support_tolerance;
    let SimulationState {
        player,
        platforms,
        hazards,
        flyers,
        collectibles,
        ground,
        ..
    } = state;

    let mut verdict = Verdict::default();
    player.grounded = false;

    // --- SUPPORT ---
    let rect = player.rect();
    let ground_hit = ground.iter().position(|seg| {
        is_supported_by(
            &rect,
            prev_bottom,
            player.vel.y,
            &seg.rect(),
            seg.top,
            tolerance,
        )
    });

    if let Some(index) = ground_hit {
        land_on(player, ground[index].top);
        verdict.support = Some(Support::Ground(index));
    } else if let Some(platform) = find_platform_support(player, prev_bottom, platforms, false, tolerance) {
        let (id, top) = (platform.id, platform.rect().top());
        land_on(player, top);
        verdict.support = Some(Support::Platform { id, carried: 0.0 });
    } else if let Some(platform) = find_platform_support(player, prev_bottom, platforms, true, tolerance) {
        let (id, top, carried) = (platform.id, platform.rect().top(), platform.delta.x);
        land_on(player, top);
        player.pos.x += carried;
        verdict.support = Some(Support::Platform { id, carried });
    }

    // Solids the player is not standing on still block it
    let support_id = match verdict.support {
        Some(Support::Platform { id, .. }) => Some(id),
        _ => None,
    };
    for (i, seg) in ground.iter().enumerate() {
        if verdict.support != Some(Support::Ground(i)) {
            push_out_of_solid(player, &seg.rect());
        }
    }
    for platform in platforms.iter() {
        if Some(platform.id) != support_id {
            push_out_of_solid(player, &platform.rect());
        }
    }

    // --- HAZARDS (blocking) ---
    for hazard in hazards.iter() {
        let hazard_rect = hazard.rect();
        if player.rect().overlaps(&hazard_rect) {
            if verdict.lethal.is_none() {
                verdict.lethal = Some(death_cause(hazard.kind));
            }
            if let Some(push) = player.rect().separation_from(&hazard_rect) {
                player.pos += push;
            }
        }
    }

    // --- FLYERS (pass-through) ---
    let rect = player.rect();
    if verdict.lethal.is_none() && flyers.iter().any(|f| rect.overlaps(&f.rect())) {
        verdict.lethal = Some(DeathCause::FlyingEnemy);
    }

    // --- COLLECTIBLES ---
    let picked = &mut verdict.picked_up;
    collectibles.retain(|coin| {
        if rect.overlaps(&coin.rect()) {
            picked.push(coin.id);
            false
        } else {
            true
        }
    });

    verdict
}
