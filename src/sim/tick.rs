//! Simulation tick
//!
//! Advances the level by one caller-supplied timestep. The tick holds no
//! wall-clock state; cadence belongs to the caller.

use serde::{Deserialize, Serialize};

use super::camera;
use super::collision::resolve;
use super::state::{Body, DeathCause, GameEvent, Lifecycle, SimulationState};

/// Logical input for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    /// -1 = left, 0 = none, 1 = right (other values are clamped)
    pub move_x: i8,
    /// Jump request; ignored while airborne
    pub jump: bool,
}

impl Intent {
    pub fn right() -> Self {
        Self {
            move_x: 1,
            jump: false,
        }
    }

    pub fn left() -> Self {
        Self {
            move_x: -1,
            jump: false,
        }
    }

    pub fn with_jump(mut self) -> Self {
        self.jump = true;
        self
    }

    /// Direction as a float in {-1, 0, 1}
    pub fn direction(&self) -> f32 {
        self.move_x.signum() as f32
    }
}

/// What the UI collaborator needs after a tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutput {
    pub lifecycle: Lifecycle,
    pub score: u64,
    pub camera_x: f32,
    pub events: Vec<GameEvent>,
}

impl TickOutput {
    fn from_state(state: &SimulationState, events: Vec<GameEvent>) -> Self {
        Self {
            lifecycle: state.lifecycle,
            score: state.score,
            camera_x: state.camera.x,
            events,
        }
    }
}

/// Keep the player inside the horizontal world span and below the sky edge
fn clamp_to_world(player: &mut Body, world_width: f32) {
    let max_x = (world_width - player.size.x).max(0.0);
    if player.pos.x < 0.0 || player.pos.x > max_x {
        player.pos.x = player.pos.x.clamp(0.0, max_x);
        player.vel.x = 0.0;
    }
    if player.pos.y < 0.0 {
        player.pos.y = 0.0;
        player.vel.y = player.vel.y.max(0.0);
    }
}

/// Advance the level by `dt` seconds
pub fn tick(state: &mut SimulationState, intent: &Intent, dt: f32) -> TickOutput {
    if state.lifecycle.is_terminal() {
        return TickOutput::from_state(state, Vec::new());
    }
    if !(dt.is_finite() && dt > 0.0) {
        log::warn!("Ignoring tick with invalid dt {dt}");
        return TickOutput::from_state(state, Vec::new());
    }

    state.time_ticks += 1;
    let physics = state.physics;
    let world_width = state.settings.world_width;

    // --- PLAYER INTEGRATION ---
    let player = &mut state.player;
    player.vel.x = intent.direction() * physics.run_speed;

    if intent.jump && player.grounded {
        player.vel.y = -physics.jump_speed;
        player.grounded = false;
    }

    player.vel.y += physics.gravity * dt;

    let prev_bottom = player.bottom();
    player.pos += player.vel * dt;
    clamp_to_world(player, world_width);

    // --- MOVING BODIES ---
    state.elapsed += f64::from(dt);
    let t = state.elapsed as f32;
    for body in state.moving_bodies_mut() {
        body.reposition(t, dt);
    }

    // --- CONTACTS ---
    let verdict = resolve(state, prev_bottom);
    clamp_to_world(&mut state.player, world_width);

    // --- TERMINATION ---
    let mut events = Vec::new();
    let fell = state.player.pos.y > state.settings.death_y();
    let death = verdict.lethal.or_else(|| {
        fell.then(|| match state.gap_under_player() {
            Some(_) => DeathCause::FellInGap,
            None => DeathCause::Fell,
        })
    });

    if let Some(cause) = death {
        state.lifecycle = Lifecycle::Lost;
        events.push(GameEvent::Died {
            cause,
            score: state.score,
        });
        log::info!(
            "Run lost ({cause:?}) at x={:.1} after {:.2}s, score {}",
            state.player.pos.x,
            state.elapsed,
            state.score
        );
    } else if state.player.pos.x >= state.settings.end_boundary() {
        state.lifecycle = Lifecycle::Won;
        events.push(GameEvent::Won { score: state.score });
        log::info!("Level complete after {:.2}s, score {}", state.elapsed, state.score);
    }

    // --- SCORE ---
    if state.is_running() {
        let value = state.settings.coin_value;
        for body_id in verdict.picked_up {
            state.score += value;
            events.push(GameEvent::PickedUpCoin { body_id, value });
            log::debug!("Coin {body_id} collected, score {}", state.score);
        }
    }

    state.camera = camera::track(state.camera, &state.player, &state.settings);

    TickOutput::from_state(state, events)
}

/// Fraction of the jump distance used as reaction distance for hazards
const HAZARD_REACTION: f32 = 0.35;

/// Demo/idle driver: run right, jump over gaps and ground hazards
pub fn autopilot(state: &SimulationState) -> Intent {
    let player = &state.player;
    let physics = state.physics;
    let mut intent = Intent::right();
    if !player.grounded || physics.gravity <= 0.0 {
        return intent;
    }

    // Horizontal distance covered by a full jump on flat ground
    let air_time = 2.0 * physics.jump_speed / physics.gravity;
    let jump_distance = physics.run_speed * air_time;
    let x = player.pos.x;
    let width = player.size.x;

    let gap_ahead = state.gaps.iter().any(|gap| {
        // Take off midway through the window that still lands past the gap
        let latest = gap.x;
        let earliest = gap.end() - width - jump_distance;
        let takeoff = ((earliest + latest) * 0.5).min(latest - 1.0);
        x >= takeoff && x < latest
    });

    let reaction = jump_distance * HAZARD_REACTION;
    let front = x + width;
    let band = player.rect();
    let hazard_ahead = state.hazards.iter().any(|hazard| {
        let r = hazard.rect();
        r.min.x >= front - 1.0
            && r.min.x - front <= reaction
            && r.min.y < band.max.y
            && r.max.y > band.min.y
    });

    if gap_ahead || hazard_ahead {
        intent.jump = true;
    }
    intent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::settings::Settings;
    use crate::sim::level::{
        Category, CharacterSpec, Hitbox, LevelDescriptor, ObjectType, PhysicsSpec, Point, SpeedSpec,
        WorldObjectSpec,
    };
    use crate::sim::world::build_world;

    fn runner() -> CharacterSpec {
        CharacterSpec {
            key: "runner".to_string(),
            spawn_point: Point { x: 0.0, y: 0.0 },
            hitbox: Hitbox {
                width: 40.0,
                height: 60.0,
            },
            physics: PhysicsSpec {
                gravity: Some(1200.0),
                speed: SpeedSpec {
                    run: 300.0,
                    jump: 600.0,
                },
            },
            palette: None,
            scale: 1.0,
        }
    }

    fn placed(key: &str, kind: ObjectType, category: Option<Category>, at: (f32, f32), size: (f32, f32)) -> WorldObjectSpec {
        WorldObjectSpec {
            key: key.to_string(),
            kind,
            category,
            positions: vec![Point { x: at.0, y: at.1 }],
            hitbox: Hitbox {
                width: size.0,
                height: size.1,
            },
            scale: 1.0,
            is_static: true,
            movement: None,
        }
    }

    fn world(objects: Vec<WorldObjectSpec>) -> SimulationState {
        let level = LevelDescriptor {
            players: vec![runner()],
            objects,
        };
        build_world(&level, "runner", &Settings::default()).unwrap()
    }

    fn ground_line() -> f32 {
        Settings::default().ground_line()
    }

    /// Place the player standing on the ground at `x`
    fn stand_at(state: &mut SimulationState, x: f32) {
        state.player.pos.x = x;
        state.player.pos.y = ground_line() - state.player.size.y;
        state.player.vel = glam::Vec2::ZERO;
        state.player.grounded = true;
    }

    #[test]
    fn test_spawn_grounded_after_first_tick() {
        let mut state = world(Vec::new());
        assert!(!state.player.grounded);
        let out = tick(&mut state, &Intent::default(), SIM_DT);
        assert!(state.player.grounded);
        assert_eq!(state.player.bottom(), ground_line());
        assert_eq!(out.lifecycle, Lifecycle::Running);
        assert!(out.events.is_empty());
    }

    #[test]
    fn test_static_platform_support_is_idempotent() {
        let mut state = world(vec![placed("ledge", ObjectType::Platform, None, (1000.0, 400.0), (200.0, 20.0))]);
        state.player.pos = glam::Vec2::new(1050.0, 340.0);
        state.player.vel = glam::Vec2::ZERO;

        for _ in 0..10 {
            tick(&mut state, &Intent::default(), SIM_DT);
            assert!(state.player.grounded);
            assert_eq!(state.player.pos.y, 340.0);
            assert_eq!(state.player.vel.y, 0.0);
        }
    }

    #[test]
    fn test_running_sets_instant_velocity() {
        let mut state = world(Vec::new());
        stand_at(&mut state, 100.0);
        tick(&mut state, &Intent::right(), SIM_DT);
        assert_eq!(state.player.vel.x, 300.0);
        tick(&mut state, &Intent::left(), SIM_DT);
        assert_eq!(state.player.vel.x, -300.0);
        tick(&mut state, &Intent::default(), SIM_DT);
        assert_eq!(state.player.vel.x, 0.0);
        assert_eq!(state.player.pos.x, 100.0);
    }

    #[test]
    fn test_jump_only_from_ground() {
        let mut state = world(Vec::new());
        stand_at(&mut state, 100.0);

        tick(&mut state, &Intent::default().with_jump(), SIM_DT);
        assert!(!state.player.grounded);
        let vy_after_jump = state.player.vel.y;
        assert!(vy_after_jump < 0.0);

        // Airborne request: only gravity changes vy
        tick(&mut state, &Intent::default().with_jump(), SIM_DT);
        assert!((state.player.vel.y - (vy_after_jump + 1200.0 * SIM_DT)).abs() < 1e-3);
    }

    #[test]
    fn test_airborne_over_gap_is_not_lethal() {
        let mut state = world(vec![placed("pit", ObjectType::Gap, None, (5000.0, 0.0), (200.0, 200.0))]);
        state.player.pos = glam::Vec2::new(5050.0, ground_line() - 160.0);
        state.player.vel = glam::Vec2::new(0.0, -50.0);
        state.player.grounded = false;

        let out = tick(&mut state, &Intent::default(), SIM_DT);
        assert_eq!(out.lifecycle, Lifecycle::Running);
        assert!(out.events.is_empty());
        assert!(state.gap_under_player().is_some());
    }

    #[test]
    fn test_enemy_contact_beats_support() {
        let mut state = world(vec![placed(
            "rock",
            ObjectType::Enemy,
            Some(Category::Stable),
            (300.0, ground_line() - 40.0),
            (50.0, 40.0),
        )]);
        stand_at(&mut state, 280.0);

        let out = tick(&mut state, &Intent::default(), SIM_DT);
        assert!(state.player.grounded);
        assert_eq!(out.lifecycle, Lifecycle::Lost);
        assert_eq!(
            out.events,
            vec![GameEvent::Died {
                cause: DeathCause::Enemy,
                score: 0
            }]
        );
    }

    #[test]
    fn test_flying_enemy_overlap_is_lethal() {
        let bird = placed("bird", ObjectType::Enemy, Some(Category::Flying), (400.0, ground_line() - 50.0), (30.0, 30.0));
        let mut state = world(vec![bird]);
        stand_at(&mut state, 380.0);

        let out = tick(&mut state, &Intent::default(), SIM_DT);
        assert_eq!(
            out.events,
            vec![GameEvent::Died {
                cause: DeathCause::FlyingEnemy,
                score: 0
            }]
        );
    }

    #[test]
    fn test_coin_pickup_is_exactly_once() {
        let mut state = world(vec![placed(
            "coin",
            ObjectType::Collectible,
            None,
            (200.0, ground_line() - 50.0),
            (20.0, 20.0),
        )]);
        stand_at(&mut state, 190.0);

        let out = tick(&mut state, &Intent::default(), SIM_DT);
        assert_eq!(out.score, 100);
        assert_eq!(out.events.len(), 1);
        assert!(matches!(out.events[0], GameEvent::PickedUpCoin { value: 100, .. }));

        let out = tick(&mut state, &Intent::default(), SIM_DT);
        assert_eq!(out.score, 100);
        assert!(out.events.is_empty());
    }

    #[test]
    fn test_win_is_terminal() {
        let mut state = world(Vec::new());
        let boundary = state.settings.end_boundary();
        stand_at(&mut state, boundary - 2.0);

        let out = tick(&mut state, &Intent::right(), SIM_DT);
        assert_eq!(out.lifecycle, Lifecycle::Won);
        assert_eq!(out.events, vec![GameEvent::Won { score: 0 }]);

        let pos = state.player.pos;
        let ticks = state.time_ticks;
        for _ in 0..30 {
            let out = tick(&mut state, &Intent::left().with_jump(), SIM_DT);
            assert!(out.events.is_empty());
            assert_eq!(out.lifecycle, Lifecycle::Won);
        }
        assert_eq!(state.player.pos, pos);
        assert_eq!(state.time_ticks, ticks);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_player_clamped_to_world_start() {
        let mut state = world(Vec::new());
        stand_at(&mut state, 1.0);
        for _ in 0..5 {
            tick(&mut state, &Intent::left(), SIM_DT);
        }
        assert_eq!(state.player.pos.x, 0.0);
        assert_eq!(state.lifecycle, Lifecycle::Running);
    }

    #[test]
    fn test_invalid_dt_is_ignored() {
        let mut state = world(Vec::new());
        let before = state.player.pos;
        for dt in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let out = tick(&mut state, &Intent::right(), dt);
            assert!(out.events.is_empty());
        }
        assert_eq!(state.player.pos, before);
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn test_moving_bodies_follow_elapsed_time() {
        let mut lift = placed("lift", ObjectType::Platform, None, (2000.0, 400.0), (100.0, 20.0));
        lift.is_static = false;
        let mut state = world(vec![lift]);
        stand_at(&mut state, 100.0);

        for _ in 0..120 {
            tick(&mut state, &Intent::default(), SIM_DT);
        }
        // Default shuttle: 200 px per 2 s sweep
        let x = state.platforms[0].pos.x;
        assert!((x - 2100.0).abs() < 0.5, "lift at {x}");
    }

    /// Level from the acceptance example: one 200 px gap at x = 5000 and a
    /// coin on the way there.
    fn gap_level() -> SimulationState {
        let mut state = world(vec![
            placed("pit", ObjectType::Gap, None, (5000.0, 0.0), (200.0, 200.0)),
            placed("coin", ObjectType::Collectible, None, (2000.0, ground_line() - 50.0), (30.0, 30.0)),
        ]);
        tick(&mut state, &Intent::default(), SIM_DT);
        assert!(state.player.grounded);
        state
    }

    #[test]
    fn test_timed_jump_clears_gap() {
        let mut state = gap_level();
        let mut jumped = false;
        let mut events = Vec::new();

        while state.player.pos.x <= 5400.0 && state.is_running() {
            let mut intent = Intent::right();
            if !jumped && state.player.grounded && state.player.pos.x >= 4900.0 {
                intent.jump = true;
                jumped = true;
            }
            events.extend(tick(&mut state, &intent, SIM_DT).events);
        }

        assert!(jumped);
        assert_eq!(state.lifecycle, Lifecycle::Running);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::Died { .. })));
        assert!(state.player.grounded);
        assert_eq!(state.score, 100);
    }

    #[test]
    fn test_landing_short_loses_once() {
        let mut state = gap_level();
        let mut events = Vec::new();

        for _ in 0..3000 {
            events.extend(tick(&mut state, &Intent::right(), SIM_DT).events);
        }

        let deaths: Vec<_> = events
            .iter()
            .filter(|e| matches!(e, GameEvent::Died { .. }))
            .collect();
        assert_eq!(deaths.len(), 1);
        assert_eq!(
            *deaths[0],
            GameEvent::Died {
                cause: DeathCause::FellInGap,
                score: 100
            }
        );
        assert_eq!(state.lifecycle, Lifecycle::Lost);
        assert_eq!(state.score, 100);
        assert!(state.player.pos.x >= 5000.0 && state.player.pos.x < 5200.0);
    }

    #[test]
    fn test_autopilot_clears_gap() {
        let mut state = world(vec![placed("pit", ObjectType::Gap, None, (3000.0, 0.0), (200.0, 200.0))]);
        while state.player.pos.x <= 3500.0 && state.is_running() {
            let intent = autopilot(&state);
            tick(&mut state, &intent, SIM_DT);
        }
        assert_eq!(state.lifecycle, Lifecycle::Running);
    }

    #[test]
    fn test_determinism() {
        let mut state1 = gap_level();
        let mut state2 = gap_level();

        let inputs = [Intent::right(), Intent::right().with_jump(), Intent::default(), Intent::left()];
        for i in 0..600 {
            let input = inputs[i % inputs.len()];
            tick(&mut state1, &input, SIM_DT);
            tick(&mut state2, &input, SIM_DT);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.player.pos, state2.player.pos);
        assert_eq!(state1.score, state2.score);
    }

    #[test]
    fn test_snapshot_resumes_identically() {
        let mut live = gap_level();
        for _ in 0..500 {
            tick(&mut live, &Intent::right(), SIM_DT);
        }

        let json = serde_json::to_string(&live).unwrap();
        let mut restored: SimulationState = serde_json::from_str(&json).unwrap();

        for _ in 0..1500 {
            let a = tick(&mut live, &Intent::right(), SIM_DT);
            let b = tick(&mut restored, &Intent::right(), SIM_DT);
            assert_eq!(a, b);
        }
        assert_eq!(live.player.pos, restored.player.pos);
        assert_eq!(live.lifecycle, restored.lifecycle);
    }
}
