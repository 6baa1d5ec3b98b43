//! Level descriptor: character roster and world object placements
//!
//! Pure data. The JSON layout uses camelCase keys:
//!
//! ```json
//! {
//!   "players": [{ "key": "player1_black", "spawnPoint": { "x": 100, "y": 0 },
//!                 "hitbox": { "width": 40, "height": 60 },
//!                 "physics": { "gravity": 1200, "speed": { "run": 300, "jump": 600 } } }],
//!   "objects": [{ "key": "pit", "type": "gap", "positions": [{ "x": 5000, "y": 0 }],
//!                 "hitbox": { "width": 200, "height": 200 } }]
//! }
//! ```
//!
//! Positions are top-left corners in a y-down world.

use std::collections::HashSet;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::error::{ConfigIssue, SimError};

/// A placement point
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl From<Point> for Vec2 {
    fn from(p: Point) -> Self {
        Vec2::new(p.x, p.y)
    }
}

/// Collision rectangle size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hitbox {
    pub width: f32,
    pub height: f32,
}

impl Hitbox {
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Cosmetic color variant of a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Palette {
    Red,
    Gray,
    Black,
}

impl Palette {
    pub const ALL: [Palette; 3] = [Palette::Red, Palette::Gray, Palette::Black];

    pub fn as_str(&self) -> &'static str {
        match self {
            Palette::Red => "red",
            Palette::Gray => "gray",
            Palette::Black => "black",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "red" => Some(Palette::Red),
            "gray" | "grey" => Some(Palette::Gray),
            "black" => Some(Palette::Black),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedSpec {
    pub run: f32,
    pub jump: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsSpec {
    /// Per-character gravity; `None` uses the settings default
    #[serde(default)]
    pub gravity: Option<f32>,
    pub speed: SpeedSpec,
}

/// A selectable character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSpec {
    #[serde(alias = "id")]
    pub key: String,
    pub spawn_point: Point,
    pub hitbox: Hitbox,
    pub physics: PhysicsSpec,
    #[serde(default)]
    pub palette: Option<Palette>,
    #[serde(default = "default_scale")]
    pub scale: f32,
}

impl CharacterSpec {
    /// Explicit palette, or the one encoded as a `_red`/`_gray`/`_black` key suffix
    pub fn palette(&self) -> Option<Palette> {
        self.palette.or_else(|| {
            self.key
                .rsplit_once('_')
                .and_then(|(_, suffix)| Palette::from_str(suffix))
        })
    }
}

/// What a world object is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectType {
    Platform,
    FlyingPlatform,
    Enemy,
    Trap,
    Collectible,
    Gap,
}

/// Behavioural category for enemies and platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Static,
    Stable,
    Ground,
    Flying,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    #[default]
    None,
    #[serde(alias = "shuttle")]
    Horizontal,
    #[serde(alias = "vertical")]
    Sine,
}

/// Declared movement. For horizontal movement `amplitude` is the shuttle
/// distance; `frequency` is the duration of one sweep in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovementSpec {
    #[serde(rename = "type", default)]
    pub kind: MovementKind,
    #[serde(default)]
    pub amplitude: f32,
    #[serde(default)]
    pub frequency: f32,
}

/// One kind of world object with all of its placements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldObjectSpec {
    #[serde(alias = "id")]
    pub key: String,
    #[serde(rename = "type")]
    pub kind: ObjectType,
    #[serde(default)]
    pub category: Option<Category>,
    pub positions: Vec<Point>,
    pub hitbox: Hitbox,
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default, alias = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub movement: Option<MovementSpec>,
}

fn default_scale() -> f32 {
    1.0
}

/// A complete level document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LevelDescriptor {
    pub players: Vec<CharacterSpec>,
    pub objects: Vec<WorldObjectSpec>,
}

impl LevelDescriptor {
    /// Parse a level document. Structural validation runs separately.
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        serde_json::from_str(json)
            .map_err(|e| SimError::config("level", "document", format!("Parse error: {e}")))
    }

    /// Load and validate a level document from disk
    pub fn load(path: &Path) -> Result<Self, SimError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            SimError::config(path.display().to_string(), "file", format!("IO error: {e}"))
        })?;
        let level = Self::from_json(&json)?;
        level.validate()?;
        log::info!(
            "Loaded level {} ({} characters, {} object kinds)",
            path.display(),
            level.players.len(),
            level.objects.len()
        );
        Ok(level)
    }

    pub fn to_json(&self) -> Result<String, SimError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SimError::config("level", "document", format!("Serialize error: {e}")))
    }

    /// Look up a character by key
    pub fn character(&self, key: &str) -> Option<&CharacterSpec> {
        self.players.iter().find(|p| p.key == key)
    }

    /// Check every character and object. Collects all problems.
    pub fn validate(&self) -> Result<(), SimError> {
        let issues = validate_level(self);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(SimError::Configuration(issues))
        }
    }
}

/// Validate a descriptor, returning every issue found
pub fn validate_level(level: &LevelDescriptor) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();
    let mut seen = HashSet::new();

    for player in &level.players {
        let subject = format!("player '{}'", player.key);
        if !seen.insert(player.key.as_str()) {
            issues.push(ConfigIssue::new(&subject, "key", "duplicate character key"));
        }
        if !player.hitbox.is_valid() {
            issues.push(ConfigIssue::new(&subject, "hitbox", "width and height must be positive"));
        }
        let speed = player.physics.speed;
        if !(speed.run.is_finite() && speed.run >= 0.0) {
            issues.push(ConfigIssue::new(&subject, "physics.speed.run", "must be non-negative"));
        }
        if !(speed.jump.is_finite() && speed.jump >= 0.0) {
            issues.push(ConfigIssue::new(&subject, "physics.speed.jump", "must be non-negative"));
        }
        if let Some(gravity) = player.physics.gravity {
            if !(gravity.is_finite() && gravity > 0.0) {
                issues.push(ConfigIssue::new(&subject, "physics.gravity", "must be positive"));
            }
        }
        if !(player.spawn_point.x.is_finite() && player.spawn_point.y.is_finite()) {
            issues.push(ConfigIssue::new(&subject, "spawnPoint", "must be finite"));
        }
    }

    for object in &level.objects {
        let subject = format!("object '{}'", object.key);
        if object.positions.is_empty() {
            issues.push(ConfigIssue::new(&subject, "positions", "no placements"));
        }
        if object.positions.iter().any(|p| !(p.x.is_finite() && p.y.is_finite())) {
            issues.push(ConfigIssue::new(&subject, "positions", "placements must be finite"));
        }
        if !object.hitbox.is_valid() {
            issues.push(ConfigIssue::new(&subject, "hitbox", "width and height must be positive"));
        }
        if let Some(movement) = object.movement {
            if movement.kind != MovementKind::None {
                if !(movement.frequency.is_finite() && movement.frequency > 0.0) {
                    issues.push(ConfigIssue::new(&subject, "movement.frequency", "must be positive"));
                }
                if !movement.amplitude.is_finite() {
                    issues.push(ConfigIssue::new(&subject, "movement.amplitude", "must be finite"));
                }
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL: &str = r#"{
        "players": [
            { "key": "player1_red", "spawnPoint": { "x": 100, "y": 0 },
              "hitbox": { "width": 40, "height": 60 },
              "physics": { "gravity": 1200, "speed": { "run": 300, "jump": 600 } } },
            { "id": "player2", "spawnPoint": { "x": 100, "y": 0 },
              "hitbox": { "width": 40, "height": 60 }, "palette": "gray",
              "physics": { "speed": { "run": 250, "jump": 650 } } }
        ],
        "objects": [
            { "key": "crate", "type": "platform", "isStatic": true,
              "positions": [{ "x": 800, "y": 450 }], "hitbox": { "width": 120, "height": 30 } },
            { "key": "bird", "type": "enemy", "category": "flying", "scale": 0.5,
              "positions": [{ "x": 3000, "y": 300 }], "hitbox": { "width": 50, "height": 40 },
              "movement": { "type": "sine", "amplitude": 80, "frequency": 1500 } },
            { "key": "pit", "type": "gap", "positions": [{ "x": 5000, "y": 0 }],
              "hitbox": { "width": 200, "height": 200 } }
        ]
    }"#;

    #[test]
    fn test_parse_level_document() {
        let level = LevelDescriptor::from_json(LEVEL).unwrap();
        assert!(level.validate().is_ok());
        assert_eq!(level.players.len(), 2);
        assert_eq!(level.objects[0].kind, ObjectType::Platform);
        assert!(level.objects[0].is_static);
        assert_eq!(level.objects[1].category, Some(Category::Flying));
        assert_eq!(level.objects[1].movement.unwrap().kind, MovementKind::Sine);
        assert_eq!(level.objects[2].kind, ObjectType::Gap);
        assert_eq!(level.objects[2].scale, 1.0);
        assert!(level.character("player2").unwrap().physics.gravity.is_none());
    }

    #[test]
    fn test_palette_from_key_suffix_or_field() {
        let level = LevelDescriptor::from_json(LEVEL).unwrap();
        assert_eq!(level.players[0].palette(), Some(Palette::Red));
        assert_eq!(level.players[1].palette(), Some(Palette::Gray));
    }

    #[test]
    fn test_validation_collects_issues() {
        let mut level = LevelDescriptor::from_json(LEVEL).unwrap();
        level.players.push(level.players[0].clone());
        level.objects[0].hitbox.width = 0.0;
        level.objects[1].positions.clear();

        let issues = validate_level(&level);
        let fields: Vec<_> = issues.iter().map(|i| i.field).collect();
        assert!(fields.contains(&"key"));
        assert!(fields.contains(&"hitbox"));
        assert!(fields.contains(&"positions"));
        assert!(matches!(level.validate(), Err(SimError::Configuration(_))));
    }

    #[test]
    fn test_unknown_object_type_is_rejected() {
        let json = r#"{ "players": [], "objects": [
            { "key": "lava", "type": "liquid", "positions": [], "hitbox": { "width": 1, "height": 1 } }
        ] }"#;
        assert!(matches!(LevelDescriptor::from_json(json), Err(SimError::Configuration(_))));
    }
}
