//! Unit records for data-driven unit definitions.

use serde::{Deserialize, Serialize};

use crate::components::AiState;

/// Data-driven unit record.
///
/// Only `id` is required; every omitted field is filled from the
/// default functions below before the record reaches the simulation.
///
/// # Example RON
///
/// ```ron
/// UnitData(
///     id: "keeper",
///     name: "Keeper",
///     max_hp: 35,
///     speed: 42.0,
///     sight_range: 110.0,
///     armor: 2,
///     weapon: Some("cudgel"),
///     sprite: Some("keeper_walk"),
///     cost: 25,
///     cooldown_ms: 1800.0,
/// )
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitData {
    /// Unique string identifier, referenced by scenarios and spawns.
    pub id: String,

    /// Display name; empty means "use the id".
    #[serde(default)]
    pub name: String,

    /// Maximum health points.
    #[serde(default = "default_max_hp")]
    pub max_hp: i32,

    /// Maximum movement speed in world units per second.
    #[serde(default = "default_speed")]
    pub speed: f32,

    /// Maximum steering force in world units per second squared.
    #[serde(default = "default_accel")]
    pub accel: f32,

    /// Maximum turn rate in radians per second.
    #[serde(default = "default_angular_speed")]
    pub angular_speed: f32,

    /// Target acquisition radius in world units.
    #[serde(default = "default_sight_range")]
    pub sight_range: f32,

    /// Flat armor subtracted from incoming damage (after penetration).
    #[serde(default)]
    pub armor: i32,

    /// Collision circle radius in world units.
    #[serde(default = "default_radius")]
    pub radius: f32,

    /// Participates in collision and avoidance checks.
    #[serde(default = "default_true")]
    pub collides: bool,

    /// Corpse shrinks through a fall animation before being freed.
    #[serde(default = "default_true")]
    pub can_fall: bool,

    /// Uses lane-following seek/avoidance steering.
    #[serde(default = "default_true")]
    pub steering: bool,

    /// Behavior state assigned at spawn.
    #[serde(default = "default_ai")]
    pub default_ai: AiState,

    /// Weapon record id (None for unarmed units).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weapon: Option<String>,

    /// Sprite record id (None for invisible/service entities).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sprite: Option<String>,

    /// Gold cost to spawn.
    #[serde(default)]
    pub cost: u32,

    /// Per-player respawn cooldown in milliseconds.
    #[serde(default)]
    pub cooldown_ms: f32,
}

/// Default maximum HP for units without explicit health.
const fn default_max_hp() -> i32 {
    10
}

/// Default movement speed.
const fn default_speed() -> f32 {
    40.0
}

/// Default steering acceleration.
const fn default_accel() -> f32 {
    80.0
}

/// Default turn rate.
const fn default_angular_speed() -> f32 {
    4.0
}

/// Default sight range.
const fn default_sight_range() -> f32 {
    120.0
}

/// Default collision radius.
const fn default_radius() -> f32 {
    8.0
}

/// Default spawn behavior: walk the lane.
const fn default_ai() -> AiState {
    AiState::Proceed
}

const fn default_true() -> bool {
    true
}

impl UnitData {
    /// Check if this unit can fight.
    #[must_use]
    pub fn is_combatant(&self) -> bool {
        self.weapon.is_some()
    }
}
