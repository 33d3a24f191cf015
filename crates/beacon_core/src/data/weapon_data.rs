//! Weapon records for data-driven combat.

use serde::{Deserialize, Serialize};

/// Area-of-effect parameters for splash weapons.
///
/// A weapon with `aoe` set never damages its target directly: the swing
/// rolls an impact point near the target and damages everything whose
/// collision circle intersects the blast circle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AoeData {
    /// Blast radius around the impact point.
    pub radius: f32,

    /// Maximum distance the impact point may land from the aim point.
    #[serde(default = "default_miss_radius")]
    pub miss_radius: f32,

    /// Accuracy in `[0, 1]`; higher narrows the impact roll toward the
    /// aim point (1.0 always hits it exactly).
    #[serde(default = "default_accuracy")]
    pub accuracy: f32,
}

/// Default scatter radius for area weapons.
const fn default_miss_radius() -> f32 {
    30.0
}

/// Default area-weapon accuracy.
const fn default_accuracy() -> f32 {
    0.5
}

/// Data-driven weapon record.
///
/// Only `id` is required; omitted fields fall back to the defaults
/// below. Timers are in milliseconds of simulated time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponData {
    /// Unique string identifier, referenced from unit records.
    pub id: String,

    /// Damage per landed swing, before the target's armor.
    #[serde(default = "default_damage")]
    pub damage: i32,

    /// Flat reduction applied to the target's armor before damage.
    #[serde(default)]
    pub armor_pen: i32,

    /// Engagement range in world units (edge-to-center).
    #[serde(default = "default_range")]
    pub range: f32,

    /// Milliseconds spent lining up before the swing.
    #[serde(default = "default_aim_ms")]
    pub aim_ms: f32,

    /// Milliseconds the swing takes; damage lands when it elapses.
    #[serde(default = "default_swing_ms")]
    pub swing_ms: f32,

    /// Milliseconds of cooldown after the swing.
    #[serde(default = "default_recover_ms")]
    pub recover_ms: f32,

    /// Chance in `[0, 1]` that a swing whiffs entirely.
    #[serde(default)]
    pub miss_chance: f32,

    /// Splash parameters; None means a single-target weapon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aoe: Option<AoeData>,
}

/// Default swing damage.
const fn default_damage() -> i32 {
    1
}

/// Default engagement range.
const fn default_range() -> f32 {
    20.0
}

/// Default aim phase length.
const fn default_aim_ms() -> f32 {
    300.0
}

/// Default swing phase length.
const fn default_swing_ms() -> f32 {
    200.0
}

/// Default recover phase length.
const fn default_recover_ms() -> f32 {
    500.0
}

impl WeaponData {
    /// Check if this weapon deals splash damage.
    #[must_use]
    pub fn is_area(&self) -> bool {
        self.aoe.is_some()
    }

    /// Full cycle length from aim start to ready again.
    #[must_use]
    pub fn cycle_ms(&self) -> f32 {
        self.aim_ms + self.swing_ms + self.recover_ms
    }
}
