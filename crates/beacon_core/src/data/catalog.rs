//! Catalog resolution: string-id records into dense runtime tables.
//!
//! Resolution happens once before match start. Ids handed out here are
//! plain indices into the catalog's tables; the simulation dereferences
//! them directly and never re-validates at runtime.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::components::{AiState, AnimState};
use crate::error::{Result, SimError};

use super::{AoeData, SpriteData, UnitData, WeaponData};

/// Dense index of a resolved unit definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnitDefId(pub u32);

impl UnitDefId {
    /// Index into the catalog's unit table.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Dense index of a resolved weapon definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeaponId(pub u32);

impl WeaponId {
    /// Index into the catalog's weapon table.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Dense index of a resolved sprite definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpriteId(pub u32);

impl SpriteId {
    /// Index into the catalog's sprite table.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Resolved unit definition, immutable for the life of a match.
#[derive(Debug, Clone)]
pub struct UnitDef {
    /// Original string id, kept for reports and lookups.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Maximum health points.
    pub max_hp: i32,
    /// Maximum speed, world units per second.
    pub speed: f32,
    /// Maximum steering force, world units per second squared.
    pub accel: f32,
    /// Maximum turn rate, radians per second.
    pub angular_speed: f32,
    /// Target acquisition radius.
    pub sight_range: f32,
    /// Flat armor applied against incoming damage.
    pub armor: i32,
    /// Collision circle radius.
    pub radius: f32,
    /// Participates in collision and avoidance checks.
    pub collides: bool,
    /// Corpse plays the fall animation.
    pub can_fall: bool,
    /// Uses lane-following steering.
    pub steering: bool,
    /// Behavior state assigned at spawn.
    pub default_ai: AiState,
    /// Resolved weapon, if the unit fights.
    pub weapon: Option<WeaponId>,
    /// Resolved sprite, if the unit renders.
    pub sprite: Option<SpriteId>,
    /// Gold cost to spawn.
    pub cost: u32,
    /// Per-player respawn cooldown in milliseconds.
    pub cooldown_ms: f32,
}

/// Resolved weapon definition.
#[derive(Debug, Clone)]
pub struct WeaponDef {
    /// Original string id.
    pub id: String,
    /// Damage per landed swing.
    pub damage: i32,
    /// Flat reduction of the target's armor.
    pub armor_pen: i32,
    /// Engagement range.
    pub range: f32,
    /// Aim phase length in milliseconds.
    pub aim_ms: f32,
    /// Swing phase length in milliseconds.
    pub swing_ms: f32,
    /// Recover phase length in milliseconds.
    pub recover_ms: f32,
    /// Whiff chance in `[0, 1]`.
    pub miss_chance: f32,
    /// Splash parameters for area weapons.
    pub aoe: Option<AoeData>,
}

/// Resolved sprite definition.
#[derive(Debug, Clone)]
pub struct SpriteDef {
    /// Original string id.
    pub id: String,
    /// Frames in the idle track.
    pub idle_frames: u32,
    /// Frames in the walk track.
    pub walk_frames: u32,
    /// Frames in the attack track.
    pub attack_frames: u32,
    /// Milliseconds each frame is held.
    pub frame_ms: f32,
    /// Render size in world units.
    pub size: f32,
}

impl SpriteDef {
    /// Frame count of an animation track.
    #[must_use]
    pub const fn frames_for(&self, track: AnimState) -> u32 {
        match track {
            AnimState::Idle => self.idle_frames,
            AnimState::Walk => self.walk_frames,
            AnimState::Attack => self.attack_frames,
        }
    }
}

/// Resolved static data for a match.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    units: Vec<UnitDef>,
    weapons: Vec<WeaponDef>,
    sprites: Vec<SpriteDef>,
    unit_ids: HashMap<String, UnitDefId>,
}

impl Catalog {
    /// Resolve raw records into dense definitions.
    ///
    /// Duplicate ids and dangling weapon/sprite references are load
    /// errors. After this returns, every id held by a definition is a
    /// valid index.
    pub fn from_records(
        units: Vec<UnitData>,
        weapons: Vec<WeaponData>,
        sprites: Vec<SpriteData>,
    ) -> Result<Self> {
        let mut weapon_ids = HashMap::new();
        let mut weapon_defs = Vec::with_capacity(weapons.len());
        for (idx, record) in weapons.into_iter().enumerate() {
            if weapon_ids
                .insert(record.id.clone(), WeaponId(idx as u32))
                .is_some()
            {
                return Err(SimError::DuplicateId(record.id));
            }
            weapon_defs.push(WeaponDef {
                id: record.id,
                damage: record.damage,
                armor_pen: record.armor_pen,
                range: record.range,
                aim_ms: record.aim_ms,
                swing_ms: record.swing_ms,
                recover_ms: record.recover_ms,
                miss_chance: record.miss_chance,
                aoe: record.aoe,
            });
        }

        let mut sprite_ids = HashMap::new();
        let mut sprite_defs = Vec::with_capacity(sprites.len());
        for (idx, record) in sprites.into_iter().enumerate() {
            if sprite_ids
                .insert(record.id.clone(), SpriteId(idx as u32))
                .is_some()
            {
                return Err(SimError::DuplicateId(record.id));
            }
            sprite_defs.push(SpriteDef {
                id: record.id,
                idle_frames: record.idle_frames.max(1),
                walk_frames: record.walk_frames.max(1),
                attack_frames: record.attack_frames.max(1),
                frame_ms: record.frame_ms,
                size: record.size,
            });
        }

        let mut unit_ids = HashMap::new();
        let mut unit_defs = Vec::with_capacity(units.len());
        for (idx, record) in units.into_iter().enumerate() {
            if unit_ids
                .insert(record.id.clone(), UnitDefId(idx as u32))
                .is_some()
            {
                return Err(SimError::DuplicateId(record.id));
            }
            let weapon = match &record.weapon {
                Some(name) => Some(
                    *weapon_ids
                        .get(name)
                        .ok_or_else(|| SimError::UnknownWeapon(name.clone()))?,
                ),
                None => None,
            };
            let sprite = match &record.sprite {
                Some(name) => Some(
                    *sprite_ids
                        .get(name)
                        .ok_or_else(|| SimError::UnknownSprite(name.clone()))?,
                ),
                None => None,
            };
            let name = if record.name.is_empty() {
                record.id.clone()
            } else {
                record.name
            };
            unit_defs.push(UnitDef {
                id: record.id,
                name,
                max_hp: record.max_hp,
                speed: record.speed,
                accel: record.accel,
                angular_speed: record.angular_speed,
                sight_range: record.sight_range,
                armor: record.armor,
                radius: record.radius,
                collides: record.collides,
                can_fall: record.can_fall,
                steering: record.steering,
                default_ai: record.default_ai,
                weapon,
                sprite,
                cost: record.cost,
                cooldown_ms: record.cooldown_ms,
            });
        }

        Ok(Self {
            units: unit_defs,
            weapons: weapon_defs,
            sprites: sprite_defs,
            unit_ids,
        })
    }

    /// Look up a unit definition id by its string id.
    pub fn unit_id(&self, id: &str) -> Result<UnitDefId> {
        self.unit_ids
            .get(id)
            .copied()
            .ok_or_else(|| SimError::UnknownUnit(id.to_string()))
    }

    /// Unit definition by resolved id.
    #[must_use]
    pub fn unit(&self, id: UnitDefId) -> &UnitDef {
        &self.units[id.index()]
    }

    /// Weapon definition by resolved id.
    #[must_use]
    pub fn weapon(&self, id: WeaponId) -> &WeaponDef {
        &self.weapons[id.index()]
    }

    /// Sprite definition by resolved id.
    #[must_use]
    pub fn sprite(&self, id: SpriteId) -> &SpriteDef {
        &self.sprites[id.index()]
    }

    /// Number of resolved unit definitions.
    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    /// Iterate unit definitions with their ids, in table order.
    pub fn units(&self) -> impl Iterator<Item = (UnitDefId, &UnitDef)> {
        self.units
            .iter()
            .enumerate()
            .map(|(idx, def)| (UnitDefId(idx as u32), def))
    }
}
