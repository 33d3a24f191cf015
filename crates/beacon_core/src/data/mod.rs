//! Data structures for the unit/weapon/sprite catalog.
//!
//! This module contains pure data records designed to be deserialized
//! from RON files, plus the [`Catalog`] that resolves their string ids
//! into dense indices once before match start.
//!
//! **Note:** This module contains no IO - it only defines data types.
//! File loading is handled by `beacon_headless`.

mod catalog;
mod sprite_data;
mod unit_data;
mod weapon_data;

pub use catalog::{Catalog, SpriteDef, SpriteId, UnitDef, UnitDefId, WeaponDef, WeaponId};
pub use sprite_data::SpriteData;
pub use unit_data::UnitData;
pub use weapon_data::{AoeData, WeaponData};
