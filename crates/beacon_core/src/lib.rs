//! # Beacon Core
//!
//! Deterministic simulation core for Beacon, a two-lighthouse lane
//! combat game.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness (every roll comes from the seeded match RNG)
//! - No wall-clock time (everything counts simulated milliseconds)
//!
//! This separation enables:
//! - Headless batch runs and balance sweeps
//! - Determinism testing by state hash
//! - Identical behavior under any renderer or none at all
//!
//! ## Crate Structure
//!
//! - [`store`] - entity slots, recycling, generation-checked weak refs
//! - [`components`] - per-entity component blocks
//! - [`data`] - unit/weapon/sprite records and the resolved catalog
//! - [`lanes`] - Bezier lane topology and the middle-zone contest
//! - [`spawn`] - entity placement
//! - [`combat`] - AI, attack cycles, damage, death sequencing
//! - [`steering`] - seek/avoid movement
//! - [`physics`] - collision flags
//! - [`players`] - gold, cooldowns, and player intent
//! - [`input`] - raw input events mapped onto intent
//! - [`simulation`] - the match object and its tick order
//! - [`timestep`] - fixed-timestep accumulator
//! - [`math`] - small geometry helpers

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod combat;
pub mod components;
pub mod data;
pub mod error;
pub mod input;
pub mod lanes;
pub mod math;
pub mod physics;
pub mod players;
pub mod simulation;
pub mod spawn;
pub mod steering;
pub mod store;
pub mod timestep;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::combat::{effective_damage, DamageEvent, HitTimings};
    pub use crate::components::*;
    pub use crate::data::{
        AoeData, Catalog, SpriteData, SpriteDef, UnitData, UnitDef, UnitDefId, WeaponData,
        WeaponDef,
    };
    pub use crate::error::{Result, SimError};
    pub use crate::input::{InputEvent, Key, MouseButton};
    pub use crate::lanes::{build_topology, LaneLayout, Topology};
    pub use crate::players::{EconomyConfig, PlayerState, SpawnOrder};
    pub use crate::simulation::{
        ContestConfig, MatchOutcome, SimConfig, Simulation, TickEvents, TICK_MS, TICK_RATE,
    };
    pub use crate::spawn::{spawn, spawn_in_lane, SpawnRequest};
    pub use crate::steering::SteeringConfig;
    pub use crate::store::{EntityRef, EntityStore};
    pub use crate::timestep::FixedTimestep;
}
