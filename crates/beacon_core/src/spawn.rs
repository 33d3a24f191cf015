//! Entity spawning: placement checks and full block initialization.
//!
//! Spawning is the only path that turns a unit definition into live
//! component blocks. A request that would overlap an existing collidable
//! entity is rejected with a warning and `None`; the match keeps
//! running. Lane spawns add bounded lateral jitter from the match RNG so
//! repeated spawns at the same exit fan out instead of stacking.

use glam::Vec2;
use rand::Rng;

use crate::components::{
    AiBlock, AnimBlock, AttackBlock, BoidBlock, HitBlock, LaneBinding, Owner, PhysicsBlock,
    PlayerId, Rgb8,
};
use crate::data::{Catalog, UnitDefId};
use crate::lanes::{LaneLayout, Topology};
use crate::math::{circles_overlap, safe_normalize};
use crate::store::EntityStore;

/// Everything needed to place one entity.
#[derive(Debug, Clone, Copy)]
pub struct SpawnRequest {
    /// World position of the entity's center.
    pub position: Vec2,
    /// Ownership record.
    pub owner: Owner,
    /// Resolved unit definition.
    pub unit_def: UnitDefId,
    /// Lane assignment for lane-following units.
    pub lane: Option<LaneBinding>,
    /// Initial heading in radians.
    pub facing: f32,
}

/// Spawn an entity, or reject the request when the position is taken.
///
/// Rejection covers any overlap with a live collidable entity,
/// corpses included. The conflict is logged as a warning and the
/// caller gets `None`; nothing about the match state changes.
///
/// On success every component block is initialized from the unit
/// definition before the slot index is returned, so other systems never
/// observe a half-built entity.
pub fn spawn(store: &mut EntityStore, catalog: &Catalog, request: &SpawnRequest) -> Option<usize> {
    let def = catalog.unit(request.unit_def);

    if def.collides {
        for j in store.live() {
            if !store.physics[j].collides {
                continue;
            }
            let other_radius = catalog.unit(store.unit_def[j]).radius;
            if circles_overlap(request.position, def.radius, store.position[j], other_radius) {
                tracing::warn!(
                    unit = %def.id,
                    x = request.position.x,
                    y = request.position.y,
                    blocker = j,
                    "spawn rejected: position occupied"
                );
                return None;
            }
        }
    }

    let slot = store.allocate();
    store.owner[slot] = request.owner;
    store.unit_def[slot] = request.unit_def;
    store.hp[slot] = def.max_hp;
    store.position[slot] = request.position;
    store.velocity[slot] = Vec2::ZERO;
    store.acceleration[slot] = Vec2::ZERO;
    store.angle[slot] = request.facing;
    store.angular_velocity[slot] = 0.0;
    store.target[slot] = None;
    store.lane[slot] = request.lane;
    store.ai[slot] = AiBlock {
        state: def.default_ai,
    };
    store.attack[slot] = AttackBlock::default();
    store.hit[slot] = HitBlock::default();
    store.physics[slot] = PhysicsBlock {
        collides: def.collides,
        can_fall: def.can_fall,
        colliding: false,
    };
    store.boid[slot] = BoidBlock {
        enabled: def.steering,
        // Path point 0 is the owner's lighthouse center; lane units
        // start seeking the exit point just past it.
        next_point: usize::from(request.lane.is_some()),
        ..BoidBlock::default()
    };
    store.anim[slot] = AnimBlock {
        frame_timer_ms: def
            .sprite
            .map_or(0.0, |sprite| catalog.sprite(sprite).frame_ms),
        ..AnimBlock::default()
    };
    Some(slot)
}

/// Spawn a unit at a lane's exit point with lateral jitter.
///
/// The jitter is drawn from the match RNG and never exceeds half the
/// lane width, so the unit always lands inside its lane. The unit
/// starts facing down the lane.
pub fn spawn_in_lane(
    store: &mut EntityStore,
    catalog: &Catalog,
    topology: &Topology,
    rng: &mut impl Rng,
    layout: &LaneLayout,
    player: PlayerId,
    lane_index: usize,
    unit_def: UnitDefId,
    color: Rgb8,
) -> Option<usize> {
    let lane = topology.lane(player, lane_index);
    let along = safe_normalize(lane.path[2] - lane.path[1]);
    let lateral = along.perp();

    let half_width = layout.lane_width / 2.0;
    let jitter = rng.gen_range(-half_width..=half_width);

    spawn(
        store,
        catalog,
        &SpawnRequest {
            position: lane.spawn_point + lateral * jitter,
            owner: Owner::for_player(player, color),
            unit_def,
            lane: Some(LaneBinding {
                player,
                lane: lane_index,
            }),
            facing: along.to_angle(),
        },
    )
}
