//! Entity storage: parallel component arrays with slot recycling and
//! generation-checked weak references.
//!
//! Every entity is a slot index into a set of equal-length arrays. Freed
//! slots go onto an intrusive free list and are reused by later
//! allocations; each allocation stamps the slot with a store-wide
//! monotonic identity so stale [`EntityRef`]s captured before the reuse
//! can be detected.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::components::{
    AiBlock, AnimBlock, AttackBlock, BoidBlock, HitBlock, LaneBinding, Owner, PhysicsBlock,
    PlayerId, Rgb8,
};
use crate::data::UnitDefId;

/// Free-list terminator.
const NIL: u32 = u32::MAX;

/// Weak reference to an entity: a slot index plus the identity observed
/// at capture time.
///
/// This is the only way to point at another entity across a tick
/// boundary. Validity must be rechecked before every use; a stale
/// reference is "no target", never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    slot: u32,
    identity: u64,
}

impl EntityRef {
    /// True iff the slot is in use and still holds the entity this
    /// reference was captured from.
    #[must_use]
    pub fn is_valid(&self, store: &EntityStore) -> bool {
        let slot = self.slot as usize;
        slot < store.exists.len() && store.exists[slot] && store.identity[slot] == self.identity
    }

    /// Resolve to a live slot index, or `None` when stale.
    #[must_use]
    pub fn resolve(&self, store: &EntityStore) -> Option<usize> {
        if self.is_valid(store) {
            Some(self.slot as usize)
        } else {
            None
        }
    }

    /// Slot index without the validity check, for diagnostics only.
    #[must_use]
    pub const fn slot(&self) -> u32 {
        self.slot
    }
}

/// Structure-of-arrays storage for all entities in a match.
///
/// Component columns are public: the per-tick systems iterate slot
/// indices and borrow the columns they touch directly. The bookkeeping
/// columns stay private so slot recycling is only reachable through
/// [`allocate`](Self::allocate) and [`free`](Self::free).
///
/// Invariant: every column has the same length at all times; growth
/// happens one slot at a time inside `allocate`.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    // Bookkeeping.
    exists: Vec<bool>,
    freeable: Vec<bool>,
    identity: Vec<u64>,
    next_free: Vec<u32>,
    free_head: u32,
    next_identity: u64,
    live_count: usize,

    /// Ownership record.
    pub owner: Vec<Owner>,
    /// Static unit definition index.
    pub unit_def: Vec<UnitDefId>,
    /// Current health; death at <= 0.
    pub hp: Vec<i32>,
    /// World position.
    pub position: Vec<Vec2>,
    /// World velocity, units per second.
    pub velocity: Vec<Vec2>,
    /// Steering force applied this tick, units per second squared.
    pub acceleration: Vec<Vec2>,
    /// Heading in radians.
    pub angle: Vec<f32>,
    /// Turn rate in radians per second.
    pub angular_velocity: Vec<f32>,
    /// Weak reference to the current attack target.
    pub target: Vec<Option<EntityRef>>,
    /// Lane assignment for lane-following units.
    pub lane: Vec<Option<LaneBinding>>,
    /// Behavior state block.
    pub ai: Vec<AiBlock>,
    /// Attack cycle block.
    pub attack: Vec<AttackBlock>,
    /// Damage reaction and death sequencing block.
    pub hit: Vec<HitBlock>,
    /// Collision flags block.
    pub physics: Vec<PhysicsBlock>,
    /// Steering scratch block.
    pub boid: Vec<BoidBlock>,
    /// Animation block.
    pub anim: Vec<AnimBlock>,
}

impl EntityStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            free_head: NIL,
            next_identity: 1,
            ..Self::default()
        }
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live_count
    }

    /// True when no entity is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// Total number of slots, live and free.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.exists.len()
    }

    /// True iff the slot is currently in use.
    #[must_use]
    pub fn exists(&self, index: usize) -> bool {
        index < self.exists.len() && self.exists[index]
    }

    /// True iff the slot's death sequence has completed and the
    /// lifecycle sweep should free it.
    #[must_use]
    pub fn is_freeable(&self, index: usize) -> bool {
        self.exists(index) && self.freeable[index]
    }

    /// Mark a live slot for the lifecycle sweep.
    pub fn mark_freeable(&mut self, index: usize) {
        debug_assert!(self.exists[index], "marking a free slot freeable");
        self.freeable[index] = true;
    }

    /// Identity stamped at the slot's last allocation.
    #[must_use]
    pub fn identity(&self, index: usize) -> u64 {
        self.identity[index]
    }

    /// Iterate the indices of all live slots in ascending order.
    pub fn live(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.exists.len()).filter(move |&i| self.exists[i])
    }

    /// Capture a weak reference to a live slot.
    #[must_use]
    pub fn make_ref(&self, index: usize) -> EntityRef {
        debug_assert!(self.exists[index], "capturing a ref to a free slot");
        EntityRef {
            slot: index as u32,
            identity: self.identity[index],
        }
    }

    /// Claim a slot: pop the free-list head, or grow every column by
    /// one in lockstep.
    ///
    /// The slot comes back with a fresh identity and placeholder
    /// component values; the caller must initialize every block before
    /// the index is exposed to other systems.
    pub fn allocate(&mut self) -> usize {
        let slot = if self.free_head == NIL {
            self.grow_one()
        } else {
            let slot = self.free_head as usize;
            self.free_head = self.next_free[slot];
            slot
        };
        self.exists[slot] = true;
        self.freeable[slot] = false;
        self.next_free[slot] = NIL;
        self.identity[slot] = self.next_identity;
        self.next_identity += 1;
        self.live_count += 1;
        slot
    }

    /// Release a slot back to the free list.
    ///
    /// Callable only from the lifecycle sweep, after the slot's death
    /// sequence has completed; no system may touch the slot afterwards
    /// except through a (now stale) `EntityRef`.
    pub fn free(&mut self, index: usize) {
        debug_assert!(self.exists[index], "freeing a slot that is not in use");
        self.exists[index] = false;
        self.freeable[index] = false;
        self.next_free[index] = self.free_head;
        self.free_head = index as u32;
        self.live_count -= 1;
    }

    fn grow_one(&mut self) -> usize {
        let slot = self.exists.len();
        self.exists.push(false);
        self.freeable.push(false);
        self.identity.push(0);
        self.next_free.push(NIL);
        self.owner.push(Owner::for_player(PlayerId::P0, Rgb8::default()));
        self.unit_def.push(UnitDefId(0));
        self.hp.push(0);
        self.position.push(Vec2::ZERO);
        self.velocity.push(Vec2::ZERO);
        self.acceleration.push(Vec2::ZERO);
        self.angle.push(0.0);
        self.angular_velocity.push(0.0);
        self.target.push(None);
        self.lane.push(None);
        self.ai.push(AiBlock::default());
        self.attack.push(AttackBlock::default());
        self.hit.push(HitBlock::default());
        self.physics.push(PhysicsBlock::default());
        self.boid.push(BoidBlock::default());
        self.anim.push(AnimBlock::default());
        slot
    }

    /// Check the store's structural invariants.
    ///
    /// Verifies column lengths stay in lockstep and that the free list
    /// covers exactly the non-live slots without cycles.
    #[cfg(feature = "debug-validation")]
    pub fn validate(&self) {
        let n = self.exists.len();
        assert_eq!(self.freeable.len(), n);
        assert_eq!(self.identity.len(), n);
        assert_eq!(self.next_free.len(), n);
        assert_eq!(self.owner.len(), n);
        assert_eq!(self.unit_def.len(), n);
        assert_eq!(self.hp.len(), n);
        assert_eq!(self.position.len(), n);
        assert_eq!(self.velocity.len(), n);
        assert_eq!(self.acceleration.len(), n);
        assert_eq!(self.angle.len(), n);
        assert_eq!(self.angular_velocity.len(), n);
        assert_eq!(self.target.len(), n);
        assert_eq!(self.lane.len(), n);
        assert_eq!(self.ai.len(), n);
        assert_eq!(self.attack.len(), n);
        assert_eq!(self.hit.len(), n);
        assert_eq!(self.physics.len(), n);
        assert_eq!(self.boid.len(), n);
        assert_eq!(self.anim.len(), n);

        let mut seen = vec![false; n];
        let mut cursor = self.free_head;
        let mut free_len = 0usize;
        while cursor != NIL {
            let slot = cursor as usize;
            assert!(slot < n, "free list points past the columns");
            assert!(!self.exists[slot], "live slot on the free list");
            assert!(!seen[slot], "cycle in the free list");
            seen[slot] = true;
            free_len += 1;
            cursor = self.next_free[slot];
        }
        assert_eq!(free_len + self.live_count, n);
    }
}
