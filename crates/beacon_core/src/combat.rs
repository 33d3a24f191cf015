//! Combat resolution: the per-entity AI, attack, and hit state machines.
//!
//! The three machines advance once per tick in a fixed order: AI (target
//! acquisition and range checks), attack (the timed aim/swing/recover
//! cycle, resolving damage when a swing completes), hit (damage-reaction
//! timers and the death sequence). Each timer holds milliseconds left in
//! the current phase; a machine fires at most one transition per tick,
//! so a large time delta can never skip a phase.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::components::{AiState, AttackBlock, AttackState, HitState};
use crate::data::{AoeData, Catalog, WeaponDef};
use crate::math::circles_overlap;
use crate::store::{EntityRef, EntityStore};

/// Hit/death sequence timings, shared by every entity in a match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct HitTimings {
    /// Hit-flash length after a damage event.
    pub hit_fade_time_ms: f32,
    /// Health-bar visibility after a damage event.
    pub hp_bar_time_ms: f32,
    /// Corpse display time before the fall begins.
    pub death_time_ms: f32,
    /// Fall animation length; render scale shrinks over it.
    pub fall_time_ms: f32,
    /// Render scale at the end of the fall.
    pub fall_size_reduction: f32,
}

impl Default for HitTimings {
    fn default() -> Self {
        Self {
            hit_fade_time_ms: 400.0,
            hp_bar_time_ms: 2000.0,
            death_time_ms: 1200.0,
            fall_time_ms: 600.0,
            fall_size_reduction: 0.25,
        }
    }
}

/// One damage application resolved during the attack pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageEvent {
    /// Slot of the attacking entity.
    pub attacker: usize,
    /// Slot of the damaged entity.
    pub target: usize,
    /// Effective damage after armor, possibly zero.
    pub damage: i32,
}

/// Damage a landed swing deals through the target's armor.
///
/// Penetration is subtracted from armor and armor from damage, both
/// flooring at zero: penetration past the armor value grants no bonus,
/// and heavy armor absorbs a hit rather than healing from it.
#[must_use]
pub fn effective_damage(damage: i32, armor: i32, armor_pen: i32) -> i32 {
    (damage - (armor - armor_pen).max(0)).max(0)
}

/// Distance from an attacker's center to the target's collision edge.
///
/// Sight and weapon ranges both measure to the surface so large targets
/// (lighthouses) can be engaged from outside their radius.
fn surface_distance(store: &EntityStore, catalog: &Catalog, from: usize, to: usize) -> f32 {
    let radius = catalog.unit(store.unit_def[to]).radius;
    (store.position[from].distance(store.position[to]) - radius).max(0.0)
}

/// True when the slot can currently be fought over: not yet dying and
/// participating in collision.
fn is_attackable(store: &EntityStore, slot: usize) -> bool {
    store.hit[slot].state == HitState::Alive && store.physics[slot].collides
}

/// Nearest hostile attackable entity within `sight`, as a weak ref.
///
/// Ties break toward the lower slot index, which keeps acquisition
/// deterministic across runs.
fn acquire_target(
    store: &EntityStore,
    catalog: &Catalog,
    attacker: usize,
    sight: f32,
) -> Option<EntityRef> {
    let mut nearest: Option<(usize, f32)> = None;
    for j in store.live() {
        if j == attacker || !is_attackable(store, j) {
            continue;
        }
        if !store.owner[attacker].is_hostile_to(&store.owner[j]) {
            continue;
        }
        let dist = surface_distance(store, catalog, attacker, j);
        if dist > sight {
            continue;
        }
        if nearest.map_or(true, |(_, d)| dist < d) {
            nearest = Some((j, dist));
        }
    }
    nearest.map(|(j, _)| store.make_ref(j))
}

/// Advance every armed entity's behavior state.
///
/// Held targets are re-validated through their weak reference before any
/// use; a stale reference, a dying target, or one that left sight range
/// all mean "no target" and trigger re-acquisition. With a target the
/// state follows the range check (Attack inside weapon range, Chase
/// outside); without one the unit falls back to walking its lane, or to
/// its spawn default when it has no lane.
pub fn run_ai_system(store: &mut EntityStore, catalog: &Catalog) {
    let slots: Vec<usize> = store.live().collect();
    for i in slots {
        if store.hit[i].state != HitState::Alive {
            continue;
        }
        let def = catalog.unit(store.unit_def[i]);
        let Some(weapon_id) = def.weapon else {
            continue;
        };
        let weapon = catalog.weapon(weapon_id);

        let held = store.target[i]
            .and_then(|r| r.resolve(store))
            .filter(|&t| is_attackable(store, t))
            .filter(|&t| surface_distance(store, catalog, i, t) <= def.sight_range);

        let target = match held {
            Some(t) => Some(t),
            None => {
                let fresh = acquire_target(store, catalog, i, def.sight_range);
                store.target[i] = fresh;
                fresh.and_then(|r| r.resolve(store))
            }
        };

        match target {
            Some(t) => {
                if surface_distance(store, catalog, i, t) <= weapon.range {
                    store.ai[i].state = AiState::Attack;
                } else {
                    // Leaving Attack interrupts an aim or swing in
                    // progress; a running recover still has to finish.
                    if matches!(store.attack[i].state, AttackState::Aim | AttackState::Swing) {
                        store.attack[i] = AttackBlock::default();
                    }
                    store.ai[i].state = AiState::Chase;
                }
            }
            None => {
                store.target[i] = None;
                if matches!(store.attack[i].state, AttackState::Aim | AttackState::Swing) {
                    store.attack[i] = AttackBlock::default();
                }
                store.ai[i].state = if store.lane[i].is_some() {
                    AiState::Proceed
                } else {
                    def.default_ai
                };
            }
        }
    }
}

/// Advance attack cycles and resolve swings that complete this tick.
///
/// Every transition resets the timer to the next phase's full length,
/// so the cycle steps through Aim, Swing, and Recover one phase per
/// tick at most. Damage lands exactly at the Swing to Recover edge.
pub fn run_attack_system(
    store: &mut EntityStore,
    catalog: &Catalog,
    timings: &HitTimings,
    rng: &mut impl Rng,
    dt_ms: f32,
    events: &mut Vec<DamageEvent>,
) {
    let slots: Vec<usize> = store.live().collect();
    for i in slots {
        if store.hit[i].state != HitState::Alive {
            continue;
        }
        let def = catalog.unit(store.unit_def[i]);
        let Some(weapon_id) = def.weapon else {
            continue;
        };
        let weapon = catalog.weapon(weapon_id);

        let mut attack = store.attack[i];
        match attack.state {
            AttackState::None => {
                if store.ai[i].state == AiState::Attack {
                    attack.state = AttackState::Aim;
                    attack.timer_ms = weapon.aim_ms;
                }
            }
            AttackState::Aim => {
                attack.timer_ms -= dt_ms;
                if attack.timer_ms <= 0.0 {
                    attack.state = AttackState::Swing;
                    attack.timer_ms = weapon.swing_ms;
                }
            }
            AttackState::Swing => {
                attack.timer_ms -= dt_ms;
                if attack.timer_ms <= 0.0 {
                    store.attack[i] = attack;
                    resolve_swing(store, catalog, timings, rng, i, weapon, events);
                    attack.state = AttackState::Recover;
                    attack.timer_ms = weapon.recover_ms;
                }
            }
            AttackState::Recover => {
                attack.timer_ms -= dt_ms;
                if attack.timer_ms <= 0.0 {
                    attack = AttackBlock::default();
                }
            }
        }
        store.attack[i] = attack;
    }
}

/// Resolve one completed swing against the attacker's current target.
fn resolve_swing(
    store: &mut EntityStore,
    catalog: &Catalog,
    timings: &HitTimings,
    rng: &mut impl Rng,
    attacker: usize,
    weapon: &WeaponDef,
    events: &mut Vec<DamageEvent>,
) {
    // The swing lands where the target is now; a target that vanished
    // mid-swing whiffs.
    let Some(aim_slot) = store.target[attacker].and_then(|r| r.resolve(store)) else {
        return;
    };

    // A miss spends the cycle but deals nothing.
    if weapon.miss_chance > 0.0 && rng.gen::<f32>() < weapon.miss_chance {
        return;
    }

    match weapon.aoe {
        None => apply_damage(store, catalog, timings, attacker, aim_slot, weapon, events),
        Some(aoe) => {
            let impact = roll_impact(rng, store.position[aim_slot], &aoe);
            let slots: Vec<usize> = store.live().collect();
            for j in slots {
                if !store.physics[j].collides {
                    continue;
                }
                let radius = catalog.unit(store.unit_def[j]).radius;
                if circles_overlap(impact, aoe.radius, store.position[j], radius) {
                    apply_damage(store, catalog, timings, attacker, j, weapon, events);
                }
            }
        }
    }
}

/// Apply one weapon hit to a target, recording the event.
///
/// Entities already in the death sequence absorb further hits without
/// any effect; within the tick of death itself HP keeps dropping (the
/// hit system reads it afterwards and transitions exactly once).
fn apply_damage(
    store: &mut EntityStore,
    catalog: &Catalog,
    timings: &HitTimings,
    attacker: usize,
    target: usize,
    weapon: &WeaponDef,
    events: &mut Vec<DamageEvent>,
) {
    if store.hit[target].state != HitState::Alive {
        return;
    }
    let armor = catalog.unit(store.unit_def[target]).armor;
    let damage = effective_damage(weapon.damage, armor, weapon.armor_pen);
    store.hp[target] -= damage;
    store.hit[target].hit_timer_ms = timings.hit_fade_time_ms;
    store.hit[target].hp_bar_timer_ms = timings.hp_bar_time_ms;
    events.push(DamageEvent {
        attacker,
        target,
        damage,
    });
}

/// Roll an impact point near the aim position for an area weapon.
///
/// The offset is uniform over a disc whose radius shrinks linearly with
/// accuracy: accuracy 1 collapses the roll onto the aim point, accuracy
/// 0 spreads it over the weapon's full miss radius. The square root
/// keeps the roll uniform by area instead of clustering at the center.
fn roll_impact(rng: &mut impl Rng, aim: Vec2, aoe: &AoeData) -> Vec2 {
    let scatter = aoe.miss_radius * (1.0 - aoe.accuracy.clamp(0.0, 1.0));
    if scatter <= 0.0 {
        return aim;
    }
    let angle = rng.gen_range(0.0..TAU);
    let dist = scatter * rng.gen::<f32>().sqrt();
    aim + Vec2::from_angle(angle) * dist
}

/// Advance damage-reaction timers and the death sequence.
///
/// Runs after the attack pass so HP written this tick is read here, in
/// the same tick, and the Dead transition fires exactly once. The dead
/// timer runs first, then the fall timer; overshoot carries from one
/// into the other so the whole sequence lasts exactly
/// `death_time_ms + fall_time_ms` before the slot is marked freeable.
///
/// Returns the slots that died this tick.
pub fn run_hit_system(store: &mut EntityStore, timings: &HitTimings, dt_ms: f32) -> Vec<usize> {
    let mut deaths = Vec::new();
    let slots: Vec<usize> = store.live().collect();
    for i in slots {
        let mut hit = store.hit[i];
        hit.hit_timer_ms = (hit.hit_timer_ms - dt_ms).max(0.0);
        match hit.state {
            HitState::Alive => {
                hit.hp_bar_timer_ms = (hit.hp_bar_timer_ms - dt_ms).max(0.0);
                if store.hp[i] <= 0 {
                    hit.state = HitState::Dead;
                    hit.hp_bar_timer_ms = timings.hp_bar_time_ms;
                    hit.dead_timer_ms = timings.death_time_ms;
                    hit.fall_timer_ms = if store.physics[i].can_fall {
                        timings.fall_time_ms
                    } else {
                        0.0
                    };
                    deaths.push(i);
                }
            }
            HitState::Dead => {
                hit.hp_bar_timer_ms = (hit.hp_bar_timer_ms - dt_ms).max(0.0);
                if hit.dead_timer_ms > 0.0 {
                    hit.dead_timer_ms -= dt_ms;
                    if hit.dead_timer_ms < 0.0 {
                        // Overshoot carries into the fall.
                        hit.fall_timer_ms += hit.dead_timer_ms;
                        hit.dead_timer_ms = 0.0;
                    }
                } else {
                    hit.fall_timer_ms -= dt_ms;
                }
                if hit.dead_timer_ms <= 0.0 && hit.fall_timer_ms <= 0.0 {
                    hit.fall_timer_ms = 0.0;
                    store.mark_freeable(i);
                }
            }
        }
        store.hit[i] = hit;
    }
    deaths
}
