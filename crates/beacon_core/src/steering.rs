//! Lane steering: seek the next path point, dodge whatever is in the
//! way.
//!
//! Movement runs in two phases each tick. The decide phase reads the
//! committed positions from the store and computes one steering force
//! per unit; the integrate phase applies all of them. No unit ever sees
//! another unit's half-updated position inside a tick, so the outcome
//! does not depend on slot iteration order.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::components::{AiState, HitState};
use crate::data::Catalog;
use crate::lanes::Topology;
use crate::math::{safe_normalize, segment_intersects_circle, turn_toward, wrap_angle};
use crate::store::EntityStore;

/// Tunables for the steering phase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    /// Distance at which a lane path point counts as reached.
    pub arrive_radius: f32,
    /// Below this speed a unit holds its heading instead of turning.
    pub min_unit_velocity: f32,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            arrive_radius: 12.0,
            min_unit_velocity: 2.0,
        }
    }
}

/// Per-unit output of the decide phase.
struct Plan {
    slot: usize,
    force: Vec2,
    seek_force: Vec2,
    avoid_force: Vec2,
    avoiding: bool,
    next_point: usize,
}

/// Advance movement for every steering-enabled unit.
///
/// Lane followers consume path points within `arrive_radius` and seek
/// the next one; chasing units seek their target's position; attacking
/// or idle units brake. A blocker inside the forward capsule (length
/// = sight range, thickness = collision radius) overrides the seek with
/// a perpendicular dodge whose strength grows as the blocker nears.
/// The final force is capped by the unit's accel, velocity by its max
/// speed.
///
/// Dead units stop moving immediately; their corpses keep blocking.
pub fn run_steering_system(
    store: &mut EntityStore,
    catalog: &Catalog,
    topology: &Topology,
    config: &SteeringConfig,
    dt_ms: f32,
) {
    let dt_s = dt_ms / 1000.0;
    let mut plans: Vec<Plan> = Vec::with_capacity(store.len());

    // Decide: pure reads of the committed state.
    for i in store.live() {
        if !store.boid[i].enabled {
            continue;
        }
        if store.hit[i].state != HitState::Alive {
            plans.push(Plan {
                slot: i,
                force: Vec2::ZERO,
                seek_force: Vec2::ZERO,
                avoid_force: Vec2::ZERO,
                avoiding: false,
                next_point: store.boid[i].next_point,
            });
            continue;
        }

        let def = catalog.unit(store.unit_def[i]);
        let pos = store.position[i];
        let vel = store.velocity[i];

        let (goal, next_point) = seek_goal(store, topology, config, i);
        let desired = match goal {
            Some(g) if pos.distance_squared(g) > config.arrive_radius * config.arrive_radius => {
                safe_normalize(g - pos) * def.speed
            }
            // At the goal, or no goal at all: come to a stop.
            _ => Vec2::ZERO,
        };
        let seek_force = desired - vel;

        let (avoid_force, avoiding) = if desired == Vec2::ZERO {
            // A braking unit does not dodge.
            (Vec2::ZERO, false)
        } else {
            avoidance(store, catalog, i, def.sight_range, def.radius, def.accel)
        };

        // While the capsule reports a blocker the dodge replaces the
        // seek outright instead of blending with it.
        let force = if avoiding { avoid_force } else { seek_force };

        plans.push(Plan {
            slot: i,
            force: force.clamp_length_max(def.accel),
            seek_force,
            avoid_force,
            avoiding,
            next_point,
        });
    }

    // Integrate: commit every plan.
    for plan in plans {
        let i = plan.slot;
        let boid = &mut store.boid[i];
        boid.seek_force = plan.seek_force;
        boid.avoid_force = plan.avoid_force;
        boid.avoiding = plan.avoiding;
        boid.next_point = plan.next_point;

        if store.hit[i].state != HitState::Alive {
            store.velocity[i] = Vec2::ZERO;
            store.acceleration[i] = Vec2::ZERO;
            store.angular_velocity[i] = 0.0;
            continue;
        }

        let def = catalog.unit(store.unit_def[i]);
        store.acceleration[i] = plan.force;
        store.velocity[i] = (store.velocity[i] + plan.force * dt_s).clamp_length_max(def.speed);
        store.position[i] += store.velocity[i] * dt_s;

        let speed_sq = store.velocity[i].length_squared();
        if speed_sq >= config.min_unit_velocity * config.min_unit_velocity && dt_s > 0.0 {
            let current = store.angle[i];
            let turned = turn_toward(
                current,
                store.velocity[i].to_angle(),
                def.angular_speed * dt_s,
            );
            store.angular_velocity[i] = wrap_angle(turned - current) / dt_s;
            store.angle[i] = turned;
        } else {
            store.angular_velocity[i] = 0.0;
        }
    }
}

/// Where the unit wants to go this tick, plus its updated path cursor.
///
/// Chase seeks the live target's position. Proceed walks the assigned
/// lane, consuming every path point within `arrive_radius` before
/// aiming at the next; past the last point the goal stays pinned on
/// the enemy lighthouse. Attack and DoNothing return no goal, which
/// the caller turns into braking.
fn seek_goal(
    store: &EntityStore,
    topology: &Topology,
    config: &SteeringConfig,
    i: usize,
) -> (Option<Vec2>, usize) {
    let cursor = store.boid[i].next_point;
    match store.ai[i].state {
        AiState::Attack | AiState::DoNothing => (None, cursor),
        AiState::Chase => {
            if let Some(t) = store.target[i].and_then(|r| r.resolve(store)) {
                (Some(store.position[t]), cursor)
            } else {
                // Target vanished after the AI pass; fall back to the
                // lane until the next acquisition.
                lane_goal(store, topology, config, i, cursor)
            }
        }
        AiState::Proceed => lane_goal(store, topology, config, i, cursor),
    }
}

fn lane_goal(
    store: &EntityStore,
    topology: &Topology,
    config: &SteeringConfig,
    i: usize,
    mut cursor: usize,
) -> (Option<Vec2>, usize) {
    let Some(binding) = store.lane[i] else {
        return (None, cursor);
    };
    let path = &topology.lane(binding.player, binding.lane).path;
    let pos = store.position[i];
    let arrive_sq = config.arrive_radius * config.arrive_radius;
    while cursor < path.len() - 1 && pos.distance_squared(path[cursor]) <= arrive_sq {
        cursor += 1;
    }
    (Some(path[cursor.min(path.len() - 1)]), cursor)
}

/// Forward-capsule scan for the nearest blocker.
///
/// The capsule runs from the unit's center along its heading; a circle
/// intersecting it triggers a perpendicular dodge away from the
/// blocker's side, scaled up as the blocker gets closer. The unit's
/// current attack target never counts as a blocker, otherwise a chaser
/// would dodge the very thing it is closing on.
fn avoidance(
    store: &EntityStore,
    catalog: &Catalog,
    i: usize,
    probe_len: f32,
    own_radius: f32,
    accel: f32,
) -> (Vec2, bool) {
    let pos = store.position[i];
    let heading = Vec2::from_angle(store.angle[i]);
    let probe_end = pos + heading * probe_len;
    let target = store.target[i].and_then(|r| r.resolve(store));

    let mut nearest: Option<(usize, f32)> = None;
    for j in store.live() {
        if j == i || Some(j) == target || !store.physics[j].collides {
            continue;
        }
        let radius = catalog.unit(store.unit_def[j]).radius;
        if !segment_intersects_circle(pos, probe_end, store.position[j], radius + own_radius) {
            continue;
        }
        let dist = pos.distance(store.position[j]);
        if nearest.map_or(true, |(_, d)| dist < d) {
            nearest = Some((j, dist));
        }
    }

    let Some((blocker, dist)) = nearest else {
        return (Vec2::ZERO, false);
    };

    let side = heading.perp();
    let dir = if (store.position[blocker] - pos).dot(side) > 0.0 {
        -side
    } else {
        side
    };
    let weight = (1.0 - dist / probe_len).clamp(0.0, 1.0);
    (dir * accel * weight, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{LaneBinding, Owner, PlayerId, Rgb8};
    use crate::lanes::{build_topology, LaneLayout};
    use crate::spawn::{spawn, SpawnRequest};

    const DT_MS: f32 = 50.0;

    fn catalog() -> Catalog {
        let units = vec![
            ron::from_str(
                r#"UnitData(id: "walker", max_hp: 20, speed: 40.0, accel: 200.0,
                    angular_speed: 6.0, sight_range: 60.0, radius: 6.0)"#,
            )
            .unwrap_or_else(|e| panic!("unit record: {e}")),
            ron::from_str(
                r#"UnitData(id: "post", max_hp: 100, radius: 10.0, steering: false)"#,
            )
            .unwrap_or_else(|e| panic!("unit record: {e}")),
        ];
        Catalog::from_records(units, Vec::new(), Vec::new())
            .unwrap_or_else(|e| panic!("catalog: {e}"))
    }

    fn topology() -> Topology {
        build_topology([Vec2::new(100.0, 300.0), Vec2::new(700.0, 300.0)], &LaneLayout::default())
            .unwrap_or_else(|e| panic!("topology: {e}"))
    }

    fn walker(
        store: &mut EntityStore,
        catalog: &Catalog,
        player: PlayerId,
        position: Vec2,
        lane: Option<usize>,
    ) -> usize {
        let id = catalog.unit_id("walker").unwrap_or_else(|e| panic!("{e}"));
        spawn(
            store,
            catalog,
            &SpawnRequest {
                position,
                owner: Owner::for_player(player, Rgb8::new(200, 40, 40)),
                unit_def: id,
                lane: lane.map(|lane| LaneBinding { player, lane }),
                facing: if player == PlayerId::P0 { 0.0 } else { std::f32::consts::PI },
            },
        )
        .unwrap_or_else(|| panic!("spawn blocked"))
    }

    #[test]
    fn lane_follower_moves_toward_its_next_point() {
        let catalog = catalog();
        let topology = topology();
        let config = SteeringConfig::default();
        let mut store = EntityStore::new();
        let lane = topology.lane(PlayerId::P0, 1);
        let u = walker(&mut store, &catalog, PlayerId::P0, lane.spawn_point, Some(1));
        store.ai[u].state = AiState::Proceed;

        let start = store.position[u];
        for _ in 0..20 {
            run_steering_system(&mut store, &catalog, &topology, &config, DT_MS);
        }
        let moved = store.position[u] - start;
        assert!(moved.length() > 1.0, "unit never moved: {moved:?}");
        // Center lane runs straight toward the enemy lighthouse: +x.
        assert!(moved.x > 0.0);
    }

    #[test]
    fn path_points_within_arrive_radius_are_consumed() {
        let catalog = catalog();
        let topology = topology();
        let config = SteeringConfig::default();
        let mut store = EntityStore::new();
        let lane = topology.lane(PlayerId::P0, 1);
        // Sit exactly on the cursor's point: it counts as reached and
        // the cursor moves on to the next one.
        let u = walker(&mut store, &catalog, PlayerId::P0, lane.path[2], Some(1));
        store.ai[u].state = AiState::Proceed;
        store.boid[u].next_point = 2;

        run_steering_system(&mut store, &catalog, &topology, &config, DT_MS);
        assert_eq!(store.boid[u].next_point, 3);
    }

    #[test]
    fn speed_never_exceeds_the_definition_cap() {
        let catalog = catalog();
        let topology = topology();
        let config = SteeringConfig::default();
        let mut store = EntityStore::new();
        let lane = topology.lane(PlayerId::P0, 0);
        let u = walker(&mut store, &catalog, PlayerId::P0, lane.spawn_point, Some(0));
        store.ai[u].state = AiState::Proceed;

        for _ in 0..100 {
            run_steering_system(&mut store, &catalog, &topology, &config, DT_MS);
            assert!(store.velocity[u].length() <= 40.0 + 1e-3);
        }
    }

    #[test]
    fn blocker_ahead_triggers_a_perpendicular_dodge() {
        let catalog = catalog();
        let topology = topology();
        let config = SteeringConfig::default();
        let mut store = EntityStore::new();
        let u = walker(&mut store, &catalog, PlayerId::P0, Vec2::new(200.0, 300.0), Some(1));
        store.ai[u].state = AiState::Proceed;
        // A friendly post dead ahead, well inside the 60-unit probe.
        let post = catalog.unit_id("post").unwrap_or_else(|e| panic!("{e}"));
        spawn(
            &mut store,
            &catalog,
            &SpawnRequest {
                position: Vec2::new(230.0, 300.0),
                owner: Owner::for_player(PlayerId::P0, Rgb8::new(200, 40, 40)),
                unit_def: post,
                lane: None,
                facing: 0.0,
            },
        )
        .unwrap_or_else(|| panic!("spawn blocked"));

        run_steering_system(&mut store, &catalog, &topology, &config, DT_MS);
        assert!(store.boid[u].avoiding);
        let avoid = store.boid[u].avoid_force;
        assert!(avoid.length() > 0.0);
        // Heading +x, so the dodge is along y.
        assert!(avoid.y.abs() > avoid.x.abs());
    }

    #[test]
    fn chasers_do_not_dodge_their_own_target() {
        let catalog = catalog();
        let topology = topology();
        let config = SteeringConfig::default();
        let mut store = EntityStore::new();
        let a = walker(&mut store, &catalog, PlayerId::P0, Vec2::new(200.0, 300.0), None);
        let b = walker(&mut store, &catalog, PlayerId::P1, Vec2::new(230.0, 300.0), None);
        store.ai[a].state = AiState::Chase;
        store.target[a] = Some(store.make_ref(b));

        run_steering_system(&mut store, &catalog, &topology, &config, DT_MS);
        assert!(!store.boid[a].avoiding);
        assert!(store.velocity[a].x > 0.0, "chaser should close on its target");
    }

    #[test]
    fn attackers_brake_instead_of_drifting() {
        let catalog = catalog();
        let topology = topology();
        let config = SteeringConfig::default();
        let mut store = EntityStore::new();
        let u = walker(&mut store, &catalog, PlayerId::P0, Vec2::new(200.0, 300.0), None);
        store.ai[u].state = AiState::Attack;
        store.velocity[u] = Vec2::new(30.0, 0.0);

        let before = store.velocity[u].length();
        run_steering_system(&mut store, &catalog, &topology, &config, DT_MS);
        assert!(store.velocity[u].length() < before);
    }

    #[test]
    fn dead_units_halt_and_stay_put() {
        let catalog = catalog();
        let topology = topology();
        let config = SteeringConfig::default();
        let mut store = EntityStore::new();
        let u = walker(&mut store, &catalog, PlayerId::P0, Vec2::new(200.0, 300.0), Some(1));
        store.ai[u].state = AiState::Proceed;
        store.velocity[u] = Vec2::new(25.0, 0.0);
        store.hit[u].state = HitState::Dead;

        let before = store.position[u];
        run_steering_system(&mut store, &catalog, &topology, &config, DT_MS);
        assert_eq!(store.velocity[u], Vec2::ZERO);
        assert_eq!(store.position[u], before);
    }

    #[test]
    fn heading_holds_below_the_velocity_threshold() {
        let catalog = catalog();
        let topology = topology();
        let config = SteeringConfig::default();
        let mut store = EntityStore::new();
        let u = walker(&mut store, &catalog, PlayerId::P0, Vec2::new(200.0, 300.0), None);
        store.ai[u].state = AiState::DoNothing;
        store.angle[u] = 1.25;
        store.velocity[u] = Vec2::new(0.0, 0.5);

        run_steering_system(&mut store, &catalog, &topology, &config, DT_MS);
        assert!((store.angle[u] - 1.25).abs() < 1e-6);
        assert_eq!(store.angular_velocity[u], 0.0);
    }

    #[test]
    fn mutual_seekers_keep_their_midpoint_fixed() {
        // Both sides must read the same committed positions; a
        // sequential in-place update would shift the midpoint.
        let catalog = catalog();
        let topology = topology();
        let config = SteeringConfig::default();
        let mut store = EntityStore::new();
        let a = walker(&mut store, &catalog, PlayerId::P0, Vec2::new(200.0, 300.0), None);
        let b = walker(&mut store, &catalog, PlayerId::P1, Vec2::new(260.0, 380.0), None);
        store.ai[a].state = AiState::Chase;
        store.ai[b].state = AiState::Chase;
        store.target[a] = Some(store.make_ref(b));
        store.target[b] = Some(store.make_ref(a));

        let midpoint = (store.position[a] + store.position[b]) / 2.0;
        run_steering_system(&mut store, &catalog, &topology, &config, DT_MS);
        let after = (store.position[a] + store.position[b]) / 2.0;
        assert!(midpoint.distance(after) < 1e-3, "midpoint drifted to {after:?}");
    }
}
