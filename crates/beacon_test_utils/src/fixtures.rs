//! Shared fixtures so tests and benches across crates run the same match.

use beacon_core::prelude::*;

/// Standard four-unit catalog used by the cross-crate test suites.
///
/// - `lighthouse`: the immobile objective, never falls over
/// - `keeper`: armored melee line unit
/// - `lampwright`: fragile splash attacker
/// - `drifter`: unarmed chaff that only walks the lane
pub fn standard_catalog() -> Catalog {
    let units = vec![
        unit(
            r#"UnitData(id: "lighthouse", name: "Lighthouse", max_hp: 300, radius: 20.0,
                steering: false, can_fall: false, default_ai: DoNothing, cost: 0)"#,
        ),
        unit(
            r#"UnitData(id: "keeper", name: "Keeper", max_hp: 35, speed: 45.0, accel: 220.0,
                sight_range: 110.0, armor: 2, radius: 8.0, weapon: Some("cudgel"),
                sprite: Some("keeper"), cost: 25, cooldown_ms: 400.0)"#,
        ),
        unit(
            r#"UnitData(id: "lampwright", name: "Lampwright", max_hp: 22, speed: 38.0,
                accel: 180.0, sight_range: 140.0, radius: 7.0, weapon: Some("mortar"),
                sprite: Some("lampwright"), cost: 40, cooldown_ms: 600.0)"#,
        ),
        unit(
            r#"UnitData(id: "drifter", name: "Drifter", max_hp: 12, radius: 6.0,
                sprite: Some("drifter"), cost: 10, cooldown_ms: 250.0)"#,
        ),
    ];
    let weapons = vec![
        weapon(
            r#"WeaponData(id: "cudgel", damage: 6, range: 15.0, aim_ms: 300.0,
                swing_ms: 200.0, recover_ms: 500.0)"#,
        ),
        weapon(
            r#"WeaponData(id: "mortar", damage: 8, armor_pen: 1, range: 90.0, aim_ms: 500.0,
                swing_ms: 300.0, recover_ms: 900.0, aoe: Some(AoeData(radius: 22.0)))"#,
        ),
    ];
    let sprites = vec![
        sprite(
            r#"SpriteData(id: "keeper", idle_frames: 2, walk_frames: 4, attack_frames: 3,
                frame_ms: 100.0)"#,
        ),
        sprite(
            r#"SpriteData(id: "lampwright", idle_frames: 2, walk_frames: 3, attack_frames: 4,
                frame_ms: 120.0)"#,
        ),
        sprite(r#"SpriteData(id: "drifter", idle_frames: 2, walk_frames: 4, frame_ms: 100.0)"#),
    ];
    Catalog::from_records(units, weapons, sprites)
        .unwrap_or_else(|e| panic!("standard catalog: {e}"))
}

/// Default two-lighthouse match config with a fixed seed.
pub fn skirmish_config(seed: u64) -> SimConfig {
    SimConfig {
        seed,
        ..SimConfig::default()
    }
}

/// A ready-to-tick match on the standard catalog.
pub fn skirmish_sim(seed: u64) -> Simulation {
    Simulation::new(standard_catalog(), skirmish_config(seed))
        .unwrap_or_else(|e| panic!("skirmish setup: {e}"))
}

/// Queue one unit of `kind` for both players in the same lane.
pub fn queue_opposed_wave(sim: &mut Simulation, lane: usize, kind: &str) {
    for player in [PlayerId::P0, PlayerId::P1] {
        sim.queue_spawn(player, lane, kind)
            .unwrap_or_else(|e| panic!("queue {kind} for {player:?}: {e}"));
    }
}

fn unit(record: &str) -> UnitData {
    ron::from_str(record).unwrap_or_else(|e| panic!("unit record: {e}"))
}

fn weapon(record: &str) -> WeaponData {
    ron::from_str(record).unwrap_or_else(|e| panic!("weapon record: {e}"))
}

fn sprite(record: &str) -> SpriteData {
    ron::from_str(record).unwrap_or_else(|e| panic!("sprite record: {e}"))
}
