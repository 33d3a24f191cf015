//! Property-based tests over the simulation's pure kernels.
//!
//! Damage math, curve evaluation, angle handling, the fixed-step clock,
//! and weak-reference recycling all have invariants that hold for any
//! input, not just the handpicked cases in the module tests.

use std::f32::consts::{PI, TAU};

use beacon_core::math::{cubic_bezier, turn_toward, wrap_angle};
use beacon_core::prelude::*;
use beacon_test_utils::determinism::strategies::arb_damage_inputs;
use glam::Vec2;
use proptest::prelude::*;

fn points(coords: &[f32]) -> Vec<Vec2> {
    coords.chunks(2).map(|c| Vec2::new(c[0], c[1])).collect()
}

proptest! {
    #[test]
    fn prop_effective_damage_stays_bounded((damage, armor, pen) in arb_damage_inputs()) {
        let dealt = effective_damage(damage, armor, pen);
        prop_assert!(dealt >= 0, "armor can absorb a hit but never heal");
        prop_assert!(dealt <= damage, "armor never amplifies a hit");
    }

    #[test]
    fn prop_more_penetration_never_hurts_the_attacker(
        (damage, armor, pen) in arb_damage_inputs(),
    ) {
        prop_assert!(
            effective_damage(damage, armor, pen + 1) >= effective_damage(damage, armor, pen)
        );
    }

    #[test]
    fn prop_more_armor_never_hurts_the_defender(
        (damage, armor, pen) in arb_damage_inputs(),
    ) {
        prop_assert!(
            effective_damage(damage, armor + 1, pen) <= effective_damage(damage, armor, pen)
        );
    }

    #[test]
    fn prop_bezier_interpolates_its_endpoints(
        coords in proptest::collection::vec(-500.0f32..500.0, 8),
    ) {
        let p = points(&coords);
        prop_assert!(cubic_bezier(p[0], p[1], p[2], p[3], 0.0).distance(p[0]) < 1e-3);
        prop_assert!(cubic_bezier(p[0], p[1], p[2], p[3], 1.0).distance(p[3]) < 1e-3);
    }

    #[test]
    fn prop_bezier_stays_inside_the_control_box(
        coords in proptest::collection::vec(-500.0f32..500.0, 8),
        t in 0.0f32..=1.0,
    ) {
        let p = points(&coords);
        let q = cubic_bezier(p[0], p[1], p[2], p[3], t);
        let (lo, hi) = p.iter().fold(
            (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
            |(lo, hi), v| (lo.min(*v), hi.max(*v)),
        );
        prop_assert!(q.x >= lo.x - 1e-3 && q.x <= hi.x + 1e-3);
        prop_assert!(q.y >= lo.y - 1e-3 && q.y <= hi.y + 1e-3);
    }

    #[test]
    fn prop_wrap_angle_lands_in_the_principal_range(angle in -100.0f32..100.0) {
        let wrapped = wrap_angle(angle);
        prop_assert!(wrapped >= -PI - 1e-5 && wrapped <= PI + 1e-5);
        // The wrap removes a whole number of turns, nothing else.
        let turns = ((angle - wrapped) / TAU).round();
        prop_assert!((angle - wrapped - turns * TAU).abs() < 1e-3);
    }

    #[test]
    fn prop_turn_toward_respects_the_step_limit(
        current in -7.0f32..7.0,
        target in -7.0f32..7.0,
        step in 0.0f32..0.5,
    ) {
        let turned = turn_toward(current, target, step);
        prop_assert!(wrap_angle(turned - current).abs() <= step + 1e-4);
        prop_assert!(
            wrap_angle(target - turned).abs() <= wrap_angle(target - current).abs() + 1e-4,
            "a turn never moves the heading away from the target"
        );
    }

    #[test]
    fn prop_fixed_timestep_conserves_time(
        chunks in proptest::collection::vec(0.0f32..150.0, 1..25),
    ) {
        let mut clock = FixedTimestep::new(50.0);
        let mut ticks_total = 0u32;
        let mut fed = 0.0f64;
        for chunk in &chunks {
            ticks_total += clock.advance(*chunk);
            fed += f64::from(*chunk);
        }
        // Small chunks never trip the stall clamp, so every fed
        // millisecond is either a whole tick or still accumulated.
        let accounted = f64::from(ticks_total) * 50.0 + f64::from(clock.alpha()) * 50.0;
        prop_assert!((accounted - fed).abs() < 0.5, "accounted {accounted}, fed {fed}");
    }

    #[test]
    fn prop_stale_refs_never_resolve_after_recycling(
        n in 1usize..16,
        pick in 0usize..64,
    ) {
        let mut store = EntityStore::new();
        let slots: Vec<usize> = (0..n).map(|_| store.allocate()).collect();
        let refs: Vec<EntityRef> = slots.iter().map(|&s| store.make_ref(s)).collect();

        let victim = pick % n;
        store.free(slots[victim]);
        let replacement = store.allocate();
        prop_assert_eq!(replacement, slots[victim], "freed slot is recycled first");

        for (i, r) in refs.iter().enumerate() {
            if i == victim {
                prop_assert!(!r.is_valid(&store));
                prop_assert_eq!(r.resolve(&store), None);
            } else {
                prop_assert_eq!(r.resolve(&store), Some(slots[i]));
            }
        }
    }
}
