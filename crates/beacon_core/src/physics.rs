//! Per-tick collision flags.
//!
//! The simulation does not resolve overlaps; it only records them.
//! Each tick every collidable entity's `colliding` flag is recomputed
//! from scratch with a pairwise circle test, corpses included, so the
//! flag always describes the current tick and never goes stale.

use crate::data::Catalog;
use crate::math::circles_overlap;
use crate::store::EntityStore;

/// Recompute the `colliding` flag for every live entity.
///
/// Non-collidable entities always read `false`. The scan is symmetric:
/// an overlap sets the flag on both participants.
pub fn update_collision_flags(store: &mut EntityStore, catalog: &Catalog) {
    let slots: Vec<usize> = store.live().collect();
    for &i in &slots {
        store.physics[i].colliding = false;
    }

    for (a, &i) in slots.iter().enumerate() {
        if !store.physics[i].collides {
            continue;
        }
        let pi = store.position[i];
        let ri = catalog.unit(store.unit_def[i]).radius;
        for &j in &slots[a + 1..] {
            if !store.physics[j].collides {
                continue;
            }
            let rj = catalog.unit(store.unit_def[j]).radius;
            if circles_overlap(pi, ri, store.position[j], rj) {
                store.physics[i].colliding = true;
                store.physics[j].colliding = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Owner, PlayerId, Rgb8};
    use crate::spawn::{spawn, SpawnRequest};
    use glam::Vec2;

    fn catalog() -> Catalog {
        let units = vec![
            ron::from_str(r#"UnitData(id: "solid", radius: 10.0)"#)
                .unwrap_or_else(|e| panic!("unit record: {e}")),
            ron::from_str(r#"UnitData(id: "ghost", radius: 10.0, collides: false)"#)
                .unwrap_or_else(|e| panic!("unit record: {e}")),
        ];
        Catalog::from_records(units, Vec::new(), Vec::new())
            .unwrap_or_else(|e| panic!("catalog: {e}"))
    }

    fn place(store: &mut EntityStore, catalog: &Catalog, id: &str, position: Vec2) -> usize {
        let unit_def = catalog.unit_id(id).unwrap_or_else(|e| panic!("{e}"));
        let slot = store.allocate();
        let def = catalog.unit(unit_def);
        store.unit_def[slot] = unit_def;
        store.position[slot] = position;
        store.physics[slot].collides = def.collides;
        store.owner[slot] = Owner::for_player(PlayerId::P0, Rgb8::default());
        slot
    }

    #[test]
    fn overlap_sets_both_flags() {
        let catalog = catalog();
        let mut store = EntityStore::new();
        let a = place(&mut store, &catalog, "solid", Vec2::new(0.0, 0.0));
        let b = place(&mut store, &catalog, "solid", Vec2::new(15.0, 0.0));
        let c = place(&mut store, &catalog, "solid", Vec2::new(100.0, 0.0));

        update_collision_flags(&mut store, &catalog);
        assert!(store.physics[a].colliding);
        assert!(store.physics[b].colliding);
        assert!(!store.physics[c].colliding);
    }

    #[test]
    fn flags_clear_once_entities_separate() {
        let catalog = catalog();
        let mut store = EntityStore::new();
        let a = place(&mut store, &catalog, "solid", Vec2::new(0.0, 0.0));
        let b = place(&mut store, &catalog, "solid", Vec2::new(15.0, 0.0));

        update_collision_flags(&mut store, &catalog);
        assert!(store.physics[a].colliding && store.physics[b].colliding);

        store.position[b] = Vec2::new(200.0, 0.0);
        update_collision_flags(&mut store, &catalog);
        assert!(!store.physics[a].colliding);
        assert!(!store.physics[b].colliding);
    }

    #[test]
    fn touching_circles_do_not_count_as_overlap() {
        let catalog = catalog();
        let mut store = EntityStore::new();
        let a = place(&mut store, &catalog, "solid", Vec2::new(0.0, 0.0));
        let b = place(&mut store, &catalog, "solid", Vec2::new(20.0, 0.0));

        update_collision_flags(&mut store, &catalog);
        assert!(!store.physics[a].colliding);
        assert!(!store.physics[b].colliding);
    }

    #[test]
    fn non_collidable_entities_never_flag() {
        let catalog = catalog();
        let mut store = EntityStore::new();
        let a = place(&mut store, &catalog, "solid", Vec2::new(0.0, 0.0));
        let g = place(&mut store, &catalog, "ghost", Vec2::new(5.0, 0.0));

        update_collision_flags(&mut store, &catalog);
        assert!(!store.physics[a].colliding, "ghosts block nothing");
        assert!(!store.physics[g].colliding);
    }

    #[test]
    fn spawned_corpses_still_block() {
        let catalog = catalog();
        let mut store = EntityStore::new();
        let unit_def = catalog.unit_id("solid").unwrap_or_else(|e| panic!("{e}"));
        let a = spawn(
            &mut store,
            &catalog,
            &SpawnRequest {
                position: Vec2::new(0.0, 0.0),
                owner: Owner::for_player(PlayerId::P0, Rgb8::default()),
                unit_def,
                lane: None,
                facing: 0.0,
            },
        )
        .unwrap_or_else(|| panic!("spawn blocked"));
        let b = spawn(
            &mut store,
            &catalog,
            &SpawnRequest {
                position: Vec2::new(30.0, 0.0),
                owner: Owner::for_player(PlayerId::P1, Rgb8::default()),
                unit_def,
                lane: None,
                facing: 0.0,
            },
        )
        .unwrap_or_else(|| panic!("spawn blocked"));

        // Kill a; its physics block is untouched by death.
        store.hp[a] = 0;
        store.hit[a].state = crate::components::HitState::Dead;
        store.position[b] = Vec2::new(12.0, 0.0);

        update_collision_flags(&mut store, &catalog);
        assert!(store.physics[a].colliding);
        assert!(store.physics[b].colliding);
    }
}
