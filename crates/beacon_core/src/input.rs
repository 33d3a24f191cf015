//! Raw input events and their mapping onto player intent.
//!
//! The embedding layer (browser, native shell, or scripted runner)
//! translates its own events into [`InputEvent`]s in world coordinates
//! and feeds them here. Input only ever writes player-level intent:
//! the cursor, the lane and unit selection, and queued spawn orders.
//! No entity state is touched; the simulation picks the orders up at
//! its next input snapshot.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::components::PlayerId;
use crate::data::{Catalog, UnitDefId};
use crate::lanes::Topology;
use crate::players::{PlayerState, SpawnOrder};

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    /// Primary button: select a lane and order a spawn.
    Left,
    /// Secondary button: select a lane only.
    Right,
}

/// Keys the simulation reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    /// Cycle the lane selection toward lane 0.
    LaneUp,
    /// Cycle the lane selection away from lane 0.
    LaneDown,
    /// Pick the unit in the given roster position (0-based).
    Unit(u8),
}

/// One input event, already translated to world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Cursor moved.
    MouseMove {
        /// Cursor position in world space.
        world: Vec2,
    },
    /// Button pressed.
    MouseDown {
        /// Which button.
        button: MouseButton,
    },
    /// Button released.
    MouseUp {
        /// Which button.
        button: MouseButton,
    },
    /// Key pressed.
    KeyDown {
        /// Which key.
        key: Key,
    },
    /// Key released.
    KeyUp {
        /// Which key.
        key: Key,
    },
}

/// Apply one event to a player's intent.
///
/// Down edges carry all the meaning; up events are consumed without
/// effect. A left click selects the lane whose spawn point is nearest
/// the cursor and queues a spawn order for the selected unit there; a
/// right click only moves the lane selection.
pub fn apply_input(
    state: &mut PlayerState,
    topology: &Topology,
    catalog: &Catalog,
    player: PlayerId,
    event: InputEvent,
) {
    match event {
        InputEvent::MouseMove { world } => {
            state.cursor = world;
        }
        InputEvent::MouseDown { button } => {
            if let Some(lane) = nearest_lane(topology, player, state.cursor) {
                state.selected_lane = lane;
            }
            if button == MouseButton::Left {
                if let Some(unit) = state.selected_unit {
                    state.queue_order(SpawnOrder {
                        lane: state.selected_lane,
                        unit,
                    });
                }
            }
        }
        InputEvent::KeyDown { key } => match key {
            Key::LaneUp => state.cycle_lane(topology.lane_count(), -1),
            Key::LaneDown => state.cycle_lane(topology.lane_count(), 1),
            Key::Unit(n) => {
                if let Some(unit) = roster_unit(catalog, usize::from(n)) {
                    state.selected_unit = Some(unit);
                }
            }
        },
        InputEvent::MouseUp { .. } | InputEvent::KeyUp { .. } => {}
    }
}

/// Lane whose spawn point lies nearest to a world position.
fn nearest_lane(topology: &Topology, player: PlayerId, cursor: Vec2) -> Option<usize> {
    topology
        .view(player)
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            let da = a.spawn_point.distance_squared(cursor);
            let db = b.spawn_point.distance_squared(cursor);
            da.total_cmp(&db)
        })
        .map(|(i, _)| i)
}

/// The `n`th player-spawnable unit, skipping zero-cost service units.
fn roster_unit(catalog: &Catalog, n: usize) -> Option<UnitDefId> {
    catalog
        .units()
        .filter(|(_, def)| def.cost > 0)
        .nth(n)
        .map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lanes::{build_topology, LaneLayout};
    use crate::players::EconomyConfig;

    fn catalog() -> Catalog {
        let units = vec![
            ron::from_str(r#"UnitData(id: "lighthouse", cost: 0)"#)
                .unwrap_or_else(|e| panic!("unit record: {e}")),
            ron::from_str(r#"UnitData(id: "keeper", cost: 25)"#)
                .unwrap_or_else(|e| panic!("unit record: {e}")),
            ron::from_str(r#"UnitData(id: "lampwright", cost: 40)"#)
                .unwrap_or_else(|e| panic!("unit record: {e}")),
        ];
        Catalog::from_records(units, Vec::new(), Vec::new())
            .unwrap_or_else(|e| panic!("catalog: {e}"))
    }

    fn topology() -> Topology {
        build_topology(
            [Vec2::new(100.0, 300.0), Vec2::new(700.0, 300.0)],
            &LaneLayout::default(),
        )
        .unwrap_or_else(|e| panic!("topology: {e}"))
    }

    #[test]
    fn mouse_move_tracks_the_cursor() {
        let catalog = catalog();
        let topology = topology();
        let mut state = PlayerState::new(&catalog, &EconomyConfig::default());

        apply_input(
            &mut state,
            &topology,
            &catalog,
            PlayerId::P0,
            InputEvent::MouseMove {
                world: Vec2::new(42.0, 17.0),
            },
        );
        assert_eq!(state.cursor, Vec2::new(42.0, 17.0));
        assert!(state.pending.is_empty());
    }

    #[test]
    fn left_click_queues_a_spawn_for_the_nearest_lane() {
        let catalog = catalog();
        let topology = topology();
        let mut state = PlayerState::new(&catalog, &EconomyConfig::default());
        let keeper = catalog.unit_id("keeper").unwrap_or_else(|e| panic!("{e}"));

        // Park the cursor on lane 2's spawn point.
        state.cursor = topology.lane(PlayerId::P0, 2).spawn_point;
        apply_input(
            &mut state,
            &topology,
            &catalog,
            PlayerId::P0,
            InputEvent::MouseDown {
                button: MouseButton::Left,
            },
        );

        assert_eq!(state.selected_lane, 2);
        assert_eq!(
            state.pending.front().copied(),
            Some(SpawnOrder {
                lane: 2,
                unit: keeper
            })
        );
    }

    #[test]
    fn right_click_selects_without_queueing() {
        let catalog = catalog();
        let topology = topology();
        let mut state = PlayerState::new(&catalog, &EconomyConfig::default());

        state.cursor = topology.lane(PlayerId::P0, 0).spawn_point;
        apply_input(
            &mut state,
            &topology,
            &catalog,
            PlayerId::P0,
            InputEvent::MouseDown {
                button: MouseButton::Right,
            },
        );
        assert_eq!(state.selected_lane, 0);
        assert!(state.pending.is_empty());
    }

    #[test]
    fn unit_keys_pick_roster_entries_in_catalog_order() {
        let catalog = catalog();
        let topology = topology();
        let mut state = PlayerState::new(&catalog, &EconomyConfig::default());
        let lampwright = catalog.unit_id("lampwright").unwrap_or_else(|e| panic!("{e}"));

        apply_input(
            &mut state,
            &topology,
            &catalog,
            PlayerId::P0,
            InputEvent::KeyDown { key: Key::Unit(1) },
        );
        assert_eq!(state.selected_unit, Some(lampwright));

        // Out-of-range roster key keeps the previous selection.
        apply_input(
            &mut state,
            &topology,
            &catalog,
            PlayerId::P0,
            InputEvent::KeyDown { key: Key::Unit(9) },
        );
        assert_eq!(state.selected_unit, Some(lampwright));
    }

    #[test]
    fn lane_keys_cycle_the_selection() {
        let catalog = catalog();
        let topology = topology();
        let mut state = PlayerState::new(&catalog, &EconomyConfig::default());

        apply_input(
            &mut state,
            &topology,
            &catalog,
            PlayerId::P0,
            InputEvent::KeyDown { key: Key::LaneUp },
        );
        assert_eq!(state.selected_lane, topology.lane_count() - 1);
        apply_input(
            &mut state,
            &topology,
            &catalog,
            PlayerId::P0,
            InputEvent::KeyDown { key: Key::LaneDown },
        );
        assert_eq!(state.selected_lane, 0);
    }

    #[test]
    fn up_events_are_consumed_without_effect() {
        let catalog = catalog();
        let topology = topology();
        let mut state = PlayerState::new(&catalog, &EconomyConfig::default());
        let before = state.clone();

        apply_input(
            &mut state,
            &topology,
            &catalog,
            PlayerId::P0,
            InputEvent::MouseUp {
                button: MouseButton::Left,
            },
        );
        apply_input(
            &mut state,
            &topology,
            &catalog,
            PlayerId::P0,
            InputEvent::KeyUp { key: Key::LaneUp },
        );
        assert_eq!(state.selected_lane, before.selected_lane);
        assert_eq!(state.selected_unit, before.selected_unit);
        assert!(state.pending.is_empty());
    }
}
