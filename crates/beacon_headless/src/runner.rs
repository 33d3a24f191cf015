//! Single-match driver: scenario in, report out.
//!
//! The runner owns no policy of its own. It builds a [`Simulation`]
//! from the scenario config, queues scripted waves on their due ticks,
//! and folds the tick events into a [`MatchReport`].

use tracing::debug;

use beacon_core::components::PlayerId;
use beacon_core::data::Catalog;
use beacon_core::error::Result;
use beacon_core::simulation::Simulation;

use crate::report::MatchReport;
use crate::scenario::{Scenario, Wave};

/// Scripted waves sorted by due tick, consumed front to back.
#[derive(Debug, Clone)]
pub struct WaveSchedule {
    waves: Vec<Wave>,
    next: usize,
}

impl WaveSchedule {
    /// Sort a scenario's waves by due tick. The sort is stable, so
    /// same-tick waves keep their scenario order.
    #[must_use]
    pub fn new(waves: &[Wave]) -> Self {
        let mut waves = waves.to_vec();
        waves.sort_by_key(|w| w.at_tick);
        Self { waves, next: 0 }
    }

    /// True once every wave has been queued.
    #[must_use]
    pub fn exhausted(&self) -> bool {
        self.next >= self.waves.len()
    }

    /// Queue every wave due at or before `tick`.
    pub fn queue_due(&mut self, sim: &mut Simulation, tick: u64) -> Result<()> {
        while let Some(wave) = self.waves.get(self.next) {
            if wave.at_tick > tick {
                break;
            }
            for _ in 0..wave.count {
                sim.queue_spawn(PlayerId(wave.player), wave.lane, &wave.unit)?;
            }
            self.next += 1;
        }
        Ok(())
    }
}

/// Build the simulation a scenario describes, reseeded for this run.
pub fn build_simulation(catalog: &Catalog, scenario: &Scenario, seed: u64) -> Result<Simulation> {
    let mut config = scenario.config.clone();
    config.seed = seed;
    Simulation::new(catalog.clone(), config)
}

/// Run one scripted match to its outcome or tick budget.
///
/// A `max_ticks` of zero means the scenario's own budget. The report
/// tallies spawns, losses, and damage per player from the tick events
/// and carries the final state hash for determinism checks.
pub fn run_match(
    catalog: &Catalog,
    scenario: &Scenario,
    seed: u64,
    max_ticks: u64,
) -> Result<MatchReport> {
    let budget = if max_ticks == 0 {
        scenario.max_ticks
    } else {
        max_ticks
    };

    let mut sim = build_simulation(catalog, scenario, seed)?;
    let mut schedule = WaveSchedule::new(&scenario.waves);
    let mut report = MatchReport::new(format!("match_{seed}"), &scenario.name, seed);

    while sim.current_tick() < budget {
        let tick = sim.current_tick();
        schedule.queue_due(&mut sim, tick)?;
        let events = sim.tick();

        // Event slots stay allocated well past this tick (the death
        // sequence spans many ticks), so lookups here are safe.
        for &slot in &events.spawned {
            let player = sim.store().owner[slot].player;
            let unit = sim.catalog().unit(sim.store().unit_def[slot]).id.clone();
            report.player_mut(player).record_spawn(&unit);
        }
        for &slot in &events.deaths {
            let player = sim.store().owner[slot].player;
            report.player_mut(player).units_lost += 1;
        }
        for event in &events.damage_events {
            let attacker = sim.store().owner[event.attacker].player;
            let target = sim.store().owner[event.target].player;
            report.player_mut(attacker).damage_dealt += i64::from(event.damage);
            report.player_mut(target).damage_taken += i64::from(event.damage);
        }

        if sim.match_over() {
            break;
        }
    }

    let (winner, condition) = match sim.outcome() {
        Some(outcome) => match outcome.winner {
            Some(player) => (Some(player.0), "lighthouse_fell"),
            None => (None, "both_fell"),
        },
        None => (None, "tick_limit"),
    };

    for player in [PlayerId::P0, PlayerId::P1] {
        let held = sim
            .topology()
            .board
            .iter()
            .filter(|lane| lane.control == Some(player))
            .count();
        let entry = report.player_mut(player);
        entry.gold_left = sim.player(player).gold;
        entry.lanes_held = held as u32;
    }

    report.finalize(sim.current_tick(), winner, condition, sim.state_hash());
    debug!(
        seed,
        ticks = report.duration_ticks,
        winner = ?report.winner,
        "match finished"
    );
    Ok(report)
}
