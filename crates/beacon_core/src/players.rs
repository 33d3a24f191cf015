//! Per-player match state: the gold ledger, spawn cooldowns, and the
//! player's current intent (cursor, selected lane and unit, queued
//! spawn orders).
//!
//! Nothing here touches the entity store. Input handling writes intent,
//! the simulation drains the order queue at the start of each tick, and
//! every gold movement goes through the ledger methods so a balance can
//! never go negative.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::data::{Catalog, UnitDefId};
use crate::error::{Result, SimError};

/// Economy tunables shared by both players.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Gold each player holds at match start.
    pub starting_gold: u32,
    /// Passive income in gold per second of simulated time.
    pub income_per_sec: f32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_gold: 100,
            income_per_sec: 2.0,
        }
    }
}

/// One queued spawn: which unit to place in which lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnOrder {
    /// Lane index in the owning player's view.
    pub lane: usize,
    /// Unit definition to spawn.
    pub unit: UnitDefId,
}

/// Everything a player owns besides entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    /// Current gold balance.
    pub gold: u32,
    /// Fractional gold carried between ticks by the income accrual.
    pub income_carry: f32,
    /// Per-unit-definition cooldown countdowns, milliseconds.
    pub cooldowns_ms: Vec<f32>,
    /// Lane the player's next spawn order targets.
    pub selected_lane: usize,
    /// Unit the player's next spawn order places.
    pub selected_unit: Option<UnitDefId>,
    /// Last known cursor position in world space.
    pub cursor: Vec2,
    /// Spawn orders waiting for the next input snapshot.
    pub pending: VecDeque<SpawnOrder>,
}

impl PlayerState {
    /// Fresh state at match start.
    ///
    /// The default selected unit is the first affordable roster entry:
    /// the first catalog unit with a nonzero cost. Service entities
    /// (lighthouses) cost zero and are never player-spawnable.
    #[must_use]
    pub fn new(catalog: &Catalog, economy: &EconomyConfig) -> Self {
        Self {
            gold: economy.starting_gold,
            income_carry: 0.0,
            cooldowns_ms: vec![0.0; catalog.unit_count()],
            selected_lane: 0,
            selected_unit: catalog.units().find(|(_, def)| def.cost > 0).map(|(id, _)| id),
            cursor: Vec2::ZERO,
            pending: VecDeque::new(),
        }
    }

    /// Accrue passive income and run down spawn cooldowns.
    ///
    /// Income accumulates fractionally and mints whole gold only, so
    /// the balance stays an integer and no income is lost to rounding.
    pub fn tick(&mut self, economy: &EconomyConfig, dt_ms: f32) {
        self.income_carry += economy.income_per_sec * dt_ms / 1000.0;
        while self.income_carry >= 1.0 {
            self.gold += 1;
            self.income_carry -= 1.0;
        }
        for cd in &mut self.cooldowns_ms {
            *cd = (*cd - dt_ms).max(0.0);
        }
    }

    /// True when the balance covers a cost.
    #[must_use]
    pub fn can_afford(&self, cost: u32) -> bool {
        self.gold >= cost
    }

    /// Milliseconds until the unit can be spawned again.
    #[must_use]
    pub fn cooldown_remaining(&self, unit: UnitDefId) -> f32 {
        self.cooldowns_ms.get(unit.index()).copied().unwrap_or(0.0)
    }

    /// Charge the player for one spawn of `unit`.
    ///
    /// Checks the cooldown first, then the balance; on success the gold
    /// is deducted and the unit's cooldown restarts. Nothing changes on
    /// error.
    pub fn pay_for(&mut self, catalog: &Catalog, unit: UnitDefId) -> Result<()> {
        let def = catalog.unit(unit);
        let remaining = self.cooldown_remaining(unit);
        if remaining > 0.0 {
            return Err(SimError::UnitOnCooldown {
                remaining_ms: remaining,
            });
        }
        if self.gold < def.cost {
            return Err(SimError::InsufficientGold {
                needed: def.cost,
                available: self.gold,
            });
        }
        self.gold -= def.cost;
        self.cooldowns_ms[unit.index()] = def.cooldown_ms;
        Ok(())
    }

    /// Undo a payment whose spawn was then rejected.
    ///
    /// Returns the unit's cost and clears its cooldown, as if
    /// [`pay_for`](Self::pay_for) had never run.
    pub fn refund(&mut self, catalog: &Catalog, unit: UnitDefId) {
        self.gold += catalog.unit(unit).cost;
        if let Some(cd) = self.cooldowns_ms.get_mut(unit.index()) {
            *cd = 0.0;
        }
    }

    /// Queue a spawn order for the next input snapshot.
    pub fn queue_order(&mut self, order: SpawnOrder) {
        self.pending.push_back(order);
    }

    /// Move the lane selection by `step`, wrapping at both ends.
    pub fn cycle_lane(&mut self, lane_count: usize, step: isize) {
        if lane_count == 0 {
            return;
        }
        let count = lane_count as isize;
        let next = (self.selected_lane as isize + step).rem_euclid(count);
        self.selected_lane = next as usize;
    }
}
