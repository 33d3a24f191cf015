//! Match reports for balance analysis.
//!
//! One [`MatchReport`] per scripted match, serialized as JSON for
//! machine consumption; [`BatchSummary`] aggregates a whole sweep.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use beacon_core::components::PlayerId;

/// Complete report for a single match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchReport {
    /// Unique match identifier.
    pub match_id: String,
    /// Scenario name.
    pub scenario: String,
    /// Match RNG seed.
    pub seed: u64,
    /// Ticks run before the match ended.
    pub duration_ticks: u64,
    /// Winning player index; `None` for draws and tick limits.
    pub winner: Option<u8>,
    /// How the match ended: `lighthouse_fell`, `both_fell`, or
    /// `tick_limit`.
    pub win_condition: String,
    /// Per-player tallies, indexed by player.
    pub players: [PlayerReport; 2],
    /// Final simulation state hash, for determinism validation.
    pub final_state_hash: u64,
}

impl MatchReport {
    /// Start an empty report.
    #[must_use]
    pub fn new(match_id: impl Into<String>, scenario: impl Into<String>, seed: u64) -> Self {
        Self {
            match_id: match_id.into(),
            scenario: scenario.into(),
            seed,
            ..Default::default()
        }
    }

    /// A player's tally.
    pub fn player_mut(&mut self, player: PlayerId) -> &mut PlayerReport {
        &mut self.players[player.index()]
    }

    /// Close the report with the outcome.
    pub fn finalize(&mut self, duration: u64, winner: Option<u8>, condition: &str, hash: u64) {
        self.duration_ticks = duration;
        self.winner = winner;
        self.win_condition = condition.to_string();
        self.final_state_hash = hash;
    }
}

/// Tallies for one player in one match.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerReport {
    /// Units spawned, by unit id.
    pub units_spawned: HashMap<String, u32>,
    /// Units lost.
    pub units_lost: u32,
    /// Total damage dealt.
    pub damage_dealt: i64,
    /// Total damage taken.
    pub damage_taken: i64,
    /// Gold left at match end.
    pub gold_left: u32,
    /// Lanes controlled at match end.
    pub lanes_held: u32,
}

impl PlayerReport {
    /// Record one spawned unit.
    pub fn record_spawn(&mut self, unit: &str) {
        *self.units_spawned.entry(unit.to_string()).or_default() += 1;
    }

    /// Total units spawned across all definitions.
    #[must_use]
    pub fn total_spawned(&self) -> u32 {
        self.units_spawned.values().sum()
    }
}

/// Summary statistics across a batch of matches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Total matches played.
    pub total_matches: u32,
    /// Matches won by each player.
    pub wins: [u32; 2],
    /// Win rates by player.
    pub win_rates: [f64; 2],
    /// Draw count (double falls and tick limits).
    pub draws: u32,
    /// Average match duration in ticks.
    pub avg_duration_ticks: f64,
    /// Shortest match.
    pub min_duration_ticks: u64,
    /// Longest match.
    pub max_duration_ticks: u64,
    /// Average damage dealt per match, by player.
    pub avg_damage_dealt: [f64; 2],
}

impl BatchSummary {
    /// Aggregate a list of match reports.
    #[must_use]
    pub fn from_matches(matches: &[MatchReport]) -> Self {
        if matches.is_empty() {
            return Self::default();
        }

        let mut summary = Self {
            total_matches: matches.len() as u32,
            ..Default::default()
        };

        let mut duration_sum = 0u64;
        let mut min_duration = u64::MAX;
        let mut max_duration = 0u64;
        let mut damage_sums = [0i64; 2];

        for report in matches {
            duration_sum += report.duration_ticks;
            min_duration = min_duration.min(report.duration_ticks);
            max_duration = max_duration.max(report.duration_ticks);

            match report.winner {
                Some(player) if usize::from(player) < 2 => {
                    summary.wins[usize::from(player)] += 1;
                }
                _ => summary.draws += 1,
            }

            for (sum, player) in damage_sums.iter_mut().zip(&report.players) {
                *sum += player.damage_dealt;
            }
        }

        summary.avg_duration_ticks = duration_sum as f64 / matches.len() as f64;
        summary.min_duration_ticks = min_duration;
        summary.max_duration_ticks = max_duration;
        for index in 0..2 {
            summary.win_rates[index] =
                f64::from(summary.wins[index]) / f64::from(summary.total_matches);
            summary.avg_damage_dealt[index] =
                damage_sums[index] as f64 / f64::from(summary.total_matches);
        }

        summary
    }

    /// True when both win rates sit within `threshold` of an even split.
    #[must_use]
    pub fn is_balanced(&self, threshold: f64) -> bool {
        self.win_rates.iter().all(|rate| (rate - 0.5).abs() <= threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_records_spawns_per_player() {
        let mut report = MatchReport::new("match_1", "test", 7);
        report.player_mut(PlayerId::P0).record_spawn("keeper");
        report.player_mut(PlayerId::P0).record_spawn("keeper");
        report.player_mut(PlayerId::P1).record_spawn("drifter");

        assert_eq!(report.players[0].units_spawned.get("keeper"), Some(&2));
        assert_eq!(report.players[0].total_spawned(), 2);
        assert_eq!(report.players[1].total_spawned(), 1);
    }

    #[test]
    fn finalize_stamps_the_outcome() {
        let mut report = MatchReport::new("match_2", "test", 9);
        report.finalize(640, Some(1), "lighthouse_fell", 0xBEEF);

        assert_eq!(report.duration_ticks, 640);
        assert_eq!(report.winner, Some(1));
        assert_eq!(report.win_condition, "lighthouse_fell");
        assert_eq!(report.final_state_hash, 0xBEEF);
    }

    #[test]
    fn summary_tallies_wins_and_draws() {
        let mut a = MatchReport::new("a", "test", 1);
        a.finalize(1000, Some(0), "lighthouse_fell", 1);
        let mut b = MatchReport::new("b", "test", 2);
        b.finalize(2000, Some(1), "lighthouse_fell", 2);
        let mut c = MatchReport::new("c", "test", 3);
        c.finalize(3000, None, "tick_limit", 3);

        let summary = BatchSummary::from_matches(&[a, b, c]);
        assert_eq!(summary.total_matches, 3);
        assert_eq!(summary.wins, [1, 1]);
        assert_eq!(summary.draws, 1);
        assert!((summary.avg_duration_ticks - 2000.0).abs() < 0.001);
        assert_eq!(summary.min_duration_ticks, 1000);
        assert_eq!(summary.max_duration_ticks, 3000);
    }

    #[test]
    fn empty_batch_summary_is_zeroed() {
        let summary = BatchSummary::from_matches(&[]);
        assert_eq!(summary.total_matches, 0);
        assert_eq!(summary.min_duration_ticks, 0);
        assert_eq!(summary.wins, [0, 0]);
    }

    #[test]
    fn balance_check_uses_the_threshold() {
        let summary = BatchSummary {
            win_rates: [0.52, 0.48],
            ..Default::default()
        };

        assert!(summary.is_balanced(0.1));
        assert!(!summary.is_balanced(0.01));
    }

    #[test]
    fn report_round_trips_through_json() {
        let mut report = MatchReport::new("match_3", "test", 11);
        report.player_mut(PlayerId::P0).record_spawn("keeper");
        report.finalize(120, None, "tick_limit", 42);

        let json = serde_json::to_string_pretty(&report).unwrap_or_else(|e| panic!("{e}"));
        let back: MatchReport = serde_json::from_str(&json).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(back.players[0].units_spawned.get("keeper"), Some(&1));
        assert_eq!(back.final_state_hash, 42);
    }
}
