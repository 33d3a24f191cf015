//! Scenario loading and configuration.
//!
//! Scenarios define a scripted match for headless runs: the simulation
//! config plus a wave schedule that queues spawn orders on fixed ticks.
//! Files are RON; [`Scenario::skirmish`] is the built-in default.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use beacon_core::simulation::SimConfig;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
}

/// A complete scenario configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name, recorded in match reports.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Match configuration; the seed is overridden per run.
    #[serde(default)]
    pub config: SimConfig,
    /// Scripted spawn waves.
    #[serde(default)]
    pub waves: Vec<Wave>,
    /// Tick budget before the match is called at the limit.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
}

/// Default tick budget: five minutes of simulated time.
const fn default_max_ticks() -> u64 {
    6000
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: "Default Skirmish".to_string(),
            description: "Mirrored keeper waves on the center lane".to_string(),
            config: SimConfig::default(),
            waves: vec![
                Wave::new(0, 0, 1, "keeper", 1),
                Wave::new(0, 1, 1, "keeper", 1),
                Wave::new(100, 0, 1, "keeper", 1),
                Wave::new(100, 1, 1, "keeper", 1),
            ],
            max_ticks: default_max_ticks(),
        }
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let scenario: Scenario = ron::from_str(&contents)?;
        Ok(scenario)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        Ok(scenario)
    }

    /// The standard mirrored skirmish across all three lanes.
    #[must_use]
    pub fn skirmish() -> Self {
        let mut waves = Vec::new();
        for player in 0..2u8 {
            waves.push(Wave::new(0, player, 1, "keeper", 1));
            waves.push(Wave::new(40, player, 0, "keeper", 1));
            waves.push(Wave::new(40, player, 2, "keeper", 1));
            waves.push(Wave::new(120, player, 1, "lampwright", 1));
            waves.push(Wave::new(240, player, 0, "drifter", 2));
            waves.push(Wave::new(240, player, 2, "drifter", 2));
            waves.push(Wave::new(400, player, 1, "keeper", 2));
        }
        Self {
            name: "Skirmish".to_string(),
            description: "Mirrored mixed waves across all three lanes".to_string(),
            config: SimConfig::default(),
            waves,
            max_ticks: default_max_ticks(),
        }
    }
}

/// One scripted spawn wave.
///
/// The wave joins the player's order queue on its due tick; payment and
/// cooldowns then gate it exactly like a click-spawn would be.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wave {
    /// Tick on which the orders are queued.
    pub at_tick: u64,
    /// Ordering player index (0 or 1).
    pub player: u8,
    /// Target lane index.
    pub lane: usize,
    /// Unit id from the catalog.
    pub unit: String,
    /// Number of orders queued.
    #[serde(default = "default_count")]
    pub count: u32,
}

const fn default_count() -> u32 {
    1
}

impl Wave {
    /// Create a new wave.
    #[must_use]
    pub fn new(at_tick: u64, player: u8, lane: usize, unit: impl Into<String>, count: u32) -> Self {
        Self {
            at_tick,
            player,
            lane,
            unit: unit.into(),
            count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scenario_is_mirrored() {
        let scenario = Scenario::default();
        assert!(scenario.waves.iter().any(|w| w.player == 0));
        assert!(scenario.waves.iter().any(|w| w.player == 1));
        assert!(scenario.max_ticks > 0);
    }

    #[test]
    fn skirmish_covers_all_three_lanes() {
        let scenario = Scenario::skirmish();
        for lane in 0..3 {
            assert!(
                scenario.waves.iter().any(|w| w.lane == lane),
                "lane {lane} unused"
            );
        }
    }

    #[test]
    fn parses_a_minimal_ron_document() {
        let ron = r#"
            Scenario(
                name: "Test",
                waves: [
                    Wave(at_tick: 0, player: 0, lane: 1, unit: "keeper"),
                ],
            )
        "#;
        let scenario = Scenario::from_ron_str(ron).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(scenario.name, "Test");
        assert_eq!(scenario.waves.len(), 1);
        assert_eq!(scenario.waves[0].count, 1);
        assert_eq!(scenario.max_ticks, 6000);
    }

    #[test]
    fn missing_file_is_reported() {
        assert!(matches!(
            Scenario::load("no/such/scenario.ron"),
            Err(ScenarioError::FileNotFound(_))
        ));
    }

    #[test]
    fn shipped_skirmish_file_parses() {
        let scenario = Scenario::from_ron_str(include_str!("../data/skirmish.ron"))
            .unwrap_or_else(|e| panic!("skirmish.ron: {e}"));
        assert_eq!(scenario.name, "Skirmish");
        assert!(!scenario.waves.is_empty());
    }
}
