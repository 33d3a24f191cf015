//! Batch execution of many matches for balance sweeps.
//!
//! Matches run in parallel over a seed range. Each seed produces one
//! [`MatchReport`]; failures are collected rather than aborting the
//! sweep, and the whole batch folds into a [`BatchSummary`].

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use beacon_core::data::Catalog;
use beacon_core::error::SimError;

use crate::report::{BatchSummary, MatchReport};
use crate::runner::run_match;
use crate::scenario::Scenario;

/// Configuration for a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Scenario name, recorded in the results for provenance.
    pub scenario: String,
    /// Number of matches to run.
    pub match_count: u32,
    /// Worker threads. Zero lets rayon pick.
    pub parallel_matches: u32,
    /// Directory for result files.
    pub output_dir: PathBuf,
    /// First seed; match `i` runs with `seed_start + i`.
    pub seed_start: u64,
    /// Tick budget per match. Zero means the scenario's own budget.
    pub max_ticks: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            scenario: "skirmish".to_string(),
            match_count: 100,
            parallel_matches: 0,
            output_dir: PathBuf::from("results"),
            seed_start: 0,
            max_ticks: 0,
        }
    }
}

impl BatchConfig {
    pub fn new(scenario: &str, match_count: u32) -> Self {
        Self {
            scenario: scenario.to_string(),
            match_count,
            ..Default::default()
        }
    }

    pub fn with_output(mut self, output_dir: PathBuf) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn with_seed(mut self, seed_start: u64) -> Self {
        self.seed_start = seed_start;
        self
    }
}

/// Everything a batch run produced, serializable as one JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    pub config: BatchConfig,
    pub matches: Vec<MatchReport>,
    pub summary: BatchSummary,
    pub duration_seconds: f64,
    pub errors: Vec<BatchError>,
}

/// One failed match inside a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchError {
    pub match_index: u32,
    pub seed: u64,
    pub message: String,
}

impl BatchResults {
    /// Save results as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Load previously saved results.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(std::io::Error::other)
    }
}

#[derive(Debug, Default)]
struct Tally {
    wins: [u32; 2],
    draws: u32,
}

/// Shared progress counters for a running batch.
#[derive(Debug, Clone)]
pub struct BatchProgress {
    pub total: u32,
    pub completed: Arc<AtomicU32>,
    pub start_time: Instant,
    tally: Arc<Mutex<Tally>>,
}

impl BatchProgress {
    #[must_use]
    pub fn new(total: u32) -> Self {
        Self {
            total,
            completed: Arc::new(AtomicU32::new(0)),
            start_time: Instant::now(),
            tally: Arc::new(Mutex::new(Tally::default())),
        }
    }

    fn record_completion(&self, winner: Option<u8>) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut tally) = self.tally.lock() {
            match winner {
                Some(player) if usize::from(player) < 2 => tally.wins[usize::from(player)] += 1,
                _ => tally.draws += 1,
            }
        }
    }

    #[must_use]
    pub fn current(&self) -> u32 {
        self.completed.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            return 100.0;
        }
        (self.current() as f32 / self.total as f32) * 100.0
    }

    /// Estimated seconds remaining, from throughput so far.
    #[must_use]
    pub fn eta(&self) -> f32 {
        let completed = self.current();
        if completed == 0 {
            return f32::INFINITY;
        }
        let elapsed = self.start_time.elapsed().as_secs_f32();
        let rate = completed as f32 / elapsed;
        let remaining = self.total - completed;
        remaining as f32 / rate
    }

    /// Print a progress line with win rates so far.
    pub fn display(&self) {
        let completed = self.current();
        let eta = self.eta();
        eprintln!(
            "Batch progress: {}/{} ({:.1}%), eta {}m {}s",
            completed,
            self.total,
            self.percentage(),
            (eta / 60.0) as u32,
            (eta % 60.0) as u32
        );
        let (wins, draws) = self
            .tally
            .lock()
            .map(|t| (t.wins, t.draws))
            .unwrap_or(([0; 2], 0));
        let denom = f64::from(completed.max(1));
        eprintln!(
            "  win rates so far: p0 {:.0}%, p1 {:.0}%, draws {:.0}%",
            f64::from(wins[0]) / denom * 100.0,
            f64::from(wins[1]) / denom * 100.0,
            f64::from(draws) / denom * 100.0
        );
    }
}

/// Run a batch of matches over consecutive seeds.
///
/// Failed matches become [`BatchError`] entries instead of aborting
/// the whole sweep.
pub fn run_batch(config: BatchConfig, catalog: &Catalog, scenario: &Scenario) -> BatchResults {
    let start = Instant::now();
    let progress = Arc::new(BatchProgress::new(config.match_count));

    info!(
        "Starting batch run: {} matches of '{}'",
        config.match_count, config.scenario
    );

    if config.parallel_matches > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallel_matches as usize)
            .build_global()
            .ok(); // Ignore if already set
    }

    let results: Vec<Result<MatchReport, BatchError>> = (0..config.match_count)
        .into_par_iter()
        .map(|i| {
            let seed = config.seed_start.wrapping_add(u64::from(i));
            let result = run_match(catalog, scenario, seed, config.max_ticks).map_err(|e| {
                warn!("Match {i} (seed {seed}) failed: {e}");
                BatchError {
                    match_index: i,
                    seed,
                    message: e.to_string(),
                }
            });

            if let Ok(report) = &result {
                progress.record_completion(report.winner);
                let done = progress.current();
                if done % 10 == 0 {
                    debug!("Completed {done}/{} matches", progress.total);
                }
                if done % 100 == 0 {
                    progress.display();
                }
            }
            result
        })
        .collect();

    let (ok, failed): (Vec<_>, Vec<_>) = results.into_iter().partition(Result::is_ok);
    let matches: Vec<MatchReport> = ok.into_iter().filter_map(Result::ok).collect();
    let errors: Vec<BatchError> = failed.into_iter().filter_map(Result::err).collect();

    let duration_seconds = start.elapsed().as_secs_f64();
    info!(
        "Batch complete: {} matches in {:.1}s ({:.1} matches/sec)",
        matches.len(),
        duration_seconds,
        matches.len() as f64 / duration_seconds.max(0.001)
    );

    let summary = BatchSummary::from_matches(&matches);
    BatchResults {
        config,
        matches,
        summary,
        duration_seconds,
        errors,
    }
}

/// Run the same seed several times and compare outcomes.
///
/// Returns true when every run agrees on winner, duration, and final
/// state hash.
pub fn verify_determinism(
    catalog: &Catalog,
    scenario: &Scenario,
    seed: u64,
    runs: u32,
) -> Result<bool, SimError> {
    let mut first: Option<MatchReport> = None;
    for run in 0..runs {
        let report = run_match(catalog, scenario, seed, 0)?;
        match &first {
            None => first = Some(report),
            Some(baseline) => {
                let same = baseline.winner == report.winner
                    && baseline.duration_ticks == report.duration_ticks
                    && baseline.final_state_hash == report.final_state_hash;
                if !same {
                    warn!(
                        "Run {run} diverged: hash {:016x} vs {:016x}",
                        report.final_state_hash, baseline.final_state_hash
                    );
                    return Ok(false);
                }
            }
        }
    }
    Ok(true)
}
