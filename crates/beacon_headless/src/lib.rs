//! Headless match runner for balance testing and CI verification.
//!
//! Runs full simulations without any rendering or input layer:
//!
//! - Scripted matches from RON scenarios, reported as JSON on stdout
//! - Parallel balance sweeps over seed ranges
//! - Determinism verification, hash for hash, for CI
//!
//! Logs go to stderr; stdout carries only machine-readable reports.
//!
//! ```bash
//! beacon_headless run --seed 7
//! beacon_headless batch --count 500 --output results/
//! beacon_headless verify --seed 12345 --runs 5
//! ```

pub mod batch;
pub mod catalog;
pub mod report;
pub mod runner;
pub mod scenario;

pub use batch::{run_batch, verify_determinism, BatchConfig, BatchError, BatchProgress, BatchResults};
pub use catalog::{load_catalog, CatalogError, CatalogFile};
pub use report::{BatchSummary, MatchReport, PlayerReport};
pub use runner::{build_simulation, run_match, WaveSchedule};
pub use scenario::{Scenario, ScenarioError, Wave};
