//! Headless runner binary.
//!
//! ```bash
//! beacon_headless run --scenario scenarios/rush.ron --seed 7
//! beacon_headless batch --count 500 --parallel 8 --output results/
//! beacon_headless verify --seed 12345 --runs 5
//! beacon_headless benchmark --ticks 20000
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::{filter, fmt, prelude::*};

use beacon_core::data::Catalog;
use beacon_headless::batch::{run_batch, verify_determinism, BatchConfig};
use beacon_headless::catalog::load_catalog;
use beacon_headless::runner::{build_simulation, run_match, WaveSchedule};
use beacon_headless::scenario::Scenario;

#[derive(Parser)]
#[command(name = "beacon_headless")]
#[command(about = "Headless Beacon match runner for balance testing and CI")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single match and print its report as JSON
    Run {
        /// Scenario file (RON); defaults to the built-in skirmish
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Catalog file (RON); defaults to the embedded roster
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Simulation seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Tick budget override; zero keeps the scenario's budget
        #[arg(long, default_value = "0")]
        max_ticks: u64,
    },

    /// Run many matches over consecutive seeds and summarize
    Batch {
        /// Scenario file (RON); defaults to the built-in skirmish
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Catalog file (RON); defaults to the embedded roster
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Number of matches
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Worker threads; zero lets rayon pick
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for batch_results.json
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// First seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Tick budget override; zero keeps the scenario's budget
        #[arg(long, default_value = "0")]
        max_ticks: u64,
    },

    /// Re-run one seed and fail if any run diverges
    Verify {
        /// Scenario file (RON); defaults to the built-in skirmish
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Catalog file (RON); defaults to the embedded roster
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Seed to re-run
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Number of runs to compare
        #[arg(short, long, default_value = "5")]
        runs: u32,
    },

    /// Measure raw tick throughput
    Benchmark {
        /// Ticks to simulate after warmup
        #[arg(short, long, default_value = "12000")]
        ticks: u64,

        /// Scenario file (RON); defaults to the built-in skirmish
        #[arg(short, long)]
        scenario: Option<PathBuf>,

        /// Catalog file (RON); defaults to the embedded roster
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Simulation seed
        #[arg(long, default_value = "0")]
        seed: u64,
    },
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter::LevelFilter::from_level(log_level))
        .init();

    match cli.command {
        Commands::Run {
            scenario,
            catalog,
            seed,
            max_ticks,
        } => cmd_run(scenario, catalog, seed, max_ticks),
        Commands::Batch {
            scenario,
            catalog,
            count,
            parallel,
            output,
            seed,
            max_ticks,
        } => cmd_batch(scenario, catalog, count, parallel, output, seed, max_ticks),
        Commands::Verify {
            scenario,
            catalog,
            seed,
            runs,
        } => cmd_verify(scenario, catalog, seed, runs),
        Commands::Benchmark {
            ticks,
            scenario,
            catalog,
            seed,
        } => cmd_benchmark(ticks, scenario, catalog, seed),
    }
}

/// Load the catalog and scenario a command asked for, or die trying.
fn load_inputs(scenario: Option<&PathBuf>, catalog: Option<&PathBuf>) -> (Catalog, Scenario) {
    let catalog = match load_catalog(catalog.map(PathBuf::as_path)) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    };
    let scenario = match scenario {
        Some(path) => match Scenario::load(path) {
            Ok(scenario) => scenario,
            Err(e) => {
                eprintln!("FATAL: {e}");
                std::process::exit(1);
            }
        },
        None => Scenario::skirmish(),
    };
    (catalog, scenario)
}

fn cmd_run(scenario: Option<PathBuf>, catalog: Option<PathBuf>, seed: u64, max_ticks: u64) {
    let (catalog, scenario) = load_inputs(scenario.as_ref(), catalog.as_ref());
    info!("Running '{}' with seed {seed}", scenario.name);

    let report = match run_match(&catalog, &scenario, seed, max_ticks) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    }

    eprintln!("Match finished in {} ticks", report.duration_ticks);
    match report.winner {
        Some(player) => eprintln!("Winner: player {player} ({})", report.win_condition),
        None => eprintln!("No winner ({})", report.win_condition),
    }
}

fn cmd_batch(
    scenario: Option<PathBuf>,
    catalog: Option<PathBuf>,
    count: u32,
    parallel: u32,
    output: PathBuf,
    seed: u64,
    max_ticks: u64,
) {
    let (catalog, scenario) = load_inputs(scenario.as_ref(), catalog.as_ref());

    if let Err(e) = std::fs::create_dir_all(&output) {
        eprintln!("FATAL: Cannot create output directory: {e}");
        std::process::exit(1);
    }

    let config = BatchConfig {
        scenario: scenario.name.clone(),
        match_count: count,
        parallel_matches: parallel,
        output_dir: output.clone(),
        seed_start: seed,
        max_ticks,
    };

    let results = run_batch(config, &catalog, &scenario);

    let path = output.join("batch_results.json");
    if let Err(e) = results.save(&path) {
        eprintln!("FATAL: Cannot save results: {e}");
        std::process::exit(1);
    }

    eprintln!("{}", "=".repeat(50));
    eprintln!("BATCH COMPLETE");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Matches played:   {}", results.matches.len());
    if !results.errors.is_empty() {
        eprintln!("Matches failed:   {}", results.errors.len());
    }
    eprintln!("Duration:         {:.1}s", results.duration_seconds);
    eprintln!(
        "Throughput:       {:.1} matches/sec",
        results.matches.len() as f64 / results.duration_seconds.max(0.001)
    );
    eprintln!(
        "Win rates:        p0 {:.1}%, p1 {:.1}%, draws {}",
        results.summary.win_rates[0] * 100.0,
        results.summary.win_rates[1] * 100.0,
        results.summary.draws
    );
    eprintln!(
        "Avg duration:     {:.0} ticks (min {}, max {})",
        results.summary.avg_duration_ticks,
        results.summary.min_duration_ticks,
        results.summary.max_duration_ticks
    );
    if !results.errors.is_empty() {
        eprintln!("Failures:");
        for error in results.errors.iter().take(10) {
            eprintln!(
                "  match {} (seed {}): {}",
                error.match_index, error.seed, error.message
            );
        }
        if results.errors.len() > 10 {
            eprintln!("  ... and {} more", results.errors.len() - 10);
        }
    }
    eprintln!("Results saved to: {}", path.display());
}

fn cmd_verify(scenario: Option<PathBuf>, catalog: Option<PathBuf>, seed: u64, runs: u32) {
    let (catalog, scenario) = load_inputs(scenario.as_ref(), catalog.as_ref());
    info!("Verifying determinism: seed {seed}, {runs} runs");

    match verify_determinism(&catalog, &scenario, seed, runs) {
        Ok(true) => {
            eprintln!("PASS: All {runs} runs produced identical results");
        }
        Ok(false) => {
            eprintln!("FAIL: Non-determinism detected!");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_benchmark(ticks: u64, scenario: Option<PathBuf>, catalog: Option<PathBuf>, seed: u64) {
    let (catalog, scenario) = load_inputs(scenario.as_ref(), catalog.as_ref());

    let mut sim = match build_simulation(&catalog, &scenario, seed) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
    };
    let mut schedule = WaveSchedule::new(&scenario.waves);

    eprintln!("Running {ticks} ticks of '{}'...", scenario.name);

    // Warmup so allocations settle before timing starts.
    for _ in 0..100 {
        let tick = sim.current_tick();
        if let Err(e) = schedule.queue_due(&mut sim, tick) {
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
        sim.tick();
    }

    let start = std::time::Instant::now();
    for _ in 0..ticks {
        let tick = sim.current_tick();
        if let Err(e) = schedule.queue_due(&mut sim, tick) {
            eprintln!("FATAL: {e}");
            std::process::exit(1);
        }
        sim.tick();
    }
    let elapsed = start.elapsed();

    eprintln!("{}", "=".repeat(50));
    eprintln!("BENCHMARK RESULTS");
    eprintln!("{}", "=".repeat(50));
    eprintln!("Ticks:          {ticks}");
    eprintln!("Duration:       {:.3}s", elapsed.as_secs_f64());
    eprintln!(
        "Ticks/second:   {:.1}",
        ticks as f64 / elapsed.as_secs_f64()
    );
    eprintln!(
        "ms/tick:        {:.4}",
        elapsed.as_millis() as f64 / ticks as f64
    );
    eprintln!("Final entities: {}", sim.store().len());
    eprintln!("State hash:     {:016x}", sim.state_hash());
}
