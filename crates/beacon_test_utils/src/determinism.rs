//! Determinism testing harness.
//!
//! Beacon replays matches from a seed and an input script rather than
//! syncing state, so two runs of the same build must hash identically
//! every tick. The helpers here run a match several times (serially or
//! on threads) and compare state hashes.
//!
//! Sources of divergence the suites watch for:
//!
//! - **Iteration order**: systems walk entities in slot order, never
//!   through a randomized hash map.
//! - **Hidden randomness**: every scatter roll comes from the match's
//!   seeded PRNG, drawn in tick order.
//! - **Float drift between runs**: hashes cover exact `f32` bit
//!   patterns, so a single ULP of divergence is caught.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use beacon_core::simulation::Simulation;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Final hash from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated per run.
    pub ticks: u64,
}

impl DeterminismResult {
    /// All distinct hashes across the runs (one for a deterministic match).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert the runs matched, with a detailed message when they did not.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Result of parallel match runs.
#[derive(Debug, Clone)]
pub struct ParallelSimResult {
    /// Final state hash from each match.
    pub hashes: Vec<u64>,
    /// Number of ticks each match ran.
    pub ticks: u64,
    /// Number of matches run.
    pub num_sims: usize,
}

impl ParallelSimResult {
    /// Check whether every match produced the same final hash.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all matches agreed.
    ///
    /// # Panics
    ///
    /// Panics if the matches produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel matches diverged!\n\
                 Matches: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_sims,
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run any steppable state multiple times and compare final hashes.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `ticks` - Number of steps per run
/// * `setup` - Builds the initial state
/// * `step` - Advances the state by one step
/// * `hash` - Computes the state hash
///
/// # Example
///
/// ```ignore
/// use beacon_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(
///     5,
///     100,
///     || setup_battle(),
///     |sim| { sim.tick(); },
///     |sim| sim.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run a match twice from the same setup and compare final hashes.
///
/// Returns `true` if both runs produced identical state hashes.
pub fn verify_simulation_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> Simulation,
{
    let result = verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |sim| {
            sim.tick();
        },
        |sim| sim.state_hash(),
    );
    result.is_deterministic
}

/// Run N matches on worker threads and collect final hashes.
///
/// Catches non-determinism that only shows under thread scheduling or
/// memory layout variation. Scoped threads keep the setup function free
/// of `'static` bounds.
pub fn run_parallel_simulations<F>(setup_fn: F, num_sims: usize, num_ticks: u64) -> ParallelSimResult
where
    F: Fn() -> Simulation + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut sim = setup_fn();
                    for _ in 0..num_ticks {
                        sim.tick();
                    }
                    sim.state_hash()
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    ParallelSimResult {
        hashes,
        ticks: num_ticks,
        num_sims,
    }
}

/// Step two runs of the same match side by side and find where they part.
///
/// Returns `None` when the runs agree for the whole window, or
/// `Some(tick)` naming the first tick whose hashes differ.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Simulation,
{
    let mut sim1 = setup_fn();
    let mut sim2 = setup_fn();

    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        sim1.tick();
        sim2.tick();

        let (h1, h2) = (sim1.state_hash(), sim2.state_hash());
        if h1 != h2 {
            tracing::debug!(tick, h1, h2, "runs diverged");
            return Some(tick);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for match inputs.
///
/// These generate random but reproducible seeds, reinforcement waves,
/// and player input scripts for property-based determinism tests.
pub mod strategies {
    use beacon_core::prelude::{InputEvent, Key, MouseButton, PlayerId};
    use glam::Vec2;
    use proptest::prelude::*;

    /// Generate a world position inside the default board.
    pub fn arb_position() -> impl Strategy<Value = Vec2> {
        (0.0f32..800.0, 0.0f32..600.0).prop_map(|(x, y)| Vec2::new(x, y))
    }

    /// Generate either player.
    pub fn arb_player() -> impl Strategy<Value = PlayerId> {
        prop_oneof![Just(PlayerId::P0), Just(PlayerId::P1)]
    }

    /// Generate a lane index within the default three-lane fan.
    pub fn arb_lane() -> impl Strategy<Value = usize> {
        0usize..3
    }

    /// Generate a purchasable unit id from the standard catalog.
    pub fn arb_unit_kind() -> impl Strategy<Value = &'static str> {
        prop_oneof![Just("keeper"), Just("lampwright"), Just("drifter")]
    }

    /// Generate damage, armor, and penetration inputs for combat math.
    ///
    /// Ranges: damage 1-99, armor and penetration 0-49.
    pub fn arb_damage_inputs() -> impl Strategy<Value = (i32, i32, i32)> {
        (1i32..100, 0i32..50, 0i32..50)
    }

    /// A scripted reinforcement order used by replay property tests.
    #[derive(Debug, Clone)]
    pub struct TestWave {
        /// Which player receives the unit.
        pub player: PlayerId,
        /// Lane index within the default fan.
        pub lane: usize,
        /// Catalog id of the unit to queue.
        pub kind: &'static str,
    }

    /// Generate a single reinforcement wave.
    pub fn arb_wave() -> impl Strategy<Value = TestWave> {
        (arb_player(), arb_lane(), arb_unit_kind()).prop_map(|(player, lane, kind)| TestWave {
            player,
            lane,
            kind,
        })
    }

    /// Generate a list of reinforcement waves.
    pub fn arb_wave_list(max_waves: usize) -> impl Strategy<Value = Vec<TestWave>> {
        proptest::collection::vec(arb_wave(), 1..max_waves)
    }

    /// Generate a single player input event.
    pub fn arb_input_event() -> impl Strategy<Value = InputEvent> {
        prop_oneof![
            arb_position().prop_map(|world| InputEvent::MouseMove { world }),
            Just(InputEvent::MouseDown {
                button: MouseButton::Left
            }),
            Just(InputEvent::MouseDown {
                button: MouseButton::Right
            }),
            Just(InputEvent::KeyDown { key: Key::LaneUp }),
            Just(InputEvent::KeyDown { key: Key::LaneDown }),
            (0u8..3).prop_map(|n| InputEvent::KeyDown { key: Key::Unit(n) }),
        ]
    }

    /// Generate a sequence of input events.
    pub fn arb_input_script(max_len: usize) -> impl Strategy<Value = Vec<InputEvent>> {
        proptest::collection::vec(arb_input_event(), 0..max_len)
    }
}
