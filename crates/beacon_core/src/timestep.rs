//! Fixed-timestep accumulator.
//!
//! The simulation only ever advances in whole ticks of a fixed
//! duration. The embedding render loop feeds wall-clock frame times
//! into the accumulator and runs however many ticks it hands back;
//! rendering happens at frame rate, simulation at tick rate. After a
//! stall (tab in the background, debugger pause) the accumulator is
//! clamped to a few ticks instead of fast-forwarding the whole gap.

use tracing::debug;

/// Accumulates frame time and converts it into whole simulation ticks.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    tick_ms: f32,
    accumulated_ms: f32,
    max_pending_ticks: u32,
}

impl FixedTimestep {
    /// Accumulator for a given tick length in milliseconds.
    #[must_use]
    pub fn new(tick_ms: f32) -> Self {
        Self {
            tick_ms,
            accumulated_ms: 0.0,
            // Worst case after a stall: a short burst, not a replay of
            // the whole gap.
            max_pending_ticks: 8,
        }
    }

    /// Override the stall clamp (maximum ticks runnable per advance).
    #[must_use]
    pub fn with_max_pending_ticks(mut self, ticks: u32) -> Self {
        self.max_pending_ticks = ticks.max(1);
        self
    }

    /// The fixed tick length in milliseconds.
    #[must_use]
    pub const fn tick_ms(&self) -> f32 {
        self.tick_ms
    }

    /// Feed elapsed wall-clock time, get back the number of whole
    /// ticks to run.
    ///
    /// Time that does not fill a whole tick stays accumulated for the
    /// next call. Negative elapsed time (clock adjustments) is ignored.
    pub fn advance(&mut self, elapsed_ms: f32) -> u32 {
        self.accumulated_ms += elapsed_ms.max(0.0);

        let cap = self.tick_ms * self.max_pending_ticks as f32;
        if self.accumulated_ms > cap {
            debug!(
                dropped_ms = self.accumulated_ms - cap,
                "stall clamp engaged"
            );
            self.accumulated_ms = cap;
        }

        let mut ticks = 0;
        while self.accumulated_ms >= self.tick_ms {
            self.accumulated_ms -= self.tick_ms;
            ticks += 1;
        }
        ticks
    }

    /// Fraction of the next tick already accumulated, in `[0, 1)`.
    ///
    /// Renderers can use this to interpolate between the last two
    /// committed positions.
    #[must_use]
    pub fn alpha(&self) -> f32 {
        (self.accumulated_ms / self.tick_ms).clamp(0.0, 1.0)
    }
}
