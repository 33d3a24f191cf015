//! # Beacon Test Utilities
//!
//! Shared helpers for testing the simulation across crates:
//!
//! - **Fixtures**: a standard unit catalog and pre-built skirmish matches
//!   so tests and benches agree on the same data.
//! - **Determinism**: harnesses that run a match several times (serially
//!   or on threads) and compare state hashes tick by tick.
//! - **Strategies**: `proptest` generators for simulation inputs.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;

/// Re-export proptest so downstream test crates use one version.
pub use proptest;
