//! Error types for the battle simulation.

use thiserror::Error;

/// Result type alias using [`SimError`].
pub type Result<T> = std::result::Result<T, SimError>;

/// Top-level error type for all simulation errors.
#[derive(Debug, Error)]
pub enum SimError {
    /// Lane topology requested with an unsupported lane count.
    #[error("Invalid lane count {0}: must be between 1 and 16")]
    InvalidLaneCount(usize),

    /// Unit definition lookup failed.
    #[error("Unknown unit '{0}'")]
    UnknownUnit(String),

    /// Weapon definition lookup failed.
    #[error("Unknown weapon '{0}'")]
    UnknownWeapon(String),

    /// Sprite definition lookup failed.
    #[error("Unknown sprite '{0}'")]
    UnknownSprite(String),

    /// Two catalog records share the same identifier.
    #[error("Duplicate catalog id '{0}'")]
    DuplicateId(String),

    /// Player cannot afford a spawn.
    #[error("Insufficient gold: need {needed}, have {available}")]
    InsufficientGold {
        /// Cost of the requested unit.
        needed: u32,
        /// Player's current balance.
        available: u32,
    },

    /// Spawn requested while the unit's cooldown is still running.
    #[error("Unit on cooldown: {remaining_ms:.0} ms remaining")]
    UnitOnCooldown {
        /// Milliseconds until the unit can be spawned again.
        remaining_ms: f32,
    },

    /// Player index outside the two-player range.
    #[error("Invalid player index {0}")]
    InvalidPlayer(u8),

    /// Match setup could not place a lighthouse.
    #[error("Lighthouse placement failed for player {0}")]
    LighthousePlacement(u8),

    /// Lane index outside the configured topology.
    #[error("Invalid lane index {0}")]
    InvalidLane(usize),
}
