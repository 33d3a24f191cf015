//! Sprite records driving animation frame selection.
//!
//! The core never touches image data; it only advances frame counters
//! that the renderer maps onto sheets.

use serde::{Deserialize, Serialize};

/// Data-driven sprite record.
///
/// Frame counts are per animation track; a count of 1 holds a single
/// static frame. `frame_ms` applies to every track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpriteData {
    /// Unique string identifier, referenced from unit records.
    pub id: String,

    /// Frames in the idle track.
    #[serde(default = "default_frames")]
    pub idle_frames: u32,

    /// Frames in the walk track.
    #[serde(default = "default_frames")]
    pub walk_frames: u32,

    /// Frames in the attack track.
    #[serde(default = "default_frames")]
    pub attack_frames: u32,

    /// Milliseconds each frame is held.
    #[serde(default = "default_frame_ms")]
    pub frame_ms: f32,

    /// Render size in world units.
    #[serde(default = "default_size")]
    pub size: f32,
}

/// Default frame count per track.
const fn default_frames() -> u32 {
    1
}

/// Default frame hold time.
const fn default_frame_ms() -> f32 {
    150.0
}

/// Default render size.
const fn default_size() -> f32 {
    16.0
}
