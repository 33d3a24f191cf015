//! Per-entity component blocks.
//!
//! Components are pure data with no behavior. Every entity slot in the
//! store carries one of each block; the combat and steering systems
//! mutate them in a fixed order each tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

// ============================================================================
// Ownership
// ============================================================================

/// One of the two sides in a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// The left/bottom side.
    pub const P0: Self = Self(0);
    /// The right/top side.
    pub const P1: Self = Self(1);

    /// The other side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        Self(self.0 ^ 1)
    }

    /// Index into per-player arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Render-facing color tag carried per entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Create a color from channel values.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Ownership record: which island the entity calls home, which team it
/// fights for, and which player controls it.
///
/// In a standard two-player match island, team, and player all carry
/// the same index; they are kept separate so co-op teams and neutral
/// entities stay representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    /// Home island (0 or 1 in a standard match).
    pub island: u8,
    /// Team for hostility checks.
    pub team: u8,
    /// Controlling player.
    pub player: PlayerId,
    /// Team color for rendering.
    pub color: Rgb8,
}

impl Owner {
    /// Standard ownership for a player in a two-sided match.
    #[must_use]
    pub const fn for_player(player: PlayerId, color: Rgb8) -> Self {
        Self {
            island: player.0,
            team: player.0,
            player,
            color,
        }
    }

    /// True when the two owners are on opposing teams.
    #[must_use]
    pub const fn is_hostile_to(&self, other: &Self) -> bool {
        self.team != other.team
    }
}

/// Which lane a unit walks, in the owning player's directional view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneBinding {
    /// Whose directional view of the lane.
    pub player: PlayerId,
    /// Lane index within that view.
    pub lane: usize,
}

// ============================================================================
// State machine discriminants
// ============================================================================

/// Top-level behavior state.
///
/// Transitions are driven by target acquisition and range checks in the
/// combat systems; the discriminant itself is inert data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AiState {
    /// Hold position and take no action (lighthouses).
    #[default]
    DoNothing,
    /// Follow the assigned lane, no target in range.
    Proceed,
    /// Target sighted but outside weapon range: close the distance.
    Chase,
    /// Target in weapon range: the attack cycle owns the unit.
    Attack,
}

/// Phase of the timed attack cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AttackState {
    /// Not attacking.
    #[default]
    None,
    /// Lining up the attack (`aim_ms`).
    Aim,
    /// Attack in flight (`swing_ms`); damage lands when this elapses.
    Swing,
    /// Cooling down after the swing (`recover_ms`).
    Recover,
}

/// Whether the entity is alive or playing out its death sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HitState {
    /// Taking damage normally.
    #[default]
    Alive,
    /// HP reached zero; dead/fall timers run before the slot is freed.
    Dead,
}

/// Sprite animation track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AnimState {
    /// Standing still.
    #[default]
    Idle,
    /// Moving along the lane.
    Walk,
    /// Playing the attack cycle.
    Attack,
}

// ============================================================================
// Component blocks
// ============================================================================

/// AI block: the behavior discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AiBlock {
    /// Current behavior state.
    pub state: AiState,
}

/// Attack block: cycle phase plus milliseconds left in that phase.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AttackBlock {
    /// Current phase of the attack cycle.
    pub state: AttackState,
    /// Milliseconds remaining in the current phase.
    pub timer_ms: f32,
}

/// Hit block: damage-reaction and death-sequencing timers.
///
/// All timers count down in milliseconds. `hit_timer_ms` drives the
/// hit-flash visual, `hp_bar_timer_ms` the health-bar fade. After death
/// `dead_timer_ms` runs first, then `fall_timer_ms`; when both have
/// elapsed the entity is marked freeable.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct HitBlock {
    /// Alive or playing out the death sequence.
    pub state: HitState,
    /// Hit-flash countdown, reset on every damage event.
    pub hit_timer_ms: f32,
    /// Health-bar visibility countdown, reset on every damage event.
    pub hp_bar_timer_ms: f32,
    /// Post-death display countdown before the fall begins.
    pub dead_timer_ms: f32,
    /// Fall countdown during which the render scale shrinks.
    pub fall_timer_ms: f32,
}

impl HitBlock {
    /// Render scale for the renderer: 1.0 while alive or lying dead,
    /// shrinking toward `fall_size_reduction` while the fall timer runs.
    #[must_use]
    pub fn render_scale(&self, fall_time_ms: f32, fall_size_reduction: f32) -> f32 {
        if self.state == HitState::Dead && self.dead_timer_ms <= 0.0 && fall_time_ms > 0.0 {
            let t = (self.fall_timer_ms / fall_time_ms).clamp(0.0, 1.0);
            fall_size_reduction + (1.0 - fall_size_reduction) * t
        } else {
            1.0
        }
    }
}

/// Physics block: collision participation flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PhysicsBlock {
    /// Participates in circle-collision checks.
    pub collides: bool,
    /// Corpse plays the fall animation after the dead timer.
    pub can_fall: bool,
    /// Overlapping another collidable this tick (recomputed per tick).
    pub colliding: bool,
}

/// Boid block: steering scratch state for lane-following units.
///
/// The force fields are written by the steering phase and exposed
/// read-only for debug drawing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoidBlock {
    /// Steering enabled (from the unit definition).
    pub enabled: bool,
    /// Index of the next unconsumed lane path point.
    pub next_point: usize,
    /// Seek force computed this tick.
    pub seek_force: Vec2,
    /// Avoidance force computed this tick.
    pub avoid_force: Vec2,
    /// Forward capsule reported a blocker this tick.
    pub avoiding: bool,
}

/// Animation block: current track and frame cursor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AnimBlock {
    /// Current animation track.
    pub state: AnimState,
    /// Frame index within the track.
    pub frame: u32,
    /// Milliseconds left before the frame advances.
    pub frame_timer_ms: f32,
}
