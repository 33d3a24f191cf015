//! Lane topology: procedural Bezier lane fans between the two
//! lighthouses, plus the per-lane contest state for the middle zone.
//!
//! Topology is built once at match setup. Each player gets a
//! directional view of every lane (path points ordered from their own
//! lighthouse outward); a global board record per lane carries the
//! contest bookkeeping.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::components::{HitState, PlayerId, Rgb8};
use crate::error::{Result, SimError};
use crate::math::{cubic_bezier, rotate, safe_normalize};
use crate::store::EntityStore;

/// Highest lane count the fan layout stays sane for.
pub const MAX_LANES: usize = 16;

/// Layout constants for the lane fan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaneLayout {
    /// Number of lanes (1 to [`MAX_LANES`]).
    pub lane_count: usize,
    /// Angle between adjacent lane exit directions, radians.
    pub angle_inc: f32,
    /// Distance from a lighthouse center to its lane exit points.
    pub island_radius: f32,
    /// Lateral X offset of the Bezier control points from the midpoint.
    pub ctrl_offset_x: f32,
    /// Control point Y offset of lane 0 from the midpoint.
    pub ctrl_point_start: f32,
    /// Control point Y step per lane.
    pub ctrl_point_inc: f32,
    /// Segment count of the center lane; outer lanes get more.
    pub min_num_lane_segs: usize,
    /// Lane width; spawn jitter stays within half of it.
    pub lane_width: f32,
    /// Color of an uncontested middle zone.
    pub neutral_color: Rgb8,
}

impl Default for LaneLayout {
    fn default() -> Self {
        Self {
            lane_count: 3,
            angle_inc: 0.35,
            island_radius: 50.0,
            ctrl_offset_x: 80.0,
            ctrl_point_start: -60.0,
            ctrl_point_inc: 60.0,
            min_num_lane_segs: 8,
            lane_width: 28.0,
            neutral_color: Rgb8::new(168, 168, 168),
        }
    }
}

impl LaneLayout {
    /// Set the lane count.
    #[must_use]
    pub const fn with_lane_count(mut self, lane_count: usize) -> Self {
        self.lane_count = lane_count;
        self
    }
}

/// One player's directional view of a lane.
#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    /// Path points from the owning lighthouse's center to the enemy's.
    pub path: Vec<Vec2>,
    /// The path points strictly between the two lighthouse centers
    /// (own exit through enemy exit inclusive).
    pub bridge: Vec<Vec2>,
    /// Where units of the owning player enter the lane.
    pub spawn_point: Vec2,
    /// Index of this lane in the opposing player's view.
    pub opposing: usize,
}

/// Global per-lane record merging both directional views.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardLane {
    /// Canonical path points (player 0's order).
    pub path: Vec<Vec2>,
    /// Contest position: the exact middle of the path.
    pub middle: Vec2,
    /// Player currently holding the middle zone.
    pub control: Option<PlayerId>,
    /// Player currently accruing contest time.
    pub contender: Option<PlayerId>,
    /// Milliseconds of accrued sole occupancy.
    pub contest_timer_ms: f32,
    /// Color shown while nobody holds the zone.
    pub neutral_color: Rgb8,
}

/// Built lane topology for a match.
#[derive(Debug, Clone)]
pub struct Topology {
    /// Lighthouse positions, indexed by player.
    pub lighthouses: [Vec2; 2],
    /// Contest bookkeeping per lane.
    pub board: Vec<BoardLane>,
    views: [Vec<Lane>; 2],
}

impl Topology {
    /// Number of lanes.
    #[must_use]
    pub fn lane_count(&self) -> usize {
        self.board.len()
    }

    /// A player's directional view of all lanes.
    #[must_use]
    pub fn view(&self, player: PlayerId) -> &[Lane] {
        &self.views[player.index()]
    }

    /// A player's directional view of one lane.
    #[must_use]
    pub fn lane(&self, player: PlayerId, lane: usize) -> &Lane {
        &self.views[player.index()][lane]
    }
}

/// Build the lane topology between two lighthouses.
///
/// Fatal on a lane count outside `1..=MAX_LANES`; everything else about
/// the layout is a tunable, not a validation concern.
pub fn build_topology(lighthouses: [Vec2; 2], layout: &LaneLayout) -> Result<Topology> {
    let count = layout.lane_count;
    if count < 1 || count > MAX_LANES {
        return Err(SimError::InvalidLaneCount(count));
    }

    let to_enemy = safe_normalize(lighthouses[1] - lighthouses[0]);
    let mid = (lighthouses[0] + lighthouses[1]) * 0.5;
    // Centers the fan: lane (count-1)/2 runs straight at the enemy.
    let angle_start = -((count - 1) as f32 * layout.angle_inc) / 2.0;

    let mut view0 = Vec::with_capacity(count);
    let mut view1 = Vec::with_capacity(count);
    let mut board = Vec::with_capacity(count);

    for i in 0..count {
        let angle = angle_start + i as f32 * layout.angle_inc;
        let exit0 = lighthouses[0] + rotate(to_enemy, angle) * layout.island_radius;
        // Mirrored across the lighthouse axis so the fan is symmetric.
        let exit1 = lighthouses[1] + rotate(-to_enemy, -angle) * layout.island_radius;

        let lateral = layout.ctrl_point_start + i as f32 * layout.ctrl_point_inc;
        let cp1 = mid + Vec2::new(-layout.ctrl_offset_x, lateral);
        let cp2 = mid + Vec2::new(layout.ctrl_offset_x, lateral);

        // Center lanes keep the minimum segment count; lanes farther
        // from the middle of the fan get one more per step out.
        let off_center = (i as f32 - (count - 1) as f32 / 2.0).abs().floor() as usize;
        let num_segs = layout.min_num_lane_segs + off_center;

        let mut path = Vec::with_capacity(num_segs + 3);
        path.push(lighthouses[0]);
        path.push(exit0);
        for k in 1..num_segs {
            let t = k as f32 / num_segs as f32;
            path.push(cubic_bezier(exit0, cp1, cp2, exit1, t));
        }
        path.push(exit1);
        path.push(lighthouses[1]);

        let bridge: Vec<Vec2> = path[1..path.len() - 1].to_vec();
        let middle = middle_of(&path);

        let mut path_rev = path.clone();
        path_rev.reverse();
        let mut bridge_rev = bridge.clone();
        bridge_rev.reverse();

        view0.push(Lane {
            path: path.clone(),
            bridge,
            spawn_point: exit0,
            opposing: i,
        });
        view1.push(Lane {
            path: path_rev,
            bridge: bridge_rev,
            spawn_point: exit1,
            opposing: i,
        });
        board.push(BoardLane {
            path,
            middle,
            control: None,
            contender: None,
            contest_timer_ms: 0.0,
            neutral_color: layout.neutral_color,
        });
    }

    Ok(Topology {
        lighthouses,
        board,
        views: [view0, view1],
    })
}

/// Exact middle of a point sequence: the central point, or the average
/// of the two central points when the length is even.
fn middle_of(points: &[Vec2]) -> Vec2 {
    let len = points.len();
    if len % 2 == 1 {
        points[len / 2]
    } else {
        (points[len / 2 - 1] + points[len / 2]) * 0.5
    }
}

/// Advance the contest state of every board lane by one tick.
///
/// A lane's middle zone accrues contest time while exactly one player
/// has living collidable units within `radius` of it; reaching
/// `capture_ms` hands that player control. A contested or empty zone
/// drains the timer instead, and the contender is dropped once it hits
/// zero. Control persists until the other player completes a capture.
pub fn update_contest(
    topology: &mut Topology,
    store: &EntityStore,
    radius: f32,
    capture_ms: f32,
    dt_ms: f32,
) {
    for lane in &mut topology.board {
        let mut present = [false; 2];
        for i in store.live() {
            if store.hit[i].state != HitState::Alive || !store.physics[i].collides {
                continue;
            }
            if store.position[i].distance_squared(lane.middle) <= radius * radius {
                present[store.owner[i].player.index()] = true;
            }
        }

        let sole = match (present[0], present[1]) {
            (true, false) => Some(PlayerId::P0),
            (false, true) => Some(PlayerId::P1),
            _ => None,
        };

        match sole {
            Some(player) => {
                if lane.contender != Some(player) {
                    lane.contender = Some(player);
                    lane.contest_timer_ms = 0.0;
                }
                lane.contest_timer_ms = (lane.contest_timer_ms + dt_ms).min(capture_ms);
                if lane.contest_timer_ms >= capture_ms {
                    lane.control = Some(player);
                }
            }
            None => {
                lane.contest_timer_ms = (lane.contest_timer_ms - dt_ms).max(0.0);
                if lane.contest_timer_ms <= 0.0 {
                    lane.contender = None;
                }
            }
        }
    }
}
