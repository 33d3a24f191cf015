//! Geometry helpers for lane layout and steering.
//!
//! Positions and forces are [`glam::Vec2`] in world units and angles
//! are radians wrapped to `[-PI, PI]`. Determinism comes from a fixed
//! tick rate and seeded randomness, not bit-exact math, so plain `f32`
//! is used throughout.

use glam::Vec2;
use std::f32::consts::{PI, TAU};

/// Evaluate a cubic Bezier curve at parameter `t`.
///
/// `t` is clamped to `[0, 1]` so callers can sample past the ends
/// without leaving the curve.
#[must_use]
pub fn cubic_bezier(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, t: f32) -> Vec2 {
    let t = t.clamp(0.0, 1.0);
    let u = 1.0 - t;
    let uu = u * u;
    let tt = t * t;
    p0 * (uu * u) + p1 * (3.0 * uu * t) + p2 * (3.0 * u * tt) + p3 * (tt * t)
}

/// Normalize a vector, yielding zero when the input is too short to
/// carry a direction.
///
/// Degenerate input is a caller bug somewhere upstream (a unit seeking
/// its own position, usually), so it is logged rather than silently
/// swallowed.
#[must_use]
pub fn safe_normalize(v: Vec2) -> Vec2 {
    match v.try_normalize() {
        Some(n) => n,
        None => {
            tracing::error!(?v, "normalize of degenerate vector");
            Vec2::ZERO
        }
    }
}

/// Rotate `v` counter-clockwise by `angle` radians.
#[must_use]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

/// Closest point to `p` on the segment from `a` to `b`.
#[must_use]
pub fn closest_point_on_segment(a: Vec2, b: Vec2, p: Vec2) -> Vec2 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// True when the segment from `a` to `b` passes within `radius` of
/// `center`.
#[must_use]
pub fn segment_intersects_circle(a: Vec2, b: Vec2, center: Vec2, radius: f32) -> bool {
    closest_point_on_segment(a, b, center).distance_squared(center) <= radius * radius
}

/// True when two circles overlap (touching edges do not count).
#[must_use]
pub fn circles_overlap(c0: Vec2, r0: f32, c1: Vec2, r1: f32) -> bool {
    let r = r0 + r1;
    c0.distance_squared(c1) < r * r
}

/// Wrap an angle to `[-PI, PI]`.
#[must_use]
pub fn wrap_angle(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

/// Step `current` toward `target` by at most `max_step` radians,
/// taking the short way around the circle.
#[must_use]
pub fn turn_toward(current: f32, target: f32, max_step: f32) -> f32 {
    let diff = wrap_angle(target - current);
    if diff.abs() <= max_step {
        wrap_angle(target)
    } else {
        wrap_angle(current + max_step.copysign(diff))
    }
}
