//! Frame-rate independent exponential approach.
//!
//! Every animated scalar (each rotation axis, mouth openness, each
//! expression weight) is moved toward its target with
//! `current + (target - current) * min(1, rate * dt)`. The step factor never
//! exceeds one, so the result always lies between `current` and `target`.
//! Rotations additionally cap the per-frame change at `rate * dt`.

use crate::skeleton::Euler;

/// Clamp a host-supplied frame delta: non-finite or negative deltas become 0,
/// large ones are capped at `max`.
#[inline]
pub fn sanitize_dt(dt: f32, max: f32) -> f32 {
    if !dt.is_finite() || dt <= 0.0 {
        0.0
    } else {
        dt.min(max)
    }
}

/// Step factor for one frame, in [0, 1].
#[inline]
pub fn step_factor(rate: f32, dt: f32) -> f32 {
    (rate * dt).clamp(0.0, 1.0)
}

/// Move `current` toward `target` by `min(1, rate * dt)` of the remaining gap.
#[inline]
pub fn advance(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    let k = step_factor(rate, dt);
    if k >= 1.0 {
        return target;
    }
    current + (target - current) * k
}

/// [`advance`] with the change limited to `±rate * dt`, so a gap wider than
/// one radian still closes gradually.
#[inline]
pub fn advance_bounded(current: f32, target: f32, rate: f32, dt: f32) -> f32 {
    let max = (rate * dt).max(0.0);
    current + (advance(current, target, rate, dt) - current).clamp(-max, max)
}

/// Per-axis [`advance_bounded`].
#[inline]
pub fn advance_euler(current: Euler, target: Euler, rate: f32, dt: f32) -> Euler {
    Euler {
        x: advance_bounded(current.x, target.x, rate, dt),
        y: advance_bounded(current.y, target.y, rate, dt),
        z: advance_bounded(current.z, target.z, rate, dt),
    }
}
