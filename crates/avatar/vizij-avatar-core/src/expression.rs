//! Blink, mouth and affect tracks layered on top of the smoothing stage.
//!
//! Blink is a hard gate and is the only discontinuous signal the avatar
//! produces. Mouth openness and happy are always smoothed.

use crate::config::{ExpressionConfig, SmoothingRates};
use crate::smoothing::advance;
use crate::state::AnimationState;

/// `1` exactly when `sin(t * blink_frequency) > blink_threshold`, else `0`.
#[inline]
pub fn blink_gate(time: f64, cfg: &ExpressionConfig) -> f32 {
    if (time * cfg.blink_frequency as f64).sin() > cfg.blink_threshold as f64 {
        1.0
    } else {
        0.0
    }
}

/// Synthetic talking envelope while speaking, closed mouth otherwise.
#[inline]
pub fn mouth_target(time: f64, speaking: bool, cfg: &ExpressionConfig) -> f32 {
    if !speaking {
        return 0.0;
    }
    let s = (time * cfg.mouth_frequency as f64).sin() as f32;
    cfg.mouth_floor + cfg.mouth_range * (s + 1.0) * 0.5
}

#[inline]
pub fn happy_target(time: f64, speaking: bool, cfg: &ExpressionConfig) -> f32 {
    if speaking {
        cfg.happy_base + cfg.happy_swing * (time * cfg.happy_frequency as f64).sin() as f32
    } else {
        cfg.happy_idle
    }
}

/// Advance the expression tracks of `state` by one frame. Expects the clock
/// to have been advanced already.
pub fn step(state: &mut AnimationState, dt: f32, cfg: &ExpressionConfig, rates: &SmoothingRates) {
    let t = state.elapsed;
    let speaking = state.speaking;

    state.mouth_openness = advance(
        state.mouth_openness,
        mouth_target(t, speaking, cfg),
        rates.mouth,
        dt,
    );
    state.expressions.happy = advance(
        state.expressions.happy,
        happy_target(t, speaking, cfg),
        rates.happy,
        dt,
    );
    state.expressions.blink = blink_gate(t, cfg);
}
