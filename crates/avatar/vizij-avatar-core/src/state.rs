//! Animation state shared by every avatar variant.
//!
//! The speaking flag is an external input. Everything else here is either
//! the explicit clock threaded into the pose synthesizer or a smoothed value
//! owned by the expression controller.

use serde::{Deserialize, Serialize};

/// Behavioral regime selected by the speaking flag.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Regime {
    #[default]
    Idle,
    Speaking,
}

impl Regime {
    #[inline]
    pub fn from_speaking(speaking: bool) -> Self {
        if speaking {
            Regime::Speaking
        } else {
            Regime::Idle
        }
    }

    #[inline]
    pub fn is_speaking(self) -> bool {
        self == Regime::Speaking
    }
}

/// Flag transition produced by [`AnimationState::set_speaking`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Transition {
    Started,
    Stopped,
}

/// Facial expression weights, each in [0, 1].
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpressionWeights {
    pub blink: f32,
    pub happy: f32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AnimationState {
    pub speaking: bool,
    /// Seconds since the avatar was created. Never reset.
    pub elapsed: f64,
    pub mouth_openness: f32,
    pub expressions: ExpressionWeights,
}

impl AnimationState {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn regime(&self) -> Regime {
        Regime::from_speaking(self.speaking)
    }

    /// Update the speaking flag. Only the flag flips here; targets follow on
    /// the next update and the smoothing stage carries the visual change.
    pub fn set_speaking(&mut self, speaking: bool) -> Option<Transition> {
        if self.speaking == speaking {
            return None;
        }
        self.speaking = speaking;
        Some(if speaking {
            Transition::Started
        } else {
            Transition::Stopped
        })
    }

    #[inline]
    pub fn advance_clock(&mut self, dt: f32) {
        self.elapsed += dt as f64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_transitions_report_once() {
        let mut s = AnimationState::new();
        assert_eq!(s.regime(), Regime::Idle);
        assert_eq!(s.set_speaking(true), Some(Transition::Started));
        assert_eq!(s.set_speaking(true), None);
        assert_eq!(s.regime(), Regime::Speaking);
        assert_eq!(s.set_speaking(false), Some(Transition::Stopped));
        assert_eq!(s.set_speaking(false), None);
    }

    #[test]
    fn flipping_the_flag_does_not_touch_smoothed_values() {
        let mut s = AnimationState {
            mouth_openness: 0.4,
            ..Default::default()
        };
        s.set_speaking(true);
        assert_eq!(s.mouth_openness, 0.4);
    }

    #[test]
    fn clock_accumulates() {
        let mut s = AnimationState::new();
        for _ in 0..60 {
            s.advance_clock(1.0 / 60.0);
        }
        assert!((s.elapsed - 1.0).abs() < 1e-5);
    }
}
