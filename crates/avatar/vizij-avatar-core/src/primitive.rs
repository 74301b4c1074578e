//! Primitive fallback avatar: two eyes and a mouth on a floating body.
//!
//! Reads the same clock and speaking flag as the skeletal avatar, so both
//! variants blink and talk in step.

use crate::avatar::AvatarBody;
use crate::config::Config;
use crate::expression::{blink_gate, mouth_target};
use crate::outputs::{PrimitiveVisual, Visual};
use crate::smoothing::advance;
use crate::state::AnimationState;

#[derive(Clone, Debug)]
pub struct PrimitiveBody {
    eye_scale: f32,
    mouth_scale: f32,
}

impl PrimitiveBody {
    pub fn new(cfg: &Config) -> Self {
        Self {
            eye_scale: 1.0,
            mouth_scale: cfg.primitive.mouth_rest_scale,
        }
    }

    pub fn eye_scale(&self) -> f32 {
        self.eye_scale
    }

    pub fn mouth_scale(&self) -> f32 {
        self.mouth_scale
    }

    pub fn step(&mut self, state: &AnimationState, cfg: &Config, dt: f32) -> PrimitiveVisual {
        let t = state.elapsed;
        let p = &cfg.primitive;

        let eye_target = if blink_gate(t, &cfg.expression) > 0.5 {
            p.eye_closed_scale
        } else {
            1.0
        };
        self.eye_scale = advance(self.eye_scale, eye_target, cfg.rates.fallback_eyes, dt);

        let mouth_goal = p.mouth_rest_scale + mouth_target(t, state.speaking, &cfg.expression);
        self.mouth_scale = advance(self.mouth_scale, mouth_goal, cfg.rates.fallback_mouth, dt);

        PrimitiveVisual {
            bob_offset_y: p.bob_amplitude * (t * p.bob_frequency as f64).sin() as f32,
            yaw: p.sway_amplitude * (t * p.sway_frequency as f64).sin() as f32,
            left_eye_scale_y: self.eye_scale,
            right_eye_scale_y: self.eye_scale,
            mouth_scale_y: self.mouth_scale,
        }
    }
}

impl AvatarBody for PrimitiveBody {
    fn animate(&mut self, state: &AnimationState, cfg: &Config, dt: f32, out: &mut Visual) {
        *out = Visual::Primitive(self.step(state, cfg, dt));
    }
}
