//! Core configuration for vizij-avatar-core.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::AvatarError;
use crate::role::Role;
use crate::Result;

/// Tuning for the avatar controller. Every section falls back to its
/// defaults when omitted from JSON.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rates: SmoothingRates,
    pub pose: PoseConfig,
    pub expression: ExpressionConfig,
    pub primitive: PrimitiveConfig,
    pub binding: BindingConfig,
    /// Upper bound for a single frame delta (seconds). Hosts that stall
    /// (background tabs, debugger pauses) would otherwise hand over huge deltas.
    pub max_frame_delta: f32,
}

/// Per-quantity exponential smoothing rates (1/s).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingRates {
    pub mouth: f32,
    pub happy: f32,
    pub speaking_body: f32,
    pub speaking_hands: f32,
    pub idle_body: f32,
    pub fallback_mouth: f32,
    pub fallback_eyes: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseConfig {
    /// Roll (rad) that brings the upper arms from a T-pose down to the sides.
    /// Tuned for VRoid-exported rigs; other rest poses may need a different value.
    pub arm_rest_angle: f32,
    /// Apply the one-time arms-down correction right after binding.
    pub correct_rest_pose: bool,
    /// Yaw applied to the model root so imported rigs face the camera.
    pub root_yaw: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpressionConfig {
    pub blink_frequency: f32,
    pub blink_threshold: f32,
    pub mouth_frequency: f32,
    pub mouth_floor: f32,
    pub mouth_range: f32,
    pub happy_base: f32,
    pub happy_swing: f32,
    pub happy_frequency: f32,
    pub happy_idle: f32,
    pub channels: ChannelNames,
}

/// Expression channel names looked up on the bound asset.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelNames {
    pub mouth: String,
    pub blink: String,
    pub happy: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimitiveConfig {
    pub eye_closed_scale: f32,
    pub mouth_rest_scale: f32,
    pub bob_amplitude: f32,
    pub bob_frequency: f32,
    pub sway_amplitude: f32,
    pub sway_frequency: f32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingConfig {
    /// Joint names tried before the built-in names for a role.
    pub overrides: HashMap<Role, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rates: SmoothingRates::default(),
            pose: PoseConfig::default(),
            expression: ExpressionConfig::default(),
            primitive: PrimitiveConfig::default(),
            binding: BindingConfig::default(),
            max_frame_delta: 0.25,
        }
    }
}

impl Default for SmoothingRates {
    fn default() -> Self {
        Self {
            mouth: 8.0,
            happy: 2.0,
            speaking_body: 8.0,
            speaking_hands: 12.0,
            idle_body: 3.0,
            fallback_mouth: 8.0,
            fallback_eyes: 20.0,
        }
    }
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            arm_rest_angle: 1.2,
            correct_rest_pose: true,
            root_yaw: std::f32::consts::PI,
        }
    }
}

impl Default for ExpressionConfig {
    fn default() -> Self {
        Self {
            blink_frequency: 0.5,
            blink_threshold: 0.95,
            mouth_frequency: 15.0,
            mouth_floor: 0.2,
            mouth_range: 0.6,
            happy_base: 0.3,
            happy_swing: 0.1,
            happy_frequency: 2.0,
            happy_idle: 0.1,
            channels: ChannelNames::default(),
        }
    }
}

impl Default for ChannelNames {
    fn default() -> Self {
        Self {
            mouth: "aa".to_string(),
            blink: "blink".to_string(),
            happy: "happy".to_string(),
        }
    }
}

impl Default for PrimitiveConfig {
    fn default() -> Self {
        Self {
            eye_closed_scale: 0.1,
            mouth_rest_scale: 0.3,
            bob_amplitude: 0.05,
            bob_frequency: 0.8,
            sway_amplitude: 0.1,
            sway_frequency: 0.3,
        }
    }
}

impl Config {
    /// Parse a (possibly partial) JSON config and validate it.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Config =
            serde_json::from_str(s).map_err(|e| AvatarError::Config(format!("parse error: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values that would let a target formula leave [0, 1] or make
    /// smoothing run backwards.
    pub fn validate(&self) -> Result<()> {
        let r = &self.rates;
        let rates = [
            ("mouth", r.mouth),
            ("happy", r.happy),
            ("speaking_body", r.speaking_body),
            ("speaking_hands", r.speaking_hands),
            ("idle_body", r.idle_body),
            ("fallback_mouth", r.fallback_mouth),
            ("fallback_eyes", r.fallback_eyes),
        ];
        for (name, rate) in rates {
            if !rate.is_finite() || rate < 0.0 {
                return Err(AvatarError::Config(format!(
                    "rate '{name}' must be finite and >= 0, got {rate}"
                )));
            }
        }

        let e = &self.expression;
        if e.mouth_floor < 0.0 || e.mouth_range < 0.0 || e.mouth_floor + e.mouth_range > 1.0 {
            return Err(AvatarError::Config(format!(
                "mouth envelope [{}, {}] must lie within [0, 1]",
                e.mouth_floor,
                e.mouth_floor + e.mouth_range
            )));
        }
        if e.happy_swing < 0.0 || e.happy_base - e.happy_swing < 0.0 || e.happy_base + e.happy_swing > 1.0
        {
            return Err(AvatarError::Config(format!(
                "happy oscillation {} ± {} must lie within [0, 1]",
                e.happy_base, e.happy_swing
            )));
        }
        if !(0.0..=1.0).contains(&e.happy_idle) {
            return Err(AvatarError::Config(format!(
                "happy idle baseline {} must lie within [0, 1]",
                e.happy_idle
            )));
        }
        if !(-1.0..1.0).contains(&e.blink_threshold) {
            return Err(AvatarError::Config(format!(
                "blink threshold {} must lie within [-1, 1)",
                e.blink_threshold
            )));
        }

        if !self.max_frame_delta.is_finite() || self.max_frame_delta <= 0.0 {
            return Err(AvatarError::Config(format!(
                "max_frame_delta must be > 0, got {}",
                self.max_frame_delta
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = Config::from_json_str(r#"{ "pose": { "arm_rest_angle": 1.0 } }"#).unwrap();
        assert_eq!(cfg.pose.arm_rest_angle, 1.0);
        assert!(cfg.pose.correct_rest_pose);
        assert_eq!(cfg.rates.mouth, 8.0);
        assert_eq!(cfg.expression.channels.mouth, "aa");
    }

    #[test]
    fn role_overrides_parse_by_canonical_name() {
        let cfg = Config::from_json_str(
            r#"{ "binding": { "overrides": { "leftHand": "Wrist_L" } } }"#,
        )
        .unwrap();
        assert_eq!(
            cfg.binding.overrides.get(&Role::LeftHand).map(String::as_str),
            Some("Wrist_L")
        );
    }

    #[test]
    fn out_of_range_envelope_is_rejected() {
        let err = Config::from_json_str(
            r#"{ "expression": { "mouth_floor": 0.5, "mouth_range": 0.6 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, AvatarError::Config(_)));
    }

    #[test]
    fn negative_rate_is_rejected() {
        let mut cfg = Config::default();
        cfg.rates.idle_body = -1.0;
        assert!(cfg.validate().is_err());
    }
}
