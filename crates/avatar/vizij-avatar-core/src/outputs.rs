//! Output contracts from the avatar.
//!
//! Every update produces one [`Visual`] describing what the host should draw
//! this frame, plus the semantic events raised since the previous update.
//! Adapters (Bevy/WASM) apply the visual to their scene and transport events.

use serde::{Deserialize, Serialize};

use crate::ids::LoadTicket;
use crate::role::Role;
use crate::skeleton::{ChannelId, Euler, JointId};

/// One joint rotation to apply this frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JointWrite {
    pub joint: JointId,
    pub role: Role,
    pub name: String,
    pub rotation: Euler,
}

/// One expression channel weight to apply this frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExpressionWrite {
    pub channel: ChannelId,
    pub name: String,
    pub weight: f32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SkeletalVisual {
    /// Yaw the host applies to the model root.
    pub root_yaw: f32,
    /// Writes for bound roles only.
    pub joints: Vec<JointWrite>,
    /// Writes for expression channels present on the asset only.
    pub expressions: Vec<ExpressionWrite>,
}

/// Transform state of the fallback figure: two eyes, one mouth.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveVisual {
    pub bob_offset_y: f32,
    pub yaw: f32,
    pub left_eye_scale_y: f32,
    pub right_eye_scale_y: f32,
    pub mouth_scale_y: f32,
}

/// What the host should draw this frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Visual {
    Skeletal(SkeletalVisual),
    Primitive(PrimitiveVisual),
}

impl Default for Visual {
    fn default() -> Self {
        Visual::Primitive(PrimitiveVisual::default())
    }
}

impl Visual {
    pub fn is_skeletal(&self) -> bool {
        matches!(self, Visual::Skeletal(_))
    }

    pub fn as_skeletal(&self) -> Option<&SkeletalVisual> {
        match self {
            Visual::Skeletal(v) => Some(v),
            Visual::Primitive(_) => None,
        }
    }

    pub fn as_primitive(&self) -> Option<&PrimitiveVisual> {
        match self {
            Visual::Primitive(v) => Some(v),
            Visual::Skeletal(_) => None,
        }
    }
}

/// Discrete semantic signals raised by the avatar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum AvatarEvent {
    SpeakingStarted,
    SpeakingStopped,
    LoadStarted {
        url: String,
        ticket: LoadTicket,
    },
    SkeletonBound {
        url: String,
        bound: Vec<Role>,
        missing: Vec<Role>,
        channels: usize,
    },
    LoadFailed {
        url: String,
        reason: String,
    },
    ModelDisposed {
        url: String,
    },
}

/// Outputs returned by `Avatar::update()`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    pub visual: Visual,
    #[serde(default)]
    pub events: Vec<AvatarEvent>,
}

impl Outputs {
    #[inline]
    pub fn push_event(&mut self, event: AvatarEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn clear_events(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visual_serializes_with_kind_tag() {
        let v = Visual::Primitive(PrimitiveVisual {
            mouth_scale_y: 0.3,
            ..Default::default()
        });
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["kind"], "primitive");
        assert!((json["mouth_scale_y"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn roles_in_events_use_canonical_names() {
        let e = AvatarEvent::SkeletonBound {
            url: "a.vrm".into(),
            bound: vec![Role::Head],
            missing: vec![Role::LeftHand],
            channels: 2,
        };
        let json = serde_json::to_string(&e).unwrap();
        assert!(json.contains("\"head\""));
        assert!(json.contains("\"leftHand\""));
    }
}
