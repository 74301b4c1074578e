use serde::Deserialize;

use crate::error::AvatarError;
use crate::skeleton::{Euler, JointId, Skeleton};
use crate::Result;

/// Public API: parse a rig description (JSON) into a [`Skeleton`].
///
/// ```json
/// {
///   "name": "nicky",
///   "joints": [
///     { "name": "hips" },
///     { "name": "spine", "parent": "hips" },
///     { "name": "leftUpperArm", "parent": "spine", "rotation": { "z": 0.0 } }
///   ],
///   "expressions": ["aa", "blink", "happy"]
/// }
/// ```
///
/// Notes:
/// - Parents are referenced by name and may be declared after their children.
/// - Joint names must be unique; expression names may repeat.
pub fn parse_rig_json(s: &str) -> Result<Skeleton> {
    let desc: RigDesc = serde_json::from_str(s)?;
    Skeleton::from_rig(desc)
}

#[derive(Debug, Clone, Deserialize)]
pub struct RigDesc {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub joints: Vec<JointDesc>,
    #[serde(default)]
    pub expressions: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JointDesc {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub rotation: Option<Euler>,
}

impl Skeleton {
    pub fn from_rig(desc: RigDesc) -> Result<Skeleton> {
        let mut skeleton = Skeleton::new(desc.name);

        // First pass: allocate every joint so parents can be declared in any order.
        for jd in &desc.joints {
            let id = skeleton.add_joint(jd.name.clone(), None)?;
            if let Some(rot) = jd.rotation {
                skeleton.set_rotation(id, rot);
            }
        }

        // Second pass: link parents by exact name.
        for (i, jd) in desc.joints.iter().enumerate() {
            let Some(parent_name) = jd.parent.as_deref() else {
                continue;
            };
            let parent = skeleton
                .joints()
                .iter()
                .position(|j| j.name == parent_name)
                .map(|p| JointId(p as u32))
                .ok_or_else(|| AvatarError::UnknownParent {
                    joint: jd.name.clone(),
                    parent: parent_name.to_string(),
                })?;
            if let Some(j) = skeleton.joint_mut(JointId(i as u32)) {
                j.parent = Some(parent);
            }
        }

        for name in desc.expressions {
            skeleton.add_channel(name);
        }

        Ok(skeleton)
    }
}
