//! Skeleton arena: joints and expression channels owned by a loaded asset.
//!
//! Joints live in a dense `Vec` and are addressed by [`JointId`] indices, so
//! the role map never holds references into the skeleton. Dropping the
//! skeleton drops everything that could point at it.

use serde::{Deserialize, Serialize};

use crate::error::AvatarError;
use crate::Result;

/// Three independent rotation angles in radians, applied in XYZ order.
/// `x` is pitch, `y` is yaw and `z` is roll.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Euler {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];
}

impl Euler {
    pub const ZERO: Euler = Euler {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn axis(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    #[inline]
    pub fn set_axis(&mut self, axis: Axis, v: f32) {
        match axis {
            Axis::X => self.x = v,
            Axis::Y => self.y = v,
            Axis::Z => self.z = v,
        }
    }

    /// Largest per-axis absolute difference.
    pub fn max_abs_diff(&self, other: &Euler) -> f32 {
        (self.x - other.x)
            .abs()
            .max((self.y - other.y).abs())
            .max((self.z - other.z).abs())
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct JointId(pub u32);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub u32);

impl JointId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl ChannelId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Joint {
    pub name: String,
    pub parent: Option<JointId>,
    pub rotation: Euler,
}

/// Named scalar blend-shape control, weight in [0, 1].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExpressionChannel {
    pub name: String,
    pub weight: f32,
}

#[derive(Clone, Debug, Default)]
pub struct Skeleton {
    name: String,
    joints: Vec<Joint>,
    channels: Vec<ExpressionChannel>,
}

impl Skeleton {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            joints: Vec::new(),
            channels: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a joint. Names must be unique within the skeleton and `parent`
    /// must already exist.
    pub fn add_joint(&mut self, name: impl Into<String>, parent: Option<JointId>) -> Result<JointId> {
        let name = name.into();
        if self.joints.iter().any(|j| j.name == name) {
            return Err(AvatarError::DuplicateJoint(name));
        }
        if let Some(p) = parent {
            if p.index() >= self.joints.len() {
                return Err(AvatarError::UnknownParent {
                    joint: name,
                    parent: format!("#{}", p.0),
                });
            }
        }
        let id = JointId(self.joints.len() as u32);
        self.joints.push(Joint {
            name,
            parent,
            rotation: Euler::ZERO,
        });
        Ok(id)
    }

    pub fn add_channel(&mut self, name: impl Into<String>) -> ChannelId {
        let id = ChannelId(self.channels.len() as u32);
        self.channels.push(ExpressionChannel {
            name: name.into(),
            weight: 0.0,
        });
        id
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn joint(&self, id: JointId) -> Option<&Joint> {
        self.joints.get(id.index())
    }

    pub fn joint_mut(&mut self, id: JointId) -> Option<&mut Joint> {
        self.joints.get_mut(id.index())
    }

    /// First joint whose name matches, ignoring ASCII case.
    pub fn find_joint(&self, name: &str) -> Option<JointId> {
        self.joints
            .iter()
            .position(|j| j.name.eq_ignore_ascii_case(name))
            .map(|i| JointId(i as u32))
    }

    pub fn rotation(&self, id: JointId) -> Option<Euler> {
        self.joint(id).map(|j| j.rotation)
    }

    pub fn set_rotation(&mut self, id: JointId, rotation: Euler) {
        if let Some(j) = self.joint_mut(id) {
            j.rotation = rotation;
        }
    }

    pub fn channels(&self) -> &[ExpressionChannel] {
        &self.channels
    }

    pub fn channel(&self, id: ChannelId) -> Option<&ExpressionChannel> {
        self.channels.get(id.index())
    }

    /// All channels carrying `name`. Meshes split into several primitives
    /// commonly repeat the same morph target name.
    pub fn find_channels<'a>(&'a self, name: &'a str) -> impl Iterator<Item = ChannelId> + 'a {
        self.channels
            .iter()
            .enumerate()
            .filter(move |(_, c)| c.name.eq_ignore_ascii_case(name))
            .map(|(i, _)| ChannelId(i as u32))
    }

    pub fn set_channel_weight(&mut self, id: ChannelId, weight: f32) {
        if let Some(c) = self.channels.get_mut(id.index()) {
            c.weight = weight;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty() && self.channels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_joint_rejects_duplicates_and_dangling_parents() {
        let mut s = Skeleton::new("t");
        let hips = s.add_joint("hips", None).unwrap();
        s.add_joint("spine", Some(hips)).unwrap();
        assert!(matches!(
            s.add_joint("spine", Some(hips)),
            Err(AvatarError::DuplicateJoint(_))
        ));
        assert!(matches!(
            s.add_joint("neck", Some(JointId(42))),
            Err(AvatarError::UnknownParent { .. })
        ));
    }

    #[test]
    fn find_joint_is_case_insensitive() {
        let mut s = Skeleton::new("t");
        let id = s.add_joint("Head", None).unwrap();
        assert_eq!(s.find_joint("head"), Some(id));
        assert_eq!(s.find_joint("neck"), None);
    }

    #[test]
    fn repeated_channel_names_are_all_found() {
        let mut s = Skeleton::new("t");
        s.add_channel("blink");
        s.add_channel("aa");
        s.add_channel("Blink");
        let ids: Vec<_> = s.find_channels("blink").collect();
        assert_eq!(ids, vec![ChannelId(0), ChannelId(2)]);
    }

    #[test]
    fn euler_axis_accessors() {
        let mut e = Euler::new(0.1, 0.2, 0.3);
        e.set_axis(Axis::Y, -1.0);
        assert_eq!(e.axis(Axis::Y), -1.0);
        assert!((e.max_abs_diff(&Euler::ZERO) - 1.0).abs() < 1e-6);
    }
}
