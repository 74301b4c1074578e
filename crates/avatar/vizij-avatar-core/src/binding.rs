//! Role map and resolver traits.
//!
//! Roles are resolved once, at bind time, into a fixed table of optional
//! [`JointId`]s. Nothing is looked up by name on the per-frame path, and an
//! unresolved role simply has no slot to write.

use log::{debug, info, warn};

use crate::config::{BindingConfig, ChannelNames, PoseConfig};
use crate::error::AvatarError;
use crate::role::{Role, RoleTable};
use crate::skeleton::{ChannelId, JointId, Skeleton};
use crate::Result;

/// Trait for resolving semantic roles to joints of a loaded skeleton.
/// Adapters with their own naming rules implement this and pass it into
/// [`bind_with`].
pub trait JointResolver {
    fn resolve(&mut self, role: Role) -> Option<JointId>;
}

/// Default resolver: configured override first, then the canonical VRM
/// humanoid name, then the built-in aliases. All comparisons ignore ASCII case.
pub struct NameResolver<'a> {
    skeleton: &'a Skeleton,
    overrides: &'a BindingConfig,
}

impl<'a> NameResolver<'a> {
    pub fn new(skeleton: &'a Skeleton, overrides: &'a BindingConfig) -> Self {
        Self {
            skeleton,
            overrides,
        }
    }
}

impl JointResolver for NameResolver<'_> {
    fn resolve(&mut self, role: Role) -> Option<JointId> {
        if let Some(name) = self.overrides.overrides.get(&role) {
            if let Some(id) = self.skeleton.find_joint(name) {
                return Some(id);
            }
            debug!("binding: override '{name}' for {role} not found, trying defaults");
        }
        std::iter::once(role.canonical_name())
            .chain(role.aliases().iter().copied())
            .find_map(|n| self.skeleton.find_joint(n))
    }
}

/// Immutable role → joint lookup computed at bind time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RoleMap(RoleTable<Option<JointId>>);

impl RoleMap {
    pub fn resolve_with(resolver: &mut impl JointResolver) -> Self {
        RoleMap(RoleTable::from_fn(|role| resolver.resolve(role)))
    }

    #[inline]
    pub fn get(&self, role: Role) -> Option<JointId> {
        *self.0.get(role)
    }

    /// Bound roles and their joints, in role order.
    pub fn bound(&self) -> impl Iterator<Item = (Role, JointId)> + '_ {
        self.0.iter().filter_map(|(r, j)| j.map(|j| (r, j)))
    }

    pub fn missing(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().filter(|(_, j)| j.is_none()).map(|(r, _)| r)
    }

    pub fn bound_count(&self) -> usize {
        self.bound().count()
    }
}

/// Expression channels found for each expression track. Empty means the
/// asset does not provide that expression and writes are skipped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpressionBinding {
    pub mouth: Vec<ChannelId>,
    pub blink: Vec<ChannelId>,
    pub happy: Vec<ChannelId>,
}

impl ExpressionBinding {
    pub fn resolve(skeleton: &Skeleton, names: &ChannelNames) -> Self {
        let find = |name: &str| -> Vec<ChannelId> {
            let ids: Vec<_> = skeleton.find_channels(name).collect();
            if ids.is_empty() {
                warn!(
                    "binding: skeleton '{}' has no expression channel '{name}'",
                    skeleton.name()
                );
            }
            ids
        };
        Self {
            mouth: find(&names.mouth),
            blink: find(&names.blink),
            happy: find(&names.happy),
        }
    }

    pub fn len(&self) -> usize {
        self.mouth.len() + self.blink.len() + self.happy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Result of binding one skeleton.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Binding {
    pub roles: RoleMap,
    pub expressions: ExpressionBinding,
}

/// Bind with the default [`NameResolver`].
pub fn bind(
    skeleton: &mut Skeleton,
    binding: &BindingConfig,
    channels: &ChannelNames,
    pose: &PoseConfig,
) -> Result<Binding> {
    let roles = RoleMap::resolve_with(&mut NameResolver::new(skeleton, binding));
    finish_bind(skeleton, roles, channels, pose)
}

/// Bind with a caller-supplied resolver.
pub fn bind_with(
    skeleton: &mut Skeleton,
    resolver: &mut impl JointResolver,
    channels: &ChannelNames,
    pose: &PoseConfig,
) -> Result<Binding> {
    let roles = RoleMap::resolve_with(resolver);
    finish_bind(skeleton, roles, channels, pose)
}

fn finish_bind(
    skeleton: &mut Skeleton,
    roles: RoleMap,
    channels: &ChannelNames,
    pose: &PoseConfig,
) -> Result<Binding> {
    let expressions = ExpressionBinding::resolve(skeleton, channels);
    if roles.bound_count() == 0 && expressions.is_empty() {
        return Err(AvatarError::Unbindable {
            name: skeleton.name().to_string(),
        });
    }

    for role in roles.missing() {
        debug!("binding: '{}' has no joint for {role}", skeleton.name());
    }

    if pose.correct_rest_pose {
        correct_rest_pose(skeleton, &roles, pose.arm_rest_angle);
    }

    info!(
        "binding: '{}' bound {}/{} roles, {} expression channels",
        skeleton.name(),
        roles.bound_count(),
        Role::COUNT,
        expressions.len()
    );
    Ok(Binding { roles, expressions })
}

/// One-time arms-down correction for rigs imported in a T-pose: upper arms
/// roll to `±arm_rest`, lower arm yaw is zeroed.
pub fn correct_rest_pose(skeleton: &mut Skeleton, roles: &RoleMap, arm_rest: f32) {
    for (role, joint) in roles.bound() {
        let Some(mut rot) = skeleton.rotation(joint) else {
            continue;
        };
        match role {
            Role::LeftUpperArm => rot.z = arm_rest,
            Role::RightUpperArm => rot.z = -arm_rest,
            Role::LeftLowerArm | Role::RightLowerArm => rot.y = 0.0,
            _ => continue,
        }
        skeleton.set_rotation(joint, rot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::skeleton::Euler;

    fn rig(names: &[&str], channels: &[&str]) -> Skeleton {
        let mut s = Skeleton::new("test");
        for n in names {
            s.add_joint(*n, None).unwrap();
        }
        for c in channels {
            s.add_channel(*c);
        }
        s
    }

    fn bind_default(s: &mut Skeleton) -> Result<Binding> {
        let cfg = Config::default();
        bind(s, &cfg.binding, &cfg.expression.channels, &cfg.pose)
    }

    #[test]
    fn missing_roles_do_not_fail_the_bind() {
        let mut s = rig(&["head", "neck", "rightHand"], &["aa"]);
        let b = bind_default(&mut s).unwrap();
        assert!(b.roles.get(Role::Head).is_some());
        assert!(b.roles.get(Role::LeftHand).is_none());
        assert_eq!(b.roles.bound_count(), 3);
        assert_eq!(b.roles.missing().count(), Role::COUNT - 3);
        assert_eq!(b.expressions.mouth.len(), 1);
        assert!(b.expressions.blink.is_empty());
    }

    #[test]
    fn aliases_resolve_when_canonical_names_are_absent() {
        let mut s = rig(&["J_Bip_C_Head", "mixamorig:LeftArm", "Hand.R"], &[]);
        let b = bind_default(&mut s).unwrap();
        assert_eq!(b.roles.get(Role::Head), s.find_joint("J_Bip_C_Head"));
        assert_eq!(b.roles.get(Role::LeftUpperArm), s.find_joint("mixamorig:LeftArm"));
        assert_eq!(b.roles.get(Role::RightHand), s.find_joint("Hand.R"));
    }

    #[test]
    fn overrides_take_precedence() {
        let mut s = rig(&["head", "Kopf"], &[]);
        let mut cfg = Config::default();
        cfg.binding.overrides.insert(Role::Head, "Kopf".to_string());
        let b = bind(&mut s, &cfg.binding, &cfg.expression.channels, &cfg.pose).unwrap();
        assert_eq!(b.roles.get(Role::Head), s.find_joint("Kopf"));
    }

    #[test]
    fn nothing_to_bind_is_unbindable() {
        let mut s = rig(&["hips", "tail"], &["smirk"]);
        let err = bind_default(&mut s).unwrap_err();
        assert!(matches!(err, AvatarError::Unbindable { .. }));
    }

    #[test]
    fn rest_pose_correction_brings_arms_down_once() {
        let mut s = rig(
            &["leftUpperArm", "rightUpperArm", "leftLowerArm", "head"],
            &[],
        );
        let lower = s.find_joint("leftLowerArm").unwrap();
        s.set_rotation(lower, Euler::new(0.1, 0.7, 0.2));
        let b = bind_default(&mut s).unwrap();

        let l = b.roles.get(Role::LeftUpperArm).unwrap();
        let r = b.roles.get(Role::RightUpperArm).unwrap();
        assert_eq!(s.rotation(l).unwrap().z, 1.2);
        assert_eq!(s.rotation(r).unwrap().z, -1.2);
        assert_eq!(s.rotation(lower), Some(Euler::new(0.1, 0.0, 0.2)));
        let head = b.roles.get(Role::Head).unwrap();
        assert_eq!(s.rotation(head), Some(Euler::ZERO));
    }

    #[test]
    fn custom_resolver_is_used() {
        struct OnlyHead(JointId);
        impl JointResolver for OnlyHead {
            fn resolve(&mut self, role: Role) -> Option<JointId> {
                (role == Role::Head).then_some(self.0)
            }
        }
        let mut s = rig(&["skull"], &[]);
        let id = s.find_joint("skull").unwrap();
        let cfg = Config::default();
        let b = bind_with(&mut s, &mut OnlyHead(id), &cfg.expression.channels, &cfg.pose).unwrap();
        assert_eq!(b.roles.bound().collect::<Vec<_>>(), vec![(Role::Head, id)]);
    }
}
