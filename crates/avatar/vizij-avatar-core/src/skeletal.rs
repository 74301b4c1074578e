//! Skeletal avatar: a bound skeleton animated by the pose synthesizer.

use crate::avatar::AvatarBody;
use crate::binding::Binding;
use crate::config::Config;
use crate::outputs::{ExpressionWrite, JointWrite, SkeletalVisual, Visual};
use crate::pose::target_rotation;
use crate::role::{Role, RoleTable};
use crate::skeleton::{ChannelId, Euler, Skeleton};
use crate::smoothing::advance_euler;
use crate::state::{AnimationState, Regime};

/// Owns the loaded skeleton together with its role map. Dropping the body
/// drops both, so no joint index can outlive the asset it points into.
#[derive(Debug)]
pub struct SkeletalBody {
    url: String,
    skeleton: Skeleton,
    binding: Binding,
    current: RoleTable<Euler>,
}

impl SkeletalBody {
    /// Wrap a skeleton that has already been bound (and rest-corrected).
    pub fn new(url: impl Into<String>, skeleton: Skeleton, binding: Binding) -> Self {
        let current = RoleTable::from_fn(|role| {
            binding
                .roles
                .get(role)
                .and_then(|j| skeleton.rotation(j))
                .unwrap_or_default()
        });
        Self {
            url: url.into(),
            skeleton,
            binding,
            current,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    /// Smoothed rotation of a bound role.
    pub fn current(&self, role: Role) -> Option<Euler> {
        self.binding.roles.get(role).map(|_| *self.current.get(role))
    }

    fn rate_for(role: Role, regime: Regime, cfg: &Config) -> f32 {
        match regime {
            Regime::Speaking if role.is_hand() => cfg.rates.speaking_hands,
            Regime::Speaking => cfg.rates.speaking_body,
            Regime::Idle => cfg.rates.idle_body,
        }
    }

    /// Advance every bound role and expression channel by one frame.
    pub fn step(
        &mut self,
        state: &AnimationState,
        cfg: &Config,
        dt: f32,
        out: &mut SkeletalVisual,
    ) {
        let regime = state.regime();
        let arm_rest = cfg.pose.arm_rest_angle;

        out.root_yaw = cfg.pose.root_yaw;
        out.joints.clear();
        out.expressions.clear();

        for (role, joint) in self.binding.roles.bound() {
            let target = target_rotation(role, state.elapsed, regime, arm_rest);
            let rate = Self::rate_for(role, regime, cfg);
            let cur = self.current.get_mut(role);
            *cur = advance_euler(*cur, target, rate, dt);
            let rotation = *cur;

            self.skeleton.set_rotation(joint, rotation);
            if let Some(j) = self.skeleton.joint(joint) {
                out.joints.push(JointWrite {
                    joint,
                    role,
                    name: j.name.clone(),
                    rotation,
                });
            }
        }

        let exprs = &self.binding.expressions;
        let tracks: [(&[ChannelId], f32); 3] = [
            (exprs.mouth.as_slice(), state.mouth_openness),
            (exprs.blink.as_slice(), state.expressions.blink),
            (exprs.happy.as_slice(), state.expressions.happy),
        ];
        for (channels, weight) in tracks {
            for &channel in channels {
                self.skeleton.set_channel_weight(channel, weight);
                if let Some(c) = self.skeleton.channel(channel) {
                    out.expressions.push(ExpressionWrite {
                        channel,
                        name: c.name.clone(),
                        weight,
                    });
                }
            }
        }
    }
}

impl AvatarBody for SkeletalBody {
    fn animate(&mut self, state: &AnimationState, cfg: &Config, dt: f32, out: &mut Visual) {
        if !out.is_skeletal() {
            *out = Visual::Skeletal(SkeletalVisual::default());
        }
        if let Visual::Skeletal(v) = out {
            self.step(state, cfg, dt, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::bind;

    fn body(joints: &[&str], channels: &[&str]) -> SkeletalBody {
        let mut s = Skeleton::new("t");
        for j in joints {
            s.add_joint(*j, None).unwrap();
        }
        for c in channels {
            s.add_channel(*c);
        }
        let cfg = Config::default();
        let b = bind(&mut s, &cfg.binding, &cfg.expression.channels, &cfg.pose).unwrap();
        SkeletalBody::new("t.vrm", s, b)
    }

    #[test]
    fn only_bound_roles_are_written() {
        let mut b = body(&["head", "leftUpperArm"], &["aa"]);
        let cfg = Config::default();
        let mut state = AnimationState::new();
        state.speaking = true;
        state.elapsed = 0.5;
        state.mouth_openness = 0.4;
        let mut out = SkeletalVisual::default();
        b.step(&state, &cfg, 1.0 / 60.0, &mut out);

        let roles: Vec<_> = out.joints.iter().map(|w| w.role).collect();
        assert_eq!(roles, vec![Role::Head, Role::LeftUpperArm]);
        assert_eq!(out.expressions.len(), 1);
        assert_eq!(out.expressions[0].name, "aa");
        assert_eq!(out.expressions[0].weight, 0.4);
        assert_eq!(out.root_yaw, std::f32::consts::PI);
    }

    #[test]
    fn per_frame_change_is_bounded() {
        let mut b = body(&["head", "neck", "leftHand", "rightUpperArm"], &[]);
        let cfg = Config::default();
        let mut state = AnimationState::new();
        let dt = 1.0 / 60.0;
        let mut out = SkeletalVisual::default();
        for frame in 0..600 {
            state.set_speaking(frame >= 120);
            state.advance_clock(dt);
            let before: Vec<_> = Role::ALL.iter().filter_map(|r| b.current(*r)).collect();
            b.step(&state, &cfg, dt, &mut out);
            let after: Vec<_> = Role::ALL.iter().filter_map(|r| b.current(*r)).collect();
            for (a, c) in before.iter().zip(&after) {
                // Fastest rate applies to hands while speaking.
                let max_step = cfg.rates.speaking_hands * dt;
                assert!(a.max_abs_diff(c) <= max_step + 1e-6, "frame {frame}");
            }
        }
    }

    #[test]
    fn writes_land_in_the_skeleton() {
        let mut b = body(&["head"], &["blink"]);
        let cfg = Config::default();
        let mut state = AnimationState::new();
        state.elapsed = 2.0;
        state.expressions.blink = 1.0;
        let mut out = SkeletalVisual::default();
        b.step(&state, &cfg, 1.0 / 60.0, &mut out);

        let head = b.binding().roles.get(Role::Head).unwrap();
        assert_eq!(b.skeleton().rotation(head), b.current(Role::Head));
        assert_eq!(b.skeleton().channels()[0].weight, 1.0);
    }
}
