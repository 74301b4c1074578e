//! Closed-form pose synthesis.
//!
//! `target_pose(time, regime, arm_rest)` is a pure function: each role's
//! target is its rest rotation plus a sum of sine terms per axis. The two
//! regimes differ only in which wave table they read.
//!
//! Amplitude caps (sum of |amplitude| per axis, so no time can exceed them):
//! - speaking: head/neck/torso ≤ 0.15 rad, shoulders/arms/hands ≤ 0.1 rad
//! - idle: ≤ 0.05 rad at ≤ 0.5 rad/s

use crate::role::{Role, RoleTable};
use crate::skeleton::{Axis, Euler};
use crate::state::Regime;

pub const SPEAKING_CAP_CORE: f32 = 0.15;
pub const SPEAKING_CAP_LIMBS: f32 = 0.10;
pub const IDLE_CAP: f32 = 0.05;
pub const IDLE_MAX_FREQUENCY: f32 = 0.5;

/// `amp * sin(freq * t + phase)`
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Wave {
    pub amp: f32,
    pub freq: f32,
    pub phase: f32,
}

const fn w(amp: f32, freq: f32, phase: f32) -> Wave {
    Wave { amp, freq, phase }
}

const COS: f32 = std::f32::consts::FRAC_PI_2;

impl Wave {
    #[inline]
    pub fn eval(&self, t: f64) -> f32 {
        self.amp * (t * self.freq as f64 + self.phase as f64).sin() as f32
    }
}

/// Wave terms for the three axes of one joint.
#[derive(Copy, Clone, Debug)]
pub struct JointMotion {
    pub x: &'static [Wave],
    pub y: &'static [Wave],
    pub z: &'static [Wave],
}

impl JointMotion {
    const STILL: JointMotion = JointMotion {
        x: &[],
        y: &[],
        z: &[],
    };

    pub fn axis(&self, axis: Axis) -> &'static [Wave] {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    fn eval(&self, t: f64) -> Euler {
        let sum = |ws: &[Wave]| ws.iter().map(|w| w.eval(t)).sum::<f32>();
        Euler::new(sum(self.x), sum(self.y), sum(self.z))
    }

    /// Largest excursion from rest on each axis.
    pub fn bound(&self) -> Euler {
        let sum = |ws: &[Wave]| ws.iter().map(|w| w.amp.abs()).sum::<f32>();
        Euler::new(sum(self.x), sum(self.y), sum(self.z))
    }
}

const fn jm(x: &'static [Wave], y: &'static [Wave], z: &'static [Wave]) -> JointMotion {
    JointMotion { x, y, z }
}

// Indexed by `Role::index()`. Right-side joints are sign-flipped and
// phase-shifted against the left so the arms gesture independently
// instead of mirroring.
static SPEAKING: [JointMotion; Role::COUNT] = [
    // head
    jm(
        &[w(0.08, 1.8, 0.0), w(0.05, 0.9, COS)],
        &[w(0.10, 2.5, 0.0), w(0.05, 1.2, 0.0)],
        &[w(0.05, 1.5, 0.0)],
    ),
    // neck
    jm(
        &[w(0.04, 1.5, 0.0), w(0.02, 2.7, 0.4)],
        &[w(0.06, 2.2, 0.0)],
        &[w(0.02, 1.1, 0.0)],
    ),
    // spine
    jm(&[w(0.01, 0.9, 0.2)], &[w(0.03, 1.2, 0.0)], &[w(0.02, 0.8, 0.0)]),
    // chest
    jm(
        &[w(0.02, 1.0, 0.0)],
        &[w(0.04, 1.5, 0.0), w(0.015, 2.6, 0.7)],
        &[w(0.01, 1.3, 0.0)],
    ),
    // leftShoulder
    jm(&[], &[w(0.02, 1.4, 0.0)], &[w(0.03, 2.0, 0.0), w(0.015, 3.1, 0.0)]),
    // rightShoulder
    jm(&[], &[w(-0.02, 1.6, 0.2)], &[w(-0.03, 2.0, 0.5), w(-0.015, 2.9, 0.4)]),
    // leftUpperArm
    jm(&[w(0.05, 1.2, 0.0)], &[], &[w(0.10, 1.5, 0.0)]),
    // rightUpperArm
    jm(&[w(0.05, 1.2, 0.5)], &[], &[w(-0.10, 1.8, 0.0)]),
    // leftLowerArm
    jm(&[], &[w(0.10, 2.5, 0.0)], &[w(0.05, 2.0, 0.0)]),
    // rightLowerArm
    jm(&[], &[w(-0.10, 2.5, 0.5)], &[w(-0.05, 2.0, 0.3)]),
    // leftHand
    jm(&[w(0.08, 2.5, 0.0)], &[], &[w(0.10, 3.0, 0.0)]),
    // rightHand
    jm(&[w(0.08, 2.5, 0.3)], &[], &[w(-0.10, 3.0, 0.3)]),
];

static IDLE: [JointMotion; Role::COUNT] = [
    // head
    jm(&[w(0.02, 0.3, 0.0)], &[w(0.05, 0.5, 0.0)], &[]),
    // neck
    jm(&[], &[w(0.02, 0.4, 0.0)], &[]),
    // spine
    jm(&[], &[w(0.01, 0.3, 0.0)], &[]),
    // chest
    jm(&[w(0.01, 0.5, 0.0)], &[], &[]),
    JointMotion::STILL,
    JointMotion::STILL,
    JointMotion::STILL,
    JointMotion::STILL,
    JointMotion::STILL,
    JointMotion::STILL,
    JointMotion::STILL,
    JointMotion::STILL,
];

pub fn motion(role: Role, regime: Regime) -> JointMotion {
    match regime {
        Regime::Speaking => SPEAKING[role.index()],
        Regime::Idle => IDLE[role.index()],
    }
}

/// Neutral rotation for a role: arms hang at `arm_rest` roll, all else zero.
pub fn rest_rotation(role: Role, arm_rest: f32) -> Euler {
    match role {
        Role::LeftUpperArm => Euler::new(0.0, 0.0, arm_rest),
        Role::RightUpperArm => Euler::new(0.0, 0.0, -arm_rest),
        _ => Euler::ZERO,
    }
}

/// Documented per-axis excursion cap for a role in a regime.
pub fn amplitude_cap(role: Role, regime: Regime) -> f32 {
    match regime {
        Regime::Idle => IDLE_CAP,
        Regime::Speaking => match role {
            Role::Head | Role::Neck | Role::Spine | Role::Chest => SPEAKING_CAP_CORE,
            _ => SPEAKING_CAP_LIMBS,
        },
    }
}

/// Target rotation of a single role.
#[inline]
pub fn target_rotation(role: Role, time: f64, regime: Regime, arm_rest: f32) -> Euler {
    let rest = rest_rotation(role, arm_rest);
    let m = motion(role, regime).eval(time);
    Euler::new(rest.x + m.x, rest.y + m.y, rest.z + m.z)
}

/// Target rotation for every role at `time`.
pub fn target_pose(time: f64, regime: Regime, arm_rest: f32) -> RoleTable<Euler> {
    RoleTable::from_fn(|role| target_rotation(role, time, regime, arm_rest))
}
