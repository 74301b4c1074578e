//! Vizij Avatar Core (engine-agnostic)
//!
//! Procedural animation for a speaking humanoid avatar. Given a frame delta
//! and a speaking flag, the [`Avatar`] synthesizes joint rotations and
//! expression weights for whatever humanoid skeleton the host managed to
//! load, and falls back to a primitive figure when none is bound.
//!
//! Adapters (Bevy/WASM) own asset loading; they request a model with
//! [`Avatar::set_model`], hand the parsed [`Skeleton`] back with
//! [`Avatar::complete_load`] and apply [`Outputs`] every frame.

pub mod avatar;
pub mod binding;
pub mod config;
pub mod error;
pub mod expression;
pub mod ids;
pub mod inputs;
pub mod outputs;
pub mod pose;
pub mod primitive;
pub mod rig;
pub mod role;
pub mod skeletal;
pub mod skeleton;
pub mod smoothing;
pub mod state;

// Re-exports for consumers (adapters)
pub use avatar::{Avatar, AvatarBody, Body, LoadOutcome};
pub use binding::{bind, bind_with, Binding, ExpressionBinding, JointResolver, NameResolver, RoleMap};
pub use config::Config;
pub use error::AvatarError;
pub use ids::{LoadTicket, LoadTracker};
pub use inputs::AudioEvent;
pub use outputs::{
    AvatarEvent, ExpressionWrite, JointWrite, Outputs, PrimitiveVisual, SkeletalVisual, Visual,
};
pub use pose::target_pose;
pub use primitive::PrimitiveBody;
pub use rig::parse_rig_json;
pub use role::{Role, RoleTable, Side};
pub use skeletal::SkeletalBody;
pub use skeleton::{ChannelId, Euler, JointId, Skeleton};
pub use smoothing::advance;
pub use state::{AnimationState, Regime};

pub type Result<T> = core::result::Result<T, AvatarError>;
