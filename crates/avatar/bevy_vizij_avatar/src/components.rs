use bevy::prelude::*;
use vizij_avatar_core::{Avatar, LoadTicket};

/// Host-facing avatar inputs. Spawn this on an entity to mount an avatar;
/// remove it (or despawn the entity) to unmount.
#[derive(Component, Debug, Clone, Default)]
pub struct VizijAvatar {
    /// glTF/VRM asset path. `None` shows the primitive fallback.
    pub model: Option<String>,
    pub speaking: bool,
}

impl VizijAvatar {
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            speaking: false,
        }
    }
}

/// Per-avatar core state plus the entities it writes to. Inserted by the
/// plugin when a [`VizijAvatar`] appears.
#[derive(Component, Debug)]
pub struct AvatarController {
    pub core: Avatar,
    pub(crate) model_entity: Option<Entity>,
    pub(crate) fallback_root: Option<Entity>,
    pub(crate) bound: Option<BoundEntities>,
}

impl AvatarController {
    pub(crate) fn new(core: Avatar) -> Self {
        Self {
            core,
            model_entity: None,
            fallback_root: None,
            bound: None,
        }
    }

    /// Scene entity of the current model request, if any.
    pub fn model_entity(&self) -> Option<Entity> {
        self.model_entity
    }

    pub fn fallback_root(&self) -> Option<Entity> {
        self.fallback_root
    }

    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }
}

/// Entities behind the core skeleton: `joints[i]` backs `JointId(i)`,
/// `channels[i]` is the (morph entity, weight index) behind `ChannelId(i)`.
#[derive(Debug, Clone, Default)]
pub(crate) struct BoundEntities {
    pub joints: Vec<Entity>,
    pub channels: Vec<(Entity, usize)>,
}

/// Child entity holding the scene of one model request.
#[derive(Component, Debug, Clone)]
pub struct AvatarModel {
    pub avatar: Entity,
    pub ticket: LoadTicket,
    pub url: String,
}

/// Marks an [`AvatarModel`] whose scene hierarchy is fully spawned and can
/// be bound. Inserted by the plugin once the scene instance is ready; hosts
/// that build the hierarchy by hand insert it themselves.
#[derive(Component, Debug, Default)]
pub struct ModelReady;

/// Morph target names for a `MorphWeights` entity. Takes precedence over the
/// names stored on the mesh asset.
#[derive(Component, Debug, Clone, Default)]
pub struct MorphTargetNames(pub Vec<String>);

/// Parts of the primitive fallback figure.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPart {
    Body,
    LeftEye,
    RightEye,
    Mouth,
}
