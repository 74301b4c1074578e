//! Bevy adapter for the Vizij avatar core.
//!
//! Spawn a [`VizijAvatar`] on an entity and the plugin takes care of the
//! rest: it shows the primitive fallback figure, loads the requested glTF/VRM
//! scene, binds its humanoid joints and morph targets, and animates whichever
//! body is active every `Update`.

use bevy::prelude::*;

mod components;
mod resources;
mod systems;

pub use components::{
    AvatarController, AvatarModel, FallbackPart, ModelReady, MorphTargetNames, VizijAvatar,
};
pub use resources::{AvatarSettings, AvatarTimestep};
pub use vizij_avatar_core::{AudioEvent, AvatarEvent, Config, Role, Visual};

/// Audio lifecycle notification for one avatar.
#[derive(Event, Debug, Clone)]
pub struct AvatarAudioEvent {
    pub avatar: Entity,
    pub event: AudioEvent,
}

/// Lifecycle event raised by one avatar's core.
#[derive(Event, Debug, Clone)]
pub struct AvatarOutputEvent {
    pub avatar: Entity,
    pub event: AvatarEvent,
}

pub struct VizijAvatarPlugin;

impl Plugin for VizijAvatarPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AvatarSettings>()
            .init_resource::<AvatarTimestep>()
            .add_event::<AvatarAudioEvent>()
            .add_event::<AvatarOutputEvent>()
            .add_systems(
                Update,
                (
                    systems::attach_avatar_system,
                    systems::audio_event_system,
                    systems::request_model_system,
                    systems::sync_speaking_system,
                    systems::poll_model_load_system,
                    systems::mark_model_ready_system,
                    systems::bind_model_system,
                    systems::animate_avatar_system,
                    systems::unmount_avatar_system,
                    systems::log_avatar_events_system,
                )
                    .chain(),
            );
    }
}
