use bevy::prelude::*;
use vizij_avatar_core::Config;

/// Tuning shared by every avatar mounted after it is set.
#[derive(Resource, Debug, Clone, Default)]
pub struct AvatarSettings(pub Config);

/// Frame delta source for the avatar update.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub enum AvatarTimestep {
    /// Use `Time::delta_seconds()`.
    #[default]
    Variable,
    /// Advance by a fixed number of seconds per update (tests, capture).
    Fixed(f32),
}

impl AvatarTimestep {
    pub fn delta(&self, time: &Time) -> f32 {
        match *self {
            AvatarTimestep::Variable => time.delta_seconds(),
            AvatarTimestep::Fixed(dt) => dt,
        }
    }
}
