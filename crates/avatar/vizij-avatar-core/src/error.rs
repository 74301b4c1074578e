//! Error types for the avatar core.
//!
//! None of these are raised on the per-frame path. They describe why a model
//! could not be bound, and the avatar answers all of them the same way: it
//! keeps (or falls back to) the primitive avatar.

/// Errors surfaced by rig parsing, binding, configuration and asset loading.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum AvatarError {
    /// The host failed to fetch or decode the model asset.
    #[error("failed to load avatar asset '{url}': {reason}")]
    AssetLoad { url: String, reason: String },

    /// The rig description was not valid JSON or did not match the schema.
    #[error("rig parse error: {0}")]
    RigParse(#[from] serde_json::Error),

    /// Two joints in one rig share a name.
    #[error("duplicate joint name '{0}'")]
    DuplicateJoint(String),

    /// A joint names a parent that is not part of the rig.
    #[error("joint '{joint}' references unknown parent '{parent}'")]
    UnknownParent { joint: String, parent: String },

    /// The rig resolved neither a humanoid role nor an expression channel.
    #[error("skeleton '{name}' exposes no humanoid joints or expression channels")]
    Unbindable { name: String },

    /// A configuration value is out of its documented range.
    #[error("invalid config: {0}")]
    Config(String),
}

impl AvatarError {
    pub fn asset_load(url: impl Into<String>, reason: impl ToString) -> Self {
        AvatarError::AssetLoad {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}
