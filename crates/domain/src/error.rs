//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`SceneHubError`] via `#[from]`. There are no catch-all `String` variants
//! at the top level.

/// Top-level error shared by ports and use-cases.
#[derive(Debug, thiserror::Error)]
pub enum SceneHubError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("conflict")]
    Conflict(#[from] ConflictError),

    #[error("device error")]
    Device(#[from] DeviceError),

    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A domain invariant was violated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("selector must not be empty")]
    EmptySelector,

    #[error("selector {0:?} must only contain lowercase letters, digits and dashes")]
    InvalidSelector(String),

    #[error("a scene needs at least one column")]
    NoColumns,

    #[error("unknown action type {action_type:?}")]
    UnknownActionType { action_type: String },

    #[error("invalid parameters for {action_type:?}: {reason}")]
    InvalidActionParams { action_type: String, reason: String },

    #[error("invalid time {0:?}, expected HH:MM")]
    InvalidTime(String),
}

/// A requested record does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A record with the same identity already exists.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} already exists")]
pub struct ConflictError {
    pub entity: &'static str,
    pub id: String,
}

/// Failure reported while reading from or commanding a device.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("device {selector} not found")]
    NotFound { selector: String },

    #[error("device {device} has no {category} feature")]
    FeatureNotFound { device: String, category: String },

    #[error("command on feature {feature} failed: {reason}")]
    Command { feature: String, reason: String },
}

impl DeviceError {
    /// Whether the failure is about a missing device or feature (as opposed
    /// to a command that was attempted and failed).
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::FeatureNotFound { .. })
    }
}
