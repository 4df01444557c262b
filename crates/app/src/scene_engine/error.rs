//! Engine errors.
//!
//! [`DispatchError`] is the only error the dispatcher returns: it happens
//! before any lane is spawned. [`LaneError`] never leaves a lane; it becomes
//! the lane's `Faulted` terminal state.

use scenehub_domain::error::{DeviceError, SceneHubError, ValidationError};
use scenehub_domain::scene::ActionKind;

use super::context::CallStack;

/// A scene could not be dispatched; no lane was started.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("scene {selector} not found")]
    SceneNotFound { selector: String },

    #[error("scene {selector} is already running in {stack}")]
    CyclicScene { selector: String, stack: CallStack },

    #[error("scene {selector} is disabled")]
    SceneDisabled { selector: String },

    #[error("unable to load scene {selector}")]
    Storage {
        selector: String,
        #[source]
        source: SceneHubError,
    },
}

/// Why a lane faulted.
#[derive(Debug, thiserror::Error)]
pub enum LaneError {
    #[error("unknown action type {0:?}")]
    UnknownActionType(String),

    #[error("invalid parameters for {action_type}: {reason}")]
    InvalidParams { action_type: String, reason: String },

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error("cannot evaluate {condition}: {reason}")]
    ConditionEvaluation {
        condition: ActionKind,
        reason: String,
    },

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("failed to publish event: {0}")]
    Publish(#[source] SceneHubError),
}

impl From<ValidationError> for LaneError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::UnknownActionType { action_type } => {
                Self::UnknownActionType(action_type)
            }
            ValidationError::InvalidActionParams {
                action_type,
                reason,
            } => Self::InvalidParams {
                action_type,
                reason,
            },
            other => Self::InvalidParams {
                action_type: String::new(),
                reason: other.to_string(),
            },
        }
    }
}

/// Render an error with its whole `source()` chain: `outer: inner: root`.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = inner.source();
    }
    message
}
