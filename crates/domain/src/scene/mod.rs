//! Scene — a user-authored automation laid out as a grid of actions.
//!
//! `actions` is a list of [`Column`]s. Each column runs as an independent
//! lane when the scene is started; the actions inside a column run strictly
//! in order. Columns may be empty (a no-op lane) but a scene must have at
//! least one column.

mod action;
mod catalogue;
pub mod params;

pub use action::Action;
pub use catalogue::{ActionCategory, ActionKind, TypedAction};

use serde::{Deserialize, Serialize};

use crate::error::{SceneHubError, ValidationError};
use crate::time::Timestamp;

/// An ordered list of actions executed sequentially by one lane.
pub type Column = Vec<Action>;

/// Dashboard grouping of a scene.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneGroup {
    pub primary: Option<String>,
    pub secondary: Option<String>,
}

/// A scene document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Unique, immutable, URL-safe identifier.
    pub selector: String,
    pub name: String,
    pub icon: String,
    #[serde(default)]
    pub group: SceneGroup,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub actions: Vec<Column>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_executed: Option<Timestamp>,
}

fn default_enabled() -> bool {
    true
}

impl Scene {
    /// Create a builder for constructing a [`Scene`].
    #[must_use]
    pub fn builder() -> SceneBuilder {
        SceneBuilder::default()
    }

    /// Check structural invariants.
    ///
    /// Action parameters are not checked here: that is the action registry's
    /// job, since it owns the catalogue of handlers.
    ///
    /// # Errors
    ///
    /// Returns [`SceneHubError::Validation`] when:
    /// - `name` is empty ([`ValidationError::EmptyName`])
    /// - `selector` is empty ([`ValidationError::EmptySelector`]) or not a
    ///   slug ([`ValidationError::InvalidSelector`])
    /// - `actions` has no column ([`ValidationError::NoColumns`])
    pub fn validate(&self) -> Result<(), SceneHubError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        validate_selector(&self.selector)?;
        if self.actions.is_empty() {
            return Err(ValidationError::NoColumns.into());
        }
        Ok(())
    }

    /// Iterate over every action with its `(column, index)` position.
    pub fn positioned_actions(&self) -> impl Iterator<Item = (usize, usize, &Action)> {
        self.actions.iter().enumerate().flat_map(|(column, actions)| {
            actions
                .iter()
                .enumerate()
                .map(move |(index, action)| (column, index, action))
        })
    }
}

/// Check that a selector is a non-empty slug (`[a-z0-9-]`).
///
/// # Errors
///
/// Returns [`ValidationError::EmptySelector`] or [`ValidationError::InvalidSelector`].
pub fn validate_selector(selector: &str) -> Result<(), ValidationError> {
    if selector.is_empty() {
        return Err(ValidationError::EmptySelector);
    }
    let valid = selector
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !valid {
        return Err(ValidationError::InvalidSelector(selector.to_string()));
    }
    Ok(())
}

/// Derive a selector from a display name: `"Good Morning!"` → `"good-morning"`.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Step-by-step builder for [`Scene`].
#[derive(Debug, Default)]
pub struct SceneBuilder {
    selector: Option<String>,
    name: Option<String>,
    icon: Option<String>,
    group: SceneGroup,
    description: Option<String>,
    actions: Vec<Column>,
    enabled: Option<bool>,
    last_executed: Option<Timestamp>,
}

impl SceneBuilder {
    #[must_use]
    pub fn selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    #[must_use]
    pub fn group(mut self, group: SceneGroup) -> Self {
        self.group = group;
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a column (lane) of actions.
    #[must_use]
    pub fn column(mut self, actions: Column) -> Self {
        self.actions.push(actions);
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn last_executed(mut self, ts: Timestamp) -> Self {
        self.last_executed = Some(ts);
        self
    }

    /// Consume the builder, validate, and return a [`Scene`].
    ///
    /// The selector defaults to the slugified name.
    ///
    /// # Errors
    ///
    /// Returns [`SceneHubError::Validation`] if required fields are missing or invalid.
    pub fn build(self) -> Result<Scene, SceneHubError> {
        let name = self.name.unwrap_or_default();
        let scene = Scene {
            selector: self.selector.unwrap_or_else(|| slugify(&name)),
            name,
            icon: self.icon.unwrap_or_else(|| "play".to_string()),
            group: self.group,
            description: self.description,
            actions: self.actions,
            enabled: self.enabled.unwrap_or(true),
            last_executed: self.last_executed,
        };
        scene.validate()?;
        Ok(scene)
    }
}
