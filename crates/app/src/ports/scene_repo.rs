//! Scene repository port — persistence for scene documents.

use std::future::Future;

use scenehub_domain::error::SceneHubError;
use scenehub_domain::scene::Scene;
use scenehub_domain::time::Timestamp;

/// Filter applied when listing scenes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneQuery {
    /// Case-insensitive substring of the scene name.
    pub search: Option<String>,
    pub enabled: Option<bool>,
}

impl SceneQuery {
    /// Whether a scene passes this filter.
    #[must_use]
    pub fn matches(&self, scene: &Scene) -> bool {
        let search_ok = self.search.as_deref().is_none_or(|needle| {
            scene
                .name
                .to_lowercase()
                .contains(&needle.to_lowercase())
        });
        let enabled_ok = self.enabled.is_none_or(|enabled| scene.enabled == enabled);
        search_ok && enabled_ok
    }
}

/// Repository for persisting and querying [`Scene`]s by selector.
///
/// The engine only ever reads a snapshot through
/// [`get_by_selector`](Self::get_by_selector); it never caches scenes across
/// runs.
pub trait SceneRepository {
    /// Store a new scene.
    fn create(&self, scene: Scene) -> impl Future<Output = Result<Scene, SceneHubError>> + Send;

    /// Get a scene by its selector.
    fn get_by_selector(
        &self,
        selector: &str,
    ) -> impl Future<Output = Result<Option<Scene>, SceneHubError>> + Send;

    /// List scenes matching `query`, ordered by name.
    fn get(
        &self,
        query: SceneQuery,
    ) -> impl Future<Output = Result<Vec<Scene>, SceneHubError>> + Send;

    /// Replace an existing scene document.
    fn update(&self, scene: Scene) -> impl Future<Output = Result<Scene, SceneHubError>> + Send;

    /// Delete a scene by selector.
    fn delete(&self, selector: &str) -> impl Future<Output = Result<(), SceneHubError>> + Send;

    /// Record when a scene was last dispatched.
    fn touch_last_executed(
        &self,
        selector: &str,
        at: Timestamp,
    ) -> impl Future<Output = Result<(), SceneHubError>> + Send;
}

impl<T: SceneRepository + Send + Sync> SceneRepository for std::sync::Arc<T> {
    fn create(&self, scene: Scene) -> impl Future<Output = Result<Scene, SceneHubError>> + Send {
        (**self).create(scene)
    }

    fn get_by_selector(
        &self,
        selector: &str,
    ) -> impl Future<Output = Result<Option<Scene>, SceneHubError>> + Send {
        (**self).get_by_selector(selector)
    }

    fn get(
        &self,
        query: SceneQuery,
    ) -> impl Future<Output = Result<Vec<Scene>, SceneHubError>> + Send {
        (**self).get(query)
    }

    fn update(&self, scene: Scene) -> impl Future<Output = Result<Scene, SceneHubError>> + Send {
        (**self).update(scene)
    }

    fn delete(&self, selector: &str) -> impl Future<Output = Result<(), SceneHubError>> + Send {
        (**self).delete(selector)
    }

    fn touch_last_executed(
        &self,
        selector: &str,
        at: Timestamp,
    ) -> impl Future<Output = Result<(), SceneHubError>> + Send {
        (**self).touch_last_executed(selector, at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(name: &str, enabled: bool) -> Scene {
        Scene::builder()
            .name(name)
            .column(vec![])
            .enabled(enabled)
            .build()
            .unwrap()
    }

    #[test]
    fn should_match_everything_with_empty_query() {
        assert!(SceneQuery::default().matches(&scene("Morning", true)));
        assert!(SceneQuery::default().matches(&scene("Night", false)));
    }

    #[test]
    fn should_match_name_substring_ignoring_case() {
        let query = SceneQuery {
            search: Some("MORN".to_string()),
            enabled: None,
        };
        assert!(query.matches(&scene("Good morning", true)));
        assert!(!query.matches(&scene("Night", true)));
    }

    #[test]
    fn should_filter_on_enabled_flag() {
        let query = SceneQuery {
            search: None,
            enabled: Some(false),
        };
        assert!(query.matches(&scene("Night", false)));
        assert!(!query.matches(&scene("Morning", true)));
    }
}
