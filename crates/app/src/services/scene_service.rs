//! Scene service — use-cases for managing and starting scenes.

use scenehub_domain::error::{ConflictError, NotFoundError, SceneHubError};
use scenehub_domain::event::{Event, StartAck};
use scenehub_domain::id::RunId;
use scenehub_domain::scene::Scene;

use crate::ports::{EventPublisher, SceneQuery, SceneRepository};
use crate::scene_engine::registry;

fn not_found(selector: &str) -> SceneHubError {
    NotFoundError {
        entity: "Scene",
        id: selector.to_string(),
    }
    .into()
}

/// Application service for scene CRUD and start requests.
pub struct SceneService<R, P> {
    repo: R,
    publisher: P,
}

impl<R, P> SceneService<R, P>
where
    R: SceneRepository + Sync,
    P: EventPublisher + Sync,
{
    /// Create a new service backed by the given repository and event bus.
    pub fn new(repo: R, publisher: P) -> Self {
        Self { repo, publisher }
    }

    /// Store a new scene after checking its structure and every action.
    ///
    /// # Errors
    ///
    /// Returns [`SceneHubError::Validation`] if the scene or one of its
    /// actions is invalid, [`SceneHubError::Conflict`] if the selector is
    /// taken, or a storage error from the repository.
    #[tracing::instrument(skip(self, scene), fields(scene = %scene.selector))]
    pub async fn create_scene(&self, scene: Scene) -> Result<Scene, SceneHubError> {
        scene.validate()?;
        registry::validate_scene(&scene)?;
        if self.repo.get_by_selector(&scene.selector).await?.is_some() {
            return Err(ConflictError {
                entity: "Scene",
                id: scene.selector,
            }
            .into());
        }
        self.repo.create(scene).await
    }

    /// # Errors
    ///
    /// Returns [`SceneHubError::NotFound`] when no scene has this selector,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_scene(&self, selector: &str) -> Result<Scene, SceneHubError> {
        self.repo
            .get_by_selector(selector)
            .await?
            .ok_or_else(|| not_found(selector))
    }

    /// List scenes matching `query`, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_scenes(&self, query: SceneQuery) -> Result<Vec<Scene>, SceneHubError> {
        self.repo.get(query).await
    }

    /// Replace the scene stored under `selector`.
    ///
    /// The selector is immutable: whatever the document says, it is stored
    /// under `selector`. `last_executed` is owned by the engine and carried
    /// over from the stored scene unless the document sets it.
    ///
    /// # Errors
    ///
    /// Returns [`SceneHubError::NotFound`] if the scene does not exist,
    /// [`SceneHubError::Validation`] if the new document is invalid, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self, scene))]
    pub async fn update_scene(
        &self,
        selector: &str,
        mut scene: Scene,
    ) -> Result<Scene, SceneHubError> {
        let existing = self.get_scene(selector).await?;
        scene.selector = existing.selector;
        if scene.last_executed.is_none() {
            scene.last_executed = existing.last_executed;
        }
        scene.validate()?;
        registry::validate_scene(&scene)?;
        self.repo.update(scene).await
    }

    /// # Errors
    ///
    /// Returns [`SceneHubError::NotFound`] if the scene does not exist, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_scene(&self, selector: &str) -> Result<(), SceneHubError> {
        self.get_scene(selector).await?;
        self.repo.delete(selector).await
    }

    /// Request a scene start.
    ///
    /// Publishes a scene-start request on the bus and returns right away:
    /// the run happens in the background and is followed through its status
    /// events, correlated by the returned run id.
    ///
    /// # Errors
    ///
    /// Returns [`SceneHubError::NotFound`] if the scene does not exist, or an
    /// error from the event bus.
    #[tracing::instrument(skip(self))]
    pub async fn start(&self, selector: &str) -> Result<StartAck, SceneHubError> {
        let scene = self.get_scene(selector).await?;
        let run_id = RunId::new();
        self.publisher
            .publish(Event::scene_start(scene.selector.as_str(), run_id))
            .await?;
        tracing::info!(scene = %scene.selector, %run_id, "scene start requested");
        Ok(StartAck::pending(scene.selector, run_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene_engine::fakes::{InMemorySceneRepo, SpyPublisher};
    use scenehub_domain::error::ValidationError;
    use scenehub_domain::event::{EventType, StartStatus};
    use scenehub_domain::scene::Action;
    use serde_json::json;
    use std::sync::Arc;

    type Service = SceneService<Arc<InMemorySceneRepo>, Arc<SpyPublisher>>;

    fn service() -> (Service, Arc<InMemorySceneRepo>, Arc<SpyPublisher>) {
        let repo = Arc::new(InMemorySceneRepo::default());
        let publisher = Arc::new(SpyPublisher::default());
        let service = SceneService::new(Arc::clone(&repo), Arc::clone(&publisher));
        (service, repo, publisher)
    }

    fn scene(name: &str) -> Scene {
        Scene::builder()
            .name(name)
            .column(vec![Action::new("light.turn-on", json!({"devices": ["lamp"]}))])
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_create_and_get_scene() {
        let (service, _, _) = service();

        service.create_scene(scene("Wake up")).await.unwrap();

        let found = service.get_scene("wake-up").await.unwrap();
        assert_eq!(found.name, "Wake up");
    }

    #[tokio::test]
    async fn should_reject_duplicate_selector() {
        let (service, _, _) = service();
        service.create_scene(scene("Wake up")).await.unwrap();

        let result = service.create_scene(scene("Wake up")).await;

        assert!(matches!(result, Err(SceneHubError::Conflict(_))));
    }

    #[tokio::test]
    async fn should_reject_scene_with_unknown_action() {
        let (service, repo, _) = service();
        let mut bad = scene("Bad");
        bad.actions[0].push(Action::new("teleport", json!({})));

        let result = service.create_scene(bad).await;

        assert!(matches!(
            result,
            Err(SceneHubError::Validation(ValidationError::UnknownActionType { .. }))
        ));
        assert!(repo.get_by_selector("bad").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_reject_action_missing_required_parameter() {
        let (service, _, _) = service();
        let mut bad = scene("Bad");
        bad.actions.push(vec![Action::new("scene.start", json!({}))]);

        let result = service.create_scene(bad).await;

        assert!(matches!(
            result,
            Err(SceneHubError::Validation(ValidationError::InvalidActionParams { .. }))
        ));
    }

    #[tokio::test]
    async fn should_return_not_found_for_missing_scene() {
        let (service, _, _) = service();

        let result = service.get_scene("nope").await;

        assert!(matches!(result, Err(SceneHubError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_list_scenes_matching_query() {
        let (service, _, _) = service();
        service.create_scene(scene("Morning lights")).await.unwrap();
        service.create_scene(scene("Evening lights")).await.unwrap();
        let mut off = scene("Morning coffee");
        off.enabled = false;
        service.create_scene(off).await.unwrap();

        let found = service
            .list_scenes(SceneQuery {
                search: Some("MORNING".to_string()),
                enabled: Some(true),
            })
            .await
            .unwrap();

        let names: Vec<_> = found.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Morning lights"]);
    }

    #[tokio::test]
    async fn should_keep_selector_and_last_executed_on_update() {
        let (service, repo, _) = service();
        service.create_scene(scene("Wake up")).await.unwrap();
        let ran_at = scenehub_domain::time::now();
        repo.touch_last_executed("wake-up", ran_at).await.unwrap();
        let mut changed = scene("Wake up gently");
        changed.icon = "sun".to_string();

        let updated = service.update_scene("wake-up", changed).await.unwrap();

        assert_eq!(updated.selector, "wake-up");
        assert_eq!(updated.name, "Wake up gently");
        assert_eq!(updated.last_executed, Some(ran_at));
        assert_eq!(service.get_scene("wake-up").await.unwrap().icon, "sun");
    }

    #[tokio::test]
    async fn should_return_not_found_when_updating_missing_scene() {
        let (service, _, _) = service();

        let result = service.update_scene("nope", scene("Nope")).await;

        assert!(matches!(result, Err(SceneHubError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_delete_scene() {
        let (service, _, _) = service();
        service.create_scene(scene("Wake up")).await.unwrap();

        service.delete_scene("wake-up").await.unwrap();

        assert!(matches!(
            service.delete_scene("wake-up").await,
            Err(SceneHubError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn should_publish_start_request_and_acknowledge_pending() {
        let (service, _, publisher) = service();
        service.create_scene(scene("Wake up")).await.unwrap();

        let ack = service.start("wake-up").await.unwrap();

        assert_eq!(ack.status, StartStatus::Pending);
        assert_eq!(ack.scene, "wake-up");
        let requests = publisher.of_type(EventType::ActionTriggered);
        assert_eq!(requests.len(), 1);
        let request = requests[0].as_scene_start().unwrap();
        assert_eq!(request.scene, "wake-up");
        assert_eq!(request.run_id, Some(ack.run_id));
    }

    #[tokio::test]
    async fn should_not_publish_start_for_missing_scene() {
        let (service, _, publisher) = service();

        let result = service.start("ghost").await;

        assert!(matches!(result, Err(SceneHubError::NotFound(_))));
        assert!(publisher.events().is_empty());
    }
}
