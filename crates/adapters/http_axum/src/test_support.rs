//! In-memory scene repository and state for handler tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::Value;

use scenehub_app::event_bus::InProcessEventBus;
use scenehub_app::ports::{SceneQuery, SceneRepository};
use scenehub_app::services::scene_service::SceneService;
use scenehub_domain::error::{NotFoundError, SceneHubError};
use scenehub_domain::scene::Scene;
use scenehub_domain::time::Timestamp;

use crate::state::AppState;

#[derive(Default)]
pub struct InMemorySceneRepo {
    store: Mutex<HashMap<String, Scene>>,
}

impl SceneRepository for InMemorySceneRepo {
    fn create(&self, scene: Scene) -> impl Future<Output = Result<Scene, SceneHubError>> + Send {
        self.store
            .lock()
            .unwrap()
            .insert(scene.selector.clone(), scene.clone());
        async { Ok(scene) }
    }

    fn get_by_selector(
        &self,
        selector: &str,
    ) -> impl Future<Output = Result<Option<Scene>, SceneHubError>> + Send {
        let result = self.store.lock().unwrap().get(selector).cloned();
        async { Ok(result) }
    }

    fn get(
        &self,
        query: SceneQuery,
    ) -> impl Future<Output = Result<Vec<Scene>, SceneHubError>> + Send {
        let mut result: Vec<Scene> = self
            .store
            .lock()
            .unwrap()
            .values()
            .filter(|s| query.matches(s))
            .cloned()
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        async { Ok(result) }
    }

    fn update(&self, scene: Scene) -> impl Future<Output = Result<Scene, SceneHubError>> + Send {
        let mut store = self.store.lock().unwrap();
        let result = if store.contains_key(&scene.selector) {
            store.insert(scene.selector.clone(), scene.clone());
            Ok(scene)
        } else {
            Err(NotFoundError {
                entity: "Scene",
                id: scene.selector,
            }
            .into())
        };
        async { result }
    }

    fn delete(&self, selector: &str) -> impl Future<Output = Result<(), SceneHubError>> + Send {
        self.store.lock().unwrap().remove(selector);
        async { Ok(()) }
    }

    fn touch_last_executed(
        &self,
        selector: &str,
        at: Timestamp,
    ) -> impl Future<Output = Result<(), SceneHubError>> + Send {
        if let Some(scene) = self.store.lock().unwrap().get_mut(selector) {
            scene.last_executed = Some(at);
        }
        async { Ok(()) }
    }
}

pub type TestState = AppState<InMemorySceneRepo, Arc<InProcessEventBus>>;

pub fn test_state() -> (TestState, Arc<InProcessEventBus>) {
    let bus = Arc::new(InProcessEventBus::new(16));
    let service = SceneService::new(InMemorySceneRepo::default(), Arc::clone(&bus));
    (AppState::new(service, Arc::clone(&bus)), bus)
}

pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
