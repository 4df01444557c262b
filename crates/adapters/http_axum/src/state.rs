//! Shared application state for axum handlers.

use std::sync::Arc;

use scenehub_app::event_bus::InProcessEventBus;
use scenehub_app::ports::{EventPublisher, SceneRepository};
use scenehub_app::services::scene_service::SceneService;

/// Application state shared across all axum handlers.
///
/// `Clone` is implemented manually so that only the `Arc`s are cloned.
pub struct AppState<SR, EP> {
    pub scene_service: Arc<SceneService<SR, EP>>,
    /// Bus the SSE endpoint subscribes to.
    pub event_bus: Arc<InProcessEventBus>,
}

impl<SR, EP> Clone for AppState<SR, EP> {
    fn clone(&self) -> Self {
        Self {
            scene_service: Arc::clone(&self.scene_service),
            event_bus: Arc::clone(&self.event_bus),
        }
    }
}

impl<SR, EP> AppState<SR, EP>
where
    SR: SceneRepository + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    pub fn new(scene_service: SceneService<SR, EP>, event_bus: Arc<InProcessEventBus>) -> Self {
        Self {
            scene_service: Arc::new(scene_service),
            event_bus,
        }
    }
}
