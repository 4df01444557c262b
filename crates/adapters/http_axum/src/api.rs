//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod scenes;
pub mod sse;

use axum::Router;
use axum::routing::{get, post};

use scenehub_app::ports::{EventPublisher, SceneRepository};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<SR, EP>() -> Router<AppState<SR, EP>>
where
    SR: SceneRepository + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/scenes",
            get(scenes::list::<SR, EP>).post(scenes::create::<SR, EP>),
        )
        .route(
            "/scenes/{selector}",
            get(scenes::get::<SR, EP>)
                .put(scenes::update::<SR, EP>)
                .delete(scenes::delete::<SR, EP>),
        )
        .route("/scenes/{selector}/start", post(scenes::start::<SR, EP>))
        .route("/events/stream", get(sse::stream::<SR, EP>))
}
