//! JSON REST handlers for scenes.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use scenehub_app::ports::{EventPublisher, SceneQuery, SceneRepository};
use scenehub_domain::error::SceneHubError;
use scenehub_domain::event::StartAck;
use scenehub_domain::scene::{Column, Scene, SceneGroup};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating or replacing a scene.
///
/// On create, `selector` defaults to the slugified name. On update it is
/// ignored: the path decides.
#[derive(Debug, Deserialize)]
pub struct SceneRequest {
    pub selector: Option<String>,
    pub name: String,
    pub icon: Option<String>,
    #[serde(default)]
    pub group: SceneGroup,
    pub description: Option<String>,
    pub actions: Vec<Column>,
    pub enabled: Option<bool>,
}

impl SceneRequest {
    fn into_scene(self, selector: Option<String>) -> Result<Scene, SceneHubError> {
        let mut builder = Scene::builder().name(self.name).group(self.group);
        if let Some(selector) = selector.or(self.selector) {
            builder = builder.selector(selector);
        }
        if let Some(icon) = self.icon {
            builder = builder.icon(icon);
        }
        if let Some(description) = self.description {
            builder = builder.description(description);
        }
        if let Some(enabled) = self.enabled {
            builder = builder.enabled(enabled);
        }
        self.actions
            .into_iter()
            .fold(builder, |builder, column| builder.column(column))
            .build()
    }
}

/// Query string of the list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub search: Option<String>,
    pub enabled: Option<bool>,
}

pub enum CreateResponse {
    Created(Json<Scene>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `GET /api/scenes?search=&enabled=`
pub async fn list<SR, EP>(
    State(state): State<AppState<SR, EP>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Scene>>, ApiError>
where
    SR: SceneRepository + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    let query = SceneQuery {
        search: params.search.filter(|s| !s.is_empty()),
        enabled: params.enabled,
    };
    Ok(Json(state.scene_service.list_scenes(query).await?))
}

/// `GET /api/scenes/{selector}`
pub async fn get<SR, EP>(
    State(state): State<AppState<SR, EP>>,
    Path(selector): Path<String>,
) -> Result<Json<Scene>, ApiError>
where
    SR: SceneRepository + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    Ok(Json(state.scene_service.get_scene(&selector).await?))
}

/// `POST /api/scenes`
pub async fn create<SR, EP>(
    State(state): State<AppState<SR, EP>>,
    Json(req): Json<SceneRequest>,
) -> Result<CreateResponse, ApiError>
where
    SR: SceneRepository + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    let scene = req.into_scene(None)?;
    let created = state.scene_service.create_scene(scene).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PUT /api/scenes/{selector}`
pub async fn update<SR, EP>(
    State(state): State<AppState<SR, EP>>,
    Path(selector): Path<String>,
    Json(req): Json<SceneRequest>,
) -> Result<Json<Scene>, ApiError>
where
    SR: SceneRepository + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    // A renamed scene keeps its selector.
    let scene = req.into_scene(Some(selector.clone()))?;
    Ok(Json(state.scene_service.update_scene(&selector, scene).await?))
}

/// `DELETE /api/scenes/{selector}`
pub async fn delete<SR, EP>(
    State(state): State<AppState<SR, EP>>,
    Path(selector): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    SR: SceneRepository + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    state.scene_service.delete_scene(&selector).await?;
    Ok(DeleteResponse::NoContent)
}

/// `POST /api/scenes/{selector}/start`
///
/// Answers as soon as the start request is on the bus; the run is followed
/// through the event stream.
pub async fn start<SR, EP>(
    State(state): State<AppState<SR, EP>>,
    Path(selector): Path<String>,
) -> Result<Json<StartAck>, ApiError>
where
    SR: SceneRepository + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    Ok(Json(state.scene_service.start(&selector).await?))
}
