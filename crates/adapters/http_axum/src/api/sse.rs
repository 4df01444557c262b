//! Server-Sent Events (SSE) stream of bus events.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use scenehub_app::ports::{EventPublisher, SceneRepository};

use crate::state::AppState;

/// `GET /api/events/stream` — every bus event as a JSON `data:` frame.
///
/// Start requests, emitted side effects and run status all flow through
/// here, so a client that started a scene can follow its run by `run_id`.
/// Events are tagged with their type in the SSE `event:` field.
pub async fn stream<SR, EP>(
    State(state): State<AppState<SR, EP>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>>
where
    SR: SceneRepository + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
{
    let receiver = state.event_bus.subscribe();
    let events = BroadcastStream::new(receiver).filter_map(|result| match result {
        Ok(event) => match serde_json::to_string(&event) {
            Ok(json) => Some(Ok(Event::default()
                .event(event.event_type.to_string())
                .data(json))),
            Err(err) => {
                tracing::warn!(%err, "failed to serialize event for SSE stream");
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "SSE subscriber lagged, some events were dropped");
            None
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
