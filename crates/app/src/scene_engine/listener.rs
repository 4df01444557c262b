//! Trigger listener — turns `action.triggered` events into scene runs.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use scenehub_domain::event::{Event, EventType};
use scenehub_domain::id::RunId;

use crate::ports::{DeviceManager, EventPublisher, HomeStatus, SceneRepository};

use super::context::CallStack;
use super::dispatcher::SceneDispatcher;
use super::error::error_chain;

/// Consumes scene-start requests from the bus and runs them detached.
pub struct TriggerListener<SR, DM, EP, HS> {
    dispatcher: Arc<SceneDispatcher<SR, DM, EP, HS>>,
}

impl<SR, DM, EP, HS> TriggerListener<SR, DM, EP, HS>
where
    SR: SceneRepository + Send + Sync + 'static,
    DM: DeviceManager + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
    HS: HomeStatus + Send + Sync + 'static,
{
    pub fn new(dispatcher: Arc<SceneDispatcher<SR, DM, EP, HS>>) -> Self {
        Self { dispatcher }
    }

    /// Start the scene requested by `event`, if it is a scene-start request.
    ///
    /// The run is dispatched and completed in its own task so that the
    /// listener goes straight back to the bus. A dispatch failure is logged
    /// and published as `scene.run-failed`.
    pub fn handle(&self, event: &Event) -> Option<JoinHandle<()>> {
        let request = event.as_scene_start()?;
        let run_id = request.run_id.unwrap_or_default();
        let dispatcher = Arc::clone(&self.dispatcher);
        tracing::debug!(scene = %request.scene, %run_id, "scene start requested");

        Some(tokio::spawn(async move {
            match dispatcher
                .start(&request.scene, run_id, CallStack::default())
                .await
            {
                Ok(run) => {
                    dispatcher.complete(run).await;
                }
                Err(err) => {
                    let error = error_chain(&err);
                    tracing::error!(scene = %request.scene, %run_id, %error, "scene dispatch failed");
                    let failure = Event::new(
                        EventType::SceneRunFailed,
                        json!({"run_id": run_id, "scene": request.scene, "error": error}),
                    );
                    if let Err(err) = dispatcher.publisher().publish(failure).await {
                        tracing::warn!(error = %error_chain(&err), "failed to publish run failure");
                    }
                }
            }
        }))
    }

    /// Process start requests until the queue closes.
    ///
    /// The queue is the bus's trigger queue: it never drops a request, so
    /// every acknowledged start ends in `scene.run-finished` or
    /// `scene.run-failed`.
    pub async fn run(self, mut triggers: mpsc::Receiver<Event>) {
        tracing::info!("trigger listener started");
        while let Some(event) = triggers.recv().await {
            self.handle(&event);
        }
        tracing::info!("trigger listener stopped");
    }
}
