//! Scene dispatcher — loads a scene and fans its columns out into lanes.
//!
//! [`SceneDispatcher::start`] resolves the scene and spawns one task per
//! column, then returns a [`SceneRun`] without waiting for any lane.
//! [`SceneDispatcher::complete`] waits for every lane of a run and publishes
//! `scene.run-finished`. Top-level runs are completed in a detached task by
//! the trigger listener; a nested `scene.start` completes its run inline so
//! that the calling lane waits for it.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::json;
use tokio::task::JoinHandle;
use tracing::Instrument;

use scenehub_domain::event::{Event, EventType};
use scenehub_domain::id::RunId;

use crate::ports::{DeviceManager, EventPublisher, HomeStatus, SceneRepository};

use super::context::{CallStack, ExecutionContext};
use super::error::{DispatchError, error_chain};
use super::lane::{LaneOutcome, LaneRunner, LaneStatus};
use super::template::Templates;

/// Boxed so that a lane can start a nested dispatch that itself spawns lanes.
pub type DispatchFuture = Pin<Box<dyn Future<Output = Result<SceneRun, DispatchError>> + Send>>;

/// A dispatched scene whose lanes are running.
#[derive(Debug)]
pub struct SceneRun {
    pub run_id: RunId,
    pub scene: String,
    lanes: Vec<JoinHandle<LaneOutcome>>,
}

impl SceneRun {
    #[must_use]
    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }
}

/// Every lane of a run, once all reached a terminal state.
#[derive(Debug)]
pub struct RunReport {
    pub run_id: RunId,
    pub scene: String,
    pub lanes: Vec<LaneOutcome>,
}

impl RunReport {
    /// The outcome of the lane running `column`.
    #[must_use]
    pub fn lane(&self, column: usize) -> Option<&LaneOutcome> {
        self.lanes.iter().find(|lane| lane.column == column)
    }

    /// Whether every lane completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.lanes
            .iter()
            .all(|lane| matches!(lane.status, LaneStatus::Completed))
    }
}

/// Resolves scenes and runs them against the injected ports.
pub struct SceneDispatcher<SR, DM, EP, HS> {
    pub(crate) scenes: SR,
    pub(crate) devices: DM,
    pub(crate) publisher: EP,
    pub(crate) home: HS,
    pub(crate) templates: Templates,
}

impl<SR, DM, EP, HS> SceneDispatcher<SR, DM, EP, HS>
where
    SR: SceneRepository + Send + Sync + 'static,
    DM: DeviceManager + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
    HS: HomeStatus + Send + Sync + 'static,
{
    /// Create a dispatcher. It is meant to be shared behind an [`Arc`].
    pub fn new(scenes: SR, devices: DM, publisher: EP, home: HS) -> Self {
        Self {
            scenes,
            devices,
            publisher,
            home,
            templates: Templates::new(),
        }
    }

    pub fn publisher(&self) -> &EP {
        &self.publisher
    }

    /// Dispatch `selector` with the caller's call stack.
    ///
    /// Fails before spawning anything if the scene is already on `stack`,
    /// does not exist, or is disabled. Otherwise every column is started as
    /// an independent lane and the run is returned immediately.
    pub fn start(self: &Arc<Self>, selector: &str, run_id: RunId, stack: CallStack) -> DispatchFuture {
        let dispatcher = Arc::clone(self);
        let selector = selector.to_string();
        Box::pin(async move { dispatcher.dispatch(selector, run_id, stack).await })
    }

    async fn dispatch(
        self: Arc<Self>,
        selector: String,
        run_id: RunId,
        stack: CallStack,
    ) -> Result<SceneRun, DispatchError> {
        if stack.contains(&selector) {
            return Err(DispatchError::CyclicScene { selector, stack });
        }
        let scene = match self.scenes.get_by_selector(&selector).await {
            Ok(Some(scene)) => scene,
            Ok(None) => return Err(DispatchError::SceneNotFound { selector }),
            Err(source) => return Err(DispatchError::Storage { selector, source }),
        };
        if !scene.enabled {
            return Err(DispatchError::SceneDisabled { selector });
        }

        if let Err(err) = self
            .scenes
            .touch_last_executed(&selector, self.home.now())
            .await
        {
            tracing::warn!(scene = %selector, error = %error_chain(&err), "failed to record last execution");
        }

        let stack = stack.push(selector.as_str());
        let lanes: Vec<_> = scene
            .actions
            .into_iter()
            .enumerate()
            .map(|(column, actions)| {
                let ctx = ExecutionContext::new(run_id, selector.as_str(), column, stack.clone());
                let span = tracing::info_span!("lane", scene = %selector, %run_id, column);
                let runner = LaneRunner::new(Arc::clone(&self), ctx);
                tokio::spawn(runner.run(actions).instrument(span))
            })
            .collect();

        tracing::info!(scene = %selector, %run_id, lanes = lanes.len(), depth = stack.depth(), "scene dispatched");
        Ok(SceneRun {
            run_id,
            scene: selector,
            lanes,
        })
    }

    /// Wait for every lane of `run`, then publish `scene.run-finished`.
    pub async fn complete(&self, run: SceneRun) -> RunReport {
        let mut lanes = Vec::with_capacity(run.lanes.len());
        for handle in run.lanes {
            match handle.await {
                Ok(outcome) => lanes.push(outcome),
                Err(err) => {
                    tracing::error!(scene = %run.scene, run_id = %run.run_id, error = %err, "lane task failed");
                }
            }
        }
        let report = RunReport {
            run_id: run.run_id,
            scene: run.scene,
            lanes,
        };

        tracing::info!(scene = %report.scene, run_id = %report.run_id, completed = report.is_completed(), "scene run finished");
        let event = Event::new(
            EventType::SceneRunFinished,
            json!({
                "run_id": report.run_id,
                "scene": report.scene,
                "lanes": report.lanes.iter().map(LaneOutcome::to_json).collect::<Vec<_>>(),
            }),
        );
        if let Err(err) = self.publisher.publish(event).await {
            tracing::warn!(scene = %report.scene, error = %error_chain(&err), "failed to publish run status");
        }
        report
    }

    /// Dispatch a top-level run and wait for it.
    ///
    /// # Errors
    ///
    /// Returns the [`DispatchError`] if the scene could not be dispatched.
    pub async fn run(self: &Arc<Self>, selector: &str, run_id: RunId) -> Result<RunReport, DispatchError> {
        let run = self.start(selector, run_id, CallStack::default()).await?;
        Ok(self.complete(run).await)
    }
}
