//! Lane runner — executes one column of a scene, one action at a time.
//!
//! ```text
//! Running ──► Completed
//!         ├─► Aborted(condition-false)
//!         └─► Faulted(error)
//! ```
//!
//! Whatever happens, the lane ends in one of the three terminal states:
//! errors are caught here, logged, reported on the bus and never reach the
//! dispatcher or sibling lanes.

use std::fmt;
use std::sync::Arc;

use serde_json::{Value, json};

use scenehub_domain::device::FeatureCategory;
use scenehub_domain::event::{Event, EventType};
use scenehub_domain::id::RunId;
use scenehub_domain::scene::{Action, Column, TypedAction};

use crate::ports::{DeviceManager, EventPublisher, HomeStatus, SceneRepository};

use super::conditions::ConditionEvaluator;
use super::context::ExecutionContext;
use super::device_adapter::{DeviceActionAdapter, SwitchCommand};
use super::dispatcher::SceneDispatcher;
use super::error::{DispatchError, LaneError, error_chain};
use super::registry;

/// Why a lane stopped early without failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    ConditionFalse,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConditionFalse => f.write_str("condition-false"),
        }
    }
}

/// Terminal state of a lane. `action` is the index of the action that ended it.
#[derive(Debug)]
pub enum LaneStatus {
    Completed,
    Aborted { action: usize, reason: AbortReason },
    Faulted { action: usize, error: LaneError },
}

impl LaneStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Aborted { .. } => "aborted",
            Self::Faulted { .. } => "faulted",
        }
    }
}

/// What became of one column.
#[derive(Debug)]
pub struct LaneOutcome {
    pub column: usize,
    pub status: LaneStatus,
}

impl LaneOutcome {
    /// Status payload shared by `scene.lane-finished` and `scene.run-finished`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut doc = json!({
            "column": self.column,
            "status": self.status.as_str(),
        });
        match &self.status {
            LaneStatus::Completed => {}
            LaneStatus::Aborted { action, reason } => {
                doc["action"] = json!(action);
                doc["reason"] = json!(reason.to_string());
            }
            LaneStatus::Faulted { action, error } => {
                doc["action"] = json!(action);
                doc["error"] = json!(error_chain(error));
                if let LaneError::Dispatch(DispatchError::CyclicScene { stack, .. }) = error {
                    doc["stack"] = json!(stack.selectors());
                }
            }
        }
        doc
    }
}

enum Step {
    Continue,
    Stop,
}

impl From<bool> for Step {
    fn from(holds: bool) -> Self {
        if holds { Self::Continue } else { Self::Stop }
    }
}

/// Runs one column with its own [`ExecutionContext`].
pub(crate) struct LaneRunner<SR, DM, EP, HS> {
    dispatcher: Arc<SceneDispatcher<SR, DM, EP, HS>>,
    ctx: ExecutionContext,
}

impl<SR, DM, EP, HS> LaneRunner<SR, DM, EP, HS>
where
    SR: SceneRepository + Send + Sync + 'static,
    DM: DeviceManager + Send + Sync + 'static,
    EP: EventPublisher + Send + Sync + 'static,
    HS: HomeStatus + Send + Sync + 'static,
{
    pub(crate) fn new(dispatcher: Arc<SceneDispatcher<SR, DM, EP, HS>>, ctx: ExecutionContext) -> Self {
        Self { dispatcher, ctx }
    }

    /// Run the column to a terminal state and report it.
    pub(crate) async fn run(mut self, actions: Column) -> LaneOutcome {
        let status = self.drive(&actions).await;
        let outcome = LaneOutcome {
            column: self.ctx.column,
            status,
        };
        self.report(&outcome).await;
        outcome
    }

    async fn drive(&mut self, actions: &[Action]) -> LaneStatus {
        for (index, action) in actions.iter().enumerate() {
            tracing::debug!(action = index, action_type = %action.action_type, "running action");
            match self.step(action).await {
                Ok(Step::Continue) => {}
                Ok(Step::Stop) => {
                    return LaneStatus::Aborted {
                        action: index,
                        reason: AbortReason::ConditionFalse,
                    };
                }
                Err(error) => return LaneStatus::Faulted { action: index, error },
            }
        }
        LaneStatus::Completed
    }

    async fn step(&mut self, action: &Action) -> Result<Step, LaneError> {
        let typed = registry::parse(action)?;
        let engine = &self.dispatcher;
        let ctx = &mut self.ctx;
        let devices = DeviceActionAdapter::new(&engine.devices, &engine.templates);
        let conditions = ConditionEvaluator::new(&engine.devices, &engine.home);

        match typed {
            TypedAction::LightTurnOn(p) => {
                devices.switch(&p.devices, FeatureCategory::Light, SwitchCommand::On).await?;
            }
            TypedAction::LightTurnOff(p) => {
                devices.switch(&p.devices, FeatureCategory::Light, SwitchCommand::Off).await?;
            }
            TypedAction::LightToggle(p) => {
                devices.switch(&p.devices, FeatureCategory::Light, SwitchCommand::Toggle).await?;
            }
            TypedAction::SwitchTurnOn(p) => {
                devices.switch(&p.devices, FeatureCategory::Switch, SwitchCommand::On).await?;
            }
            TypedAction::SwitchTurnOff(p) => {
                devices.switch(&p.devices, FeatureCategory::Switch, SwitchCommand::Off).await?;
            }
            TypedAction::SwitchToggle(p) => {
                devices.switch(&p.devices, FeatureCategory::Switch, SwitchCommand::Toggle).await?;
            }
            TypedAction::DeviceGetValue(p) => devices.get_value(&p, ctx).await?,
            TypedAction::DeviceSetValue(p) => devices.set_value(&p, ctx).await?,
            TypedAction::TimeDelay(delay) => tokio::time::sleep(delay.duration()).await,
            TypedAction::SceneStart(p) => {
                let run = engine
                    .start(&p.scene, RunId::new(), ctx.stack().clone())
                    .await?;
                tracing::debug!(nested = %p.scene, nested_run_id = %run.run_id, "waiting for nested scene");
                engine.complete(run).await;
            }
            TypedAction::ConditionOnlyContinueIf(p) => {
                return conditions.only_continue_if(&p, ctx).await.map(Step::from);
            }
            TypedAction::ConditionCheckTime(p) => return conditions.check_time(&p).map(Step::from),
            TypedAction::AlarmCheckAlarmMode(p) => {
                return conditions.alarm_mode_is(&p).await.map(Step::from);
            }
            TypedAction::HouseIsEmpty(p) => {
                return conditions.house_is_empty(&p, true).await.map(Step::from);
            }
            TypedAction::HouseIsNotEmpty(p) => {
                return conditions.house_is_empty(&p, false).await.map(Step::from);
            }
            TypedAction::CalendarIsEventRunning(p) => {
                return conditions.calendar_event_running(&p).await.map(Step::from);
            }
            TypedAction::EcowattCondition(p) => {
                return conditions.ecowatt(&p).await.map(Step::from);
            }
            TypedAction::EdfTempoCondition(p) => {
                return conditions.edf_tempo(&p).await.map(Step::from);
            }
            TypedAction::MessageSend(p) => {
                let text = engine.templates.render(&p.text, ctx)?;
                let payload = json!({"user": p.user, "text": text});
                emit(&engine.publisher, ctx, EventType::MessageSend, payload).await?;
            }
            TypedAction::HttpRequest(p) => {
                let url = engine.templates.render(&p.url, ctx)?;
                let body = p
                    .body
                    .as_deref()
                    .map(|body| engine.templates.render(body, ctx))
                    .transpose()?;
                let payload = json!({
                    "method": p.method.to_uppercase(),
                    "url": url,
                    "headers": p.headers,
                    "body": body,
                });
                emit(&engine.publisher, ctx, EventType::HttpRequest, payload).await?;
            }
            TypedAction::MqttSend(p) => {
                let message = engine.templates.render(&p.message, ctx)?;
                let payload = json!({"topic": p.topic, "message": message});
                emit(&engine.publisher, ctx, EventType::MqttSend, payload).await?;
            }
            TypedAction::Zigbee2mqttSend(p) => {
                let message = engine.templates.render(&p.message, ctx)?;
                let payload = json!({"topic": p.topic, "message": message});
                emit(&engine.publisher, ctx, EventType::Zigbee2mqttSend, payload).await?;
            }
            TypedAction::UserSetSeenAtHome(p) => {
                let payload = json!({"user": p.user, "house": p.house});
                emit(&engine.publisher, ctx, EventType::UserSeenAtHome, payload).await?;
            }
            TypedAction::UserSetOutOfHome(p) => {
                let payload = json!({"user": p.user, "house": p.house});
                emit(&engine.publisher, ctx, EventType::UserLeftHome, payload).await?;
            }
            TypedAction::AlarmSetAlarmMode(p) => {
                let payload = json!({"house": p.house, "alarm_mode": p.alarm_mode});
                emit(&engine.publisher, ctx, EventType::AlarmSetMode, payload).await?;
            }
            TypedAction::MusicPlayNotification(p) => {
                let text = engine.templates.render(&p.text, ctx)?;
                let payload = json!({"device": p.device, "text": text, "volume": p.volume});
                emit(&engine.publisher, ctx, EventType::MusicPlayNotification, payload).await?;
            }
            TypedAction::AiAsk(p) => {
                let text = engine.templates.render(&p.text, ctx)?;
                let payload = json!({"user": p.user, "text": text});
                emit(&engine.publisher, ctx, EventType::AiAsk, payload).await?;
            }
            TypedAction::SmsSend(p) => {
                let text = engine.templates.render(&p.text, ctx)?;
                emit(&engine.publisher, ctx, EventType::SmsSend, json!({"text": text})).await?;
            }
        }
        Ok(Step::Continue)
    }

    async fn report(&self, outcome: &LaneOutcome) {
        let ctx = &self.ctx;
        match &outcome.status {
            LaneStatus::Completed => {
                tracing::info!(scene = %ctx.scene, run_id = %ctx.run_id, column = ctx.column, "lane completed");
            }
            LaneStatus::Aborted { action, reason } => {
                tracing::warn!(
                    scene = %ctx.scene,
                    run_id = %ctx.run_id,
                    column = ctx.column,
                    action,
                    %reason,
                    "lane aborted"
                );
            }
            LaneStatus::Faulted { action, error } => {
                tracing::error!(
                    scene = %ctx.scene,
                    run_id = %ctx.run_id,
                    column = ctx.column,
                    action,
                    error = %error_chain(error),
                    "lane faulted"
                );
            }
        }

        let mut payload = outcome.to_json();
        payload["run_id"] = json!(ctx.run_id);
        payload["scene"] = json!(ctx.scene);
        let event = Event::new(EventType::SceneLaneFinished, payload);
        if let Err(err) = self.dispatcher.publisher.publish(event).await {
            tracing::warn!(scene = %ctx.scene, error = %error_chain(&err), "failed to publish lane status");
        }
    }
}

/// Publish a side effect for another subsystem, tagged with its origin.
async fn emit<EP>(
    publisher: &EP,
    ctx: &ExecutionContext,
    event_type: EventType,
    mut payload: Value,
) -> Result<(), LaneError>
where
    EP: EventPublisher + Sync,
{
    payload["scene"] = json!(ctx.scene);
    payload["run_id"] = json!(ctx.run_id);
    tracing::debug!(%event_type, "emitting event");
    publisher
        .publish(Event::new(event_type, payload))
        .await
        .map_err(LaneError::Publish)
}
