//! Event — an immutable record of something that happened.
//!
//! The event bus carries three families of events:
//! - trigger requests (`action.triggered`) consumed by the trigger listener,
//! - side effects emitted by non-device actions (messages, HTTP, MQTT, …)
//!   for other subsystems to carry out,
//! - run status (`scene.lane-finished`, `scene.run-finished`, `scene.run-failed`)
//!   letting observers follow a fire-and-forget dispatch.

use serde::{Deserialize, Serialize};

use crate::id::{EventId, RunId};
use crate::time::{Timestamp, now};

/// Action type carried by an `action.triggered` event that starts a scene.
pub const SCENE_START: &str = "scene.start";

/// Discriminates the kind of [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "action.triggered")]
    ActionTriggered,
    #[serde(rename = "message.send")]
    MessageSend,
    #[serde(rename = "http.request")]
    HttpRequest,
    #[serde(rename = "mqtt.send")]
    MqttSend,
    #[serde(rename = "zigbee2mqtt.send")]
    Zigbee2mqttSend,
    #[serde(rename = "user.seen-at-home")]
    UserSeenAtHome,
    #[serde(rename = "user.left-home")]
    UserLeftHome,
    #[serde(rename = "alarm.set-mode")]
    AlarmSetMode,
    #[serde(rename = "music.play-notification")]
    MusicPlayNotification,
    #[serde(rename = "ai.ask")]
    AiAsk,
    #[serde(rename = "sms.send")]
    SmsSend,
    #[serde(rename = "scene.lane-finished")]
    SceneLaneFinished,
    #[serde(rename = "scene.run-finished")]
    SceneRunFinished,
    #[serde(rename = "scene.run-failed")]
    SceneRunFailed,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ActionTriggered => "action.triggered",
            Self::MessageSend => "message.send",
            Self::HttpRequest => "http.request",
            Self::MqttSend => "mqtt.send",
            Self::Zigbee2mqttSend => "zigbee2mqtt.send",
            Self::UserSeenAtHome => "user.seen-at-home",
            Self::UserLeftHome => "user.left-home",
            Self::AlarmSetMode => "alarm.set-mode",
            Self::MusicPlayNotification => "music.play-notification",
            Self::AiAsk => "ai.ask",
            Self::SmsSend => "sms.send",
            Self::SceneLaneFinished => "scene.lane-finished",
            Self::SceneRunFinished => "scene.run-finished",
            Self::SceneRunFailed => "scene.run-failed",
        };
        f.write_str(name)
    }
}

/// A domain event published on the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub event_type: EventType,
    pub data: serde_json::Value,
    pub timestamp: Timestamp,
}

impl Event {
    /// Create a new event stamped with a fresh id and the current time.
    #[must_use]
    pub fn new(event_type: EventType, data: serde_json::Value) -> Self {
        Self {
            id: EventId::new(),
            event_type,
            data,
            timestamp: now(),
        }
    }

    /// Build the `action.triggered` event requesting a scene start.
    #[must_use]
    pub fn scene_start(scene: impl Into<String>, run_id: RunId) -> Self {
        let payload = ActionTriggered {
            action_type: SCENE_START.to_string(),
            scene: scene.into(),
            run_id: Some(run_id),
        };
        Self::new(
            EventType::ActionTriggered,
            serde_json::to_value(payload).unwrap_or_default(),
        )
    }

    /// Decode a scene-start request, if this event is one.
    ///
    /// Returns `None` for any other event type, for `action.triggered`
    /// payloads of another action type, and for malformed payloads.
    #[must_use]
    pub fn as_scene_start(&self) -> Option<ActionTriggered> {
        if self.event_type != EventType::ActionTriggered {
            return None;
        }
        let payload: ActionTriggered = serde_json::from_value(self.data.clone()).ok()?;
        (payload.action_type == SCENE_START).then_some(payload)
    }
}

/// Payload of an `action.triggered` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTriggered {
    #[serde(rename = "type")]
    pub action_type: String,
    pub scene: String,
    /// Set by the start use-case so the caller can correlate status events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<RunId>,
}

/// Outcome reported synchronously to whoever asked for a scene start.
///
/// Always `PENDING`: the run itself is observed through status events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StartStatus {
    Pending,
}

/// Acknowledgement of a scene start request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartAck {
    #[serde(rename = "type")]
    pub action_type: String,
    pub scene: String,
    pub status: StartStatus,
    pub run_id: RunId,
}

impl StartAck {
    #[must_use]
    pub fn pending(scene: impl Into<String>, run_id: RunId) -> Self {
        Self {
            action_type: SCENE_START.to_string(),
            scene: scene.into(),
            status: StartStatus::Pending,
            run_id,
        }
    }
}
