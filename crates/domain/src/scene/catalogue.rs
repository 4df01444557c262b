//! The closed catalogue of action types.
//!
//! [`ActionKind`] names every recognised `type` string; [`TypedAction`] is
//! the tagged union carrying each variant's typed parameters. Adding an
//! action means adding a variant to both and a handler in the engine; the
//! compiler then points at every `match` that must learn about it.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::action::Action;
use super::params::{
    AiAsk, CalendarEventRunning, CheckTime, Delay, DeviceTargets, EcowattCondition,
    EdfTempoCondition, GetValue, HouseAlarm, HouseTarget, HttpRequest, MessageSend, MqttSend,
    MusicNotification, OnlyContinueIf, SceneTarget, SetValue, SmsSend, UserPresence,
    check_non_empty,
};
use crate::error::ValidationError;

/// How the lane runner treats an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionCategory {
    /// Reads or writes device state through the device manager.
    Device,
    /// Evaluates a predicate; `false` ends the lane.
    Condition,
    /// Controls the lane itself (delay, nested scene).
    Flow,
    /// Published on the event bus for another subsystem to carry out.
    Emit,
}

macro_rules! action_kinds {
    ($($variant:ident => $name:literal, $category:ident;)*) => {
        /// Every recognised action `type`.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ActionKind {
            $($variant,)*
        }

        impl ActionKind {
            /// All kinds, in catalogue order.
            pub const ALL: &'static [ActionKind] = &[$(ActionKind::$variant,)*];

            /// The `type` string used in scene documents.
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)*
                }
            }

            /// How the lane runner treats this kind.
            #[must_use]
            pub fn category(self) -> ActionCategory {
                match self {
                    $(Self::$variant => ActionCategory::$category,)*
                }
            }
        }

        impl FromStr for ActionKind {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Self::$variant),)*
                    other => Err(ValidationError::UnknownActionType {
                        action_type: other.to_string(),
                    }),
                }
            }
        }
    };
}

action_kinds! {
    LightTurnOn => "light.turn-on", Device;
    LightTurnOff => "light.turn-off", Device;
    LightToggle => "light.toggle", Device;
    SwitchTurnOn => "switch.turn-on", Device;
    SwitchTurnOff => "switch.turn-off", Device;
    SwitchToggle => "switch.toggle", Device;
    DeviceGetValue => "device.get-value", Device;
    DeviceSetValue => "device.set-value", Device;
    TimeDelay => "time.delay", Flow;
    SceneStart => "scene.start", Flow;
    ConditionOnlyContinueIf => "condition.only-continue-if", Condition;
    ConditionCheckTime => "condition.check-time", Condition;
    AlarmCheckAlarmMode => "alarm.check-alarm-mode", Condition;
    HouseIsEmpty => "house.is-empty", Condition;
    HouseIsNotEmpty => "house.is-not-empty", Condition;
    CalendarIsEventRunning => "calendar.is-event-running", Condition;
    EcowattCondition => "ecowatt.condition", Condition;
    EdfTempoCondition => "edf-tempo.condition", Condition;
    MessageSend => "message.send", Emit;
    HttpRequest => "http.request", Emit;
    MqttSend => "mqtt.send", Emit;
    Zigbee2mqttSend => "zigbee2mqtt.send", Emit;
    UserSetSeenAtHome => "user.set-seen-at-home", Emit;
    UserSetOutOfHome => "user.set-out-of-home", Emit;
    AlarmSetAlarmMode => "alarm.set-alarm-mode", Emit;
    MusicPlayNotification => "music.play-notification", Emit;
    AiAsk => "ai.ask", Emit;
    SmsSend => "sms.send", Emit;
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An action with its typed parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TypedAction {
    #[serde(rename = "light.turn-on")]
    LightTurnOn(DeviceTargets),
    #[serde(rename = "light.turn-off")]
    LightTurnOff(DeviceTargets),
    #[serde(rename = "light.toggle")]
    LightToggle(DeviceTargets),
    #[serde(rename = "switch.turn-on")]
    SwitchTurnOn(DeviceTargets),
    #[serde(rename = "switch.turn-off")]
    SwitchTurnOff(DeviceTargets),
    #[serde(rename = "switch.toggle")]
    SwitchToggle(DeviceTargets),
    #[serde(rename = "device.get-value")]
    DeviceGetValue(GetValue),
    #[serde(rename = "device.set-value")]
    DeviceSetValue(SetValue),
    #[serde(rename = "time.delay")]
    TimeDelay(Delay),
    #[serde(rename = "scene.start")]
    SceneStart(SceneTarget),
    #[serde(rename = "condition.only-continue-if")]
    ConditionOnlyContinueIf(OnlyContinueIf),
    #[serde(rename = "condition.check-time")]
    ConditionCheckTime(CheckTime),
    #[serde(rename = "alarm.check-alarm-mode")]
    AlarmCheckAlarmMode(HouseAlarm),
    #[serde(rename = "house.is-empty")]
    HouseIsEmpty(HouseTarget),
    #[serde(rename = "house.is-not-empty")]
    HouseIsNotEmpty(HouseTarget),
    #[serde(rename = "calendar.is-event-running")]
    CalendarIsEventRunning(CalendarEventRunning),
    #[serde(rename = "ecowatt.condition")]
    EcowattCondition(EcowattCondition),
    #[serde(rename = "edf-tempo.condition")]
    EdfTempoCondition(EdfTempoCondition),
    #[serde(rename = "message.send")]
    MessageSend(MessageSend),
    #[serde(rename = "http.request")]
    HttpRequest(HttpRequest),
    #[serde(rename = "mqtt.send")]
    MqttSend(MqttSend),
    #[serde(rename = "zigbee2mqtt.send")]
    Zigbee2mqttSend(MqttSend),
    #[serde(rename = "user.set-seen-at-home")]
    UserSetSeenAtHome(UserPresence),
    #[serde(rename = "user.set-out-of-home")]
    UserSetOutOfHome(UserPresence),
    #[serde(rename = "alarm.set-alarm-mode")]
    AlarmSetAlarmMode(HouseAlarm),
    #[serde(rename = "music.play-notification")]
    MusicPlayNotification(MusicNotification),
    #[serde(rename = "ai.ask")]
    AiAsk(AiAsk),
    #[serde(rename = "sms.send")]
    SmsSend(SmsSend),
}

impl TypedAction {
    /// Parse a stored action into its typed form.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownActionType`] for a type outside the
    /// catalogue, or [`ValidationError::InvalidActionParams`] when the
    /// parameters do not fit the type.
    pub fn parse(action: &Action) -> Result<Self, ValidationError> {
        let kind = ActionKind::from_str(&action.action_type)?;
        let invalid = |reason: String| ValidationError::InvalidActionParams {
            action_type: kind.as_str().to_string(),
            reason,
        };
        let typed: Self = serde_json::from_value(action.to_document())
            .map_err(|err| invalid(err.to_string()))?;
        typed.check().map_err(invalid)?;
        Ok(typed)
    }

    /// The kind of this action.
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::LightTurnOn(_) => ActionKind::LightTurnOn,
            Self::LightTurnOff(_) => ActionKind::LightTurnOff,
            Self::LightToggle(_) => ActionKind::LightToggle,
            Self::SwitchTurnOn(_) => ActionKind::SwitchTurnOn,
            Self::SwitchTurnOff(_) => ActionKind::SwitchTurnOff,
            Self::SwitchToggle(_) => ActionKind::SwitchToggle,
            Self::DeviceGetValue(_) => ActionKind::DeviceGetValue,
            Self::DeviceSetValue(_) => ActionKind::DeviceSetValue,
            Self::TimeDelay(_) => ActionKind::TimeDelay,
            Self::SceneStart(_) => ActionKind::SceneStart,
            Self::ConditionOnlyContinueIf(_) => ActionKind::ConditionOnlyContinueIf,
            Self::ConditionCheckTime(_) => ActionKind::ConditionCheckTime,
            Self::AlarmCheckAlarmMode(_) => ActionKind::AlarmCheckAlarmMode,
            Self::HouseIsEmpty(_) => ActionKind::HouseIsEmpty,
            Self::HouseIsNotEmpty(_) => ActionKind::HouseIsNotEmpty,
            Self::CalendarIsEventRunning(_) => ActionKind::CalendarIsEventRunning,
            Self::EcowattCondition(_) => ActionKind::EcowattCondition,
            Self::EdfTempoCondition(_) => ActionKind::EdfTempoCondition,
            Self::MessageSend(_) => ActionKind::MessageSend,
            Self::HttpRequest(_) => ActionKind::HttpRequest,
            Self::MqttSend(_) => ActionKind::MqttSend,
            Self::Zigbee2mqttSend(_) => ActionKind::Zigbee2mqttSend,
            Self::UserSetSeenAtHome(_) => ActionKind::UserSetSeenAtHome,
            Self::UserSetOutOfHome(_) => ActionKind::UserSetOutOfHome,
            Self::AlarmSetAlarmMode(_) => ActionKind::AlarmSetAlarmMode,
            Self::MusicPlayNotification(_) => ActionKind::MusicPlayNotification,
            Self::AiAsk(_) => ActionKind::AiAsk,
            Self::SmsSend(_) => ActionKind::SmsSend,
        }
    }

    /// Semantic checks serde cannot express.
    fn check(&self) -> Result<(), String> {
        match self {
            Self::LightTurnOn(p)
            | Self::LightTurnOff(p)
            | Self::LightToggle(p)
            | Self::SwitchTurnOn(p)
            | Self::SwitchTurnOff(p)
            | Self::SwitchToggle(p) => p.check(),
            Self::DeviceGetValue(p) => check_non_empty("device_feature", &p.device_feature),
            Self::DeviceSetValue(p) => p.check(),
            Self::SceneStart(p) => check_non_empty("scene", &p.scene),
            Self::ConditionOnlyContinueIf(p) => p.check(),
            Self::ConditionCheckTime(p) => p.check(),
            Self::AlarmCheckAlarmMode(p) | Self::AlarmSetAlarmMode(p) => {
                check_non_empty("house", &p.house)
            }
            Self::HouseIsEmpty(p) | Self::HouseIsNotEmpty(p) => check_non_empty("house", &p.house),
            Self::CalendarIsEventRunning(p) => p.check(),
            Self::HttpRequest(p) => p.check(),
            Self::MqttSend(p) | Self::Zigbee2mqttSend(p) => check_non_empty("topic", &p.topic),
            Self::UserSetSeenAtHome(p) | Self::UserSetOutOfHome(p) => {
                check_non_empty("user", &p.user)?;
                check_non_empty("house", &p.house)
            }
            Self::MessageSend(p) => check_non_empty("user", &p.user),
            Self::MusicPlayNotification(p) => p.check(),
            Self::AiAsk(p) => check_non_empty("user", &p.user),
            Self::TimeDelay(_)
            | Self::EcowattCondition(_)
            | Self::EdfTempoCondition(_)
            | Self::SmsSend(_) => Ok(()),
        }
    }
}

impl From<&TypedAction> for Action {
    fn from(typed: &TypedAction) -> Self {
        let mut document = serde_json::to_value(typed).unwrap_or_default();
        let action_type = typed.kind().as_str();
        if let Some(map) = document.as_object_mut() {
            map.remove("type");
        }
        Action::new(action_type, document)
    }
}

impl From<TypedAction> for Action {
    fn from(typed: TypedAction) -> Self {
        Self::from(&typed)
    }
}
