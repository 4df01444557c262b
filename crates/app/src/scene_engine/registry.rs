//! Action registry — the static table of handlers, one per action kind.
//!
//! Resolution is by `type` string. The table is closed: adding an action
//! type means adding an [`ActionKind`], a [`TypedAction`] variant, a row
//! here and an arm in the lane runner.

use std::str::FromStr;

use scenehub_domain::error::ValidationError;
use scenehub_domain::scene::{Action, ActionCategory, ActionKind, Scene, TypedAction};

/// Registration of one action kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handler {
    pub kind: ActionKind,
    /// Parameters that must be present (and not `null`) in the action document.
    pub required: &'static [&'static str],
}

impl Handler {
    #[must_use]
    pub fn category(&self) -> ActionCategory {
        self.kind.category()
    }
}

const fn handler(kind: ActionKind, required: &'static [&'static str]) -> Handler {
    Handler { kind, required }
}

static HANDLERS: &[Handler] = &[
    handler(ActionKind::LightTurnOn, &["devices"]),
    handler(ActionKind::LightTurnOff, &["devices"]),
    handler(ActionKind::LightToggle, &["devices"]),
    handler(ActionKind::SwitchTurnOn, &["devices"]),
    handler(ActionKind::SwitchTurnOff, &["devices"]),
    handler(ActionKind::SwitchToggle, &["devices"]),
    handler(ActionKind::DeviceGetValue, &["device_feature"]),
    handler(ActionKind::DeviceSetValue, &["device_feature"]),
    handler(ActionKind::TimeDelay, &["value", "unit"]),
    handler(ActionKind::SceneStart, &["scene"]),
    handler(ActionKind::ConditionOnlyContinueIf, &["conditions"]),
    handler(ActionKind::ConditionCheckTime, &[]),
    handler(ActionKind::AlarmCheckAlarmMode, &["house", "alarm_mode"]),
    handler(ActionKind::HouseIsEmpty, &["house"]),
    handler(ActionKind::HouseIsNotEmpty, &["house"]),
    handler(
        ActionKind::CalendarIsEventRunning,
        &["calendars", "calendar_event_name_comparator"],
    ),
    handler(ActionKind::EcowattCondition, &["ecowatt_network_status"]),
    handler(
        ActionKind::EdfTempoCondition,
        &["edf_tempo_day", "edf_tempo_peak_day_type"],
    ),
    handler(ActionKind::MessageSend, &["user", "text"]),
    handler(ActionKind::HttpRequest, &["method", "url"]),
    handler(ActionKind::MqttSend, &["topic", "message"]),
    handler(ActionKind::Zigbee2mqttSend, &["topic", "message"]),
    handler(ActionKind::UserSetSeenAtHome, &["user", "house"]),
    handler(ActionKind::UserSetOutOfHome, &["user", "house"]),
    handler(ActionKind::AlarmSetAlarmMode, &["house", "alarm_mode"]),
    handler(ActionKind::MusicPlayNotification, &["device", "text"]),
    handler(ActionKind::AiAsk, &["user", "text"]),
    handler(ActionKind::SmsSend, &["text"]),
];

/// Find the handler for an action `type`.
///
/// # Errors
///
/// Returns [`ValidationError::UnknownActionType`] for an unregistered type.
pub fn resolve(action_type: &str) -> Result<&'static Handler, ValidationError> {
    let kind = ActionKind::from_str(action_type)?;
    HANDLERS
        .iter()
        .find(|h| h.kind == kind)
        .ok_or_else(|| ValidationError::UnknownActionType {
            action_type: action_type.to_string(),
        })
}

/// Resolve an action, check its required parameters and parse it.
///
/// # Errors
///
/// Returns [`ValidationError::UnknownActionType`] or
/// [`ValidationError::InvalidActionParams`].
pub fn parse(action: &Action) -> Result<TypedAction, ValidationError> {
    let handler = resolve(&action.action_type)?;
    if let Some(missing) = handler.required.iter().find(|p| !action.has_param(p)) {
        return Err(ValidationError::InvalidActionParams {
            action_type: action.action_type.clone(),
            reason: format!("missing required parameter `{missing}`"),
        });
    }
    TypedAction::parse(action)
}

/// Check every action of a scene, reporting the first invalid one.
///
/// # Errors
///
/// Returns the first action's validation error, with its position in the reason.
pub fn validate_scene(scene: &Scene) -> Result<(), ValidationError> {
    for (column, index, action) in scene.positioned_actions() {
        parse(action).map_err(|err| match err {
            ValidationError::InvalidActionParams {
                action_type,
                reason,
            } => ValidationError::InvalidActionParams {
                action_type,
                reason: format!("column {column}, action {index}: {reason}"),
            },
            other => other,
        })?;
    }
    Ok(())
}
