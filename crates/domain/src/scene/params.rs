//! Typed parameters for each action of the catalogue.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::home::{AlarmMode, EcowattStatus, TempoColor, TempoDay};
use crate::time::parse_time_of_day;

/// Devices targeted by a light or switch action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceTargets {
    pub devices: Vec<String>,
}

/// `device.get-value` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetValue {
    pub device_feature: String,
}

/// `device.set-value` parameters. Exactly one of `value` / `evaluate_value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetValue {
    pub device_feature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// Expression evaluated against the lane variables, e.g. `last_value + 1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluate_value: Option<String>,
}

/// Unit of a `time.delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelayUnit {
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
}

/// `time.delay` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delay {
    pub value: u64,
    pub unit: DelayUnit,
}

impl Delay {
    /// The wall-clock duration of the delay (saturating on overflow).
    #[must_use]
    pub fn duration(&self) -> Duration {
        let millis = match self.unit {
            DelayUnit::Milliseconds => self.value,
            DelayUnit::Seconds => self.value.saturating_mul(1_000),
            DelayUnit::Minutes => self.value.saturating_mul(60_000),
            DelayUnit::Hours => self.value.saturating_mul(3_600_000),
        };
        Duration::from_millis(millis)
    }
}

/// `scene.start` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneTarget {
    pub scene: String,
}

/// Comparison operator used by `condition.only-continue-if`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "<")]
    Less,
    #[serde(rename = "<=")]
    LessOrEqual,
}

impl Operator {
    /// Apply the operator to `left <op> right`.
    #[must_use]
    pub fn compare(self, left: f64, right: f64) -> bool {
        match self {
            Self::Equal => (left - right).abs() < f64::EPSILON,
            Self::NotEqual => (left - right).abs() >= f64::EPSILON,
            Self::Greater => left > right,
            Self::GreaterOrEqual => left >= right,
            Self::Less => left < right,
            Self::LessOrEqual => left <= right,
        }
    }
}

/// One comparison of `condition.only-continue-if`.
///
/// The left operand is either a lane variable or a live device feature value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueCondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_feature: Option<String>,
    pub operator: Operator,
    pub value: f64,
}

/// `condition.only-continue-if` parameters. All comparisons must hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnlyContinueIf {
    pub conditions: Vec<ValueCondition>,
}

/// Day of the week as written in scene documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<chrono::Weekday> for DayOfWeek {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }
}

/// `condition.check-time` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckTime {
    /// `HH:MM`, inclusive lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    /// `HH:MM`, exclusive upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
    /// Empty means every day.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub days_of_the_week: Vec<DayOfWeek>,
}

/// `alarm.check-alarm-mode` and `alarm.set-alarm-mode` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseAlarm {
    pub house: String,
    pub alarm_mode: AlarmMode,
}

/// `house.is-empty` / `house.is-not-empty` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseTarget {
    pub house: String,
}

/// How a running calendar event name is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameComparator {
    IsExactly,
    Contains,
    StartsWith,
    EndsWith,
    HasAnyName,
}

impl NameComparator {
    /// Compare an event name against the expected one (case-insensitive).
    #[must_use]
    pub fn matches(self, event_name: &str, expected: Option<&str>) -> bool {
        let event_name = event_name.to_lowercase();
        let expected = expected.unwrap_or_default().to_lowercase();
        match self {
            Self::IsExactly => event_name == expected,
            Self::Contains => event_name.contains(&expected),
            Self::StartsWith => event_name.starts_with(&expected),
            Self::EndsWith => event_name.ends_with(&expected),
            Self::HasAnyName => true,
        }
    }
}

/// `calendar.is-event-running` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEventRunning {
    pub calendars: Vec<String>,
    pub calendar_event_name_comparator: NameComparator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar_event_name: Option<String>,
}

/// `ecowatt.condition` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcowattCondition {
    pub ecowatt_network_status: EcowattStatus,
}

/// Expected Tempo day color, or no check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TempoDayType {
    Blue,
    White,
    Red,
    NoCheck,
}

impl TempoDayType {
    /// Whether the published color satisfies this expectation.
    #[must_use]
    pub fn accepts(self, color: Option<TempoColor>) -> bool {
        match self {
            Self::NoCheck => true,
            Self::Blue => color == Some(TempoColor::Blue),
            Self::White => color == Some(TempoColor::White),
            Self::Red => color == Some(TempoColor::Red),
        }
    }
}

/// Expected Tempo hour period, or no check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TempoHourType {
    PeakHour,
    OffPeakHour,
    NoCheck,
}

impl TempoHourType {
    /// Whether the current period satisfies this expectation.
    #[must_use]
    pub fn accepts(self, peak_hour: bool) -> bool {
        match self {
            Self::NoCheck => true,
            Self::PeakHour => peak_hour,
            Self::OffPeakHour => !peak_hour,
        }
    }
}

/// `edf-tempo.condition` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdfTempoCondition {
    pub edf_tempo_day: TempoDay,
    pub edf_tempo_peak_day_type: TempoDayType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edf_tempo_peak_hour_type: Option<TempoHourType>,
}

/// `message.send` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSend {
    pub user: String,
    pub text: String,
}

/// One HTTP header of an `http.request`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub key: String,
    pub value: String,
}

/// `http.request` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<Header>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Methods accepted by `http.request`.
pub const HTTP_METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD"];

/// `mqtt.send` / `zigbee2mqtt.send` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MqttSend {
    pub topic: String,
    pub message: String,
}

/// `user.set-seen-at-home` / `user.set-out-of-home` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPresence {
    pub user: String,
    pub house: String,
}

/// `music.play-notification` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicNotification {
    pub device: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<u8>,
}

/// `ai.ask` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiAsk {
    pub user: String,
    pub text: String,
}

/// `sms.send` parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsSend {
    pub text: String,
}

pub(crate) fn check_non_empty(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("`{field}` must not be empty"));
    }
    Ok(())
}

impl DeviceTargets {
    pub(crate) fn check(&self) -> Result<(), String> {
        if self.devices.is_empty() {
            return Err("`devices` must list at least one device".to_string());
        }
        self.devices
            .iter()
            .try_for_each(|d| check_non_empty("devices", d))
    }
}

impl SetValue {
    pub(crate) fn check(&self) -> Result<(), String> {
        check_non_empty("device_feature", &self.device_feature)?;
        match (&self.value, &self.evaluate_value) {
            (Some(_), None) => Ok(()),
            (None, Some(expr)) => check_non_empty("evaluate_value", expr),
            (Some(_), Some(_)) => {
                Err("only one of `value` and `evaluate_value` may be set".to_string())
            }
            (None, None) => Err("one of `value` and `evaluate_value` is required".to_string()),
        }
    }
}

impl OnlyContinueIf {
    pub(crate) fn check(&self) -> Result<(), String> {
        if self.conditions.is_empty() {
            return Err("`conditions` must not be empty".to_string());
        }
        for condition in &self.conditions {
            match (&condition.variable, &condition.device_feature) {
                (Some(v), None) => check_non_empty("variable", v)?,
                (None, Some(f)) => check_non_empty("device_feature", f)?,
                _ => {
                    return Err(
                        "each condition needs exactly one of `variable` and `device_feature`"
                            .to_string(),
                    );
                }
            }
        }
        Ok(())
    }
}

impl CheckTime {
    pub(crate) fn check(&self) -> Result<(), String> {
        for value in [&self.after, &self.before].into_iter().flatten() {
            parse_time_of_day(value).map_err(|err| err.to_string())?;
        }
        Ok(())
    }
}

impl CalendarEventRunning {
    pub(crate) fn check(&self) -> Result<(), String> {
        if self.calendars.is_empty() {
            return Err("`calendars` must list at least one calendar".to_string());
        }
        if self.calendar_event_name_comparator != NameComparator::HasAnyName
            && self
                .calendar_event_name
                .as_deref()
                .is_none_or(|n| n.trim().is_empty())
        {
            return Err("`calendar_event_name` is required by this comparator".to_string());
        }
        Ok(())
    }
}

impl HttpRequest {
    pub(crate) fn check(&self) -> Result<(), String> {
        check_non_empty("url", &self.url)?;
        if !HTTP_METHODS.contains(&self.method.to_uppercase().as_str()) {
            return Err(format!("unsupported HTTP method {:?}", self.method));
        }
        Ok(())
    }
}

impl MusicNotification {
    pub(crate) fn check(&self) -> Result<(), String> {
        check_non_empty("device", &self.device)?;
        if self.volume.is_some_and(|v| v > 100) {
            return Err("`volume` must be between 0 and 100".to_string());
        }
        Ok(())
    }
}
