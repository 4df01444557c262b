//! Condition evaluation: each condition action reduces to a boolean.
//!
//! `false` ends the lane normally (`Aborted`). An error, such as an
//! unreachable calendar or an unknown variable, faults it instead.

use chrono::{Datelike, NaiveTime};

use scenehub_domain::error::{DeviceError, SceneHubError};
use scenehub_domain::scene::ActionKind;
use scenehub_domain::scene::params::{
    CalendarEventRunning, CheckTime, DayOfWeek, EcowattCondition, EdfTempoCondition, HouseAlarm,
    HouseTarget, OnlyContinueIf, ValueCondition,
};
use scenehub_domain::time::parse_time_of_day;

use crate::ports::{DeviceManager, HomeStatus};

use super::context::ExecutionContext;
use super::error::{LaneError, error_chain};

/// Evaluates conditions against the device manager and the home status.
pub struct ConditionEvaluator<'a, DM, HS> {
    devices: &'a DM,
    home: &'a HS,
}

fn evaluation_error(condition: ActionKind, err: &SceneHubError) -> LaneError {
    LaneError::ConditionEvaluation {
        condition,
        reason: error_chain(err),
    }
}

impl<'a, DM, HS> ConditionEvaluator<'a, DM, HS>
where
    DM: DeviceManager + Sync,
    HS: HomeStatus + Sync,
{
    pub fn new(devices: &'a DM, home: &'a HS) -> Self {
        Self { devices, home }
    }

    /// All comparisons must hold.
    ///
    /// # Errors
    ///
    /// Fails when a variable is absent or holds no number, or when a
    /// referenced feature is unknown or has never reported a value.
    pub async fn only_continue_if(
        &self,
        params: &OnlyContinueIf,
        ctx: &ExecutionContext,
    ) -> Result<bool, LaneError> {
        for condition in &params.conditions {
            let left = self.operand(condition, ctx).await?;
            if !condition.operator.compare(left, condition.value) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    async fn operand(
        &self,
        condition: &ValueCondition,
        ctx: &ExecutionContext,
    ) -> Result<f64, LaneError> {
        let missing = |reason: String| LaneError::ConditionEvaluation {
            condition: ActionKind::ConditionOnlyContinueIf,
            reason,
        };
        if let Some(variable) = &condition.variable {
            let value = ctx
                .lookup(variable)
                .ok_or_else(|| missing(format!("variable {variable:?} is not set")))?;
            return number(value)
                .ok_or_else(|| missing(format!("variable {variable:?} holds {value}, not a number")));
        }
        let selector = condition.device_feature.as_deref().unwrap_or_default();
        let feature = self
            .devices
            .get_feature(selector)
            .await
            .map_err(|err| evaluation_error(ActionKind::ConditionOnlyContinueIf, &err))?
            .ok_or_else(|| DeviceError::NotFound {
                selector: selector.to_string(),
            })?;
        feature
            .last_value
            .ok_or_else(|| missing(format!("feature {selector:?} has no value yet")))
    }

    /// Whether the clock is inside the configured window and day set.
    ///
    /// `after` is inclusive, `before` exclusive; `after > before` wraps past midnight.
    ///
    /// # Errors
    ///
    /// Fails on a malformed `HH:MM`.
    pub fn check_time(&self, params: &CheckTime) -> Result<bool, LaneError> {
        let now = self.home.now();
        if !params.days_of_the_week.is_empty()
            && !params
                .days_of_the_week
                .contains(&DayOfWeek::from(now.weekday()))
        {
            return Ok(false);
        }
        let bound = |value: Option<&str>| {
            value
                .map(parse_time_of_day)
                .transpose()
                .map_err(|err| LaneError::InvalidParams {
                    action_type: ActionKind::ConditionCheckTime.to_string(),
                    reason: err.to_string(),
                })
        };
        let after = bound(params.after.as_deref())?;
        let before = bound(params.before.as_deref())?;
        Ok(in_window(now.time(), after, before))
    }

    /// # Errors
    ///
    /// Fails if the alarm mode cannot be read.
    pub async fn alarm_mode_is(&self, params: &HouseAlarm) -> Result<bool, LaneError> {
        let mode = self
            .home
            .alarm_mode(&params.house)
            .await
            .map_err(|err| evaluation_error(ActionKind::AlarmCheckAlarmMode, &err))?;
        Ok(mode == params.alarm_mode)
    }

    /// # Errors
    ///
    /// Fails if presence cannot be read.
    pub async fn house_is_empty(
        &self,
        params: &HouseTarget,
        expected: bool,
    ) -> Result<bool, LaneError> {
        let kind = if expected {
            ActionKind::HouseIsEmpty
        } else {
            ActionKind::HouseIsNotEmpty
        };
        let empty = self
            .home
            .is_house_empty(&params.house)
            .await
            .map_err(|err| evaluation_error(kind, &err))?;
        Ok(empty == expected)
    }

    /// Whether any running event of the listed calendars matches the name.
    ///
    /// # Errors
    ///
    /// Fails if the calendars cannot be read.
    pub async fn calendar_event_running(
        &self,
        params: &CalendarEventRunning,
    ) -> Result<bool, LaneError> {
        let events = self
            .home
            .running_calendar_events(&params.calendars)
            .await
            .map_err(|err| evaluation_error(ActionKind::CalendarIsEventRunning, &err))?;
        Ok(events.iter().any(|event| {
            params
                .calendar_event_name_comparator
                .matches(&event.name, params.calendar_event_name.as_deref())
        }))
    }

    /// # Errors
    ///
    /// Fails if the grid signal cannot be read.
    pub async fn ecowatt(&self, params: &EcowattCondition) -> Result<bool, LaneError> {
        let status = self
            .home
            .ecowatt_status()
            .await
            .map_err(|err| evaluation_error(ActionKind::EcowattCondition, &err))?;
        Ok(status == params.ecowatt_network_status)
    }

    /// # Errors
    ///
    /// Fails if the Tempo status cannot be read.
    pub async fn edf_tempo(&self, params: &EdfTempoCondition) -> Result<bool, LaneError> {
        let status = self
            .home
            .edf_tempo(params.edf_tempo_day)
            .await
            .map_err(|err| evaluation_error(ActionKind::EdfTempoCondition, &err))?;
        let hour_ok = params
            .edf_tempo_peak_hour_type
            .is_none_or(|expected| expected.accepts(status.peak_hour));
        Ok(params.edf_tempo_peak_day_type.accepts(status.color) && hour_ok)
    }
}

fn in_window(time: NaiveTime, after: Option<NaiveTime>, before: Option<NaiveTime>) -> bool {
    match (after, before) {
        (None, None) => true,
        (Some(after), None) => time >= after,
        (None, Some(before)) => time < before,
        (Some(after), Some(before)) if after <= before => time >= after && time < before,
        (Some(after), Some(before)) => time >= after || time < before,
    }
}

fn number(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        other => other.as_f64(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene_engine::context::CallStack;
    use crate::scene_engine::fakes::{FakeDevices, FakeHome, sensor};
    use chrono::{TimeZone, Utc};
    use scenehub_domain::home::{
        AlarmMode, CalendarEvent, EcowattStatus, TempoColor, TempoDay, TempoStatus,
    };
    use scenehub_domain::id::RunId;
    use scenehub_domain::scene::params::{
        NameComparator, Operator, TempoDayType, TempoHourType,
    };

    fn context() -> ExecutionContext {
        ExecutionContext::new(RunId::new(), "test", 0, CallStack::default())
    }

    fn by_variable(variable: &str, operator: Operator, value: f64) -> ValueCondition {
        ValueCondition {
            variable: Some(variable.to_string()),
            device_feature: None,
            operator,
            value,
        }
    }

    fn window(after: Option<&str>, before: Option<&str>, days: Vec<DayOfWeek>) -> CheckTime {
        CheckTime {
            after: after.map(str::to_string),
            before: before.map(str::to_string),
            days_of_the_week: days,
        }
    }

    // 2024-06-05 is a Wednesday.
    fn home_at(hour: u32, minute: u32) -> FakeHome {
        FakeHome {
            now: Utc.with_ymd_and_hms(2024, 6, 5, hour, minute, 30).unwrap(),
            ..FakeHome::default()
        }
    }

    #[tokio::test]
    async fn should_hold_when_every_comparison_holds() {
        let devices = FakeDevices::default();
        let home = FakeHome::default();
        let evaluator = ConditionEvaluator::new(&devices, &home);
        let mut ctx = context();
        ctx.record_value("thermo-temperature", Some(22.0));

        let params = OnlyContinueIf {
            conditions: vec![
                by_variable("last_value", Operator::Greater, 20.0),
                by_variable("thermo-temperature", Operator::LessOrEqual, 22.0),
            ],
        };
        assert!(evaluator.only_continue_if(&params, &ctx).await.unwrap());
    }

    #[tokio::test]
    async fn should_not_hold_when_one_comparison_fails() {
        let devices = FakeDevices::default();
        let home = FakeHome::default();
        let evaluator = ConditionEvaluator::new(&devices, &home);
        let mut ctx = context();
        ctx.record_value("thermo-temperature", Some(18.0));

        let params = OnlyContinueIf {
            conditions: vec![by_variable("last_value", Operator::Greater, 20.0)],
        };
        assert!(!evaluator.only_continue_if(&params, &ctx).await.unwrap());
    }

    #[tokio::test]
    async fn should_fail_on_missing_variable() {
        let devices = FakeDevices::default();
        let home = FakeHome::default();
        let evaluator = ConditionEvaluator::new(&devices, &home);

        let params = OnlyContinueIf {
            conditions: vec![by_variable("last_value", Operator::Equal, 1.0)],
        };
        let err = evaluator
            .only_continue_if(&params, &context())
            .await
            .unwrap_err();
        assert!(matches!(err, LaneError::ConditionEvaluation { .. }));
    }

    #[tokio::test]
    async fn should_compare_live_feature_value() {
        let devices = FakeDevices::with(vec![sensor("thermo", "thermo-temperature", Some(25.0))]);
        let home = FakeHome::default();
        let evaluator = ConditionEvaluator::new(&devices, &home);

        let params = OnlyContinueIf {
            conditions: vec![ValueCondition {
                variable: None,
                device_feature: Some("thermo-temperature".to_string()),
                operator: Operator::GreaterOrEqual,
                value: 25.0,
            }],
        };
        assert!(evaluator.only_continue_if(&params, &context()).await.unwrap());
    }

    #[tokio::test]
    async fn should_fail_on_unknown_feature() {
        let devices = FakeDevices::default();
        let home = FakeHome::default();
        let evaluator = ConditionEvaluator::new(&devices, &home);

        let params = OnlyContinueIf {
            conditions: vec![ValueCondition {
                variable: None,
                device_feature: Some("ghost".to_string()),
                operator: Operator::Equal,
                value: 1.0,
            }],
        };
        let err = evaluator
            .only_continue_if(&params, &context())
            .await
            .unwrap_err();
        assert!(matches!(err, LaneError::Device(DeviceError::NotFound { .. })));
    }

    #[test]
    fn should_check_simple_time_window() {
        let devices = FakeDevices::default();
        let home = home_at(10, 15);
        let evaluator = ConditionEvaluator::new(&devices, &home);

        assert!(evaluator.check_time(&window(Some("10:15"), Some("11:00"), vec![])).unwrap());
        assert!(!evaluator.check_time(&window(Some("09:00"), Some("10:15"), vec![])).unwrap());
        assert!(evaluator.check_time(&window(None, Some("12:00"), vec![])).unwrap());
        assert!(!evaluator.check_time(&window(Some("12:00"), None, vec![])).unwrap());
    }

    #[test]
    fn should_wrap_time_window_past_midnight() {
        let devices = FakeDevices::default();
        let late = home_at(23, 30);
        let early = home_at(5, 59);
        let noon = home_at(12, 0);
        let overnight = window(Some("22:00"), Some("06:00"), vec![]);

        assert!(ConditionEvaluator::new(&devices, &late).check_time(&overnight).unwrap());
        assert!(ConditionEvaluator::new(&devices, &early).check_time(&overnight).unwrap());
        assert!(!ConditionEvaluator::new(&devices, &noon).check_time(&overnight).unwrap());
    }

    #[test]
    fn should_check_day_of_week() {
        let devices = FakeDevices::default();
        let home = home_at(8, 0);
        let evaluator = ConditionEvaluator::new(&devices, &home);

        assert!(evaluator.check_time(&window(None, None, vec![DayOfWeek::Wednesday])).unwrap());
        assert!(
            !evaluator
                .check_time(&window(None, None, vec![DayOfWeek::Saturday, DayOfWeek::Sunday]))
                .unwrap()
        );
    }

    #[tokio::test]
    async fn should_compare_alarm_mode() {
        let devices = FakeDevices::default();
        let mut home = FakeHome::default();
        home.alarm.insert("main".to_string(), AlarmMode::Armed);
        let evaluator = ConditionEvaluator::new(&devices, &home);

        let armed = HouseAlarm {
            house: "main".to_string(),
            alarm_mode: AlarmMode::Armed,
        };
        let disarmed = HouseAlarm {
            alarm_mode: AlarmMode::Disarmed,
            ..armed.clone()
        };
        assert!(evaluator.alarm_mode_is(&armed).await.unwrap());
        assert!(!evaluator.alarm_mode_is(&disarmed).await.unwrap());
    }

    #[tokio::test]
    async fn should_fail_on_unknown_house() {
        let devices = FakeDevices::default();
        let home = FakeHome::default();
        let evaluator = ConditionEvaluator::new(&devices, &home);

        let err = evaluator
            .alarm_mode_is(&HouseAlarm {
                house: "cabin".to_string(),
                alarm_mode: AlarmMode::Armed,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LaneError::ConditionEvaluation { condition: ActionKind::AlarmCheckAlarmMode, .. }
        ));
    }

    #[tokio::test]
    async fn should_check_house_presence_both_ways() {
        let devices = FakeDevices::default();
        let mut home = FakeHome::default();
        home.empty_houses.insert("main".to_string());
        let evaluator = ConditionEvaluator::new(&devices, &home);
        let main = HouseTarget {
            house: "main".to_string(),
        };

        assert!(evaluator.house_is_empty(&main, true).await.unwrap());
        assert!(!evaluator.house_is_empty(&main, false).await.unwrap());
    }

    #[tokio::test]
    async fn should_match_running_calendar_event() {
        let devices = FakeDevices::default();
        let now = Utc.with_ymd_and_hms(2024, 6, 5, 10, 0, 0).unwrap();
        let home = FakeHome {
            calendar_events: vec![CalendarEvent {
                calendar: "work".to_string(),
                name: "Remote day".to_string(),
                start: now,
                end: now,
            }],
            ..FakeHome::default()
        };
        let evaluator = ConditionEvaluator::new(&devices, &home);

        let params = CalendarEventRunning {
            calendars: vec!["work".to_string()],
            calendar_event_name_comparator: NameComparator::Contains,
            calendar_event_name: Some("remote".to_string()),
        };
        assert!(evaluator.calendar_event_running(&params).await.unwrap());

        let other_calendar = CalendarEventRunning {
            calendars: vec!["family".to_string()],
            ..params
        };
        assert!(!evaluator.calendar_event_running(&other_calendar).await.unwrap());
    }

    #[tokio::test]
    async fn should_fail_when_calendar_is_unreachable() {
        let devices = FakeDevices::default();
        let home = FakeHome {
            unreachable: true,
            ..FakeHome::default()
        };
        let evaluator = ConditionEvaluator::new(&devices, &home);

        let params = CalendarEventRunning {
            calendars: vec!["work".to_string()],
            calendar_event_name_comparator: NameComparator::HasAnyName,
            calendar_event_name: None,
        };
        assert!(matches!(
            evaluator.calendar_event_running(&params).await,
            Err(LaneError::ConditionEvaluation { .. })
        ));
    }

    #[tokio::test]
    async fn should_compare_grid_signals() {
        let devices = FakeDevices::default();
        let home = FakeHome {
            ecowatt: EcowattStatus::Warning,
            tempo_tomorrow: TempoStatus {
                color: Some(TempoColor::Red),
                peak_hour: true,
            },
            ..FakeHome::default()
        };
        let evaluator = ConditionEvaluator::new(&devices, &home);

        assert!(
            evaluator
                .ecowatt(&EcowattCondition {
                    ecowatt_network_status: EcowattStatus::Warning
                })
                .await
                .unwrap()
        );
        assert!(
            evaluator
                .edf_tempo(&EdfTempoCondition {
                    edf_tempo_day: TempoDay::Tomorrow,
                    edf_tempo_peak_day_type: TempoDayType::Red,
                    edf_tempo_peak_hour_type: Some(TempoHourType::PeakHour),
                })
                .await
                .unwrap()
        );
        assert!(
            !evaluator
                .edf_tempo(&EdfTempoCondition {
                    edf_tempo_day: TempoDay::Today,
                    edf_tempo_peak_day_type: TempoDayType::Red,
                    edf_tempo_peak_hour_type: None,
                })
                .await
                .unwrap()
        );
    }
}
