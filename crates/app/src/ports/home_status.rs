//! Home status port — external state that condition actions are checked against.

use std::future::Future;

use scenehub_domain::error::SceneHubError;
use scenehub_domain::home::{AlarmMode, CalendarEvent, EcowattStatus, TempoDay, TempoStatus};
use scenehub_domain::time::{self, Timestamp};

/// Read-only view of the house: clock, alarm, presence, calendars and grid signals.
pub trait HomeStatus {
    /// Current time. Overridden by tests to pin the clock.
    fn now(&self) -> Timestamp {
        time::now()
    }

    /// Alarm mode of a house.
    fn alarm_mode(
        &self,
        house: &str,
    ) -> impl Future<Output = Result<AlarmMode, SceneHubError>> + Send;

    /// Whether nobody is seen at home in a house.
    fn is_house_empty(&self, house: &str) -> impl Future<Output = Result<bool, SceneHubError>> + Send;

    /// Events currently running in any of the given calendars.
    fn running_calendar_events(
        &self,
        calendars: &[String],
    ) -> impl Future<Output = Result<Vec<CalendarEvent>, SceneHubError>> + Send;

    /// Current Ecowatt grid signal.
    fn ecowatt_status(&self) -> impl Future<Output = Result<EcowattStatus, SceneHubError>> + Send;

    /// EDF Tempo color and peak-hour flag for a day.
    fn edf_tempo(
        &self,
        day: TempoDay,
    ) -> impl Future<Output = Result<TempoStatus, SceneHubError>> + Send;
}

impl<T: HomeStatus + Send + Sync> HomeStatus for std::sync::Arc<T> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }

    fn alarm_mode(
        &self,
        house: &str,
    ) -> impl Future<Output = Result<AlarmMode, SceneHubError>> + Send {
        (**self).alarm_mode(house)
    }

    fn is_house_empty(&self, house: &str) -> impl Future<Output = Result<bool, SceneHubError>> + Send {
        (**self).is_house_empty(house)
    }

    fn running_calendar_events(
        &self,
        calendars: &[String],
    ) -> impl Future<Output = Result<Vec<CalendarEvent>, SceneHubError>> + Send {
        (**self).running_calendar_events(calendars)
    }

    fn ecowatt_status(&self) -> impl Future<Output = Result<EcowattStatus, SceneHubError>> + Send {
        (**self).ecowatt_status()
    }

    fn edf_tempo(
        &self,
        day: TempoDay,
    ) -> impl Future<Output = Result<TempoStatus, SceneHubError>> + Send {
        (**self).edf_tempo(day)
    }
}
