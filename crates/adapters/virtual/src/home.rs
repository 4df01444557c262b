//! Simulated home status behind the [`HomeStatus`] port.

use std::collections::{BTreeSet, HashMap};

use tokio::sync::{RwLock, broadcast};

use scenehub_app::ports::HomeStatus;
use scenehub_domain::error::SceneHubError;
use scenehub_domain::event::{Event, EventType};
use scenehub_domain::home::{
    AlarmMode, CalendarEvent, EcowattStatus, TempoColor, TempoDay, TempoStatus,
};
struct State {
    alarms: HashMap<String, AlarmMode>,
    /// Users currently seen at home, per house.
    presence: HashMap<String, BTreeSet<String>>,
    calendar: Vec<CalendarEvent>,
    ecowatt: EcowattStatus,
    tempo_today: TempoStatus,
    tempo_tomorrow: TempoStatus,
}

impl Default for State {
    fn default() -> Self {
        Self {
            alarms: HashMap::new(),
            presence: HashMap::new(),
            calendar: Vec::new(),
            ecowatt: EcowattStatus::Ok,
            tempo_today: TempoStatus {
                color: Some(TempoColor::Blue),
                peak_hour: false,
            },
            tempo_tomorrow: TempoStatus {
                color: None,
                peak_hour: false,
            },
        }
    }
}

/// In-memory home status.
///
/// Unknown houses are disarmed and empty.
#[derive(Default)]
pub struct VirtualHome {
    state: RwLock<State>,
}

impl VirtualHome {
    pub async fn set_alarm_mode(&self, house: &str, mode: AlarmMode) {
        self.state
            .write()
            .await
            .alarms
            .insert(house.to_string(), mode);
    }

    pub async fn set_seen_at_home(&self, user: &str, house: &str) {
        self.state
            .write()
            .await
            .presence
            .entry(house.to_string())
            .or_default()
            .insert(user.to_string());
    }

    pub async fn set_out_of_home(&self, user: &str, house: &str) {
        if let Some(users) = self.state.write().await.presence.get_mut(house) {
            users.remove(user);
        }
    }

    pub async fn add_calendar_event(&self, event: CalendarEvent) {
        self.state.write().await.calendar.push(event);
    }

    pub async fn set_ecowatt(&self, status: EcowattStatus) {
        self.state.write().await.ecowatt = status;
    }

    pub async fn set_tempo(&self, day: TempoDay, status: TempoStatus) {
        let mut state = self.state.write().await;
        match day {
            TempoDay::Today => state.tempo_today = status,
            TempoDay::Tomorrow => state.tempo_tomorrow = status,
        }
    }

    /// Apply a bus event emitted by a scene. Returns whether the event changed anything.
    pub async fn apply(&self, event: &Event) -> bool {
        let field = |name: &str| event.data.get(name).and_then(|v| v.as_str());
        match event.event_type {
            EventType::AlarmSetMode => {
                let mode = event
                    .data
                    .get("alarm_mode")
                    .and_then(|v| serde_json::from_value::<AlarmMode>(v.clone()).ok());
                let (Some(house), Some(mode)) = (field("house"), mode) else {
                    tracing::warn!(event = %event.event_type, "ignoring malformed alarm event");
                    return false;
                };
                self.set_alarm_mode(house, mode).await;
                true
            }
            EventType::UserSeenAtHome | EventType::UserLeftHome => {
                let (Some(user), Some(house)) = (field("user"), field("house")) else {
                    tracing::warn!(event = %event.event_type, "ignoring malformed presence event");
                    return false;
                };
                if event.event_type == EventType::UserSeenAtHome {
                    self.set_seen_at_home(user, house).await;
                } else {
                    self.set_out_of_home(user, house).await;
                }
                true
            }
            _ => false,
        }
    }

    /// Apply bus events until the bus closes.
    pub async fn follow(&self, mut events: broadcast::Receiver<Event>) {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if self.apply(&event).await {
                        tracing::debug!(event = %event.event_type, "virtual home updated");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "virtual home lagged behind the event bus");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}

impl HomeStatus for VirtualHome {
    async fn alarm_mode(&self, house: &str) -> Result<AlarmMode, SceneHubError> {
        Ok(self
            .state
            .read()
            .await
            .alarms
            .get(house)
            .copied()
            .unwrap_or(AlarmMode::Disarmed))
    }

    async fn is_house_empty(&self, house: &str) -> Result<bool, SceneHubError> {
        Ok(self
            .state
            .read()
            .await
            .presence
            .get(house)
            .is_none_or(BTreeSet::is_empty))
    }

    async fn running_calendar_events(
        &self,
        calendars: &[String],
    ) -> Result<Vec<CalendarEvent>, SceneHubError> {
        let now = self.now();
        Ok(self
            .state
            .read()
            .await
            .calendar
            .iter()
            .filter(|e| calendars.contains(&e.calendar) && e.start <= now && now < e.end)
            .cloned()
            .collect())
    }

    async fn ecowatt_status(&self) -> Result<EcowattStatus, SceneHubError> {
        Ok(self.state.read().await.ecowatt)
    }

    async fn edf_tempo(&self, day: TempoDay) -> Result<TempoStatus, SceneHubError> {
        let state = self.state.read().await;
        Ok(match day {
            TempoDay::Today => state.tempo_today,
            TempoDay::Tomorrow => state.tempo_tomorrow,
        })
    }
}
