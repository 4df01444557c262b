//! In-memory port implementations shared by the engine tests.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Mutex;

use tokio::time::Instant;

use scenehub_domain::device::{Device, DeviceFeature, FeatureCategory, FeatureType};
use scenehub_domain::error::{DeviceError, NotFoundError, SceneHubError};
use scenehub_domain::event::{Event, EventType};
use scenehub_domain::home::{
    AlarmMode, CalendarEvent, EcowattStatus, TempoColor, TempoDay, TempoStatus,
};
use scenehub_domain::scene::Scene;
use scenehub_domain::time::Timestamp;

use crate::ports::{DeviceManager, EventPublisher, HomeStatus, SceneQuery, SceneRepository};

// ── Scenes ─────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemorySceneRepo {
    store: Mutex<HashMap<String, Scene>>,
}

impl InMemorySceneRepo {
    pub fn with(scenes: Vec<Scene>) -> Self {
        let map = scenes
            .into_iter()
            .map(|s| (s.selector.clone(), s))
            .collect();
        Self {
            store: Mutex::new(map),
        }
    }

    pub fn last_executed(&self, selector: &str) -> Option<Timestamp> {
        self.store
            .lock()
            .unwrap()
            .get(selector)
            .and_then(|s| s.last_executed)
    }
}

impl SceneRepository for InMemorySceneRepo {
    fn create(&self, scene: Scene) -> impl Future<Output = Result<Scene, SceneHubError>> + Send {
        self.store
            .lock()
            .unwrap()
            .insert(scene.selector.clone(), scene.clone());
        async { Ok(scene) }
    }

    fn get_by_selector(
        &self,
        selector: &str,
    ) -> impl Future<Output = Result<Option<Scene>, SceneHubError>> + Send {
        let result = self.store.lock().unwrap().get(selector).cloned();
        async { Ok(result) }
    }

    fn get(
        &self,
        query: SceneQuery,
    ) -> impl Future<Output = Result<Vec<Scene>, SceneHubError>> + Send {
        let mut result: Vec<Scene> = self
            .store
            .lock()
            .unwrap()
            .values()
            .filter(|s| query.matches(s))
            .cloned()
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        async { Ok(result) }
    }

    fn update(&self, scene: Scene) -> impl Future<Output = Result<Scene, SceneHubError>> + Send {
        let mut store = self.store.lock().unwrap();
        let result = if store.contains_key(&scene.selector) {
            store.insert(scene.selector.clone(), scene.clone());
            Ok(scene)
        } else {
            Err(NotFoundError {
                entity: "Scene",
                id: scene.selector,
            }
            .into())
        };
        async { result }
    }

    fn delete(&self, selector: &str) -> impl Future<Output = Result<(), SceneHubError>> + Send {
        self.store.lock().unwrap().remove(selector);
        async { Ok(()) }
    }

    fn touch_last_executed(
        &self,
        selector: &str,
        at: Timestamp,
    ) -> impl Future<Output = Result<(), SceneHubError>> + Send {
        if let Some(scene) = self.store.lock().unwrap().get_mut(selector) {
            scene.last_executed = Some(at);
        }
        async { Ok(()) }
    }
}

// ── Devices ────────────────────────────────────────────────────────

fn feature(
    selector: String,
    category: FeatureCategory,
    feature_type: FeatureType,
    read_only: bool,
    last_value: Option<f64>,
) -> DeviceFeature {
    DeviceFeature {
        name: selector.clone(),
        selector,
        category,
        feature_type,
        read_only,
        last_value,
    }
}

fn binary_device(selector: &str, category: FeatureCategory, last_value: Option<f64>) -> Device {
    Device {
        selector: selector.to_string(),
        name: selector.to_string(),
        features: vec![feature(
            format!("{selector}-binary"),
            category,
            FeatureType::Binary,
            false,
            last_value,
        )],
    }
}

/// A light whose binary feature is `<selector>-binary`.
pub fn light(selector: &str, last_value: Option<f64>) -> Device {
    binary_device(selector, FeatureCategory::Light, last_value)
}

/// A switch whose binary feature is `<selector>-binary`.
pub fn switch(selector: &str, last_value: Option<f64>) -> Device {
    binary_device(selector, FeatureCategory::Switch, last_value)
}

/// A device with one read-only temperature feature.
pub fn sensor(selector: &str, feature_selector: &str, last_value: Option<f64>) -> Device {
    Device {
        selector: selector.to_string(),
        name: selector.to_string(),
        features: vec![feature(
            feature_selector.to_string(),
            FeatureCategory::TemperatureSensor,
            FeatureType::Decimal,
            true,
            last_value,
        )],
    }
}

/// One accepted write, stamped with the (possibly paused) tokio clock.
#[derive(Debug, Clone)]
pub struct Write {
    pub feature: String,
    pub value: f64,
    pub at: Instant,
}

#[derive(Default)]
pub struct FakeDevices {
    devices: Mutex<HashMap<String, Device>>,
    writes: Mutex<Vec<Write>>,
    failing: Mutex<HashSet<String>>,
}

impl FakeDevices {
    pub fn with(devices: Vec<Device>) -> Self {
        let map = devices
            .into_iter()
            .map(|d| (d.selector.clone(), d))
            .collect();
        Self {
            devices: Mutex::new(map),
            ..Self::default()
        }
    }

    pub fn fail_writes_to(&self, feature: &str) {
        self.failing.lock().unwrap().insert(feature.to_string());
    }

    pub fn writes(&self) -> Vec<Write> {
        self.writes.lock().unwrap().clone()
    }

    pub fn written(&self) -> Vec<(String, f64)> {
        self.writes()
            .into_iter()
            .map(|w| (w.feature, w.value))
            .collect()
    }

    pub fn written_to(&self, feature: &str) -> Option<Write> {
        self.writes().into_iter().find(|w| w.feature == feature)
    }
}

impl DeviceManager for FakeDevices {
    fn get_by_selector(
        &self,
        selector: &str,
    ) -> impl Future<Output = Result<Option<Device>, SceneHubError>> + Send {
        let result = self.devices.lock().unwrap().get(selector).cloned();
        async { Ok(result) }
    }

    fn get_feature(
        &self,
        selector: &str,
    ) -> impl Future<Output = Result<Option<DeviceFeature>, SceneHubError>> + Send {
        let result = self
            .devices
            .lock()
            .unwrap()
            .values()
            .find_map(|d| d.feature(selector).cloned());
        async { Ok(result) }
    }

    fn set_value(
        &self,
        feature: &DeviceFeature,
        value: f64,
    ) -> impl Future<Output = Result<(), SceneHubError>> + Send {
        let result = if self.failing.lock().unwrap().contains(&feature.selector) {
            Err(DeviceError::Command {
                feature: feature.selector.clone(),
                reason: "device unreachable".to_string(),
            }
            .into())
        } else {
            for device in self.devices.lock().unwrap().values_mut() {
                for f in &mut device.features {
                    if f.selector == feature.selector {
                        f.last_value = Some(value);
                    }
                }
            }
            self.writes.lock().unwrap().push(Write {
                feature: feature.selector.clone(),
                value,
                at: Instant::now(),
            });
            Ok(())
        };
        async { result }
    }
}

// ── Events ─────────────────────────────────────────────────────────

#[derive(Default)]
pub struct SpyPublisher {
    events: Mutex<Vec<Event>>,
}

impl SpyPublisher {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn of_type(&self, event_type: EventType) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }
}

impl EventPublisher for SpyPublisher {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), SceneHubError>> + Send {
        self.events.lock().unwrap().push(event);
        async { Ok(()) }
    }
}

// ── Home ───────────────────────────────────────────────────────────

pub struct FakeHome {
    pub now: Timestamp,
    pub alarm: HashMap<String, AlarmMode>,
    pub empty_houses: HashSet<String>,
    pub calendar_events: Vec<CalendarEvent>,
    pub ecowatt: EcowattStatus,
    pub tempo_today: TempoStatus,
    pub tempo_tomorrow: TempoStatus,
    /// Every query fails, as if the backing service were unreachable.
    pub unreachable: bool,
}

impl Default for FakeHome {
    fn default() -> Self {
        Self {
            now: scenehub_domain::time::now(),
            alarm: HashMap::new(),
            empty_houses: HashSet::new(),
            calendar_events: Vec::new(),
            ecowatt: EcowattStatus::Ok,
            tempo_today: TempoStatus {
                color: Some(TempoColor::Blue),
                peak_hour: false,
            },
            tempo_tomorrow: TempoStatus {
                color: None,
                peak_hour: false,
            },
            unreachable: false,
        }
    }
}

impl FakeHome {
    fn check(&self) -> Result<(), SceneHubError> {
        if self.unreachable {
            return Err(SceneHubError::Storage("home status unreachable".into()));
        }
        Ok(())
    }
}

impl HomeStatus for FakeHome {
    fn now(&self) -> Timestamp {
        self.now
    }

    fn alarm_mode(
        &self,
        house: &str,
    ) -> impl Future<Output = Result<AlarmMode, SceneHubError>> + Send {
        let result = self.check().and_then(|()| {
            self.alarm.get(house).copied().ok_or_else(|| {
                NotFoundError {
                    entity: "House",
                    id: house.to_string(),
                }
                .into()
            })
        });
        async { result }
    }

    fn is_house_empty(&self, house: &str) -> impl Future<Output = Result<bool, SceneHubError>> + Send {
        let result = self.check().map(|()| self.empty_houses.contains(house));
        async { result }
    }

    fn running_calendar_events(
        &self,
        calendars: &[String],
    ) -> impl Future<Output = Result<Vec<CalendarEvent>, SceneHubError>> + Send {
        let result = self.check().map(|()| {
            self.calendar_events
                .iter()
                .filter(|e| calendars.contains(&e.calendar))
                .cloned()
                .collect()
        });
        async { result }
    }

    fn ecowatt_status(&self) -> impl Future<Output = Result<EcowattStatus, SceneHubError>> + Send {
        let result = self.check().map(|()| self.ecowatt);
        async { result }
    }

    fn edf_tempo(
        &self,
        day: TempoDay,
    ) -> impl Future<Output = Result<TempoStatus, SceneHubError>> + Send {
        let result = self.check().map(|()| match day {
            TempoDay::Today => self.tempo_today,
            TempoDay::Tomorrow => self.tempo_tomorrow,
        });
        async { result }
    }
}
