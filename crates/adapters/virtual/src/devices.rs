//! Simulated devices behind the [`DeviceManager`] port.

use std::collections::BTreeMap;

use tokio::sync::RwLock;

use scenehub_app::ports::DeviceManager;
use scenehub_domain::device::{Device, DeviceFeature, FeatureCategory, FeatureType};
use scenehub_domain::error::{DeviceError, SceneHubError};

fn feature(
    selector: &str,
    name: &str,
    category: FeatureCategory,
    feature_type: FeatureType,
    read_only: bool,
    last_value: f64,
) -> DeviceFeature {
    DeviceFeature {
        selector: selector.to_string(),
        name: name.to_string(),
        category,
        feature_type,
        read_only,
        last_value: Some(last_value),
    }
}

fn demo_devices() -> Vec<Device> {
    vec![
        Device {
            selector: "virtual-light".to_string(),
            name: "Virtual Light".to_string(),
            features: vec![
                feature(
                    "virtual-light-binary",
                    "On/Off",
                    FeatureCategory::Light,
                    FeatureType::Binary,
                    false,
                    0.0,
                ),
                feature(
                    "virtual-light-brightness",
                    "Brightness",
                    FeatureCategory::Light,
                    FeatureType::Brightness,
                    false,
                    100.0,
                ),
            ],
        },
        Device {
            selector: "virtual-switch".to_string(),
            name: "Virtual Switch".to_string(),
            features: vec![feature(
                "virtual-switch-binary",
                "On/Off",
                FeatureCategory::Switch,
                FeatureType::Binary,
                false,
                0.0,
            )],
        },
        Device {
            selector: "virtual-temperature-sensor".to_string(),
            name: "Virtual Temperature Sensor".to_string(),
            features: vec![feature(
                "virtual-temperature-sensor-temperature",
                "Temperature",
                FeatureCategory::TemperatureSensor,
                FeatureType::Decimal,
                true,
                21.5,
            )],
        },
    ]
}

/// In-memory device manager.
///
/// Writes are applied immediately and become the feature's `last_value`.
pub struct VirtualDeviceManager {
    devices: RwLock<BTreeMap<String, Device>>,
}

impl Default for VirtualDeviceManager {
    /// Seeded with the demo light, switch and temperature sensor.
    fn default() -> Self {
        Self::with_devices(demo_devices())
    }
}

impl VirtualDeviceManager {
    #[must_use]
    pub fn with_devices(devices: Vec<Device>) -> Self {
        let devices = devices
            .into_iter()
            .map(|device| (device.selector.clone(), device))
            .collect();
        Self {
            devices: RwLock::new(devices),
        }
    }

    /// Every device, ordered by selector.
    pub async fn devices(&self) -> Vec<Device> {
        self.devices.read().await.values().cloned().collect()
    }

    /// Simulate a reading reported by the device itself, read-only features included.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::NotFound`] if no device has this feature.
    pub async fn report(&self, feature: &str, value: f64) -> Result<(), DeviceError> {
        let mut devices = self.devices.write().await;
        let target = devices
            .values_mut()
            .flat_map(|device| device.features.iter_mut())
            .find(|f| f.selector == feature)
            .ok_or_else(|| DeviceError::NotFound {
                selector: feature.to_string(),
            })?;
        target.last_value = Some(value);
        Ok(())
    }
}

impl DeviceManager for VirtualDeviceManager {
    async fn get_by_selector(&self, selector: &str) -> Result<Option<Device>, SceneHubError> {
        Ok(self.devices.read().await.get(selector).cloned())
    }

    async fn get_feature(&self, selector: &str) -> Result<Option<DeviceFeature>, SceneHubError> {
        Ok(self
            .devices
            .read()
            .await
            .values()
            .find_map(|device| device.feature(selector).cloned()))
    }

    async fn set_value(&self, feature: &DeviceFeature, value: f64) -> Result<(), SceneHubError> {
        if feature.read_only {
            return Err(DeviceError::Command {
                feature: feature.selector.clone(),
                reason: "feature is read-only".to_string(),
            }
            .into());
        }
        self.report(&feature.selector, value).await?;
        tracing::debug!(feature = %feature.selector, value, "virtual feature updated");
        Ok(())
    }
}
