//! Device — a physical or virtual thing exposing one or more features.
//!
//! The engine never owns devices. It reads a snapshot from the device
//! manager and asks it to write feature values.

use serde::{Deserialize, Serialize};

/// What a feature controls or measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureCategory {
    Light,
    Switch,
    TemperatureSensor,
    HumiditySensor,
    MotionSensor,
    Shutter,
    Other,
}

impl std::fmt::Display for FeatureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Light => f.write_str("light"),
            Self::Switch => f.write_str("switch"),
            Self::TemperatureSensor => f.write_str("temperature-sensor"),
            Self::HumiditySensor => f.write_str("humidity-sensor"),
            Self::MotionSensor => f.write_str("motion-sensor"),
            Self::Shutter => f.write_str("shutter"),
            Self::Other => f.write_str("other"),
        }
    }
}

/// The kind of value a feature carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureType {
    /// `0` (off) or `1` (on).
    Binary,
    Brightness,
    Decimal,
    Integer,
}

/// One readable/writable value of a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceFeature {
    pub selector: String,
    pub name: String,
    pub category: FeatureCategory,
    #[serde(rename = "type")]
    pub feature_type: FeatureType,
    pub read_only: bool,
    /// Last value reported by the device, if any.
    pub last_value: Option<f64>,
}

impl DeviceFeature {
    /// Whether the feature is a binary feature currently reporting "on".
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.feature_type == FeatureType::Binary && self.last_value.is_some_and(|v| v >= 1.0)
    }
}

/// A device as exposed by the device manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub selector: String,
    pub name: String,
    pub features: Vec<DeviceFeature>,
}

impl Device {
    /// Find the first writable binary feature of the given category.
    ///
    /// Lights and switches are driven through this feature.
    #[must_use]
    pub fn binary_feature(&self, category: FeatureCategory) -> Option<&DeviceFeature> {
        self.features.iter().find(|f| {
            f.category == category && f.feature_type == FeatureType::Binary && !f.read_only
        })
    }

    /// Find a feature by its selector.
    #[must_use]
    pub fn feature(&self, selector: &str) -> Option<&DeviceFeature> {
        self.features.iter().find(|f| f.selector == selector)
    }
}
