//! Device manager port — the live device/feature state and command dispatch.
//!
//! The device manager is owned by the integrations layer. Retries, locking
//! and serialization of writes, if any, are its business; the engine calls
//! it once per device action.

use std::future::Future;

use scenehub_domain::device::{Device, DeviceFeature};
use scenehub_domain::error::SceneHubError;

/// Read device snapshots and write feature values.
pub trait DeviceManager {
    /// Get a device by its selector, `None` if no live device matches.
    fn get_by_selector(
        &self,
        selector: &str,
    ) -> impl Future<Output = Result<Option<Device>, SceneHubError>> + Send;

    /// Get a feature by its selector, across all devices.
    fn get_feature(
        &self,
        selector: &str,
    ) -> impl Future<Output = Result<Option<DeviceFeature>, SceneHubError>> + Send;

    /// Write a new value to a feature.
    ///
    /// A failed write is reported as [`SceneHubError::Device`].
    fn set_value(
        &self,
        feature: &DeviceFeature,
        value: f64,
    ) -> impl Future<Output = Result<(), SceneHubError>> + Send;
}

impl<T: DeviceManager + Send + Sync> DeviceManager for std::sync::Arc<T> {
    fn get_by_selector(
        &self,
        selector: &str,
    ) -> impl Future<Output = Result<Option<Device>, SceneHubError>> + Send {
        (**self).get_by_selector(selector)
    }

    fn get_feature(
        &self,
        selector: &str,
    ) -> impl Future<Output = Result<Option<DeviceFeature>, SceneHubError>> + Send {
        (**self).get_feature(selector)
    }

    fn set_value(
        &self,
        feature: &DeviceFeature,
        value: f64,
    ) -> impl Future<Output = Result<(), SceneHubError>> + Send {
        (**self).set_value(feature, value)
    }
}
