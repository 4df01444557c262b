//! Device action adapter — turns device actions into device manager calls.
//!
//! No retries here: one failed read or write faults the lane.

use scenehub_domain::device::FeatureCategory;
use scenehub_domain::error::{DeviceError, SceneHubError};
use scenehub_domain::scene::params::{GetValue, SetValue};

use crate::ports::DeviceManager;

use super::context::ExecutionContext;
use super::error::{LaneError, error_chain};
use super::template::Templates;

/// What a light or switch action does to the binary feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchCommand {
    On,
    Off,
    Toggle,
}

impl SwitchCommand {
    fn target_value(self, currently_on: bool) -> f64 {
        match self {
            Self::On => 1.0,
            Self::Off => 0.0,
            Self::Toggle if currently_on => 0.0,
            Self::Toggle => 1.0,
        }
    }
}

/// Borrowed view over the device manager for the duration of one action.
pub struct DeviceActionAdapter<'a, DM> {
    devices: &'a DM,
    templates: &'a Templates,
}

impl<'a, DM> DeviceActionAdapter<'a, DM>
where
    DM: DeviceManager + Sync,
{
    pub fn new(devices: &'a DM, templates: &'a Templates) -> Self {
        Self { devices, templates }
    }

    /// Drive the binary feature of `category` on every listed device, in order.
    ///
    /// # Errors
    ///
    /// Stops at the first device that is missing, lacks a writable binary
    /// feature of that category, or rejects the write.
    pub async fn switch(
        &self,
        devices: &[String],
        category: FeatureCategory,
        command: SwitchCommand,
    ) -> Result<(), LaneError> {
        for selector in devices {
            let device = self
                .devices
                .get_by_selector(selector)
                .await
                .map_err(|err| device_failure(selector, err))?
                .ok_or_else(|| DeviceError::NotFound {
                    selector: selector.clone(),
                })?;
            let feature =
                device
                    .binary_feature(category)
                    .ok_or_else(|| DeviceError::FeatureNotFound {
                        device: selector.clone(),
                        category: category.to_string(),
                    })?;
            let value = command.target_value(feature.is_on());
            tracing::debug!(device = %selector, feature = %feature.selector, value, "writing binary feature");
            self.devices
                .set_value(feature, value)
                .await
                .map_err(|err| device_failure(&feature.selector, err))?;
        }
        Ok(())
    }

    /// Read a feature's last value into the lane variables.
    ///
    /// # Errors
    ///
    /// Fails with [`DeviceError::NotFound`] if the feature is unknown.
    pub async fn get_value(
        &self,
        params: &GetValue,
        ctx: &mut ExecutionContext,
    ) -> Result<(), LaneError> {
        let feature = self
            .devices
            .get_feature(&params.device_feature)
            .await
            .map_err(|err| device_failure(&params.device_feature, err))?
            .ok_or_else(|| DeviceError::NotFound {
                selector: params.device_feature.clone(),
            })?;
        tracing::debug!(feature = %feature.selector, value = ?feature.last_value, "read feature value");
        ctx.record_value(&feature.selector, feature.last_value);
        Ok(())
    }

    /// Write a literal or evaluated value to a feature.
    ///
    /// # Errors
    ///
    /// Fails if the feature is unknown or read-only, if the expression does
    /// not evaluate to a number, or if the write fails.
    pub async fn set_value(
        &self,
        params: &SetValue,
        ctx: &ExecutionContext,
    ) -> Result<(), LaneError> {
        let value = match (&params.value, &params.evaluate_value) {
            (Some(value), _) => *value,
            (None, Some(expression)) => self.templates.evaluate_number(expression, ctx)?,
            (None, None) => {
                return Err(LaneError::InvalidParams {
                    action_type: "device.set-value".to_string(),
                    reason: "no value to write".to_string(),
                });
            }
        };
        let feature = self
            .devices
            .get_feature(&params.device_feature)
            .await
            .map_err(|err| device_failure(&params.device_feature, err))?
            .ok_or_else(|| DeviceError::NotFound {
                selector: params.device_feature.clone(),
            })?;
        if feature.read_only {
            return Err(DeviceError::Command {
                feature: feature.selector,
                reason: "feature is read-only".to_string(),
            }
            .into());
        }
        tracing::debug!(feature = %feature.selector, value, "writing feature value");
        self.devices
            .set_value(&feature, value)
            .await
            .map_err(|err| device_failure(&feature.selector, err))
    }
}

fn device_failure(target: &str, err: SceneHubError) -> LaneError {
    match err {
        SceneHubError::Device(err) => LaneError::Device(err),
        SceneHubError::NotFound(_) => LaneError::Device(DeviceError::NotFound {
            selector: target.to_string(),
        }),
        other => LaneError::Device(DeviceError::Command {
            feature: target.to_string(),
            reason: error_chain(&other),
        }),
    }
}
