//! Scene engine — runs scenes as concurrent lanes.
//!
//! A start request arrives on the event bus and is picked up by the
//! [`TriggerListener`], which hands it to the [`SceneDispatcher`]. The
//! dispatcher loads the scene and spawns one lane per column. Each lane
//! resolves its actions through the [`registry`] and runs them in order with
//! its own [`ExecutionContext`]:
//!
//! - device actions go through the device manager port,
//! - conditions may end the lane early,
//! - `time.delay` suspends only its own lane,
//! - `scene.start` dispatches a nested scene and waits for it,
//! - everything else is emitted back onto the bus as an event.
//!
//! A scene that is already on the call stack is rejected with
//! [`DispatchError::CyclicScene`] so recursive scenes cannot loop forever.

mod conditions;
mod context;
mod device_adapter;
mod dispatcher;
mod error;
mod lane;
mod listener;
pub mod registry;
mod template;

#[cfg(test)]
pub(crate) mod fakes;

pub use conditions::ConditionEvaluator;
pub use context::{CallStack, ExecutionContext};
pub use device_adapter::{DeviceActionAdapter, SwitchCommand};
pub use dispatcher::{DispatchFuture, RunReport, SceneDispatcher, SceneRun};
pub use error::{DispatchError, LaneError, error_chain};
pub use lane::{AbortReason, LaneOutcome, LaneStatus};
pub use listener::TriggerListener;
pub use template::Templates;
