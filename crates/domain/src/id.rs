//! Runtime identifiers.
//!
//! Scenes, devices and features are addressed by selectors chosen by the
//! user. UUIDs only name things that exist at runtime: one dispatch of a
//! scene ([`RunId`]) and one bus message ([`EventId`]). A run id travels in
//! every status payload as a plain string so that an HTTP client holding a
//! start acknowledgement can pick its run out of the event stream.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! runtime_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        /// A fresh random id.
        impl Default for $name {
            fn default() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl $name {
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s).map(Self)
            }
        }
    };
}

runtime_id!(
    /// One dispatch of a scene: its lanes, and the lanes of nothing else.
    ///
    /// Nested `scene.start` actions get their own run id.
    RunId
);

runtime_id!(
    /// One message on the event bus.
    EventId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct StatusPayload {
        run_id: RunId,
        scene: String,
    }

    #[test]
    fn should_give_two_triggers_of_same_scene_distinct_run_ids() {
        assert_ne!(RunId::new(), RunId::new());
        assert_ne!(RunId::default(), RunId::default());
    }

    #[test]
    fn should_carry_run_id_as_plain_string_in_payloads() {
        let run_id = RunId::new();
        let payload = serde_json::json!({"run_id": run_id, "scene": "night"});
        assert_eq!(payload["run_id"], run_id.to_string());

        let status: StatusPayload = serde_json::from_value(payload).unwrap();
        assert_eq!(status.run_id, run_id);
        assert_eq!(status.scene, "night");
    }

    #[test]
    fn should_parse_run_id_taken_from_start_acknowledgement() {
        let run_id = RunId::new();
        let acknowledged = run_id.to_string();
        assert_eq!(acknowledged.parse::<RunId>().unwrap(), run_id);
    }

    #[test]
    fn should_reject_payload_with_malformed_run_id() {
        assert!("run-42".parse::<RunId>().is_err());
        let payload = serde_json::json!({"run_id": "run-42", "scene": "night"});
        assert!(serde_json::from_value::<StatusPayload>(payload).is_err());
    }
}
