//! Action — one step of a lane, as stored in the scene document.
//!
//! The stored form is deliberately loose (`type` + free parameters) so that a
//! scene document round-trips exactly and so that a stored action with an
//! unknown type can still be loaded; it is rejected when the lane resolves it.

use serde::{Deserialize, Serialize};

/// A stored action document: `{"type": "...", ...params}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

impl Action {
    /// Build an action from a type and a JSON object of parameters.
    ///
    /// Non-object `params` are ignored (the action carries no parameters).
    #[must_use]
    pub fn new(action_type: impl Into<String>, params: serde_json::Value) -> Self {
        let params = match params {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        Self {
            action_type: action_type.into(),
            params,
        }
    }

    /// Whether a parameter is present and not `null`.
    #[must_use]
    pub fn has_param(&self, key: &str) -> bool {
        self.params.get(key).is_some_and(|v| !v.is_null())
    }

    /// The full document, `type` included.
    #[must_use]
    pub fn to_document(&self) -> serde_json::Value {
        let mut map = serde_json::Map::with_capacity(self.params.len() + 1);
        map.insert(
            "type".to_string(),
            serde_json::Value::String(self.action_type.clone()),
        );
        for (key, value) in &self.params {
            map.insert(key.clone(), value.clone());
        }
        serde_json::Value::Object(map)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.action_type)
    }
}
