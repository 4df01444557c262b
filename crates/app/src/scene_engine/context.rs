//! Lane-scoped execution state: the variable bag and the scene call stack.

use std::fmt;

use serde_json::{Map, Value};

use scenehub_domain::id::RunId;

/// Key under which `device.get-value` stores the value it read.
pub const LAST_VALUE: &str = "last_value";
/// Object of every value read in the lane, keyed by feature selector.
pub const VALUES: &str = "values";

/// The scenes currently active in a lane's lineage, outermost first.
///
/// Immutable: [`push`](Self::push) returns an extended copy, so a nested
/// dispatch never alters the stack of the lane that started it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallStack(Vec<String>);

impl CallStack {
    /// Whether `selector` is already running in this lineage.
    #[must_use]
    pub fn contains(&self, selector: &str) -> bool {
        self.0.iter().any(|s| s == selector)
    }

    /// A new stack with `selector` on top.
    #[must_use]
    pub fn push(&self, selector: impl Into<String>) -> Self {
        let mut selectors = self.0.clone();
        selectors.push(selector.into());
        Self(selectors)
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn selectors(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for CallStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" > "))
    }
}

/// Per-lane context, created when the lane starts and dropped when it ends.
///
/// Never shared between lanes: each column of each dispatch gets its own.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub run_id: RunId,
    pub scene: String,
    pub column: usize,
    stack: CallStack,
    variables: Map<String, Value>,
}

impl ExecutionContext {
    #[must_use]
    pub fn new(run_id: RunId, scene: impl Into<String>, column: usize, stack: CallStack) -> Self {
        Self {
            run_id,
            scene: scene.into(),
            column,
            stack,
            variables: Map::new(),
        }
    }

    /// The call stack of this lane, current scene included.
    #[must_use]
    pub fn stack(&self) -> &CallStack {
        &self.stack
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// Resolve a variable by name, falling back to a value read from a
    /// feature with that selector.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.variables.get(name).or_else(|| {
            self.variables
                .get(VALUES)
                .and_then(Value::as_object)
                .and_then(|values| values.get(name))
        })
    }

    /// Store a value read from a feature. `None` (never reported) is stored as `null`.
    pub fn record_value(&mut self, feature: &str, value: Option<f64>) {
        let value = value.map_or(Value::Null, Value::from);
        self.variables.insert(LAST_VALUE.to_string(), value.clone());
        let values = self
            .variables
            .entry(VALUES)
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(values) = values {
            values.insert(feature.to_string(), value);
        }
    }

    /// Everything a template can see: the variables plus `scene`, `column` and `run_id`.
    #[must_use]
    pub fn template_scope(&self) -> Value {
        let mut scope = self.variables.clone();
        scope.insert("scene".to_string(), Value::from(self.scene.clone()));
        scope.insert("column".to_string(), Value::from(self.column));
        scope.insert("run_id".to_string(), Value::from(self.run_id.to_string()));
        Value::Object(scope)
    }
}
