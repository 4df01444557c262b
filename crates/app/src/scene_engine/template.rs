//! Text templates and value expressions evaluated against a lane's variables.
//!
//! Uses Jinja syntax: `"Temperature is {{ last_value }}°C"` for templates and
//! `last_value + 1` for `evaluate_value` expressions.

use minijinja::value::ValueKind;
use minijinja::{Environment, Error, ErrorKind, Value};

use super::context::ExecutionContext;

/// Shared template environment; one per dispatcher.
pub struct Templates {
    env: Environment<'static>,
}

impl Default for Templates {
    fn default() -> Self {
        Self::new()
    }
}

impl Templates {
    #[must_use]
    pub fn new() -> Self {
        Self {
            env: Environment::new(),
        }
    }

    /// Render a template with the lane's variables in scope.
    ///
    /// Strings without template markers are returned untouched.
    ///
    /// # Errors
    ///
    /// Returns the template syntax or rendering error.
    pub fn render(&self, source: &str, ctx: &ExecutionContext) -> Result<String, Error> {
        if !source.contains("{{") && !source.contains("{%") {
            return Ok(source.to_string());
        }
        self.env.render_str(source, ctx.template_scope())
    }

    /// Evaluate an expression to a number.
    ///
    /// Booleans count as `0`/`1` so that `last_value == 0` can drive a binary feature.
    ///
    /// # Errors
    ///
    /// Returns a syntax error, or [`ErrorKind::InvalidOperation`] when the
    /// result is not a number (undefined variables included).
    pub fn evaluate_number(&self, expression: &str, ctx: &ExecutionContext) -> Result<f64, Error> {
        let compiled = self.env.compile_expression(expression)?;
        let value = compiled.eval(ctx.template_scope())?;
        to_number(&value).ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidOperation,
                format!("{expression:?} evaluated to {value}, not a number"),
            )
        })
    }
}

fn to_number(value: &Value) -> Option<f64> {
    match value.kind() {
        ValueKind::Bool => Some(if value.is_true() { 1.0 } else { 0.0 }),
        ValueKind::Number => f64::try_from(value.clone()).ok(),
        _ => None,
    }
}
