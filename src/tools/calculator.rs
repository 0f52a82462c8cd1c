//! Calculator tool
//!
//! Evaluates math expressions with the `meval` expression library.

use crate::core::{AssistantError, Result};

/// Tool name the model uses to request a calculation
pub const NAME: &str = "calculator";

/// Math expression evaluator
#[derive(Debug, Default)]
pub struct Calculator;

impl Calculator {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate an expression into a human-readable number
    pub fn evaluate(&self, expression: &str) -> Result<String> {
        let value = meval::eval_str(expression).map_err(|e| {
            AssistantError::tool(format!("invalid expression '{}': {}", expression, e))
        })?;

        if !value.is_finite() {
            return Err(AssistantError::tool(format!(
                "expression '{}' did not evaluate to a finite number",
                expression
            )));
        }

        Ok(format_number(value))
    }
}

/// Render integers without a trailing ".0"
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
