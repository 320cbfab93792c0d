//! Single variable declaration

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DomainError, DomainResult};

/// Primitive type tag attached to a declared variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    /// Free-form text (default).
    #[default]
    String,
    /// Any JSON number.
    Number,
    /// A whole JSON number.
    Integer,
    /// `true` or `false`.
    Boolean,
    /// A JSON object.
    Object,
}

impl VariableType {
    /// Returns the lowercase tag used in serialized schemas and messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Object => "object",
        }
    }

    /// Returns true if a literal value structurally matches this type.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Boolean => value.is_boolean(),
            Self::Object => value.is_object(),
        }
    }

    /// Converts an evaluated template string into a value of this type.
    ///
    /// # Errors
    /// Returns `DomainError::Coercion` if the text is not a valid
    /// representation of the type.
    pub fn coerce(self, raw: String) -> DomainResult<Value> {
        let fail = |raw: &str| DomainError::Coercion {
            expected: self.as_str().to_string(),
            value: raw.to_string(),
        };

        match self {
            Self::String => Ok(Value::String(raw)),
            Self::Integer => raw
                .trim()
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| fail(&raw)),
            Self::Number => {
                let trimmed = raw.trim();
                if let Ok(int) = trimmed.parse::<i64>() {
                    return Ok(Value::from(int));
                }
                trimmed
                    .parse::<f64>()
                    .ok()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| fail(&raw))
            }
            Self::Boolean => raw
                .trim()
                .parse::<bool>()
                .map(Value::Bool)
                .map_err(|_| fail(&raw)),
            Self::Object => match serde_json::from_str::<Value>(&raw) {
                Ok(value @ Value::Object(_)) => Ok(value),
                _ => Err(fail(&raw)),
            },
        }
    }
}

impl std::fmt::Display for VariableType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared variable: name, type, required flag and default expression.
///
/// The same declaration shape is used for input variables and for computed
/// variables. `overwrite` only matters for the computed pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableSpec {
    /// Variable name, unique within its schema.
    pub name: String,

    /// Declared primitive type.
    #[serde(rename = "type", default)]
    pub var_type: VariableType,

    /// Whether the variable must end up with a value.
    #[serde(default)]
    pub required: bool,

    /// Default template expression, evaluated when no overlay supplies the value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// Computed pass only: replace an existing value instead of filling a gap.
    #[serde(default)]
    pub overwrite: bool,

    /// Human readable description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub details: String,
}

impl VariableSpec {
    /// Creates an optional variable with no default.
    #[must_use]
    pub fn new(name: impl Into<String>, var_type: VariableType) -> Self {
        Self {
            name: name.into(),
            var_type,
            required: false,
            default: None,
            overwrite: false,
            details: String::new(),
        }
    }

    /// Creates a string variable, the most common shape.
    #[must_use]
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, VariableType::String)
    }

    /// Marks the variable as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the default expression.
    #[must_use]
    pub fn with_default(mut self, expression: impl Into<String>) -> Self {
        self.default = Some(expression.into());
        self
    }

    /// Sets the overwrite policy used by the computed pass.
    #[must_use]
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    /// Returns the default expression if it is present and non-empty.
    #[must_use]
    pub fn default_expression(&self) -> Option<&str> {
        self.default.as_deref().filter(|expr| !expr.is_empty())
    }
}
