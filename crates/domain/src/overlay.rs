//! Overlay sources
//!
//! An overlay is one independently obtained set of literal variable values.
//! Overlays are resolved in order of precedence (highest wins):
//! 1. Plan properties (fixed on the selected service plan)
//! 2. User parameters (supplied with the request)
//! 3. Operator defaults (configured by the operator)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Plain mapping from variable name to literal value.
pub type ValueMap = BTreeMap<String, Value>;

/// Identifies which source an overlay came from.
///
/// Variants are ordered from lowest to highest precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayKind {
    /// Operator-level defaults (lowest precedence).
    OperatorDefaults,
    /// End-user request parameters.
    UserParameters,
    /// Properties of the selected plan (highest precedence).
    PlanProperties,
}

/// One named source of literal values with a fixed precedence rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    kind: OverlayKind,
    values: ValueMap,
}

impl Overlay {
    /// Creates an empty overlay of the given kind.
    #[must_use]
    pub const fn new(kind: OverlayKind) -> Self {
        Self {
            kind,
            values: ValueMap::new(),
        }
    }

    /// Creates an overlay from already-typed values.
    #[must_use]
    pub const fn from_values(kind: OverlayKind, values: ValueMap) -> Self {
        Self { kind, values }
    }

    /// Creates an overlay from a string map, as carried by plan properties.
    #[must_use]
    pub fn from_strings<I, K, V>(kind: OverlayKind, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            kind,
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), Value::String(v.into())))
                .collect(),
        }
    }

    /// Returns the overlay kind.
    #[must_use]
    pub const fn kind(&self) -> OverlayKind {
        self.kind
    }

    /// Returns the raw values.
    #[must_use]
    pub const fn values(&self) -> &ValueMap {
        &self.values
    }
}

/// The three overlays of one resolution call.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlaySet {
    /// Operator defaults (lowest precedence).
    pub operator_defaults: Overlay,
    /// User request parameters.
    pub user_parameters: Overlay,
    /// Plan properties (highest precedence).
    pub plan_properties: Overlay,
}

impl OverlaySet {
    /// Creates a set of three empty overlays.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            operator_defaults: Overlay::new(OverlayKind::OperatorDefaults),
            user_parameters: Overlay::new(OverlayKind::UserParameters),
            plan_properties: Overlay::new(OverlayKind::PlanProperties),
        }
    }

    /// Sets the operator defaults overlay.
    #[must_use]
    pub fn with_operator_defaults(mut self, values: ValueMap) -> Self {
        self.operator_defaults = Overlay::from_values(OverlayKind::OperatorDefaults, values);
        self
    }

    /// Sets the user parameters overlay.
    #[must_use]
    pub fn with_user_parameters(mut self, values: ValueMap) -> Self {
        self.user_parameters = Overlay::from_values(OverlayKind::UserParameters, values);
        self
    }

    /// Sets the plan properties overlay.
    #[must_use]
    pub fn with_plan_properties(mut self, values: ValueMap) -> Self {
        self.plan_properties = Overlay::from_values(OverlayKind::PlanProperties, values);
        self
    }

    /// Returns the overlays lowest precedence first.
    #[must_use]
    pub const fn in_precedence_order(&self) -> [&Overlay; 3] {
        [
            &self.operator_defaults,
            &self.user_parameters,
            &self.plan_properties,
        ]
    }
}

impl Default for OverlaySet {
    fn default() -> Self {
        Self::new()
    }
}

/// Collapses a value to the string form substituted into templates.
///
/// Strings are used verbatim, `null` becomes the empty string and every
/// other value is rendered as compact JSON.
#[must_use]
pub fn value_to_template_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
