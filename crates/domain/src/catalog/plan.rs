//! Service plan

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::overlay::{Overlay, OverlayKind};

/// A plan offered by a service.
///
/// `properties` are fixed values attached to the plan; they become the
/// highest-precedence overlay when provisioning against it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Plan identifier, unique by convention within a service.
    #[serde(default)]
    pub id: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Human readable description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Whether the plan is free of charge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free: Option<bool>,

    /// Fixed plan properties.
    #[serde(default, alias = "service_properties", skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl Plan {
    /// Creates a plan with an id and a name.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a fixed property.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Returns the plan properties as the plan overlay.
    #[must_use]
    pub fn properties_overlay(&self) -> Overlay {
        Overlay::from_strings(
            OverlayKind::PlanProperties,
            self.properties.iter().map(|(k, v)| (k.clone(), v.clone())),
        )
    }
}
