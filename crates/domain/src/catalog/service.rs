//! Service definition

use serde::{Deserialize, Serialize};

use super::plan::Plan;

/// A catalog entry: the service and the plans it offers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    /// Service identifier.
    #[serde(default)]
    pub id: String,

    /// Service name.
    #[serde(default)]
    pub name: String,

    /// Human readable description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Whether instances support bindings.
    #[serde(default)]
    pub bindable: bool,

    /// Whether instances may change plan after creation.
    #[serde(default)]
    pub plan_updateable: bool,

    /// Free-form catalog tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Offered plans. Ids are not deduplicated.
    #[serde(default)]
    pub plans: Vec<Plan>,
}

impl ServiceDefinition {
    /// Finds the first plan carrying the id.
    #[must_use]
    pub fn plan_by_id(&self, id: &str) -> Option<&Plan> {
        self.plans.iter().find(|plan| plan.id == id)
    }

    /// Returns every plan id in catalog order, duplicates included.
    #[must_use]
    pub fn plan_ids(&self) -> Vec<&str> {
        self.plans.iter().map(|plan| plan.id.as_str()).collect()
    }
}
