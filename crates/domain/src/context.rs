//! Resolved variable context

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::overlay::{ValueMap, value_to_template_string};

/// The fully resolved mapping produced by one resolution call.
///
/// It is built by the resolver and frozen once returned: there is no public
/// way to mutate it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct VariableContext {
    values: ValueMap,
}

impl VariableContext {
    /// Freezes a resolved map into a context.
    #[must_use]
    pub const fn from_resolved(values: ValueMap) -> Self {
        Self { values }
    }

    /// Gets a value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Gets a value in its template string form.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<String> {
        self.values.get(name).map(value_to_template_string)
    }

    /// Returns true if the name was resolved.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Returns the number of resolved variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing was resolved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates resolved entries in name order.
    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, String, Value> {
        self.values.iter()
    }

    /// Copies the context into a plain map.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, Value> {
        self.values.clone()
    }
}

impl<'a> IntoIterator for &'a VariableContext {
    type Item = (&'a String, &'a Value);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
