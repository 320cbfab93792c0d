//! Ordered variable schema
//!
//! Declaration order is evaluation order: a default expression may only
//! reference variables declared before it.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::spec::{VariableSpec, VariableType};
use crate::error::{DomainError, DomainResult};

/// An ordered, immutable list of variable declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    variables: Vec<VariableSpec>,
}

impl Schema {
    /// Creates a schema from declarations in evaluation order.
    #[must_use]
    pub const fn new(variables: Vec<VariableSpec>) -> Self {
        Self { variables }
    }

    /// Creates an empty schema.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            variables: Vec::new(),
        }
    }

    /// Seeds a schema of optional string variables from externally discovered
    /// input names, such as the inputs of an infrastructure module.
    #[must_use]
    pub fn from_input_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            names
                .into_iter()
                .map(|name| VariableSpec::new(name, VariableType::String))
                .collect(),
        )
    }

    /// Iterates declarations in order.
    pub fn iter(&self) -> std::slice::Iter<'_, VariableSpec> {
        self.variables.iter()
    }

    /// Finds a declaration by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&VariableSpec> {
        self.variables.iter().find(|v| v.name == name)
    }

    /// Returns the number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Returns true if nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Checks that every name is well formed and declared once.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidSchema` listing every offending declaration.
    pub fn validate(&self) -> DomainResult<()> {
        let mut seen = HashSet::new();
        let mut errors = Vec::new();

        for var in &self.variables {
            if !is_valid_variable_name(&var.name) {
                errors.push(DomainError::InvalidVariableName(var.name.clone()));
            } else if !seen.insert(var.name.as_str()) {
                errors.push(DomainError::DuplicateVariable(var.name.clone()));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::InvalidSchema(errors))
        }
    }
}

impl<'a> IntoIterator for &'a Schema {
    type Item = &'a VariableSpec;
    type IntoIter = std::slice::Iter<'a, VariableSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.variables.iter()
    }
}

impl FromIterator<VariableSpec> for Schema {
    fn from_iter<T: IntoIterator<Item = VariableSpec>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Validates a variable name.
/// Valid names start with a letter or underscore, followed by letters, digits,
/// underscores, hyphens or dots (`request.instance_id`, `maybe-missing`).
#[must_use]
pub fn is_valid_variable_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }

    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn sample() -> Schema {
        Schema::new(vec![
            VariableSpec::string("location").with_default("us"),
            VariableSpec::string("name")
                .required()
                .with_default("name-${location}"),
        ])
    }

    #[test]
    fn test_order_is_preserved() {
        let schema = sample();
        let names: Vec<&str> = schema.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["location", "name"]);
        assert!(sample().get("name").unwrap().required);
    }

    #[test]
    fn test_get() {
        let schema = sample();
        assert_eq!(schema.get("name").unwrap().default.as_deref(), Some("name-${location}"));
        assert!(schema.get("missing").is_none());
    }

    #[test]
    fn test_validate_ok() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_validate_reports_all_problems() {
        let schema = Schema::new(vec![
            VariableSpec::string("a"),
            VariableSpec::string("a"),
            VariableSpec::string(""),
            VariableSpec::string("9lives"),
        ]);

        let DomainError::InvalidSchema(errors) = schema.validate().unwrap_err() else {
            panic!("expected InvalidSchema");
        };
        assert_eq!(
            errors,
            vec![
                DomainError::DuplicateVariable("a".into()),
                DomainError::InvalidVariableName(String::new()),
                DomainError::InvalidVariableName("9lives".into()),
            ]
        );
    }

    #[test]
    fn test_from_input_names() {
        let schema = Schema::from_input_names(["instance_name", "region"]);
        assert_eq!(schema.len(), 2);
        assert!(schema.iter().all(|v| !v.required && v.default.is_none()));
    }

    #[test]
    fn test_valid_variable_names() {
        assert!(is_valid_variable_name("location"));
        assert!(is_valid_variable_name("maybe-missing"));
        assert!(is_valid_variable_name("request.instance_id"));
        assert!(is_valid_variable_name("_private"));
        assert!(!is_valid_variable_name(""));
        assert!(!is_valid_variable_name("-start"));
        assert!(!is_valid_variable_name("has space"));
    }

    #[test]
    fn test_deserialize_transparent() {
        let schema: Schema =
            serde_json::from_str(r#"[{"name":"instances","type":"string","required":true}]"#)
                .unwrap();
        let instances = schema.get("instances").unwrap();
        assert!(instances.required);
        assert_eq!(instances.var_type, VariableType::String);
    }
}
