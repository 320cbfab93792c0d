//! Two-phase resolution engine
//!
//! Phase 1 walks the input schema in declaration order and fills every
//! variable no overlay supplied from its default expression. Phase 2 walks
//! the computed schema against the same context and applies each variable's
//! overwrite-or-fill policy.

use strata_domain::{OverlaySet, Schema, Value, ValueMap, VariableContext, VariableSpec};

use super::merge::merge_overlay_set;
use crate::error::{ApplicationResult, FieldViolation, SchemaError};
use crate::expression::Evaluator;

/// Resolves overlays against an input schema and a computed schema.
///
/// A resolver borrows its schemas and owns nothing mutable, so one instance
/// can serve concurrent calls.
#[derive(Debug, Clone)]
pub struct ContextResolver<'a> {
    input: &'a Schema,
    computed: &'a Schema,
    constants: ValueMap,
}

impl<'a> ContextResolver<'a> {
    /// Creates a resolver over the two schemas.
    #[must_use]
    pub fn new(input: &'a Schema, computed: &'a Schema) -> Self {
        Self {
            input,
            computed,
            constants: ValueMap::new(),
        }
    }

    /// Adds constants visible to expressions but never written to the result.
    #[must_use]
    pub fn with_constants(mut self, constants: ValueMap) -> Self {
        self.constants = constants;
        self
    }

    /// Resolves the overlays into a frozen context.
    ///
    /// # Errors
    /// Returns `ApplicationError::Domain` if either schema is malformed,
    /// `ApplicationError::Schema` with every missing required variable and
    /// every mistyped user parameter, or the first evaluation failure.
    /// No partial context is returned.
    pub fn resolve(&self, overlays: &OverlaySet) -> ApplicationResult<VariableContext> {
        self.input.validate()?;
        self.computed.validate()?;

        let mut context = merge_overlay_set(overlays);
        self.validate(&context, overlays.user_parameters.values())?;

        tracing::debug!(
            "Resolving {} input and {} computed variables over {} overlay values",
            self.input.len(),
            self.computed.len(),
            context.len()
        );

        for var in self.input {
            if context.contains_key(&var.name) {
                tracing::debug!(variable = %var.name, "keeping overlay value");
                continue;
            }
            let Some(expression) = var.default_expression() else {
                continue;
            };
            let value = self.evaluate(var, expression, &context)?;
            tracing::debug!(variable = %var.name, "resolved from default");
            context.insert(var.name.clone(), value);
        }

        for var in self.computed {
            let Some(expression) = var.default_expression() else {
                if var.required && !context.contains_key(&var.name) {
                    return Err(SchemaError {
                        violations: vec![FieldViolation::missing(&var.name)],
                    }
                    .into());
                }
                continue;
            };

            // Evaluated even when discarded, so a broken expression always fails.
            let value = self.evaluate(var, expression, &context)?;
            if var.overwrite || !context.contains_key(&var.name) {
                tracing::debug!(variable = %var.name, overwrite = var.overwrite, "computed");
                context.insert(var.name.clone(), value);
            }
        }

        Ok(VariableContext::from_resolved(context))
    }

    /// Collects every structural violation before anything is evaluated.
    fn validate(&self, merged: &ValueMap, user_parameters: &ValueMap) -> Result<(), SchemaError> {
        let mut violations: Vec<FieldViolation> = self
            .input
            .iter()
            .filter(|var| {
                var.required
                    && !merged.contains_key(&var.name)
                    && var.default_expression().is_none()
            })
            .map(|var| FieldViolation::missing(&var.name))
            .collect();

        for (name, value) in user_parameters {
            if let Some(var) = self.input.get(name)
                && !var.var_type.accepts(value)
            {
                violations.push(FieldViolation::type_mismatch(name, var.var_type));
            }
        }

        SchemaError::check(violations)
    }

    fn evaluate(
        &self,
        var: &VariableSpec,
        expression: &str,
        context: &ValueMap,
    ) -> ApplicationResult<Value> {
        let raw = Evaluator::new(context)
            .with_constants(&self.constants)
            .evaluate(expression)?;

        var.var_type.coerce(raw).map_err(|_| {
            SchemaError {
                violations: vec![FieldViolation::type_mismatch(&var.name, var.var_type)],
            }
            .into()
        })
    }
}

/// Resolves the three overlays against the two schemas.
///
/// # Errors
/// See [`ContextResolver::resolve`].
pub fn resolve(
    input_schema: &Schema,
    computed_schema: &Schema,
    operator_override: &ValueMap,
    user_params: &ValueMap,
    plan_properties: &ValueMap,
) -> ApplicationResult<VariableContext> {
    let overlays = OverlaySet::new()
        .with_operator_defaults(operator_override.clone())
        .with_user_parameters(user_params.clone())
        .with_plan_properties(plan_properties.clone());

    ContextResolver::new(input_schema, computed_schema).resolve(&overlays)
}
