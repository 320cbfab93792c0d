//! Service definition composer
//!
//! Builds the catalog entry of one service from its built-in definition, an
//! optional operator replacement and an optional list of operator plans.

use std::collections::{BTreeMap, HashSet};

use serde_json::Map;
use strata_domain::{
    Plan, Schema, ServiceDefinition, Value, VariableType, value_to_template_string,
};

use crate::error::{ApplicationError, ApplicationResult, FieldViolation, SchemaError};

/// Key under which a plan may nest its properties, as plan documents do.
const SERVICE_PROPERTIES: &str = "service_properties";

/// Composes a service definition.
///
/// A non-empty `operator_override_json` replaces the default definition
/// wholesale. A non-empty `user_plans_json` is validated against
/// `plan_variable_schema` and appended to the plan list without
/// deduplication.
///
/// # Errors
/// Returns `ApplicationError::Decode` for malformed documents and
/// `ApplicationError::Schema` listing every invalid user plan field.
pub fn compose(
    default_definition_json: &str,
    operator_override_json: &str,
    user_plans_json: &str,
    plan_variable_schema: &Schema,
) -> ApplicationResult<ServiceDefinition> {
    let mut definition = if is_blank(operator_override_json) {
        decode_definition(default_definition_json, "service definition")?
    } else {
        decode_definition(operator_override_json, "service definition")?
    };

    let user_plans = decode_user_plans(user_plans_json, plan_variable_schema)?;
    definition.plans.extend(user_plans);

    warn_on_duplicate_ids(&definition);
    tracing::info!(
        "Composed service {:?} with {} plan(s)",
        definition.name,
        definition.plans.len()
    );

    Ok(definition)
}

/// Decodes one service definition document.
///
/// # Errors
/// Returns `ApplicationError::Decode` naming `what` if the document is not a
/// JSON object of the expected shape.
pub fn decode_definition(json: &str, what: &str) -> ApplicationResult<ServiceDefinition> {
    serde_json::from_str(json).map_err(|e| ApplicationError::decode(what, e))
}

/// Decodes and validates an operator-supplied plan list.
///
/// Each plan needs a non-empty `id` and `name`, every required schema field,
/// and correctly typed values for every declared field it carries. Undeclared
/// keys are kept as plan properties.
///
/// # Errors
/// Returns `ApplicationError::Decode` if the document is not a JSON array of
/// objects, or `ApplicationError::Schema` with every violation of every plan.
pub fn decode_user_plans(json: &str, schema: &Schema) -> ApplicationResult<Vec<Plan>> {
    if is_blank(json) {
        return Ok(Vec::new());
    }

    let raw: Vec<Map<String, Value>> =
        serde_json::from_str(json).map_err(|e| ApplicationError::decode("user-defined plans", e))?;

    let violations: Vec<FieldViolation> = raw
        .iter()
        .enumerate()
        .flat_map(|(index, plan)| validate_plan(index, plan, schema))
        .collect();
    SchemaError::check(violations)?;

    Ok(raw.into_iter().map(into_plan).collect())
}

/// Finds the first plan with the id.
///
/// # Errors
/// Returns `ApplicationError::NotFound` if no plan carries the id.
pub fn find_plan<'a>(definition: &'a ServiceDefinition, id: &str) -> ApplicationResult<&'a Plan> {
    definition
        .plan_by_id(id)
        .ok_or_else(|| ApplicationError::NotFound(format!("Plan ID {id:?} could not be found")))
}

fn validate_plan(index: usize, plan: &Map<String, Value>, schema: &Schema) -> Vec<FieldViolation> {
    let field = |name: &str| format!("plans[{index}].{name}");
    let mut violations = Vec::new();

    for key in ["id", "name"] {
        match plan.get(key) {
            None | Some(Value::Null) => violations.push(FieldViolation::missing(field(key))),
            Some(Value::String(s)) if s.trim().is_empty() => {
                violations.push(FieldViolation::invalid(field(key), "must not be blank"));
            }
            Some(Value::String(_)) => {}
            Some(_) => {
                violations.push(FieldViolation::type_mismatch(field(key), VariableType::String));
            }
        }
    }

    for (key, expected) in [
        ("free", VariableType::Boolean),
        (SERVICE_PROPERTIES, VariableType::Object),
    ] {
        match plan.get(key) {
            None | Some(Value::Null) => {}
            Some(value) if expected.accepts(value) => {}
            Some(_) => violations.push(FieldViolation::type_mismatch(field(key), expected)),
        }
    }

    for var in schema {
        match plan.get(&var.name) {
            Some(value) if !var.var_type.accepts(value) => {
                violations.push(FieldViolation::type_mismatch(field(&var.name), var.var_type));
            }
            Some(_) => {}
            None if var.required => violations.push(FieldViolation::missing(field(&var.name))),
            None => {}
        }
    }

    violations
}

fn into_plan(mut raw: Map<String, Value>) -> Plan {
    let mut take_string = |key: &str| {
        raw.remove(key)
            .map(|v| value_to_template_string(&v))
            .unwrap_or_default()
    };

    let id = take_string("id");
    let name = take_string("name");
    let description = take_string("description");
    let free = raw.remove("free").and_then(|v| v.as_bool());
    let nested = match raw.remove(SERVICE_PROPERTIES) {
        Some(Value::Object(nested)) => nested,
        _ => Map::new(),
    };

    // Whatever is left over becomes a plan property; nested keys take precedence.
    let properties: BTreeMap<String, String> = raw
        .into_iter()
        .chain(nested)
        .map(|(key, value)| (key, value_to_template_string(&value)))
        .collect();

    Plan {
        id,
        name,
        description,
        free,
        properties,
    }
}

fn warn_on_duplicate_ids(definition: &ServiceDefinition) {
    let mut seen = HashSet::new();
    for id in definition.plan_ids() {
        if !seen.insert(id) {
            tracing::warn!(
                "Duplicate plan id {:?} in service {:?}; lookups return the first match",
                id,
                definition.name
            );
        }
    }
}

fn is_blank(json: &str) -> bool {
    json.trim().is_empty()
}
