//! Broker service
//!
//! Ties one service's built-in definition and variable schemas to the
//! operator settings, and exposes catalog and provisioning operations.

use strata_domain::settings::{
    DEFINITION_SUFFIX, ENABLED_SUFFIX, PLANS_SUFFIX, PROVISION_DEFAULTS_SUFFIX, WHITELIST_SUFFIX,
};
use strata_domain::{
    BrokerSettings, OverlaySet, Plan, Schema, ServiceDefinition, Value, ValueMap,
    VariableContext, service_property,
};

use crate::catalog::{compose, decode_definition, decode_user_plans, find_plan};
use crate::error::{ApplicationError, ApplicationResult};
use crate::resolver::ContextResolver;

/// Constant exposing the instance id to expressions.
pub const INSTANCE_ID_CONSTANT: &str = "request.instance_id";
/// Constant exposing the plan id to expressions.
pub const PLAN_ID_CONSTANT: &str = "request.plan_id";
/// Constant exposing the service name to expressions.
pub const SERVICE_NAME_CONSTANT: &str = "request.service_name";

/// A service offered by the broker, with its schemas and built-in catalog entry.
#[derive(Debug, Clone, Default)]
pub struct BrokerService {
    /// Service name, used to build setting keys.
    pub name: String,

    /// Built-in service definition as JSON.
    pub default_service_definition: String,

    /// Roles allowed when the operator does not configure a whitelist.
    pub default_role_whitelist: Vec<String>,

    /// Fields that operator-defined plans may or must carry.
    pub plan_variables: Schema,

    /// Variables accepted at provision time, in evaluation order.
    pub provision_input_variables: Schema,

    /// Variables derived after the input variables are resolved.
    pub provision_computed_variables: Schema,
}

impl BrokerService {
    /// Creates a service with a name and a built-in definition.
    #[must_use]
    pub fn new(name: impl Into<String>, default_service_definition: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_service_definition: default_service_definition.into(),
            ..Self::default()
        }
    }

    /// Setting key of the enable flag.
    #[must_use]
    pub fn enabled_property(&self) -> String {
        service_property(&self.name, ENABLED_SUFFIX)
    }

    /// Setting key of the definition override.
    #[must_use]
    pub fn definition_property(&self) -> String {
        service_property(&self.name, DEFINITION_SUFFIX)
    }

    /// Setting key of the operator plan list.
    #[must_use]
    pub fn user_defined_plans_property(&self) -> String {
        service_property(&self.name, PLANS_SUFFIX)
    }

    /// Setting key of the role whitelist.
    #[must_use]
    pub fn role_whitelist_property(&self) -> String {
        service_property(&self.name, WHITELIST_SUFFIX)
    }

    /// Setting key of the operator provision defaults.
    #[must_use]
    pub fn provision_default_override_property(&self) -> String {
        service_property(&self.name, PROVISION_DEFAULTS_SUFFIX)
    }

    /// Environment variable name used by packaged deployments for custom plans.
    ///
    /// `google-spanner` becomes `SPANNER_CUSTOM_PLANS`.
    #[must_use]
    pub fn tile_user_defined_plans_variable(&self) -> String {
        let short = self.name.strip_prefix("google-").unwrap_or(&self.name);
        format!("{}_CUSTOM_PLANS", short.to_uppercase().replace('-', "_"))
    }

    /// Whether the operator enabled the service. Enabled unless set otherwise.
    #[must_use]
    pub fn is_enabled(&self, settings: &BrokerSettings) -> bool {
        settings.get_bool(&self.enabled_property()).unwrap_or(true)
    }

    /// Whether the service ships a default role whitelist.
    #[must_use]
    pub const fn is_role_whitelist_enabled(&self) -> bool {
        !self.default_role_whitelist.is_empty()
    }

    /// The configured role whitelist, or the default one when the setting is blank.
    #[must_use]
    pub fn role_whitelist(&self, settings: &BrokerSettings) -> Vec<String> {
        match settings.get_str(&self.role_whitelist_property()) {
            Some(raw) if !raw.trim().is_empty() => raw
                .split(',')
                .map(str::trim)
                .filter(|role| !role.is_empty())
                .map(ToString::to_string)
                .collect(),
            _ => self.default_role_whitelist.clone(),
        }
    }

    /// The service definition: the operator override if set, the built-in one otherwise.
    ///
    /// # Errors
    /// Returns `ApplicationError::Decode` naming the service if the chosen
    /// document is malformed.
    pub fn service_definition(
        &self,
        settings: &BrokerSettings,
    ) -> ApplicationResult<ServiceDefinition> {
        let json = settings
            .get_str(&self.definition_property())
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| self.default_service_definition.clone());

        decode_definition(&json, "service definition").map_err(|e| self.attribute(e))
    }

    /// The operator-defined plans, validated against `plan_variables`.
    ///
    /// # Errors
    /// Returns `ApplicationError::Decode` or `ApplicationError::Schema`.
    pub fn user_defined_plans(&self, settings: &BrokerSettings) -> ApplicationResult<Vec<Plan>> {
        let json = settings
            .get_str(&self.user_defined_plans_property())
            .unwrap_or_default();

        decode_user_plans(&json, &self.plan_variables).map_err(|e| self.attribute(e))
    }

    /// The full catalog entry: definition plus operator plans.
    ///
    /// # Errors
    /// See [`compose`].
    pub fn catalog_entry(&self, settings: &BrokerSettings) -> ApplicationResult<ServiceDefinition> {
        let definition_override = settings
            .get_str(&self.definition_property())
            .unwrap_or_default();
        let user_plans = settings
            .get_str(&self.user_defined_plans_property())
            .unwrap_or_default();

        compose(
            &self.default_service_definition,
            &definition_override,
            &user_plans,
            &self.plan_variables,
        )
        .map_err(|e| self.attribute(e))
    }

    /// Finds a plan of the catalog entry by id.
    ///
    /// # Errors
    /// Returns `ApplicationError::NotFound` if no plan matches, or any
    /// catalog composition error.
    pub fn get_plan_by_id(
        &self,
        settings: &BrokerSettings,
        plan_id: &str,
    ) -> ApplicationResult<Plan> {
        let catalog = self.catalog_entry(settings)?;
        find_plan(&catalog, plan_id).cloned()
    }

    /// Resolves the provisioning variables of a new instance.
    ///
    /// Overlays, lowest precedence first: the operator provision defaults
    /// setting, the raw request parameters, the plan properties. The request
    /// identifiers are available to expressions as `request.*` constants.
    ///
    /// # Errors
    /// Returns `ApplicationError::Decode` for malformed defaults or
    /// parameters, or any resolution error.
    pub fn provision_variables(
        &self,
        instance_id: &str,
        raw_parameters: &str,
        plan: &Plan,
        settings: &BrokerSettings,
    ) -> ApplicationResult<VariableContext> {
        let operator_defaults = self
            .provision_defaults(settings)
            .map_err(|e| self.attribute(e))?;
        let user_parameters =
            decode_object(raw_parameters, "provision parameters").map_err(|e| self.attribute(e))?;
        let plan_properties = plan.properties_overlay().values().clone();

        let constants = ValueMap::from([
            (INSTANCE_ID_CONSTANT.to_string(), Value::from(instance_id)),
            (PLAN_ID_CONSTANT.to_string(), Value::from(plan.id.as_str())),
            (SERVICE_NAME_CONSTANT.to_string(), Value::from(self.name.as_str())),
        ]);

        tracing::debug!(
            "Resolving provision variables for instance {} of {} on plan {:?}",
            instance_id,
            self.name,
            plan.id
        );

        let overlays = OverlaySet::new()
            .with_operator_defaults(operator_defaults)
            .with_user_parameters(user_parameters)
            .with_plan_properties(plan_properties);

        ContextResolver::new(
            &self.provision_input_variables,
            &self.provision_computed_variables,
        )
        .with_constants(constants)
        .resolve(&overlays)
        .map_err(|e| self.attribute(e))
    }

    /// Decodes the operator provision defaults, given as JSON text or as a structured value.
    fn provision_defaults(&self, settings: &BrokerSettings) -> ApplicationResult<ValueMap> {
        match settings.get(&self.provision_default_override_property()) {
            Some(Value::String(json)) => decode_object(json, "provision defaults"),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| ApplicationError::decode("provision defaults", e)),
            None => Ok(ValueMap::new()),
        }
    }

    /// Names this service in decode errors.
    fn attribute(&self, error: ApplicationError) -> ApplicationError {
        match error {
            ApplicationError::Decode { what, source } => ApplicationError::Decode {
                what: format!("{what} for {:?}", self.name),
                source,
            },
            other => other,
        }
    }
}

/// Decodes a JSON object, treating a blank document as empty.
fn decode_object(json: &str, what: &str) -> ApplicationResult<ValueMap> {
    if json.trim().is_empty() {
        return Ok(ValueMap::new());
    }
    serde_json::from_str(json).map_err(|e| ApplicationError::decode(what, e))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn sifter() -> BrokerService {
        BrokerService::new("left-handed-smoke-sifter", r#"{"id":"abcd-efgh-ijkl"}"#)
    }

    #[test]
    fn test_property_names() {
        let service = sifter();
        assert_eq!(service.enabled_property(), "service.left-handed-smoke-sifter.enabled");
        assert_eq!(service.definition_property(), "service.left-handed-smoke-sifter.definition");
        assert_eq!(service.user_defined_plans_property(), "service.left-handed-smoke-sifter.plans");
        assert_eq!(service.role_whitelist_property(), "service.left-handed-smoke-sifter.whitelist");
        assert_eq!(
            service.provision_default_override_property(),
            "service.left-handed-smoke-sifter.provision.defaults"
        );
    }

    #[test]
    fn test_tile_variable() {
        let service = BrokerService::new("google-spanner", "{}");
        assert_eq!(service.tile_user_defined_plans_variable(), "SPANNER_CUSTOM_PLANS");

        let service = BrokerService::new("cloud-sql-mysql", "{}");
        assert_eq!(service.tile_user_defined_plans_variable(), "CLOUD_SQL_MYSQL_CUSTOM_PLANS");
    }

    #[test]
    fn test_is_enabled() {
        let service = sifter();
        assert!(service.is_enabled(&BrokerSettings::new()));
        let enabled = BrokerSettings::new().with(service.enabled_property(), true);
        assert!(service.is_enabled(&enabled));
        let disabled = BrokerSettings::new().with(service.enabled_property(), false);
        assert!(!service.is_enabled(&disabled));
    }

    #[test]
    fn test_role_whitelist() {
        let mut service = BrokerService::new("my-service", "{}");
        service.default_role_whitelist = vec!["a".into(), "b".into(), "c".into()];
        assert!(service.is_role_whitelist_enabled());

        let blank = BrokerSettings::new().with(service.role_whitelist_property(), "");
        assert_eq!(service.role_whitelist(&blank), vec!["a", "b", "c"]);

        let custom = BrokerSettings::new().with(service.role_whitelist_property(), "x,y,z");
        assert_eq!(service.role_whitelist(&custom), vec!["x", "y", "z"]);

        service.default_role_whitelist.clear();
        assert!(!service.is_role_whitelist_enabled());
    }

    #[test]
    fn test_service_definition_override() {
        let service = sifter();
        let defaults = BrokerSettings::new();
        assert_eq!(service.service_definition(&defaults).unwrap().id, "abcd-efgh-ijkl");

        let settings =
            BrokerSettings::new().with(service.definition_property(), r#"{"id":"override-id"}"#);
        assert_eq!(service.service_definition(&settings).unwrap().id, "override-id");
    }

    #[test]
    fn test_service_definition_bad_value_names_service() {
        let service = sifter();
        let settings = BrokerSettings::new().with(service.definition_property(), "nil");
        let err = service.service_definition(&settings).unwrap_err();
        let expected = r#"Error parsing service definition for "left-handed-smoke-sifter": "#;
        assert!(err.to_string().starts_with(expected), "{err}");
    }

    #[test]
    fn test_provision_decode_errors_name_service() {
        let service = sifter();
        let plan = Plan::new("p", "P");

        let err = service
            .provision_variables("id", "{not json", &plan, &BrokerSettings::new())
            .unwrap_err();
        let expected = r#"Error parsing provision parameters for "left-handed-smoke-sifter": "#;
        assert!(err.to_string().starts_with(expected), "{err}");

        let settings =
            BrokerSettings::new().with(service.provision_default_override_property(), "[1, 2]");
        let err = service
            .provision_variables("id", "", &plan, &settings)
            .unwrap_err();
        let expected = r#"Error parsing provision defaults for "left-handed-smoke-sifter": "#;
        assert!(err.to_string().starts_with(expected), "{err}");
    }

    #[test]
    fn test_decode_object_blank() {
        assert!(decode_object("  ", "x").unwrap().is_empty());
        assert!(decode_object("[1]", "x").unwrap_err().is_decode());
    }
}
