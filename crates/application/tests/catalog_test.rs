//! Integration tests for catalog composition through operator settings
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::BTreeSet;

use pretty_assertions::assert_eq;

use strata_application::{ApplicationError, BrokerService};
use strata_domain::{BrokerSettings, Schema, VariableSpec};

fn plan_ids(plans: &[strata_domain::Plan]) -> BTreeSet<String> {
    plans.iter().map(|p| p.id.clone()).collect()
}

fn ids(expected: &[&str]) -> BTreeSet<String> {
    expected.iter().map(ToString::to_string).collect()
}

fn plans_service() -> BrokerService {
    let mut service = BrokerService::new(
        "left-handed-smoke-sifter",
        r#"{"id":"abcd-efgh-ijkl", "name":"lhss"}"#,
    );
    service.plan_variables = Schema::new(vec![VariableSpec::string("instances").required()]);
    service
}

#[test]
fn test_user_defined_plans() {
    let cases: &[(&str, Option<&str>, &[&str], bool)] = &[
        ("default-no-plans", None, &[], false),
        (
            "single-plan",
            Some(r#"[{"id":"aaa","name":"aaa","instances":"3"}]"#),
            &["aaa"],
            false,
        ),
        ("bad-json", Some("42"), &[], true),
        (
            "multiple-plans",
            Some(concat!(
                r#"[{"id":"aaa","name":"aaa","instances":"3"},"#,
                r#"{"id":"bbb","name":"bbb","instances":"3"}]"#
            )),
            &["aaa", "bbb"],
            false,
        ),
        ("missing-name", Some(r#"[{"id":"aaa","instances":"3"}]"#), &[], true),
        ("missing-id", Some(r#"[{"name":"aaa","instances":"3"}]"#), &[], true),
        ("missing-instances", Some(r#"[{"name":"aaa","id":"aaa"}]"#), &[], true),
    ];

    let service = plans_service();
    for &(name, value, expected, expect_error) in cases {
        let mut settings = BrokerSettings::new();
        if let Some(value) = value {
            settings.set(service.user_defined_plans_property(), value);
        }

        match service.user_defined_plans(&settings) {
            Ok(plans) => {
                assert!(!expect_error, "{name}: expected an error");
                assert_eq!(plan_ids(&plans), ids(expected), "{name}");
            }
            Err(err) => assert!(expect_error, "{name}: unexpected error {err}"),
        }
    }
}

#[test]
fn test_missing_plan_fields_are_all_reported() {
    let service = plans_service();
    let settings = BrokerSettings::new().with(
        service.user_defined_plans_property(),
        r#"[{"name":"aaa"},{"id":"bbb","name":"bbb","instances":3}]"#,
    );

    let err = service.user_defined_plans(&settings).unwrap_err();
    let ApplicationError::Schema(schema_err) = err else {
        panic!("expected schema error");
    };
    assert_eq!(
        schema_err.fields(),
        vec!["plans[0].id", "plans[0].instances", "plans[1].instances"]
    );
}

#[test]
fn test_catalog_entry() {
    let custom_definition = r#"{"id":"abcd-efgh-ijkl", "plans":[{"id":"zzz","name":"zzz"}]}"#;
    let custom_plans = r#"[{"id":"aaa","name":"aaa"},{"id":"bbb","name":"bbb"}]"#;

    let cases: &[(&str, Option<&str>, Option<&str>, &[&str], bool)] = &[
        ("no-customization", None, None, &[], false),
        ("custom-definition", Some(custom_definition), None, &["zzz"], false),
        ("custom-plans", None, Some(custom_plans), &["aaa", "bbb"], false),
        (
            "custom-plans-and-definition",
            Some(custom_definition),
            Some(custom_plans),
            &["aaa", "bbb", "zzz"],
            false,
        ),
        ("bad-definition-json", Some("333"), None, &[], true),
        ("bad-plan-json", None, Some("333"), &[], true),
    ];

    let service = BrokerService::new("left-handed-smoke-sifter", r#"{"id":"abcd-efgh-ijkl"}"#);
    for &(name, definition, plans, expected, expect_error) in cases {
        let mut settings = BrokerSettings::new();
        if let Some(definition) = definition {
            settings.set(service.definition_property(), definition);
        }
        if let Some(plans) = plans {
            settings.set(service.user_defined_plans_property(), plans);
        }

        match service.catalog_entry(&settings) {
            Ok(entry) => {
                assert!(!expect_error, "{name}: expected an error");
                assert_eq!(entry.id, "abcd-efgh-ijkl", "{name}");
                assert_eq!(plan_ids(&entry.plans), ids(expected), "{name}");
            }
            Err(err) => {
                assert!(expect_error, "{name}: unexpected error {err}");
                assert!(err.is_decode(), "{name}: {err}");
            }
        }
    }
}

#[test]
fn test_bad_definition_names_the_service() {
    let service = BrokerService::new("left-handed-smoke-sifter", r#"{"id":"abcd-efgh-ijkl"}"#);
    let settings = BrokerSettings::new().with(service.definition_property(), "nil");

    let err = service.catalog_entry(&settings).unwrap_err();
    assert!(
        err.to_string()
            .starts_with(r#"Error parsing service definition for "left-handed-smoke-sifter": "#),
        "{err}"
    );
}

#[test]
fn test_get_plan_by_id() {
    let service = BrokerService::new(
        "left-handed-smoke-sifter",
        r#"{"id":"abcd-efgh-ijkl", "plans": [{"id": "builtin-plan", "name": "Builtin!"}]}"#,
    );
    let settings = BrokerSettings::new().with(
        service.user_defined_plans_property(),
        r#"[{"id":"custom-plan", "name": "Custom!"}]"#,
    );

    assert_eq!(
        service.get_plan_by_id(&settings, "builtin-plan").unwrap().name,
        "Builtin!"
    );
    assert_eq!(
        service.get_plan_by_id(&settings, "custom-plan").unwrap().name,
        "Custom!"
    );

    let err = service.get_plan_by_id(&settings, "missing-plan").unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), r#"Plan ID "missing-plan" could not be found"#);
}

#[test]
fn test_plan_properties_feed_provisioning() {
    let mut service = BrokerService::new(
        "google-spanner",
        concat!(
            r#"{"id":"spanner-id", "plans": [{"id": "builtin", "name": "Builtin", "#,
            r#""service_properties": {"num_nodes": "1"}}]}"#
        ),
    );
    service.provision_input_variables = Schema::from_input_names(["num_nodes"]);

    let settings = BrokerSettings::new();
    let plan = service.get_plan_by_id(&settings, "builtin").unwrap();
    let vars = service
        .provision_variables("id", r#"{"num_nodes":"5"}"#, &plan, &settings)
        .unwrap();

    assert_eq!(vars.get_str("num_nodes").as_deref(), Some("1"));
}
