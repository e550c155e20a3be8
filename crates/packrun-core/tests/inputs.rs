// crates/packrun-core/tests/inputs.rs
// ============================================================================
// Module: Input Resolution Unit Tests
// Description: Defaults, required inputs, constraints, and unknown keys.
// Purpose: Validate the input resolver against the declared schema rules.
// ============================================================================

//! Input resolver tests covering resolution order and every constraint kind.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use packrun_core::InputConstraints;
use packrun_core::InputSpec;
use packrun_core::InputType;
use packrun_core::OutcomeSpec;
use packrun_core::PackDefinition;
use packrun_core::PackMetadata;
use packrun_core::StepSpec;
use packrun_core::runtime::resolve_inputs;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Test Fixtures
// ============================================================================

fn input(name: &str, input_type: InputType) -> InputSpec {
    InputSpec {
        name: name.to_string(),
        input_type,
        required: false,
        default: None,
        constraints: InputConstraints::default(),
    }
}

fn definition(inputs: Vec<InputSpec>) -> PackDefinition {
    PackDefinition {
        metadata: PackMetadata {
            id: "demo-pack".to_string(),
            name: "Demo Pack".to_string(),
            version: "1.0.0".to_string(),
            description: None,
        },
        inputs,
        approval: None,
        steps: vec![StepSpec {
            id: "step-1".to_string(),
            name: None,
            action: "noop".to_string(),
            parameters: None,
            mutating: None,
            timeout_seconds: 0,
            max_retries: 0,
            approval: None,
            rollback: None,
            expected_outcomes: Vec::new(),
        }],
        expected_outcomes: vec![OutcomeSpec {
            description: "done".to_string(),
            success_criteria: "step succeeds".to_string(),
            step_id: None,
        }],
    }
}

fn supplied(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), value.clone()))
        .collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn supplied_value_wins_over_default() {
    let mut target = input("target", InputType::String);
    target.default = Some(json!("fallback"));
    let def = definition(vec![target]);
    let resolved = resolve_inputs(&def, &supplied(&[("target", json!("primary"))])).unwrap();
    assert_eq!(resolved.get("target"), Some(&json!("primary")));
}

#[test]
fn default_is_deep_copied_when_caller_omits() {
    let mut servers = input("servers", InputType::Array);
    servers.default = Some(json!(["a", "b"]));
    let def = definition(vec![servers]);
    let resolved = resolve_inputs(&def, &Map::new()).unwrap();
    assert_eq!(resolved.get("servers"), Some(&json!(["a", "b"])));
}

#[test]
fn missing_required_input_is_an_error() {
    let mut target = input("target", InputType::String);
    target.required = true;
    let def = definition(vec![target]);
    let err = resolve_inputs(&def, &Map::new()).unwrap_err();
    assert_eq!(err.issues, vec!["input \"target\" is required".to_string()]);
}

#[test]
fn optional_input_without_default_is_skipped() {
    let def = definition(vec![input("target", InputType::String)]);
    let resolved = resolve_inputs(&def, &Map::new()).unwrap();
    assert!(resolved.is_empty());
}

#[test]
fn unknown_keys_are_rejected() {
    let def = definition(vec![input("target", InputType::String)]);
    let err = resolve_inputs(
        &def,
        &supplied(&[("target", json!("x")), ("mystery", json!(1))]),
    )
    .unwrap_err();
    assert_eq!(err.issues, vec!["unknown input \"mystery\"".to_string()]);
}

#[test]
fn declared_type_is_enforced() {
    let def = definition(vec![input("count", InputType::Integer)]);
    let err = resolve_inputs(&def, &supplied(&[("count", json!("three"))])).unwrap_err();
    assert_eq!(
        err.issues,
        vec!["input \"count\" must be an integer, got string".to_string()]
    );
}

#[test]
fn integral_floats_satisfy_integer_inputs() {
    let def = definition(vec![input("count", InputType::Integer)]);
    let resolved = resolve_inputs(&def, &supplied(&[("count", json!(3.0))])).unwrap();
    assert_eq!(resolved.get("count"), Some(&json!(3.0)));

    let err = resolve_inputs(&def, &supplied(&[("count", json!(3.5))])).unwrap_err();
    assert!(err.issues[0].contains("must be an integer"));
}

#[test]
fn string_length_and_pattern_constraints_apply() {
    let mut name = input("name", InputType::String);
    name.constraints.min_length = Some(3);
    name.constraints.max_length = Some(5);
    name.constraints.pattern = Some("^[a-z]+$".to_string());
    let def = definition(vec![name]);

    let err = resolve_inputs(&def, &supplied(&[("name", json!("ab"))])).unwrap_err();
    assert!(err.issues.iter().any(|i| i.contains("at least 3 characters")));

    let err = resolve_inputs(&def, &supplied(&[("name", json!("ABCD"))])).unwrap_err();
    assert!(err.issues.iter().any(|i| i.contains("does not match pattern")));

    resolve_inputs(&def, &supplied(&[("name", json!("abcd"))])).unwrap();
}

#[test]
fn numeric_bounds_apply() {
    let mut replicas = input("replicas", InputType::Number);
    replicas.constraints.minimum = Some(1.0);
    replicas.constraints.maximum = Some(10.0);
    let def = definition(vec![replicas]);

    let err = resolve_inputs(&def, &supplied(&[("replicas", json!(0))])).unwrap_err();
    assert!(err.issues.iter().any(|i| i.contains("at least 1")));
    let err = resolve_inputs(&def, &supplied(&[("replicas", json!(11.5))])).unwrap_err();
    assert!(err.issues.iter().any(|i| i.contains("at most 10")));
    resolve_inputs(&def, &supplied(&[("replicas", json!(5))])).unwrap();
}

#[test]
fn array_item_counts_apply() {
    let mut hosts = input("hosts", InputType::Array);
    hosts.constraints.min_items = Some(1);
    hosts.constraints.max_items = Some(2);
    let def = definition(vec![hosts]);

    let err = resolve_inputs(&def, &supplied(&[("hosts", json!([]))])).unwrap_err();
    assert!(err.issues.iter().any(|i| i.contains("at least 1 items")));
    let err = resolve_inputs(&def, &supplied(&[("hosts", json!(["a", "b", "c"]))])).unwrap_err();
    assert!(err.issues.iter().any(|i| i.contains("at most 2 items")));
}

#[test]
fn enum_membership_widens_across_numeric_types() {
    let mut level = input("level", InputType::Number);
    level.constraints.enum_values = Some(vec![json!(1), json!(2)]);
    let def = definition(vec![level]);

    resolve_inputs(&def, &supplied(&[("level", json!(2.0))])).unwrap();
    let err = resolve_inputs(&def, &supplied(&[("level", json!(3))])).unwrap_err();
    assert!(err.issues.iter().any(|i| i.contains("one of the allowed values")));
}

#[test]
fn issues_are_deduplicated() {
    let mut a = input("target", InputType::String);
    a.required = true;
    let mut def = definition(vec![a]);
    // A second declaration of the same name yields the same missing-input
    // issue; the resolver reports it once.
    let mut b = input("target", InputType::String);
    b.required = true;
    def.inputs.push(b);

    let err = resolve_inputs(&def, &Map::new()).unwrap_err();
    assert_eq!(err.issues, vec!["input \"target\" is required".to_string()]);
}
