// crates/packrun-core/tests/template.rs
// ============================================================================
// Module: Template Resolution Unit Tests
// Description: Exact-match and inline token substitution semantics.
// Purpose: Validate template resolution over nested parameter trees.
// ============================================================================

//! Template resolver tests covering both substitution modes.

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

use packrun_core::runtime::resolve_parameters;
use packrun_core::runtime::resolve_value;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Test Fixtures
// ============================================================================

fn inputs(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), value.clone()))
        .collect()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn exact_match_preserves_value_type() {
    let inputs = inputs(&[("replicas", json!(4)), ("flags", json!(["-v", "-q"]))]);
    assert_eq!(resolve_value(&json!("{{ inputs.replicas }}"), &inputs), json!(4));
    assert_eq!(
        resolve_value(&json!("  {{inputs.flags}}  "), &inputs),
        json!(["-v", "-q"])
    );
}

#[test]
fn inline_tokens_interpolate_rendered_values() {
    let inputs = inputs(&[("host", json!("db-1")), ("port", json!(5432))]);
    assert_eq!(
        resolve_value(&json!("postgres://{{ inputs.host }}:{{ inputs.port }}"), &inputs),
        json!("postgres://db-1:5432")
    );
}

#[test]
fn unresolved_tokens_are_left_intact() {
    let inputs = inputs(&[("host", json!("db-1"))]);
    assert_eq!(
        resolve_value(&json!("{{ inputs.missing }}"), &inputs),
        json!("{{ inputs.missing }}")
    );
    assert_eq!(
        resolve_value(&json!("to {{ inputs.missing }} from {{ inputs.host }}"), &inputs),
        json!("to {{ inputs.missing }} from db-1")
    );
}

#[test]
fn non_string_scalars_pass_through() {
    let inputs = inputs(&[]);
    assert_eq!(resolve_value(&json!(7), &inputs), json!(7));
    assert_eq!(resolve_value(&json!(true), &inputs), json!(true));
    assert_eq!(resolve_value(&Value::Null, &inputs), Value::Null);
}

#[test]
fn nested_trees_resolve_recursively() {
    let inputs = inputs(&[("env", json!("prod")), ("count", json!(2))]);
    let parameters: Map<String, Value> = [
        ("command".to_string(), json!("deploy --env {{ inputs.env }}")),
        (
            "spec".to_string(),
            json!({
                "replicas": "{{ inputs.count }}",
                "labels": ["tier-{{ inputs.env }}", "static"],
            }),
        ),
    ]
    .into_iter()
    .collect();

    let resolved = resolve_parameters(&parameters, &inputs);
    assert_eq!(resolved.get("command"), Some(&json!("deploy --env prod")));
    assert_eq!(
        resolved.get("spec"),
        Some(&json!({
            "replicas": 2,
            "labels": ["tier-prod", "static"],
        }))
    );
}

#[test]
fn names_accept_dots_dashes_and_underscores() {
    let inputs = inputs(&[("app.env-name_x", json!("ok"))]);
    assert_eq!(
        resolve_value(&json!("{{ inputs.app.env-name_x }}"), &inputs),
        json!("ok")
    );
}

#[test]
fn object_values_render_as_json_inline() {
    let inputs = inputs(&[("cfg", json!({"a": 1}))]);
    assert_eq!(
        resolve_value(&json!("cfg={{ inputs.cfg }}"), &inputs),
        json!("cfg={\"a\":1}")
    );
}
