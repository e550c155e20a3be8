// crates/packrun-core/tests/validation.rs
// ============================================================================
// Module: Definition Validation Unit Tests
// Description: Normalization, aggregate issue collection, and schema rules.
// Purpose: Validate the definition validator against malformed packs.
// ============================================================================

//! Definition validator tests covering normalization and every rule family.

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

use packrun_core::ApprovalSpec;
use packrun_core::InputConstraints;
use packrun_core::InputSpec;
use packrun_core::InputType;
use packrun_core::OutcomeSpec;
use packrun_core::PackDefinition;
use packrun_core::PackMetadata;
use packrun_core::RollbackSpec;
use packrun_core::StepSpec;
use packrun_core::runtime::validate_definition;
use serde_json::json;

// ============================================================================
// SECTION: Test Fixtures
// ============================================================================

fn metadata() -> PackMetadata {
    PackMetadata {
        id: "demo-pack".to_string(),
        name: "Demo Pack".to_string(),
        version: "1.0.0".to_string(),
        description: None,
    }
}

fn outcome() -> OutcomeSpec {
    OutcomeSpec {
        description: "all steps complete".to_string(),
        success_criteria: "every step reports success".to_string(),
        step_id: None,
    }
}

fn step(id: &str, action: &str) -> StepSpec {
    StepSpec {
        id: id.to_string(),
        name: None,
        action: action.to_string(),
        parameters: None,
        mutating: None,
        timeout_seconds: 0,
        max_retries: 0,
        approval: None,
        rollback: None,
        expected_outcomes: Vec::new(),
    }
}

fn definition(steps: Vec<StepSpec>) -> PackDefinition {
    PackDefinition {
        metadata: metadata(),
        inputs: Vec::new(),
        approval: None,
        steps,
        expected_outcomes: vec![outcome()],
    }
}

fn input(name: &str, input_type: InputType) -> InputSpec {
    InputSpec {
        name: name.to_string(),
        input_type,
        required: false,
        default: None,
        constraints: InputConstraints::default(),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn valid_definition_passes_and_normalizes() {
    let mut def = definition(vec![step("step-1", "  READ_FILE  ")]);
    def.metadata.id = "  Demo-Pack  ".to_string();
    validate_definition(&mut def).unwrap();
    assert_eq!(def.metadata.id, "demo-pack");
    assert_eq!(def.steps[0].action, "read_file");
}

#[test]
fn all_issues_are_collected_not_first_fail() {
    let mut def = definition(Vec::new());
    def.metadata.id = "UPPER ONLY!".to_string();
    def.metadata.name = String::new();
    def.metadata.version = "one.two".to_string();
    def.expected_outcomes.clear();

    let err = validate_definition(&mut def).unwrap_err();
    assert!(err.issues.len() >= 4, "expected many issues, got {:?}", err.issues);
    assert!(err.issues.iter().any(|i| i.contains("metadata.id")));
    assert!(err.issues.iter().any(|i| i == "metadata.name is required"));
    assert!(err.issues.iter().any(|i| i.contains("metadata.version")));
    assert!(err.issues.iter().any(|i| i.contains("at least one step")));
    assert!(err.issues.iter().any(|i| i.contains("expected outcome")));
}

#[test]
fn step_identity_and_action_rules() {
    let mut def = definition(vec![
        step("step-1", "apply"),
        step("step-1", ""),
        step("", "delete"),
    ]);
    let err = validate_definition(&mut def).unwrap_err();
    assert!(err.issues.iter().any(|i| i.contains("steps[1].id duplicates")));
    assert!(err.issues.iter().any(|i| i == "steps[1].action is required"));
    assert!(err.issues.iter().any(|i| i == "steps[2].id is required"));
}

#[test]
fn rollback_action_is_required_with_stable_path() {
    let mut with_rollback = step("step-1", "apply");
    with_rollback.rollback = Some(RollbackSpec {
        action: "   ".to_string(),
        parameters: None,
        timeout_seconds: 5,
    });
    let mut def = definition(vec![with_rollback]);
    let err = validate_definition(&mut def).unwrap_err();
    assert_eq!(err.issues, vec!["steps[0].rollback.action is required".to_string()]);
}

#[test]
fn input_constraints_must_match_declared_type() {
    let mut integer_input = input("count", InputType::Integer);
    integer_input.constraints.pattern = Some("^a+$".to_string());
    let mut string_input = input("label", InputType::String);
    string_input.constraints.minimum = Some(1.0);
    string_input.constraints.min_items = Some(1);

    let mut def = definition(vec![step("step-1", "noop")]);
    def.inputs = vec![integer_input, string_input];
    let err = validate_definition(&mut def).unwrap_err();
    assert!(err.issues.iter().any(|i| {
        i == "inputs[0].constraints.pattern is only valid for string inputs"
    }));
    assert!(err.issues.iter().any(|i| {
        i == "inputs[1].constraints.minimum is only valid for numeric inputs"
    }));
    assert!(err.issues.iter().any(|i| {
        i == "inputs[1].constraints.min_items is only valid for array inputs"
    }));
}

#[test]
fn input_pattern_must_compile() {
    let mut pattern_input = input("label", InputType::String);
    pattern_input.constraints.pattern = Some("((".to_string());
    let mut def = definition(vec![step("step-1", "noop")]);
    def.inputs = vec![pattern_input];
    let err = validate_definition(&mut def).unwrap_err();
    assert!(err.issues.iter().any(|i| i.contains("pattern does not compile")));
}

#[test]
fn default_and_enum_values_must_type_match() {
    let mut count = input("count", InputType::Integer);
    count.default = Some(json!("three"));
    count.constraints.enum_values = Some(vec![json!(1), json!("two")]);
    let mut def = definition(vec![step("step-1", "noop")]);
    def.inputs = vec![count];
    let err = validate_definition(&mut def).unwrap_err();
    assert!(err.issues.iter().any(|i| {
        i == "inputs[0].default must be an integer, got string"
    }));
    assert!(err.issues.iter().any(|i| {
        i == "inputs[0].constraints.enum[1] must be an integer, got string"
    }));
}

#[test]
fn duplicate_input_names_are_rejected() {
    let mut def = definition(vec![step("step-1", "noop")]);
    def.inputs = vec![input("target", InputType::String), input("target", InputType::String)];
    let err = validate_definition(&mut def).unwrap_err();
    assert!(err.issues.iter().any(|i| i.contains("inputs[1].name duplicates")));
}

#[test]
fn approval_minimums_are_checked_at_both_scopes() {
    let mut def = definition(vec![step("step-1", "apply")]);
    def.approval = Some(ApprovalSpec {
        required: true,
        minimum_approvers: 0,
        approver_roles: Vec::new(),
    });
    def.steps[0].approval = Some(ApprovalSpec {
        required: false,
        minimum_approvers: 3,
        approver_roles: vec!["sre".to_string()],
    });
    let err = validate_definition(&mut def).unwrap_err();
    assert!(err.issues.iter().any(|i| {
        i == "approval.minimum_approvers must be at least 1 when approval is required"
    }));
    assert!(err.issues.iter().any(|i| {
        i == "steps[0].approval.minimum_approvers exceeds the number of approver roles"
    }));
}

#[test]
fn outcomes_must_reference_existing_steps() {
    let mut def = definition(vec![step("step-1", "noop")]);
    def.expected_outcomes = vec![OutcomeSpec {
        description: "something".to_string(),
        success_criteria: "it worked".to_string(),
        step_id: Some("missing".to_string()),
    }];
    def.steps[0].expected_outcomes = vec![OutcomeSpec {
        description: String::new(),
        success_criteria: "it worked".to_string(),
        step_id: Some("step-1".to_string()),
    }];
    let err = validate_definition(&mut def).unwrap_err();
    assert!(err.issues.iter().any(|i| {
        i == "expected_outcomes[0].step_id references unknown step \"missing\""
    }));
    assert!(err.issues.iter().any(|i| {
        i == "steps[0].expected_outcomes[0].description is required"
    }));
}

#[test]
fn step_level_outcomes_satisfy_the_total_requirement() {
    let mut with_outcome = step("step-1", "noop");
    with_outcome.expected_outcomes = vec![outcome()];
    let mut def = definition(vec![with_outcome]);
    def.expected_outcomes.clear();
    validate_definition(&mut def).unwrap();
}

#[test]
fn version_suffixes_are_accepted() {
    for version in ["1.2.3", "0.1.0-alpha.1", "2.0.0+build.5"] {
        let mut def = definition(vec![step("step-1", "noop")]);
        def.metadata.version = version.to_string();
        validate_definition(&mut def).unwrap();
    }
    let mut def = definition(vec![step("step-1", "noop")]);
    def.metadata.version = "1.2".to_string();
    assert!(validate_definition(&mut def).is_err());
}
