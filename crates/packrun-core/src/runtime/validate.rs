// crates/packrun-core/src/runtime/validate.rs
// ============================================================================
// Module: Packrun Definition Validator
// Description: Normalization and aggregate schema checks for definitions.
// Purpose: Reject malformed packs before any execution state exists.
// Dependencies: crate::core, regex, thiserror
// ============================================================================

//! ## Overview
//! Validation normalizes identifier and action casing in place, then checks
//! the whole definition and collects every issue rather than stopping at the
//! first. Issue strings carry stable path prefixes
//! (`steps[2].rollback.timeout_seconds`) so UIs can anchor them to form
//! fields. Timeout and retry fields are unsigned at the type level, which
//! discharges the non-negativity rules during deserialization.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::core::ApprovalSpec;
use crate::core::InputSpec;
use crate::core::InputType;
use crate::core::OutcomeSpec;
use crate::core::PackDefinition;
use crate::core::value::value_type_label;

// ============================================================================
// SECTION: Patterns
// ============================================================================

/// Pattern for normalized pack identifiers.
static PACK_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| compiled(r"^[a-z0-9][a-z0-9._-]{1,127}$"));

/// Relaxed semantic version pattern (`MAJOR.MINOR.PATCH` plus suffix).
static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| compiled(r"^\d+\.\d+\.\d+(?:[-+][0-9A-Za-z.-]+)?$"));

/// Compiles a pattern known at build time to be valid.
fn compiled(pattern: &str) -> Regex {
    #[allow(clippy::unwrap_used, reason = "Patterns are compile-time constants.")]
    let regex = Regex::new(pattern).unwrap();
    regex
}

// ============================================================================
// SECTION: Validation Error
// ============================================================================

/// Aggregate definition validation failure.
///
/// # Invariants
/// - `issues` is non-empty and lists every detected problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("definition validation failed: {}", issues.join("; "))]
pub struct PackValidationError {
    /// Every detected issue, with stable path prefixes.
    pub issues: Vec<String>,
}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Normalizes and validates a pack definition in place.
///
/// # Errors
///
/// Returns [`PackValidationError`] carrying the full issue list when the
/// definition violates any schema rule.
pub fn validate_definition(definition: &mut PackDefinition) -> Result<(), PackValidationError> {
    normalize(definition);

    let mut issues = Vec::new();
    check_metadata(definition, &mut issues);
    check_inputs(&definition.inputs, &mut issues);
    if let Some(approval) = &definition.approval {
        check_approval("approval", approval, &mut issues);
    }
    check_steps(definition, &mut issues);
    check_outcomes(definition, &mut issues);

    if issues.is_empty() {
        Ok(())
    } else {
        Err(PackValidationError { issues })
    }
}

/// Normalizes whitespace and casing for identifiers and action verbs.
fn normalize(definition: &mut PackDefinition) {
    definition.metadata.id = definition.metadata.id.trim().to_lowercase();
    definition.metadata.name = definition.metadata.name.trim().to_string();
    definition.metadata.version = definition.metadata.version.trim().to_string();
    for input in &mut definition.inputs {
        input.name = input.name.trim().to_string();
    }
    for step in &mut definition.steps {
        step.id = step.id.trim().to_string();
        step.action = step.action.trim().to_lowercase();
        if let Some(rollback) = &mut step.rollback {
            rollback.action = rollback.action.trim().to_lowercase();
        }
    }
}

/// Checks metadata identity and version fields.
fn check_metadata(definition: &PackDefinition, issues: &mut Vec<String>) {
    let metadata = &definition.metadata;
    if metadata.id.is_empty() {
        issues.push("metadata.id is required".to_string());
    } else if !PACK_ID_PATTERN.is_match(&metadata.id) {
        issues.push(format!(
            "metadata.id \"{}\" must match ^[a-z0-9][a-z0-9._-]{{1,127}}$",
            metadata.id
        ));
    }
    if metadata.name.is_empty() {
        issues.push("metadata.name is required".to_string());
    }
    if metadata.version.is_empty() {
        issues.push("metadata.version is required".to_string());
    } else if !VERSION_PATTERN.is_match(&metadata.version) {
        issues.push(format!(
            "metadata.version \"{}\" must be a semantic version (MAJOR.MINOR.PATCH)",
            metadata.version
        ));
    }
}

/// Checks declared inputs for uniqueness and constraint legality.
fn check_inputs(inputs: &[InputSpec], issues: &mut Vec<String>) {
    let mut seen = BTreeSet::new();
    for (index, input) in inputs.iter().enumerate() {
        let path = format!("inputs[{index}]");
        if input.name.is_empty() {
            issues.push(format!("{path}.name is required"));
        } else if !seen.insert(input.name.clone()) {
            issues.push(format!("{path}.name duplicates input \"{}\"", input.name));
        }
        check_input_constraints(&path, input, issues);
        if let Some(default) = &input.default
            && !input.input_type.matches(default)
        {
            issues.push(format!(
                "{path}.default must be {}, got {}",
                input.input_type.with_article(),
                value_type_label(default)
            ));
        }
        if let Some(enum_values) = &input.constraints.enum_values {
            for (value_index, value) in enum_values.iter().enumerate() {
                if !input.input_type.matches(value) {
                    issues.push(format!(
                        "{path}.constraints.enum[{value_index}] must be {}, got {}",
                        input.input_type.with_article(),
                        value_type_label(value)
                    ));
                }
            }
        }
    }
}

/// Checks type-appropriate constraint usage for one input.
fn check_input_constraints(path: &str, input: &InputSpec, issues: &mut Vec<String>) {
    let constraints = &input.constraints;
    let is_string = matches!(input.input_type, InputType::String);
    let is_numeric = matches!(input.input_type, InputType::Number | InputType::Integer);
    let is_array = matches!(input.input_type, InputType::Array);

    if !is_string {
        for field in constraint_fields(&[
            ("min_length", constraints.min_length.is_some()),
            ("max_length", constraints.max_length.is_some()),
            ("pattern", constraints.pattern.is_some()),
        ]) {
            issues.push(format!(
                "{path}.constraints.{field} is only valid for string inputs"
            ));
        }
    }
    if !is_numeric {
        for field in constraint_fields(&[
            ("minimum", constraints.minimum.is_some()),
            ("maximum", constraints.maximum.is_some()),
        ]) {
            issues.push(format!(
                "{path}.constraints.{field} is only valid for numeric inputs"
            ));
        }
    }
    if !is_array {
        for field in constraint_fields(&[
            ("min_items", constraints.min_items.is_some()),
            ("max_items", constraints.max_items.is_some()),
        ]) {
            issues.push(format!(
                "{path}.constraints.{field} is only valid for array inputs"
            ));
        }
    }
    if is_string
        && let Some(pattern) = &constraints.pattern
        && let Err(err) = Regex::new(pattern)
    {
        issues.push(format!("{path}.constraints.pattern does not compile: {err}"));
    }
}

/// Returns the names of present constraint fields.
fn constraint_fields<'a>(fields: &'a [(&'a str, bool)]) -> impl Iterator<Item = &'a str> {
    fields
        .iter()
        .filter(|(_, present)| *present)
        .map(|(name, _)| *name)
}

/// Checks an approval requirement at the given path.
fn check_approval(path: &str, approval: &ApprovalSpec, issues: &mut Vec<String>) {
    if approval.required && approval.minimum_approvers == 0 {
        issues.push(format!(
            "{path}.minimum_approvers must be at least 1 when approval is required"
        ));
    }
    let minimum = usize::try_from(approval.minimum_approvers).unwrap_or(usize::MAX);
    if !approval.approver_roles.is_empty() && minimum > approval.approver_roles.len() {
        issues.push(format!(
            "{path}.minimum_approvers exceeds the number of approver roles"
        ));
    }
}

/// Checks the step list for identity, action, and rollback rules.
fn check_steps(definition: &PackDefinition, issues: &mut Vec<String>) {
    if definition.steps.is_empty() {
        issues.push("steps must contain at least one step".to_string());
        return;
    }
    let mut seen = BTreeSet::new();
    for (index, step) in definition.steps.iter().enumerate() {
        let path = format!("steps[{index}]");
        if step.id.is_empty() {
            issues.push(format!("{path}.id is required"));
        } else if !seen.insert(step.id.clone()) {
            issues.push(format!("{path}.id duplicates step \"{}\"", step.id));
        }
        if step.action.is_empty() {
            issues.push(format!("{path}.action is required"));
        }
        if let Some(approval) = &step.approval {
            check_approval(&format!("{path}.approval"), approval, issues);
        }
        if let Some(rollback) = &step.rollback
            && rollback.action.is_empty()
        {
            issues.push(format!("{path}.rollback.action is required"));
        }
    }
}

/// Checks outcome declarations and step references.
fn check_outcomes(definition: &PackDefinition, issues: &mut Vec<String>) {
    let step_ids: BTreeSet<&str> =
        definition.steps.iter().map(|step| step.id.as_str()).collect();

    for (index, outcome) in definition.expected_outcomes.iter().enumerate() {
        check_outcome(&format!("expected_outcomes[{index}]"), outcome, &step_ids, issues);
    }
    for (step_index, step) in definition.steps.iter().enumerate() {
        for (index, outcome) in step.expected_outcomes.iter().enumerate() {
            check_outcome(
                &format!("steps[{step_index}].expected_outcomes[{index}]"),
                outcome,
                &step_ids,
                issues,
            );
        }
    }
    if definition.outcome_count() == 0 {
        issues.push("definition must declare at least one expected outcome".to_string());
    }
}

/// Checks one outcome declaration.
fn check_outcome(
    path: &str,
    outcome: &OutcomeSpec,
    step_ids: &BTreeSet<&str>,
    issues: &mut Vec<String>,
) {
    if outcome.description.trim().is_empty() {
        issues.push(format!("{path}.description is required"));
    }
    if outcome.success_criteria.trim().is_empty() {
        issues.push(format!("{path}.success_criteria is required"));
    }
    if let Some(step_id) = &outcome.step_id
        && !step_ids.contains(step_id.as_str())
    {
        issues.push(format!("{path}.step_id references unknown step \"{step_id}\""));
    }
}
