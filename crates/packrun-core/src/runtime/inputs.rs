// crates/packrun-core/src/runtime/inputs.rs
// ============================================================================
// Module: Packrun Input Resolver
// Description: Caller input resolution against the declared input schema.
// Purpose: Produce the deterministic resolved-inputs snapshot for a run.
// Dependencies: crate::core, regex, thiserror
// ============================================================================

//! ## Overview
//! Input resolution walks the declared inputs in order: a caller-supplied
//! value wins, otherwise a deep copy of the default, otherwise a
//! missing-input issue for required inputs. Values are then type-checked and
//! constrained. Unknown caller keys are rejected. All issues are collected,
//! deduplicated, and returned as one aggregate error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use regex::Regex;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::core::InputSpec;
use crate::core::PackDefinition;
use crate::core::value::value_type_label;
use crate::core::value::values_equal;

// ============================================================================
// SECTION: Input Validation Error
// ============================================================================

/// Aggregate input validation failure.
///
/// # Invariants
/// - `issues` is non-empty and deduplicated in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("input validation failed: {}", issues.join("; "))]
pub struct InputValidationError {
    /// Every detected issue.
    pub issues: Vec<String>,
}

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Resolves caller-supplied inputs against the declared input schema.
///
/// # Errors
///
/// Returns [`InputValidationError`] when required inputs are missing, values
/// violate their declared type or constraints, or unknown keys are supplied.
pub fn resolve_inputs(
    definition: &PackDefinition,
    supplied: &Map<String, Value>,
) -> Result<Map<String, Value>, InputValidationError> {
    let mut resolved = Map::new();
    let mut issues = Vec::new();

    for input in &definition.inputs {
        let value = if let Some(value) = supplied.get(&input.name) {
            value.clone()
        } else if let Some(default) = &input.default {
            default.clone()
        } else {
            if input.required {
                issues.push(format!("input \"{}\" is required", input.name));
            }
            continue;
        };
        check_value(input, &value, &mut issues);
        resolved.insert(input.name.clone(), value);
    }

    let declared: BTreeSet<&str> = definition.inputs.iter().map(|i| i.name.as_str()).collect();
    for key in supplied.keys() {
        if !declared.contains(key.as_str()) {
            issues.push(format!("unknown input \"{key}\""));
        }
    }

    let issues = dedupe(issues);
    if issues.is_empty() {
        Ok(resolved)
    } else {
        Err(InputValidationError { issues })
    }
}

/// Deduplicates issues preserving first-seen order.
fn dedupe(issues: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    issues
        .into_iter()
        .filter(|issue| seen.insert(issue.clone()))
        .collect()
}

/// Type-checks a resolved value and applies declared constraints.
fn check_value(input: &InputSpec, value: &Value, issues: &mut Vec<String>) {
    if !input.input_type.matches(value) {
        issues.push(format!(
            "input \"{}\" must be {}, got {}",
            input.name,
            input.input_type.with_article(),
            value_type_label(value)
        ));
        return;
    }
    check_string_constraints(input, value, issues);
    check_numeric_constraints(input, value, issues);
    check_array_constraints(input, value, issues);
    check_enum_constraint(input, value, issues);
}

/// Applies string length and pattern constraints.
fn check_string_constraints(input: &InputSpec, value: &Value, issues: &mut Vec<String>) {
    let Some(text) = value.as_str() else {
        return;
    };
    let length = text.chars().count();
    if let Some(min_length) = input.constraints.min_length
        && length < min_length
    {
        issues.push(format!(
            "input \"{}\" must be at least {min_length} characters",
            input.name
        ));
    }
    if let Some(max_length) = input.constraints.max_length
        && length > max_length
    {
        issues.push(format!(
            "input \"{}\" must be at most {max_length} characters",
            input.name
        ));
    }
    if let Some(pattern) = &input.constraints.pattern
        && let Ok(regex) = Regex::new(pattern)
        && !regex.is_match(text)
    {
        issues.push(format!(
            "input \"{}\" does not match pattern {pattern}",
            input.name
        ));
    }
}

/// Applies numeric bound constraints.
fn check_numeric_constraints(input: &InputSpec, value: &Value, issues: &mut Vec<String>) {
    let Some(number) = value.as_f64() else {
        return;
    };
    if let Some(minimum) = input.constraints.minimum
        && number < minimum
    {
        issues.push(format!("input \"{}\" must be at least {minimum}", input.name));
    }
    if let Some(maximum) = input.constraints.maximum
        && number > maximum
    {
        issues.push(format!("input \"{}\" must be at most {maximum}", input.name));
    }
}

/// Applies array item count constraints.
fn check_array_constraints(input: &InputSpec, value: &Value, issues: &mut Vec<String>) {
    let Some(items) = value.as_array() else {
        return;
    };
    if let Some(min_items) = input.constraints.min_items
        && items.len() < min_items
    {
        issues.push(format!(
            "input \"{}\" must contain at least {min_items} items",
            input.name
        ));
    }
    if let Some(max_items) = input.constraints.max_items
        && items.len() > max_items
    {
        issues.push(format!(
            "input \"{}\" must contain at most {max_items} items",
            input.name
        ));
    }
}

/// Applies the enum membership constraint with numeric widening.
fn check_enum_constraint(input: &InputSpec, value: &Value, issues: &mut Vec<String>) {
    if let Some(enum_values) = &input.constraints.enum_values
        && !enum_values.iter().any(|allowed| values_equal(allowed, value))
    {
        issues.push(format!(
            "input \"{}\" must be one of the allowed values",
            input.name
        ));
    }
}
