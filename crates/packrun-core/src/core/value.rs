// crates/packrun-core/src/core/value.rs
// ============================================================================
// Module: Packrun Value Semantics
// Description: Structural equality and rendering for json-like values.
// Purpose: Provide deterministic value comparison with numeric widening.
// Dependencies: bigdecimal, serde_json
// ============================================================================

//! ## Overview
//! Inputs and step parameters are dynamic json-like values. Equality between
//! them must be structural and must widen across integer/float
//! representations, so `3` and `3.0` compare equal regardless of how the
//! caller encoded them. Widening goes through `BigDecimal` parsing of the
//! rendered number, which keeps the comparison exact for every value
//! `serde_json` can represent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde_json::Number;
use serde_json::Value;

// ============================================================================
// SECTION: Structural Equality
// ============================================================================

/// Compares two json-like values structurally with numeric widening.
///
/// Arrays and objects are compared element-wise; numbers compare equal when
/// their decimal expansions are equal, independent of integer/float width.
#[must_use]
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(left_num), Value::Number(right_num)) => numbers_equal(left_num, right_num),
        (Value::Array(left_items), Value::Array(right_items)) => {
            left_items.len() == right_items.len()
                && left_items
                    .iter()
                    .zip(right_items.iter())
                    .all(|(l, r)| values_equal(l, r))
        }
        (Value::Object(left_map), Value::Object(right_map)) => {
            left_map.len() == right_map.len()
                && left_map
                    .iter()
                    .all(|(key, l)| right_map.get(key).is_some_and(|r| values_equal(l, r)))
        }
        _ => left == right,
    }
}

/// Compares JSON numbers by parsing them into `BigDecimal` values.
fn numbers_equal(left: &Number, right: &Number) -> bool {
    match (decimal_from_number(left), decimal_from_number(right)) {
        (Some(left), Some(right)) => left == right,
        _ => false,
    }
}

/// Parses a JSON number into `BigDecimal` with a stable string representation.
fn decimal_from_number(number: &Number) -> Option<BigDecimal> {
    let rendered = number.to_string();
    BigDecimal::from_str(&rendered).ok()
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders a value for inline template interpolation.
///
/// Strings render without surrounding quotes; every other value renders as
/// its JSON form.
#[must_use]
pub fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Returns a stable type label for a json-like value, used in issue messages.
#[must_use]
pub const fn value_type_label(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Returns true when the number has no fractional part.
#[must_use]
pub fn number_is_integral(number: &Number) -> bool {
    if number.is_i64() || number.is_u64() {
        return true;
    }
    number
        .as_f64()
        .is_some_and(|float| float.is_finite() && float.fract() == 0.0)
}
