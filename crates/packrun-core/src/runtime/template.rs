// crates/packrun-core/src/runtime/template.rs
// ============================================================================
// Module: Packrun Template Resolver
// Description: `{{ inputs.X }}` substitution inside parameter trees.
// Purpose: Resolve step and rollback parameters against resolved inputs.
// Dependencies: crate::core, regex, serde_json
// ============================================================================

//! ## Overview
//! Parameter trees may reference resolved inputs with `{{ inputs.NAME }}`
//! tokens. A string that consists of exactly one token (modulo surrounding
//! whitespace) is replaced by the input value with its type preserved; tokens
//! embedded in a larger string interpolate the value's rendered form.
//! Unresolved tokens are left intact so the runner sees them verbatim.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Map;
use serde_json::Value;

use crate::core::value::render_value;

// ============================================================================
// SECTION: Token Patterns
// ============================================================================

/// Matches `{{ inputs.NAME }}` tokens anywhere in a string.
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| compiled(r"\{\{\s*inputs\.([A-Za-z0-9._-]+)\s*\}\}"));

/// Matches a string that is exactly one token after trimming.
static EXACT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| compiled(r"^\{\{\s*inputs\.([A-Za-z0-9._-]+)\s*\}\}$"));

/// Compiles a pattern known at build time to be valid.
fn compiled(pattern: &str) -> Regex {
    #[allow(clippy::unwrap_used, reason = "Patterns are compile-time constants.")]
    let regex = Regex::new(pattern).unwrap();
    regex
}

// ============================================================================
// SECTION: Resolver
// ============================================================================

/// Resolves every template token in a parameter map.
#[must_use]
pub fn resolve_parameters(
    parameters: &Map<String, Value>,
    inputs: &Map<String, Value>,
) -> Map<String, Value> {
    parameters
        .iter()
        .map(|(key, value)| (key.clone(), resolve_value(value, inputs)))
        .collect()
}

/// Resolves template tokens in one value, deep-copying the tree.
#[must_use]
pub fn resolve_value(value: &Value, inputs: &Map<String, Value>) -> Value {
    match value {
        Value::String(text) => resolve_string(text, inputs),
        Value::Array(items) => {
            Value::Array(items.iter().map(|item| resolve_value(item, inputs)).collect())
        }
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), resolve_value(item, inputs)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Resolves one string in exact-match or inline mode.
fn resolve_string(text: &str, inputs: &Map<String, Value>) -> Value {
    if let Some(captures) = EXACT_PATTERN.captures(text.trim())
        && let Some(name) = captures.get(1)
        && let Some(resolved) = inputs.get(name.as_str())
    {
        return resolved.clone();
    }
    let replaced = TOKEN_PATTERN.replace_all(text, |captures: &regex::Captures<'_>| {
        captures.get(1).map_or_else(
            || captures[0].to_string(),
            |name| {
                inputs
                    .get(name.as_str())
                    .map_or_else(|| captures[0].to_string(), render_value)
            },
        )
    });
    Value::String(replaced.into_owned())
}
