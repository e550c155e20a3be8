// crates/packrun-core/tests/proptest_values.rs
// ============================================================================
// Module: Value Semantics Property Tests
// Description: Numeric widening equality and template substitution laws.
// Purpose: Probe value comparison and template resolution with random data.
// ============================================================================

//! Property tests for structural equality and template token substitution.

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

use packrun_core::core::value::values_equal;
use packrun_core::runtime::resolve_value;
use proptest::prelude::*;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Strategies
// ============================================================================

/// Leaf-heavy JSON value strategy with bounded depth.
fn value_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-z0-9 ]{0,12}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4).prop_map(|entries| {
                Value::Object(entries.into_iter().collect())
            }),
        ]
    })
}

/// Valid template input names.
fn name_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9._-]{1,16}"
}

// ============================================================================
// SECTION: Properties
// ============================================================================

proptest! {
    #[test]
    fn equality_is_reflexive(value in value_strategy()) {
        prop_assert!(values_equal(&value, &value));
    }

    #[test]
    fn integers_widen_to_floats(number in -(1_i64 << 52)..(1_i64 << 52)) {
        // Within the 52-bit range the float conversion is exact.
        #[allow(clippy::cast_precision_loss, reason = "Range keeps the cast exact.")]
        let float = number as f64;
        prop_assert!(values_equal(&json!(number), &json!(float)));
        prop_assert!(values_equal(&json!([number]), &json!([float])));
    }

    #[test]
    fn distinct_integers_never_compare_equal(left in any::<i64>(), right in any::<i64>()) {
        prop_assume!(left != right);
        prop_assert!(!values_equal(&json!(left), &json!(right)));
    }

    #[test]
    fn exact_tokens_substitute_any_value(name in name_strategy(), value in value_strategy()) {
        let mut inputs = Map::new();
        inputs.insert(name.clone(), value.clone());
        let token = format!("{{{{ inputs.{name} }}}}");
        prop_assert_eq!(resolve_value(&json!(token), &inputs), value);
    }

    #[test]
    fn unresolved_tokens_survive_verbatim(name in name_strategy()) {
        let token = format!("{{{{ inputs.{name} }}}}");
        let resolved = resolve_value(&json!(token.clone()), &Map::new());
        prop_assert_eq!(resolved, json!(token));
    }

    #[test]
    fn inline_substitution_keeps_surrounding_text(
        name in name_strategy(),
        prefix in "[a-z ]{0,8}",
        suffix in "[a-z ]{0,8}",
        text in "[a-z0-9]{0,12}",
    ) {
        let mut inputs = Map::new();
        inputs.insert(name.clone(), json!(text.clone()));
        let template = format!("{prefix}{{{{ inputs.{name} }}}}{suffix}");
        let resolved = resolve_value(&json!(template), &inputs);
        let rendered = resolved.as_str().unwrap();
        if prefix.trim().is_empty() && suffix.trim().is_empty() {
            // Whitespace around a lone token still counts as exact-match
            // mode, which substitutes the typed value.
            prop_assert_eq!(rendered, text.as_str());
        } else {
            let expected = format!("{prefix}{text}{suffix}");
            prop_assert_eq!(rendered, expected.as_str());
        }
    }
}
