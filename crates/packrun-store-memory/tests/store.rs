// crates/packrun-store-memory/tests/store.rs
// ============================================================================
// Module: In-Memory Store Tests
// Description: Registration, version resolution, and duplicate handling.
// Purpose: Validate the definition store against the reader contract.
// ============================================================================

//! Definition store tests: validation on register and version resolution.

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

use packrun_core::DefinitionReadError;
use packrun_core::DefinitionReader;
use packrun_core::OutcomeSpec;
use packrun_core::PackDefinition;
use packrun_core::PackMetadata;
use packrun_core::StepSpec;
use packrun_store_memory::DefinitionStoreError;
use packrun_store_memory::InMemoryDefinitionStore;

// ============================================================================
// SECTION: Test Fixtures
// ============================================================================

fn definition(id: &str, version: &str) -> PackDefinition {
    PackDefinition {
        metadata: PackMetadata {
            id: id.to_string(),
            name: "Store Pack".to_string(),
            version: version.to_string(),
            description: None,
        },
        inputs: Vec::new(),
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
            description: "nothing happens".to_string(),
            success_criteria: "noop succeeds".to_string(),
            step_id: None,
        }],
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn register_normalizes_and_returns_identity() {
    let store = InMemoryDefinitionStore::new();
    let (id, version) = store.register(definition("  Store-Pack  ", "1.0.0")).unwrap();
    assert_eq!(id, "store-pack");
    assert_eq!(version, "1.0.0");

    let loaded = store.get("store-pack", None).unwrap();
    assert_eq!(loaded.metadata.version, "1.0.0");
}

#[test]
fn invalid_definitions_are_rejected_on_register() {
    let store = InMemoryDefinitionStore::new();
    let mut invalid = definition("store-pack", "1.0.0");
    invalid.steps.clear();
    let err = store.register(invalid).unwrap_err();
    assert!(matches!(err, DefinitionStoreError::Invalid(_)));
    assert!(matches!(
        store.get("store-pack", None).unwrap_err(),
        DefinitionReadError::NotFound(_)
    ));
}

#[test]
fn latest_resolves_to_the_highest_version() {
    let store = InMemoryDefinitionStore::new();
    store.register(definition("store-pack", "1.0.0")).unwrap();
    store.register(definition("store-pack", "1.10.0")).unwrap();
    store.register(definition("store-pack", "1.2.0")).unwrap();

    let latest = store.get("store-pack", None).unwrap();
    assert_eq!(latest.metadata.version, "1.10.0");

    // An empty version string also means latest.
    let latest = store.get("store-pack", Some("")).unwrap();
    assert_eq!(latest.metadata.version, "1.10.0");
}

#[test]
fn prerelease_orders_below_the_release() {
    let store = InMemoryDefinitionStore::new();
    store.register(definition("store-pack", "2.0.0-rc.1")).unwrap();
    store.register(definition("store-pack", "2.0.0")).unwrap();
    let latest = store.get("store-pack", None).unwrap();
    assert_eq!(latest.metadata.version, "2.0.0");
}

#[test]
fn explicit_versions_resolve_exactly() {
    let store = InMemoryDefinitionStore::new();
    store.register(definition("store-pack", "1.0.0")).unwrap();
    store.register(definition("store-pack", "2.0.0")).unwrap();

    let pinned = store.get("store-pack", Some("1.0.0")).unwrap();
    assert_eq!(pinned.metadata.version, "1.0.0");
    assert!(matches!(
        store.get("store-pack", Some("3.0.0")).unwrap_err(),
        DefinitionReadError::NotFound(_)
    ));
}

#[test]
fn duplicate_versions_conflict() {
    let store = InMemoryDefinitionStore::new();
    store.register(definition("store-pack", "1.0.0")).unwrap();
    let err = store.register(definition("store-pack", "1.0.0")).unwrap_err();
    assert!(matches!(err, DefinitionStoreError::Duplicate { .. }));
}

#[test]
fn unknown_packs_are_not_found() {
    let store = InMemoryDefinitionStore::new();
    assert!(matches!(
        store.get("ghost", None).unwrap_err(),
        DefinitionReadError::NotFound(_)
    ));
}
