// crates/packrun-core/examples/minimal.rs
// ============================================================================
// Module: Packrun Minimal Example
// Description: Minimal end-to-end execution using in-memory adapters.
// Purpose: Demonstrate start, timeline, and replay over a two-step pack.
// Dependencies: packrun-core
// ============================================================================

//! ## Overview
//! Runs a minimal two-step automation pack with the default no-op runner and
//! prints the resulting timeline ordering. Suitable for quick verification.

#![allow(
    clippy::print_stdout,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Example output and shortcuts are intentional."
)]

use packrun_core::DefinitionReadError;
use packrun_core::DefinitionReader;
use packrun_core::OutcomeSpec;
use packrun_core::PackDefinition;
use packrun_core::PackMetadata;
use packrun_core::StepSpec;
use packrun_core::runtime::PackRuntime;
use packrun_core::runtime::StartRequest;

/// Reader serving one fixed definition.
struct SinglePackReader {
    /// The served definition.
    definition: PackDefinition,
}

impl DefinitionReader for SinglePackReader {
    fn get(&self, id: &str, _version: Option<&str>) -> Result<PackDefinition, DefinitionReadError> {
        if id == self.definition.metadata.id {
            Ok(self.definition.clone())
        } else {
            Err(DefinitionReadError::NotFound(id.to_string()))
        }
    }
}

/// Builds a two-step noop pack.
fn pack() -> PackDefinition {
    let step = |id: &str| StepSpec {
        id: id.to_string(),
        name: None,
        action: "noop".to_string(),
        parameters: None,
        mutating: None,
        timeout_seconds: 0,
        max_retries: 0,
        approval: None,
        rollback: None,
        expected_outcomes: Vec::new(),
    };
    PackDefinition {
        metadata: PackMetadata {
            id: "minimal-pack".to_string(),
            name: "Minimal Pack".to_string(),
            version: "0.1.0".to_string(),
            description: Some("Two no-op steps".to_string()),
        },
        inputs: Vec::new(),
        approval: None,
        steps: vec![step("first"), step("second")],
        expected_outcomes: vec![OutcomeSpec {
            description: "both steps complete".to_string(),
            success_criteria: "terminal status is succeeded".to_string(),
            step_id: None,
        }],
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let runtime = PackRuntime::builder()
        .reader(SinglePackReader { definition: pack() })
        .build()
        .expect("runtime with reader");

    let execution = runtime
        .start(StartRequest {
            pack_id: "minimal-pack".to_string(),
            ..StartRequest::default()
        })
        .await
        .expect("execution");

    println!("execution {} finished {}", execution.id, execution.status.as_str());
    for event in &execution.timeline {
        println!("  {:>3}  {}", event.sequence, event.event_type.as_str());
    }

    let replay = runtime.get_replay(&execution.id).unwrap().expect("replay");
    println!("replay has {} ordered events", replay.event_count);
}
