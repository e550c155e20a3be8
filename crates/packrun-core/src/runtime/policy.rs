// crates/packrun-core/src/runtime/policy.rs
// ============================================================================
// Module: Packrun Policy Gate
// Description: Policy simulation and outcome normalization for mutating steps.
// Purpose: Decide allow/queue/deny before any mutating attempt runs.
// Dependencies: crate::core, crate::interfaces, crate::runtime::classify
// ============================================================================

//! ## Overview
//! The policy gate runs only for mutating steps. It builds the synthetic
//! command payload, consults the pluggable simulator once, and normalizes the
//! verdict: an absent outcome defaults to allow, an absent risk level is
//! computed by the classifier. Simulator answers are taken as returned; there
//! is no retry on transient simulator behavior.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;

use crate::core::PackMetadata;
use crate::core::PolicyOutcome;
use crate::core::PolicySimulation;
use crate::core::RiskLevel;
use crate::core::StepSpec;
use crate::interfaces::PolicySimulationRequest;
use crate::interfaces::PolicySimulator;
use crate::interfaces::RiskClassifier;
use crate::runtime::classify::command_payload;

// ============================================================================
// SECTION: Gate Evaluation
// ============================================================================

/// Simulates policy for one mutating step and normalizes the verdict.
pub async fn simulate_policy(
    simulator: &dyn PolicySimulator,
    classifier: &dyn RiskClassifier,
    metadata: &PackMetadata,
    step: &StepSpec,
    resolved_parameters: &Map<String, Value>,
    precomputed_risk: Option<RiskLevel>,
) -> PolicySimulation {
    let command = command_payload(&step.action, resolved_parameters);
    let request = PolicySimulationRequest {
        metadata: metadata.clone(),
        step_id: step.id.clone(),
        action: step.action.clone(),
        command,
    };
    let verdict = simulator.simulate(&request).await;

    let outcome = verdict.outcome.unwrap_or(PolicyOutcome::Allow);
    let risk_level = verdict.risk_level.or(precomputed_risk).unwrap_or_else(|| {
        classifier.classify(&request.command)
    });

    PolicySimulation {
        outcome,
        risk_level,
        summary: verdict.summary,
        rationale: verdict.rationale,
    }
}

/// Builds the block message for a non-allow policy outcome.
///
/// Returns `None` for [`PolicyOutcome::Allow`].
#[must_use]
pub fn block_message(step_id: &str, simulation: &PolicySimulation) -> Option<String> {
    match simulation.outcome {
        PolicyOutcome::Allow => None,
        PolicyOutcome::Queue => {
            Some(format!("step {step_id} requires approval by policy gate"))
        }
        PolicyOutcome::Deny => {
            let summary = simulation
                .summary
                .clone()
                .unwrap_or_else(|| "no summary provided".to_string());
            Some(format!("step {step_id} denied by policy: {summary}"))
        }
    }
}
