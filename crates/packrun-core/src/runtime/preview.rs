// crates/packrun-core/src/runtime/preview.rs
// ============================================================================
// Module: Packrun Dry-Run Preview
// Description: Gate evaluation across a pack without invoking the runner.
// Purpose: Let operators see policy/approval outcomes before executing.
// Dependencies: crate::core, crate::interfaces, crate::runtime
// ============================================================================

//! ## Overview
//! A preview walks the validated pack through classification, policy
//! simulation, and approval evaluation exactly as `start` would, but never
//! invokes the action runner and never creates execution state. An
//! approval shortfall merges into the policy outcome as a queue, using the
//! severity ranking `allow < queue < deny`, so the merged outcome of a step
//! is the worst gate it would hit.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::core::PackDefinition;
use crate::core::PackMetadata;
use crate::core::PolicyOutcome;
use crate::core::RiskLevel;
use crate::interfaces::PolicySimulator;
use crate::interfaces::RiskClassifier;
use crate::runtime::approval::ApprovalDecision;
use crate::runtime::approval::ApprovalScope;
use crate::runtime::approval::evaluate_approval;
use crate::runtime::classify::classify_step;
use crate::runtime::policy::simulate_policy;
use crate::runtime::template::resolve_parameters;

// ============================================================================
// SECTION: Preview Model
// ============================================================================

/// Gate preview for one step.
///
/// # Invariants
/// - `outcome` is the merged severity across policy and approval gates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepPreview {
    /// Step identifier.
    pub step_id: String,
    /// Action verb.
    pub action: String,
    /// Whether the step is subject to gating.
    pub mutating: bool,
    /// Merged gate outcome for the step.
    pub outcome: PolicyOutcome,
    /// Risk level recorded during simulation, for mutating steps.
    pub risk_level: Option<RiskLevel>,
    /// Simulator summary, when one was produced.
    pub summary: Option<String>,
    /// Unmet gate reasons in evaluation order.
    pub reasons: Vec<String>,
}

/// Dry-run preview over a whole pack.
///
/// # Invariants
/// - `steps` is ordered as the pack declares them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPreview {
    /// Metadata of the previewed pack.
    pub metadata: PackMetadata,
    /// Per-step gate previews.
    pub steps: Vec<StepPreview>,
}

// ============================================================================
// SECTION: Preview Construction
// ============================================================================

/// Builds a preview by evaluating every gate without running actions.
pub(crate) async fn build_preview(
    definition: &PackDefinition,
    resolved_inputs: &Map<String, Value>,
    workflow_decision: Option<&ApprovalDecision>,
    step_decisions: &BTreeMap<String, ApprovalDecision>,
    simulator: &dyn PolicySimulator,
    classifier: &dyn RiskClassifier,
) -> ExecutionPreview {
    let mut steps = Vec::with_capacity(definition.steps.len());
    for step in &definition.steps {
        let resolved = step
            .parameters
            .as_ref()
            .map(|parameters| resolve_parameters(parameters, resolved_inputs))
            .unwrap_or_default();
        let classification = classify_step(step, &resolved, classifier);
        if !classification.mutating {
            steps.push(StepPreview {
                step_id: step.id.clone(),
                action: step.action.clone(),
                mutating: false,
                outcome: PolicyOutcome::Allow,
                risk_level: classification.risk_level,
                summary: None,
                reasons: Vec::new(),
            });
            continue;
        }

        let simulation = simulate_policy(
            simulator,
            classifier,
            &definition.metadata,
            step,
            &resolved,
            classification.risk_level,
        )
        .await;
        let mut outcome = simulation.outcome;
        let mut reasons = Vec::new();

        if let Some(requirement) = &definition.approval
            && let Some(evaluation) =
                evaluate_approval(ApprovalScope::Workflow, requirement, workflow_decision)
            && !evaluation.approved
        {
            outcome = outcome.max(PolicyOutcome::Queue);
            reasons.push(evaluation.reason);
        }
        if let Some(requirement) = &step.approval
            && let Some(evaluation) = evaluate_approval(
                ApprovalScope::Step,
                requirement,
                step_decisions.get(&step.id),
            )
            && !evaluation.approved
        {
            outcome = outcome.max(PolicyOutcome::Queue);
            reasons.push(evaluation.reason);
        }

        steps.push(StepPreview {
            step_id: step.id.clone(),
            action: step.action.clone(),
            mutating: true,
            outcome,
            risk_level: Some(simulation.risk_level),
            summary: simulation.summary,
            reasons,
        });
    }
    ExecutionPreview {
        metadata: definition.metadata.clone(),
        steps,
    }
}
