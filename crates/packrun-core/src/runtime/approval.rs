// crates/packrun-core/src/runtime/approval.rs
// ============================================================================
// Module: Packrun Approval Gate
// Description: Approval requirement evaluation against operator decisions.
// Purpose: Hold mutating steps until their approval checkpoints are met.
// Dependencies: crate::core, serde
// ============================================================================

//! ## Overview
//! Approval requirements exist at workflow and step scope; both are
//! evaluated, workflow first, for every mutating step that passed the policy
//! gate. The workflow-level decision object is applied unchanged to each
//! evaluation. A requirement that is not marked required is skipped entirely;
//! otherwise the effective approver minimum is at least 1 regardless of the
//! declared value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::ApprovalSpec;

// ============================================================================
// SECTION: Decisions
// ============================================================================

/// Operator-supplied approval decision for one scope.
///
/// # Invariants
/// - `approver_count` counts distinct approvers the operator collected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalDecision {
    /// Whether the operator approved the scope.
    #[serde(default)]
    pub approved: bool,
    /// Number of approvers backing the decision.
    #[serde(default)]
    pub approver_count: u32,
}

// ============================================================================
// SECTION: Evaluation
// ============================================================================

/// Scope at which an approval requirement is declared.
///
/// # Invariants
/// - Labels are stable; they appear in reason strings and event payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalScope {
    /// Workflow-level requirement applied to every mutating step.
    Workflow,
    /// Step-level requirement applied to one step.
    Step,
}

impl ApprovalScope {
    /// Returns a stable label for the scope.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Workflow => "workflow",
            Self::Step => "step",
        }
    }
}

/// Outcome of evaluating one approval requirement.
///
/// # Invariants
/// - `minimum_approvers` is the effective minimum (at least 1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalEvaluation {
    /// Scope the requirement was declared at.
    pub scope: ApprovalScope,
    /// Effective approver minimum.
    pub minimum_approvers: u32,
    /// Whether the requirement is satisfied.
    pub approved: bool,
    /// Human-readable evaluation reason.
    pub reason: String,
}

/// Evaluates one approval requirement against an operator decision.
///
/// Returns `None` when the requirement is not marked required.
#[must_use]
pub fn evaluate_approval(
    scope: ApprovalScope,
    requirement: &ApprovalSpec,
    decision: Option<&ApprovalDecision>,
) -> Option<ApprovalEvaluation> {
    if !requirement.required {
        return None;
    }
    let minimum = requirement.minimum_approvers.max(1);
    let decision = decision.copied().unwrap_or_default();

    let (approved, reason) = if !decision.approved {
        (
            false,
            format!("{} approval required ({minimum} approver minimum)", scope.as_str()),
        )
    } else if decision.approver_count > 0 && decision.approver_count < minimum {
        (
            false,
            format!(
                "{} approval requires {minimum} approvers; got {}",
                scope.as_str(),
                decision.approver_count
            ),
        )
    } else if decision.approver_count == 0 && minimum > 1 {
        (
            false,
            format!("{} approval requires {minimum} approvers", scope.as_str()),
        )
    } else {
        (true, "approval requirement satisfied".to_string())
    };

    Some(ApprovalEvaluation {
        scope,
        minimum_approvers: minimum,
        approved,
        reason,
    })
}
