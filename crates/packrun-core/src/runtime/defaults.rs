// crates/packrun-core/src/runtime/defaults.rs
// ============================================================================
// Module: Packrun Default Adapters
// Description: No-op runner, allow-all simulator, heuristic risk classifier.
// Purpose: Ship working defaults next to the pluggable seams.
// Dependencies: crate::core, crate::interfaces, crate::runtime::classify
// ============================================================================

//! ## Overview
//! The defaults keep a freshly built runtime usable without wiring: the
//! no-op runner accepts only the `noop` action, the default simulator allows
//! everything while reporting classifier-derived risk, and the heuristic
//! classifier ranks commands by destructive/read-only prefix tables.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::PolicyOutcome;
use crate::core::RiskLevel;
use crate::interfaces::ActionError;
use crate::interfaces::ActionRequest;
use crate::interfaces::ActionResult;
use crate::interfaces::ActionRunner;
use crate::interfaces::CommandPayload;
use crate::interfaces::PolicySimulationRequest;
use crate::interfaces::PolicySimulator;
use crate::interfaces::RiskClassifier;
use crate::interfaces::SimulatorVerdict;
use crate::runtime::classify::command_has_read_only_prefix;

// ============================================================================
// SECTION: No-op Runner
// ============================================================================

/// Default runner accepting only the `noop` action.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRunner;

#[async_trait]
impl ActionRunner for NoopRunner {
    async fn run(&self, request: ActionRequest) -> Result<ActionResult, ActionError> {
        if request.action == "noop" {
            Ok(ActionResult {
                message: Some("noop action completed".to_string()),
                ..ActionResult::default()
            })
        } else {
            Err(ActionError::Failed(format!(
                "no runner is configured for action {}",
                request.action
            )))
        }
    }
}

// ============================================================================
// SECTION: Heuristic Risk Classifier
// ============================================================================

/// Command prefixes ranked high-risk by the heuristic classifier.
const DESTRUCTIVE_COMMAND_PREFIXES: &[&str] = &[
    "rm",
    "dd",
    "mkfs",
    "shutdown",
    "reboot",
    "kill",
    "truncate",
    "kubectl delete",
    "systemctl stop",
];

/// Default classifier ranking commands by prefix heuristics.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicRiskClassifier;

impl RiskClassifier for HeuristicRiskClassifier {
    fn classify(&self, payload: &CommandPayload) -> RiskLevel {
        if let Some(command) = &payload.command {
            let trimmed = command.trim();
            if DESTRUCTIVE_COMMAND_PREFIXES.iter().any(|prefix| {
                trimmed
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
            }) {
                return RiskLevel::High;
            }
            if command_has_read_only_prefix(trimmed) {
                return RiskLevel::Low;
            }
            return RiskLevel::Medium;
        }
        if payload
            .parameters
            .get("dry_run")
            .and_then(Value::as_bool)
            .unwrap_or(false)
        {
            return RiskLevel::Low;
        }
        RiskLevel::Medium
    }
}

// ============================================================================
// SECTION: Default Simulator
// ============================================================================

/// Default simulator that allows everything with classifier-derived risk.
pub struct DefaultPolicySimulator {
    /// Classifier supplying risk levels.
    classifier: Arc<dyn RiskClassifier>,
}

impl DefaultPolicySimulator {
    /// Creates a simulator backed by the given classifier.
    #[must_use]
    pub fn new(classifier: Arc<dyn RiskClassifier>) -> Self {
        Self { classifier }
    }
}

#[async_trait]
impl PolicySimulator for DefaultPolicySimulator {
    async fn simulate(&self, request: &PolicySimulationRequest) -> SimulatorVerdict {
        SimulatorVerdict {
            outcome: Some(PolicyOutcome::Allow),
            risk_level: Some(self.classifier.classify(&request.command)),
            summary: None,
            rationale: None,
        }
    }
}
