// crates/packrun-core/src/runtime/classify.rs
// ============================================================================
// Module: Packrun Mutation Classifier
// Description: Mutation inference from overrides, verbs, and command prefixes.
// Purpose: Decide which steps are subject to policy and approval gating.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! A step is gated only when it may change external state. Classification
//! checks, in order: the explicit `mutating` override, command inspection for
//! `run_command`, the action verb tables, and read-style action prefixes.
//! Anything unrecognized defaults to mutating, which fails closed toward
//! gating.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;

use crate::core::RiskLevel;
use crate::core::StepSpec;
use crate::interfaces::CommandPayload;
use crate::interfaces::RiskClassifier;

// ============================================================================
// SECTION: Verb Tables
// ============================================================================

/// Action verbs treated as mutating.
const MUTATING_ACTIONS: &[&str] = &[
    "apply",
    "patch",
    "delete",
    "create",
    "update",
    "upload_artifact",
    "run",
    "run_command",
    "exec",
    "execute",
    "rollback",
    "",
];

/// Action verbs treated as non-mutating.
const READ_ONLY_ACTIONS: &[&str] = &[
    "noop",
    "read",
    "read_file",
    "list",
    "list_files",
    "get",
    "describe",
    "status",
    "check",
    "inventory",
];

/// Read-style action prefixes treated as non-mutating.
const READ_ONLY_ACTION_PREFIXES: &[&str] = &["read_", "list_", "get_", "describe_", "check_"];

/// Command prefixes that mark a `run_command` step as non-mutating.
pub(crate) const READ_ONLY_COMMAND_PREFIXES: &[&str] = &[
    "cat",
    "ls",
    "find",
    "grep",
    "head",
    "tail",
    "stat",
    "df",
    "du",
    "ps",
    "top",
    "id",
    "whoami",
    "uname",
    "echo",
    "printf",
    "journalctl",
    "kubectl get",
    "kubectl describe",
    "systemctl status",
];

// ============================================================================
// SECTION: Classification
// ============================================================================

/// Classification result for one step.
///
/// # Invariants
/// - `risk_level` is present only when the risk classifier was consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Whether the step is subject to policy and approval gating.
    pub mutating: bool,
    /// Risk level from the classifier, when it was consulted.
    pub risk_level: Option<RiskLevel>,
}

/// Builds the synthetic command payload for a step.
#[must_use]
pub fn command_payload(action: &str, parameters: &Map<String, Value>) -> CommandPayload {
    CommandPayload {
        action: action.to_string(),
        command: parameters
            .get("command")
            .and_then(Value::as_str)
            .map(str::to_string),
        parameters: parameters.clone(),
    }
}

/// Classifies a step as mutating or non-mutating.
#[must_use]
pub fn classify_step(
    step: &StepSpec,
    resolved_parameters: &Map<String, Value>,
    classifier: &dyn RiskClassifier,
) -> Classification {
    if let Some(mutating) = step.mutating {
        return Classification {
            mutating,
            risk_level: None,
        };
    }

    if step.action == "run_command"
        && let Some(command) = resolved_parameters.get("command").and_then(Value::as_str)
    {
        if command_has_read_only_prefix(command) {
            return Classification {
                mutating: false,
                risk_level: None,
            };
        }
        let payload = command_payload(&step.action, resolved_parameters);
        let risk = classifier.classify(&payload);
        return Classification {
            mutating: !matches!(risk, RiskLevel::Low),
            risk_level: Some(risk),
        };
    }

    if MUTATING_ACTIONS.contains(&step.action.as_str()) {
        return Classification {
            mutating: true,
            risk_level: None,
        };
    }
    if READ_ONLY_ACTIONS.contains(&step.action.as_str()) {
        return Classification {
            mutating: false,
            risk_level: None,
        };
    }
    if READ_ONLY_ACTION_PREFIXES
        .iter()
        .any(|prefix| step.action.starts_with(prefix))
    {
        return Classification {
            mutating: false,
            risk_level: None,
        };
    }
    Classification {
        mutating: true,
        risk_level: None,
    }
}

/// Returns true when the command starts with a read-only prefix at a word
/// boundary.
pub(crate) fn command_has_read_only_prefix(command: &str) -> bool {
    let trimmed = command.trim();
    READ_ONLY_COMMAND_PREFIXES.iter().any(|prefix| {
        trimmed
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
    })
}
