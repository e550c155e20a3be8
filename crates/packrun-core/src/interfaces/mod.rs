// crates/packrun-core/src/interfaces/mod.rs
// ============================================================================
// Module: Packrun Interfaces
// Description: Backend-agnostic contracts for definitions, policy, and actions.
// Purpose: Define the pluggable surfaces the execution runtime consumes.
// Dependencies: crate::core, async-trait, serde, thiserror
// ============================================================================

//! ## Overview
//! The runtime touches the outside world through four narrow seams: a
//! definition reader, a policy simulator, a risk classifier, and an action
//! runner. Implementations consume untrusted inputs and must not assume the
//! runtime retries them; simulator answers are taken as returned, and runner
//! errors become attempt results rather than runtime errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::core::PackDefinition;
use crate::core::PackMetadata;
use crate::core::PolicyOutcome;
use crate::core::RiskLevel;

// ============================================================================
// SECTION: Definition Reader
// ============================================================================

/// Definition reader errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum DefinitionReadError {
    /// No definition exists for the requested pack id and version.
    #[error("automation pack not found: {0}")]
    NotFound(String),
    /// The backing store failed.
    #[error("definition store error: {0}")]
    Store(String),
}

/// Read-only provider of automation pack definitions.
pub trait DefinitionReader: Send + Sync {
    /// Loads a definition by pack id; `None` version means latest.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionReadError`] when the pack is unknown or the store
    /// fails.
    fn get(&self, id: &str, version: Option<&str>) -> Result<PackDefinition, DefinitionReadError>;
}

impl<T> DefinitionReader for std::sync::Arc<T>
where
    T: DefinitionReader + ?Sized,
{
    fn get(&self, id: &str, version: Option<&str>) -> Result<PackDefinition, DefinitionReadError> {
        (**self).get(id, version)
    }
}

// ============================================================================
// SECTION: Command Payload
// ============================================================================

/// Synthetic command payload built from a step for policy evaluation.
///
/// # Invariants
/// - `command` is the resolved `command` parameter when the step carries one.
/// - `parameters` is the post-template-resolution snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandPayload {
    /// Action verb of the step.
    pub action: String,
    /// Resolved `command` parameter, when present and a string.
    pub command: Option<String>,
    /// Resolved step parameters.
    pub parameters: Map<String, Value>,
}

// ============================================================================
// SECTION: Risk Classifier
// ============================================================================

/// Pluggable classifier assigning a risk level to a would-be command.
pub trait RiskClassifier: Send + Sync {
    /// Classifies the payload; only [`RiskLevel::Low`] is special-cased by
    /// mutation inference.
    fn classify(&self, payload: &CommandPayload) -> RiskLevel;
}

// ============================================================================
// SECTION: Policy Simulator
// ============================================================================

/// Request handed to the policy simulator for one mutating step.
///
/// # Invariants
/// - `command` reflects the step after template resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicySimulationRequest {
    /// Metadata of the pack being executed.
    pub metadata: PackMetadata,
    /// Step identifier under evaluation.
    pub step_id: String,
    /// Action verb of the step.
    pub action: String,
    /// Synthetic command payload for the step.
    pub command: CommandPayload,
}

/// Raw simulator answer prior to normalization.
///
/// # Invariants
/// - Every field is optional; the policy gate defaults an absent outcome to
///   allow and an absent risk level to the classifier's answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulatorVerdict {
    /// Simulation outcome, when the simulator produced one.
    pub outcome: Option<PolicyOutcome>,
    /// Risk level, when the simulator produced one.
    pub risk_level: Option<RiskLevel>,
    /// Optional one-line summary.
    pub summary: Option<String>,
    /// Optional structured rationale.
    pub rationale: Option<Value>,
}

/// Pluggable policy simulator consulted for mutating steps.
#[async_trait]
pub trait PolicySimulator: Send + Sync {
    /// Simulates the step and returns a verdict; answers are taken as
    /// returned with no retry.
    async fn simulate(&self, request: &PolicySimulationRequest) -> SimulatorVerdict;
}

// ============================================================================
// SECTION: Action Runner
// ============================================================================

/// Action runner errors.
///
/// # Invariants
/// - [`ActionError::Timeout`] classifies the attempt as `timed_out`; every
///   other variant classifies it as `failed`.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The action exceeded its deadline.
    #[error("action timed out: {0}")]
    Timeout(String),
    /// The action failed.
    #[error("action failed: {0}")]
    Failed(String),
}

impl ActionError {
    /// Returns true when the error is a deadline or timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Request handed to the action runner for one attempt.
///
/// # Invariants
/// - `attempt` is 1-based; `rollback` is true only for rollback hook
///   invocations, which always carry `attempt == 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    /// Metadata of the pack being executed.
    pub metadata: PackMetadata,
    /// Execution identifier.
    pub execution_id: String,
    /// Step identifier.
    pub step_id: String,
    /// Action verb to interpret.
    pub action: String,
    /// Resolved parameters for the action.
    pub parameters: Map<String, Value>,
    /// Resolved inputs of the execution.
    pub inputs: Map<String, Value>,
    /// 1-based attempt number.
    pub attempt: u32,
    /// True when this invocation is a rollback hook.
    pub rollback: bool,
}

/// Result returned by a successful action invocation.
///
/// # Invariants
/// - Snippets are raw; the journal truncates them before recording.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    /// Output map recorded on the step.
    #[serde(default)]
    pub output: Map<String, Value>,
    /// Optional one-line message recorded as an artifact.
    pub message: Option<String>,
    /// Optional stdout capture recorded as a truncated snippet artifact.
    pub stdout_snippet: Option<String>,
    /// Optional stderr capture recorded as a truncated snippet artifact.
    pub stderr_snippet: Option<String>,
    /// Optional arbitrary payload recorded as an artifact.
    pub artifacts: Option<Map<String, Value>>,
}

/// Pluggable executor interpreting action verbs.
#[async_trait]
pub trait ActionRunner: Send + Sync {
    /// Runs one action attempt.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError`] when the action fails or times out; the
    /// runtime records the error on the attempt rather than propagating it.
    async fn run(&self, request: ActionRequest) -> Result<ActionResult, ActionError>;
}
