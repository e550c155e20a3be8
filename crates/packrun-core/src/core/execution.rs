// crates/packrun-core/src/core/execution.rs
// ============================================================================
// Module: Packrun Execution Model
// Description: Execution records, step attempts, rollback entries, failures.
// Purpose: Capture the full deterministic history of one pack execution.
// Dependencies: crate::core::{definition, timeline}, serde, time
// ============================================================================

//! ## Overview
//! An [`Execution`] is created by the runtime facade on start, mutated only
//! within that single start invocation, then published into the in-memory
//! registry. Published executions are immutable from the outside; reads hand
//! out deep copies. The timeline and artifact logs grow append-only during
//! the run and freeze at the terminal event.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use time::OffsetDateTime;

use crate::core::definition::PackMetadata;
use crate::core::timeline::Artifact;
use crate::core::timeline::TimelineEvent;

// ============================================================================
// SECTION: Status Vocabulary
// ============================================================================

/// Execution lifecycle status.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Execution has been created but not started.
    Pending,
    /// Execution is running its step loop.
    Running,
    /// Every step succeeded.
    Succeeded,
    /// A step exhausted its attempts with an error.
    Failed,
    /// A policy or approval gate stopped the execution.
    Blocked,
}

impl ExecutionStatus {
    /// Returns a stable label for the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Blocked => "blocked",
        }
    }
}

/// Step lifecycle status.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
/// - A step is `succeeded` iff at least one attempt returned no error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Step has not started.
    Pending,
    /// Step is executing attempts.
    Running,
    /// An attempt completed without error.
    Succeeded,
    /// The final attempt returned a non-timeout error.
    Failed,
    /// The final attempt exceeded its deadline.
    TimedOut,
    /// A policy or approval gate stopped the step before any attempt.
    Blocked,
    /// A prior step terminated the execution before this step ran.
    Skipped,
}

impl StepStatus {
    /// Returns a stable label for the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
            Self::Blocked => "blocked",
            Self::Skipped => "skipped",
        }
    }
}

/// Rollback accounting for a terminal execution.
///
/// # Invariants
/// - `NotRequired` iff no rollback hook was invoked.
/// - `Completed` iff every invoked hook succeeded.
/// - `Partial` iff at least one invoked hook failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RollbackStatus {
    /// No succeeded step declared a rollback hook.
    NotRequired,
    /// Every invoked rollback hook succeeded.
    Completed,
    /// At least one rollback hook failed; remaining hooks still ran.
    Partial,
}

impl RollbackStatus {
    /// Returns a stable label for the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotRequired => "not_required",
            Self::Completed => "completed",
            Self::Partial => "partial",
        }
    }
}

// ============================================================================
// SECTION: Policy Vocabulary
// ============================================================================

/// Normalized policy simulation outcome.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
/// - Ordering ranks severity: `Allow < Queue < Deny`. Merging outcomes takes
///   the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyOutcome {
    /// Step may proceed to approval evaluation.
    Allow,
    /// Step must be queued for out-of-band approval.
    Queue,
    /// Step is denied outright.
    Deny,
}

impl PolicyOutcome {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Queue => "queue",
            Self::Deny => "deny",
        }
    }
}

/// Risk level attached to a would-be command.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
/// - Only `Low` is special-cased by mutation inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Read-only or otherwise harmless.
    Low,
    /// State-changing but routine.
    Medium,
    /// State-changing with broad blast radius.
    High,
    /// Destructive or irreversible.
    Critical,
}

impl RiskLevel {
    /// Returns a stable label for the risk level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Recorded policy simulation for a mutating step.
///
/// # Invariants
/// - `outcome` and `risk_level` are already normalized; empty simulator
///   answers default to `Allow` and classifier-derived risk respectively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicySimulation {
    /// Normalized simulation outcome.
    pub outcome: PolicyOutcome,
    /// Normalized risk level.
    pub risk_level: RiskLevel,
    /// Optional one-line simulator summary.
    pub summary: Option<String>,
    /// Optional structured simulator rationale.
    pub rationale: Option<Value>,
}

// ============================================================================
// SECTION: Failures
// ============================================================================

/// Category of a terminal execution failure.
///
/// # Invariants
/// - Variants are stable for serialization and contract matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    /// A step attempt failed or timed out.
    Execution,
    /// The policy gate queued or denied a step.
    Policy,
    /// An approval requirement was not satisfied.
    Approval,
}

impl FailureCategory {
    /// Returns a stable label for the category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Execution => "execution",
            Self::Policy => "policy",
            Self::Approval => "approval",
        }
    }
}

/// Terminal failure description attached to failed or blocked executions.
///
/// # Invariants
/// - `step_id` names the step at which the execution terminated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionFailure {
    /// Step at which the execution terminated.
    pub step_id: Option<String>,
    /// Failure category.
    pub category: FailureCategory,
    /// Human-readable failure message.
    pub message: String,
}

// ============================================================================
// SECTION: Step Records
// ============================================================================

/// One attempt of a step.
///
/// # Invariants
/// - `attempt` is 1-based and dense within the step's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionStepAttempt {
    /// 1-based attempt number.
    pub attempt: u32,
    /// Attempt status (`succeeded`, `failed`, or `timed_out`).
    pub status: StepStatus,
    /// Attempt start time.
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    /// Attempt finish time.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub finished_at: Option<OffsetDateTime>,
    /// Error produced by the attempt, if any.
    pub error: Option<String>,
}

/// Rollback hook invocation record.
///
/// # Invariants
/// - Entries exist only for steps that previously succeeded and declared a
///   rollback hook; ordering is the reverse of the succeeded order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollbackExecutionStep {
    /// Step whose hook was invoked.
    pub step_id: String,
    /// Rollback action verb.
    pub action: String,
    /// Hook invocation status (`succeeded` or `failed`).
    pub status: StepStatus,
    /// Hook start time.
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    /// Hook finish time.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub finished_at: Option<OffsetDateTime>,
    /// Error produced by the hook, if any.
    pub error: Option<String>,
    /// Output map returned by the hook, if any.
    pub output: Option<Map<String, Value>>,
}

/// Execution record for one step.
///
/// # Invariants
/// - `order` is 1-based and matches the step's position in the definition.
/// - `attempts == attempt_history.len()` and
///   `1 <= attempts <= max_retries + 1` for any step that ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStep {
    /// 1-based position within the pack.
    pub order: u32,
    /// Step identifier.
    pub id: String,
    /// Optional human-readable step name.
    pub name: Option<String>,
    /// Action verb.
    pub action: String,
    /// Whether the step was classified as mutating.
    pub mutating: bool,
    /// Terminal or current step status.
    pub status: StepStatus,
    /// Number of attempts performed.
    pub attempts: u32,
    /// Declared retry budget.
    pub max_retries: u32,
    /// Declared per-attempt timeout in seconds (0 = runtime default).
    pub timeout_seconds: u64,
    /// Step start time.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub started_at: Option<OffsetDateTime>,
    /// Step finish time.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub finished_at: Option<OffsetDateTime>,
    /// Terminal error message, if any.
    pub error: Option<String>,
    /// Parameters after template resolution.
    pub resolved_parameters: Option<Map<String, Value>>,
    /// Policy simulation recorded for mutating steps.
    pub policy_simulation: Option<PolicySimulation>,
    /// Per-attempt history.
    pub attempt_history: Vec<ExecutionStepAttempt>,
    /// Output map from the successful attempt, if any.
    pub output: Option<Map<String, Value>>,
    /// Rollback invocation record for this step, if its hook ran.
    pub rollback: Option<RollbackExecutionStep>,
}

// ============================================================================
// SECTION: Execution
// ============================================================================

/// Complete record of one automation pack execution.
///
/// # Invariants
/// - `timeline` sequences are dense and strictly increasing from 1;
///   `artifacts` likewise.
/// - The first timeline event is `execution.started` and the last is
///   `execution.finished` for any terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    /// Execution identifier (`apexec-{unix_nano}-{seq}`).
    pub id: String,
    /// Metadata of the executed pack.
    pub metadata: PackMetadata,
    /// Execution lifecycle status.
    pub status: ExecutionStatus,
    /// Execution start time.
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    /// Execution finish time.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub finished_at: Option<OffsetDateTime>,
    /// Snapshot of resolved inputs.
    pub resolved_inputs: Map<String, Value>,
    /// Per-step execution records.
    pub steps: Vec<ExecutionStep>,
    /// Terminal failure description for failed or blocked executions.
    pub failure: Option<ExecutionFailure>,
    /// Rollback accounting.
    pub rollback_status: RollbackStatus,
    /// Rollback hook invocations in reverse succeeded order.
    pub rollback: Vec<RollbackExecutionStep>,
    /// Append-only lifecycle event log.
    pub timeline: Vec<TimelineEvent>,
    /// Append-only typed artifact log.
    pub artifacts: Vec<Artifact>,
}
