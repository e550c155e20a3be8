// crates/packrun-core/src/core/timeline.rs
// ============================================================================
// Module: Packrun Timeline Model
// Description: Sequenced lifecycle events, typed artifacts, and replay view.
// Purpose: Give every execution a deterministic, audit-ready event log.
// Dependencies: serde, serde_json, time
// ============================================================================

//! ## Overview
//! Timeline events and artifacts are the audit trail of an execution. Both
//! streams carry dense, 1-based sequence numbers assigned from per-execution
//! counters, never from the wall clock, so identifiers stay unique and replay
//! stays deterministic regardless of clock behavior. The event and artifact
//! type vocabularies are part of the external contract and serialize
//! verbatim.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;

// ============================================================================
// SECTION: Event Types
// ============================================================================

/// Closed vocabulary of timeline event types.
///
/// # Invariants
/// - Wire labels are emitted verbatim; they are part of the external
///   contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    /// Execution entered its step loop.
    #[serde(rename = "execution.started")]
    ExecutionStarted,
    /// Execution reached a terminal state.
    #[serde(rename = "execution.finished")]
    ExecutionFinished,
    /// Step began, before gating.
    #[serde(rename = "step.started")]
    StepStarted,
    /// Policy gate evaluated a mutating step.
    #[serde(rename = "step.policy_evaluated")]
    StepPolicyEvaluated,
    /// Approval requirement reached for a mutating step.
    #[serde(rename = "step.approval_checkpoint")]
    StepApprovalCheckpoint,
    /// Approval decision recorded for a mutating step.
    #[serde(rename = "step.approval_decision")]
    StepApprovalDecision,
    /// Step attempt began.
    #[serde(rename = "step.attempt.started")]
    StepAttemptStarted,
    /// Step attempt finished with a result.
    #[serde(rename = "step.attempt.result")]
    StepAttemptResult,
    /// Step reached a terminal status.
    #[serde(rename = "step.finished")]
    StepFinished,
    /// Policy or approval gate blocked a step.
    #[serde(rename = "step.blocked")]
    StepBlocked,
    /// Downstream step skipped after termination.
    #[serde(rename = "step.skipped")]
    StepSkipped,
    /// Rollback hook invocation began.
    #[serde(rename = "rollback.started")]
    RollbackStarted,
    /// Rollback hook invocation finished.
    #[serde(rename = "rollback.finished")]
    RollbackFinished,
}

impl EventType {
    /// Returns the stable wire label for the event type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExecutionStarted => "execution.started",
            Self::ExecutionFinished => "execution.finished",
            Self::StepStarted => "step.started",
            Self::StepPolicyEvaluated => "step.policy_evaluated",
            Self::StepApprovalCheckpoint => "step.approval_checkpoint",
            Self::StepApprovalDecision => "step.approval_decision",
            Self::StepAttemptStarted => "step.attempt.started",
            Self::StepAttemptResult => "step.attempt.result",
            Self::StepFinished => "step.finished",
            Self::StepBlocked => "step.blocked",
            Self::StepSkipped => "step.skipped",
            Self::RollbackStarted => "rollback.started",
            Self::RollbackFinished => "rollback.finished",
        }
    }
}

/// One sequenced lifecycle event.
///
/// # Invariants
/// - `id` is `{execution_id}-evt-{sequence:06}`.
/// - `sequence` is dense and strictly increasing from 1 within an execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// Event identifier derived from the execution id and sequence.
    pub id: String,
    /// 1-based dense sequence number.
    pub sequence: u64,
    /// Event timestamp from the runtime clock.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Event type.
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Step the event belongs to, when step-scoped.
    pub step_id: Option<String>,
    /// Attempt number, when attempt-scoped.
    pub attempt: Option<u32>,
    /// Status label carried by the event, when applicable.
    pub status: Option<String>,
    /// Human-readable message, when applicable.
    pub message: Option<String>,
    /// Structured event payload.
    pub data: Option<Value>,
}

// ============================================================================
// SECTION: Artifacts
// ============================================================================

/// Closed vocabulary of artifact types.
///
/// # Invariants
/// - Wire labels are emitted verbatim; they are part of the external
///   contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Structured policy outcome and rationale.
    PolicyRationale,
    /// Approval evaluation snapshot.
    ApprovalCheckpoint,
    /// Captured stdout, truncated to the snippet cap.
    StdoutSnippet,
    /// Captured stderr, truncated to the snippet cap.
    StderrSnippet,
    /// One-line message returned by an action.
    ActionMessage,
    /// Arbitrary map payload returned by an action.
    ActionPayload,
    /// Error context for failed attempts, gates, and rollback hooks.
    ErrorContext,
}

impl ArtifactKind {
    /// Returns the stable wire label for the artifact type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PolicyRationale => "policy_rationale",
            Self::ApprovalCheckpoint => "approval_checkpoint",
            Self::StdoutSnippet => "stdout_snippet",
            Self::StderrSnippet => "stderr_snippet",
            Self::ActionMessage => "action_message",
            Self::ActionPayload => "action_payload",
            Self::ErrorContext => "error_context",
        }
    }
}

/// One typed artifact attached to the execution's audit trail.
///
/// # Invariants
/// - `id` is `{execution_id}-art-{sequence:06}` with a dense sequence.
/// - `event_id`, when present, references the timeline event that produced
///   the artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    /// Artifact identifier derived from the execution id and sequence.
    pub id: String,
    /// Artifact type.
    #[serde(rename = "type")]
    pub kind: ArtifactKind,
    /// Timeline event that produced the artifact, when known.
    pub event_id: Option<String>,
    /// Step the artifact belongs to, when step-scoped.
    pub step_id: Option<String>,
    /// Attempt number, when attempt-scoped.
    pub attempt: Option<u32>,
    /// Artifact timestamp from the runtime clock.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Artifact payload.
    pub data: Option<Value>,
}

// ============================================================================
// SECTION: Replay View
// ============================================================================

/// Deterministic read-only ordering view over a completed execution.
///
/// # Invariants
/// - `ordered_event_ids` equals the timeline's event ids in sequence order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReplay {
    /// Execution the view describes.
    pub execution_id: String,
    /// Always true; replay order is total.
    pub deterministic_order: bool,
    /// Number of timeline events.
    pub event_count: usize,
    /// Number of artifacts.
    pub artifact_count: usize,
    /// Event identifiers in sequence order.
    pub ordered_event_ids: Vec<String>,
    /// Timestamp of the first event, when any.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub first_timestamp: Option<OffsetDateTime>,
    /// Timestamp of the last event, when any.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_timestamp: Option<OffsetDateTime>,
}
