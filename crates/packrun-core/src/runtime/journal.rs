// crates/packrun-core/src/runtime/journal.rs
// ============================================================================
// Module: Packrun Timeline Journal
// Description: Append-only event and artifact recording with dense sequences.
// Purpose: Assign deterministic identifiers and ordering to the audit trail.
// Dependencies: crate::core, serde_json, time
// ============================================================================

//! ## Overview
//! The journal owns the per-execution event and artifact counters. Every
//! append increments the corresponding dense sequence and derives the record
//! id from it, so identifiers never depend on wall-clock monotonicity. A
//! journal can be forked for the rollback task: the fork continues the
//! parent's counters, and absorbing it back preserves density even when the
//! rollback ran on another task.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use time::OffsetDateTime;

use crate::core::Artifact;
use crate::core::ArtifactKind;
use crate::core::EventType;
use crate::core::TimelineEvent;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum snippet length in characters before truncation.
pub(crate) const SNIPPET_MAX_CHARS: usize = 1024;

// ============================================================================
// SECTION: Record Fields
// ============================================================================

/// Optional fields attached to a timeline event.
#[derive(Debug, Default)]
pub(crate) struct EventFields {
    /// Step the event belongs to.
    pub step_id: Option<String>,
    /// Attempt number.
    pub attempt: Option<u32>,
    /// Status label.
    pub status: Option<String>,
    /// Human-readable message.
    pub message: Option<String>,
    /// Structured payload.
    pub data: Option<Value>,
}

/// Optional fields attached to an artifact.
#[derive(Debug, Default)]
pub(crate) struct ArtifactFields {
    /// Timeline event that produced the artifact.
    pub event_id: Option<String>,
    /// Step the artifact belongs to.
    pub step_id: Option<String>,
    /// Attempt number.
    pub attempt: Option<u32>,
    /// Artifact payload.
    pub data: Option<Value>,
}

// ============================================================================
// SECTION: Journal
// ============================================================================

/// Append-only journal for one execution.
///
/// # Invariants
/// - Event and artifact sequences are dense and strictly increasing from 1.
#[derive(Debug)]
pub(crate) struct Journal {
    /// Execution the journal belongs to.
    execution_id: String,
    /// Recorded events in sequence order.
    events: Vec<TimelineEvent>,
    /// Recorded artifacts in sequence order.
    artifacts: Vec<Artifact>,
    /// Next event sequence number.
    next_event_seq: u64,
    /// Next artifact sequence number.
    next_artifact_seq: u64,
}

impl Journal {
    /// Creates an empty journal for the execution.
    pub(crate) fn new(execution_id: impl Into<String>) -> Self {
        Self {
            execution_id: execution_id.into(),
            events: Vec::new(),
            artifacts: Vec::new(),
            next_event_seq: 1,
            next_artifact_seq: 1,
        }
    }

    /// Appends an event and returns its identifier.
    pub(crate) fn record_event(
        &mut self,
        timestamp: OffsetDateTime,
        event_type: EventType,
        fields: EventFields,
    ) -> String {
        let sequence = self.next_event_seq;
        self.next_event_seq += 1;
        let id = format!("{}-evt-{sequence:06}", self.execution_id);
        self.events.push(TimelineEvent {
            id: id.clone(),
            sequence,
            timestamp,
            event_type,
            step_id: fields.step_id,
            attempt: fields.attempt,
            status: fields.status,
            message: fields.message,
            data: fields.data,
        });
        id
    }

    /// Appends an artifact and returns its identifier.
    pub(crate) fn record_artifact(
        &mut self,
        timestamp: OffsetDateTime,
        kind: ArtifactKind,
        fields: ArtifactFields,
    ) -> String {
        let sequence = self.next_artifact_seq;
        self.next_artifact_seq += 1;
        let id = format!("{}-art-{sequence:06}", self.execution_id);
        self.artifacts.push(Artifact {
            id: id.clone(),
            kind,
            event_id: fields.event_id,
            step_id: fields.step_id,
            attempt: fields.attempt,
            timestamp,
            data: fields.data,
        });
        id
    }

    /// Forks an empty journal that continues this journal's sequences.
    pub(crate) fn fork(&self) -> Self {
        Self {
            execution_id: self.execution_id.clone(),
            events: Vec::new(),
            artifacts: Vec::new(),
            next_event_seq: self.next_event_seq,
            next_artifact_seq: self.next_artifact_seq,
        }
    }

    /// Absorbs a fork, extending the logs and adopting its counters.
    pub(crate) fn absorb(&mut self, fork: Self) {
        self.events.extend(fork.events);
        self.artifacts.extend(fork.artifacts);
        self.next_event_seq = fork.next_event_seq;
        self.next_artifact_seq = fork.next_artifact_seq;
    }

    /// Consumes the journal into its event and artifact logs.
    pub(crate) fn into_parts(self) -> (Vec<TimelineEvent>, Vec<Artifact>) {
        (self.events, self.artifacts)
    }
}

// ============================================================================
// SECTION: Snippets
// ============================================================================

/// Truncates a snippet to the cap, appending `…` when content was dropped.
pub(crate) fn truncate_snippet(snippet: &str) -> String {
    if snippet.chars().count() <= SNIPPET_MAX_CHARS {
        return snippet.to_string();
    }
    let mut truncated: String = snippet.chars().take(SNIPPET_MAX_CHARS).collect();
    truncated.push('…');
    truncated
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_docs_in_private_items,
    reason = "Test-only assertions and helpers are permitted."
)]
mod tests {
    use time::OffsetDateTime;

    use super::ArtifactFields;
    use super::EventFields;
    use super::Journal;
    use super::SNIPPET_MAX_CHARS;
    use super::truncate_snippet;
    use crate::core::ArtifactKind;
    use crate::core::EventType;

    #[test]
    fn sequences_are_dense_and_ids_zero_padded() {
        let mut journal = Journal::new("apexec-1-1");
        let now = OffsetDateTime::UNIX_EPOCH;
        let first = journal.record_event(now, EventType::ExecutionStarted, EventFields::default());
        let second = journal.record_event(now, EventType::ExecutionFinished, EventFields::default());
        assert_eq!(first, "apexec-1-1-evt-000001");
        assert_eq!(second, "apexec-1-1-evt-000002");

        let artifact =
            journal.record_artifact(now, ArtifactKind::ActionMessage, ArtifactFields::default());
        assert_eq!(artifact, "apexec-1-1-art-000001");

        let (events, artifacts) = journal.into_parts();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].sequence, 1);
        assert_eq!(events[1].sequence, 2);
        assert_eq!(artifacts.len(), 1);
    }

    #[test]
    fn fork_continues_sequences_after_absorb() {
        let mut journal = Journal::new("apexec-1-2");
        let now = OffsetDateTime::UNIX_EPOCH;
        journal.record_event(now, EventType::ExecutionStarted, EventFields::default());

        let mut fork = journal.fork();
        let forked = fork.record_event(now, EventType::RollbackStarted, EventFields::default());
        assert_eq!(forked, "apexec-1-2-evt-000002");

        journal.absorb(fork);
        let after = journal.record_event(now, EventType::ExecutionFinished, EventFields::default());
        assert_eq!(after, "apexec-1-2-evt-000003");
    }

    #[test]
    fn snippet_truncates_at_cap_with_ellipsis() {
        let long = "a".repeat(2000);
        let truncated = truncate_snippet(&long);
        assert_eq!(truncated.chars().count(), SNIPPET_MAX_CHARS + 1);
        assert!(truncated.ends_with('…'));

        let short = "short";
        assert_eq!(truncate_snippet(short), short);
    }
}
