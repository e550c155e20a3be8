// crates/packrun-core/src/lib.rs
// ============================================================================
// Module: Packrun Core
// Description: Automation pack execution runtime with gating and rollback.
// Purpose: Execute declarative automation packs with policy simulation,
// approval checkpoints, bounded retries, LIFO rollback, and a deterministic
// timeline/artifact journal.
// Dependencies: async-trait, bigdecimal, regex, serde, serde_json, thiserror,
// time, tokio
// ============================================================================

//! ## Overview
//! Packrun executes automation packs: declarative, ordered sequences of
//! steps with typed inputs, expected outcomes, approval requirements, and
//! optional rollback hooks. The runtime validates definitions, resolves
//! inputs and templates, gates mutating steps through pluggable policy
//! simulation and operator approvals, retries attempts under bounded
//! per-attempt deadlines, rolls succeeded steps back in reverse order on
//! terminal failure, and journals a dense, replayable timeline of events and
//! typed artifacts.
//!
//! Integration happens through four narrow seams ([`DefinitionReader`],
//! [`PolicySimulator`], [`RiskClassifier`], [`ActionRunner`]) plus the
//! [`Clock`] time source; working defaults ship in
//! [`runtime::defaults`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use crate::core::ApprovalSpec;
pub use crate::core::Artifact;
pub use crate::core::ArtifactKind;
pub use crate::core::Clock;
pub use crate::core::EventType;
pub use crate::core::Execution;
pub use crate::core::ExecutionFailure;
pub use crate::core::ExecutionReplay;
pub use crate::core::ExecutionStatus;
pub use crate::core::ExecutionStep;
pub use crate::core::ExecutionStepAttempt;
pub use crate::core::FailureCategory;
pub use crate::core::InputConstraints;
pub use crate::core::InputSpec;
pub use crate::core::InputType;
pub use crate::core::OutcomeSpec;
pub use crate::core::PackDefinition;
pub use crate::core::PackMetadata;
pub use crate::core::PolicyOutcome;
pub use crate::core::PolicySimulation;
pub use crate::core::RiskLevel;
pub use crate::core::RollbackExecutionStep;
pub use crate::core::RollbackSpec;
pub use crate::core::RollbackStatus;
pub use crate::core::StepSpec;
pub use crate::core::StepStatus;
pub use crate::core::SystemClock;
pub use crate::core::TimelineEvent;
pub use crate::interfaces::ActionError;
pub use crate::interfaces::ActionRequest;
pub use crate::interfaces::ActionResult;
pub use crate::interfaces::ActionRunner;
pub use crate::interfaces::CommandPayload;
pub use crate::interfaces::DefinitionReadError;
pub use crate::interfaces::DefinitionReader;
pub use crate::interfaces::PolicySimulationRequest;
pub use crate::interfaces::PolicySimulator;
pub use crate::interfaces::RiskClassifier;
pub use crate::interfaces::SimulatorVerdict;
