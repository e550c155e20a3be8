// crates/packrun-core/src/runtime/mod.rs
// ============================================================================
// Module: Packrun Runtime
// Description: Validation, resolution, gating, execution, and the facade.
// Purpose: Group the behavior that turns definitions into executions.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! The runtime composes the guarded execution pipeline: validator, input
//! resolver, template resolver, mutation classifier, policy and approval
//! gates, the retrying step executor with LIFO rollback, the journal, and
//! the [`PackRuntime`] facade that fronts them.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod approval;
pub mod classify;
pub mod defaults;
mod engine;
mod executor;
pub mod inputs;
mod journal;
pub mod policy;
mod preview;
pub mod template;
pub mod validate;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use self::approval::ApprovalDecision;
pub use self::approval::ApprovalEvaluation;
pub use self::approval::ApprovalScope;
pub use self::approval::evaluate_approval;
pub use self::classify::Classification;
pub use self::classify::classify_step;
pub use self::classify::command_payload;
pub use self::defaults::DefaultPolicySimulator;
pub use self::defaults::HeuristicRiskClassifier;
pub use self::defaults::NoopRunner;
pub use self::engine::DEFAULT_STEP_TIMEOUT_SECS;
pub use self::engine::PackRuntime;
pub use self::engine::PackRuntimeBuilder;
pub use self::engine::RegistryError;
pub use self::engine::RuntimeBuildError;
pub use self::engine::RuntimeConfig;
pub use self::engine::StartError;
pub use self::engine::StartRequest;
pub use self::inputs::InputValidationError;
pub use self::inputs::resolve_inputs;
pub use self::preview::ExecutionPreview;
pub use self::preview::StepPreview;
pub use self::template::resolve_parameters;
pub use self::template::resolve_value;
pub use self::validate::PackValidationError;
pub use self::validate::validate_definition;
