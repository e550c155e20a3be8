// crates/packrun-core/src/runtime/engine.rs
// ============================================================================
// Module: Packrun Runtime Facade
// Description: Start/get/timeline/artifacts/replay over an in-memory registry.
// Purpose: Orchestrate validation, resolution, gating, execution, and reads.
// Dependencies: crate::core, crate::interfaces, crate::runtime
// ============================================================================

//! ## Overview
//! [`PackRuntime`] is the public face of the execution runtime. `start` is
//! synchronous from the caller's viewpoint: it validates the definition,
//! resolves inputs, drives the step loop to a terminal state, publishes the
//! execution into the registry, and returns a deep copy. Schema and input
//! errors surface before any journal entry exists; once an execution exists,
//! every terminal condition returns the fully journalled execution rather
//! than an error.
//!
//! The registry is guarded by a reader/writer lock. Reads take the read
//! lock and return deep copies; publishing and id sequencing take the write
//! lock.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::RwLock;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::core::Artifact;
use crate::core::Clock;
use crate::core::Execution;
use crate::core::ExecutionReplay;
use crate::core::ExecutionStatus;
use crate::core::ExecutionStep;
use crate::core::RollbackStatus;
use crate::core::StepStatus;
use crate::core::SystemClock;
use crate::core::TimelineEvent;
use crate::interfaces::ActionRunner;
use crate::interfaces::DefinitionReadError;
use crate::interfaces::DefinitionReader;
use crate::interfaces::PolicySimulator;
use crate::interfaces::RiskClassifier;
use crate::runtime::approval::ApprovalDecision;
use crate::runtime::defaults::DefaultPolicySimulator;
use crate::runtime::defaults::HeuristicRiskClassifier;
use crate::runtime::defaults::NoopRunner;
use crate::runtime::executor::ExecutionTask;
use crate::runtime::inputs::InputValidationError;
use crate::runtime::inputs::resolve_inputs;
use crate::runtime::journal::Journal;
use crate::runtime::preview::ExecutionPreview;
use crate::runtime::preview::build_preview;
use crate::runtime::validate::PackValidationError;
use crate::runtime::validate::validate_definition;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Default per-attempt timeout applied when a step declares 0 seconds.
pub const DEFAULT_STEP_TIMEOUT_SECS: u64 = 30;

/// Runtime configuration.
///
/// # Invariants
/// - `default_step_timeout_secs` is non-zero; a zero value would reintroduce
///   unbounded waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Per-attempt timeout in seconds for steps that declare 0.
    pub default_step_timeout_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            default_step_timeout_secs: DEFAULT_STEP_TIMEOUT_SECS,
        }
    }
}

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Request to start (or preview) an execution of a stored pack.
///
/// # Invariants
/// - `version: None` selects the latest stored version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StartRequest {
    /// Pack identifier to execute.
    pub pack_id: String,
    /// Pack version; `None` means latest.
    pub version: Option<String>,
    /// Caller-supplied inputs.
    #[serde(default)]
    pub inputs: Map<String, Value>,
    /// Workflow-scope approval decision applied to every mutating step.
    pub approval: Option<ApprovalDecision>,
    /// Step-scope approval decisions keyed by step id.
    #[serde(default)]
    pub step_approvals: BTreeMap<String, ApprovalDecision>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors surfaced by `start` and `preview` before an execution exists.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum StartError {
    /// Definition reader failed or the pack is unknown.
    #[error(transparent)]
    Definition(#[from] DefinitionReadError),
    /// Definition failed schema validation.
    #[error(transparent)]
    Validation(#[from] PackValidationError),
    /// Caller inputs failed resolution.
    #[error(transparent)]
    Inputs(#[from] InputValidationError),
    /// Execution registry is unavailable.
    #[error("execution registry unavailable: lock poisoned")]
    RegistryUnavailable,
}

/// Errors surfaced by registry reads.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Execution registry is unavailable.
    #[error("execution registry unavailable: lock poisoned")]
    Unavailable,
}

/// Errors surfaced while building a runtime.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum RuntimeBuildError {
    /// No definition reader was configured.
    #[error("runtime requires a definition reader")]
    MissingDefinitionReader,
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builder for a [`PackRuntime`].
///
/// # Invariants
/// - `build` succeeds only when a definition reader is configured.
/// - Runner, simulator, classifier, and clock fall back to the crate
///   defaults when not configured.
#[derive(Default)]
pub struct PackRuntimeBuilder {
    /// Definition reader supplying packs.
    reader: Option<Arc<dyn DefinitionReader>>,
    /// Action runner executing steps.
    runner: Option<Arc<dyn ActionRunner>>,
    /// Policy simulator consulted for mutating steps.
    simulator: Option<Arc<dyn PolicySimulator>>,
    /// Risk classifier used by mutation inference.
    classifier: Option<Arc<dyn RiskClassifier>>,
    /// Runtime time source.
    clock: Option<Arc<dyn Clock>>,
    /// Runtime configuration.
    config: Option<RuntimeConfig>,
}

impl PackRuntimeBuilder {
    /// Registers the definition reader.
    #[must_use]
    pub fn reader(mut self, reader: impl DefinitionReader + 'static) -> Self {
        self.reader = Some(Arc::new(reader));
        self
    }

    /// Registers the action runner.
    #[must_use]
    pub fn runner(mut self, runner: impl ActionRunner + 'static) -> Self {
        self.runner = Some(Arc::new(runner));
        self
    }

    /// Registers the policy simulator.
    #[must_use]
    pub fn simulator(mut self, simulator: impl PolicySimulator + 'static) -> Self {
        self.simulator = Some(Arc::new(simulator));
        self
    }

    /// Registers the risk classifier.
    #[must_use]
    pub fn classifier(mut self, classifier: impl RiskClassifier + 'static) -> Self {
        self.classifier = Some(Arc::new(classifier));
        self
    }

    /// Registers the time source.
    #[must_use]
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Overrides the runtime configuration.
    #[must_use]
    pub const fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Builds the runtime.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeBuildError::MissingDefinitionReader`] when no reader
    /// is configured.
    pub fn build(self) -> Result<PackRuntime, RuntimeBuildError> {
        let reader = self.reader.ok_or(RuntimeBuildError::MissingDefinitionReader)?;
        let classifier = self
            .classifier
            .unwrap_or_else(|| Arc::new(HeuristicRiskClassifier::default()));
        let simulator = self
            .simulator
            .unwrap_or_else(|| Arc::new(DefaultPolicySimulator::new(Arc::clone(&classifier))));
        Ok(PackRuntime {
            reader,
            runner: self.runner.unwrap_or_else(|| Arc::new(NoopRunner)),
            simulator,
            classifier,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            config: self.config.unwrap_or_default(),
            registry: RwLock::new(Registry::default()),
        })
    }
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Registry state guarded by the runtime's reader/writer lock.
#[derive(Default)]
struct Registry {
    /// Published executions keyed by id.
    executions: HashMap<String, Execution>,
    /// Monotonic execution id sequence.
    next_sequence: u64,
}

// ============================================================================
// SECTION: Runtime
// ============================================================================

/// Automation pack execution runtime.
///
/// # Invariants
/// - Published executions are immutable; reads return deep copies.
/// - Execution ids are unique per runtime instance.
pub struct PackRuntime {
    /// Definition reader supplying packs.
    reader: Arc<dyn DefinitionReader>,
    /// Action runner executing steps.
    runner: Arc<dyn ActionRunner>,
    /// Policy simulator consulted for mutating steps.
    simulator: Arc<dyn PolicySimulator>,
    /// Risk classifier used by mutation inference.
    classifier: Arc<dyn RiskClassifier>,
    /// Runtime time source.
    clock: Arc<dyn Clock>,
    /// Runtime configuration.
    config: RuntimeConfig,
    /// Execution registry and id sequence.
    registry: RwLock<Registry>,
}

impl PackRuntime {
    /// Returns a builder with crate defaults.
    #[must_use]
    pub fn builder() -> PackRuntimeBuilder {
        PackRuntimeBuilder::default()
    }

    /// Starts an execution and drives it to a terminal state.
    ///
    /// Schema and input errors return before any journal entry exists. Once
    /// an execution exists, every terminal condition (success, failure,
    /// policy or approval block) returns the journalled execution.
    ///
    /// # Errors
    ///
    /// Returns [`StartError`] for unknown packs, schema violations, input
    /// violations, or an unavailable registry.
    pub async fn start(&self, request: StartRequest) -> Result<Execution, StartError> {
        let mut definition = self
            .reader
            .get(&request.pack_id, request.version.as_deref())?;
        validate_definition(&mut definition)?;
        let resolved_inputs = resolve_inputs(&definition, &request.inputs)?;

        let execution_id = self.next_execution_id()?;
        let started_at = self.clock.now();
        let steps = definition
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| ExecutionStep {
                order: u32::try_from(index + 1).unwrap_or(u32::MAX),
                id: step.id.clone(),
                name: step.name.clone(),
                action: step.action.clone(),
                mutating: false,
                status: StepStatus::Pending,
                attempts: 0,
                max_retries: step.max_retries,
                timeout_seconds: step.timeout_seconds,
                started_at: None,
                finished_at: None,
                error: None,
                resolved_parameters: None,
                policy_simulation: None,
                attempt_history: Vec::new(),
                output: None,
                rollback: None,
            })
            .collect();
        let execution = Execution {
            id: execution_id.clone(),
            metadata: definition.metadata.clone(),
            status: ExecutionStatus::Pending,
            started_at,
            finished_at: None,
            resolved_inputs: resolved_inputs.clone(),
            steps,
            failure: None,
            rollback_status: RollbackStatus::NotRequired,
            rollback: Vec::new(),
            timeline: Vec::new(),
            artifacts: Vec::new(),
        };

        let task = ExecutionTask {
            definition,
            execution,
            journal: Journal::new(execution_id),
            resolved_inputs,
            succeeded: Vec::new(),
            workflow_decision: request.approval,
            step_decisions: request.step_approvals,
            runner: Arc::clone(&self.runner),
            simulator: Arc::clone(&self.simulator),
            classifier: Arc::clone(&self.classifier),
            clock: Arc::clone(&self.clock),
            config: self.config,
        };
        let execution = task.run().await;

        let mut registry = self
            .registry
            .write()
            .map_err(|_| StartError::RegistryUnavailable)?;
        registry
            .executions
            .insert(execution.id.clone(), execution.clone());
        drop(registry);
        Ok(execution)
    }

    /// Previews gating for an execution without invoking the runner.
    ///
    /// # Errors
    ///
    /// Returns [`StartError`] for unknown packs, schema violations, or input
    /// violations.
    pub async fn preview(&self, request: StartRequest) -> Result<ExecutionPreview, StartError> {
        let mut definition = self
            .reader
            .get(&request.pack_id, request.version.as_deref())?;
        validate_definition(&mut definition)?;
        let resolved_inputs = resolve_inputs(&definition, &request.inputs)?;
        Ok(build_preview(
            &definition,
            &resolved_inputs,
            request.approval.as_ref(),
            &request.step_approvals,
            self.simulator.as_ref(),
            self.classifier.as_ref(),
        )
        .await)
    }

    /// Returns a deep copy of a published execution.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unavailable`] when the registry lock is
    /// poisoned.
    pub fn get(&self, execution_id: &str) -> Result<Option<Execution>, RegistryError> {
        let registry = self.registry.read().map_err(|_| RegistryError::Unavailable)?;
        Ok(registry.executions.get(execution_id).cloned())
    }

    /// Returns a deep copy of an execution's timeline.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unavailable`] when the registry lock is
    /// poisoned.
    pub fn get_timeline(
        &self,
        execution_id: &str,
    ) -> Result<Option<Vec<TimelineEvent>>, RegistryError> {
        let registry = self.registry.read().map_err(|_| RegistryError::Unavailable)?;
        Ok(registry
            .executions
            .get(execution_id)
            .map(|execution| execution.timeline.clone()))
    }

    /// Returns a deep copy of an execution's artifacts.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unavailable`] when the registry lock is
    /// poisoned.
    pub fn get_artifacts(
        &self,
        execution_id: &str,
    ) -> Result<Option<Vec<Artifact>>, RegistryError> {
        let registry = self.registry.read().map_err(|_| RegistryError::Unavailable)?;
        Ok(registry
            .executions
            .get(execution_id)
            .map(|execution| execution.artifacts.clone()))
    }

    /// Returns the deterministic replay view for an execution.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Unavailable`] when the registry lock is
    /// poisoned.
    pub fn get_replay(
        &self,
        execution_id: &str,
    ) -> Result<Option<ExecutionReplay>, RegistryError> {
        let registry = self.registry.read().map_err(|_| RegistryError::Unavailable)?;
        Ok(registry.executions.get(execution_id).map(build_replay))
    }

    /// Mints the next execution id under the registry write lock.
    fn next_execution_id(&self) -> Result<String, StartError> {
        let mut registry = self
            .registry
            .write()
            .map_err(|_| StartError::RegistryUnavailable)?;
        registry.next_sequence += 1;
        let sequence = registry.next_sequence;
        drop(registry);
        let unix_nano = self.clock.now().unix_timestamp_nanos();
        Ok(format!("apexec-{unix_nano}-{sequence}"))
    }
}

/// Builds the replay view by iterating the timeline in sequence order.
fn build_replay(execution: &Execution) -> ExecutionReplay {
    ExecutionReplay {
        execution_id: execution.id.clone(),
        deterministic_order: true,
        event_count: execution.timeline.len(),
        artifact_count: execution.artifacts.len(),
        ordered_event_ids: execution
            .timeline
            .iter()
            .map(|event| event.id.clone())
            .collect(),
        first_timestamp: execution.timeline.first().map(|event| event.timestamp),
        last_timestamp: execution.timeline.last().map(|event| event.timestamp),
    }
}
