// crates/packrun-core/src/runtime/executor.rs
// ============================================================================
// Module: Packrun Step Executor
// Description: Sequential step loop, retry/timeout handling, and rollback.
// Purpose: Drive one execution from its first step to a terminal state.
// Dependencies: crate::core, crate::interfaces, crate::runtime, tokio
// ============================================================================

//! ## Overview
//! Steps run strictly sequentially. Each step resolves its parameters, is
//! classified, gated when mutating, and then attempted up to
//! `max_retries + 1` times under a per-attempt deadline enforced with a
//! bounded wait. A terminal failure or block marks downstream pending steps
//! skipped and triggers best-effort LIFO rollback of succeeded steps.
//!
//! The rollback loop runs on a spawned task that owns everything it needs,
//! so cancellation of the caller's `start` future cannot tear down cleanup;
//! the task's journal fork is absorbed back once it completes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use time::OffsetDateTime;

use crate::core::ArtifactKind;
use crate::core::Clock;
use crate::core::EventType;
use crate::core::Execution;
use crate::core::ExecutionFailure;
use crate::core::ExecutionStatus;
use crate::core::ExecutionStepAttempt;
use crate::core::FailureCategory;
use crate::core::PackDefinition;
use crate::core::PackMetadata;
use crate::core::RollbackExecutionStep;
use crate::core::RollbackStatus;
use crate::core::StepStatus;
use crate::interfaces::ActionError;
use crate::interfaces::ActionRequest;
use crate::interfaces::ActionResult;
use crate::interfaces::ActionRunner;
use crate::interfaces::PolicySimulator;
use crate::interfaces::RiskClassifier;
use crate::runtime::approval::ApprovalDecision;
use crate::runtime::approval::ApprovalEvaluation;
use crate::runtime::approval::ApprovalScope;
use crate::runtime::approval::evaluate_approval;
use crate::runtime::classify::classify_step;
use crate::runtime::engine::RuntimeConfig;
use crate::runtime::journal::ArtifactFields;
use crate::runtime::journal::EventFields;
use crate::runtime::journal::Journal;
use crate::runtime::journal::truncate_snippet;
use crate::runtime::policy::block_message;
use crate::runtime::policy::simulate_policy;
use crate::runtime::template::resolve_parameters;

// ============================================================================
// SECTION: Step Outcomes
// ============================================================================

/// Terminal outcome of one step within the loop.
enum StepOutcome {
    /// Step succeeded; the loop continues.
    Succeeded,
    /// Step exhausted its attempts with an error.
    Failed {
        /// Final attempt error message.
        message: String,
    },
    /// A policy or approval gate stopped the step.
    Blocked {
        /// Failure category (`policy` or `approval`).
        category: FailureCategory,
        /// Gate message.
        message: String,
    },
}

// ============================================================================
// SECTION: Execution Task
// ============================================================================

/// Owned state for one in-flight execution.
///
/// # Invariants
/// - `execution.steps` is index-aligned with `definition.steps`.
/// - `succeeded` lists step indexes in chronological success order.
pub(crate) struct ExecutionTask {
    /// Validated definition being executed.
    pub definition: PackDefinition,
    /// Execution record under construction.
    pub execution: Execution,
    /// Journal collecting events and artifacts.
    pub journal: Journal,
    /// Resolved inputs snapshot.
    pub resolved_inputs: Map<String, Value>,
    /// Indexes of succeeded steps in success order.
    pub succeeded: Vec<usize>,
    /// Workflow-scope approval decision, applied to every mutating step.
    pub workflow_decision: Option<ApprovalDecision>,
    /// Step-scope approval decisions keyed by step id.
    pub step_decisions: BTreeMap<String, ApprovalDecision>,
    /// Pluggable action runner.
    pub runner: Arc<dyn ActionRunner>,
    /// Pluggable policy simulator.
    pub simulator: Arc<dyn PolicySimulator>,
    /// Pluggable risk classifier.
    pub classifier: Arc<dyn RiskClassifier>,
    /// Runtime time source.
    pub clock: Arc<dyn Clock>,
    /// Runtime configuration.
    pub config: RuntimeConfig,
}

impl ExecutionTask {
    /// Runs the full lifecycle and returns the terminal execution.
    pub(crate) async fn run(mut self) -> Execution {
        let started = self.clock.now();
        self.execution.status = ExecutionStatus::Running;
        self.journal.record_event(
            started,
            EventType::ExecutionStarted,
            EventFields {
                status: Some(ExecutionStatus::Running.as_str().to_string()),
                data: Some(json!({
                    "pack_id": self.execution.metadata.id,
                    "version": self.execution.metadata.version,
                    "step_count": self.definition.steps.len(),
                })),
                ..EventFields::default()
            },
        );

        for index in 0..self.definition.steps.len() {
            match self.run_step(index).await {
                StepOutcome::Succeeded => {}
                StepOutcome::Failed { message } => {
                    return self.fail(index, message).await;
                }
                StepOutcome::Blocked { category, message } => {
                    return self.block(index, category, message).await;
                }
            }
        }
        self.finish(ExecutionStatus::Succeeded, None)
    }

    /// Runs one step through gating and its retry loop.
    async fn run_step(&mut self, index: usize) -> StepOutcome {
        let step = self.definition.steps[index].clone();
        let resolved = step
            .parameters
            .as_ref()
            .map(|parameters| resolve_parameters(parameters, &self.resolved_inputs))
            .unwrap_or_default();
        let classification = classify_step(&step, &resolved, self.classifier.as_ref());

        let now = self.clock.now();
        {
            let record = &mut self.execution.steps[index];
            record.mutating = classification.mutating;
            record.status = StepStatus::Running;
            record.started_at = Some(now);
            record.resolved_parameters = Some(resolved.clone());
        }
        self.journal.record_event(
            now,
            EventType::StepStarted,
            EventFields {
                step_id: Some(step.id.clone()),
                status: Some(StepStatus::Running.as_str().to_string()),
                data: Some(json!({
                    "order": self.execution.steps[index].order,
                    "action": step.action,
                    "mutating": classification.mutating,
                })),
                ..EventFields::default()
            },
        );

        if classification.mutating {
            let simulation = simulate_policy(
                self.simulator.as_ref(),
                self.classifier.as_ref(),
                &self.definition.metadata,
                &step,
                &resolved,
                classification.risk_level,
            )
            .await;
            let evaluated_at = self.clock.now();
            let event_id = self.journal.record_event(
                evaluated_at,
                EventType::StepPolicyEvaluated,
                EventFields {
                    step_id: Some(step.id.clone()),
                    status: Some(simulation.outcome.as_str().to_string()),
                    data: Some(json!({
                        "outcome": simulation.outcome,
                        "risk_level": simulation.risk_level,
                        "summary": simulation.summary,
                        "rationale": simulation.rationale,
                    })),
                    ..EventFields::default()
                },
            );
            self.journal.record_artifact(
                evaluated_at,
                ArtifactKind::PolicyRationale,
                ArtifactFields {
                    event_id: Some(event_id),
                    step_id: Some(step.id.clone()),
                    data: Some(json!({
                        "outcome": simulation.outcome,
                        "risk_level": simulation.risk_level,
                        "summary": simulation.summary,
                        "rationale": simulation.rationale,
                    })),
                    ..ArtifactFields::default()
                },
            );
            let blocked = block_message(&step.id, &simulation);
            self.execution.steps[index].policy_simulation = Some(simulation);
            if let Some(message) = blocked {
                return StepOutcome::Blocked {
                    category: FailureCategory::Policy,
                    message,
                };
            }

            let workflow_requirement = self.definition.approval.clone();
            if let Some(requirement) = workflow_requirement
                && let Some(evaluation) = evaluate_approval(
                    ApprovalScope::Workflow,
                    &requirement,
                    self.workflow_decision.as_ref(),
                )
            {
                self.journal_approval(&step.id, &evaluation);
                if !evaluation.approved {
                    return StepOutcome::Blocked {
                        category: FailureCategory::Approval,
                        message: evaluation.reason,
                    };
                }
            }
            if let Some(requirement) = &step.approval
                && let Some(evaluation) = evaluate_approval(
                    ApprovalScope::Step,
                    requirement,
                    self.step_decisions.get(&step.id),
                )
            {
                self.journal_approval(&step.id, &evaluation);
                if !evaluation.approved {
                    return StepOutcome::Blocked {
                        category: FailureCategory::Approval,
                        message: evaluation.reason,
                    };
                }
            }
        }

        let timeout = effective_timeout(step.timeout_seconds, &self.config);
        let max_attempts = step.max_retries.saturating_add(1);
        let mut attempt = 1_u32;
        loop {
            let attempt_started = self.clock.now();
            self.journal.record_event(
                attempt_started,
                EventType::StepAttemptStarted,
                EventFields {
                    step_id: Some(step.id.clone()),
                    attempt: Some(attempt),
                    ..EventFields::default()
                },
            );
            let request = ActionRequest {
                metadata: self.definition.metadata.clone(),
                execution_id: self.execution.id.clone(),
                step_id: step.id.clone(),
                action: step.action.clone(),
                parameters: resolved.clone(),
                inputs: self.resolved_inputs.clone(),
                attempt,
                rollback: false,
            };
            let outcome = run_action(self.runner.as_ref(), request, timeout).await;
            let attempt_finished = self.clock.now();
            match outcome {
                Ok(result) => {
                    let record = &mut self.execution.steps[index];
                    record.attempts = attempt;
                    record.attempt_history.push(ExecutionStepAttempt {
                        attempt,
                        status: StepStatus::Succeeded,
                        started_at: attempt_started,
                        finished_at: Some(attempt_finished),
                        error: None,
                    });
                    record.output = Some(result.output.clone());
                    record.status = StepStatus::Succeeded;
                    record.finished_at = Some(attempt_finished);
                    let event_id = self.journal.record_event(
                        attempt_finished,
                        EventType::StepAttemptResult,
                        EventFields {
                            step_id: Some(step.id.clone()),
                            attempt: Some(attempt),
                            status: Some(StepStatus::Succeeded.as_str().to_string()),
                            ..EventFields::default()
                        },
                    );
                    record_action_artifacts(
                        &mut self.journal,
                        attempt_finished,
                        Some(&step.id),
                        Some(attempt),
                        Some(&event_id),
                        &result,
                    );
                    self.journal.record_event(
                        attempt_finished,
                        EventType::StepFinished,
                        EventFields {
                            step_id: Some(step.id.clone()),
                            status: Some(StepStatus::Succeeded.as_str().to_string()),
                            ..EventFields::default()
                        },
                    );
                    self.succeeded.push(index);
                    return StepOutcome::Succeeded;
                }
                Err(error) => {
                    let timed_out = error.is_timeout();
                    let status = if timed_out {
                        StepStatus::TimedOut
                    } else {
                        StepStatus::Failed
                    };
                    let message = error.to_string();
                    {
                        let record = &mut self.execution.steps[index];
                        record.attempts = attempt;
                        record.attempt_history.push(ExecutionStepAttempt {
                            attempt,
                            status,
                            started_at: attempt_started,
                            finished_at: Some(attempt_finished),
                            error: Some(message.clone()),
                        });
                    }
                    let event_id = self.journal.record_event(
                        attempt_finished,
                        EventType::StepAttemptResult,
                        EventFields {
                            step_id: Some(step.id.clone()),
                            attempt: Some(attempt),
                            status: Some(status.as_str().to_string()),
                            message: Some(message.clone()),
                            ..EventFields::default()
                        },
                    );
                    self.journal.record_artifact(
                        attempt_finished,
                        ArtifactKind::ErrorContext,
                        ArtifactFields {
                            event_id: Some(event_id),
                            step_id: Some(step.id.clone()),
                            attempt: Some(attempt),
                            data: Some(json!({
                                "phase": "step",
                                "action": step.action,
                                "error": message,
                                "timeout": timed_out,
                            })),
                        },
                    );
                    if attempt >= max_attempts {
                        let record = &mut self.execution.steps[index];
                        record.status = status;
                        record.error = Some(message.clone());
                        record.finished_at = Some(attempt_finished);
                        self.journal.record_event(
                            attempt_finished,
                            EventType::StepFinished,
                            EventFields {
                                step_id: Some(step.id.clone()),
                                status: Some(status.as_str().to_string()),
                                message: Some(message.clone()),
                                ..EventFields::default()
                            },
                        );
                        return StepOutcome::Failed { message };
                    }
                    attempt += 1;
                }
            }
        }
    }

    /// Journals an approval checkpoint/decision pair and its artifact.
    fn journal_approval(&mut self, step_id: &str, evaluation: &ApprovalEvaluation) {
        let now = self.clock.now();
        let data = json!({
            "scope": evaluation.scope,
            "minimum_approvers": evaluation.minimum_approvers,
            "approved": evaluation.approved,
            "reason": evaluation.reason,
        });
        let checkpoint_id = self.journal.record_event(
            now,
            EventType::StepApprovalCheckpoint,
            EventFields {
                step_id: Some(step_id.to_string()),
                message: Some(evaluation.reason.clone()),
                data: Some(data.clone()),
                ..EventFields::default()
            },
        );
        self.journal.record_event(
            now,
            EventType::StepApprovalDecision,
            EventFields {
                step_id: Some(step_id.to_string()),
                status: Some(
                    if evaluation.approved { "approved" } else { "rejected" }.to_string(),
                ),
                message: Some(evaluation.reason.clone()),
                data: Some(data.clone()),
                ..EventFields::default()
            },
        );
        self.journal.record_artifact(
            now,
            ArtifactKind::ApprovalCheckpoint,
            ArtifactFields {
                event_id: Some(checkpoint_id),
                step_id: Some(step_id.to_string()),
                data: Some(data),
                ..ArtifactFields::default()
            },
        );
    }

    /// Terminates the execution after a step exhausted its attempts.
    async fn fail(mut self, index: usize, message: String) -> Execution {
        let step_id = self.definition.steps[index].id.clone();
        let now = self.clock.now();
        self.execution.status = ExecutionStatus::Failed;
        self.execution.failure = Some(ExecutionFailure {
            step_id: Some(step_id.clone()),
            category: FailureCategory::Execution,
            message: message.clone(),
        });
        self.journal.record_artifact(
            now,
            ArtifactKind::ErrorContext,
            ArtifactFields {
                step_id: Some(step_id),
                data: Some(json!({
                    "phase": "execution",
                    "error": message,
                })),
                ..ArtifactFields::default()
            },
        );
        self.skip_pending();
        self.run_rollback().await;
        self.finish(ExecutionStatus::Failed, Some(message))
    }

    /// Terminates the execution after a policy or approval block.
    async fn block(
        mut self,
        index: usize,
        category: FailureCategory,
        message: String,
    ) -> Execution {
        let step_id = self.definition.steps[index].id.clone();
        let now = self.clock.now();
        {
            let record = &mut self.execution.steps[index];
            record.status = StepStatus::Blocked;
            record.error = Some(message.clone());
            record.finished_at = Some(now);
        }
        let event_id = self.journal.record_event(
            now,
            EventType::StepBlocked,
            EventFields {
                step_id: Some(step_id.clone()),
                status: Some(StepStatus::Blocked.as_str().to_string()),
                message: Some(message.clone()),
                data: Some(json!({ "category": category })),
                ..EventFields::default()
            },
        );
        self.journal.record_artifact(
            now,
            ArtifactKind::ErrorContext,
            ArtifactFields {
                event_id: Some(event_id),
                step_id: Some(step_id.clone()),
                data: Some(json!({
                    "phase": "gate",
                    "category": category,
                    "error": message,
                })),
                ..ArtifactFields::default()
            },
        );
        self.execution.status = ExecutionStatus::Blocked;
        self.execution.failure = Some(ExecutionFailure {
            step_id: Some(step_id),
            category,
            message: message.clone(),
        });
        self.skip_pending();
        self.run_rollback().await;
        self.finish(ExecutionStatus::Blocked, Some(message))
    }

    /// Marks every still-pending step skipped at the transition instant.
    fn skip_pending(&mut self) {
        let now = self.clock.now();
        let mut skipped = Vec::new();
        for record in &mut self.execution.steps {
            if record.status == StepStatus::Pending {
                record.status = StepStatus::Skipped;
                record.started_at = Some(now);
                record.finished_at = Some(now);
                skipped.push(record.id.clone());
            }
        }
        for step_id in skipped {
            self.journal.record_event(
                now,
                EventType::StepSkipped,
                EventFields {
                    step_id: Some(step_id),
                    status: Some(StepStatus::Skipped.as_str().to_string()),
                    ..EventFields::default()
                },
            );
        }
    }

    /// Runs rollback hooks for succeeded steps in reverse order.
    async fn run_rollback(&mut self) {
        let plan: Vec<RollbackPlanEntry> = self
            .succeeded
            .iter()
            .rev()
            .filter_map(|&index| {
                let step = &self.definition.steps[index];
                step.rollback.as_ref().map(|hook| RollbackPlanEntry {
                    step_id: step.id.clone(),
                    action: hook.action.clone(),
                    parameters: hook
                        .parameters
                        .as_ref()
                        .map(|parameters| {
                            resolve_parameters(parameters, &self.resolved_inputs)
                        })
                        .unwrap_or_default(),
                    timeout: effective_timeout(hook.timeout_seconds, &self.config),
                })
            })
            .collect();
        if plan.is_empty() {
            self.execution.rollback_status = RollbackStatus::NotRequired;
            return;
        }

        let worker = RollbackWorker {
            journal: self.journal.fork(),
            plan,
            metadata: self.definition.metadata.clone(),
            execution_id: self.execution.id.clone(),
            inputs: self.resolved_inputs.clone(),
            runner: Arc::clone(&self.runner),
            clock: Arc::clone(&self.clock),
        };
        // Spawned so cleanup survives cancellation of the outer start future.
        match tokio::spawn(worker.run()).await {
            Ok((fork, records, all_succeeded)) => {
                self.journal.absorb(fork);
                for record in &records {
                    if let Some(step) = self
                        .execution
                        .steps
                        .iter_mut()
                        .find(|step| step.id == record.step_id)
                    {
                        step.rollback = Some(record.clone());
                    }
                }
                self.execution.rollback_status = if all_succeeded {
                    RollbackStatus::Completed
                } else {
                    RollbackStatus::Partial
                };
                self.execution.rollback = records;
            }
            Err(join_error) => {
                let now = self.clock.now();
                self.journal.record_artifact(
                    now,
                    ArtifactKind::ErrorContext,
                    ArtifactFields {
                        data: Some(json!({
                            "phase": "rollback",
                            "error": format!("rollback task aborted: {join_error}"),
                        })),
                        ..ArtifactFields::default()
                    },
                );
                self.execution.rollback_status = RollbackStatus::Partial;
            }
        }
    }

    /// Records the terminal event and seals the execution.
    fn finish(mut self, status: ExecutionStatus, message: Option<String>) -> Execution {
        let finished = self.clock.now();
        self.execution.status = status;
        self.execution.finished_at = Some(finished);
        self.journal.record_event(
            finished,
            EventType::ExecutionFinished,
            EventFields {
                status: Some(status.as_str().to_string()),
                message,
                ..EventFields::default()
            },
        );
        let (timeline, artifacts) = self.journal.into_parts();
        self.execution.timeline = timeline;
        self.execution.artifacts = artifacts;
        self.execution
    }
}

// ============================================================================
// SECTION: Rollback Worker
// ============================================================================

/// One planned rollback hook invocation.
struct RollbackPlanEntry {
    /// Step whose hook runs.
    step_id: String,
    /// Rollback action verb.
    action: String,
    /// Resolved rollback parameters.
    parameters: Map<String, Value>,
    /// Effective hook timeout.
    timeout: Duration,
}

/// Owned state for the spawned rollback loop.
struct RollbackWorker {
    /// Journal fork continuing the parent's sequences.
    journal: Journal,
    /// Hooks to invoke, already in reverse succeeded order.
    plan: Vec<RollbackPlanEntry>,
    /// Metadata of the executed pack.
    metadata: PackMetadata,
    /// Execution identifier.
    execution_id: String,
    /// Resolved inputs of the execution.
    inputs: Map<String, Value>,
    /// Pluggable action runner.
    runner: Arc<dyn ActionRunner>,
    /// Runtime time source.
    clock: Arc<dyn Clock>,
}

impl RollbackWorker {
    /// Invokes every planned hook best-effort and returns the records.
    async fn run(mut self) -> (Journal, Vec<RollbackExecutionStep>, bool) {
        let mut records = Vec::with_capacity(self.plan.len());
        let mut all_succeeded = true;
        for entry in &self.plan {
            let started = self.clock.now();
            let started_event = self.journal.record_event(
                started,
                EventType::RollbackStarted,
                EventFields {
                    step_id: Some(entry.step_id.clone()),
                    data: Some(json!({ "action": entry.action })),
                    ..EventFields::default()
                },
            );
            let request = ActionRequest {
                metadata: self.metadata.clone(),
                execution_id: self.execution_id.clone(),
                step_id: entry.step_id.clone(),
                action: entry.action.clone(),
                parameters: entry.parameters.clone(),
                inputs: self.inputs.clone(),
                attempt: 1,
                rollback: true,
            };
            let outcome = run_action(self.runner.as_ref(), request, entry.timeout).await;
            let finished = self.clock.now();
            let record = match outcome {
                Ok(result) => {
                    record_action_artifacts(
                        &mut self.journal,
                        finished,
                        Some(&entry.step_id),
                        Some(1),
                        Some(&started_event),
                        &result,
                    );
                    RollbackExecutionStep {
                        step_id: entry.step_id.clone(),
                        action: entry.action.clone(),
                        status: StepStatus::Succeeded,
                        started_at: started,
                        finished_at: Some(finished),
                        error: None,
                        output: Some(result.output),
                    }
                }
                Err(error) => {
                    all_succeeded = false;
                    self.journal.record_artifact(
                        finished,
                        ArtifactKind::ErrorContext,
                        ArtifactFields {
                            event_id: Some(started_event),
                            step_id: Some(entry.step_id.clone()),
                            data: Some(json!({
                                "phase": "rollback",
                                "action": entry.action,
                                "error": error.to_string(),
                                "timeout": error.is_timeout(),
                            })),
                            ..ArtifactFields::default()
                        },
                    );
                    RollbackExecutionStep {
                        step_id: entry.step_id.clone(),
                        action: entry.action.clone(),
                        status: StepStatus::Failed,
                        started_at: started,
                        finished_at: Some(finished),
                        error: Some(error.to_string()),
                        output: None,
                    }
                }
            };
            self.journal.record_event(
                finished,
                EventType::RollbackFinished,
                EventFields {
                    step_id: Some(entry.step_id.clone()),
                    status: Some(record.status.as_str().to_string()),
                    data: Some(json!({ "action": entry.action })),
                    ..EventFields::default()
                },
            );
            records.push(record);
        }
        (self.journal, records, all_succeeded)
    }
}

// ============================================================================
// SECTION: Action Invocation
// ============================================================================

/// Invokes the runner under a bounded wait.
async fn run_action(
    runner: &dyn ActionRunner,
    request: ActionRequest,
    timeout: Duration,
) -> Result<ActionResult, ActionError> {
    match tokio::time::timeout(timeout, runner.run(request)).await {
        Ok(result) => result,
        Err(_) => Err(ActionError::Timeout(format!(
            "action did not complete within {}s",
            timeout.as_secs()
        ))),
    }
}

/// Returns the effective per-attempt timeout; 0 selects the runtime default.
pub(crate) fn effective_timeout(timeout_seconds: u64, config: &RuntimeConfig) -> Duration {
    if timeout_seconds == 0 {
        Duration::from_secs(config.default_step_timeout_secs)
    } else {
        Duration::from_secs(timeout_seconds)
    }
}

/// Records snippet, message, and payload artifacts from an action result.
fn record_action_artifacts(
    journal: &mut Journal,
    timestamp: OffsetDateTime,
    step_id: Option<&str>,
    attempt: Option<u32>,
    event_id: Option<&str>,
    result: &ActionResult,
) {
    if let Some(stdout) = &result.stdout_snippet {
        journal.record_artifact(
            timestamp,
            ArtifactKind::StdoutSnippet,
            ArtifactFields {
                event_id: event_id.map(str::to_string),
                step_id: step_id.map(str::to_string),
                attempt,
                data: Some(Value::String(truncate_snippet(stdout))),
            },
        );
    }
    if let Some(stderr) = &result.stderr_snippet {
        journal.record_artifact(
            timestamp,
            ArtifactKind::StderrSnippet,
            ArtifactFields {
                event_id: event_id.map(str::to_string),
                step_id: step_id.map(str::to_string),
                attempt,
                data: Some(Value::String(truncate_snippet(stderr))),
            },
        );
    }
    if let Some(message) = &result.message {
        journal.record_artifact(
            timestamp,
            ArtifactKind::ActionMessage,
            ArtifactFields {
                event_id: event_id.map(str::to_string),
                step_id: step_id.map(str::to_string),
                attempt,
                data: Some(Value::String(message.clone())),
            },
        );
    }
    if let Some(payload) = &result.artifacts {
        journal.record_artifact(
            timestamp,
            ArtifactKind::ActionPayload,
            ArtifactFields {
                event_id: event_id.map(str::to_string),
                step_id: step_id.map(str::to_string),
                attempt,
                data: Some(Value::Object(payload.clone())),
            },
        );
    }
}
