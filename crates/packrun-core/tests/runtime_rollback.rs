// crates/packrun-core/tests/runtime_rollback.rs
// ============================================================================
// Module: Runtime Rollback Tests
// Description: LIFO rollback ordering, partial accounting, and status law.
// Purpose: Validate best-effort reverse-order rollback after termination.
// ============================================================================

//! Rollback orchestration tests: ordering, accounting, and journal records.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use packrun_core::ActionError;
use packrun_core::ActionRequest;
use packrun_core::ActionResult;
use packrun_core::ActionRunner;
use packrun_core::Clock;
use packrun_core::DefinitionReadError;
use packrun_core::DefinitionReader;
use packrun_core::EventType;
use packrun_core::ExecutionStatus;
use packrun_core::OutcomeSpec;
use packrun_core::PackDefinition;
use packrun_core::PackMetadata;
use packrun_core::RollbackSpec;
use packrun_core::RollbackStatus;
use packrun_core::StepSpec;
use packrun_core::StepStatus;
use packrun_core::runtime::PackRuntime;
use packrun_core::runtime::StartRequest;
use serde_json::json;
use time::Duration;
use time::OffsetDateTime;

// ============================================================================
// SECTION: Test Fixtures
// ============================================================================

struct ManualClock {
    ticks: AtomicI64,
}

impl ManualClock {
    fn new() -> Self {
        Self {
            ticks: AtomicI64::new(0),
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> OffsetDateTime {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        OffsetDateTime::UNIX_EPOCH + Duration::seconds(tick)
    }
}

#[derive(Clone)]
struct FixedReader {
    definition: PackDefinition,
}

impl DefinitionReader for FixedReader {
    fn get(&self, id: &str, _version: Option<&str>) -> Result<PackDefinition, DefinitionReadError> {
        if id == self.definition.metadata.id {
            Ok(self.definition.clone())
        } else {
            Err(DefinitionReadError::NotFound(id.to_string()))
        }
    }
}

/// Runner scripted per (step id, rollback flag) pair.
#[derive(Clone, Default)]
struct ScriptedRunner {
    failures: Arc<Mutex<VecDeque<(String, bool, ActionError)>>>,
    calls: Arc<Mutex<Vec<ActionRequest>>>,
}

impl ScriptedRunner {
    fn failing(failures: Vec<(&str, bool, ActionError)>) -> Self {
        Self {
            failures: Arc::new(Mutex::new(
                failures
                    .into_iter()
                    .map(|(step_id, rollback, err)| (step_id.to_string(), rollback, err))
                    .collect(),
            )),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn calls(&self) -> Vec<ActionRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ActionRunner for ScriptedRunner {
    async fn run(&self, request: ActionRequest) -> Result<ActionResult, ActionError> {
        self.calls.lock().unwrap().push(request.clone());
        let mut failures = self.failures.lock().unwrap();
        let position = failures
            .iter()
            .position(|(step_id, rollback, _)| {
                *step_id == request.step_id && *rollback == request.rollback
            });
        match position {
            Some(index) => {
                let (_, _, err) = failures.remove(index).unwrap();
                Err(err)
            }
            None => Ok(ActionResult {
                output: [("rolled".to_string(), json!(request.rollback))]
                    .into_iter()
                    .collect(),
                ..ActionResult::default()
            }),
        }
    }
}

fn apply_step(id: &str, rollback_action: Option<&str>) -> StepSpec {
    StepSpec {
        id: id.to_string(),
        name: None,
        action: "apply".to_string(),
        parameters: None,
        mutating: None,
        timeout_seconds: 0,
        max_retries: 0,
        approval: None,
        rollback: rollback_action.map(|action| RollbackSpec {
            action: action.to_string(),
            parameters: None,
            timeout_seconds: 0,
        }),
        expected_outcomes: Vec::new(),
    }
}

fn definition(steps: Vec<StepSpec>) -> PackDefinition {
    PackDefinition {
        metadata: PackMetadata {
            id: "rollback-pack".to_string(),
            name: "Rollback Pack".to_string(),
            version: "1.0.0".to_string(),
            description: None,
        },
        inputs: Vec::new(),
        approval: None,
        steps,
        expected_outcomes: vec![OutcomeSpec {
            description: "changes applied".to_string(),
            success_criteria: "all applies succeed".to_string(),
            step_id: None,
        }],
    }
}

fn runtime(def: PackDefinition, runner: ScriptedRunner) -> PackRuntime {
    PackRuntime::builder()
        .reader(FixedReader { definition: def })
        .runner(runner)
        .clock(ManualClock::new())
        .build()
        .unwrap()
}

fn start_request() -> StartRequest {
    StartRequest {
        pack_id: "rollback-pack".to_string(),
        ..StartRequest::default()
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[tokio::test]
async fn rollback_runs_hooks_in_reverse_succeeded_order() {
    let def = definition(vec![
        apply_step("step-1", Some("rollback-1")),
        apply_step("step-2", Some("rollback-2")),
        apply_step("step-3", None),
    ]);
    let runner = ScriptedRunner::failing(vec![(
        "step-3",
        false,
        ActionError::Failed("boom".to_string()),
    )]);
    let runtime = runtime(def, runner.clone());

    let execution = runtime.start(start_request()).await.unwrap();
    assert_eq!(execution.status, ExecutionStatus::Failed);
    assert_eq!(execution.rollback_status, RollbackStatus::Completed);

    let rollback_ids: Vec<&str> =
        execution.rollback.iter().map(|entry| entry.step_id.as_str()).collect();
    assert_eq!(rollback_ids, vec!["step-2", "step-1"]);
    assert!(execution.rollback.iter().all(|entry| entry.status == StepStatus::Succeeded));
    assert_eq!(execution.rollback[0].action, "rollback-2");
    assert_eq!(execution.rollback[1].action, "rollback-1");

    // Forward calls for steps 1-3, then rollback calls for step-2, step-1.
    let calls = runner.calls();
    assert_eq!(calls.len(), 5);
    assert!(!calls[2].rollback);
    assert!(calls[3].rollback && calls[3].step_id == "step-2");
    assert!(calls[4].rollback && calls[4].step_id == "step-1");
    assert_eq!(calls[3].action, "rollback-2");
    assert_eq!(calls[3].attempt, 1);

    // Per-step rollback records mirror the execution-level list.
    assert_eq!(
        execution.steps[0].rollback.as_ref().unwrap().action,
        "rollback-1"
    );
    assert_eq!(
        execution.steps[1].rollback.as_ref().unwrap().action,
        "rollback-2"
    );
    assert!(execution.steps[2].rollback.is_none());

    let rollback_events: Vec<EventType> = execution
        .timeline
        .iter()
        .filter(|event| {
            matches!(event.event_type, EventType::RollbackStarted | EventType::RollbackFinished)
        })
        .map(|event| event.event_type)
        .collect();
    assert_eq!(
        rollback_events,
        vec![
            EventType::RollbackStarted,
            EventType::RollbackFinished,
            EventType::RollbackStarted,
            EventType::RollbackFinished,
        ]
    );
    // The terminal event still closes the journal after rollback.
    assert_eq!(
        execution.timeline.last().unwrap().event_type,
        EventType::ExecutionFinished
    );
    for (index, event) in execution.timeline.iter().enumerate() {
        assert_eq!(event.sequence, u64::try_from(index).unwrap() + 1);
    }
}

#[tokio::test]
async fn failed_hooks_mark_partial_but_do_not_stop_remaining_hooks() {
    let def = definition(vec![
        apply_step("step-1", Some("rollback-1")),
        apply_step("step-2", Some("rollback-2")),
        apply_step("step-3", None),
    ]);
    let runner = ScriptedRunner::failing(vec![
        ("step-3", false, ActionError::Failed("boom".to_string())),
        ("step-2", true, ActionError::Failed("undo failed".to_string())),
    ]);
    let runtime = runtime(def, runner.clone());

    let execution = runtime.start(start_request()).await.unwrap();
    assert_eq!(execution.rollback_status, RollbackStatus::Partial);
    assert_eq!(execution.rollback.len(), 2);
    assert_eq!(execution.rollback[0].status, StepStatus::Failed);
    assert!(execution.rollback[0].error.as_ref().unwrap().contains("undo failed"));
    assert_eq!(execution.rollback[1].status, StepStatus::Succeeded);

    // Both hooks were attempted despite the first failure.
    let rollback_calls = runner.calls().iter().filter(|call| call.rollback).count();
    assert_eq!(rollback_calls, 2);
    assert_eq!(
        execution
            .artifacts
            .iter()
            .filter(|artifact| {
                artifact
                    .data
                    .as_ref()
                    .and_then(|data| data.get("phase"))
                    == Some(&json!("rollback"))
            })
            .count(),
        1
    );
}

#[tokio::test]
async fn executions_without_hooks_are_not_required_to_roll_back() {
    let def = definition(vec![
        apply_step("step-1", None),
        apply_step("step-2", None),
    ]);
    let runner = ScriptedRunner::failing(vec![(
        "step-2",
        false,
        ActionError::Failed("boom".to_string()),
    )]);
    let runtime = runtime(def, runner.clone());

    let execution = runtime.start(start_request()).await.unwrap();
    assert_eq!(execution.status, ExecutionStatus::Failed);
    assert_eq!(execution.rollback_status, RollbackStatus::NotRequired);
    assert!(execution.rollback.is_empty());
    assert_eq!(runner.calls().len(), 2);
}

#[tokio::test]
async fn rollback_status_law_holds() {
    // Completed iff every entry succeeded; partial iff any entry failed;
    // not_required iff no entry exists.
    let def = definition(vec![
        apply_step("step-1", Some("rollback-1")),
        apply_step("step-2", None),
    ]);
    let runner = ScriptedRunner::failing(vec![(
        "step-2",
        false,
        ActionError::Failed("boom".to_string()),
    )]);
    let runtime = runtime(def, runner);

    let execution = runtime.start(start_request()).await.unwrap();
    match execution.rollback_status {
        RollbackStatus::NotRequired => assert!(execution.rollback.is_empty()),
        RollbackStatus::Completed => {
            assert!(!execution.rollback.is_empty());
            assert!(execution.rollback.iter().all(|e| e.status == StepStatus::Succeeded));
        }
        RollbackStatus::Partial => {
            assert!(execution.rollback.iter().any(|e| e.status == StepStatus::Failed));
        }
    }
    assert_eq!(execution.rollback_status, RollbackStatus::Completed);
}
