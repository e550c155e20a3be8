// crates/packrun-http/src/handlers.rs
// ============================================================================
// Module: HTTP Handlers
// Description: Request handlers for registration, start, and read endpoints.
// Purpose: Translate HTTP requests into runtime and store operations.
// Dependencies: axum, packrun-core, serde, tracing
// ============================================================================

//! ## Overview
//! Handlers deserialize request bodies, delegate to the runtime or store,
//! and serialize results. Timeline and artifact reads accept `step_id` and
//! `type` query filters applied over the deep-copied logs.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::Path;
use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use packrun_core::Artifact;
use packrun_core::Execution;
use packrun_core::ExecutionReplay;
use packrun_core::PackDefinition;
use packrun_core::TimelineEvent;
use packrun_core::runtime::ApprovalDecision;
use packrun_core::runtime::ExecutionPreview;
use packrun_core::runtime::StartRequest;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use tracing::info;

use crate::AppState;
use crate::error::ApiError;

// ============================================================================
// SECTION: Request Bodies
// ============================================================================

/// Body of a start or preview request.
///
/// # Invariants
/// - `version: None` selects the latest stored version.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartBody {
    /// Pack version to execute.
    pub version: Option<String>,
    /// Caller-supplied inputs.
    #[serde(default)]
    pub inputs: Map<String, Value>,
    /// Workflow-scope approval decision.
    pub approval: Option<ApprovalDecision>,
    /// Step-scope approval decisions keyed by step id.
    #[serde(default)]
    pub step_approvals: BTreeMap<String, ApprovalDecision>,
}

impl StartBody {
    /// Combines the body with the path pack id into a runtime request.
    fn into_request(self, pack_id: String) -> StartRequest {
        StartRequest {
            pack_id,
            version: self.version,
            inputs: self.inputs,
            approval: self.approval,
            step_approvals: self.step_approvals,
        }
    }
}

/// Query filters for timeline and artifact reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogQuery {
    /// Restrict to records of one step.
    pub step_id: Option<String>,
    /// Restrict to records of one type label.
    #[serde(rename = "type")]
    pub type_label: Option<String>,
}

/// Wire shape of a successful registration.
#[derive(Debug, Serialize)]
pub struct RegisteredPack {
    /// Normalized pack identifier.
    pub id: String,
    /// Registered version.
    pub version: String,
}

// ============================================================================
// SECTION: Registration
// ============================================================================

/// `POST /automation-packs` — validates and registers a definition.
pub async fn register_pack(
    State(state): State<AppState>,
    Json(definition): Json<PackDefinition>,
) -> Result<(StatusCode, Json<RegisteredPack>), ApiError> {
    let (id, version) = state.store.register(definition)?;
    info!(pack_id = %id, version = %version, "registered automation pack");
    Ok((StatusCode::CREATED, Json(RegisteredPack { id, version })))
}

// ============================================================================
// SECTION: Execution
// ============================================================================

/// `POST /automation-packs/{id}/executions` — starts an execution.
pub async fn start_execution(
    State(state): State<AppState>,
    Path(pack_id): Path<String>,
    Json(body): Json<StartBody>,
) -> Result<(StatusCode, Json<Execution>), ApiError> {
    let execution = state.runtime.start(body.into_request(pack_id)).await?;
    info!(
        execution_id = %execution.id,
        status = execution.status.as_str(),
        "execution finished"
    );
    Ok((StatusCode::CREATED, Json(execution)))
}

/// `POST /automation-packs/{id}/executions/preview` — dry-run gate preview.
pub async fn preview_execution(
    State(state): State<AppState>,
    Path(pack_id): Path<String>,
    Json(body): Json<StartBody>,
) -> Result<Json<ExecutionPreview>, ApiError> {
    let preview = state.runtime.preview(body.into_request(pack_id)).await?;
    Ok(Json(preview))
}

// ============================================================================
// SECTION: Reads
// ============================================================================

/// `GET /automation-packs/executions/{execution_id}` — execution snapshot.
pub async fn get_execution(
    State(state): State<AppState>,
    Path(execution_id): Path<String>,
) -> Result<Json<Execution>, ApiError> {
    state
        .runtime
        .get(&execution_id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("execution not found: {execution_id}")))
}

/// `GET /automation-packs/executions/{execution_id}/timeline` — filtered
/// timeline.
pub async fn get_timeline(
    State(state): State<AppState>,
    Path(execution_id): Path<String>,
    Query(query): Query<LogQuery>,
) -> Result<Json<Vec<TimelineEvent>>, ApiError> {
    let events = state
        .runtime
        .get_timeline(&execution_id)?
        .ok_or_else(|| ApiError::NotFound(format!("execution not found: {execution_id}")))?;
    let events = events
        .into_iter()
        .filter(|event| {
            query
                .step_id
                .as_ref()
                .is_none_or(|step_id| event.step_id.as_deref() == Some(step_id))
                && query
                    .type_label
                    .as_ref()
                    .is_none_or(|label| event.event_type.as_str() == label)
        })
        .collect();
    Ok(Json(events))
}

/// `GET /automation-packs/executions/{execution_id}/artifacts` — filtered
/// artifacts.
pub async fn get_artifacts(
    State(state): State<AppState>,
    Path(execution_id): Path<String>,
    Query(query): Query<LogQuery>,
) -> Result<Json<Vec<Artifact>>, ApiError> {
    let artifacts = state
        .runtime
        .get_artifacts(&execution_id)?
        .ok_or_else(|| ApiError::NotFound(format!("execution not found: {execution_id}")))?;
    let artifacts = artifacts
        .into_iter()
        .filter(|artifact| {
            query
                .step_id
                .as_ref()
                .is_none_or(|step_id| artifact.step_id.as_deref() == Some(step_id))
                && query
                    .type_label
                    .as_ref()
                    .is_none_or(|label| artifact.kind.as_str() == label)
        })
        .collect();
    Ok(Json(artifacts))
}

/// `GET /automation-packs/executions/{execution_id}/replay` — replay view.
pub async fn get_replay(
    State(state): State<AppState>,
    Path(execution_id): Path<String>,
) -> Result<Json<ExecutionReplay>, ApiError> {
    state
        .runtime
        .get_replay(&execution_id)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("execution not found: {execution_id}")))
}
