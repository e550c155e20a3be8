// crates/packrun-http/src/lib.rs
// ============================================================================
// Module: Packrun HTTP
// Description: Thin axum adapter over the execution runtime and store.
// Purpose: Map the HTTP surface onto runtime operations with standard codes.
// Dependencies: axum, packrun-core, packrun-store-memory, serde, tracing
// ============================================================================

//! ## Overview
//! The HTTP layer is a thin request/response adapter: handlers deserialize
//! bodies, call the runtime or store, and map results to status codes —
//! 201 on registration and start, 200 on reads, 400 on validation failures,
//! 404 on unknown ids, 409 on duplicate registration, 503 when the runtime
//! is unavailable. No execution semantics live here.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod error;
mod handlers;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use axum::routing::post;
use packrun_core::runtime::PackRuntime;
use packrun_store_memory::InMemoryDefinitionStore;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use error::ApiError;
pub use handlers::StartBody;

// ============================================================================
// SECTION: Application State
// ============================================================================

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Execution runtime.
    pub runtime: Arc<PackRuntime>,
    /// Definition store backing registration and reads.
    pub store: Arc<InMemoryDefinitionStore>,
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Builds the automation pack router over the given state.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/automation-packs", post(handlers::register_pack))
        .route(
            "/automation-packs/{id}/executions",
            post(handlers::start_execution),
        )
        .route(
            "/automation-packs/{id}/executions/preview",
            post(handlers::preview_execution),
        )
        .route(
            "/automation-packs/executions/{execution_id}",
            get(handlers::get_execution),
        )
        .route(
            "/automation-packs/executions/{execution_id}/timeline",
            get(handlers::get_timeline),
        )
        .route(
            "/automation-packs/executions/{execution_id}/artifacts",
            get(handlers::get_artifacts),
        )
        .route(
            "/automation-packs/executions/{execution_id}/replay",
            get(handlers::get_replay),
        )
        .with_state(state)
}
