// crates/packrun-http/src/error.rs
// ============================================================================
// Module: HTTP Error Mapping
// Description: Runtime and store errors mapped to response codes.
// Purpose: Keep status-code policy in one place.
// Dependencies: axum, packrun-core, packrun-store-memory, serde
// ============================================================================

//! ## Overview
//! Every fallible handler returns [`ApiError`]; conversions from runtime and
//! store errors centralize the status-code policy so handlers stay thin.

// ============================================================================
// SECTION: Imports
// ============================================================================

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use packrun_core::DefinitionReadError;
use packrun_core::runtime::RegistryError;
use packrun_core::runtime::StartError;
use packrun_store_memory::DefinitionStoreError;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: API Error
// ============================================================================

/// Error surfaced by the HTTP layer.
///
/// # Invariants
/// - Each variant maps to exactly one status code.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Requested pack or execution does not exist (404).
    #[error("not found: {0}")]
    NotFound(String),
    /// Request failed validation (400).
    #[error("validation failed")]
    Validation {
        /// Aggregate issue list.
        issues: Vec<String>,
    },
    /// Resource already exists (409).
    #[error("conflict: {0}")]
    Conflict(String),
    /// Runtime or store is unavailable (503).
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

/// Wire shape of an error response body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    /// Human-readable error summary.
    error: String,
    /// Aggregate issue list for validation failures.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    issues: Vec<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::NotFound(message) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: message,
                    issues: Vec::new(),
                },
            ),
            Self::Validation { issues } => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "validation failed".to_string(),
                    issues,
                },
            ),
            Self::Conflict(message) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    error: message,
                    issues: Vec::new(),
                },
            ),
            Self::Unavailable(message) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorBody {
                    error: message,
                    issues: Vec::new(),
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

impl From<StartError> for ApiError {
    fn from(err: StartError) -> Self {
        match err {
            StartError::Definition(DefinitionReadError::NotFound(id)) => {
                Self::NotFound(format!("automation pack not found: {id}"))
            }
            StartError::Definition(DefinitionReadError::Store(message)) => {
                Self::Unavailable(message)
            }
            StartError::Validation(err) => Self::Validation { issues: err.issues },
            StartError::Inputs(err) => Self::Validation { issues: err.issues },
            StartError::RegistryUnavailable => {
                Self::Unavailable("execution registry unavailable".to_string())
            }
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::Unavailable => {
                Self::Unavailable("execution registry unavailable".to_string())
            }
        }
    }
}

impl From<DefinitionStoreError> for ApiError {
    fn from(err: DefinitionStoreError) -> Self {
        match err {
            DefinitionStoreError::Invalid(err) => Self::Validation { issues: err.issues },
            DefinitionStoreError::Duplicate { id, version } => {
                Self::Conflict(format!("automation pack {id} version {version} exists"))
            }
            DefinitionStoreError::Unavailable => {
                Self::Unavailable("definition store unavailable".to_string())
            }
        }
    }
}
