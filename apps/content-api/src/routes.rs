//! # Module Routes
//!
//! Handlers for module create, read, synchronize and delete.
//!
//! ## Synchronize Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PATCH /modules/{id}                                                    │
//! │       │                                                                 │
//! │       ├── parse_module_id(id)           → 400 on bad id                 │
//! │       ├── validate_document(body)       → 400 on bad document           │
//! │       ├── modules().synchronize(...)    → 404 / 409 / 500               │
//! │       ▼                                                                 │
//! │  200 { updated module row }                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Bodies are taken as raw strings and parsed here so malformed JSON gets
//! the same error shape as every other failure.

use std::time::Instant;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use lingua_core::validation::{parse_module_id, validate_document, validate_new_module};
use lingua_core::{Module, ModuleView, NewModule};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: bool,
}

/// Delete response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub id: i64,
    pub rows_removed: u64,
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = state.db.health_check().await;
    let (status, label) = if database {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        status,
        Json(HealthResponse {
            status: label,
            database,
        }),
    )
}

/// Creates an empty module.
pub async fn create_module(
    State(state): State<AppState>,
    body: String,
) -> Result<(StatusCode, Json<Module>), ApiError> {
    let input: NewModule = serde_json::from_str(&body)
        .map_err(|e| ApiError::validation(format!("Malformed module: {}", e)))?;
    validate_new_module(&input)?;

    let module = state.db.modules().create(&input).await?;
    Ok((StatusCode::CREATED, Json(module)))
}

/// Lists module rows (without content).
pub async fn list_modules(State(state): State<AppState>) -> Result<Json<Vec<Module>>, ApiError> {
    let modules = state.db.modules().list().await?;
    Ok(Json(modules))
}

/// Returns the module with every content block.
pub async fn get_module(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<ModuleView>, ApiError> {
    let id = parse_module_id(&raw_id)?;

    let view = state
        .db
        .modules()
        .get_document(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Module", &id.to_string()))?;

    debug!(id, "Module document served");
    Ok(Json(view))
}

/// Synchronizes the stored module with the submitted document.
pub async fn synchronize_module(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    body: String,
) -> Result<Json<Module>, ApiError> {
    let start = Instant::now();
    let id = parse_module_id(&raw_id)?;
    let document = validate_document(&body)?;

    let module = state.db.modules().synchronize(id, &document).await?;

    info!(
        id,
        revision = module.revision,
        blocks = document.blocks().len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Module saved"
    );
    Ok(Json(module))
}

/// Deletes the module and all of its content.
pub async fn delete_module(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id = parse_module_id(&raw_id)?;
    let rows_removed = state.db.modules().delete(id).await?;
    Ok(Json(DeleteResponse { id, rows_removed }))
}
