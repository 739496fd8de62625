use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

async fn list_versions(State(state): State<AppState>, Path(script_id): Path<Uuid>) -> Result<Json<serde_json::Value>, ApiError> {
    let versions = state.store.list_versions(script_id)?;
    Ok(Json(json!(versions)))
}

async fn restore_version(
    State(state): State<AppState>,
    Path((script_id, version_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let restored = state.store.restore_version(script_id, version_id)?;
    Ok(Json(json!(restored)))
}

/// Deleting the current version is rejected with 409, per spec.md §7's
/// `ConflictingState` — "the current version cannot be deleted".
async fn delete_version(
    State(state): State<AppState>,
    Path((script_id, version_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_version(script_id, version_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/scripts/{script_id}/versions", get(list_versions))
        .route("/scripts/{script_id}/versions/{version_id}/restore", post(restore_version))
        .route("/scripts/{script_id}/versions/{version_id}", delete(delete_version))
}
