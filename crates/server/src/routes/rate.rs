use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use rating_core::upload::validate_upload_with_limits;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RateRequest {
    pub filename: String,
    pub title: String,
    pub text: String,
}

async fn submit_rating(
    State(state): State<AppState>,
    Json(req): Json<RateRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    validate_upload_with_limits(&req.filename, &req.text, state.config.max_upload_mb, &state.config.allowed_file_extensions)?;

    let (script, _version) = state.store.create_script(&req.title, &req.text)?;
    let job = state.jobs.submit(script.id, req.text, state.aggregator).await;

    Ok(Json(json!({
        "script_id": script.id,
        "job_id": job.id,
        "status": job.status,
    })))
}

async fn get_job(State(state): State<AppState>, Path(job_id): Path<Uuid>) -> Result<Json<serde_json::Value>, ApiError> {
    let job = state.jobs.get_job(job_id).ok_or_else(|| ApiError::not_found("job not found"))?;

    let body = match state.jobs.get_result(job_id) {
        Some(outcome) => json!({
            "job_id": job.id,
            "status": job.status,
            "rating": outcome.rating.to_string(),
            "reasons": outcome.reasons,
            "scenes": outcome.scenes,
        }),
        None => json!({
            "job_id": job.id,
            "status": job.status,
            "error": job.error,
        }),
    };

    Ok(Json(body))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/rate", post(submit_rating))
        .route("/rate/{job_id}", get(get_job))
}
