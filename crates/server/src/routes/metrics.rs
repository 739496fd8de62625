//! Bare-bones job metrics, mounted only when `RATING_METRICS_ENABLED` is
//! set — spec.md §6's "optional feature flag for metrics", not a full
//! Prometheus exporter.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

async fn metrics(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "jobs_active": state.jobs.active_count(),
        "jobs_total": state.jobs.total_count(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/metrics", get(metrics))
}
