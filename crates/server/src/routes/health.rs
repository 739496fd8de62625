use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

/// Liveness probe plus the "model-loaded" flag spec.md §6 asks for. The
/// lexicons are process-wide statics loaded once at first use, so this
/// reports whether an embedding backend (the one component loaded lazily
/// from configuration) is actually wired up rather than degrading to
/// [`rating_core::capability::NullEmbedder`].
async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "model_loaded": state.config.embedding_base_url.is_some(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
