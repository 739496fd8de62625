use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use rating_core::aggregate::{aggregate, cascade};
use rating_core::modification::{apply_chain, strategy_for, ModificationRequest};
use rating_core::scene::segment;
use rating_core::{features, normalize, whatif};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WhatIfRequest {
    pub script_id: Uuid,
    pub request: String,
}

async fn run_whatif(State(state): State<AppState>, Json(req): Json<WhatIfRequest>) -> Result<Json<serde_json::Value>, ApiError> {
    let intent = whatif::parse_intent(&req.request, state.embedder.as_ref())
        .ok_or_else(|| ApiError::bad_request("could not understand that request"))?;

    let current = state.store.current_version(req.script_id)?;
    let scenes = segment(&current.text);

    let strategy = strategy_for(&intent.strategy, state.rewriter.clone())?;
    let (modified, metadata) = strategy.apply(scenes, &intent.params)?;

    let modified_text: String = modified.iter().map(|s| s.body.clone()).collect::<Vec<_>>().join("\n\n");

    let before_dims: Vec<_> = segment(&current.text)
        .iter()
        .map(|s| normalize::normalize(&features::extract(s)))
        .collect();
    let after_dims: Vec<_> = modified.iter().map(|s| normalize::normalize(&features::extract(s))).collect();

    let before_scores = aggregate(&before_dims, state.aggregator);
    let after_scores = aggregate(&after_dims, state.aggregator);
    let before = cascade(&before_scores);
    let after = cascade(&after_scores);

    state
        .store
        .create_version(req.script_id, &modified_text, Some(format!("what-if: {}", intent.strategy)))?;

    Ok(Json(json!({
        "original_rating": before.rating.to_string(),
        "modified_rating": after.rating.to_string(),
        "original_scores": before_scores,
        "modified_scores": after_scores,
        "changes_applied": [json!({ "type": intent.strategy, "metadata": metadata })],
        "explanation": after.reasons.join("; "),
        "rating_changed": before.rating != after.rating,
    })))
}

#[derive(Debug, Deserialize)]
pub struct WhatIfAdvancedRequest {
    pub script_id: Uuid,
    pub modifications: Vec<ModificationRequest>,
}

/// Structured counterpart to [`run_whatif`]: takes an explicit ordered
/// list of `{type, params, scope}` records instead of parsing one from
/// natural language, and runs them through the same chaining engine.
async fn run_whatif_advanced(
    State(state): State<AppState>,
    Json(req): Json<WhatIfAdvancedRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let current = state.store.current_version(req.script_id)?;
    let scenes = segment(&current.text);

    let (modified, changes_applied) = apply_chain(
        scenes,
        &req.modifications,
        state.rewriter.clone(),
        Some(state.entity_extractor.clone()),
        Some(state.scene_classifier.clone()),
    )?;
    let modified_text: String = modified.iter().map(|s| s.body.clone()).collect::<Vec<_>>().join("\n\n");

    let before_dims: Vec<_> = segment(&current.text)
        .iter()
        .map(|s| normalize::normalize(&features::extract(s)))
        .collect();
    let after_dims: Vec<_> = modified.iter().map(|s| normalize::normalize(&features::extract(s))).collect();

    let before_scores = aggregate(&before_dims, state.aggregator);
    let after_scores = aggregate(&after_dims, state.aggregator);
    let before = cascade(&before_scores);
    let after = cascade(&after_scores);

    state.store.create_version(
        req.script_id,
        &modified_text,
        Some(format!("what-if-advanced: {} step(s)", req.modifications.len())),
    )?;

    Ok(Json(json!({
        "original_rating": before.rating.to_string(),
        "modified_rating": after.rating.to_string(),
        "original_scores": before_scores,
        "modified_scores": after_scores,
        "changes_applied": changes_applied,
        "explanation": after.reasons.join("; "),
        "rating_changed": before.rating != after.rating,
    })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/whatif", post(run_whatif))
        .route("/what_if_advanced", post(run_whatif_advanced))
}
