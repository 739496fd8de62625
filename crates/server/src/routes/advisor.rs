use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use rating_core::aggregate::{aggregate, cascade};
use rating_core::advisor::Language;
use rating_core::units::Rating;
use rating_core::{advisor, score_scenes};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AdvisorQuery {
    pub target: String,
    #[serde(default)]
    pub lang: Option<String>,
}

fn parse_lang(raw: Option<&str>) -> Language {
    match raw {
        Some(s) if s.eq_ignore_ascii_case("ru") => Language::Ru,
        _ => Language::En,
    }
}

async fn advise_for_script(
    State(state): State<AppState>,
    Path(script_id): Path<Uuid>,
    Query(query): Query<AdvisorQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let target = Rating::from_str(&query.target).map_err(ApiError::from)?;
    let lang = parse_lang(query.lang.as_deref());
    let current = state.store.current_version(script_id)?;

    let scored = score_scenes(&current.text);
    let dims: Vec<_> = scored.iter().map(|s| s.scores).collect();
    let agg = aggregate(&dims, state.aggregator);
    let current_rating = cascade(&agg).rating;

    let report = advisor::advise(&agg, &scored, target, Some(current_rating), lang);

    Ok(Json(json!({
        "target": report.target.to_string(),
        "current": report.current.to_string(),
        "is_achievable": report.is_achievable,
        "confidence": report.confidence,
        "effort_estimate": format!("{:?}", report.effort_estimate),
        "gaps": report.gaps.iter().map(|g| json!({
            "dimension": g.dimension,
            "current": g.current,
            "target": g.target,
            "gap": g.gap,
            "priority": format!("{:?}", g.priority),
        })).collect::<Vec<_>>(),
        "problem_scenes": report.problem_scenes.iter().map(|s| json!({
            "scene_id": s.scene_id,
            "severity": format!("{:?}", s.severity),
            "total_excess": s.total_excess,
            "preview": s.preview,
            "suggestions": s.suggestions,
        })).collect::<Vec<_>>(),
        "recommendations": report.recommendations.iter().map(|r| json!({
            "scene_id": r.scene_id,
            "action": format!("{:?}", r.action),
            "effort": format!("{:?}", r.effort),
            "impact": r.impact,
        })).collect::<Vec<_>>(),
        "alternative_targets": report.alternative_targets.iter().map(|r| r.to_string()).collect::<Vec<_>>(),
    })))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/advisor/{script_id}", get(advise_for_script))
}
