//! Modification engine: named strategies that transform a scene list to
//! reduce its content-risk profile, selected by a string key and driven
//! by JSON parameters (mirroring the what-if engine's intent output).

mod character_focused;
mod content_reduction;
mod llm_rewrite;
mod scene_removal;

pub use character_focused::CharacterFocused;
pub use content_reduction::ContentReduction;
pub use llm_rewrite::LlmRewrite;
pub use scene_removal::SceneRemoval;

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use crate::capability::{EntityExtractor, EntityKind, Rewriter, SceneClassifier, SceneType};
use crate::error::{Error, Result};
use crate::scene::Scene;

/// Whether a strategy renumbers `scene_id`s after changing scene count.
/// Strategies that drop scenes re-densify so downstream consumers see a
/// contiguous 0..N range; strategies that only rewrite text in place
/// leave the original numbering untouched.
pub trait ModificationStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Re-densifies scene ids after applying, if this strategy can change
    /// scene count.
    fn redensifies(&self) -> bool {
        false
    }

    /// Check that `params` are well-formed for this strategy before
    /// `apply` is called, independent of the scene list.
    fn validate(&self, params: &serde_json::Value) -> Result<()>;

    /// Apply the strategy, producing a new scene list plus a strategy-
    /// specific metadata blob describing what changed. `scenes` is
    /// consumed since strategies may reorder or drop entries.
    fn apply(&self, scenes: Vec<Scene>, params: &serde_json::Value) -> Result<(Vec<Scene>, serde_json::Value)>;
}

fn redensify(mut scenes: Vec<Scene>) -> Vec<Scene> {
    for (i, scene) in scenes.iter_mut().enumerate() {
        scene.scene_id = i as u32;
    }
    scenes
}

/// One entry in a modification list: a strategy key plus its params,
/// optionally narrowed to a subset of scenes. `scope`, when present, is
/// merged into `params` under the `"scope"` key before the strategy
/// sees it — only strategies that read that key honor it, the rest
/// ignore it same as any other unused param.
#[derive(Debug, Clone, Deserialize)]
pub struct ModificationRequest {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub params: serde_json::Value,
    #[serde(default)]
    pub scope: Option<Vec<u32>>,
}

/// Run a list of modifications in order, each seeing the previous
/// strategy's output. Returns the final scene list plus one metadata
/// blob per step, in the same order as `modifications`.
///
/// `entity_extractor`/`scene_classifier` are consulted only for
/// `"scene_removal"` steps whose params carry `scene_types`/`characters`/
/// `locations` filters (§4.F's entity-filtered removal) — every other
/// strategy ignores them.
pub fn apply_chain(
    scenes: Vec<Scene>,
    modifications: &[ModificationRequest],
    rewriter: Option<Arc<dyn Rewriter>>,
    entity_extractor: Option<Arc<dyn EntityExtractor>>,
    scene_classifier: Option<Arc<dyn SceneClassifier>>,
) -> Result<(Vec<Scene>, Vec<serde_json::Value>)> {
    let mut current = scenes;
    let mut metadatas = Vec::with_capacity(modifications.len());

    for modification in modifications {
        let strategy = strategy_for(&modification.kind, rewriter.clone())?;

        let mut params = modification.params.clone();
        if let Some(scope) = &modification.scope {
            match params {
                serde_json::Value::Null => params = json!({ "scope": scope }),
                serde_json::Value::Object(ref mut map) => {
                    map.entry("scope").or_insert_with(|| json!(scope));
                }
                _ => {}
            }
        }

        if modification.kind == "scene_removal" {
            let resolved = resolve_removal_scope(
                &current,
                &params,
                entity_extractor.as_deref(),
                scene_classifier.as_deref(),
            );
            match params {
                serde_json::Value::Object(ref mut map) => {
                    map.insert("scene_ids".to_string(), json!(resolved));
                }
                _ => params = json!({ "scene_ids": resolved }),
            }
        }

        let (next_scenes, metadata) = strategy.apply(current, &params)?;
        current = next_scenes;
        metadatas.push(json!({ "type": modification.kind, "metadata": metadata }));
    }

    Ok((current, metadatas))
}

fn parse_scene_type(raw: &str) -> Option<SceneType> {
    match raw.to_lowercase().as_str() {
        "action" => Some(SceneType::Action),
        "dialogue" => Some(SceneType::Dialogue),
        "violence" => Some(SceneType::Violence),
        "intimate" => Some(SceneType::Intimate),
        "exposition" => Some(SceneType::Exposition),
        "unknown" => Some(SceneType::Unknown),
        _ => None,
    }
}

fn string_list(params: &serde_json::Value, key: &str) -> Vec<String> {
    params
        .get(key)
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default()
}

/// Union explicit `scene_ids` with scenes matched by `scene_types` (via
/// `scene_classifier`), `characters`, or `locations` — §4.F's "drop
/// scenes by any union of" removal scope. Filters for which no capability
/// is configured, or that are simply absent from `params`, contribute
/// nothing rather than erroring.
fn resolve_removal_scope(
    scenes: &[Scene],
    params: &serde_json::Value,
    entity_extractor: Option<&dyn EntityExtractor>,
    scene_classifier: Option<&dyn SceneClassifier>,
) -> Vec<u32> {
    let mut ids: BTreeSet<u32> = params
        .get("scene_ids")
        .and_then(|v| serde_json::from_value::<Vec<u32>>(v.clone()).ok())
        .unwrap_or_default()
        .into_iter()
        .collect();

    let scene_types: Vec<SceneType> = string_list(params, "scene_types")
        .iter()
        .filter_map(|s| parse_scene_type(s))
        .collect();
    let characters = string_list(params, "characters");
    let locations = string_list(params, "locations");

    if !scene_types.is_empty() {
        if let Some(classifier) = scene_classifier {
            for scene in scenes {
                if scene_types.contains(&classifier.classify(&scene.body)) {
                    ids.insert(scene.scene_id);
                }
            }
        }
    }

    if !characters.is_empty() || !locations.is_empty() {
        for scene in scenes {
            let entities = entity_extractor.and_then(|e| e.extract(&scene.body).ok()).unwrap_or_default();
            let matches_character = characters.iter().any(|name| {
                entities
                    .iter()
                    .any(|e| e.kind == EntityKind::Character && e.text.eq_ignore_ascii_case(name))
                    || scene.body.to_lowercase().contains(&name.to_lowercase())
            });
            let matches_location = locations
                .iter()
                .any(|loc| scene.heading.to_lowercase().contains(&loc.to_lowercase()));
            if matches_character || matches_location {
                ids.insert(scene.scene_id);
            }
        }
    }

    ids.into_iter().collect()
}

/// Resolve a strategy by its registry key. `rewriter` is only consulted
/// for `"llm_rewrite"`; when absent that strategy degrades to a no-op
/// rather than failing resolution (see [`LlmRewrite`]) — every other
/// strategy is pure text manipulation and ignores it.
pub fn strategy_for(name: &str, rewriter: Option<Arc<dyn Rewriter>>) -> Result<Box<dyn ModificationStrategy>> {
    match name {
        "scene_removal" => Ok(Box::new(SceneRemoval)),
        "content_reduction" => Ok(Box::new(ContentReduction)),
        "character_focused" => Ok(Box::new(CharacterFocused)),
        "llm_rewrite" => Ok(Box::new(LlmRewrite::new(rewriter))),
        other => Err(Error::UnknownStrategy(other.to_string())),
    }
}
