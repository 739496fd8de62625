use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use crate::capability::Rewriter;
use crate::error::{Error, Result};
use crate::scene::Scene;

use super::ModificationStrategy;

/// Rewrites one or more scenes through an injected [`Rewriter`]
/// capability, scene count and ordering unchanged. The only strategy
/// that cannot run purely offline — when no rewriter is configured it is
/// a no-op that records why, rather than failing the whole modification
/// list.
pub struct LlmRewrite {
    rewriter: Option<Arc<dyn Rewriter>>,
}

impl LlmRewrite {
    pub fn new(rewriter: Option<Arc<dyn Rewriter>>) -> Self {
        Self { rewriter }
    }
}

#[derive(Debug, Deserialize)]
struct Params {
    scene_ids: Vec<u32>,
    instructions: String,
}

impl ModificationStrategy for LlmRewrite {
    fn name(&self) -> &'static str {
        "llm_rewrite"
    }

    fn validate(&self, params: &serde_json::Value) -> Result<()> {
        let parsed: Params =
            serde_json::from_value(params.clone()).map_err(|e| Error::InvalidParams {
                strategy: self.name().to_string(),
                reason: e.to_string(),
            })?;
        if parsed.scene_ids.is_empty() {
            return Err(Error::InvalidParams {
                strategy: self.name().to_string(),
                reason: "scene_ids must be non-empty".to_string(),
            });
        }
        if parsed.instructions.trim().is_empty() {
            return Err(Error::InvalidParams {
                strategy: self.name().to_string(),
                reason: "instructions must be non-empty".to_string(),
            });
        }
        Ok(())
    }

    fn apply(&self, scenes: Vec<Scene>, params: &serde_json::Value) -> Result<(Vec<Scene>, serde_json::Value)> {
        self.validate(params)?;

        let Some(rewriter) = &self.rewriter else {
            return Ok((scenes, json!({ "error": "LLM generator not configured" })));
        };

        let parsed: Params = serde_json::from_value(params.clone())?;
        let mut rewritten_count = 0usize;
        let result = scenes
            .into_iter()
            .map(|mut scene| {
                if parsed.scene_ids.contains(&scene.scene_id) {
                    scene.body = rewriter.rewrite(&scene.body, &parsed.instructions)?;
                    rewritten_count += 1;
                }
                Ok(scene)
            })
            .collect::<Result<Vec<Scene>>>()?;

        Ok((result, json!({ "scenes_rewritten": rewritten_count })))
    }
}
