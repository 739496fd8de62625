use serde::Deserialize;
use serde_json::json;

use crate::error::{Error, Result};
use crate::scene::Scene;

use super::{redensify, ModificationStrategy};

/// Drops whole scenes by explicit `scene_id`. Entity-filtered removal
/// (by `scene_types`/`characters`/`locations`) is resolved one layer up,
/// where an [`crate::capability::EntityExtractor`] is available — by the
/// time a removal reaches this strategy it has already been collapsed to
/// a concrete `scene_ids` union.
pub struct SceneRemoval;

#[derive(Debug, Deserialize)]
struct Params {
    scene_ids: Vec<u32>,
}

impl ModificationStrategy for SceneRemoval {
    fn name(&self) -> &'static str {
        "scene_removal"
    }

    fn redensifies(&self) -> bool {
        true
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
        Ok(())
    }

    fn apply(&self, scenes: Vec<Scene>, params: &serde_json::Value) -> Result<(Vec<Scene>, serde_json::Value)> {
        self.validate(params)?;
        let parsed: Params = serde_json::from_value(params.clone())?;
        let to_remove = parsed.scene_ids;

        let removed_scene_ids: Vec<u32> = scenes
            .iter()
            .filter(|s| to_remove.contains(&s.scene_id))
            .map(|s| s.scene_id)
            .collect();
        let kept: Vec<Scene> = scenes
            .into_iter()
            .filter(|s| !to_remove.contains(&s.scene_id))
            .collect();
        let remaining_count = kept.len();
        let result = redensify(kept);

        Ok((
            result,
            json!({
                "removed_count": removed_scene_ids.len(),
                "removed_scene_ids": removed_scene_ids,
                "remaining_count": remaining_count,
            }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scene(id: u32) -> Scene {
        Scene {
            scene_id: id,
            heading: format!("SCENE {id}"),
            body: format!("body of scene {id}"),
        }
    }

    #[test]
    fn removes_named_scenes_and_redensifies() {
        let strategy = SceneRemoval;
        let scenes = vec![scene(0), scene(1), scene(2), scene(3)];
        let params = json!({"scene_ids": [1, 3]});
        let (result, metadata) = strategy.apply(scenes, &params).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].scene_id, 0);
        assert_eq!(result[1].scene_id, 1);
        assert_eq!(result[1].heading, "SCENE 2");
        assert_eq!(metadata["removed_count"], json!(2));
        assert_eq!(metadata["removed_scene_ids"], json!([1, 3]));
        assert_eq!(metadata["remaining_count"], json!(2));
    }

    #[test]
    fn scenario_six_removing_one_of_three_scenes_densifies_to_zero_one() {
        let strategy = SceneRemoval;
        let scenes = vec![scene(0), scene(1), scene(2)];
        let (result, metadata) = strategy.apply(scenes, &json!({"scene_ids": [1]})).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result.iter().map(|s| s.scene_id).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(metadata["removed_count"], json!(1));
    }

    #[test]
    fn empty_scene_ids_fails_validation() {
        let strategy = SceneRemoval;
        assert!(strategy.validate(&json!({"scene_ids": []})).is_err());
    }
}
