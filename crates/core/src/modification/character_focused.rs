use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;

use crate::error::{Error, Result};
use crate::scene::Scene;

use super::{redensify, ModificationStrategy};

/// Character-targeted edits: rename a character throughout, remove a
/// character's presence (whole scenes or just their lines), or swap out
/// specific action words wherever that character appears.
pub struct CharacterFocused;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Action {
    Rename,
    Remove,
    ModifyActions,
}

#[derive(Debug, Deserialize)]
struct Params {
    action: Action,
    character: String,
    #[serde(default)]
    new_name: Option<String>,
    /// For `remove`: `"scenes"` (default) drops whole scenes the
    /// character appears in; `"lines"` strips just their dialogue and
    /// action blocks, keeping the rest of the scene.
    #[serde(default)]
    remove_mode: Option<String>,
    #[serde(default)]
    actions: HashMap<String, String>,
}

static ALL_CAPS_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z][A-Z0-9 .'\-]*:?$").expect("all-caps header pattern must compile")
});

fn character_pattern(character: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b{}\b", regex::escape(character))).expect("character name must compile as a word-bounded pattern")
}

fn scene_mentions(scene: &Scene, pattern: &Regex) -> bool {
    pattern.is_match(&scene.body) || pattern.is_match(&scene.heading)
}

fn apply_rename(scenes: Vec<Scene>, character: &str, new_name: &str) -> (Vec<Scene>, usize) {
    let pattern = character_pattern(character);
    let mut replacements = 0usize;
    let result = scenes
        .into_iter()
        .map(|mut scene| {
            replacements += pattern.find_iter(&scene.body).count();
            replacements += pattern.find_iter(&scene.heading).count();
            scene.body = pattern.replace_all(&scene.body, new_name).into_owned();
            scene.heading = pattern.replace_all(&scene.heading, new_name).into_owned();
            scene
        })
        .collect();
    (result, replacements)
}

/// Strips a character's dialogue/action block: a line whose trimmed,
/// upper-cased form starts with `NAME:` or `NAME.`, through to (but not
/// including) the next all-caps header line.
fn strip_character_lines(body: &str, character_upper: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut skipping = false;
    for line in body.lines() {
        let trimmed = line.trim();
        let upper = trimmed.to_uppercase();
        let is_this_characters_header =
            upper.starts_with(&format!("{character_upper}:")) || upper.starts_with(&format!("{character_upper}."));
        if is_this_characters_header {
            skipping = true;
            continue;
        }
        if skipping {
            let is_other_header = ALL_CAPS_HEADER.is_match(trimmed) && !upper.starts_with(character_upper) && !trimmed.is_empty();
            if is_other_header {
                skipping = false;
            } else {
                continue;
            }
        }
        out.push(line);
    }
    out.join("\n")
}

fn apply_remove(scenes: Vec<Scene>, character: &str, mode: &str) -> Result<(Vec<Scene>, serde_json::Value)> {
    let pattern = character_pattern(character);

    if mode == "lines" {
        let character_upper = character.to_uppercase();
        let mut scenes_modified = 0usize;
        let result: Vec<Scene> = scenes
            .into_iter()
            .map(|mut scene| {
                if scene_mentions(&scene, &pattern) {
                    let stripped = strip_character_lines(&scene.body, &character_upper);
                    if stripped != scene.body {
                        scenes_modified += 1;
                    }
                    scene.body = stripped;
                }
                scene
            })
            .collect();
        return Ok((
            result,
            json!({ "mode": "lines", "scenes_modified": scenes_modified }),
        ));
    }

    let removed_scene_ids: Vec<u32> = scenes
        .iter()
        .filter(|s| scene_mentions(s, &pattern))
        .map(|s| s.scene_id)
        .collect();
    let kept: Vec<Scene> = scenes.into_iter().filter(|s| !scene_mentions(s, &pattern)).collect();
    let remaining_count = kept.len();
    let result = redensify(kept);
    Ok((
        result,
        json!({
            "mode": "scenes",
            "removed_count": removed_scene_ids.len(),
            "removed_scene_ids": removed_scene_ids,
            "remaining_count": remaining_count,
        }),
    ))
}

fn apply_modify_actions(
    scenes: Vec<Scene>,
    character: &str,
    actions: &HashMap<String, String>,
) -> Result<(Vec<Scene>, serde_json::Value)> {
    let char_pattern = character_pattern(character);
    let word_patterns: Vec<(Regex, &str)> = actions
        .iter()
        .map(|(word, replacement)| {
            (
                Regex::new(&format!(r"(?i)\b{}\b", regex::escape(word))).expect("action word must compile"),
                replacement.as_str(),
            )
        })
        .collect();

    let mut total_replacements = 0usize;
    let mut scenes_modified = 0usize;
    let result: Vec<Scene> = scenes
        .into_iter()
        .map(|mut scene| {
            if !scene_mentions(&scene, &char_pattern) {
                return scene;
            }
            let mut hit = false;
            for (pattern, replacement) in &word_patterns {
                let count = pattern.find_iter(&scene.body).count();
                if count > 0 {
                    scene.body = pattern.replace_all(&scene.body, *replacement).into_owned();
                    total_replacements += count;
                    hit = true;
                }
            }
            if hit {
                scenes_modified += 1;
            }
            scene
        })
        .collect();

    Ok((
        result,
        json!({ "total_replacements": total_replacements, "scenes_modified": scenes_modified }),
    ))
}

impl ModificationStrategy for CharacterFocused {
    fn name(&self) -> &'static str {
        "character_focused"
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
        if parsed.character.trim().is_empty() {
            return Err(Error::InvalidParams {
                strategy: self.name().to_string(),
                reason: "character must be non-empty".to_string(),
            });
        }
        if matches!(parsed.action, Action::Rename) && parsed.new_name.as_deref().unwrap_or("").trim().is_empty() {
            return Err(Error::InvalidParams {
                strategy: self.name().to_string(),
                reason: "new_name is required for rename".to_string(),
            });
        }
        if matches!(parsed.action, Action::ModifyActions) && parsed.actions.is_empty() {
            return Err(Error::InvalidParams {
                strategy: self.name().to_string(),
                reason: "actions must be non-empty for modify_actions".to_string(),
            });
        }
        Ok(())
    }

    fn apply(&self, scenes: Vec<Scene>, params: &serde_json::Value) -> Result<(Vec<Scene>, serde_json::Value)> {
        self.validate(params)?;
        let parsed: Params = serde_json::from_value(params.clone())?;

        match parsed.action {
            Action::Rename => {
                let new_name = parsed.new_name.unwrap();
                let (result, replacements) = apply_rename(scenes, &parsed.character, &new_name);
                Ok((result, json!({ "replacements": replacements })))
            }
            Action::Remove => {
                let mode = parsed.remove_mode.unwrap_or_else(|| "scenes".to_string());
                apply_remove(scenes, &parsed.character, &mode)
            }
            Action::ModifyActions => apply_modify_actions(scenes, &parsed.character, &parsed.actions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scene(id: u32, body: &str) -> Scene {
        Scene {
            scene_id: id,
            heading: format!("SCENE {id}"),
            body: body.to_string(),
        }
    }

    #[test]
    fn scenario_seven_rename_replaces_every_token_and_counts_them() {
        let strategy = CharacterFocused;
        let scenes = vec![
            scene(0, "JOHN walks in. JOHN sits down."),
            scene(1, "JOHN leaves. Someone else enters."),
        ];
        let params = json!({"action": "rename", "character": "JOHN", "new_name": "JACK"});
        let (result, metadata) = strategy.apply(scenes, &params).unwrap();
        assert_eq!(metadata["replacements"], json!(3));
        assert!(!result.iter().any(|s| s.body.to_uppercase().contains("JOHN")));
        assert!(result.iter().any(|s| s.body.contains("JACK")));
    }

    #[test]
    fn remove_scenes_mode_drops_scenes_and_redensifies() {
        let strategy = CharacterFocused;
        let scenes = vec![
            scene(0, "MARIA enters the kitchen."),
            scene(1, "JOHN paces alone."),
            scene(2, "MARIA and JOHN argue."),
        ];
        let params = json!({"action": "remove", "character": "Maria"});
        let (result, metadata) = strategy.apply(scenes, &params).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].scene_id, 0);
        assert_eq!(metadata["removed_count"], json!(2));
    }

    #[test]
    fn remove_lines_mode_strips_dialogue_but_keeps_the_scene() {
        let strategy = CharacterFocused;
        let body = "JOHN\nI can't do this anymore.\n\nMARIA\nYes you can.\n";
        let scenes = vec![scene(0, body)];
        let params = json!({"action": "remove", "character": "JOHN", "remove_mode": "lines"});
        let (result, _) = strategy.apply(scenes, &params).unwrap();
        assert_eq!(result.len(), 1);
        assert!(!result[0].body.contains("can't do this anymore"));
        assert!(result[0].body.contains("Yes you can"));
    }

    #[test]
    fn modify_actions_only_touches_scenes_with_the_character() {
        let strategy = CharacterFocused;
        let scenes = vec![
            scene(0, "MARIA punches the wall."),
            scene(1, "JOHN punches the wall."),
        ];
        let params = json!({
            "action": "modify_actions",
            "character": "MARIA",
            "actions": {"punches": "taps"}
        });
        let (result, metadata) = strategy.apply(scenes, &params).unwrap();
        assert!(result[0].body.contains("taps"));
        assert!(result[1].body.contains("punches"));
        assert_eq!(metadata["scenes_modified"], json!(1));
    }

    #[test]
    fn blank_character_name_fails_validation() {
        let strategy = CharacterFocused;
        assert!(strategy
            .validate(&json!({"action": "remove", "character": "   "}))
            .is_err());
    }

    #[test]
    fn rename_without_new_name_fails_validation() {
        let strategy = CharacterFocused;
        assert!(strategy.validate(&json!({"action": "rename", "character": "JOHN"})).is_err());
    }
}
