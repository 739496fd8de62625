use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;

use crate::error::{Error, Result};
use crate::scene::Scene;

use super::ModificationStrategy;

/// Softens flagged language in place via a fixed substitution table,
/// scene count and ordering untouched. The mildest of the four
/// strategies — nothing is removed, just toned down.
pub struct ContentReduction;

/// Dimensions reduced when the request names none explicitly.
const DEFAULT_DIMENSIONS: &[&str] = &["violence", "profanity"];

#[derive(Debug, Deserialize, Default)]
struct Params {
    /// Optional subset of dimension keys to reduce; empty means
    /// [`DEFAULT_DIMENSIONS`].
    #[serde(default)]
    dimensions: Vec<String>,
    /// Optional scene-id allowlist; absent means "every scene".
    #[serde(default)]
    scope: Option<Vec<u32>>,
    /// Optional character-name allowlist: only scenes whose body mentions
    /// one of these (case-insensitive) are touched.
    #[serde(default)]
    target_characters: Option<Vec<String>>,
    /// Word/phrase overrides layered on top of the default table,
    /// case-insensitive and word-bounded like the defaults.
    #[serde(default)]
    custom_replacements: HashMap<String, String>,
    /// Which register the "fight"/"драка" violence replacement uses —
    /// `"verbal"` or `"mild"` (default), set from the what-if parser's
    /// embedding-based classification of a supplied replacement phrase.
    #[serde(default)]
    replacement_style: String,
}

struct Substitution {
    dimension: &'static str,
    pattern: Regex,
    replacement: &'static str,
}

static REDUCTIONS: Lazy<Vec<Substitution>> = Lazy::new(|| {
    let table: &[(&str, &str, &str)] = &[
        ("profanity", r"(?i)\bfuck\w*\b", "darn"),
        ("profanity", r"(?i)\bshit\b", "crap"),
        ("profanity", r"(?i)\bmotherfucker\b", "jerk"),
        ("profanity", r"(?i)\basshole\b", "jerk"),
        ("violence", r"(?i)\bkill\w*", "stop"),
        ("violence", r"(?i)\bmurder\w*", "confront"),
        ("violence", r"(?i)\bshoot\w*", "strike at"),
        ("violence", r"(?i)\bstab\w*", "lunge at"),
        ("violence", r"(?i)\battack\w*", "approach"),
        ("violence", r"(?i)\bbeating\b", "pushing"),
        ("violence", r"(?i)\bpunch\w*", "push"),
        ("violence", r"(?i)\bkick\w*", "shove"),
        ("violence", r"(?i)\bубить\b", "противостоять"),
        ("violence", r"(?i)\bубийств\w*", "конфликт"),
        ("violence", r"(?i)\bстрелять\w*", "направить на"),
        ("violence", r"(?i)\bзарезать\b", "угрожать"),
        ("violence", r"(?i)\bатаковать\b", "приблизиться"),
        ("violence", r"(?i)\bизбиени\w*", "толкание"),
        ("gore", r"(?i)\bblood\w*", "mess"),
        ("gore", r"(?i)\bcorpse\b", "body"),
        ("gore", r"(?i)\bentrails\b", "wreckage"),
        ("drugs", r"(?i)\bcocaine\b", "a substance"),
        ("drugs", r"(?i)\bheroin\b", "a substance"),
        ("nudity", r"(?i)\bnaked\b", "undressed"),
        ("sex_act", r"(?i)\bsex scene\b", "an intimate moment"),
        ("sex_act", r"(?i)\brape\b", "an assault"),
    ];
    table
        .iter()
        .map(|(dim, pat, rep)| Substitution {
            dimension: dim,
            pattern: Regex::new(pat).expect("reduction pattern must compile"),
            replacement: rep,
        })
        .collect()
});

/// The "fight"/"драка" substitution, split by requested replacement
/// register: `verbal` keeps the confrontation explicit but non-physical,
/// `mild` (the default) downgrades it to something lighter still.
fn fight_substitutions(replacement_style: &str) -> Vec<Substitution> {
    let (en, ru) = if replacement_style.eq_ignore_ascii_case("verbal") {
        ("argue", "спор")
    } else {
        ("scuffle", "потасовка")
    };
    vec![
        Substitution {
            dimension: "violence",
            pattern: Regex::new(r"(?i)\bfight\w*").expect("fight pattern must compile"),
            replacement: en,
        },
        Substitution {
            dimension: "violence",
            pattern: Regex::new(r"(?i)\bдрак\w*").expect("драка pattern must compile"),
            replacement: ru,
        },
    ]
}

fn parse_params(params: &serde_json::Value) -> Result<Params> {
    if params.is_null() {
        return Ok(Params::default());
    }
    serde_json::from_value(params.clone()).map_err(|e| Error::InvalidParams {
        strategy: "content_reduction".to_string(),
        reason: e.to_string(),
    })
}

fn scene_mentions_any(scene: &Scene, names: &[String]) -> bool {
    let body = scene.body.to_lowercase();
    names.iter().any(|n| body.contains(&n.to_lowercase()))
}

impl ModificationStrategy for ContentReduction {
    fn name(&self) -> &'static str {
        "content_reduction"
    }

    fn validate(&self, params: &serde_json::Value) -> Result<()> {
        parse_params(params).map(|_| ())
    }

    fn apply(&self, scenes: Vec<Scene>, params: &serde_json::Value) -> Result<(Vec<Scene>, serde_json::Value)> {
        let parsed = parse_params(params)?;

        let effective_dimensions: Vec<&str> = if parsed.dimensions.is_empty() {
            DEFAULT_DIMENSIONS.to_vec()
        } else {
            parsed.dimensions.iter().map(String::as_str).collect()
        };

        let active: Vec<&Substitution> = REDUCTIONS
            .iter()
            .filter(|s| effective_dimensions.contains(&s.dimension))
            .collect();
        let fight_subs: Vec<Substitution> = if effective_dimensions.contains(&"violence") {
            fight_substitutions(&parsed.replacement_style)
        } else {
            Vec::new()
        };
        let custom: Vec<(Regex, &str)> = parsed
            .custom_replacements
            .iter()
            .map(|(word, replacement)| {
                let pattern = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(word)))
                    .expect("custom replacement word must compile as a word-bounded pattern");
                (pattern, replacement.as_str())
            })
            .collect();

        let mut total_replacements = 0usize;
        let mut scenes_modified = 0usize;
        let mut content_types_reduced: Vec<&'static str> = Vec::new();

        let result: Vec<Scene> = scenes
            .into_iter()
            .map(|mut scene| {
                let in_scope = parsed.scope.as_ref().is_none_or(|ids| ids.contains(&scene.scene_id));
                let in_character_target = parsed
                    .target_characters
                    .as_ref()
                    .is_none_or(|names| scene_mentions_any(&scene, names));
                if !in_scope || !in_character_target {
                    return scene;
                }

                let mut scene_replacements = 0usize;
                for sub in active.iter().copied().chain(fight_subs.iter()) {
                    let count = sub.pattern.find_iter(&scene.body).count();
                    if count > 0 {
                        scene.body = sub.pattern.replace_all(&scene.body, sub.replacement).into_owned();
                        scene_replacements += count;
                        if !content_types_reduced.contains(&sub.dimension) {
                            content_types_reduced.push(sub.dimension);
                        }
                    }
                }
                for (pattern, replacement) in &custom {
                    let count = pattern.find_iter(&scene.body).count();
                    if count > 0 {
                        scene.body = pattern.replace_all(&scene.body, *replacement).into_owned();
                        scene_replacements += count;
                    }
                }

                if scene_replacements > 0 {
                    scenes_modified += 1;
                    total_replacements += scene_replacements;
                }
                scene
            })
            .collect();

        Ok((
            result,
            json!({
                "content_types_reduced": content_types_reduced,
                "total_replacements": total_replacements,
                "scenes_modified": scenes_modified,
            }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scene(body: &str) -> Scene {
        Scene {
            scene_id: 1,
            heading: String::new(),
            body: body.to_string(),
        }
    }

    fn scene_with_id(id: u32, body: &str) -> Scene {
        Scene {
            scene_id: id,
            heading: String::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn softens_profanity_in_place() {
        let strategy = ContentReduction;
        let (result, metadata) = strategy.apply(vec![scene("what the shit is happening")], &json!({})).unwrap();
        assert!(result[0].body.contains("crap"));
        assert!(!result[0].body.to_lowercase().contains("shit"));
        assert_eq!(metadata["total_replacements"], json!(1));
        assert_eq!(metadata["scenes_modified"], json!(1));
    }

    #[test]
    fn no_dimensions_given_defaults_to_violence_and_profanity_only() {
        let strategy = ContentReduction;
        let (result, _) = strategy
            .apply(vec![scene("he will kill them; blood covers the floor")], &json!({}))
            .unwrap();
        assert!(!result[0].body.to_lowercase().contains("kill"));
        assert!(result[0].body.to_lowercase().contains("blood"));
    }

    #[test]
    fn fight_uses_verbal_replacement_when_requested() {
        let strategy = ContentReduction;
        let params = json!({"dimensions": ["violence"], "replacement_style": "verbal"});
        let (result, _) = strategy.apply(vec![scene("they start to fight in the alley")], &params).unwrap();
        assert!(result[0].body.contains("argue"));
    }

    #[test]
    fn fight_uses_mild_replacement_by_default() {
        let strategy = ContentReduction;
        let params = json!({"dimensions": ["violence"]});
        let (result, _) = strategy.apply(vec![scene("they start to fight in the alley")], &params).unwrap();
        assert!(result[0].body.contains("scuffle"));
    }

    #[test]
    fn restricting_to_one_dimension_leaves_others_untouched() {
        let strategy = ContentReduction;
        let params = json!({"dimensions": ["profanity"]});
        let (result, _) = strategy
            .apply(vec![scene("he will kill them with the shit talk")], &params)
            .unwrap();
        assert!(result[0].body.contains("kill"));
        assert!(result[0].body.contains("crap"));
    }

    #[test]
    fn scope_restricts_which_scenes_are_touched() {
        let strategy = ContentReduction;
        let scenes = vec![scene_with_id(0, "shit happens"), scene_with_id(1, "shit happens here too")];
        let params = json!({"scope": [1]});
        let (result, metadata) = strategy.apply(scenes, &params).unwrap();
        assert!(result[0].body.contains("shit"));
        assert!(!result[1].body.contains("shit"));
        assert_eq!(metadata["scenes_modified"], json!(1));
    }

    #[test]
    fn target_characters_restricts_to_scenes_mentioning_them() {
        let strategy = ContentReduction;
        let scenes = vec![
            scene_with_id(0, "MARIA says shit"),
            scene_with_id(1, "JOHN says shit"),
        ];
        let params = json!({"target_characters": ["maria"]});
        let (result, _) = strategy.apply(scenes, &params).unwrap();
        assert!(!result[0].body.to_lowercase().contains("shit"));
        assert!(result[1].body.to_lowercase().contains("shit"));
    }

    #[test]
    fn custom_replacements_override_in_addition_to_defaults() {
        let strategy = ContentReduction;
        let params = json!({"custom_replacements": {"bastard": "rascal"}});
        let (result, _) = strategy.apply(vec![scene("you absolute bastard")], &params).unwrap();
        assert!(result[0].body.contains("rascal"));
    }

    #[test]
    fn scene_count_and_ids_are_unchanged() {
        let strategy = ContentReduction;
        let scenes = vec![scene("a"), scene("b")];
        let (result, _) = strategy.apply(scenes, &json!({})).unwrap();
        assert_eq!(result.len(), 2);
        assert!(!strategy.redensifies());
    }
}
