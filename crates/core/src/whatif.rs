//! What-if intent parsing: turning a natural-language request ("remove
//! scene 4", "убрать сцену 7", "soften the violence") into a concrete
//! modification strategy and parameters, plus suggestion helpers built
//! on top of the scoring pipeline.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;

use crate::aggregate::AggregateScores;
use crate::capability::{cos_sim, Embedder};
use crate::model::ScoredScene;
use crate::units::Rating;

/// A parsed what-if request: the strategy to run and its parameters, in
/// the same shape the modification registry expects.
#[derive(Debug, Clone, PartialEq)]
pub struct Intent {
    pub strategy: String,
    pub params: serde_json::Value,
}

/// One comma-separated token: a single scene number or an inclusive
/// `start-end` / `start to end` range.
const SCENE_LIST: &str = r"\d+(?:\s*(?:-|to)\s*\d+)?(?:\s*,\s*\d+(?:\s*(?:-|to)\s*\d+)?)*";

static REMOVE_SCENE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)(?:remove|delete|cut|убрать|удалить|вырезать)\s+scene[s]?\s+({SCENE_LIST})"
    ))
    .expect("remove-scene pattern must compile")
});

static REMOVE_SCENE_RU: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)(?:убрать|удалить|вырезать)\s+сцен\w*\s+({SCENE_LIST})"
    ))
    .expect("remove-scene-ru pattern must compile")
});

static REDUCE_DIMENSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:reduce|soften|tone down|смягчить|уменьшить)\s+(?:the\s+)?(violence|gore|sex_act|nudity|profanity|drugs|child_risk|насили\w*|кровь\w*|мат\w*)")
        .expect("reduce-dimension pattern must compile")
});

/// "replace <violent word> with <phrase>" — the only request shape that
/// carries a replacement phrase needing style classification.
static REDUCE_VIOLENCE_REPLACE_EN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)replace\s+.*?(?:fight|violence|battle|killing|weapon)\s*.*?\bwith\s+(.*?)(?:[.,]|$)")
        .expect("reduce-violence-replace-en pattern must compile")
});

static REDUCE_VIOLENCE_REPLACE_RU: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)заменить\s+.*?(?:драк\w*|насили\w*|бой|убийств\w*)\s*.*?\bна\s+(.*?)(?:[.,]|$)")
        .expect("reduce-violence-replace-ru pattern must compile")
});

static FOCUS_CHARACTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:focus on|only keep|сосредоточ\w*\s+на)\s+([a-zа-я ]+?)(?:'s)?\s*(?:scenes|сцен\w*)?$")
        .expect("focus-character pattern must compile")
});

static REWRITE_REQUEST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)(?:rewrite|переписать)\s+scene[s]?\s+({SCENE_LIST})\s*(?:to|чтобы)?\s*(.*)"
    ))
    .expect("rewrite pattern must compile")
});

static RANGE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\d+)\s*(?:-|to)\s*(\d+)$").expect("range token must compile"));

/// Expand a comma-separated list of scene numbers and `start-end` /
/// `start to end` ranges into an inclusive, deduplicated, ascending list.
fn parse_scene_ids(captured: &str) -> Vec<u32> {
    let mut ids: Vec<u32> = Vec::new();
    for token in captured.split(',') {
        let token = token.trim();
        if let Some(caps) = RANGE_TOKEN.captures(token) {
            let start: u32 = caps[1].parse().unwrap_or(0);
            let end: u32 = caps[2].parse().unwrap_or(0);
            let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
            ids.extend(lo..=hi);
        } else if let Ok(n) = token.parse::<u32>() {
            ids.push(n);
        }
    }
    ids.sort_unstable();
    ids.dedup();
    ids
}

fn normalize_dimension_key(raw: &str) -> String {
    let lower = raw.to_lowercase();
    match lower.as_str() {
        "violence" | "насилие" | "насилия" => "violence",
        "gore" | "кровь" | "кровавый" => "gore",
        "sex_act" => "sex_act",
        "nudity" => "nudity",
        "profanity" | "мат" | "маты" => "profanity",
        "drugs" => "drugs",
        "child_risk" => "child_risk",
        _ => return lower,
    }
    .to_string()
}

/// Parse free-text into a modification intent. Tries each recognized
/// request shape in a fixed order — scene removal, violence replacement
/// (with style classification), dimension reduction, character focus,
/// then scene rewrite — and returns the first match. `embedder` is only
/// consulted when a replacement phrase is present; pass
/// [`crate::capability::NullEmbedder`] when no embedding backend is wired
/// up, which degrades to [`ReplacementStyle::Mild`].
pub fn parse_intent(text: &str, embedder: &dyn Embedder) -> Option<Intent> {
    let text = text.trim();

    if let Some(caps) = REMOVE_SCENE.captures(text).or_else(|| REMOVE_SCENE_RU.captures(text)) {
        let ids = parse_scene_ids(&caps[1]);
        if !ids.is_empty() {
            return Some(Intent {
                strategy: "scene_removal".to_string(),
                params: json!({ "scene_ids": ids }),
            });
        }
    }

    if let Some(caps) = REDUCE_VIOLENCE_REPLACE_EN.captures(text).or_else(|| REDUCE_VIOLENCE_REPLACE_RU.captures(text)) {
        let phrase = caps[1].trim();
        if !phrase.is_empty() {
            let style = classify_replacement_style(embedder, phrase);
            return Some(Intent {
                strategy: "content_reduction".to_string(),
                params: json!({
                    "dimensions": ["violence"],
                    "replacement_style": match style {
                        ReplacementStyle::Verbal => "verbal",
                        ReplacementStyle::Mild => "mild",
                    },
                }),
            });
        }
    }

    if let Some(caps) = REDUCE_DIMENSION.captures(text) {
        let dim = normalize_dimension_key(&caps[1]);
        return Some(Intent {
            strategy: "content_reduction".to_string(),
            params: json!({ "dimensions": [dim] }),
        });
    }

    if let Some(caps) = REWRITE_REQUEST.captures(text) {
        let ids = parse_scene_ids(&caps[1]);
        let instructions = caps[2].trim();
        if !ids.is_empty() && !instructions.is_empty() {
            return Some(Intent {
                strategy: "llm_rewrite".to_string(),
                params: json!({ "scene_ids": ids, "instructions": instructions }),
            });
        }
    }

    if let Some(caps) = FOCUS_CHARACTER.captures(text) {
        let name = caps[1].trim();
        if !name.is_empty() {
            return Some(Intent {
                strategy: "character_focused".to_string(),
                params: json!({ "character": name }),
            });
        }
    }

    None
}

/// Which register a reduction request sits in — used to pick between a
/// light touch-up and a heavier rewrite when both satisfy the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplacementStyle {
    /// Close to the exemplar "keep the scene, just use milder words".
    Mild,
    /// Close to the exemplar "preserve dramatic weight, imply rather
    /// than depict".
    Verbal,
}

const MILD_EXEMPLAR: &str = "use softer language but keep the scene as is";
const VERBAL_EXEMPLAR: &str = "keep the dramatic weight but imply the violence instead of showing it";

/// Classify which replacement register a free-text request is closer to,
/// via embedding cosine similarity against two curated exemplars. Falls
/// back to [`ReplacementStyle::Mild`] when no similarity clears the
/// threshold (e.g. a [`crate::capability::NullEmbedder`] is in use).
pub fn classify_replacement_style(embedder: &dyn Embedder, text: &str) -> ReplacementStyle {
    const THRESHOLD: f32 = 0.5;

    let query = embedder.encode(text);
    let mild = cos_sim(&query, &embedder.encode(MILD_EXEMPLAR));
    let verbal = cos_sim(&query, &embedder.encode(VERBAL_EXEMPLAR));

    if verbal > mild && verbal >= THRESHOLD {
        ReplacementStyle::Verbal
    } else {
        ReplacementStyle::Mild
    }
}

/// Generate short, human-readable suggestions for moving a script toward
/// `target`, one per dimension whose aggregate exceeds what that target
/// tolerates. Pairs with the advisor's gap analysis but phrased as
/// actionable requests a user could paste back into the what-if box.
pub fn generate_smart_suggestions(aggregate: &AggregateScores, target: Rating) -> Vec<String> {
    let mut out = Vec::new();
    if target < Rating::Eighteen && aggregate.violence > 0.5 {
        out.push("reduce the violence".to_string());
    }
    if target < Rating::Eighteen && aggregate.gore > 0.4 {
        out.push("reduce the gore".to_string());
    }
    if target < Rating::Sixteen && aggregate.sex_act > 0.2 {
        out.push("reduce the sex_act".to_string());
    }
    if target < Rating::Sixteen && aggregate.profanity > 0.5 {
        out.push("reduce the profanity".to_string());
    }
    out
}

/// Suggest the single highest-weighted scene as a quick-fix target —
/// the scene contributing the most to the current rating.
pub fn suggest_quick_fixes(scenes: &[ScoredScene]) -> Option<u32> {
    scenes
        .iter()
        .max_by(|a, b| a.weight.partial_cmp(&b.weight).unwrap())
        .map(|s| s.scene_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::NullEmbedder;
    use crate::normalize::DimensionScores;
    use crate::units::UnitScore;

    /// Deterministic stand-in for a real embedding backend: encodes solely
    /// on the presence of a keyword shared with one of the two exemplars,
    /// so replacement-style classification is exercisable without network
    /// I/O or a real model.
    struct FakeEmbedder;

    impl Embedder for FakeEmbedder {
        fn encode(&self, text: &str) -> Vec<f32> {
            let lower = text.to_lowercase();
            if lower.contains("imply") {
                vec![0.0, 1.0]
            } else if lower.contains("soft") {
                vec![1.0, 0.0]
            } else {
                vec![0.0, 0.0]
            }
        }
    }

    #[test]
    fn parses_english_scene_removal() {
        let intent = parse_intent("remove scenes 3, 5", &NullEmbedder).unwrap();
        assert_eq!(intent.strategy, "scene_removal");
        assert_eq!(intent.params["scene_ids"], json!([3, 5]));
    }

    #[test]
    fn parses_scene_range_inclusive() {
        let intent = parse_intent("remove scenes 2-4", &NullEmbedder).unwrap();
        assert_eq!(intent.strategy, "scene_removal");
        assert_eq!(intent.params["scene_ids"], json!([2, 3, 4]));
    }

    #[test]
    fn parses_russian_scene_removal() {
        let intent = parse_intent("убрать сцену 7", &NullEmbedder).unwrap();
        assert_eq!(intent.strategy, "scene_removal");
        assert_eq!(intent.params["scene_ids"], json!([7]));
    }

    #[test]
    fn parses_reduce_violence_request() {
        let intent = parse_intent("please reduce the violence", &NullEmbedder).unwrap();
        assert_eq!(intent.strategy, "content_reduction");
        assert_eq!(intent.params["dimensions"], json!(["violence"]));
    }

    #[test]
    fn parses_rewrite_request_with_instructions() {
        let intent = parse_intent("rewrite scene 2 to tone down the threats", &NullEmbedder).unwrap();
        assert_eq!(intent.strategy, "llm_rewrite");
        assert_eq!(intent.params["scene_ids"], json!([2]));
    }

    #[test]
    fn unrecognized_text_yields_no_intent() {
        assert!(parse_intent("what a nice day", &NullEmbedder).is_none());
    }

    #[test]
    fn replace_with_phrase_captures_style_via_embedder() {
        let intent = parse_intent("replace the fight with a scene that imply tension", &FakeEmbedder).unwrap();
        assert_eq!(intent.strategy, "content_reduction");
        assert_eq!(intent.params["dimensions"], json!(["violence"]));
        assert_eq!(intent.params["replacement_style"], json!("verbal"));
    }

    #[test]
    fn replace_with_phrase_falls_back_to_mild_without_a_clear_signal() {
        let intent = parse_intent("заменить драку на спокойный разговор", &NullEmbedder).unwrap();
        assert_eq!(intent.strategy, "content_reduction");
        assert_eq!(intent.params["replacement_style"], json!("mild"));
    }

    #[test]
    fn suggest_quick_fixes_picks_the_heaviest_scene() {
        let scenes = vec![
            ScoredScene {
                scene_id: 1,
                heading: String::new(),
                scores: DimensionScores::default(),
                weight: 0.1,
                sample_text: String::new(),
            },
            ScoredScene {
                scene_id: 2,
                heading: String::new(),
                scores: DimensionScores {
                    violence: UnitScore::new(1.0),
                    ..Default::default()
                },
                sample_text: String::new(),
                weight: 0.9,
            },
        ];
        assert_eq!(suggest_quick_fixes(&scenes), Some(2));
    }

    #[test]
    fn smart_suggestions_empty_for_an_already_lenient_target() {
        let aggregate = AggregateScores::default();
        assert!(generate_smart_suggestions(&aggregate, Rating::Eighteen).is_empty());
    }
}
