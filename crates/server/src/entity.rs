//! Regex-based entity extraction and embedding-based scene
//! classification — the two analyzers the what-if engine and advisor
//! lean on beyond plain lexicon counting.

use std::sync::Arc;

use once_cell::sync::Lazy;
use rating_core::capability::{cos_sim, Embedder, Entity, EntityExtractor, EntityKind, SceneClassifier, SceneType};
use rating_core::error::Result;
use regex::Regex;

static CHARACTER_CUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*([A-Z][A-Z' .]{1,30})\s*(?:\(.*\))?\s*$").expect("character cue pattern must compile")
});

static LOCATION_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^\s*(?:int\.?|ext\.?|int\./ext\.?)\s*[./]?\s*([A-Za-z0-9' -]+?)\s*[-–]\s*(?:day|night|dawn|dusk|continuous|later|morning|evening)")
        .expect("location heading pattern must compile")
});

fn is_plausible_character_name(candidate: &str) -> bool {
    let trimmed = candidate.trim();
    if trimmed.is_empty() || trimmed.len() > 30 {
        return false;
    }
    let alpha: Vec<char> = trimmed.chars().filter(|c| c.is_alphabetic()).collect();
    if alpha.is_empty() {
        return false;
    }
    let upper = alpha.iter().filter(|c| c.is_uppercase()).count();
    upper as f64 / alpha.len() as f64 > 0.8
}

/// Regex-driven entity extractor: ALL-CAPS lines as character cues,
/// scene-heading locations as locations. No object extraction — the
/// original prop-detection heuristics were too noisy to carry over
/// faithfully, so this only surfaces characters and locations.
pub struct RegexEntityExtractor;

impl EntityExtractor for RegexEntityExtractor {
    fn extract(&self, text: &str) -> Result<Vec<Entity>> {
        let mut entities = Vec::new();

        for caps in CHARACTER_CUE.captures_iter(text) {
            let m = caps.get(1).unwrap();
            if is_plausible_character_name(m.as_str()) {
                entities.push(Entity {
                    text: m.as_str().trim().to_string(),
                    kind: EntityKind::Character,
                    offset: m.start(),
                });
            }
        }

        for caps in LOCATION_HEADING.captures_iter(text) {
            let m = caps.get(1).unwrap();
            entities.push(Entity {
                text: m.as_str().trim().to_string(),
                kind: EntityKind::Location,
                offset: m.start(),
            });
        }

        Ok(entities)
    }
}

const EXEMPLARS: &[(SceneType, &str)] = &[
    (SceneType::Action, "characters run, fight, chase, and crash through the scene"),
    (SceneType::Dialogue, "two characters talk quietly, trading lines back and forth"),
    (SceneType::Violence, "a character is attacked, shot, or beaten, blood and pain described"),
    (SceneType::Intimate, "characters kiss, undress, and share a private intimate moment"),
    (SceneType::Exposition, "a narrator or character explains background and history"),
];

/// Classifies a scene's dominant type by embedding similarity against a
/// small set of curated example sentences, one per [`SceneType`].
pub struct EmbeddingSceneClassifier {
    embedder: Arc<dyn Embedder>,
}

impl EmbeddingSceneClassifier {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }
}

impl SceneClassifier for EmbeddingSceneClassifier {
    fn classify(&self, text: &str) -> SceneType {
        let query = self.embedder.encode(text);
        if query.is_empty() {
            // No embedding capability configured (or the call failed) —
            // degrade to "unknown" rather than guessing, per the
            // embedding capability's documented fallback contract.
            return SceneType::Unknown;
        }

        EXEMPLARS
            .iter()
            .map(|(kind, exemplar)| (*kind, cos_sim(&query, &self.embedder.encode(exemplar))))
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .map(|(kind, _)| kind)
            .unwrap_or(SceneType::Unknown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_character_cues_and_location_headings() {
        let text = "INT. KITCHEN - DAY\n\nMARIA\nWe need to talk.\n\nJOHN\nI know.";
        let extractor = RegexEntityExtractor;
        let entities = extractor.extract(text).unwrap();

        assert!(entities.iter().any(|e| e.kind == EntityKind::Character && e.text == "MARIA"));
        assert!(entities.iter().any(|e| e.kind == EntityKind::Character && e.text == "JOHN"));
        assert!(entities.iter().any(|e| e.kind == EntityKind::Location && e.text == "KITCHEN"));
    }

    #[test]
    fn lowercase_lines_are_not_mistaken_for_character_cues() {
        let text = "this is just narration text, nothing more.";
        let extractor = RegexEntityExtractor;
        let entities = extractor.extract(text).unwrap();
        assert!(entities.iter().all(|e| e.kind != EntityKind::Character));
    }

    #[test]
    fn classifier_degrades_to_unknown_without_an_embedder() {
        use rating_core::capability::NullEmbedder;

        let classifier = EmbeddingSceneClassifier::new(Arc::new(NullEmbedder));
        assert_eq!(classifier.classify("a car chase down the highway"), SceneType::Unknown);
    }
}
