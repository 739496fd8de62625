//! Pure, synchronous domain logic for the screenplay content-rating
//! engine: lexicon, scene segmentation, feature extraction, score
//! normalization, aggregation, rating cascade, modification strategies,
//! what-if parsing, and the rating advisor.
//!
//! Nothing in this crate performs I/O or depends on an async runtime —
//! the handful of seams that need an external capability (embeddings,
//! entity extraction, LLM rewriting) are expressed as traits in
//! [`capability`] and implemented by `rating-server`.

pub mod advisor;
pub mod aggregate;
pub mod capability;
pub mod error;
pub mod features;
pub mod lexicon;
pub mod model;
pub mod modification;
pub mod normalize;
pub mod scene;
pub mod units;
pub mod upload;
pub mod whatif;

pub use error::{Error, Result};
pub use units::{Rating, UnitScore};

use model::ScoredScene;

/// Length of the collapsed-whitespace scene preview stored on every
/// [`ScoredScene`], matching the trigger-scene sample text in §4.E.
const SAMPLE_TEXT_CHARS: usize = 400;

fn sample_text(body: &str, max_chars: usize) -> String {
    let collapsed = body.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().take(max_chars).collect()
}

/// Run the full scoring pipeline end to end: segment, extract, normalize,
/// weight. Aggregation and rating are left to the caller via
/// [`aggregate::aggregate`] and [`aggregate::cascade`] since they take a
/// configurable strategy.
pub fn score_scenes(text: &str) -> Vec<ScoredScene> {
    scene::segment(text)
        .into_iter()
        .map(|s| {
            let raw = features::extract(&s);
            let scores = normalize::normalize(&raw);
            let weight = aggregate::scene_weight(&scores);
            ScoredScene {
                scene_id: s.scene_id,
                heading: s.heading,
                scores,
                weight,
                sample_text: sample_text(&s.body, SAMPLE_TEXT_CHARS),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{aggregate, cascade, AggregatorConfig};

    const SCRIPT: &str = r#"
INT. KITCHEN - DAY

A quiet morning. Maria pours coffee.

EXT. ALLEY - NIGHT

A man pulls a gun and shoots. Blood pools on the pavement, a corpse left behind.

INT. BAR - NIGHT

Someone swears loudly, fuck this whole mess.

EXT. WAREHOUSE - NIGHT

Drugs change hands, cocaine spilling from a torn bag.

INT. BEDROOM - NIGHT

A tense conversation ends in silence.
"#;

    #[test]
    fn end_to_end_pipeline_produces_a_plausible_rating() {
        let scored = score_scenes(SCRIPT);
        assert_eq!(scored.len(), 5);

        let dims: Vec<_> = scored.iter().map(|s| s.scores).collect();
        let aggregate = aggregate(&dims, AggregatorConfig::Hybrid);
        let result = cascade(&aggregate);

        assert!(result.rating >= Rating::Twelve);
        assert!(!result.reasons.is_empty());
    }

    #[test]
    fn empty_script_scores_to_zero_scenes() {
        assert!(score_scenes("").is_empty());
    }
}
