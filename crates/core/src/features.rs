//! Per-scene raw feature extraction: counting lexicon hits per dimension
//! and applying the context modulations (heroic dampener, visceral gate,
//! psychological-violence folding) before normalization.

use crate::lexicon::{count_matches, Lexicon};
use crate::scene::Scene;

/// Raw (pre-normalization) counters for one scene, one entry per dimension
/// plus scene length for normalization denominators that scale with it.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawFeatures {
    pub violence: f64,
    pub gore: f64,
    pub sex_act: f64,
    pub nudity: f64,
    pub profanity: f64,
    pub drugs: f64,
    pub child_mentions: f64,
    /// Word count of the scene body, used to scale some denominators.
    pub length: u32,
}

fn word_count(text: &str) -> u32 {
    1.max(text.split_whitespace().count() as u32)
}

/// Extract raw features for a single scene, applying context modulation.
///
/// Modulation order (each reads the scene's full lowercased body):
/// 1. Violence is counted, then dampened ×0.6 if the scene reads as
///    heroic-fiction (capes-and-lasers vocabulary).
/// 2. Violence is gated ×0.7 if the raw count is non-zero but no visceral
///    keyword (blood, wound, scream, pain, corpse, bleeding) co-occurs in
///    the same scene.
/// 3. Psychological-violence hits fold into the violence total at half
///    weight, added after the gate so trauma/horror language isn't itself
///    softened by the visceral-evidence requirement.
/// 4. Gore is counted via the lexicon's own exclusion-aware counter; the
///    exclusion list is its only modulation.
pub fn extract(scene: &Scene) -> RawFeatures {
    let lex = Lexicon::global();
    let text = scene.body.to_lowercase();

    let mut violence = count_matches(lex.violence_patterns(), &text) as f64;
    if lex.has_heroic_dampener(&text) {
        violence *= 0.6;
    }
    if violence > 0.0 && !lex.has_visceral_evidence(&text) {
        violence *= 0.7;
    }
    let psych = count_matches(lex.psych_violence_patterns(), &text) as f64;
    violence += psych * 0.5;

    let gore = lex.count_gore(&text) as f64;

    RawFeatures {
        violence,
        gore,
        sex_act: count_matches(lex.sex_act_patterns(), &text) as f64,
        nudity: count_matches(lex.nudity_patterns(), &text) as f64,
        profanity: count_matches(lex.profanity_patterns(), &text) as f64,
        drugs: count_matches(lex.drug_patterns(), &text) as f64,
        child_mentions: count_matches(lex.child_mention_patterns(), &text) as f64,
        length: word_count(&text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(body: &str) -> Scene {
        Scene {
            scene_id: 1,
            heading: String::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn heroic_scene_dampens_violence() {
        let heroic = extract(&scene(
            "Superman punches the villain and saves Metropolis with a laser blast.",
        ));
        let grounded = extract(&scene(
            "The soldier punches the man and blasts him with a rifle in the street.",
        ));
        assert!(heroic.violence < grounded.violence);
    }

    #[test]
    fn gore_counts_regardless_of_visceral_evidence() {
        let soft = extract(&scene("a crash leaves a scar and a burn mark, nothing more"));
        assert!(soft.gore > 0.0);
    }

    #[test]
    fn violence_without_visceral_evidence_is_gated() {
        let gated = extract(&scene("he pulls a gun and fires at the man in the alley"));
        let ungated = extract(&scene(
            "he pulls a gun and fires at the man, blood pooling beneath the corpse",
        ));
        assert!(gated.violence > 0.0);
        assert!(gated.violence < ungated.violence);
    }

    #[test]
    fn psych_violence_adds_half_weight_to_violence() {
        let baseline = extract(&scene("they walked through the quiet park"));
        let traumatic = extract(&scene("she screamed in the asylum, consumed by madness"));
        assert!(traumatic.violence > baseline.violence);
    }

    #[test]
    fn counts_are_nonnegative_and_length_tracks_words() {
        let f = extract(&scene("one two three four five"));
        assert_eq!(f.length, 5);
        assert!(f.violence >= 0.0);
    }
}
