//! Script-level aggregation of per-scene dimension scores, and the
//! deterministic cascade that maps the aggregated vector to a [`Rating`].

use serde::{Deserialize, Serialize};

use crate::model::ScoredScene;
use crate::normalize::DimensionScores;
use crate::units::{Rating, UnitScore};

/// Number of scenes surfaced as "trigger scenes" for a rated script.
const TOP_TRIGGER_COUNT: usize = 5;

/// A scene surfaced as one of the top contributors to the script's
/// rating, ranked by [`scene_weight`] descending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerScene {
    pub scene_id: u32,
    pub heading: String,
    pub weight: f64,
    pub sample_text: String,
}

/// The top [`TOP_TRIGGER_COUNT`] scenes by ranking weight, highest first.
pub fn trigger_scenes(scenes: &[ScoredScene]) -> Vec<TriggerScene> {
    let mut ranked: Vec<&ScoredScene> = scenes.iter().collect();
    ranked.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap());
    ranked
        .into_iter()
        .take(TOP_TRIGGER_COUNT)
        .map(|s| TriggerScene {
            scene_id: s.scene_id,
            heading: s.heading.clone(),
            weight: s.weight,
            sample_text: s.sample_text.clone(),
        })
        .collect()
}

/// Which reduction strategy collapses a dimension's per-scene scores into
/// one script-level number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregatorConfig {
    /// Blends a dimension's max with a percentile of its distribution —
    /// the default. A single extreme scene matters, but so does a script
    /// that stays elevated throughout.
    Hybrid,
    /// Pure percentile reduction for every dimension, ignoring the max.
    /// Kept for scripts that want the older, less max-sensitive pipeline.
    PercentileOnly,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        AggregatorConfig::Hybrid
    }
}

/// Script-level aggregate of all seven dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateScores {
    pub violence: f64,
    pub gore: f64,
    pub sex_act: f64,
    pub nudity: f64,
    pub profanity: f64,
    pub drugs: f64,
    pub child_risk: f64,
}

/// Linear-interpolation percentile, matching `numpy.percentile`'s default
/// (`interpolation="linear"`): the rank may fall between two values, in
/// which case we blend them proportionally rather than rounding to the
/// nearest one.
fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let rank = p * (sorted.len() as f64 - 1.0);
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = rank - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

fn max_of(values: &[f64]) -> f64 {
    values.iter().cloned().fold(0.0, f64::max)
}

fn reduce_hybrid(values: &[f64], max_weight: f64, pctl: f64) -> f64 {
    max_weight * max_of(values) + (1.0 - max_weight) * percentile(values, pctl)
}

/// Aggregate per-scene dimension scores into one script-level vector.
pub fn aggregate(scenes: &[DimensionScores], config: AggregatorConfig) -> AggregateScores {
    let violence: Vec<f64> = scenes.iter().map(|s| s.violence.get()).collect();
    let gore: Vec<f64> = scenes.iter().map(|s| s.gore.get()).collect();
    let sex_act: Vec<f64> = scenes.iter().map(|s| s.sex_act.get()).collect();
    let nudity: Vec<f64> = scenes.iter().map(|s| s.nudity.get()).collect();
    let profanity: Vec<f64> = scenes.iter().map(|s| s.profanity.get()).collect();
    let drugs: Vec<f64> = scenes.iter().map(|s| s.drugs.get()).collect();
    let child_risk: Vec<f64> = scenes.iter().map(|s| s.child_risk.get()).collect();

    match config {
        AggregatorConfig::Hybrid => AggregateScores {
            violence: reduce_hybrid(&violence, 0.7, 0.95),
            gore: reduce_hybrid(&gore, 0.7, 0.95),
            sex_act: reduce_hybrid(&sex_act, 0.85, 0.90),
            nudity: reduce_hybrid(&nudity, 0.85, 0.90),
            child_risk: reduce_hybrid(&child_risk, 0.85, 0.90),
            profanity: percentile(&profanity, 0.90),
            drugs: percentile(&drugs, 0.90),
        },
        AggregatorConfig::PercentileOnly => AggregateScores {
            violence: percentile(&violence, 0.90),
            gore: percentile(&gore, 0.90),
            sex_act: percentile(&sex_act, 0.90),
            nudity: percentile(&nudity, 0.90),
            profanity: percentile(&profanity, 0.90),
            drugs: percentile(&drugs, 0.90),
            child_risk: percentile(&child_risk, 0.90),
        },
    }
}

/// Per-scene ranking weight used to surface the scenes driving the rating
/// (top-N "trigger scenes"). `sex_act` and `gore` dominate since they carry
/// the widest swing toward 18+; the remaining dimensions are folded in at
/// a smaller share.
pub fn scene_weight(scores: &DimensionScores) -> f64 {
    0.5 * scores.violence.get()
        + 0.8 * scores.gore.get()
        + 0.9 * scores.sex_act.get()
        + 0.3 * scores.profanity.get()
        + 0.3 * scores.drugs.get()
        + 0.6 * scores.child_risk.get()
        + 0.3 * scores.nudity.get()
}

/// The result of running the rating cascade: the assigned rating plus the
/// human-readable tag(s) of the rule(s) that matched.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingResult {
    pub rating: Rating,
    pub reasons: Vec<String>,
}

/// Map an aggregate vector to a [`Rating`] via a first-match-wins cascade,
/// tested top-down from the strictest rule. Lower scores never produce a
/// stricter rating than higher ones — each rule is monotone in the
/// dimensions it checks, and rules are tried in decreasing strictness.
pub fn cascade(scores: &AggregateScores) -> RatingResult {
    if scores.sex_act >= 0.8 || scores.gore >= 0.8 {
        return RatingResult {
            rating: Rating::Eighteen,
            reasons: vec!["explicit sexual or violent content".to_string()],
        };
    }
    if scores.child_risk > 0.5 && (scores.sex_act >= 0.5 || scores.violence >= 0.5) {
        return RatingResult {
            rating: Rating::Eighteen,
            reasons: vec!["risk involving minors".to_string()],
        };
    }
    if scores.violence >= 0.4 || scores.gore >= 0.4 {
        return RatingResult {
            rating: Rating::Sixteen,
            reasons: vec!["explicit violence".to_string()],
        };
    }
    if scores.profanity >= 0.5 || scores.drugs >= 0.4 || scores.nudity >= 0.3 {
        return RatingResult {
            rating: Rating::Twelve,
            reasons: vec!["moderate language/substances/nudity".to_string()],
        };
    }
    if scores.violence >= 0.3 {
        return RatingResult {
            rating: Rating::Twelve,
            reasons: vec!["moderate violence".to_string()],
        };
    }
    RatingResult {
        rating: Rating::Six,
        reasons: vec!["no dimension reached a stricter threshold".to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dim(v: f64) -> DimensionScores {
        DimensionScores {
            violence: UnitScore::new(v),
            gore: UnitScore::new(v),
            sex_act: UnitScore::new(v),
            nudity: UnitScore::new(v),
            profanity: UnitScore::new(v),
            drugs: UnitScore::new(v),
            child_risk: UnitScore::new(v),
        }
    }

    #[test]
    fn hybrid_aggregate_is_dominated_by_single_extreme_scene() {
        let scenes = vec![dim(0.0), dim(0.0), dim(0.0), dim(1.0)];
        let agg = aggregate(&scenes, AggregatorConfig::Hybrid);
        assert!(agg.violence > 0.5);
    }

    #[test]
    fn percentile_only_is_less_sensitive_to_a_lone_spike() {
        let scenes = vec![dim(0.0), dim(0.0), dim(0.0), dim(0.0), dim(0.0), dim(0.0), dim(0.0), dim(0.0), dim(0.0), dim(1.0)];
        let hybrid = aggregate(&scenes, AggregatorConfig::Hybrid).violence;
        let pctl = aggregate(&scenes, AggregatorConfig::PercentileOnly).violence;
        assert!(hybrid >= pctl);
    }

    #[test]
    fn cascade_picks_strictest_triggered_tier() {
        let scores = AggregateScores {
            gore: 0.85,
            ..Default::default()
        };
        let result = cascade(&scores);
        assert_eq!(result.rating, Rating::Eighteen);
        assert!(!result.reasons.is_empty());
    }

    #[test]
    fn cascade_child_risk_amplifies_to_eighteen() {
        let scores = AggregateScores {
            child_risk: 0.6,
            violence: 0.55,
            ..Default::default()
        };
        assert_eq!(cascade(&scores).rating, Rating::Eighteen);
    }

    #[test]
    fn cascade_moderate_violence_alone_is_twelve_not_eighteen() {
        let scores = AggregateScores {
            violence: 0.80,
            ..Default::default()
        };
        assert_eq!(cascade(&scores).rating, Rating::Sixteen);
    }

    #[test]
    fn cascade_falls_through_to_six_when_nothing_triggers() {
        let result = cascade(&AggregateScores::default());
        assert_eq!(result.rating, Rating::Six);
    }

    #[test]
    fn empty_scene_list_aggregates_to_zero() {
        let agg = aggregate(&[], AggregatorConfig::Hybrid);
        assert_eq!(agg.violence, 0.0);
    }

    #[test]
    fn trigger_scenes_are_sorted_by_weight_and_capped_at_five() {
        let scenes: Vec<ScoredScene> = (0..8)
            .map(|i| ScoredScene {
                scene_id: i,
                heading: format!("scene {i}"),
                scores: DimensionScores::default(),
                weight: i as f64 / 10.0,
                sample_text: format!("text {i}"),
            })
            .collect();
        let top = trigger_scenes(&scenes);
        assert_eq!(top.len(), 5);
        assert_eq!(top[0].scene_id, 7);
        assert!(top.windows(2).all(|w| w[0].weight >= w[1].weight));
    }
}
