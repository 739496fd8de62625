//! Normalization: scaling raw per-scene counters into `[0, 1]` dimension
//! scores via fixed denominators.

use serde::{Deserialize, Serialize};

use crate::features::RawFeatures;
use crate::units::UnitScore;

/// A normalized score for each of the seven content dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionScores {
    pub violence: UnitScore,
    pub gore: UnitScore,
    pub sex_act: UnitScore,
    pub nudity: UnitScore,
    pub profanity: UnitScore,
    pub drugs: UnitScore,
    pub child_risk: UnitScore,
}

/// Fixed scaling denominators, chosen so a typical "moderate" scene lands
/// near 0.5. Violence alone scales with scene length: a scene's raw hit
/// count is measured against `length / 150`, so the same raw count reads
/// as more severe in a short scene than a long one.
const VIOLENCE_LENGTH_UNIT: f64 = 150.0;
const GORE_DENOM: f64 = 2.0;
const NUDITY_DENOM: f64 = 3.0;
const PROFANITY_DENOM: f64 = 5.0;
const DRUGS_DENOM: f64 = 5.0;
const CHILD_RISK_DENOM: f64 = 3.0;

fn scale(raw: f64, denom: f64) -> UnitScore {
    UnitScore::new(raw / denom)
}

/// Normalize a scene's raw counters into `[0, 1]` dimension scores.
pub fn normalize(raw: &RawFeatures) -> DimensionScores {
    let violence_denom = raw.length.max(1) as f64 / VIOLENCE_LENGTH_UNIT;
    DimensionScores {
        violence: scale(raw.violence, violence_denom),
        gore: scale(raw.gore, GORE_DENOM),
        sex_act: UnitScore::new(raw.sex_act),
        nudity: scale(raw.nudity, NUDITY_DENOM),
        profanity: scale(raw.profanity, PROFANITY_DENOM),
        drugs: scale(raw.drugs, DRUGS_DENOM),
        child_risk: scale(raw.child_mentions, CHILD_RISK_DENOM),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_raw_features_normalize_to_zero() {
        let scores = normalize(&RawFeatures::default());
        assert_eq!(scores.violence.get(), 0.0);
        assert_eq!(scores.child_risk.get(), 0.0);
    }

    #[test]
    fn saturating_raw_count_clamps_to_one() {
        let raw = RawFeatures {
            violence: 100.0,
            ..Default::default()
        };
        assert_eq!(normalize(&raw).violence.get(), 1.0);
    }

    #[test]
    fn partial_raw_count_scales_linearly() {
        let raw = RawFeatures {
            gore: 1.0,
            ..Default::default()
        };
        assert_eq!(normalize(&raw).gore.get(), 0.5);
    }

    #[test]
    fn violence_scales_against_scene_length() {
        let short = RawFeatures {
            violence: 1.0,
            length: 150,
            ..Default::default()
        };
        let long = RawFeatures {
            violence: 1.0,
            length: 1500,
            ..Default::default()
        };
        assert_eq!(normalize(&short).violence.get(), 1.0);
        assert!(normalize(&long).violence.get() < normalize(&short).violence.get());
    }

    #[test]
    fn sex_act_denominator_is_one() {
        let raw = RawFeatures {
            sex_act: 0.5,
            ..Default::default()
        };
        assert_eq!(normalize(&raw).sex_act.get(), 0.5);
    }
}
