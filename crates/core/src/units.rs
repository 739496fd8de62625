use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// An age rating, ordered by strictness (0+ is least strict, 18+ most).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Zero,
    Six,
    Twelve,
    Sixteen,
    Eighteen,
}

impl Rating {
    /// All ratings in strictness order, least to most.
    pub const ALL: [Rating; 5] = [
        Rating::Zero,
        Rating::Six,
        Rating::Twelve,
        Rating::Sixteen,
        Rating::Eighteen,
    ];

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|r| *r == self).unwrap()
    }

    /// The rating one step less strict than this one, if any.
    pub fn next_lower(self) -> Option<Rating> {
        let i = self.index();
        (i > 0).then(|| Self::ALL[i - 1])
    }

    /// Ratings strictly below this one, from most to least strict (for
    /// alternative-target suggestion — closest first).
    pub fn lower_than(self) -> Vec<Rating> {
        let i = self.index();
        Self::ALL[..i].iter().rev().copied().collect()
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rating::Zero => "0+",
            Rating::Six => "6+",
            Rating::Twelve => "12+",
            Rating::Sixteen => "16+",
            Rating::Eighteen => "18+",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for Rating {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0+" => Ok(Rating::Zero),
            "6+" => Ok(Rating::Six),
            "12+" => Ok(Rating::Twelve),
            "16+" => Ok(Rating::Sixteen),
            "18+" => Ok(Rating::Eighteen),
            other => Err(Error::InvalidRating(other.to_owned())),
        }
    }
}

/// A score clamped to `[0.0, 1.0]` at construction — every dimension score
/// in the pipeline is one of these, so an out-of-range value can never
/// escape normalization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitScore(f64);

impl UnitScore {
    pub fn new(v: f64) -> Self {
        Self(v.clamp(0.0, 1.0))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl Default for UnitScore {
    fn default() -> Self {
        Self(0.0)
    }
}

impl From<f64> for UnitScore {
    fn from(v: f64) -> Self {
        Self::new(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_order_is_ascending_strictness() {
        assert!(Rating::Zero < Rating::Six);
        assert!(Rating::Six < Rating::Twelve);
        assert!(Rating::Twelve < Rating::Sixteen);
        assert!(Rating::Sixteen < Rating::Eighteen);
    }

    #[test]
    fn rating_display_round_trips_through_parse() {
        for r in Rating::ALL {
            let s = r.to_string();
            assert_eq!(s.parse::<Rating>().unwrap(), r);
        }
    }

    #[test]
    fn unit_score_clamps_out_of_range_values() {
        assert_eq!(UnitScore::new(-1.0).get(), 0.0);
        assert_eq!(UnitScore::new(2.0).get(), 1.0);
        assert_eq!(UnitScore::new(0.5).get(), 0.5);
    }

    #[test]
    fn lower_than_orders_closest_first() {
        let lowers = Rating::Eighteen.lower_than();
        assert_eq!(lowers, vec![Rating::Sixteen, Rating::Twelve, Rating::Six, Rating::Zero]);
    }
}
