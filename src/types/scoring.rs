use crate::error::{RankError, Result};
use serde::Serialize;
use std::ops::RangeInclusive;

pub type Score = f64;

pub const W1_BOUNDS: RangeInclusive<f64> = 1.0..=3.0;
pub const W2_BOUNDS: RangeInclusive<f64> = 0.0..=1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub engagement_index: Score,
    pub community_response_rate: Score,
    pub time_weight_factor: Score,
}

impl Metrics {
    pub fn new(
        engagement_index: Score,
        community_response_rate: Score,
        time_weight_factor: Score,
    ) -> Self {
        Self {
            engagement_index,
            community_response_rate,
            time_weight_factor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeightPair {
    pub w1: f64,
    pub w2: f64,
}

impl WeightPair {
    pub fn new(w1: f64, w2: f64) -> Result<Self> {
        if !W1_BOUNDS.contains(&w1) || !W2_BOUNDS.contains(&w2) {
            return Err(RankError::Optimization(format!(
                "weights out of bounds: w1={w1} (expected {:?}), w2={w2} (expected {:?})",
                W1_BOUNDS, W2_BOUNDS
            )));
        }
        Ok(Self { w1, w2 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_pair_accepts_bounds_inclusive() {
        assert!(WeightPair::new(1.0, 0.0).is_ok());
        assert!(WeightPair::new(3.0, 1.0).is_ok());
    }

    #[test]
    fn weight_pair_rejects_out_of_bounds() {
        assert!(matches!(
            WeightPair::new(0.99, 0.5),
            Err(RankError::Optimization(_))
        ));
        assert!(WeightPair::new(2.0, 1.01).is_err());
        assert!(WeightPair::new(f64::NAN, 0.5).is_err());
    }
}
