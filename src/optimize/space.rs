use crate::error::{RankError, Result};
use crate::types::scoring::{W1_BOUNDS, W2_BOUNDS};
use rand::seq::SliceRandom;
use rand::Rng;

#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    pub name: &'static str,
    pub low: f64,
    pub high: f64,
}

impl Dimension {
    pub fn new(name: &'static str, low: f64, high: f64) -> Self {
        Self { name, low, high }
    }

    pub fn decode(&self, unit: f64) -> f64 {
        let t = unit.clamp(0.0, 1.0);
        (self.low + t * (self.high - self.low)).clamp(self.low, self.high)
    }

    pub fn encode(&self, value: f64) -> f64 {
        ((value - self.low) / (self.high - self.low)).clamp(0.0, 1.0)
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.low..=self.high).contains(&value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchSpace {
    pub dimensions: Vec<Dimension>,
}

impl SearchSpace {
    pub fn new(dimensions: Vec<Dimension>) -> Result<Self> {
        if dimensions.is_empty() {
            return Err(RankError::Optimization(
                "search space has no dimensions".to_string(),
            ));
        }
        for dimension in &dimensions {
            if !(dimension.low.is_finite() && dimension.high.is_finite())
                || dimension.low >= dimension.high
            {
                return Err(RankError::Optimization(format!(
                    "invalid bounds for {}: [{}, {}]",
                    dimension.name, dimension.low, dimension.high
                )));
            }
        }
        Ok(Self { dimensions })
    }

    pub fn weights() -> Result<Self> {
        Self::new(vec![
            Dimension::new("w1", *W1_BOUNDS.start(), *W1_BOUNDS.end()),
            Dimension::new("w2", *W2_BOUNDS.start(), *W2_BOUNDS.end()),
        ])
    }

    pub fn ndim(&self) -> usize {
        self.dimensions.len()
    }

    pub fn decode(&self, unit: &[f64]) -> Vec<f64> {
        self.dimensions
            .iter()
            .zip(unit)
            .map(|(dimension, &t)| dimension.decode(t))
            .collect()
    }

    pub fn encode(&self, point: &[f64]) -> Vec<f64> {
        self.dimensions
            .iter()
            .zip(point)
            .map(|(dimension, &value)| dimension.encode(value))
            .collect()
    }

    pub fn contains(&self, point: &[f64]) -> bool {
        point.len() == self.ndim()
            && self
                .dimensions
                .iter()
                .zip(point)
                .all(|(dimension, &value)| dimension.contains(value))
    }
}

/// Latin hypercube sample of `n` points in the unit hypercube.
pub fn latin_hypercube<R: Rng>(n: usize, ndim: usize, rng: &mut R) -> Vec<Vec<f64>> {
    let strata: Vec<Vec<usize>> = (0..ndim)
        .map(|_| {
            let mut perm: Vec<usize> = (0..n).collect();
            perm.shuffle(rng);
            perm
        })
        .collect();

    (0..n)
        .map(|i| {
            (0..ndim)
                .map(|d| (strata[d][i] as f64 + rng.gen::<f64>()) / n as f64)
                .collect()
        })
        .collect()
}

pub fn uniform<R: Rng>(ndim: usize, rng: &mut R) -> Vec<f64> {
    (0..ndim).map(|_| rng.gen::<f64>()).collect()
}
