use super::space::{latin_hypercube, SearchSpace};
use super::{OptimizeResult, Optimizer, Trial};
use crate::error::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const INITIAL_RADIUS: f64 = 0.25;
const MIN_RADIUS: f64 = 1e-3;
const PATIENCE: usize = 3;

pub struct RandomRefine {
    rng: StdRng,
}

impl RandomRefine {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn perturb(&mut self, center: &[f64], radius: f64) -> Vec<f64> {
        center
            .iter()
            .map(|&x| (x + self.rng.gen_range(-radius..=radius)).clamp(0.0, 1.0))
            .collect()
    }
}

impl Optimizer for RandomRefine {
    fn name(&self) -> &'static str {
        "random"
    }

    fn minimize(
        &mut self,
        objective: &mut dyn FnMut(&[f64]) -> f64,
        space: &SearchSpace,
        budget: usize,
        initial: &[f64],
    ) -> Result<OptimizeResult> {
        let mut trial = Trial::start(objective, space, budget, initial)?;

        let explore = trial.remaining() / 2;
        for unit in latin_hypercube(explore, space.ndim(), &mut self.rng) {
            trial.evaluate_unit(&unit)?;
        }

        let mut radius = INITIAL_RADIUS;
        let mut misses = 0;
        while trial.remaining() > 0 {
            let incumbent = trial.best().value;
            let candidate = self.perturb(&trial.best_unit(), radius);
            let value = trial.evaluate_unit(&candidate)?;
            if value < incumbent {
                misses = 0;
                continue;
            }
            misses += 1;
            if misses >= PATIENCE {
                radius = (radius / 2.0).max(MIN_RADIUS);
                misses = 0;
                tracing::debug!(radius, "shrinking refinement radius");
            }
        }
        Ok(trial.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perturbation_respects_radius_and_box() {
        let mut optimizer = RandomRefine::new(2);
        for _ in 0..200 {
            let point = optimizer.perturb(&[0.95, 0.5], 0.1);
            assert!(point[0] <= 1.0 && point[0] >= 0.85);
            assert!((point[1] - 0.5).abs() <= 0.1 + 1e-12);
        }
    }

    #[test]
    fn refines_toward_minimum() {
        let space = SearchSpace::weights().expect("space should build");
        let mut objective = |p: &[f64]| (p[0] - 2.9).powi(2) + (p[1] - 0.1).powi(2);
        let mut optimizer = RandomRefine::new(4);
        let result = optimizer
            .minimize(&mut objective, &space, 120, &[2.0, 0.5])
            .expect("search should run");
        assert_eq!(result.evaluations.len(), 120);
        assert!(result.best_value < 0.01, "best {}", result.best_value);
    }

    #[test]
    fn single_call_budget_returns_initial_point() {
        let space = SearchSpace::weights().expect("space should build");
        let mut objective = |p: &[f64]| p[0] + p[1];
        let mut optimizer = RandomRefine::new(0);
        let result = optimizer
            .minimize(&mut objective, &space, 1, &[2.0, 0.5])
            .expect("search should run");
        assert_eq!(result.best_point, vec![2.0, 0.5]);
    }
}
