use super::space::{latin_hypercube, uniform, SearchSpace};
use super::surrogate::{expected_improvement, GaussianProcess};
use super::{OptimizeResult, Optimizer, Trial};
use crate::error::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const RANDOM_CANDIDATES: usize = 1000;
const LOCAL_CANDIDATES: usize = 100;
const LOCAL_RADIUS: f64 = 0.05;
const EXPLORATION_XI: f64 = 0.01;
// Candidates closer than this (unit coordinates) to an evaluated point are skipped.
const MIN_SEPARATION: f64 = 1e-6;

pub struct BayesianOptimizer {
    rng: StdRng,
    n_initial_points: usize,
}

impl BayesianOptimizer {
    pub fn new(seed: u64, n_initial_points: usize) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            n_initial_points: n_initial_points.max(1),
        }
    }

    fn propose(&mut self, trial: &Trial<'_>) -> Vec<f64> {
        let ndim = trial.space().ndim();
        let (points, values) = trial.unit_history();
        let Some(gp) = GaussianProcess::fit(&points, &values) else {
            tracing::debug!("surrogate fit failed, sampling uniformly");
            return uniform(ndim, &mut self.rng);
        };

        let incumbent = trial.best_unit();
        let mut candidates = (0..RANDOM_CANDIDATES)
            .map(|_| uniform(ndim, &mut self.rng))
            .collect::<Vec<_>>();
        candidates.extend((0..LOCAL_CANDIDATES).map(|_| {
            incumbent
                .iter()
                .map(|&x| (x + self.rng.gen_range(-LOCAL_RADIUS..=LOCAL_RADIUS)).clamp(0.0, 1.0))
                .collect::<Vec<_>>()
        }));

        let best_value = trial.best().value;
        let scored = candidates
            .into_iter()
            .map(|candidate| {
                let separation = min_distance(&candidate, &points);
                let (mean, std) = gp.predict(&candidate);
                let ei = expected_improvement(mean, std, best_value, EXPLORATION_XI);
                (candidate, ei, separation)
            })
            .filter(|(_, _, separation)| *separation > MIN_SEPARATION)
            .collect::<Vec<_>>();

        let by_ei = scored
            .iter()
            .filter(|(_, ei, _)| *ei > 0.0)
            .max_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((candidate, ei, _)) = by_ei {
            tracing::debug!(ei, length_scale = gp.length_scale(), "proposal by expected improvement");
            return candidate.clone();
        }

        // Flat acquisition: explore the least-covered candidate instead.
        scored
            .into_iter()
            .max_by(|a, b| a.2.total_cmp(&b.2))
            .map(|(candidate, _, _)| candidate)
            .unwrap_or_else(|| uniform(ndim, &mut self.rng))
    }
}

impl Optimizer for BayesianOptimizer {
    fn name(&self) -> &'static str {
        "bayesian"
    }

    fn minimize(
        &mut self,
        objective: &mut dyn FnMut(&[f64]) -> f64,
        space: &SearchSpace,
        budget: usize,
        initial: &[f64],
    ) -> Result<OptimizeResult> {
        let mut trial = Trial::start(objective, space, budget, initial)?;

        let design = latin_hypercube(self.n_initial_points - 1, space.ndim(), &mut self.rng);
        for unit in design {
            if trial.remaining() == 0 {
                break;
            }
            trial.evaluate_unit(&unit)?;
        }

        while trial.remaining() > 0 {
            let next = self.propose(&trial);
            trial.evaluate_unit(&next)?;
        }
        Ok(trial.finish())
    }
}

fn min_distance(point: &[f64], history: &[Vec<f64>]) -> f64 {
    history
        .iter()
        .map(|other| {
            point
                .iter()
                .zip(other)
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
                .sqrt()
        })
        .fold(f64::INFINITY, f64::min)
}
