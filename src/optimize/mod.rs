pub mod bayesian;
pub mod evolution;
pub mod objective;
pub mod random;
pub mod space;
pub mod surrogate;

use crate::error::{RankError, Result};
use crate::types::config::{OptimizerSettings, Strategy};
use crate::types::record::{Dataset, UEI_HEADER};
use crate::types::scoring::{Metrics, WeightPair};
use serde::Serialize;
use space::SearchSpace;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub point: Vec<f64>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizeResult {
    pub best_point: Vec<f64>,
    pub best_value: f64,
    pub evaluations: Vec<Evaluation>,
}

pub trait Optimizer {
    fn name(&self) -> &'static str;

    fn minimize(
        &mut self,
        objective: &mut dyn FnMut(&[f64]) -> f64,
        space: &SearchSpace,
        budget: usize,
        initial: &[f64],
    ) -> Result<OptimizeResult>;
}

pub struct Trial<'a> {
    objective: &'a mut dyn FnMut(&[f64]) -> f64,
    space: &'a SearchSpace,
    budget: usize,
    evaluations: Vec<Evaluation>,
    best: usize,
}

impl<'a> Trial<'a> {
    pub fn start(
        objective: &'a mut dyn FnMut(&[f64]) -> f64,
        space: &'a SearchSpace,
        budget: usize,
        initial: &[f64],
    ) -> Result<Self> {
        if budget == 0 {
            return Err(RankError::Optimization(
                "evaluation budget must be greater than 0".to_string(),
            ));
        }
        if !space.contains(initial) {
            return Err(RankError::Optimization(format!(
                "initial point {initial:?} lies outside the search space"
            )));
        }
        let mut trial = Self {
            objective,
            space,
            budget,
            evaluations: Vec::with_capacity(budget),
            best: 0,
        };
        trial.evaluate(initial.to_vec())?;
        Ok(trial)
    }

    pub fn space(&self) -> &SearchSpace {
        self.space
    }

    pub fn remaining(&self) -> usize {
        self.budget - self.evaluations.len()
    }

    pub fn best(&self) -> &Evaluation {
        &self.evaluations[self.best]
    }

    pub fn best_unit(&self) -> Vec<f64> {
        self.space.encode(&self.best().point)
    }

    pub fn unit_history(&self) -> (Vec<Vec<f64>>, Vec<f64>) {
        self.evaluations
            .iter()
            .map(|evaluation| (self.space.encode(&evaluation.point), evaluation.value))
            .unzip()
    }

    pub fn evaluate_unit(&mut self, unit: &[f64]) -> Result<f64> {
        let point = self.space.decode(unit);
        self.evaluate(point)
    }

    fn evaluate(&mut self, point: Vec<f64>) -> Result<f64> {
        if self.remaining() == 0 {
            return Err(RankError::Optimization(
                "evaluation budget exhausted".to_string(),
            ));
        }
        if !self.space.contains(&point) {
            return Err(RankError::Optimization(format!(
                "proposed point {point:?} lies outside the search space"
            )));
        }
        let value = (self.objective)(&point);
        if !value.is_finite() {
            return Err(RankError::Optimization(format!(
                "objective returned {value} at {point:?}"
            )));
        }
        tracing::debug!(call = self.evaluations.len() + 1, ?point, value, "objective evaluated");

        self.evaluations.push(Evaluation { point, value });
        let last = self.evaluations.len() - 1;
        if value < self.evaluations[self.best].value {
            self.best = last;
        }
        Ok(value)
    }

    pub fn finish(self) -> OptimizeResult {
        let best = self.evaluations[self.best].clone();
        OptimizeResult {
            best_point: best.point,
            best_value: best.value,
            evaluations: self.evaluations,
        }
    }
}

pub fn build_optimizer(
    strategy: Strategy,
    seed: u64,
    n_initial_points: usize,
) -> Box<dyn Optimizer> {
    match strategy {
        Strategy::Bayesian => Box::new(bayesian::BayesianOptimizer::new(seed, n_initial_points)),
        Strategy::Evolution => Box::new(evolution::DifferentialEvolution::new(seed)),
        Strategy::Random => Box::new(random::RandomRefine::new(seed)),
    }
}

#[derive(Debug, Clone)]
pub struct WeightOutcome {
    pub weights: WeightPair,
    pub best_objective: f64,
    pub evaluations: Vec<Evaluation>,
    pub strategy: Strategy,
    pub seed: u64,
}

pub fn collect_metrics(dataset: &Dataset) -> Result<Vec<Metrics>> {
    dataset
        .records
        .iter()
        .map(|record| {
            record
                .metrics
                .ok_or_else(|| RankError::MissingColumn(UEI_HEADER.to_string()))
        })
        .collect()
}

/// Searches `w1 ∈ [1, 3]`, `w2 ∈ [0, 1]` for the pair minimizing
/// [`objective::objective`] over the dataset's metrics.
pub fn optimize_weights(dataset: &Dataset, settings: &OptimizerSettings) -> Result<WeightOutcome> {
    settings.validate()?;
    let metrics = collect_metrics(dataset)?;
    if metrics.len() < 2 {
        return Err(RankError::InsufficientRecords(metrics.len()));
    }
    if metrics.len() > 5_000 {
        tracing::warn!(
            records = metrics.len(),
            calls = settings.n_calls,
            "pairwise dispersion is quadratic in record count; expect a slow search"
        );
    }

    let space = SearchSpace::weights()?;
    let seed = settings.seed.unwrap_or_else(rand::random);
    let mut optimizer = build_optimizer(settings.strategy, seed, settings.n_initial_points);
    tracing::info!(
        strategy = optimizer.name(),
        seed,
        calls = settings.n_calls,
        records = metrics.len(),
        "starting weight search"
    );

    let mut evaluate = |point: &[f64]| objective::objective(point[0], point[1], &metrics);
    let result = optimizer.minimize(&mut evaluate, &space, settings.n_calls, &settings.initial)?;
    let weights = WeightPair::new(result.best_point[0], result.best_point[1])?;
    tracing::info!(
        w1 = weights.w1,
        w2 = weights.w2,
        objective = result.best_value,
        "weight search finished"
    );

    Ok(WeightOutcome {
        weights,
        best_objective: result.best_value,
        evaluations: result.evaluations,
        strategy: settings.strategy,
        seed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::record::Record;
    use crate::types::scoring::{W1_BOUNDS, W2_BOUNDS};

    fn metrics_dataset(metrics: &[Metrics]) -> Dataset {
        Dataset {
            headers: Vec::new(),
            records: metrics
                .iter()
                .map(|&m| {
                    let mut record = Record::new("2024-01-01", [0.5; 7]);
                    record.months_since_release = Some(3);
                    record.metrics = Some(m);
                    record
                })
                .collect(),
        }
    }

    fn sample_metrics() -> Vec<Metrics> {
        vec![
            Metrics::new(1.2, 0.5, 12.0),
            Metrics::new(0.4, 0.0, 2.0),
            Metrics::new(0.1, 1.0, 1.0),
            Metrics::new(0.8, 0.7, 0.5),
            Metrics::new(0.05, 0.2, 4.0),
        ]
    }

    fn settings(strategy: Strategy, n_calls: usize) -> OptimizerSettings {
        OptimizerSettings {
            strategy,
            n_calls,
            n_initial_points: 10.min(n_calls),
            seed: Some(7),
            initial: [2.0, 0.5],
        }
    }

    #[test]
    fn trial_evaluates_initial_point_first() {
        let space = SearchSpace::weights().expect("space should build");
        let mut calls = Vec::new();
        let mut objective = |point: &[f64]| {
            calls.push(point.to_vec());
            point[0] + point[1]
        };
        let trial = Trial::start(&mut objective, &space, 3, &[2.0, 0.5]).expect("start");
        assert_eq!(trial.remaining(), 2);
        assert_eq!(trial.best().point, vec![2.0, 0.5]);
        drop(trial);
        assert_eq!(calls, vec![vec![2.0, 0.5]]);
    }

    #[test]
    fn trial_rejects_zero_budget_and_outside_initial_point() {
        let space = SearchSpace::weights().expect("space should build");
        let mut objective = |_: &[f64]| 0.0;
        assert!(Trial::start(&mut objective, &space, 0, &[2.0, 0.5]).is_err());
        let mut objective = |_: &[f64]| 0.0;
        let err = Trial::start(&mut objective, &space, 5, &[4.0, 0.5])
            .err()
            .expect("outside point should fail");
        assert!(err.to_string().contains("outside the search space"));
    }

    #[test]
    fn trial_rejects_non_finite_objective_values() {
        let space = SearchSpace::weights().expect("space should build");
        let mut objective = |_: &[f64]| f64::NAN;
        let err = Trial::start(&mut objective, &space, 5, &[2.0, 0.5])
            .err()
            .expect("NaN objective should fail");
        assert!(matches!(err, RankError::Optimization(_)));
    }

    #[test]
    fn trial_stops_at_budget() {
        let space = SearchSpace::weights().expect("space should build");
        let mut objective = |point: &[f64]| point[0];
        let mut trial = Trial::start(&mut objective, &space, 2, &[2.0, 0.5]).expect("start");
        trial.evaluate_unit(&[0.0, 0.0]).expect("second call fits");
        assert!(trial.evaluate_unit(&[0.1, 0.1]).is_err());
        let result = trial.finish();
        assert_eq!(result.evaluations.len(), 2);
        assert_eq!(result.best_point, vec![1.0, 0.0]);
    }

    #[test]
    fn every_strategy_spends_the_budget_and_stays_in_bounds() {
        let dataset = metrics_dataset(&sample_metrics());
        for strategy in [Strategy::Bayesian, Strategy::Evolution, Strategy::Random] {
            let outcome =
                optimize_weights(&dataset, &settings(strategy, 30)).expect("search should run");
            assert_eq!(outcome.evaluations.len(), 30, "{strategy:?}");
            assert_eq!(outcome.evaluations[0].point, vec![2.0, 0.5]);
            assert!(W1_BOUNDS.contains(&outcome.weights.w1));
            assert!(W2_BOUNDS.contains(&outcome.weights.w2));
            assert!(outcome.evaluations.iter().all(|evaluation| {
                W1_BOUNDS.contains(&evaluation.point[0]) && W2_BOUNDS.contains(&evaluation.point[1])
            }));
            let min = outcome
                .evaluations
                .iter()
                .map(|evaluation| evaluation.value)
                .fold(f64::INFINITY, f64::min);
            assert_eq!(outcome.best_objective, min);
        }
    }

    #[test]
    fn search_improves_on_initial_point() {
        let dataset = metrics_dataset(&sample_metrics());
        let outcome = optimize_weights(&dataset, &settings(Strategy::Bayesian, 40))
            .expect("search should run");
        let initial = objective::objective(2.0, 0.5, &sample_metrics());
        assert!(outcome.best_objective <= initial);
    }

    #[test]
    fn same_seed_gives_same_weights() {
        let dataset = metrics_dataset(&sample_metrics());
        let a = optimize_weights(&dataset, &settings(Strategy::Random, 25)).expect("run a");
        let b = optimize_weights(&dataset, &settings(Strategy::Random, 25)).expect("run b");
        assert_eq!(a.weights, b.weights);
        assert_eq!(a.evaluations, b.evaluations);
    }

    #[test]
    fn optimize_requires_two_records() {
        let dataset = metrics_dataset(&sample_metrics()[..1]);
        let err = optimize_weights(&dataset, &settings(Strategy::Bayesian, 10))
            .expect_err("single record should fail");
        assert!(matches!(err, RankError::InsufficientRecords(1)));
    }

    #[test]
    fn optimize_requires_metrics() {
        let mut dataset = metrics_dataset(&sample_metrics());
        dataset.records[2].metrics = None;
        assert!(matches!(
            optimize_weights(&dataset, &settings(Strategy::Bayesian, 10)),
            Err(RankError::MissingColumn(_))
        ));
    }
}
