use super::space::{latin_hypercube, uniform, SearchSpace};
use super::{OptimizeResult, Optimizer, Trial};
use crate::error::Result;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

const POPULATION: usize = 10;
const DIFFERENTIAL_WEIGHT: f64 = 0.8;
const CROSSOVER_RATE: f64 = 0.9;

struct Member {
    unit: Vec<f64>,
    value: f64,
}

pub struct DifferentialEvolution {
    rng: StdRng,
}

impl DifferentialEvolution {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Donor `a + F (b - c)` crossed with `target`; at least one coordinate
    /// always comes from the donor.
    fn offspring(&mut self, population: &[Member], target: usize) -> Vec<f64> {
        let [a, b, c] = self.pick_three(population.len(), target);
        let ndim = population[target].unit.len();
        let forced = self.rng.gen_range(0..ndim);
        (0..ndim)
            .map(|d| {
                if d == forced || self.rng.gen::<f64>() < CROSSOVER_RATE {
                    let donor = population[a].unit[d]
                        + DIFFERENTIAL_WEIGHT * (population[b].unit[d] - population[c].unit[d]);
                    donor.clamp(0.0, 1.0)
                } else {
                    population[target].unit[d]
                }
            })
            .collect()
    }

    fn pick_three(&mut self, size: usize, exclude: usize) -> [usize; 3] {
        // Sample from the population minus `exclude`, then shift past it.
        let picked = index::sample(&mut self.rng, size - 1, 3);
        let shift = |i: usize| if i >= exclude { i + 1 } else { i };
        [shift(picked.index(0)), shift(picked.index(1)), shift(picked.index(2))]
    }
}

impl Optimizer for DifferentialEvolution {
    fn name(&self) -> &'static str {
        "evolution"
    }

    fn minimize(
        &mut self,
        objective: &mut dyn FnMut(&[f64]) -> f64,
        space: &SearchSpace,
        budget: usize,
        initial: &[f64],
    ) -> Result<OptimizeResult> {
        let mut trial = Trial::start(objective, space, budget, initial)?;
        let mut population = vec![Member {
            unit: trial.best_unit(),
            value: trial.best().value,
        }];

        let size = POPULATION.min(budget);
        for unit in latin_hypercube(size - 1, space.ndim(), &mut self.rng) {
            let value = trial.evaluate_unit(&unit)?;
            population.push(Member { unit, value });
        }

        if population.len() < 4 {
            // Too few members to form a donor vector.
            while trial.remaining() > 0 {
                let unit = uniform(space.ndim(), &mut self.rng);
                trial.evaluate_unit(&unit)?;
            }
            return Ok(trial.finish());
        }

        let mut generation = 0usize;
        'search: loop {
            for target in 0..population.len() {
                if trial.remaining() == 0 {
                    break 'search;
                }
                let unit = self.offspring(&population, target);
                let value = trial.evaluate_unit(&unit)?;
                if value <= population[target].value {
                    population[target] = Member { unit, value };
                }
            }
            generation += 1;
            tracing::debug!(generation, best = trial.best().value, "generation complete");
        }
        Ok(trial.finish())
    }
}
