//! Genetic Algorithm with simulated binary crossover and polynomial
//! mutation
//!
//! Even-indexed dimensions (diameter indices) are treated as integers
//! throughout: initialized, crossed over, and mutated as whole numbers so
//! the discrete catalogue is respected. Ported from
//! `original_source/sewer_opt/ga.py` (`GeneticAlgorithm`).

use super::{Bound, CostFn, Optimizer, OptimizerResult};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

const CROSSOVER_RATE: f64 = 0.8;
const MUTATION_RATE: f64 = 0.1;
const ELITISM_RATE: f64 = 0.1;
const ETA_C: f64 = 20.0;
const ETA_M: f64 = 20.0;

fn is_diameter_dim(d: usize) -> bool {
    d % 2 == 0
}

pub struct Ga {
    pub population_size: usize,
    pub n_iterations: usize,
}

impl Ga {
    pub fn new(population_size: usize, n_iterations: usize) -> Self {
        Self { population_size, n_iterations }
    }

    fn tournament_selection(
        &self,
        population: &[Vec<f64>],
        fitness: &[f64],
        rng: &mut ChaCha8Rng,
    ) -> Vec<Vec<f64>> {
        let n = population.len();
        let k = 3.min(n);
        (0..self.population_size)
            .map(|_| {
                let mut best_idx = rng.gen_range(0..n);
                for _ in 1..k {
                    let candidate = rng.gen_range(0..n);
                    if fitness[candidate] < fitness[best_idx] {
                        best_idx = candidate;
                    }
                }
                population[best_idx].clone()
            })
            .collect()
    }

    fn crossover(&self, parents: &[Vec<f64>], bounds: &[Bound], rng: &mut ChaCha8Rng) -> Vec<Vec<f64>> {
        let n_dim = bounds.len();
        let mut offspring = Vec::with_capacity(parents.len());
        let mut i = 0;
        while i + 1 < parents.len() && offspring.len() < self.population_size {
            let (p1, p2) = (&parents[i], &parents[i + 1]);
            if rng.gen::<f64>() < CROSSOVER_RATE {
                let mut c1 = vec![0.0; n_dim];
                let mut c2 = vec![0.0; n_dim];
                for d in 0..n_dim {
                    let u: f64 = rng.gen();
                    let beta = if u <= 0.5 {
                        (2.0 * u).powf(1.0 / (ETA_C + 1.0))
                    } else {
                        (1.0 / (2.0 * (1.0 - u))).powf(1.0 / (ETA_C + 1.0))
                    };
                    let mut v1 = 0.5 * ((1.0 + beta) * p1[d] + (1.0 - beta) * p2[d]);
                    let mut v2 = 0.5 * ((1.0 - beta) * p1[d] + (1.0 + beta) * p2[d]);
                    v1 = v1.clamp(bounds[d].lo, bounds[d].hi);
                    v2 = v2.clamp(bounds[d].lo, bounds[d].hi);
                    if is_diameter_dim(d) {
                        v1 = v1.round().clamp(bounds[d].lo, bounds[d].hi);
                        v2 = v2.round().clamp(bounds[d].lo, bounds[d].hi);
                    }
                    c1[d] = v1;
                    c2[d] = v2;
                }
                offspring.push(c1);
                offspring.push(c2);
            } else {
                offspring.push(p1.clone());
                offspring.push(p2.clone());
            }
            i += 2;
        }
        offspring.truncate(self.population_size);
        offspring
    }

    fn mutate(&self, population: &mut [Vec<f64>], bounds: &[Bound], rng: &mut ChaCha8Rng) {
        let n_dim = bounds.len();
        for individual in population.iter_mut() {
            if rng.gen::<f64>() >= MUTATION_RATE {
                continue;
            }
            for d in 0..n_dim {
                if rng.gen::<f64>() >= 1.0 / n_dim as f64 {
                    continue;
                }
                if is_diameter_dim(d) {
                    let current = individual[d].round();
                    individual[d] = if rng.gen::<f64>() < 0.5 {
                        (current + 1.0).min(bounds[d].hi)
                    } else {
                        (current - 1.0).max(bounds[d].lo)
                    };
                } else {
                    let u: f64 = rng.gen();
                    let delta = bounds[d].width();
                    let delta_q = if u < 0.5 {
                        (2.0 * u).powf(1.0 / (ETA_M + 1.0)) - 1.0
                    } else {
                        1.0 - (2.0 * (1.0 - u)).powf(1.0 / (ETA_M + 1.0))
                    };
                    individual[d] =
                        (individual[d] + delta_q * delta * 0.1).clamp(bounds[d].lo, bounds[d].hi);
                }
            }
        }
    }
}

impl Optimizer for Ga {
    fn optimize(
        &self,
        cost_fn: &dyn CostFn,
        bounds: &[Bound],
        rng: &mut ChaCha8Rng,
    ) -> OptimizerResult {
        let n_dim = bounds.len();
        let elitism_count = ((self.population_size as f64 * ELITISM_RATE) as usize).max(1);

        let mut population: Vec<Vec<f64>> = (0..self.population_size)
            .map(|_| {
                (0..n_dim)
                    .map(|d| {
                        if is_diameter_dim(d) {
                            rng.gen_range(bounds[d].lo as i64..=bounds[d].hi as i64) as f64
                        } else {
                            rng.gen_range(bounds[d].lo..=bounds[d].hi)
                        }
                    })
                    .collect()
            })
            .collect();

        let mut fitness: Vec<f64> = population.par_iter().map(|ind| cost_fn(ind)).collect();
        let mut best_idx = 0;
        for (i, &f) in fitness.iter().enumerate() {
            if f < fitness[best_idx] {
                best_idx = i;
            }
        }
        let mut best_solution = population[best_idx].clone();
        let mut best_fitness = fitness[best_idx];
        let mut convergence_history = vec![best_fitness];

        for generation in 0..self.n_iterations {
            let selected = self.tournament_selection(&population, &fitness, rng);
            let mut offspring = self.crossover(&selected, bounds, rng);
            self.mutate(&mut offspring, bounds, rng);
            let offspring_fitness: Vec<f64> = offspring.par_iter().map(|ind| cost_fn(ind)).collect();

            let mut elite_order: Vec<usize> = (0..population.len()).collect();
            elite_order.sort_by(|&a, &b| fitness[a].partial_cmp(&fitness[b]).unwrap());
            let elite: Vec<Vec<f64>> =
                elite_order.iter().take(elitism_count).map(|&i| population[i].clone()).collect();
            let elite_fitness: Vec<f64> =
                elite_order.iter().take(elitism_count).map(|&i| fitness[i]).collect();

            let mut combined: Vec<Vec<f64>> = elite;
            combined.extend(offspring);
            let mut combined_fitness: Vec<f64> = elite_fitness;
            combined_fitness.extend(offspring_fitness);

            let mut order: Vec<usize> = (0..combined.len()).collect();
            order.sort_by(|&a, &b| combined_fitness[a].partial_cmp(&combined_fitness[b]).unwrap());
            order.truncate(self.population_size);

            population = order.iter().map(|&i| combined[i].clone()).collect();
            fitness = order.iter().map(|&i| combined_fitness[i]).collect();

            for individual in population.iter_mut() {
                for d in (0..n_dim).step_by(2) {
                    individual[d] = individual[d].round().clamp(bounds[d].lo, bounds[d].hi);
                }
            }

            if fitness[0] < best_fitness {
                best_fitness = fitness[0];
                best_solution = population[0].clone();
            }
            convergence_history.push(best_fitness);

            if (generation + 1) % 10 == 0 {
                tracing::debug!(generation = generation + 1, best_cost = best_fitness, "ga progress");
            }
        }

        OptimizerResult { best: best_solution, best_cost: best_fitness, convergence_history }
    }
}
