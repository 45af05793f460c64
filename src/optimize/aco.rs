//! Ant Colony Optimization over a discretized search space
//!
//! Each dimension is discretized into a fixed number of levels; ants choose
//! a level per dimension by pheromone-weighted probability (with
//! probability `q0` taking the single best level instead), then jitter
//! within the chosen level's neighborhood. Pheromone deposit is restricted
//! to the better half of each iteration's ants (plus the best-ever
//! solution) and clamped to a fixed range. Ported from
//! `original_source/sewer_opt/aco.py` (`AntColonyOptimization`).

use super::{Bound, CostFn, Optimizer, OptimizerResult};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

const ALPHA: f64 = 1.0; // pheromone importance
const BETA: f64 = 2.0; // heuristic importance
const RHO: f64 = 0.1; // evaporation rate
const Q0: f64 = 0.9; // exploitation probability
const N_LEVELS: usize = 50;
const TAU_MIN: f64 = 0.01;
const TAU_MAX: f64 = 10.0;
const DEPOSIT_Q: f64 = 1.0;

fn levels_for(bound: &Bound) -> Vec<f64> {
    if N_LEVELS == 1 {
        return vec![bound.lo];
    }
    (0..N_LEVELS)
        .map(|i| bound.lo + bound.width() * i as f64 / (N_LEVELS - 1) as f64)
        .collect()
}

pub struct Aco {
    pub n_ants: usize,
    pub n_iterations: usize,
}

impl Aco {
    pub fn new(n_ants: usize, n_iterations: usize) -> Self {
        Self { n_ants, n_iterations }
    }

    fn construct_solution(
        &self,
        bounds: &[Bound],
        levels: &[Vec<f64>],
        pheromone: &[Vec<f64>],
        heuristic: &[Vec<f64>],
        rng: &mut ChaCha8Rng,
    ) -> Vec<f64> {
        bounds
            .iter()
            .enumerate()
            .map(|(d, bound)| {
                let dim_levels = &levels[d];
                let weights: Vec<f64> = pheromone[d]
                    .iter()
                    .zip(&heuristic[d])
                    .map(|(&tau, &eta)| tau.powf(ALPHA) * eta.powf(BETA))
                    .collect();
                let sum: f64 = weights.iter().sum();
                let probabilities: Vec<f64> = if sum > 1e-10 {
                    weights.iter().map(|w| w / sum).collect()
                } else {
                    vec![1.0 / N_LEVELS as f64; N_LEVELS]
                };

                let selected_idx = if rng.gen::<f64>() < Q0 {
                    probabilities
                        .iter()
                        .enumerate()
                        .fold((0, f64::MIN), |(bi, bp), (i, &p)| if p > bp { (i, p) } else { (bi, bp) })
                        .0
                } else {
                    let draw: f64 = rng.gen();
                    let mut cumulative = 0.0;
                    let mut chosen = probabilities.len() - 1;
                    for (i, &p) in probabilities.iter().enumerate() {
                        cumulative += p;
                        if draw <= cumulative {
                            chosen = i;
                            break;
                        }
                    }
                    chosen
                };

                let level_value = dim_levels[selected_idx];
                let step = if N_LEVELS > 1 { dim_levels[1] - dim_levels[0] } else { 0.0 };
                let value = if selected_idx > 0 && selected_idx < N_LEVELS - 1 && rng.gen::<f64>() < 0.5 {
                    level_value + rng.gen_range(-0.1 * step..=0.1 * step)
                } else {
                    level_value
                };
                value.clamp(bound.lo, bound.hi)
            })
            .collect()
    }

    fn update_pheromones(
        &self,
        pheromone: &mut [Vec<f64>],
        solutions: &[Vec<f64>],
        costs: &[f64],
        levels: &[Vec<f64>],
    ) {
        for row in pheromone.iter_mut() {
            for tau in row.iter_mut() {
                *tau *= 1.0 - RHO;
            }
        }

        let mut sorted_costs = costs.to_vec();
        sorted_costs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let median = sorted_costs[sorted_costs.len() / 2];
        let min_cost = sorted_costs[0];

        for (solution, &cost) in solutions.iter().zip(costs) {
            if cost <= median || cost == min_cost {
                let delta_tau = DEPOSIT_Q / (cost + 1e-10);
                for (d, &value) in solution.iter().enumerate() {
                    let closest = levels[d]
                        .iter()
                        .enumerate()
                        .min_by(|(_, a), (_, b)| (*a - value).abs().partial_cmp(&(*b - value).abs()).unwrap())
                        .map(|(i, _)| i)
                        .unwrap_or(0);
                    pheromone[d][closest] += delta_tau;
                }
            }
        }

        for row in pheromone.iter_mut() {
            for tau in row.iter_mut() {
                *tau = tau.clamp(TAU_MIN, TAU_MAX);
            }
        }
    }
}

impl Optimizer for Aco {
    fn optimize(
        &self,
        cost_fn: &dyn CostFn,
        bounds: &[Bound],
        rng: &mut ChaCha8Rng,
    ) -> OptimizerResult {
        let n_dim = bounds.len();
        let levels: Vec<Vec<f64>> = bounds.iter().map(levels_for).collect();
        let mut pheromone: Vec<Vec<f64>> = vec![vec![1.0; N_LEVELS]; n_dim];
        let heuristic: Vec<Vec<f64>> = bounds
            .iter()
            .map(|b| vec![1.0 / (b.width() + 1e-10); N_LEVELS])
            .collect();

        let mut best_solution: Option<Vec<f64>> = None;
        let mut best_cost = f64::INFINITY;
        let mut convergence_history = Vec::with_capacity(self.n_iterations);

        for iteration in 0..self.n_iterations {
            let solutions: Vec<Vec<f64>> = (0..self.n_ants)
                .map(|_| self.construct_solution(bounds, &levels, &pheromone, &heuristic, rng))
                .collect();
            let costs: Vec<f64> = solutions.par_iter().map(|s| cost_fn(s)).collect();

            for (solution, &cost) in solutions.iter().zip(&costs) {
                if cost < best_cost {
                    best_cost = cost;
                    best_solution = Some(solution.clone());
                }
            }

            self.update_pheromones(&mut pheromone, &solutions, &costs, &levels);
            convergence_history.push(best_cost);

            if (iteration + 1) % 10 == 0 {
                tracing::debug!(iteration = iteration + 1, best_cost, "aco progress");
            }
        }

        OptimizerResult {
            best: best_solution.expect("at least one ant runs when n_iterations > 0"),
            best_cost,
            convergence_history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn improves_on_uniform_pheromone_start() {
        let bounds = vec![Bound::new(0.0, 12.0), Bound::new(0.0004, 0.02)];
        let cost = |x: &[f64]| (x[0] - 6.0).powi(2) + (x[1] - 0.01).powi(2) * 1e4;
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let aco = Aco::new(30, 40);
        let result = aco.optimize(&cost, &bounds, &mut rng);
        assert!(result.best_cost < 10.0, "cost {} too high", result.best_cost);
    }
}
