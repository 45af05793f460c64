//! Modified Particle Swarm Optimization
//!
//! Time-varying inertia weight and acceleration coefficients, per-dimension
//! velocity clamping at 15% of each bound's width. Ported from
//! `original_source/sewer_opt/pso.py` (`ModifiedPSO`).

use super::{Bound, CostFn, Optimizer, OptimizerResult};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

const W_MAX: f64 = 0.7;
const W_MIN: f64 = 0.2;
const C_MAX: f64 = 2.0;
const C_MIN: f64 = 0.5;
const VELOCITY_FRACTION: f64 = 0.15;

pub struct Pso {
    pub n_particles: usize,
    pub n_iterations: usize,
}

impl Pso {
    pub fn new(n_particles: usize, n_iterations: usize) -> Self {
        Self { n_particles, n_iterations }
    }
}

impl Optimizer for Pso {
    fn optimize(
        &self,
        cost_fn: &dyn CostFn,
        bounds: &[Bound],
        rng: &mut ChaCha8Rng,
    ) -> OptimizerResult {
        let n_dim = bounds.len();
        let v_max: Vec<f64> = bounds.iter().map(|b| b.width() * VELOCITY_FRACTION).collect();

        let mut particles: Vec<Vec<f64>> = (0..self.n_particles)
            .map(|_| bounds.iter().map(|b| rng.gen_range(b.lo..=b.hi)).collect())
            .collect();
        let mut velocities: Vec<Vec<f64>> = (0..self.n_particles)
            .map(|_| (0..n_dim).map(|d| rng.gen_range(-v_max[d]..=v_max[d])).collect())
            .collect();

        let mut pbest_costs: Vec<f64> = particles.par_iter().map(|p| cost_fn(p)).collect();
        let mut pbest = particles.clone();

        let mut gbest_idx = 0;
        for (i, &c) in pbest_costs.iter().enumerate() {
            if c < pbest_costs[gbest_idx] {
                gbest_idx = i;
            }
        }
        let mut gbest = pbest[gbest_idx].clone();
        let mut gbest_cost = pbest_costs[gbest_idx];
        let mut convergence_history = vec![gbest_cost];

        for t in 0..self.n_iterations {
            let progress = t as f64 / self.n_iterations as f64;
            let w = W_MAX - (W_MAX - W_MIN) * progress;
            let c1 = C_MAX - (C_MAX - C_MIN) * progress;
            let c2 = C_MAX - (C_MAX - C_MIN) * progress;

            for i in 0..self.n_particles {
                for d in 0..n_dim {
                    let r1: f64 = rng.gen();
                    let r2: f64 = rng.gen();
                    let v = w * velocities[i][d]
                        + c1 * r1 * (pbest[i][d] - particles[i][d])
                        + c2 * r2 * (gbest[d] - particles[i][d]);
                    velocities[i][d] = v.clamp(-v_max[d], v_max[d]);
                    particles[i][d] =
                        (particles[i][d] + velocities[i][d]).clamp(bounds[d].lo, bounds[d].hi);
                }
            }

            let costs: Vec<f64> = particles.par_iter().map(|p| cost_fn(p)).collect();
            for i in 0..self.n_particles {
                if costs[i] < pbest_costs[i] {
                    pbest[i] = particles[i].clone();
                    pbest_costs[i] = costs[i];
                    if costs[i] < gbest_cost {
                        gbest = particles[i].clone();
                        gbest_cost = costs[i];
                    }
                }
            }

            convergence_history.push(gbest_cost);

            if (t + 1) % 10 == 0 {
                tracing::debug!(iteration = t + 1, best_cost = gbest_cost, "pso progress");
            }
        }

        OptimizerResult { best: gbest, best_cost: gbest_cost, convergence_history }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn converges_on_a_simple_quadratic_bowl() {
        let bounds = vec![Bound::new(-10.0, 10.0), Bound::new(-10.0, 10.0)];
        let cost = |x: &[f64]| x[0] * x[0] + x[1] * x[1];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let pso = Pso::new(30, 40);
        let result = pso.optimize(&cost, &bounds, &mut rng);
        assert!(result.best_cost < 1.0, "cost {} did not converge near 0", result.best_cost);
    }
}
