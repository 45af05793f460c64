//! Metaheuristic component-size optimizers (§4.6)
//!
//! Every optimizer shares one contract: minimize a black-box cost function
//! over per-dimension bounds, returning the best design vector found and
//! its cost. PSO is the primary algorithm; GA, AGA, and ACO are selectable
//! alternatives behind the same [`Optimizer`] trait, so [`crate::main`] can
//! dispatch on a CLI flag without matching on algorithm internals anywhere
//! else. Within each generation/iteration, population evaluation runs in
//! parallel via `rayon`; the parallel work is pure cost evaluation, so
//! it composes cleanly with the sequential RNG-driven generation of each
//! new population.

pub mod aco;
pub mod aga;
pub mod ga;
pub mod pso;

use rand_chacha::ChaCha8Rng;

/// Inclusive per-dimension search bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub lo: f64,
    pub hi: f64,
}

impl Bound {
    pub fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub fn width(&self) -> f64 {
        self.hi - self.lo
    }
}

/// Best vector found, its cost, and the best-cost-so-far recorded at every
/// iteration (§4.6: "Record g* per iteration in a convergence history").
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerResult {
    pub best: Vec<f64>,
    pub best_cost: f64,
    pub convergence_history: Vec<f64>,
}

/// A cost function over a flat design vector. Must tolerate concurrent
/// calls from multiple threads: every optimizer evaluates a population in
/// parallel.
pub trait CostFn: Fn(&[f64]) -> f64 + Sync {}
impl<T: Fn(&[f64]) -> f64 + Sync> CostFn for T {}

/// Common entry point every algorithm implements.
pub trait Optimizer {
    fn optimize(
        &self,
        cost_fn: &dyn CostFn,
        bounds: &[Bound],
        rng: &mut ChaCha8Rng,
    ) -> OptimizerResult;
}

/// Build per-link bounds for a layout with `n_links` edges: a diameter
/// index bound followed by a slope bound, repeated per link (§4.6).
pub fn bounds_for_links(n_links: usize) -> Vec<Bound> {
    let max_diameter_idx = (crate::cost::PIPE_DIAMETERS.len() - 1) as f64;
    let mut bounds = Vec::with_capacity(n_links * 2);
    for _ in 0..n_links {
        bounds.push(Bound::new(0.0, max_diameter_idx));
        bounds.push(Bound::new(0.0004, 0.02));
    }
    bounds
}
