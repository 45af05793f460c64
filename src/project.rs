//! Run configuration
//!
//! Settings for one optimization run: how many layouts to try, which
//! metaheuristic sizes each one, and its population/iteration counts.
//! Supersedes the original's interactive `input()` prompts
//! (`original_source/sewer_opt/cli.py`, `get_optimization_settings`) with a
//! struct `clap` can fill from flags or defaults.

use serde::{Deserialize, Serialize};

/// Which metaheuristic sizes each candidate layout.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Modified Particle Swarm Optimization (primary, per SPEC_FULL.md).
    Pso,
    /// Genetic Algorithm (SBX crossover, polynomial mutation).
    Ga,
    /// Adaptive Genetic Algorithm (binary chromosomes).
    Aga,
    /// Ant Colony Optimization (discretized search space).
    Aco,
}

/// Settings for one end-to-end optimization run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    /// Number of distinct spanning-tree layouts to generate and evaluate.
    pub n_layouts: usize,
    /// Population size (particles/individuals/ants) for the sizer.
    pub population_size: usize,
    /// Number of iterations/generations the sizer runs.
    pub n_iterations: usize,
    /// Which metaheuristic sizes each layout.
    pub algorithm: Algorithm,
    /// Manning's roughness coefficient used by the hydraulic evaluator.
    pub manning_n: f64,
    /// RNG seed; same seed + same inputs reproduces the same run.
    pub seed: u64,
}

impl RunConfig {
    /// Defaults matching `cli.py`'s interactive prompt defaults: 8 layouts,
    /// 800-particle swarms, 90 iterations.
    pub fn with_defaults() -> Self {
        Self {
            n_layouts: 8,
            population_size: 800,
            n_iterations: 90,
            algorithm: Algorithm::Pso,
            manning_n: 0.013,
            seed: 42,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_original_cli_prompts() {
        let config = RunConfig::with_defaults();
        assert_eq!(config.n_layouts, 8);
        assert_eq!(config.population_size, 800);
        assert_eq!(config.n_iterations, 90);
        assert_eq!(config.algorithm, Algorithm::Pso);
    }
}
