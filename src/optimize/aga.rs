//! Adaptive Genetic Algorithm with binary chromosomes
//!
//! Each gene is an 8-bit binary string decoded in two stages: binary to a
//! normalized value in [0, 1], then linearly mapped into the dimension's
//! bounds. The mating pool is the top 60% by fitness; single-point
//! crossover produces two offspring per couple; mutation flips individual
//! bits. Ported from `original_source/sewer_opt/adaptive_ga.py`
//! (`AdaptiveGeneticAlgorithm`).

use super::{Bound, CostFn, Optimizer, OptimizerResult};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

const CROSSOVER_RATE: f64 = 0.8;
const MUTATION_RATE: f64 = 0.1;
const ELITISM_RATE: f64 = 0.1;
const BITS_PER_GENE: usize = 8;
const MATING_POOL_FRACTION: f64 = 0.6;
const CONVERGENCE_WINDOW_FRACTION: f64 = 0.2;
const CONVERGENCE_THRESHOLD: f64 = 1e-6;

fn decode_chromosome(bits: &[bool], bounds: &[Bound]) -> Vec<f64> {
    let mut decoded = Vec::with_capacity(bounds.len());
    for (d, bound) in bounds.iter().enumerate() {
        let gene = &bits[d * BITS_PER_GENE..(d + 1) * BITS_PER_GENE];
        let integer_value: u32 = gene.iter().fold(0, |acc, &bit| (acc << 1) | bit as u32);
        let max_value = (1u32 << BITS_PER_GENE) - 1;
        let normalized = integer_value as f64 / max_value as f64;
        let mut value = bound.lo + normalized * bound.width();
        if d % 2 == 0 {
            value = value.round().clamp(bound.lo, bound.hi);
        }
        decoded.push(value);
    }
    decoded
}

pub struct Aga {
    pub population_size: usize,
    pub n_iterations: usize,
}

impl Aga {
    pub fn new(population_size: usize, n_iterations: usize) -> Self {
        Self { population_size, n_iterations }
    }
}

impl Optimizer for Aga {
    fn optimize(
        &self,
        cost_fn: &dyn CostFn,
        bounds: &[Bound],
        rng: &mut ChaCha8Rng,
    ) -> OptimizerResult {
        let n_dim = bounds.len();
        let total_bits = n_dim * BITS_PER_GENE;
        let elitism_count = ((self.population_size as f64 * ELITISM_RATE) as usize).max(1);

        let mut binary_pop: Vec<Vec<bool>> = (0..self.population_size)
            .map(|_| (0..total_bits).map(|_| rng.gen_bool(0.5)).collect())
            .collect();
        let mut decoded_pop: Vec<Vec<f64>> =
            binary_pop.iter().map(|bits| decode_chromosome(bits, bounds)).collect();
        let mut fitness: Vec<f64> = decoded_pop.par_iter().map(|ind| cost_fn(ind)).collect();

        let mut best_idx = 0;
        for (i, &f) in fitness.iter().enumerate() {
            if f < fitness[best_idx] {
                best_idx = i;
            }
        }
        let mut best_solution = decoded_pop[best_idx].clone();
        let mut best_fitness = fitness[best_idx];
        let mut convergence_history = vec![best_fitness];

        for generation in 0..self.n_iterations {
            let mut ranked: Vec<usize> = (0..binary_pop.len()).collect();
            ranked.sort_by(|&a, &b| fitness[a].partial_cmp(&fitness[b]).unwrap());

            let mating_pool_size =
                ((self.population_size as f64 * MATING_POOL_FRACTION) as usize).max(1);
            let mating_pool: Vec<Vec<bool>> =
                ranked.iter().take(mating_pool_size).map(|&i| binary_pop[i].clone()).collect();

            let n_offspring_needed = self.population_size - elitism_count;
            let n_couples = n_offspring_needed.div_ceil(2);
            let mut offspring: Vec<Vec<bool>> = Vec::with_capacity(n_offspring_needed);
            for _ in 0..n_couples {
                if mating_pool.len() >= 2 && rng.gen::<f64>() < CROSSOVER_RATE {
                    let p1 = rng.gen_range(0..mating_pool.len());
                    let mut p2 = rng.gen_range(0..mating_pool.len());
                    while p2 == p1 {
                        p2 = rng.gen_range(0..mating_pool.len());
                    }
                    let point = rng.gen_range(1..total_bits);
                    let (parent1, parent2) = (&mating_pool[p1], &mating_pool[p2]);
                    let mut child1 = parent1[..point].to_vec();
                    child1.extend_from_slice(&parent2[point..]);
                    let mut child2 = parent2[..point].to_vec();
                    child2.extend_from_slice(&parent1[point..]);
                    offspring.push(child1);
                    offspring.push(child2);
                } else if !mating_pool.is_empty() {
                    let p1 = rng.gen_range(0..mating_pool.len());
                    let p2 = rng.gen_range(0..mating_pool.len());
                    offspring.push(mating_pool[p1].clone());
                    offspring.push(mating_pool[p2].clone());
                }
            }
            offspring.truncate(n_offspring_needed);

            let total_genes = offspring.len() * n_dim;
            let n_mutations = (total_genes as f64 * MUTATION_RATE) as usize;
            for _ in 0..n_mutations {
                if offspring.is_empty() {
                    break;
                }
                let chrom = rng.gen_range(0..offspring.len());
                let dim = rng.gen_range(0..n_dim);
                let bit = dim * BITS_PER_GENE + rng.gen_range(0..BITS_PER_GENE);
                offspring[chrom][bit] = !offspring[chrom][bit];
            }

            let offspring_decoded: Vec<Vec<f64>> =
                offspring.iter().map(|bits| decode_chromosome(bits, bounds)).collect();
            let offspring_fitness: Vec<f64> =
                offspring_decoded.par_iter().map(|ind| cost_fn(ind)).collect();

            let elite_binary: Vec<Vec<bool>> =
                ranked.iter().take(elitism_count).map(|&i| binary_pop[i].clone()).collect();
            let elite_decoded: Vec<Vec<f64>> =
                ranked.iter().take(elitism_count).map(|&i| decoded_pop[i].clone()).collect();
            let elite_fitness: Vec<f64> = ranked.iter().take(elitism_count).map(|&i| fitness[i]).collect();

            let mut combined_binary = elite_binary;
            combined_binary.extend(offspring);
            let mut combined_decoded = elite_decoded;
            combined_decoded.extend(offspring_decoded);
            let mut combined_fitness = elite_fitness;
            combined_fitness.extend(offspring_fitness);

            let mut order: Vec<usize> = (0..combined_binary.len()).collect();
            order.sort_by(|&a, &b| combined_fitness[a].partial_cmp(&combined_fitness[b]).unwrap());
            order.truncate(self.population_size);

            binary_pop = order.iter().map(|&i| combined_binary[i].clone()).collect();
            decoded_pop = order.iter().map(|&i| combined_decoded[i].clone()).collect();
            fitness = order.iter().map(|&i| combined_fitness[i]).collect();

            if fitness[0] < best_fitness {
                best_fitness = fitness[0];
                best_solution = decoded_pop[0].clone();
            }
            convergence_history.push(best_fitness);

            if (generation + 1) % 10 == 0 {
                tracing::debug!(generation = generation + 1, best_cost = best_fitness, "aga progress");
            }

            if generation as f64 > self.n_iterations as f64 * 0.8 {
                let window = ((self.n_iterations as f64 * CONVERGENCE_WINDOW_FRACTION) as usize).max(1);
                let recent = &convergence_history[convergence_history.len().saturating_sub(window)..];
                if recent.len() > 1 && (recent[recent.len() - 1] - recent[0]).abs() < CONVERGENCE_THRESHOLD
                {
                    tracing::debug!(generation = generation + 1, "aga converged early");
                    break;
                }
            }
        }

        OptimizerResult { best: best_solution, best_cost: best_fitness, convergence_history }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn decode_maps_all_zero_and_all_one_chromosomes_to_bounds() {
        let bounds = vec![Bound::new(0.0, 12.0), Bound::new(0.0004, 0.02)];
        let zeros = vec![false; BITS_PER_GENE * 2];
        let ones = vec![true; BITS_PER_GENE * 2];
        let low = decode_chromosome(&zeros, &bounds);
        let high = decode_chromosome(&ones, &bounds);
        assert_eq!(low[0], 0.0);
        assert_eq!(high[0], 12.0);
        assert!((low[1] - 0.0004).abs() < 1e-12);
        assert!((high[1] - 0.02).abs() < 1e-12);
    }

    #[test]
    fn improves_on_random_initialization() {
        let bounds = vec![Bound::new(0.0, 12.0), Bound::new(0.0004, 0.02)];
        let cost = |x: &[f64]| (x[0] - 6.0).powi(2) + (x[1] - 0.01).powi(2) * 1e4;
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let aga = Aga::new(40, 30);
        let result = aga.optimize(&cost, &bounds, &mut rng);
        assert!(result.best_cost < 10.0, "cost {} too high", result.best_cost);
    }
}
