//! Least-cost gravity sewer network design — CLI driver
//!
//! Loads a `Manholes`/`Sections` text file, enumerates candidate layouts,
//! sizes each one with the configured metaheuristic, and writes the
//! cheapest design to a CSV file. Supersedes the original program's five
//! sequential `input()` prompts (`original_source/sewer_opt/cli.py`) with
//! flag-equivalent, default-backed `clap` options.

use clap::{Parser, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use sewer_opt::design::{self, DesignEvaluation};
use sewer_opt::graph::Tree;
use sewer_opt::network::SewerNetwork;
use sewer_opt::optimize::{aco::Aco, aga::Aga, ga::Ga, pso::Pso, Optimizer};
use sewer_opt::project::{Algorithm as RunAlgorithm, RunConfig};
use sewer_opt::{csv, flow, tree};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "sewer-opt")]
#[command(version = "0.1.0")]
#[command(about = "Least-cost gravity sewer network design", long_about = None)]
struct Cli {
    /// Path to the `Manholes`/`Sections` network text file.
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// CSV destination for the winning design (default:
    /// `output/<stem>_results.csv`).
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Number of distinct spanning-tree layouts to generate and evaluate.
    #[arg(short, long, default_value_t = 8)]
    layouts: usize,

    /// Population size (particles/individuals/ants) for the sizer.
    #[arg(short, long, default_value_t = 800)]
    population: usize,

    /// Number of iterations/generations the sizer runs.
    #[arg(long, default_value_t = 90)]
    iterations: usize,

    /// Which metaheuristic sizes each candidate layout.
    #[arg(short, long, value_enum, default_value = "pso")]
    algorithm: AlgorithmArg,

    /// RNG seed; same seed + same inputs reproduces the same run.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Manning's roughness coefficient.
    #[arg(long, default_value_t = 0.013)]
    manning_n: f64,

    /// Run a sensitivity sweep over swarm size and iteration count on the
    /// winning layout, after the main optimization.
    #[arg(long, default_value_t = false)]
    sensitivity: bool,

    /// Comma-separated swarm sizes for the sensitivity sweep.
    #[arg(long, value_delimiter = ',', default_value = "200,400,600,800,1000")]
    swarm_sizes: Vec<usize>,

    /// Comma-separated iteration counts for the sensitivity sweep.
    #[arg(long, value_delimiter = ',', default_value = "30,60,90,120")]
    iteration_list: Vec<usize>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AlgorithmArg {
    Pso,
    Ga,
    Aga,
    Aco,
}

impl From<AlgorithmArg> for RunAlgorithm {
    fn from(value: AlgorithmArg) -> Self {
        match value {
            AlgorithmArg::Pso => RunAlgorithm::Pso,
            AlgorithmArg::Ga => RunAlgorithm::Ga,
            AlgorithmArg::Aga => RunAlgorithm::Aga,
            AlgorithmArg::Aco => RunAlgorithm::Aco,
        }
    }
}

fn build_optimizer(algorithm: RunAlgorithm, population_size: usize, n_iterations: usize) -> Box<dyn Optimizer + Sync> {
    match algorithm {
        RunAlgorithm::Pso => Box::new(Pso::new(population_size, n_iterations)),
        RunAlgorithm::Ga => Box::new(Ga::new(population_size, n_iterations)),
        RunAlgorithm::Aga => Box::new(Aga::new(population_size, n_iterations)),
        RunAlgorithm::Aco => Box::new(Aco::new(population_size, n_iterations)),
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        tracing::error!(%err, "run failed");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = RunConfig {
        n_layouts: cli.layouts,
        population_size: cli.population,
        n_iterations: cli.iterations,
        algorithm: cli.algorithm.into(),
        manning_n: cli.manning_n,
        seed: cli.seed,
    };

    tracing::info!(input = %cli.input.display(), "loading network");
    let contents = std::fs::read_to_string(&cli.input)?;
    let network = SewerNetwork::from_text(&contents)?;
    tracing::info!(nodes = network.node_count(), "network loaded");

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let trees = tree::enumerate_trees(&network.graph, config.n_layouts, &mut rng);
    tracing::info!(requested = config.n_layouts, generated = trees.len(), "spanning trees enumerated");

    let mut layouts_with_cq: Vec<(f64, Tree, f64)> = trees
        .into_iter()
        .map(|t| {
            let arcs = t.direct_toward(network.graph.outlet);
            let cq = flow::cumulative_flow(&arcs, &network.graph);
            let length = t.total_length();
            (cq, t, length)
        })
        .collect();
    layouts_with_cq.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap());

    for (rank, (cq, _, length)) in layouts_with_cq.iter().enumerate() {
        tracing::debug!(rank = rank + 1, cq_m3s = cq, length_m = length, "layout ranked by cumulative flow");
    }

    let optimizer = build_optimizer(config.algorithm, config.population_size, config.n_iterations);
    let manning_n = config.manning_n;
    let seed = config.seed;

    let results: Vec<(Tree, f64, DesignEvaluation)> = layouts_with_cq
        .into_par_iter()
        .enumerate()
        .map(|(i, (cq, t, _length))| {
            let bounds = sewer_opt::optimize::bounds_for_links(t.edges.len());
            let cost_fn = |x: &[f64]| design::evaluate(&t, &network.graph, x, manning_n).cost;
            let mut layout_rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(i as u64));
            let result = optimizer.optimize(&cost_fn, &bounds, &mut layout_rng);
            let evaluation = design::evaluate(&t, &network.graph, &result.best, manning_n);
            tracing::info!(layout = i + 1, cq_m3s = cq, cost = evaluation.cost, "layout sized");
            (t, evaluation.cost, evaluation)
        })
        .collect();

    let (best_tree, best_cost, best_evaluation) = results
        .into_iter()
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
        .ok_or("no layouts were produced")?;

    tracing::info!(cost = best_cost, links = best_tree.edges.len(), "best layout selected");
    for violation in &best_evaluation.violations {
        tracing::warn!(link = violation.link_index, message = %violation.message, "design violation");
    }

    let output_path = cli.output.unwrap_or_else(|| {
        let stem = cli.input.file_stem().and_then(|s| s.to_str()).unwrap_or("network");
        PathBuf::from("output").join(format!("{stem}_results.csv"))
    });
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    csv::write_design_csv(&output_path, &best_evaluation.details)?;
    tracing::info!(output = %output_path.display(), "design written");

    if cli.sensitivity {
        run_sensitivity(&best_tree, &network.graph, &config, &cli.swarm_sizes, &cli.iteration_list);
    }

    Ok(())
}

fn run_sensitivity(
    tree: &Tree,
    graph: &sewer_opt::graph::Graph,
    config: &RunConfig,
    swarm_sizes: &[usize],
    iteration_list: &[usize],
) {
    tracing::info!(?swarm_sizes, ?iteration_list, "running sensitivity sweep on best layout");
    let bounds = sewer_opt::optimize::bounds_for_links(tree.edges.len());
    let manning_n = config.manning_n;

    let combinations: Vec<(usize, usize)> = swarm_sizes
        .iter()
        .flat_map(|&population| iteration_list.iter().map(move |&iterations| (population, iterations)))
        .collect();

    let sweep: Vec<(usize, usize, f64)> = combinations
        .into_par_iter()
        .map(|(population, iterations)| {
            let optimizer = build_optimizer(config.algorithm, population, iterations);
            let cost_fn = |x: &[f64]| design::evaluate(tree, graph, x, manning_n).cost;
            let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
            let result = optimizer.optimize(&cost_fn, &bounds, &mut rng);
            (population, iterations, result.best_cost)
        })
        .collect();

    for (population, iterations, cost) in sweep {
        tracing::info!(population, iterations, cost, "sensitivity point");
    }
}
