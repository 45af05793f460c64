//! End-to-end scenarios covering the pipeline from parsed input through
//! a sized design.

use approx::assert_relative_eq;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sewer_opt::design;
use sewer_opt::graph::Tree;
use sewer_opt::network::SewerNetwork;
use sewer_opt::optimize::{bounds_for_links, pso::Pso, Optimizer};
use sewer_opt::tree;

const MANNING_N: f64 = 0.013;

fn linear_chain_input() -> &'static str {
    "Manholes 3\n\
     ID X Y Z Q\n\
     1 0 0 10.0 15.0\n\
     2 100 0 9.5 15.0\n\
     3 200 0 9.0 -30.0\n\
     Sections 2\n\
     U V\n\
     1 2\n\
     2 3\n"
}

fn y_junction_input() -> &'static str {
    "Manholes 4\n\
     ID X Y Z Q\n\
     1 0 0 10.0 5.0\n\
     2 0 100 10.0 5.0\n\
     3 50 50 9.5 0.0\n\
     4 100 50 9.0 -10.0\n\
     Sections 3\n\
     U V\n\
     1 3\n\
     2 3\n\
     3 4\n"
}

/// Scenario 1: a linear chain has exactly one spanning tree and every link
/// carries the full upstream-accumulated flow.
#[test]
fn scenario_linear_chain_has_a_single_layout() {
    let network = SewerNetwork::from_text(linear_chain_input()).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let trees = tree::enumerate_trees(&network.graph, 5, &mut rng);
    assert_eq!(trees.len(), 1);

    let arcs = trees[0].direct_toward(network.graph.outlet);
    assert_eq!(arcs.len(), 2);
    let cq = sewer_opt::flow::cumulative_flow(&arcs, &network.graph);
    // link 1->2 carries 0.015 m3/s, link 2->3 carries 0.030 m3/s.
    assert_relative_eq!(cq, 0.045, epsilon = 1e-9);
}

/// Scenario 2: a Y-junction has a single topology (two source branches
/// join then flow to the outlet) but the MST is still well-defined and
/// matches the graph's only spanning tree.
#[test]
fn scenario_y_junction_layout_is_unique_and_spans_all_nodes() {
    let network = SewerNetwork::from_text(y_junction_input()).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let trees = tree::enumerate_trees(&network.graph, 4, &mut rng);
    assert_eq!(trees.len(), 1);
    assert_eq!(trees[0].edges.len(), 3);
    assert!(network.graph.is_spanning_tree(&trees[0].edges));
}

/// Scenario 3: a design point right at the hydraulic feasibility boundary
/// (tiny pipe, huge flow) collapses to the infeasible penalty rather than
/// panicking, while a generously sized pipe on the same layout is feasible.
#[test]
fn scenario_hydraulic_feasibility_boundary() {
    let network = SewerNetwork::from_text(linear_chain_input()).unwrap();
    let tree = Tree { edges: network.graph.edges() };

    let tiny_pipe = [0.0, 0.0004, 0.0, 0.0004];
    let tiny_eval = design::evaluate(&tree, &network.graph, &tiny_pipe, MANNING_N);
    assert!(tiny_eval.cost >= 1e8);

    let generous_pipe = [6.0, 0.005, 6.0, 0.005];
    let generous_eval = design::evaluate(&tree, &network.graph, &generous_pipe, MANNING_N);
    assert!(generous_eval.cost < 1e8);
    assert!(generous_eval.violations.is_empty(), "{:?}", generous_eval.violations);
}

/// Scenario 4: progressive-diameter enforcement forces a downstream link's
/// diameter up to at least its upstream predecessor's, and records a
/// violation for the forced increase.
#[test]
fn scenario_progressive_diameter_enforcement() {
    let network = SewerNetwork::from_text(linear_chain_input()).unwrap();
    let tree = Tree { edges: network.graph.edges() };

    // Upstream link (1->2) gets diameter index 10 (0.9m); downstream link
    // (2->3) proposes index 0 (0.2m), which must be bumped to >= 0.9m.
    let design_vec = [10.0, 0.005, 0.0, 0.005];
    let eval = design::evaluate(&tree, &network.graph, &design_vec, MANNING_N);

    let downstream = &eval.details[1];
    assert!(downstream.diameter >= 0.9 - 1e-9);
    assert!(eval
        .violations
        .iter()
        .any(|v| v.violation_type == sewer_opt::analysis::ViolationType::ProgressiveDiameter));
}

/// Scenario 5: the MST is deterministic regardless of RNG seed, and is
/// always the first tree the enumerator returns.
#[test]
fn scenario_mst_determinism_across_seeds() {
    let network = SewerNetwork::from_text(y_junction_input()).unwrap();

    let mut rng_a = ChaCha8Rng::seed_from_u64(11);
    let mut rng_b = ChaCha8Rng::seed_from_u64(999);
    let trees_a = tree::enumerate_trees(&network.graph, 3, &mut rng_a);
    let trees_b = tree::enumerate_trees(&network.graph, 3, &mut rng_b);

    assert_eq!(trees_a[0].signature(), trees_b[0].signature());
}

/// Scenario 6: two PSO runs seeded identically, on the same layout and
/// bounds, reproduce the same best cost and best design vector — the
/// sizer introduces no hidden nondeterminism.
#[test]
fn scenario_pso_is_seed_reproducible() {
    let network = SewerNetwork::from_text(linear_chain_input()).unwrap();
    let tree = Tree { edges: network.graph.edges() };
    let bounds = bounds_for_links(tree.edges.len());
    let cost_fn = |x: &[f64]| design::evaluate(&tree, &network.graph, x, MANNING_N).cost;

    let pso = Pso::new(40, 25);
    let mut rng_a = ChaCha8Rng::seed_from_u64(7);
    let mut rng_b = ChaCha8Rng::seed_from_u64(7);
    let result_a = pso.optimize(&cost_fn, &bounds, &mut rng_a);
    let result_b = pso.optimize(&cost_fn, &bounds, &mut rng_b);

    assert_relative_eq!(result_a.best_cost, result_b.best_cost, epsilon = 1e-9);
    for (a, b) in result_a.best.iter().zip(&result_b.best) {
        assert_relative_eq!(a, b, epsilon = 1e-9);
    }
}
