//! Cumulative flow (CQ) and per-link discharge (§4.2, Eq. 1)
//!
//! Given a directed tree (arcs oriented downstream, as produced by
//! [`crate::graph::Tree::direct_toward`]), this module sums wastewater
//! contributions over the upstream-closed node set feeding each link, and
//! totals them into the single CQ figure used to rank candidate layouts
//! before sizing. Ported from `original_source/sewer_opt/optimizer.py`
//! (`calculate_cumulative_flow`, `_calculate_link_flow_directed`,
//! `_get_topological_order`).

use crate::graph::{Arc, Graph};
use std::collections::{HashMap, HashSet, VecDeque};

/// All nodes upstream of `from` (inclusive), found by walking predecessor
/// arcs back toward the network's leaves.
fn upstream_closure(arcs: &[Arc], from: u32) -> HashSet<u32> {
    let mut predecessors: HashMap<u32, Vec<u32>> = HashMap::new();
    for arc in arcs {
        predecessors.entry(arc.to).or_default().push(arc.from);
    }

    let mut closure = HashSet::new();
    let mut stack = vec![from];
    while let Some(node) = stack.pop() {
        if closure.insert(node) {
            if let Some(preds) = predecessors.get(&node) {
                stack.extend(preds.iter().copied());
            }
        }
    }
    closure
}

/// Discharge through the link whose upstream endpoint is `from` (m3/s):
/// the sum of positive wastewater contributions over every node upstream
/// of and including `from`.
pub fn link_flow(arcs: &[Arc], graph: &Graph, from: u32) -> f64 {
    upstream_closure(arcs, from)
        .into_iter()
        .map(|id| graph.node(id).contribution_m3s())
        .sum()
}

/// Total cumulative flow (CQ) across every link in the tree: the sum of
/// each link's discharge, not merely the outlet's total inflow (Eq. 1).
pub fn cumulative_flow(arcs: &[Arc], graph: &Graph) -> f64 {
    arcs.iter().map(|arc| link_flow(arcs, graph, arc.from)).sum()
}

/// Arcs in topological order: every arc's upstream endpoint has already
/// appeared as a downstream endpoint (or is a leaf) before the arc itself
/// is emitted. Computed via Kahn's algorithm on in-degree, matching
/// `_get_topological_order`.
pub fn topological_order(arcs: &[Arc]) -> Vec<Arc> {
    let mut in_degree: HashMap<u32, usize> = HashMap::new();
    let mut successors: HashMap<u32, Vec<Arc>> = HashMap::new();
    let mut all_nodes = HashSet::new();

    for &arc in arcs {
        all_nodes.insert(arc.from);
        all_nodes.insert(arc.to);
        *in_degree.entry(arc.to).or_insert(0) += 1;
        in_degree.entry(arc.from).or_insert(0);
        successors.entry(arc.from).or_default().push(arc);
    }

    let mut queue: VecDeque<u32> =
        all_nodes.iter().copied().filter(|n| in_degree[n] == 0).collect();
    let mut ordered = Vec::with_capacity(arcs.len());

    while let Some(node) = queue.pop_front() {
        if let Some(outgoing) = successors.get(&node) {
            for &arc in outgoing {
                ordered.push(arc);
                let degree = in_degree.get_mut(&arc.to).unwrap();
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(arc.to);
                }
            }
        }
    }
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    fn chain_graph() -> Graph {
        let nodes = vec![
            Node { id: 1, x: 0.0, y: 0.0, ground_level: 10.0, flow_lps: 10.0 },
            Node { id: 2, x: 100.0, y: 0.0, ground_level: 9.5, flow_lps: 20.0 },
            Node { id: 3, x: 200.0, y: 0.0, ground_level: 9.0, flow_lps: -30.0 },
        ];
        Graph::build(nodes, &[(1, 2), (2, 3)])
    }

    #[test]
    fn link_flow_accumulates_upstream_only() {
        let g = chain_graph();
        let tree = crate::graph::Tree { edges: g.edges() };
        let arcs = tree.direct_toward(g.outlet);

        // arc 1->2: upstream closure is just node 1.
        let flow_1_2 = link_flow(&arcs, &g, 1);
        assert!((flow_1_2 - 0.010).abs() < 1e-12);

        // arc 2->3: upstream closure is {1, 2}.
        let flow_2_3 = link_flow(&arcs, &g, 2);
        assert!((flow_2_3 - 0.030).abs() < 1e-12);
    }

    #[test]
    fn cumulative_flow_sums_every_link() {
        let g = chain_graph();
        let tree = crate::graph::Tree { edges: g.edges() };
        let arcs = tree.direct_toward(g.outlet);
        let cq = cumulative_flow(&arcs, &g);
        assert!((cq - 0.040).abs() < 1e-12); // 0.010 + 0.030
    }

    #[test]
    fn topological_order_respects_dependencies() {
        let g = chain_graph();
        let tree = crate::graph::Tree { edges: g.edges() };
        let arcs = tree.direct_toward(g.outlet);
        let ordered = topological_order(&arcs);

        assert_eq!(ordered.len(), arcs.len());
        let mut seen_to = HashSet::new();
        for arc in &ordered {
            if arc.from != 1 {
                assert!(seen_to.contains(&arc.from), "arc processed before its upstream endpoint");
            }
            seen_to.insert(arc.to);
        }
    }
}
