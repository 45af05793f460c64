//! Design evaluator: cost + constraint penalties (§4.4)
//!
//! Turns a flat design vector (two entries per link — a diameter index and
//! a slope) into a priced, constraint-checked design for one spanning-tree
//! layout. This is the cost function every optimizer in [`crate::optimize`]
//! calls; it never fails, it folds every infeasibility into the returned
//! cost as a penalty, following `original_source/sewer_opt/optimizer.py`
//! (`_evaluate_design`).

use crate::analysis::Violation;
use crate::cost;
use crate::flow;
use crate::graph::{Arc, Graph, Tree};
use crate::hydraulics::ManningPartialFlow;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Assumed trench depth used by every link's manhole/earthwork cost and
/// cover check — the layout carries no independent depth-of-cover profile
/// (§9 "Cover depth").
pub const ASSUMED_DEPTH_M: f64 = 1.5;

const MIN_VELOCITY_MPS: f64 = 0.6;
const MAX_VELOCITY_MPS: f64 = 3.0;
const MIN_VELOCITY_CHECK_FLOW_M3S: f64 = 0.0014;
const MAX_DEPTH_RATIO: f64 = 0.8;
const MIN_COVER_M: f64 = 0.9;
const MAX_COVER_M: f64 = 5.0;

const PENALTY_INFEASIBLE: f64 = 1e8;
const PENALTY_PER_MPS: f64 = 1e8;
const PENALTY_PER_DEPTH_RATIO: f64 = 1e8;
const PENALTY_PER_COVER_M: f64 = 1e8;
const PENALTY_PER_PROGRESSIVE_M: f64 = 1e6;

/// One priced, checked link in an evaluated design — the unit exported by
/// [`crate::csv`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DesignDetail {
    pub link: usize,
    pub from_node: u32,
    pub to_node: u32,
    pub length: f64,
    pub diameter: f64,
    pub slope: f64,
    pub slope_ratio: String,
    pub flow_lps: f64,
    pub velocity: Option<f64>,
    #[serde(rename = "d_D")]
    pub depth_ratio: Option<f64>,
    pub d: Option<f64>,
    pub status: String,
    pub max_preceding_diameter: Option<f64>,
    pub input_flow_lps: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Result of evaluating one design vector against one layout.
#[derive(Debug, Clone)]
pub struct DesignEvaluation {
    /// Component cost plus every constraint penalty — what the optimizer
    /// minimizes.
    pub cost: f64,
    pub details: Vec<DesignDetail>,
    pub violations: Vec<Violation>,
}

fn slope_ratio(slope: f64) -> String {
    if slope > 0.0 {
        format!("1 in {}", (1.0 / slope) as i64)
    } else {
        "1 in inf".to_string()
    }
}

/// Smallest catalogued diameter >= `target`, or `target` itself if every
/// catalogued size is smaller (mirrors the Python fallback of leaving the
/// diameter unchanged when `valid_diameters` comes back empty).
fn smallest_diameter_at_least(target: f64) -> f64 {
    match cost::PIPE_DIAMETERS.iter().copied().filter(|&d| d >= target).fold(None, |acc, d| {
        Some(match acc {
            Some(current) if current <= d => current,
            _ => d,
        })
    }) {
        Some(d) => d,
        None => target, // no catalogued size reaches target: leave it unchanged
    }
}

/// Evaluate a design vector of length `2 * tree.edges.len()` against
/// `tree`/`graph`, returning total cost (component cost + penalties) and a
/// detail row per link.
pub fn evaluate(tree: &Tree, graph: &Graph, design: &[f64], manning_n: f64) -> DesignEvaluation {
    let arcs = tree.direct_toward(graph.outlet);
    let ordered = flow::topological_order(&arcs);
    let hydraulics = ManningPartialFlow::new(manning_n);

    let mut predecessors: HashMap<u32, Vec<u32>> = HashMap::new();
    for arc in &arcs {
        predecessors.entry(arc.to).or_default().push(arc.from);
    }

    let mut node_diameter: HashMap<u32, f64> = HashMap::new();
    let mut total_cost = 0.0;
    let mut penalty = 0.0;
    let mut details = Vec::with_capacity(ordered.len());
    let mut violations = Vec::new();

    for (i, &Arc { from: u, to: v, length }) in ordered.iter().enumerate() {
        let link = i + 1;
        let n_diameters = cost::PIPE_DIAMETERS.len();
        let raw_idx = design[i * 2].round().clamp(0.0, (n_diameters - 1) as f64) as usize;
        let proposed_diameter = cost::PIPE_DIAMETERS[raw_idx];
        let slope = design[i * 2 + 1];

        let max_preceding_diameter = predecessors
            .get(&u)
            .into_iter()
            .flatten()
            .filter_map(|pred| node_diameter.get(pred).copied())
            .fold(0.0_f64, f64::max);

        let diameter = if max_preceding_diameter > 0.0 && proposed_diameter < max_preceding_diameter
        {
            smallest_diameter_at_least(max_preceding_diameter)
        } else {
            proposed_diameter
        };
        node_diameter.insert(v, diameter);

        if max_preceding_diameter > 0.0 && proposed_diameter < max_preceding_diameter - 0.001 {
            penalty += PENALTY_PER_PROGRESSIVE_M * (max_preceding_diameter - proposed_diameter);
            violations.push(Violation::progressive_diameter(link, diameter * 1000.0));
        }

        let link_flow_m3s = flow::link_flow(&arcs, graph, u);
        let from_node = graph.node(u);

        let params = hydraulics.solve(link_flow_m3s, diameter, slope);

        let detail_base = DesignDetail {
            link,
            from_node: u,
            to_node: v,
            length,
            diameter,
            slope,
            slope_ratio: slope_ratio(slope),
            flow_lps: link_flow_m3s * 1000.0,
            velocity: None,
            depth_ratio: None,
            d: None,
            status: String::new(),
            max_preceding_diameter: if max_preceding_diameter > 0.0 {
                Some(max_preceding_diameter)
            } else {
                None
            },
            input_flow_lps: from_node.contribution_m3s() * 1000.0,
            x: from_node.x,
            y: from_node.y,
            z: from_node.ground_level,
        };

        let Some(params) = params else {
            penalty += PENALTY_INFEASIBLE;
            violations.push(Violation::infeasible_hydraulics(link));
            details.push(DesignDetail {
                status: "Invalid - K >= 1/pi".to_string(),
                ..detail_base
            });
            continue;
        };

        let pipe_cost = cost::pipe_cost(diameter, length);
        let manhole_cost = cost::manhole_cost(ASSUMED_DEPTH_M);
        let earthwork_cost = cost::earthwork_cost(ASSUMED_DEPTH_M, length);
        total_cost += pipe_cost + manhole_cost + earthwork_cost;

        let mut link_violations = Vec::new();
        if params.velocity < MIN_VELOCITY_MPS && link_flow_m3s >= MIN_VELOCITY_CHECK_FLOW_M3S {
            penalty += PENALTY_PER_MPS * (MIN_VELOCITY_MPS - params.velocity);
            link_violations.push(Violation::velocity_low(link, params.velocity));
        }
        if params.velocity > MAX_VELOCITY_MPS {
            penalty += PENALTY_PER_MPS * (params.velocity - MAX_VELOCITY_MPS);
            link_violations.push(Violation::velocity_high(link, params.velocity));
        }
        if params.depth_ratio > MAX_DEPTH_RATIO {
            penalty += PENALTY_PER_DEPTH_RATIO * (params.depth_ratio - MAX_DEPTH_RATIO);
            link_violations.push(Violation::depth_ratio(link, params.depth_ratio));
        }
        if ASSUMED_DEPTH_M < MIN_COVER_M {
            penalty += PENALTY_PER_COVER_M * (MIN_COVER_M - ASSUMED_DEPTH_M);
            link_violations.push(Violation::cover(link, ASSUMED_DEPTH_M, MIN_COVER_M));
        }
        if ASSUMED_DEPTH_M > MAX_COVER_M {
            penalty += PENALTY_PER_COVER_M * (ASSUMED_DEPTH_M - MAX_COVER_M);
            link_violations.push(Violation::cover(link, ASSUMED_DEPTH_M, MAX_COVER_M));
        }

        let status = if link_violations.is_empty() {
            "OK".to_string()
        } else {
            link_violations.iter().map(|v| v.message.clone()).collect::<Vec<_>>().join(", ")
        };
        violations.extend(link_violations);

        details.push(DesignDetail {
            velocity: Some(params.velocity),
            depth_ratio: Some(params.depth_ratio),
            d: Some(params.depth),
            status,
            ..detail_base
        });
    }

    DesignEvaluation { cost: total_cost + penalty, details, violations }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;

    fn chain_graph() -> Graph {
        let nodes = vec![
            Node { id: 1, x: 0.0, y: 0.0, ground_level: 10.0, flow_lps: 15.0 },
            Node { id: 2, x: 100.0, y: 0.0, ground_level: 9.5, flow_lps: 15.0 },
            Node { id: 3, x: 200.0, y: 0.0, ground_level: 9.0, flow_lps: -30.0 },
        ];
        Graph::build(nodes, &[(1, 2), (2, 3)])
    }

    #[test]
    fn feasible_design_has_no_penalty_component() {
        let g = chain_graph();
        let tree = Tree { edges: g.edges() };
        // diameter index 6 (0.5 m), slope 0.005 for both links.
        let design = [6.0, 0.005, 6.0, 0.005];
        let eval = evaluate(&tree, &g, &design, 0.013);
        assert_eq!(eval.details.len(), 2);
        assert!(eval.violations.is_empty(), "{:?}", eval.violations);
        assert!(eval.cost > 0.0);
    }

    #[test]
    fn progressive_diameter_is_forced_upward() {
        let g = chain_graph();
        let tree = Tree { edges: g.edges() };
        // Upstream link gets a large diameter (index 11 -> 1.0m), downstream
        // link proposes a small one (index 0 -> 0.2m) that must be bumped.
        let design = [11.0, 0.005, 0.0, 0.005];
        let eval = evaluate(&tree, &g, &design, 0.013);
        let downstream = &eval.details[1];
        assert!(downstream.diameter >= 1.0 - 1e-9);
        assert!(eval
            .violations
            .iter()
            .any(|v| v.violation_type == crate::analysis::ViolationType::ProgressiveDiameter));
    }

    #[test]
    fn infeasible_hydraulics_is_penalized_not_fatal() {
        let g = chain_graph();
        let tree = Tree { edges: g.edges() };
        // Huge flow through a tiny pipe with a flat slope: K >= 1/pi.
        let nodes = vec![
            Node { id: 1, x: 0.0, y: 0.0, ground_level: 10.0, flow_lps: 50000.0 },
            Node { id: 2, x: 100.0, y: 0.0, ground_level: 9.5, flow_lps: 0.0 },
            Node { id: 3, x: 200.0, y: 0.0, ground_level: 9.0, flow_lps: -50000.0 },
        ];
        let g2 = Graph::build(nodes, &[(1, 2), (2, 3)]);
        let tree2 = Tree { edges: g2.edges() };
        let design = [0.0, 0.0001, 0.0, 0.0001];
        let eval = evaluate(&tree2, &g2, &design, 0.013);
        assert!(eval.cost >= PENALTY_INFEASIBLE);
        assert_eq!(eval.details[0].status, "Invalid - K >= 1/pi");
    }
}
