//! Top-level network container
//!
//! Bundles the parsed input with the graph built from it, so the rest of
//! the pipeline has one value to pass around instead of nodes/sections/
//! graph separately.

use crate::error::Result;
use crate::graph::Graph;
use crate::node::Node;
use crate::parser::{self, ParsedNetwork};

/// A fully-loaded candidate sewer network: raw nodes plus the graph built
/// from them.
#[derive(Debug, Clone)]
pub struct SewerNetwork {
    pub nodes: Vec<Node>,
    pub graph: Graph,
}

impl SewerNetwork {
    pub fn from_text(contents: &str) -> Result<Self> {
        let ParsedNetwork { nodes, sections } = parser::parse(contents)?;
        let graph = Graph::build(nodes.clone(), &sections);
        Ok(Self { nodes, graph })
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_a_minimal_chain_network() {
        let text = "Manholes 3\n1 0 0 10 10\n2 100 0 9.5 10\n3 200 0 9 -20\nSections 2\n1 2\n2 3\n";
        let network = SewerNetwork::from_text(text).unwrap();
        assert_eq!(network.node_count(), 3);
        assert_eq!(network.graph.outlet, 3);
    }
}
