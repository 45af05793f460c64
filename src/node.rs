//! Manhole node model
//!
//! A node is a manhole: a point where wastewater enters the network (a
//! positive contribution) or leaves it at the outlet (a single negative
//! contribution). Nodes carry planar coordinates and a ground elevation
//! used only for traceability in the exported design — the cost model's
//! cover-depth penalty uses a fixed assumed depth, not the ground profile
//! (see the Open Questions in SPEC_FULL.md §9).

use serde::{Deserialize, Serialize};

/// A manhole in the candidate sewer network.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// Stable integer identifier, unique within a network.
    pub id: u32,
    /// Planar x coordinate.
    pub x: f64,
    /// Planar y coordinate.
    pub y: f64,
    /// Ground elevation. Carried through for CSV export only.
    pub ground_level: f64,
    /// Wastewater contribution in litres/second. Positive = inflow,
    /// negative = the single outlet sink.
    pub flow_lps: f64,
}

impl Node {
    /// `true` for the distinguished outlet node (negative flow).
    pub fn is_outlet(&self) -> bool {
        self.flow_lps < 0.0
    }

    /// Positive wastewater contribution in m3/s, or 0 for the outlet.
    pub fn contribution_m3s(&self) -> f64 {
        if self.flow_lps > 0.0 {
            self.flow_lps / 1000.0
        } else {
            0.0
        }
    }
}
