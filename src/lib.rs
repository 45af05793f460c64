//! # Least-cost gravity sewer network design
//!
//! Given a set of manholes and candidate trenches, this crate enumerates
//! tree-shaped layouts routing wastewater to a single outlet, sizes each
//! layout's pipes with a metaheuristic search over diameter and slope, and
//! prices the result against piecewise-constant cost tables.
//!
//! ## Pipeline
//!
//! - [`parser`] / [`network`] - load a `Manholes`/`Sections` text file into a
//!   [`graph::Graph`].
//! - [`tree`] - enumerate distinct spanning-tree layouts, seeded by the MST.
//! - [`flow`] - orient a layout toward the outlet and compute per-link and
//!   cumulative discharge.
//! - [`hydraulics`] - solve Manning's equation for a partially full circular
//!   pipe.
//! - [`cost`] - piecewise-constant pipe/manhole/earthwork cost tables.
//! - [`design`] - evaluate one design vector against one layout: cost plus
//!   constraint penalties.
//! - [`optimize`] - PSO/GA/AGA/ACO metaheuristics sharing one
//!   `Optimizer` trait.
//! - [`analysis`] - structured constraint-violation reporting.
//! - [`csv`] - export an evaluated design as a CSV table.
//! - [`project`] - run configuration (layouts, population, algorithm, seed).
//! - [`error`] - the crate's one fallible-boundary error type.

pub mod analysis;
pub mod cost;
pub mod csv;
pub mod design;
pub mod error;
pub mod flow;
pub mod graph;
pub mod hydraulics;
pub mod network;
pub mod node;
pub mod optimize;
pub mod parser;
pub mod project;
pub mod tree;
