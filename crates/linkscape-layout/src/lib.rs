#![forbid(unsafe_code)]

//! Headless force-directed 2-D layout for [`linkscape_graph::Graph`].
//!
//! Four solvers share one iteration structure (repulsion, springs, central gravity, damped
//! velocity integration, convergence check) and differ in their repulsion kernel:
//!
//! - `repulsion`: exact all-pairs, fading out past twice the node distance
//! - `barnes_hut`: inverse-square repulsion over a quad tree
//! - `force_atlas2`: degree-weighted linear repulsion over a quad tree
//! - `hierarchical_repulsion`: exact short-range repulsion with nodes pinned to BFS levels
//!
//! A simulation always returns the state it reached: converged, capped, or cancelled.

pub mod config;
pub mod error;
mod forces;
mod hierarchy;
mod quadtree;
pub mod sim;
pub mod state;

pub use config::{
    BarnesHutParams, ForceAtlas2Params, HierarchicalRepulsionParams, InitialPlacement,
    PhysicsConfig, RepulsionParams, SimulationOptions, SolverKind,
};
pub use error::{Error, Result};
pub use sim::{LayoutEngine, Simulation};
pub use state::{Body, LayoutState, LayoutStatus, Point};

/// Headless layout entry point.
pub fn layout(graph: &linkscape_graph::Graph, physics: PhysicsConfig) -> LayoutState {
    LayoutEngine::new(physics, SimulationOptions::default()).run(graph)
}
