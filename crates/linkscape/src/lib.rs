#![forbid(unsafe_code)]

//! `linkscape` analyses concept/link networks and lays them out with force-directed physics.
//!
//! Load a node-link JSON document into a [`Session`], then [`Session::apply`] a
//! [`SessionConfig`]: the session selects a subgraph and computes metrics, a centrality ranking,
//! communities and a layout concurrently. Applying a newer configuration cancels the older one;
//! [`Session::snapshot`] only ever reports results of the latest configuration.
//!
//! The building blocks are re-exported for direct, single-threaded use:
//! - [`graph`]: the immutable graph store and node-link codec
//! - [`analysis`]: subgraph selection, metrics, centrality, communities
//! - [`layout`]: the layout engine and its four solvers

pub use linkscape_analysis as analysis;
pub use linkscape_graph as graph;
pub use linkscape_layout as layout;

pub mod config;
pub mod error;
pub mod jobs;
pub mod session;

pub use config::SessionConfig;
pub use error::{Error, Result};
pub use session::{Pending, Session, Snapshot, SubgraphSummary};
