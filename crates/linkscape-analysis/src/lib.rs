#![forbid(unsafe_code)]

//! Graph analytics over [`linkscape_graph::Graph`] values.
//!
//! - [`select`]: pure subgraph extraction strategies
//! - [`metrics`]: scalar structural statistics
//! - [`centrality`]: per-node rankings
//! - [`community`]: label-propagation partitions
//!
//! Every function takes the graph by reference and returns a fresh value; nothing here keeps
//! state between calls, so independent analyses can run concurrently on the same subgraph.

pub use linkscape_graph as graph;

pub mod centrality;
pub mod community;
pub mod error;
pub mod metrics;
pub mod select;

pub use centrality::{CentralityKind, CentralityOptions, CentralityResult, EigenvectorOptions};
pub use community::{CommunityOptions, Partition};
pub use error::{Error, Result};
pub use metrics::{ComponentCounts, MetricsSummary};
pub use select::{Advisory, Selected, Selection};
