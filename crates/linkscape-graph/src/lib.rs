#![forbid(unsafe_code)]

//! Immutable graph store for concept/link networks.
//!
//! A [`Graph`] is assembled once (through [`GraphBuilder`] or [`load`]) and is read-only
//! afterwards, so it can be shared across worker threads behind an `Arc` without locking.
//! The analysis and layout crates work on the index-level accessors exposed here.

pub mod cancel;
pub mod error;
pub mod graph;
pub mod node_link;
pub mod rng;

pub use cancel::CancelToken;
pub use error::FormatError;
pub use graph::{Edge, Graph, GraphBuilder, GraphOptions, Node, alg};
pub use node_link::{dump, load};
