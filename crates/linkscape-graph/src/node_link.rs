//! Node-link JSON container (the layout written by networkx `node_link_data`).
//!
//! ```json
//! { "directed": true, "multigraph": false,
//!   "nodes": [{ "id": "Rust", "label": "Rust (language)" }],
//!   "links": [{ "source": "Rust", "target": "LLVM", "weight": 1.0 }] }
//! ```
//!
//! `edges` is accepted as an alias of `links`. Node ids may be strings or integers; unknown node
//! and link attributes are ignored.

use crate::error::FormatError;
use crate::graph::{Graph, GraphBuilder, GraphOptions};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct RawGraph {
    #[serde(default)]
    directed: bool,
    #[serde(default)]
    multigraph: bool,
    #[serde(default)]
    nodes: Vec<RawNode>,
    #[serde(default, alias = "edges")]
    links: Vec<RawLink>,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    id: RawId,
    #[serde(default)]
    label: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawLink {
    source: RawId,
    target: RawId,
    #[serde(default)]
    weight: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Signed(v) => v.to_string(),
            RawId::Unsigned(v) => v.to_string(),
        }
    }
}

fn label_text(label: Option<Value>) -> Option<String> {
    match label? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Deserializes a graph container.
pub fn load(bytes: &[u8]) -> Result<Graph, FormatError> {
    let raw: RawGraph = serde_json::from_slice(bytes)?;
    if raw.multigraph {
        return Err(FormatError::Multigraph);
    }

    let mut b = GraphBuilder::new(GraphOptions {
        directed: raw.directed,
    });
    for node in raw.nodes {
        let id = node.id.into_string();
        if b.has_node(&id) {
            return Err(FormatError::DuplicateNode { id });
        }
        b.set_node(id, label_text(node.label));
    }

    for link in raw.links {
        let from = link.source.into_string();
        let to = link.target.into_string();
        if !b.has_node(&from) || !b.has_node(&to) {
            return Err(FormatError::MissingEndpoint { from, to });
        }
        match link.weight {
            Some(w) if !w.is_finite() => return Err(FormatError::InvalidWeight { from, to }),
            Some(w) => b.set_weighted_edge(from, to, w),
            None => b.set_edge(from, to),
        };
    }

    let graph = b.build();
    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        directed = graph.is_directed(),
        "loaded node-link graph"
    );
    Ok(graph)
}

#[derive(Debug, Serialize)]
struct OutGraph<'a> {
    directed: bool,
    multigraph: bool,
    nodes: Vec<OutNode<'a>>,
    links: Vec<OutLink<'a>>,
}

#[derive(Debug, Serialize)]
struct OutNode<'a> {
    id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct OutLink<'a> {
    source: &'a str,
    target: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    weight: Option<f64>,
}

/// Serializes a graph into the same container shape [`load`] reads.
pub fn dump(graph: &Graph) -> Value {
    let out = OutGraph {
        directed: graph.is_directed(),
        multigraph: false,
        nodes: graph
            .nodes()
            .map(|n| OutNode {
                id: n.id,
                label: n.label,
            })
            .collect(),
        links: graph
            .edges()
            .map(|e| OutLink {
                source: e.source,
                target: e.target,
                weight: e.weight,
            })
            .collect(),
    };
    serde_json::to_value(out).unwrap_or(Value::Null)
}
