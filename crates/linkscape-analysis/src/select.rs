//! Subgraph extraction.
//!
//! Each strategy is a pure `&Graph -> Graph` function returning an induced subgraph of its input.

use crate::community::{self, CommunityOptions};
use crate::error::{Error, Result};
use linkscape_graph::alg::{self, Direction};
use linkscape_graph::Graph;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// A selection strategy, serializable so front ends can drive it from JSON or YAML.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selection {
    #[default]
    Full,
    LargestComponent,
    TopByDegree {
        k: usize,
    },
    Keywords {
        keywords: Vec<String>,
    },
    Neighborhood {
        seed: String,
        #[serde(default = "default_radius")]
        radius: usize,
    },
    Community {
        #[serde(default)]
        index: usize,
        #[serde(default)]
        options: CommunityOptions,
    },
}

fn default_radius() -> usize {
    1
}

/// Non-fatal notice attached to a selection result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    SeedNotFound { seed: String },
}

#[derive(Debug, Clone)]
pub struct Selected {
    pub graph: Graph,
    pub advisory: Option<Advisory>,
}

pub fn full(g: &Graph) -> Graph {
    g.clone()
}

/// The largest weakly connected component. Equal sizes resolve to the component holding the
/// lowest node id.
pub fn largest_component(g: &Graph) -> Graph {
    let best = alg::components(g)
        .into_iter()
        .map(|comp| {
            let min_id = comp.iter().map(|&ix| g.node_id(ix)).min().unwrap_or_default();
            (comp.len(), Reverse(min_id.to_string()), comp)
        })
        .max_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));

    match best {
        Some((_, _, comp)) => g.induce_indices(comp),
        None => Graph::empty(g.options()),
    }
}

/// The `k` highest-degree nodes (ties by ascending id) and the edges among them.
pub fn top_by_degree(g: &Graph, k: usize) -> Graph {
    let mut ixs = g.indices_by_id();
    // Stable: equal degrees keep ascending id order.
    ixs.sort_by_key(|&ix| Reverse(g.degree_at(ix)));
    ixs.truncate(k);
    g.induce_indices(ixs)
}

/// Nodes whose label (or id when unlabeled) contains any keyword, ignoring case.
pub fn keyword_filter<S: AsRef<str>>(g: &Graph, keywords: &[S]) -> Graph {
    let needles: Vec<String> = keywords
        .iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();
    if needles.is_empty() {
        return Graph::empty(g.options());
    }

    let hits = (0..g.node_count()).filter(|&ix| {
        let hay = g.node_label(ix).unwrap_or_else(|| g.node_id(ix)).to_lowercase();
        needles.iter().any(|n| hay.contains(n.as_str()))
    });
    g.induce_indices(hits.collect::<Vec<_>>())
}

/// Nodes within `radius` hops of `seed`, ignoring edge direction.
pub fn neighborhood(g: &Graph, seed: &str, radius: usize) -> Result<Graph> {
    let source = g.node_index(seed).ok_or_else(|| Error::NotFound {
        id: seed.to_string(),
    })?;
    let dist = alg::bfs_within(g, source, Direction::Undirected, radius);
    let reached: Vec<usize> = dist
        .iter()
        .enumerate()
        .filter_map(|(ix, d)| d.map(|_| ix))
        .collect();
    Ok(g.induce_indices(reached))
}

/// Community `index` of a label-propagation partition (0 is the largest).
pub fn detected_community(g: &Graph, index: usize, options: &CommunityOptions) -> Graph {
    let partition = community::label_propagation(g, options);
    match partition.communities.get(index) {
        Some(members) => g.induce(members),
        None => Graph::empty(g.options()),
    }
}

/// Applies `selection`, turning a missing neighborhood seed into an empty graph plus advisory.
pub fn select(g: &Graph, selection: &Selection) -> Selected {
    let graph = match selection {
        Selection::Full => full(g),
        Selection::LargestComponent => largest_component(g),
        Selection::TopByDegree { k } => top_by_degree(g, *k),
        Selection::Keywords { keywords } => keyword_filter(g, keywords),
        Selection::Neighborhood { seed, radius } => match neighborhood(g, seed, *radius) {
            Ok(sub) => sub,
            Err(err) => {
                tracing::debug!(%err, "neighborhood seed missing; selecting nothing");
                return Selected {
                    graph: Graph::empty(g.options()),
                    advisory: Some(Advisory::SeedNotFound { seed: seed.clone() }),
                };
            }
        },
        Selection::Community { index, options } => detected_community(g, *index, options),
    };

    tracing::debug!(
        ?selection,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "selected subgraph"
    );
    Selected {
        graph,
        advisory: None,
    }
}
