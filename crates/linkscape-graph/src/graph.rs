//! Graph container.
//!
//! [`GraphBuilder`] collects nodes and edges; [`GraphBuilder::build`] freezes them into a
//! [`Graph`] with precomputed adjacency rows. A `Graph` is a simple graph: parallel edges collapse
//! into one and self-loops are dropped.

use rustc_hash::FxBuildHasher;

mod adj;
pub mod alg;
mod entries;

use adj::Adjacency;
use entries::{EdgeEntry, NodeEntry};

type HashMap<K, V> = hashbrown::HashMap<K, V, FxBuildHasher>;

#[derive(Debug, Clone, Copy)]
pub struct GraphOptions {
    pub directed: bool,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self { directed: true }
    }
}

/// Borrowed view of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node<'a> {
    pub id: &'a str,
    pub label: Option<&'a str>,
}

/// Borrowed view of an edge. For undirected graphs `source`/`target` keep the orientation the
/// edge was first inserted with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub weight: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct GraphBuilder {
    options: GraphOptions,
    nodes: Vec<NodeEntry>,
    node_index: HashMap<String, usize>,
    edges: Vec<EdgeEntry>,
    edge_index: HashMap<(usize, usize), usize>,
}

impl GraphBuilder {
    pub fn new(options: GraphOptions) -> Self {
        Self {
            options,
            nodes: Vec::new(),
            node_index: HashMap::default(),
            edges: Vec::new(),
            edge_index: HashMap::default(),
        }
    }

    pub fn directed() -> Self {
        Self::new(GraphOptions { directed: true })
    }

    pub fn undirected() -> Self {
        Self::new(GraphOptions { directed: false })
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    /// Inserts a node or replaces the label of an existing one.
    pub fn set_node(&mut self, id: impl Into<String>, label: Option<String>) -> &mut Self {
        let id = id.into();
        if let Some(&idx) = self.node_index.get(&id) {
            self.nodes[idx].label = label;
            return self;
        }
        let idx = self.nodes.len();
        self.nodes.push(NodeEntry {
            id: id.clone(),
            label,
        });
        self.node_index.insert(id, idx);
        self
    }

    fn ensure_node(&mut self, id: String) -> usize {
        if let Some(&idx) = self.node_index.get(&id) {
            return idx;
        }
        let idx = self.nodes.len();
        self.nodes.push(NodeEntry {
            id: id.clone(),
            label: None,
        });
        self.node_index.insert(id, idx);
        idx
    }

    /// Adds an edge, creating missing endpoints without labels.
    pub fn set_edge(&mut self, v: impl Into<String>, w: impl Into<String>) -> &mut Self {
        self.set_edge_inner(v.into(), w.into(), None)
    }

    pub fn set_weighted_edge(
        &mut self,
        v: impl Into<String>,
        w: impl Into<String>,
        weight: f64,
    ) -> &mut Self {
        self.set_edge_inner(v.into(), w.into(), Some(weight))
    }

    pub fn set_path(&mut self, nodes: &[&str]) -> &mut Self {
        for pair in nodes.windows(2) {
            self.set_edge(pair[0], pair[1]);
        }
        self
    }

    fn set_edge_inner(&mut self, v: String, w: String, weight: Option<f64>) -> &mut Self {
        let v_ix = self.ensure_node(v);
        let w_ix = self.ensure_node(w);
        if v_ix == w_ix {
            tracing::trace!(node = %self.nodes[v_ix].id, "dropping self-loop");
            return self;
        }

        let key = if self.options.directed || v_ix < w_ix {
            (v_ix, w_ix)
        } else {
            (w_ix, v_ix)
        };
        if let Some(&idx) = self.edge_index.get(&key) {
            if weight.is_some() {
                self.edges[idx].weight = weight;
            }
            return self;
        }

        let idx = self.edges.len();
        self.edges.push(EdgeEntry { v_ix, w_ix, weight });
        self.edge_index.insert(key, idx);
        self
    }

    pub fn build(self) -> Graph {
        Graph::from_parts(self.options, self.nodes, self.node_index, self.edges)
    }
}

/// Immutable simple graph.
#[derive(Debug, Clone)]
pub struct Graph {
    options: GraphOptions,
    nodes: Vec<NodeEntry>,
    node_index: HashMap<String, usize>,
    edges: Vec<EdgeEntry>,
    out_adj: Adjacency,
    in_adj: Adjacency,
    undirected_adj: Adjacency,
}

impl Graph {
    fn from_parts(
        options: GraphOptions,
        nodes: Vec<NodeEntry>,
        node_index: HashMap<String, usize>,
        edges: Vec<EdgeEntry>,
    ) -> Self {
        let n = nodes.len();
        let undirected_adj = Adjacency::from_pairs(
            n,
            edges
                .iter()
                .flat_map(|e| [(e.v_ix, e.w_ix), (e.w_ix, e.v_ix)]),
        );
        let (out_adj, in_adj) = if options.directed {
            (
                Adjacency::from_pairs(n, edges.iter().map(|e| (e.v_ix, e.w_ix))),
                Adjacency::from_pairs(n, edges.iter().map(|e| (e.w_ix, e.v_ix))),
            )
        } else {
            (undirected_adj.clone(), undirected_adj.clone())
        };

        Self {
            options,
            nodes,
            node_index,
            edges,
            out_adj,
            in_adj,
            undirected_adj,
        }
    }

    pub fn empty(options: GraphOptions) -> Self {
        GraphBuilder::new(options).build()
    }

    pub fn options(&self) -> GraphOptions {
        self.options
    }

    pub fn is_directed(&self) -> bool {
        self.options.directed
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn has_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<Node<'_>> {
        self.node_index.get(id).map(|&ix| self.node_at(ix))
    }

    pub fn nodes(&self) -> impl Iterator<Item = Node<'_>> {
        (0..self.nodes.len()).map(|ix| self.node_at(ix))
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id.as_str())
    }

    pub fn edges(&self) -> impl Iterator<Item = Edge<'_>> {
        self.edges.iter().map(|e| Edge {
            source: self.nodes[e.v_ix].id.as_str(),
            target: self.nodes[e.w_ix].id.as_str(),
            weight: e.weight,
        })
    }

    pub fn has_edge(&self, v: &str, w: &str) -> bool {
        let (Some(&v_ix), Some(&w_ix)) = (self.node_index.get(v), self.node_index.get(w)) else {
            return false;
        };
        self.out_adj.contains(v_ix, w_ix)
    }

    /// Total degree: `in + out` for directed graphs, neighbour count for undirected ones.
    pub fn degree(&self, id: &str) -> Option<usize> {
        self.node_index.get(id).map(|&ix| self.degree_at(ix))
    }

    pub fn in_degree(&self, id: &str) -> Option<usize> {
        self.node_index.get(id).map(|&ix| self.in_adj.row(ix).len())
    }

    pub fn out_degree(&self, id: &str) -> Option<usize> {
        self.node_index.get(id).map(|&ix| self.out_adj.row(ix).len())
    }

    /// Neighbours in the undirected projection (direction ignored, deduplicated).
    pub fn neighbors(&self, id: &str) -> Vec<&str> {
        self.ids_of(id, &self.undirected_adj)
    }

    pub fn successors(&self, id: &str) -> Vec<&str> {
        self.ids_of(id, &self.out_adj)
    }

    pub fn predecessors(&self, id: &str) -> Vec<&str> {
        self.ids_of(id, &self.in_adj)
    }

    fn ids_of<'a>(&'a self, id: &str, adj: &'a Adjacency) -> Vec<&'a str> {
        let Some(&ix) = self.node_index.get(id) else {
            return Vec::new();
        };
        adj.row(ix)
            .iter()
            .map(|&w| self.nodes[w].id.as_str())
            .collect()
    }

    /// Induced subgraph over `ids`. Unknown ids are ignored; node order follows `self`.
    pub fn induce<I, S>(&self, ids: I) -> Graph
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keep = vec![false; self.nodes.len()];
        for id in ids {
            if let Some(&ix) = self.node_index.get(id.as_ref()) {
                keep[ix] = true;
            }
        }
        self.induce_mask(&keep)
    }

    /// Induced subgraph over node indices of `self`.
    pub fn induce_indices(&self, ixs: impl IntoIterator<Item = usize>) -> Graph {
        let mut keep = vec![false; self.nodes.len()];
        for ix in ixs {
            if let Some(slot) = keep.get_mut(ix) {
                *slot = true;
            }
        }
        self.induce_mask(&keep)
    }

    fn induce_mask(&self, keep: &[bool]) -> Graph {
        let mut b = GraphBuilder::new(self.options);
        for (ix, n) in self.nodes.iter().enumerate() {
            if keep[ix] {
                b.set_node(n.id.clone(), n.label.clone());
            }
        }
        for e in &self.edges {
            if keep[e.v_ix] && keep[e.w_ix] {
                b.set_edge_inner(
                    self.nodes[e.v_ix].id.clone(),
                    self.nodes[e.w_ix].id.clone(),
                    e.weight,
                );
            }
        }
        b.build()
    }

    // Index-level accessors. Indices are dense in `0..node_count()` and follow insertion order.

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.node_index.get(id).copied()
    }

    pub fn node_id(&self, ix: usize) -> &str {
        self.nodes[ix].id.as_str()
    }

    pub fn node_label(&self, ix: usize) -> Option<&str> {
        self.nodes[ix].label.as_deref()
    }

    fn node_at(&self, ix: usize) -> Node<'_> {
        let n = &self.nodes[ix];
        Node {
            id: n.id.as_str(),
            label: n.label.as_deref(),
        }
    }

    pub fn degree_at(&self, ix: usize) -> usize {
        if self.options.directed {
            self.out_adj.row(ix).len() + self.in_adj.row(ix).len()
        } else {
            self.undirected_adj.row(ix).len()
        }
    }

    pub fn out_neighbors_at(&self, ix: usize) -> &[usize] {
        self.out_adj.row(ix)
    }

    pub fn in_neighbors_at(&self, ix: usize) -> &[usize] {
        self.in_adj.row(ix)
    }

    pub fn undirected_neighbors_at(&self, ix: usize) -> &[usize] {
        self.undirected_adj.row(ix)
    }

    pub fn has_edge_at(&self, v_ix: usize, w_ix: usize) -> bool {
        self.out_adj.contains(v_ix, w_ix)
    }

    /// `(source, target)` index pairs, one per stored edge.
    pub fn edge_indices(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.edges.iter().map(|e| (e.v_ix, e.w_ix))
    }

    /// Node indices sorted by ascending id (the deterministic tie-break order).
    pub fn indices_by_id(&self) -> Vec<usize> {
        let mut ixs: Vec<usize> = (0..self.nodes.len()).collect();
        ixs.sort_by(|&a, &b| self.nodes[a].id.cmp(&self.nodes[b].id));
        ixs
    }
}

#[cfg(test)]
mod tests {
    use super::{GraphBuilder, GraphOptions};

    #[test]
    fn parallel_edges_collapse_and_keep_the_latest_weight() {
        let mut b = GraphBuilder::directed();
        b.set_edge("a", "b");
        b.set_weighted_edge("a", "b", 2.5);
        b.set_edge("a", "b");
        let g = b.build();
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.edges().next().and_then(|e| e.weight), Some(2.5));
    }

    #[test]
    fn undirected_reverse_edge_is_the_same_edge() {
        let mut b = GraphBuilder::undirected();
        b.set_edge("a", "b");
        b.set_edge("b", "a");
        let g = b.build();
        assert_eq!(g.edge_count(), 1);
        assert!(g.has_edge("b", "a"));
    }

    #[test]
    fn self_loops_are_dropped_but_the_node_exists() {
        let mut b = GraphBuilder::new(GraphOptions::default());
        b.set_edge("a", "a");
        let g = b.build();
        assert_eq!(g.node_count(), 1);
        assert_eq!(g.edge_count(), 0);
        assert_eq!(g.degree("a"), Some(0));
    }

    #[test]
    fn set_node_replaces_the_label() {
        let mut b = GraphBuilder::undirected();
        b.set_node("a", None);
        b.set_node("a", Some("Alpha".to_string()));
        let g = b.build();
        assert_eq!(g.node_count(), 1);
        assert_eq!(g.node("a").and_then(|n| n.label), Some("Alpha"));
    }

    #[test]
    fn indices_by_id_sorts_bytewise() {
        let mut b = GraphBuilder::undirected();
        for id in ["b", "10", "a", "9"] {
            b.set_node(id, None);
        }
        let g = b.build();
        let ids: Vec<&str> = g.indices_by_id().into_iter().map(|ix| g.node_id(ix)).collect();
        assert_eq!(ids, vec!["10", "9", "a", "b"]);
    }
}
