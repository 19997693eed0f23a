//! Scalar structural statistics.

use linkscape_graph::Graph;
use linkscape_graph::alg;
use serde::Serialize;
use std::collections::BTreeMap;

/// Variances below this are treated as zero (assortativity undefined).
const VARIANCE_EPS: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub nodes: usize,
    pub edges: usize,
    pub directed: bool,
    pub density: f64,
    /// `None` when undefined (no edges, or constant degrees on one side).
    pub assortativity: Option<f64>,
    pub average_clustering: f64,
    pub weak_components: usize,
    /// Only reported for directed graphs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strong_components: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComponentCounts {
    pub weak: usize,
    pub strong: Option<usize>,
}

pub fn density(g: &Graph) -> f64 {
    let n = g.node_count() as f64;
    if g.node_count() < 2 {
        return 0.0;
    }
    let m = g.edge_count() as f64;
    if g.is_directed() {
        m / (n * (n - 1.0))
    } else {
        m / (n * (n - 1.0) / 2.0)
    }
}

/// Degree assortativity (Pearson correlation of degrees at either end of an edge).
///
/// Undirected edges contribute both orientations. Directed edges pair the source out-degree with
/// the target in-degree.
pub fn degree_assortativity(g: &Graph) -> Option<f64> {
    let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(g.edge_count() * 2);
    for (v, w) in g.edge_indices() {
        if g.is_directed() {
            pairs.push((
                g.out_neighbors_at(v).len() as f64,
                g.in_neighbors_at(w).len() as f64,
            ));
        } else {
            let dv = g.degree_at(v) as f64;
            let dw = g.degree_at(w) as f64;
            pairs.push((dv, dw));
            pairs.push((dw, dv));
        }
    }
    pearson(&pairs)
}

fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.is_empty() {
        return None;
    }
    let len = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / len;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / len;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for &(x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x / len < VARIANCE_EPS || var_y / len < VARIANCE_EPS {
        return None;
    }
    Some((cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0))
}

fn clustering_at(g: &Graph, ix: usize) -> f64 {
    let nbrs = g.undirected_neighbors_at(ix);
    let k = nbrs.len();
    if k < 2 {
        return 0.0;
    }
    let mut links = 0usize;
    for (i, &a) in nbrs.iter().enumerate() {
        let row = g.undirected_neighbors_at(a);
        for &b in &nbrs[i + 1..] {
            if row.binary_search(&b).is_ok() {
                links += 1;
            }
        }
    }
    (2 * links) as f64 / (k * (k - 1)) as f64
}

/// Local clustering coefficient of every node, in graph order.
pub fn local_clustering(g: &Graph) -> Vec<(&str, f64)> {
    (0..g.node_count())
        .map(|ix| (g.node_id(ix), clustering_at(g, ix)))
        .collect()
}

pub fn average_clustering(g: &Graph) -> f64 {
    let n = g.node_count();
    if n == 0 {
        return 0.0;
    }
    (0..n).map(|ix| clustering_at(g, ix)).sum::<f64>() / n as f64
}

pub fn component_counts(g: &Graph) -> ComponentCounts {
    ComponentCounts {
        weak: alg::components(g).len(),
        strong: g
            .is_directed()
            .then(|| alg::strongly_connected_components(g).len()),
    }
}

/// `(degree, frequency)` pairs in ascending degree.
pub fn degree_histogram(g: &Graph) -> Vec<(usize, usize)> {
    let mut hist: BTreeMap<usize, usize> = BTreeMap::new();
    for ix in 0..g.node_count() {
        *hist.entry(g.degree_at(ix)).or_default() += 1;
    }
    hist.into_iter().collect()
}

pub fn summarize(g: &Graph) -> MetricsSummary {
    let components = component_counts(g);
    let summary = MetricsSummary {
        nodes: g.node_count(),
        edges: g.edge_count(),
        directed: g.is_directed(),
        density: density(g),
        assortativity: degree_assortativity(g),
        average_clustering: average_clustering(g),
        weak_components: components.weak,
        strong_components: components.strong,
    };
    tracing::debug!(?summary, "computed metrics");
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkscape_graph::GraphBuilder;

    #[test]
    fn pearson_rejects_constant_columns() {
        assert_eq!(pearson(&[(1.0, 2.0), (1.0, 3.0)]), None);
        assert_eq!(pearson(&[]), None);
    }

    #[test]
    fn star_is_perfectly_disassortative() {
        let mut b = GraphBuilder::undirected();
        for leaf in ["a", "b", "c", "d"] {
            b.set_edge("hub", leaf);
        }
        let r = degree_assortativity(&b.build()).unwrap_or_default();
        assert!((r + 1.0).abs() < 1e-12, "r = {r}");
    }

    #[test]
    fn histogram_counts_each_degree() {
        let mut b = GraphBuilder::undirected();
        b.set_path(&["a", "b", "c"]);
        b.set_node("d", None);
        assert_eq!(degree_histogram(&b.build()), vec![(0, 1), (1, 2), (2, 1)]);
    }
}
