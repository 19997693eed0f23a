//! Per-node centrality rankings.
//!
//! The raw score functions return one value per node index. [`rank`] pairs them with ids and sorts
//! by descending score, ties by ascending id.
//!
//! Conventions (matching networkx defaults):
//! - closeness uses the Wasserman-Faust correction and, for directed graphs, incoming distances;
//! - betweenness is normalized over ordered (directed) or unordered (undirected) pairs;
//! - eigenvector runs power iteration on `A + I` with in-edges for directed graphs.

use crate::error::{Error, Result};
use linkscape_graph::alg::{self, Direction};
use linkscape_graph::{CancelToken, Graph};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CentralityKind {
    #[default]
    Degree,
    Closeness,
    Betweenness,
    Eigenvector,
}

impl CentralityKind {
    pub const ALL: [CentralityKind; 4] = [
        CentralityKind::Degree,
        CentralityKind::Closeness,
        CentralityKind::Betweenness,
        CentralityKind::Eigenvector,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CentralityKind::Degree => "degree",
            CentralityKind::Closeness => "closeness",
            CentralityKind::Betweenness => "betweenness",
            CentralityKind::Eigenvector => "eigenvector",
        }
    }
}

impl fmt::Display for CentralityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CentralityKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        CentralityKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown centrality kind: {s}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EigenvectorOptions {
    pub max_iterations: usize,
    /// Per-node tolerance; the iteration stops once `Σ|Δx| < n · tolerance`.
    pub tolerance: f64,
}

impl Default for EigenvectorOptions {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CentralityOptions {
    pub eigenvector: EigenvectorOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CentralityResult {
    pub kind: CentralityKind,
    /// `(id, score)` by descending score, ties by ascending id.
    pub scores: Vec<(String, f64)>,
    /// Always `true` except for an eigenvector run that fell back to zeros.
    pub converged: bool,
}

impl CentralityResult {
    pub fn score(&self, id: &str) -> Option<f64> {
        self.scores.iter().find(|(n, _)| n == id).map(|&(_, s)| s)
    }
}

/// `degree / (n - 1)`; directed graphs count in- plus out-edges.
pub fn degree(g: &Graph) -> Vec<f64> {
    let n = g.node_count();
    if n <= 1 {
        return vec![0.0; n];
    }
    let denom = (n - 1) as f64;
    (0..n).map(|ix| g.degree_at(ix) as f64 / denom).collect()
}

pub fn closeness(g: &Graph, cancel: &CancelToken) -> Result<Vec<f64>> {
    let n = g.node_count();
    let dir = if g.is_directed() {
        Direction::Incoming
    } else {
        Direction::Undirected
    };

    let mut out = vec![0.0; n];
    for (u, score) in out.iter_mut().enumerate() {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let dist = alg::bfs_distances(g, u, dir);
        let (reach, total) = dist
            .iter()
            .flatten()
            .fold((0usize, 0usize), |(r, t), &d| (r + 1, t + d));
        if total > 0 && n > 1 {
            let r1 = (reach - 1) as f64;
            *score = (r1 / total as f64) * (r1 / (n - 1) as f64);
        }
    }
    Ok(out)
}

/// Brandes' algorithm on unweighted shortest paths.
pub fn betweenness(g: &Graph, cancel: &CancelToken) -> Result<Vec<f64>> {
    let n = g.node_count();
    let mut cb = vec![0.0; n];
    if n <= 2 {
        return Ok(cb);
    }

    let mut stack: Vec<usize> = Vec::with_capacity(n);
    let mut preds: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0f64; n];
    let mut dist = vec![usize::MAX; n];
    let mut delta = vec![0.0f64; n];
    let mut queue: VecDeque<usize> = VecDeque::new();

    for s in 0..n {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        stack.clear();
        for p in &mut preds {
            p.clear();
        }
        sigma.fill(0.0);
        dist.fill(usize::MAX);
        delta.fill(0.0);

        sigma[s] = 1.0;
        dist[s] = 0;
        queue.push_back(s);
        while let Some(v) = queue.pop_front() {
            stack.push(v);
            // Undirected graphs store the symmetric adjacency as their out rows.
            for &w in g.out_neighbors_at(v) {
                if dist[w] == usize::MAX {
                    dist[w] = dist[v] + 1;
                    queue.push_back(w);
                }
                if dist[w] == dist[v] + 1 {
                    sigma[w] += sigma[v];
                    preds[w].push(v);
                }
            }
        }

        while let Some(w) = stack.pop() {
            for &v in &preds[w] {
                delta[v] += sigma[v] / sigma[w] * (1.0 + delta[w]);
            }
            if w != s {
                cb[w] += delta[w];
            }
        }
    }

    // Undirected sums visit every pair twice, which the factor 2 of the normalization absorbs.
    let denom = ((n - 1) * (n - 2)) as f64;
    for c in &mut cb {
        *c /= denom;
    }
    Ok(cb)
}

/// Power iteration. Returns `(scores, converged)`; the fallback is all zeros with `false`.
pub fn eigenvector(
    g: &Graph,
    options: &EigenvectorOptions,
    cancel: &CancelToken,
) -> Result<(Vec<f64>, bool)> {
    let n = g.node_count();
    if n == 0 {
        return Ok((Vec::new(), true));
    }
    if g.edge_count() == 0 {
        tracing::warn!(nodes = n, "eigenvector centrality undefined without edges");
        return Ok((vec![0.0; n], false));
    }

    let mut x = vec![1.0 / n as f64; n];
    let mut last = vec![0.0; n];
    for iteration in 0..options.max_iterations {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        last.copy_from_slice(&x);
        for (v, xv) in x.iter_mut().enumerate() {
            for &u in g.in_neighbors_at(v) {
                *xv += last[u];
            }
        }

        let norm = x.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm <= f64::MIN_POSITIVE {
            tracing::warn!(iteration, "eigenvector iterate vanished");
            return Ok((vec![0.0; n], false));
        }
        for v in &mut x {
            *v /= norm;
        }

        let err: f64 = x.iter().zip(&last).map(|(a, b)| (a - b).abs()).sum();
        tracing::trace!(iteration, err, "eigenvector iteration");
        if err < n as f64 * options.tolerance {
            return Ok((x, true));
        }
    }

    tracing::warn!(
        max_iterations = options.max_iterations,
        "eigenvector centrality did not converge"
    );
    Ok((vec![0.0; n], false))
}

fn ranked(g: &Graph, scores: Vec<f64>) -> Vec<(String, f64)> {
    let mut out: Vec<(String, f64)> = scores
        .into_iter()
        .enumerate()
        .map(|(ix, s)| (g.node_id(ix).to_string(), s))
        .collect();
    out.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

pub fn rank(g: &Graph, kind: CentralityKind, cancel: &CancelToken) -> Result<CentralityResult> {
    rank_with(g, kind, &CentralityOptions::default(), cancel)
}

pub fn rank_with(
    g: &Graph,
    kind: CentralityKind,
    options: &CentralityOptions,
    cancel: &CancelToken,
) -> Result<CentralityResult> {
    let (scores, converged) = match kind {
        CentralityKind::Degree => (degree(g), true),
        CentralityKind::Closeness => (closeness(g, cancel)?, true),
        CentralityKind::Betweenness => (betweenness(g, cancel)?, true),
        CentralityKind::Eigenvector => eigenvector(g, &options.eigenvector, cancel)?,
    };
    tracing::debug!(%kind, nodes = scores.len(), converged, "ranked nodes");
    Ok(CentralityResult {
        kind,
        scores: ranked(g, scores),
        converged,
    })
}
