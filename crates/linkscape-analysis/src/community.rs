//! Asynchronous label propagation on the undirected projection.

use crate::error::{Error, Result};
use linkscape_graph::rng::XorShift64Star;
use linkscape_graph::{CancelToken, Graph};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CommunityOptions {
    /// Seeds both the visiting order and the tie breaks between equally frequent labels.
    pub seed: u64,
    pub max_rounds: usize,
}

impl Default for CommunityOptions {
    fn default() -> Self {
        Self {
            seed: 1,
            max_rounds: 100,
        }
    }
}

/// Disjoint communities covering every node.
///
/// Members are sorted by id; communities by size descending, then by smallest member id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Partition {
    pub communities: Vec<Vec<String>>,
    pub rounds: usize,
    /// `false` when `max_rounds` ran out while labels were still changing.
    pub converged: bool,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.communities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.communities.is_empty()
    }

    /// Index of the community containing `id`.
    pub fn community_of(&self, id: &str) -> Option<usize> {
        self.communities
            .iter()
            .position(|c| c.binary_search_by(|m| m.as_str().cmp(id)).is_ok())
    }
}

pub fn label_propagation(g: &Graph, options: &CommunityOptions) -> Partition {
    // A fresh token is never cancelled.
    match label_propagation_with_cancel(g, options, &CancelToken::new()) {
        Ok(p) => p,
        Err(_) => Partition::default(),
    }
}

pub fn label_propagation_with_cancel(
    g: &Graph,
    options: &CommunityOptions,
    cancel: &CancelToken,
) -> Result<Partition> {
    let n = g.node_count();
    if n == 0 {
        return Ok(Partition {
            communities: Vec::new(),
            rounds: 0,
            converged: true,
        });
    }

    let mut labels: Vec<usize> = (0..n).collect();
    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = XorShift64Star::new(options.seed);
    let mut counts: FxHashMap<usize, usize> = FxHashMap::default();
    let mut best: Vec<usize> = Vec::new();
    let max_rounds = options.max_rounds.max(1);

    let mut rounds = 0;
    let mut converged = false;
    while rounds < max_rounds {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        rounds += 1;
        rng.shuffle(&mut order);

        let mut changed = false;
        for &v in &order {
            let nbrs = g.undirected_neighbors_at(v);
            if nbrs.is_empty() {
                continue;
            }
            counts.clear();
            for &w in nbrs {
                *counts.entry(labels[w]).or_default() += 1;
            }
            let top = counts.values().copied().max().unwrap_or(0);
            if counts.get(&labels[v]) == Some(&top) {
                continue;
            }

            best.clear();
            best.extend(
                counts
                    .iter()
                    .filter(|&(_, &c)| c == top)
                    .map(|(&label, _)| label),
            );
            // Hash order is arbitrary; sort so the seeded pick is reproducible.
            best.sort_unstable();
            labels[v] = best[rng.next_usize(best.len())];
            changed = true;
        }

        if !changed {
            converged = true;
            break;
        }
    }

    let mut groups: FxHashMap<usize, Vec<String>> = FxHashMap::default();
    for (ix, &label) in labels.iter().enumerate() {
        groups
            .entry(label)
            .or_default()
            .push(g.node_id(ix).to_string());
    }
    let mut communities: Vec<Vec<String>> = groups.into_values().collect();
    for members in &mut communities {
        members.sort();
    }
    communities.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a[0].cmp(&b[0])));

    tracing::debug!(
        communities = communities.len(),
        rounds,
        converged,
        "label propagation finished"
    );
    if !converged {
        tracing::warn!(rounds, "label propagation hit the round cap");
    }

    Ok(Partition {
        communities,
        rounds,
        converged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkscape_graph::GraphBuilder;

    fn two_triangles_with_bridge() -> Graph {
        let mut b = GraphBuilder::undirected();
        b.set_path(&["a", "b", "c", "a"]);
        b.set_path(&["x", "y", "z", "x"]);
        b.set_edge("c", "x");
        b.build()
    }

    #[test]
    fn same_seed_same_partition() {
        let g = two_triangles_with_bridge();
        let opts = CommunityOptions {
            seed: 7,
            max_rounds: 100,
        };
        assert_eq!(label_propagation(&g, &opts), label_propagation(&g, &opts));
    }

    #[test]
    fn isolated_nodes_are_singletons() {
        let mut b = GraphBuilder::undirected();
        b.set_node("lonely", None);
        b.set_edge("a", "b");
        let g = b.build();
        let p = label_propagation(&g, &CommunityOptions::default());
        assert_eq!(p.communities[0], vec!["a", "b"]);
        assert_eq!(p.communities[1], vec!["lonely"]);
        assert_eq!(p.community_of("lonely"), Some(1));
    }

    #[test]
    fn cancelled_token_stops_before_the_first_round() {
        let g = two_triangles_with_bridge();
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = label_propagation_with_cancel(&g, &CommunityOptions::default(), &cancel);
        assert!(matches!(err, Err(Error::Cancelled)));
    }
}
