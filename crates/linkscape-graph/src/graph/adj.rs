//! Compressed adjacency rows used by [`Graph`](super::Graph).
//!
//! Rows are sorted and deduplicated, which lets `has_edge` binary-search and keeps every traversal
//! deterministic.

#[derive(Debug, Clone, Default)]
pub(in crate::graph) struct Adjacency {
    offsets: Vec<usize>,
    targets: Vec<usize>,
}

impl Adjacency {
    pub(in crate::graph) fn from_pairs(
        node_count: usize,
        pairs: impl IntoIterator<Item = (usize, usize)>,
    ) -> Self {
        let mut rows: Vec<Vec<usize>> = vec![Vec::new(); node_count];
        for (v, w) in pairs {
            rows[v].push(w);
        }

        let mut offsets: Vec<usize> = Vec::with_capacity(node_count + 1);
        let mut targets: Vec<usize> = Vec::new();
        offsets.push(0);
        for mut row in rows {
            row.sort_unstable();
            row.dedup();
            targets.extend_from_slice(&row);
            offsets.push(targets.len());
        }

        Self { offsets, targets }
    }

    pub(in crate::graph) fn row(&self, v_ix: usize) -> &[usize] {
        let start = self.offsets[v_ix];
        let end = self.offsets[v_ix + 1];
        &self.targets[start..end]
    }

    pub(in crate::graph) fn contains(&self, v_ix: usize, w_ix: usize) -> bool {
        self.row(v_ix).binary_search(&w_ix).is_ok()
    }
}
