//! Level assignment for the hierarchical solver.
//!
//! One root per weakly connected component: the node with the lowest in-degree for directed graphs,
//! the highest degree for undirected graphs, ties to the lowest id. Levels are BFS distances from
//! that root over the undirected projection, so cycles and back edges cannot loop.

use linkscape_graph::Graph;
use linkscape_graph::alg::{self, Direction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Levels {
    /// Level of every node index.
    pub(crate) level: Vec<usize>,
    /// Node indices per level, in component order then BFS discovery order.
    pub(crate) rows: Vec<Vec<usize>>,
}

fn pick_root(g: &Graph, component: &[usize]) -> usize {
    let key = |ix: usize| {
        let rank = if g.is_directed() {
            g.in_neighbors_at(ix).len() as i64
        } else {
            -(g.degree_at(ix) as i64)
        };
        (rank, g.node_id(ix))
    };
    component
        .iter()
        .copied()
        .min_by(|&a, &b| key(a).cmp(&key(b)))
        .unwrap_or_default()
}

pub(crate) fn assign_levels(g: &Graph) -> Levels {
    let n = g.node_count();
    let mut level = vec![0usize; n];
    let mut rows: Vec<Vec<usize>> = Vec::new();

    for component in alg::components(g) {
        let root = pick_root(g, &component);
        let dist = alg::bfs_distances(g, root, Direction::Undirected);
        let mut order: Vec<(usize, usize)> = component
            .iter()
            .map(|&ix| (dist[ix].unwrap_or_default(), ix))
            .collect();
        // Stable: keeps BFS discovery order inside a level.
        order.sort_by_key(|&(d, _)| d);

        for (d, ix) in order {
            level[ix] = d;
            if rows.len() <= d {
                rows.resize_with(d + 1, Vec::new);
            }
            rows[d].push(ix);
        }
    }

    tracing::trace!(levels = rows.len(), "assigned hierarchy levels");
    Levels { level, rows }
}

#[cfg(test)]
mod tests {
    use super::assign_levels;
    use linkscape_graph::GraphBuilder;

    #[test]
    fn directed_root_is_a_source() {
        let mut b = GraphBuilder::directed();
        b.set_edge("mid", "leaf");
        b.set_edge("top", "mid");
        b.set_edge("top", "other");
        let g = b.build();
        let levels = assign_levels(&g);
        let level_of = |id: &str| g.node_index(id).map(|ix| levels.level[ix]);
        assert_eq!(level_of("top"), Some(0));
        assert_eq!(level_of("mid"), Some(1));
        assert_eq!(level_of("other"), Some(1));
        assert_eq!(level_of("leaf"), Some(2));
    }

    #[test]
    fn cycle_root_ties_break_on_id() {
        let mut b = GraphBuilder::directed();
        b.set_path(&["c", "a", "b", "c"]);
        let g = b.build();
        let levels = assign_levels(&g);
        assert_eq!(levels.rows[0].len(), 1);
        assert_eq!(g.node_id(levels.rows[0][0]), "a");
        assert_eq!(levels.rows[1].len(), 2);
    }

    #[test]
    fn undirected_root_is_the_hub_of_each_component() {
        let mut b = GraphBuilder::undirected();
        b.set_edge("hub", "a");
        b.set_edge("hub", "b");
        b.set_edge("x", "y");
        let g = b.build();
        let levels = assign_levels(&g);
        let roots: Vec<&str> = levels.rows[0].iter().map(|&ix| g.node_id(ix)).collect();
        assert_eq!(roots, vec!["hub", "x"]);
        assert_eq!(levels.rows[1].len(), 3);
    }
}
