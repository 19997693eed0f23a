//! Traversal helpers shared by the analysis and layout crates.
//!
//! Everything here works on node indices (see [`Graph::node_index`]) and visits neighbours in
//! ascending index order, so results are deterministic for a given graph.

use super::Graph;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Follow edges in both directions (undirected projection).
    Undirected,
    Outgoing,
    Incoming,
}

fn neighbors_in(g: &Graph, ix: usize, dir: Direction) -> &[usize] {
    match dir {
        Direction::Undirected => g.undirected_neighbors_at(ix),
        Direction::Outgoing => g.out_neighbors_at(ix),
        Direction::Incoming => g.in_neighbors_at(ix),
    }
}

/// Connected components of the undirected projection (weak components for directed graphs).
///
/// Components are listed in order of their first node index; members in BFS discovery order.
pub fn components(g: &Graph) -> Vec<Vec<usize>> {
    let n = g.node_count();
    let mut seen = vec![false; n];
    let mut out: Vec<Vec<usize>> = Vec::new();

    for start in 0..n {
        if seen[start] {
            continue;
        }
        seen[start] = true;
        let mut comp: Vec<usize> = Vec::new();
        let mut q: VecDeque<usize> = VecDeque::new();
        q.push_back(start);
        while let Some(v) = q.pop_front() {
            comp.push(v);
            for &w in g.undirected_neighbors_at(v) {
                if !seen[w] {
                    seen[w] = true;
                    q.push_back(w);
                }
            }
        }
        out.push(comp);
    }

    out
}

/// Strongly connected components (Tarjan), iterative so deep chains cannot overflow the stack.
///
/// For undirected graphs this coincides with [`components`].
pub fn strongly_connected_components(g: &Graph) -> Vec<Vec<usize>> {
    const UNVISITED: usize = usize::MAX;

    let n = g.node_count();
    let mut index = vec![UNVISITED; n];
    let mut lowlink = vec![0usize; n];
    let mut on_stack = vec![false; n];
    let mut stack: Vec<usize> = Vec::new();
    let mut sccs: Vec<Vec<usize>> = Vec::new();
    let mut next_index = 0usize;
    // (node, position of the next successor to visit)
    let mut work: Vec<(usize, usize)> = Vec::new();

    for root in 0..n {
        if index[root] != UNVISITED {
            continue;
        }
        index[root] = next_index;
        lowlink[root] = next_index;
        next_index += 1;
        stack.push(root);
        on_stack[root] = true;
        work.push((root, 0));

        while let Some(frame) = work.last_mut() {
            let v = frame.0;
            let succ = g.out_neighbors_at(v);
            if frame.1 < succ.len() {
                let w = succ[frame.1];
                frame.1 += 1;
                if index[w] == UNVISITED {
                    index[w] = next_index;
                    lowlink[w] = next_index;
                    next_index += 1;
                    stack.push(w);
                    on_stack[w] = true;
                    work.push((w, 0));
                } else if on_stack[w] {
                    lowlink[v] = lowlink[v].min(index[w]);
                }
                continue;
            }

            work.pop();
            if let Some(&(parent, _)) = work.last() {
                lowlink[parent] = lowlink[parent].min(lowlink[v]);
            }
            if lowlink[v] == index[v] {
                let mut scc: Vec<usize> = Vec::new();
                while let Some(w) = stack.pop() {
                    on_stack[w] = false;
                    scc.push(w);
                    if w == v {
                        break;
                    }
                }
                sccs.push(scc);
            }
        }
    }

    sccs
}

/// Unweighted shortest-path distances from `source`. `None` marks unreachable nodes.
pub fn bfs_distances(g: &Graph, source: usize, dir: Direction) -> Vec<Option<usize>> {
    bfs_within(g, source, dir, usize::MAX)
}

/// Like [`bfs_distances`] but stops expanding past `radius`.
pub fn bfs_within(g: &Graph, source: usize, dir: Direction, radius: usize) -> Vec<Option<usize>> {
    let mut dist: Vec<Option<usize>> = vec![None; g.node_count()];
    if source >= dist.len() {
        return dist;
    }
    dist[source] = Some(0);
    let mut q: VecDeque<usize> = VecDeque::new();
    q.push_back(source);
    while let Some(v) = q.pop_front() {
        let Some(d) = dist[v] else {
            continue;
        };
        if d >= radius {
            continue;
        }
        for &w in neighbors_in(g, v, dir) {
            if dist[w].is_none() {
                dist[w] = Some(d + 1);
                q.push_back(w);
            }
        }
    }
    dist
}
