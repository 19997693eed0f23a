//! Barnes-Hut quad tree. Cells carry the summed mass of their bodies and its weighted center.

use crate::state::Point;

/// Coincident bodies stop subdividing here and share a bucket leaf.
const MAX_DEPTH: usize = 24;

#[derive(Debug, Clone)]
struct Cell {
    origin: Point,
    size: f64,
    mass: f64,
    center_of_mass: Point,
    kind: CellKind,
}

impl Cell {
    fn contains(&self, p: Point) -> bool {
        p.x >= self.origin.x
            && p.x < self.origin.x + self.size
            && p.y >= self.origin.y
            && p.y < self.origin.y + self.size
    }
}

#[derive(Debug, Clone)]
enum CellKind {
    Leaf(Vec<usize>),
    Branch([usize; 4]),
}

#[derive(Debug, Clone)]
pub(crate) struct QuadTree {
    cells: Vec<Cell>,
}

impl QuadTree {
    pub(crate) fn build(points: &[Point], masses: &[f64]) -> Self {
        let mut tree = QuadTree {
            cells: Vec::with_capacity(points.len() * 2),
        };
        if points.is_empty() {
            return tree;
        }

        let (mut lo, mut hi) = (points[0], points[0]);
        for p in points {
            lo = Point::new(lo.x.min(p.x), lo.y.min(p.y));
            hi = Point::new(hi.x.max(p.x), hi.y.max(p.y));
        }
        // Square root cell, padded so bodies on the border fall strictly inside.
        let size = (hi.x - lo.x).max(hi.y - lo.y) + 1.0;
        let center = Point::new((lo.x + hi.x) / 2.0, (lo.y + hi.y) / 2.0);
        let origin = Point::new(center.x - size / 2.0, center.y - size / 2.0);

        let bodies: Vec<usize> = (0..points.len()).collect();
        tree.insert(points, masses, bodies, origin, size, 0);
        tree
    }

    fn insert(
        &mut self,
        points: &[Point],
        masses: &[f64],
        bodies: Vec<usize>,
        origin: Point,
        size: f64,
        depth: usize,
    ) -> usize {
        let mass: f64 = bodies.iter().map(|&b| masses[b]).sum();
        let moment = bodies
            .iter()
            .fold(Point::ZERO, |acc, &b| acc + points[b] * masses[b]);
        let center_of_mass = if mass > 0.0 {
            moment * (1.0 / mass)
        } else {
            Point::ZERO
        };

        let ix = self.cells.len();
        self.cells.push(Cell {
            origin,
            size,
            mass,
            center_of_mass,
            kind: CellKind::Leaf(Vec::new()),
        });

        if bodies.len() <= 1 || depth >= MAX_DEPTH {
            self.cells[ix].kind = CellKind::Leaf(bodies);
            return ix;
        }

        let half = size / 2.0;
        let mut quadrants: [Vec<usize>; 4] = Default::default();
        for b in bodies {
            let p = points[b];
            let east = usize::from(p.x >= origin.x + half);
            let south = usize::from(p.y >= origin.y + half);
            quadrants[south * 2 + east].push(b);
        }

        let mut children = [0usize; 4];
        for (q, members) in quadrants.into_iter().enumerate() {
            let child_origin = Point::new(
                origin.x + half * (q % 2) as f64,
                origin.y + half * (q / 2) as f64,
            );
            children[q] = self.insert(points, masses, members, child_origin, half, depth + 1);
        }
        self.cells[ix].kind = CellKind::Branch(children);
        ix
    }

    /// Calls `f(delta, mass, other)` for every interaction of `body`, where `delta` points from the
    /// body to the other body (or to a cell's center of mass, with `other == None`). `points` and
    /// `masses` must be the slices the tree was built from.
    ///
    /// A branch not containing the body is aggregated when `size / distance < theta`; leaves
    /// always interact body by body.
    pub(crate) fn for_each_interaction(
        &self,
        points: &[Point],
        masses: &[f64],
        body: usize,
        theta: f64,
        mut f: impl FnMut(Point, f64, Option<usize>),
    ) {
        if self.cells.is_empty() {
            return;
        }
        let at = points[body];
        let mut stack: Vec<usize> = vec![0];
        while let Some(ix) = stack.pop() {
            let cell = &self.cells[ix];
            if cell.mass == 0.0 {
                continue;
            }
            match &cell.kind {
                CellKind::Leaf(bodies) => {
                    for &other in bodies {
                        if other != body {
                            f(points[other] - at, masses[other], Some(other));
                        }
                    }
                }
                CellKind::Branch(children) => {
                    let delta = cell.center_of_mass - at;
                    let distance = delta.length();
                    if !cell.contains(at) && distance > 0.0 && cell.size / distance < theta {
                        f(delta, cell.mass, None);
                    } else {
                        stack.extend(children.iter().copied());
                    }
                }
            }
        }
    }

    #[cfg(test)]
    fn root_mass(&self) -> f64 {
        self.cells.first().map_or(0.0, |c| c.mass)
    }
}
