//! Force kernels. All of them add into a per-node force buffer; integration treats every node as
//! unit inertia, while `masses` weight the ForceAtlas2 repulsion and gravity.
//!
//! Formulas follow the vis.js physics solvers: a fading linear repulsion, a short-range quadratic
//! hierarchical repulsion, inverse-square Barnes-Hut gravity and the degree-weighted ForceAtlas2
//! variant, plus Hooke springs and central gravity.

use crate::config::{
    DEFAULT_MAX_VELOCITY, DEFAULT_MIN_VELOCITY, DEFAULT_TIMESTEP, PhysicsConfig,
};
use crate::quadtree::QuadTree;
use crate::state::Point;
use linkscape_graph::rng::XorShift64Star;

/// Opening criterion for the ForceAtlas2 solver.
const FORCE_ATLAS2_THETA: f64 = 0.5;
/// Replacement distance for coincident bodies.
const MIN_DISTANCE: f64 = 0.1;
const HIERARCHICAL_STEEPNESS: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Repulsion {
    Fading {
        node_distance: f64,
    },
    Hierarchical {
        node_distance: f64,
    },
    BarnesHut {
        theta: f64,
        gravitational_constant: f64,
        avoid_overlap: f64,
    },
    ForceAtlas2 {
        gravitational_constant: f64,
        avoid_overlap: f64,
    },
}

/// A [`PhysicsConfig`] flattened into the numbers the integrator needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Resolved {
    pub(crate) repulsion: Repulsion,
    pub(crate) spring_length: f64,
    pub(crate) spring_constant: f64,
    pub(crate) central_gravity: f64,
    pub(crate) damping: f64,
    pub(crate) min_velocity: f64,
    pub(crate) max_velocity: f64,
    pub(crate) timestep: f64,
    pub(crate) wind: Point,
    /// Nodes keep their row (hierarchical solver).
    pub(crate) x_only: bool,
}

impl From<&PhysicsConfig> for Resolved {
    fn from(config: &PhysicsConfig) -> Self {
        let base = |repulsion, spring_length, spring_constant, central_gravity, damping| Resolved {
            repulsion,
            spring_length,
            spring_constant,
            central_gravity,
            damping,
            min_velocity: DEFAULT_MIN_VELOCITY,
            max_velocity: DEFAULT_MAX_VELOCITY,
            timestep: DEFAULT_TIMESTEP,
            wind: Point::ZERO,
            x_only: false,
        };
        match *config {
            PhysicsConfig::Repulsion(p) => Resolved {
                min_velocity: p.min_velocity,
                max_velocity: p.max_velocity,
                timestep: p.timestep,
                wind: Point::new(p.wind_x, p.wind_y),
                ..base(
                    Repulsion::Fading {
                        node_distance: p.node_distance,
                    },
                    p.spring_length,
                    p.spring_constant,
                    p.central_gravity,
                    p.damping,
                )
            },
            PhysicsConfig::BarnesHut(p) => base(
                Repulsion::BarnesHut {
                    theta: p.theta,
                    gravitational_constant: p.gravitational_constant,
                    avoid_overlap: p.avoid_overlap,
                },
                p.spring_length,
                p.spring_constant,
                p.central_gravity,
                p.damping,
            ),
            PhysicsConfig::ForceAtlas2(p) => base(
                Repulsion::ForceAtlas2 {
                    gravitational_constant: p.gravitational_constant,
                    avoid_overlap: p.avoid_overlap,
                },
                p.spring_length,
                p.spring_constant,
                p.central_gravity,
                p.damping,
            ),
            PhysicsConfig::HierarchicalRepulsion(p) => Resolved {
                x_only: true,
                ..base(
                    Repulsion::Hierarchical {
                        node_distance: p.node_distance,
                    },
                    p.spring_length,
                    p.spring_constant,
                    p.central_gravity,
                    p.damping,
                )
            },
        }
    }
}

/// Inputs shared by every kernel for one iteration.
pub(crate) struct Bodies<'a> {
    pub(crate) positions: &'a [Point],
    /// `degree + 1` per node for ForceAtlas2, 1 for every other solver.
    pub(crate) masses: &'a [f64],
    pub(crate) edges: &'a [(usize, usize)],
    pub(crate) node_radius: f64,
}

pub(crate) fn accumulate(
    physics: &Resolved,
    bodies: &Bodies<'_>,
    rng: &mut XorShift64Star,
    forces: &mut [Point],
) {
    forces.fill(Point::ZERO);
    match physics.repulsion {
        Repulsion::Fading { node_distance } => {
            pairwise(bodies.positions, rng, forces, |d| fading(d, node_distance))
        }
        Repulsion::Hierarchical { node_distance } => {
            pairwise(bodies.positions, rng, forces, |d| hierarchical(d, node_distance))
        }
        Repulsion::BarnesHut {
            theta,
            gravitational_constant,
            avoid_overlap,
        } => {
            barnes_hut(bodies, forces, theta, |d, mass, body| {
                let d = shrink(d, avoid_overlap, bodies.node_radius);
                gravitational_constant * mass * bodies.masses[body] / (d * d * d)
            });
            cancel_net_force(forces);
        }
        Repulsion::ForceAtlas2 {
            gravitational_constant,
            avoid_overlap,
        } => {
            barnes_hut(bodies, forces, FORCE_ATLAS2_THETA, |d, mass, body| {
                let d = shrink(d, avoid_overlap, bodies.node_radius);
                gravitational_constant * mass * bodies.masses[body] / (d * d)
            });
            cancel_net_force(forces);
        }
    }
    springs(physics, bodies, forces);
    central_gravity(physics, bodies, forces);
}

/// Scalar factor along the separation vector for the vis.js repulsion solver.
fn fading(d: f64, node_distance: f64) -> f64 {
    if d >= 2.0 * node_distance {
        return 0.0;
    }
    let magnitude = if d < 0.5 * node_distance {
        1.0
    } else {
        (-2.0 / (3.0 * node_distance)) * d + 4.0 / 3.0
    };
    magnitude / d
}

fn hierarchical(d: f64, node_distance: f64) -> f64 {
    if d >= node_distance {
        return 0.0;
    }
    let s = HIERARCHICAL_STEEPNESS;
    ((s * node_distance).powi(2) - (s * d).powi(2)) / d
}

/// Effective distance under `avoid_overlap`: discs of radius `r` repel as if closer.
fn shrink(d: f64, avoid_overlap: f64, r: f64) -> f64 {
    if avoid_overlap <= 0.0 {
        return d;
    }
    (d - avoid_overlap * 2.0 * r).max(MIN_DISTANCE + avoid_overlap * r)
}

/// Exact all-pairs repulsion; `factor(d)` scales the separation vector pushing the pair apart.
fn pairwise(
    positions: &[Point],
    rng: &mut XorShift64Star,
    forces: &mut [Point],
    factor: impl Fn(f64) -> f64,
) {
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            let mut delta = positions[j] - positions[i];
            let mut d = delta.length();
            if d == 0.0 {
                d = MIN_DISTANCE * (0.5 + rng.next_f64_unit());
                delta = Point::new(d, 0.0);
            }
            let push = delta * factor(d);
            forces[i] = forces[i] - push;
            forces[j] += push;
        }
    }
}

/// Quad-tree repulsion. `factor(d, mass, body)` scales the vector from `body` toward the other
/// mass; negative factors repel.
fn barnes_hut(
    bodies: &Bodies<'_>,
    forces: &mut [Point],
    theta: f64,
    factor: impl Fn(f64, f64, usize) -> f64,
) {
    let tree = QuadTree::build(bodies.positions, bodies.masses);
    for (body, force) in forces.iter_mut().enumerate() {
        let (positions, masses) = (bodies.positions, bodies.masses);
        tree.for_each_interaction(positions, masses, body, theta, |delta, mass, other| {
            let (delta, d) = match delta.length() {
                d if d > 0.0 => (delta, d),
                // Coincident: separate along x, ordered by index so the pair splits.
                _ => {
                    let sign = if other.is_some_and(|o| o < body) { -1.0 } else { 1.0 };
                    (Point::new(sign * MIN_DISTANCE, 0.0), MIN_DISTANCE)
                }
            };
            *force += delta * factor(d, mass, body);
        });
    }
}

/// Aggregated cells break pairwise symmetry, so tree repulsion leaves a small net force that
/// would translate the whole layout. Spread its opposite evenly over all nodes.
fn cancel_net_force(forces: &mut [Point]) {
    if forces.is_empty() {
        return;
    }
    let net = forces.iter().fold(Point::ZERO, |acc, &f| acc + f);
    let correction = net * (-1.0 / forces.len() as f64);
    for force in forces.iter_mut() {
        *force += correction;
    }
}

fn springs(physics: &Resolved, bodies: &Bodies<'_>, forces: &mut [Point]) {
    for &(v, w) in bodies.edges {
        let delta = bodies.positions[v] - bodies.positions[w];
        let d = delta.length().max(0.01);
        let pull = delta * (physics.spring_constant * (physics.spring_length - d) / d);
        forces[v] += pull;
        forces[w] = forces[w] - pull;
    }
}

fn central_gravity(physics: &Resolved, bodies: &Bodies<'_>, forces: &mut [Point]) {
    if physics.central_gravity == 0.0 || bodies.positions.is_empty() {
        return;
    }
    // Mass-weighted, so the degree-proportional ForceAtlas2 pulls sum to zero.
    let total: f64 = bodies.masses.iter().sum();
    let centroid = bodies
        .positions
        .iter()
        .zip(bodies.masses)
        .fold(Point::ZERO, |acc, (&p, &m)| acc + p * m)
        * (1.0 / total);

    for (ix, force) in forces.iter_mut().enumerate() {
        let delta = centroid - bodies.positions[ix];
        let d = delta.length();
        if d == 0.0 {
            continue;
        }
        let pull = match physics.repulsion {
            // Linear in distance and degree.
            Repulsion::ForceAtlas2 { .. } => physics.central_gravity * bodies.masses[ix],
            // Constant magnitude.
            _ => physics.central_gravity / d,
        };
        *force += delta * pull;
    }
}
