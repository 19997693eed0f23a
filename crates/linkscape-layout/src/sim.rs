use crate::config::{InitialPlacement, LEVEL_SEPARATION, PhysicsConfig, SimulationOptions};
use crate::error::Result;
use crate::forces::{self, Bodies, Repulsion, Resolved};
use crate::hierarchy;
use crate::state::{Body, LayoutState, LayoutStatus, Point};
use indexmap::IndexMap;
use linkscape_graph::rng::XorShift64Star;
use linkscape_graph::{CancelToken, Graph};
use std::f64::consts::TAU;

/// Seed for the jitter that separates coincident bodies.
const JITTER_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

/// ForceAtlas2 weighs every node by `degree + 1`; the other solvers use unit masses.
fn masses(graph: &Graph, resolved: &Resolved) -> Vec<f64> {
    let n = graph.node_count();
    match resolved.repulsion {
        Repulsion::ForceAtlas2 { .. } => (0..n)
            .map(|ix| (graph.degree_at(ix) + 1) as f64)
            .collect(),
        _ => vec![1.0; n],
    }
}

/// Configured force simulation, reusable across graphs.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutEngine {
    physics: PhysicsConfig,
    options: SimulationOptions,
}

impl LayoutEngine {
    pub fn new(physics: PhysicsConfig, options: SimulationOptions) -> Self {
        Self { physics, options }
    }

    /// Like [`LayoutEngine::new`] but rejects out-of-range physics parameters.
    pub fn try_new(physics: PhysicsConfig, options: SimulationOptions) -> Result<Self> {
        physics.validate()?;
        Ok(Self::new(physics, options))
    }

    pub fn physics(&self) -> &PhysicsConfig {
        &self.physics
    }

    pub fn options(&self) -> &SimulationOptions {
        &self.options
    }

    /// Seeds positions; the returned simulation is `Initialized` (or already `Converged` when the
    /// graph has no nodes).
    pub fn initialize<'g>(&self, graph: &'g Graph) -> Simulation<'g> {
        Simulation::new(graph, self.physics, self.options)
    }

    pub fn run(&self, graph: &Graph) -> LayoutState {
        self.run_with_cancel(graph, &CancelToken::new())
    }

    /// Relaxes until convergence, the iteration cap, or cancellation, and returns the state
    /// reached.
    pub fn run_with_cancel(&self, graph: &Graph, cancel: &CancelToken) -> LayoutState {
        let mut sim = self.initialize(graph);
        sim.run(cancel);
        sim.into_state()
    }
}

/// A running simulation over one graph.
#[derive(Debug, Clone)]
pub struct Simulation<'g> {
    graph: &'g Graph,
    physics: PhysicsConfig,
    resolved: Resolved,
    options: SimulationOptions,
    positions: Vec<Point>,
    velocities: Vec<Point>,
    forces: Vec<Point>,
    masses: Vec<f64>,
    edges: Vec<(usize, usize)>,
    levels: Option<Vec<usize>>,
    rng: XorShift64Star,
    status: LayoutStatus,
    iterations: usize,
    max_displacement: f64,
}

impl<'g> Simulation<'g> {
    fn new(graph: &'g Graph, physics: PhysicsConfig, options: SimulationOptions) -> Self {
        let n = graph.node_count();
        let resolved = Resolved::from(&physics);
        let mut sim = Simulation {
            graph,
            physics,
            resolved,
            options,
            positions: vec![Point::ZERO; n],
            velocities: vec![Point::ZERO; n],
            forces: vec![Point::ZERO; n],
            masses: masses(graph, &resolved),
            edges: graph.edge_indices().collect(),
            levels: None,
            rng: XorShift64Star::new(JITTER_SEED),
            status: LayoutStatus::Initialized,
            iterations: 0,
            max_displacement: 0.0,
        };

        match resolved.repulsion {
            Repulsion::Hierarchical { node_distance } => sim.place_by_level(node_distance),
            _ => sim.place(options.initial_placement),
        }
        if n == 0 {
            sim.status = LayoutStatus::Converged;
        }

        tracing::debug!(
            solver = %physics.kind(),
            nodes = n,
            edges = sim.edges.len(),
            "initialized layout"
        );
        sim
    }

    fn place(&mut self, placement: InitialPlacement) {
        let n = self.positions.len();
        let spacing = self.resolved.spring_length.max(1.0);
        match placement {
            InitialPlacement::Circular => {
                if n == 1 {
                    return;
                }
                let radius = (spacing / 2.0).max(n as f64 * spacing / TAU);
                for (i, p) in self.positions.iter_mut().enumerate() {
                    let angle = TAU * i as f64 / n as f64;
                    *p = Point::new(radius * angle.cos(), radius * angle.sin());
                }
            }
            InitialPlacement::Random { seed } => {
                let half = spacing * (n as f64).sqrt() / 2.0;
                let mut rng = XorShift64Star::new(seed);
                for p in &mut self.positions {
                    let x = rng.next_f64_signed() * half;
                    let y = rng.next_f64_signed() * half;
                    *p = Point::new(x, y);
                }
            }
        }
    }

    fn place_by_level(&mut self, node_distance: f64) {
        let levels = hierarchy::assign_levels(self.graph);
        for (depth, row) in levels.rows.iter().enumerate() {
            let offset = (row.len() as f64 - 1.0) / 2.0;
            for (k, &ix) in row.iter().enumerate() {
                self.positions[ix] = Point::new(
                    (k as f64 - offset) * node_distance,
                    depth as f64 * LEVEL_SEPARATION,
                );
            }
        }
        self.levels = Some(levels.level);
    }

    pub fn status(&self) -> LayoutStatus {
        self.status
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn max_displacement(&self) -> f64 {
        self.max_displacement
    }

    pub fn position(&self, id: &str) -> Option<Point> {
        self.graph.node_index(id).map(|ix| self.positions[ix])
    }

    /// Runs one iteration. A simulation in a terminal state is left untouched.
    pub fn step(&mut self) -> LayoutStatus {
        if self.status.is_terminal() {
            return self.status;
        }
        self.status = LayoutStatus::Relaxing;

        let bodies = Bodies {
            positions: &self.positions,
            masses: &self.masses,
            edges: &self.edges,
            node_radius: self.options.node_radius,
        };
        forces::accumulate(&self.resolved, &bodies, &mut self.rng, &mut self.forces);
        self.max_displacement = self.integrate();
        self.iterations += 1;

        tracing::trace!(
            iteration = self.iterations,
            max_displacement = self.max_displacement,
            "layout step"
        );

        if self.max_displacement < self.options.epsilon {
            self.status = LayoutStatus::Converged;
        } else if self.iterations >= self.options.effective_max_iterations() {
            self.status = LayoutStatus::IterationCapReached;
        }
        self.status
    }

    /// `v += (F - damping·v)·dt`, clamped to `max_velocity` and snapped to rest below
    /// `min_velocity`; returns the largest displacement.
    fn integrate(&mut self) -> f64 {
        let r = &self.resolved;
        let mut max_displacement = 0.0f64;
        for ((p, v), f) in self
            .positions
            .iter_mut()
            .zip(&mut self.velocities)
            .zip(&self.forces)
        {
            let accel = *f + r.wind - *v * r.damping;
            let mut next = *v + accel * r.timestep;
            if r.x_only {
                next.y = 0.0;
            }

            let speed = next.length();
            if speed > r.max_velocity {
                next = next * (r.max_velocity / speed);
            } else if speed < r.min_velocity {
                next = Point::ZERO;
            }
            *v = next;

            let step = next * r.timestep;
            *p += step;
            max_displacement = max_displacement.max(step.length());
        }
        max_displacement
    }

    /// Steps until a terminal state; checks `cancel` before every iteration.
    pub fn run(&mut self, cancel: &CancelToken) -> LayoutStatus {
        while !self.status.is_terminal() {
            if cancel.is_cancelled() {
                self.status = LayoutStatus::Cancelled;
                break;
            }
            self.step();
        }

        tracing::debug!(
            solver = %self.physics.kind(),
            status = ?self.status,
            iterations = self.iterations,
            max_displacement = self.max_displacement,
            "layout finished"
        );
        self.status
    }

    pub fn state(&self) -> LayoutState {
        let mut nodes: IndexMap<String, Body> = IndexMap::with_capacity(self.positions.len());
        for ix in 0..self.positions.len() {
            nodes.insert(
                self.graph.node_id(ix).to_string(),
                Body {
                    position: self.positions[ix],
                    velocity: self.velocities[ix],
                    level: self.levels.as_ref().map(|l| l[ix]),
                },
            );
        }
        LayoutState {
            physics: self.physics,
            status: self.status,
            iterations: self.iterations,
            max_displacement: self.max_displacement,
            nodes,
        }
    }

    pub fn into_state(self) -> LayoutState {
        self.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverKind;
    use linkscape_graph::GraphBuilder;

    #[test]
    fn circular_placement_spaces_two_nodes_by_spring_length() {
        let mut b = GraphBuilder::undirected();
        b.set_edge("a", "b");
        let g = b.build();
        let physics = PhysicsConfig::defaults(SolverKind::Repulsion);
        let sim = LayoutEngine::new(physics, SimulationOptions::default()).initialize(&g);
        let (Some(a), Some(b)) = (sim.position("a"), sim.position("b")) else {
            panic!("both nodes placed");
        };
        assert!(((a - b).length() - 200.0).abs() < 1e-9);
        assert_eq!(sim.status(), LayoutStatus::Initialized);
    }

    #[test]
    fn random_placement_is_seeded() {
        let mut b = GraphBuilder::undirected();
        b.set_path(&["a", "b", "c", "d"]);
        let g = b.build();
        let options = SimulationOptions {
            initial_placement: InitialPlacement::Random { seed: 42 },
            ..SimulationOptions::default()
        };
        let engine = LayoutEngine::new(PhysicsConfig::default(), options);
        let first = engine.initialize(&g).state();
        let second = engine.initialize(&g).state();
        assert_eq!(first, second);
    }

    #[test]
    fn hierarchical_steps_never_move_rows() {
        let mut b = GraphBuilder::directed();
        b.set_edge("root", "a");
        b.set_edge("root", "b");
        b.set_edge("a", "c");
        let g = b.build();
        let physics = PhysicsConfig::defaults(SolverKind::HierarchicalRepulsion);
        let mut sim = LayoutEngine::new(physics, SimulationOptions::default()).initialize(&g);
        for _ in 0..25 {
            sim.step();
        }
        let state = sim.state();
        for body in state.nodes.values() {
            let level = body.level.unwrap_or_default() as f64;
            assert_eq!(body.position.y, level * LEVEL_SEPARATION);
            assert_eq!(body.velocity.y, 0.0);
        }
    }

    #[test]
    fn terminal_simulation_ignores_further_steps() {
        let g = GraphBuilder::undirected().build();
        let mut sim = LayoutEngine::new(PhysicsConfig::default(), SimulationOptions::default())
            .initialize(&g);
        assert_eq!(sim.status(), LayoutStatus::Converged);
        assert_eq!(sim.step(), LayoutStatus::Converged);
        assert_eq!(sim.iterations(), 0);
    }
}
