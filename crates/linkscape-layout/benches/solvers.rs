use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use linkscape_graph::{Graph, GraphBuilder};
use linkscape_layout::{LayoutEngine, PhysicsConfig, SimulationOptions, SolverKind};
use std::hint::black_box;
use std::time::Duration;

/// A `side x side` grid with a few long-range shortcuts, roughly the density of a link network.
fn build_grid(side: usize) -> Graph {
    let id = |r: usize, c: usize| format!("r{r}c{c}");
    let mut b = GraphBuilder::undirected();
    for r in 0..side {
        for c in 0..side {
            if c + 1 < side {
                b.set_edge(id(r, c), id(r, c + 1));
            }
            if r + 1 < side {
                b.set_edge(id(r, c), id(r + 1, c));
            }
            if (r * side + c) % 17 == 0 {
                b.set_edge(id(r, c), id((r + side / 2) % side, (c + side / 3) % side));
            }
        }
    }
    b.build()
}

fn bench_solvers(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout_50_steps");
    group.measurement_time(Duration::from_secs(10));

    for side in [10usize, 20] {
        let graph = build_grid(side);
        for kind in SolverKind::ALL {
            let engine = LayoutEngine::new(PhysicsConfig::defaults(kind), SimulationOptions::default());
            group.bench_with_input(
                BenchmarkId::new(kind.as_str(), graph.node_count()),
                &graph,
                |b, graph| {
                    b.iter(|| {
                        let mut sim = engine.initialize(black_box(graph));
                        for _ in 0..50 {
                            sim.step();
                        }
                        black_box(sim.max_displacement());
                    })
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_solvers);
criterion_main!(benches);
