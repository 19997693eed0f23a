use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::jobs::{Generation, JobHandle, Slot, Supervisor};
use linkscape_analysis::{
    Advisory, CentralityResult, MetricsSummary, Partition, centrality, community, metrics, select,
};
use linkscape_graph::Graph;
use linkscape_layout::{LayoutEngine, LayoutState};
use serde::Serialize;
use std::sync::Arc;

/// Subgraph currently selected, shared with the workers computing on it.
#[derive(Debug, Clone)]
struct View {
    graph: Arc<Graph>,
    advisory: Option<Advisory>,
}

#[derive(Debug, Default)]
struct Slots {
    view: Arc<Slot<View>>,
    metrics: Arc<Slot<MetricsSummary>>,
    centrality: Arc<Slot<CentralityResult>>,
    communities: Arc<Slot<Partition>>,
    layout: Arc<Slot<LayoutState>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubgraphSummary {
    pub nodes: usize,
    pub edges: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<Advisory>,
}

/// Results published for one generation. A field stays `None` until its job has finished.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub generation: Generation,
    pub subgraph: Option<SubgraphSummary>,
    pub metrics: Option<MetricsSummary>,
    pub centrality: Option<CentralityResult>,
    pub communities: Option<Partition>,
    pub layout: Option<LayoutState>,
}

impl Snapshot {
    /// Every job of the generation has published.
    pub fn is_complete(&self) -> bool {
        self.subgraph.is_some()
            && self.metrics.is_some()
            && self.centrality.is_some()
            && self.communities.is_some()
            && self.layout.is_some()
    }
}

/// Handles to the jobs submitted by one [`Session::apply`] call.
#[derive(Debug)]
pub struct Pending {
    pub generation: Generation,
    pub metrics: JobHandle<MetricsSummary>,
    pub centrality: JobHandle<CentralityResult>,
    pub communities: JobHandle<Partition>,
    pub layout: JobHandle<LayoutState>,
}

/// A loaded base graph plus the analyses of its most recent configuration.
///
/// Every [`Session::apply`] starts a new generation: the previous generation's jobs are cancelled
/// and whatever they still produce is discarded, so readers only ever observe results of the
/// latest configuration.
#[derive(Debug)]
pub struct Session {
    base: Arc<Graph>,
    supervisor: Supervisor,
    slots: Slots,
}

impl Session {
    /// Loads a node-link JSON document as the session's base graph.
    pub fn open(bytes: &[u8]) -> Result<Self> {
        Ok(Self::from_graph(linkscape_graph::load(bytes)?))
    }

    pub fn from_graph(graph: Graph) -> Self {
        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            directed = graph.is_directed(),
            "opened session"
        );
        Self {
            base: Arc::new(graph),
            supervisor: Supervisor::new(),
            slots: Slots::default(),
        }
    }

    pub fn base(&self) -> &Arc<Graph> {
        &self.base
    }

    pub fn generation(&self) -> Generation {
        self.supervisor.current()
    }

    /// The subgraph selected by the current configuration.
    pub fn subgraph(&self) -> Option<Arc<Graph>> {
        self.slots
            .view
            .get(self.generation())
            .map(|view| view.graph)
    }

    /// Starts recomputing everything for `config`.
    ///
    /// The subgraph is selected on the calling thread; metrics, centrality, communities and
    /// layout then run concurrently on worker threads. Invalid physics are rejected before the
    /// current generation is touched.
    pub fn apply(&self, config: &SessionConfig) -> Result<Pending> {
        config.validate()?;
        let ticket = self.supervisor.advance();
        let generation = ticket.generation;

        let selected = select::select(&self.base, &config.selection);
        let graph = Arc::new(selected.graph);
        self.supervisor.publish(
            &self.slots.view,
            generation,
            View {
                graph: Arc::clone(&graph),
                advisory: selected.advisory,
            },
        );

        let metrics = {
            let graph = Arc::clone(&graph);
            self.supervisor
                .spawn("metrics", &ticket, &self.slots.metrics, move |_| {
                    Ok(metrics::summarize(&graph))
                })?
        };

        let centrality = {
            let graph = Arc::clone(&graph);
            let kind = config.centrality;
            let options = config.centrality_options;
            self.supervisor
                .spawn("centrality", &ticket, &self.slots.centrality, move |cancel| {
                    Ok(centrality::rank_with(&graph, kind, &options, cancel)?)
                })?
        };

        let communities = {
            let graph = Arc::clone(&graph);
            let options = config.communities;
            self.supervisor
                .spawn("communities", &ticket, &self.slots.communities, move |cancel| {
                    Ok(community::label_propagation_with_cancel(
                        &graph, &options, cancel,
                    )?)
                })?
        };

        let layout = {
            let engine = LayoutEngine::new(config.physics, config.simulation);
            self.supervisor
                .spawn("layout", &ticket, &self.slots.layout, move |cancel| {
                    Ok(engine.run_with_cancel(&graph, cancel))
                })?
        };

        tracing::debug!(generation, "applied configuration");
        Ok(Pending {
            generation,
            metrics,
            centrality,
            communities,
            layout,
        })
    }

    /// Results of the current generation published so far.
    pub fn snapshot(&self) -> Snapshot {
        let generation = self.generation();
        Snapshot {
            generation,
            subgraph: self.slots.view.get(generation).map(|view| SubgraphSummary {
                nodes: view.graph.node_count(),
                edges: view.graph.edge_count(),
                advisory: view.advisory,
            }),
            metrics: self.slots.metrics.get(generation),
            centrality: self.slots.centrality.get(generation),
            communities: self.slots.communities.get(generation),
            layout: self.slots.layout.get(generation),
        }
    }

    /// Resolves once the current generation's jobs have finished. Several callers may settle at
    /// the same time; each of them waits for the whole generation.
    pub async fn settle(&self) -> Snapshot {
        self.supervisor.settled().await;
        self.snapshot()
    }

    /// Synchronous variant of [`Session::settle`].
    pub fn wait(&self) -> Snapshot {
        futures::executor::block_on(self.settle())
    }

    /// Applies `config` and blocks until all of its results are available.
    ///
    /// Fails with [`Error::Superseded`] when another configuration is applied meanwhile.
    pub fn run(&self, config: &SessionConfig) -> Result<Snapshot> {
        let pending = self.apply(config)?;
        let generation = pending.generation;
        futures::executor::block_on(async {
            let (metrics, centrality, communities, layout) = futures::join!(
                pending.metrics,
                pending.centrality,
                pending.communities,
                pending.layout
            );
            metrics?;
            centrality?;
            communities?;
            layout?;
            let snapshot = self.snapshot();
            if snapshot.generation != generation {
                return Err(Error::Superseded);
            }
            Ok::<_, Error>(snapshot)
        })
    }

    /// Cancels whatever the current generation is still computing.
    pub fn cancel(&self) {
        self.supervisor.cancel_all();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.supervisor.cancel_all();
    }
}
