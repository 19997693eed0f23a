//! Internal storage entries for [`Graph`](super::Graph).

#[derive(Debug, Clone)]
pub(in crate::graph) struct NodeEntry {
    pub(in crate::graph) id: String,
    pub(in crate::graph) label: Option<String>,
}

#[derive(Debug, Clone)]
pub(in crate::graph) struct EdgeEntry {
    pub(in crate::graph) v_ix: usize,
    pub(in crate::graph) w_ix: usize,
    pub(in crate::graph) weight: Option<f64>,
}
