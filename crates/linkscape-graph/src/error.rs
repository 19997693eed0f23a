/// Malformed serialized graph container.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("graph container is not valid node-link JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("multigraph containers are not supported")]
    Multigraph,

    #[error("duplicate node id: {id}")]
    DuplicateNode { id: String },

    #[error("edge {from} -> {to} references a node that is not declared")]
    MissingEndpoint { from: String, to: String },

    #[error("edge {from} -> {to} has a non-finite weight")]
    InvalidWeight { from: String, to: String },
}
