pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Format(#[from] linkscape_graph::FormatError),

    #[error(transparent)]
    Analysis(#[from] linkscape_analysis::Error),

    #[error(transparent)]
    Layout(#[from] linkscape_layout::Error),

    #[error("invalid JSON config: {0}")]
    ConfigJson(#[from] serde_json::Error),

    #[error("invalid YAML config: {0}")]
    ConfigYaml(#[from] serde_yaml::Error),

    #[error("failed to start worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("result superseded by a newer configuration")]
    Superseded,

    #[error("worker stopped before reporting a result")]
    WorkerLost,
}
