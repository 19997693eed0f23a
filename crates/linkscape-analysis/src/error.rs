#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("node not found: {id}")]
    NotFound { id: String },

    #[error("computation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;
