use crate::config::SolverKind;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown solver: {name}")]
    UnknownSolver { name: String },

    #[error("parameter `{name}` does not apply to the {solver} solver")]
    UnknownParameter { solver: SolverKind, name: String },

    #[error("invalid value {value} for `{name}`: {reason}")]
    InvalidParameter {
        name: String,
        value: f64,
        reason: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
