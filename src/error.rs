//! Error types shared by the parser, the solvers and the command line tools.

use thiserror::Error;

/// Everything that can abort a solve.
///
/// A neighbor that fails the coverage check is not an error: the search
/// discards it and keeps going. Only conditions that make the whole run
/// meaningless end up here.
#[derive(Debug, Error)]
pub enum SolverError {
    /// The input could not be read at all.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input text does not follow the instance format.
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Even with every facility open some client is out of range.
    #[error("instance is infeasible: client {client} has no facility within the coverage distance")]
    Infeasible { client: String },

    /// There is nothing to open, so no client can ever be covered.
    #[error("instance is infeasible: it has no facilities")]
    NoFacilities,

    /// A configuration value was rejected by `validate()`.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The brute-force solver refuses instances above its size limit.
    #[error("exact solver supports at most {limit} facilities, instance has {facilities}")]
    ExactLimit { facilities: usize, limit: usize },

    /// The brute-force solver hit its deadline before proving optimality.
    #[error("exact solver ran out of time before finding an optimal open-set")]
    ExactTimeout,
}

impl SolverError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        SolverError::Parse { line, message: message.into() }
    }

    /// True for the structural infeasibility conditions.
    pub fn is_infeasible(&self) -> bool {
        matches!(self, SolverError::Infeasible { .. } | SolverError::NoFacilities)
    }
}

pub type Result<T> = std::result::Result<T, SolverError>;
