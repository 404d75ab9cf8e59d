//! Error types for recommendation and evaluation.
//!
//! Numeric degeneracies (empty neighbor sets, zero degrees) never surface
//! here: the similarity functions return `0.0` for them. Everything in this
//! enum is either a precondition violation or a configuration problem.

use thiserror::Error;

use crate::graph::Partition;

/// Result type alias for recommendation operations
pub type Result<T> = std::result::Result<T, RecError>;

/// Errors raised by graph access, recommenders and the evaluation harness.
///
/// # Examples
///
/// ```
/// use aprender_rec::RecError;
///
/// let err = RecError::UnknownMethod { name: "cosine".to_string() };
/// assert!(err.to_string().contains("cosine"));
/// ```
#[derive(Error, Debug)]
pub enum RecError {
    /// Operation on a node that is not in the graph
    #[error("Invalid node: {node} is not in the graph")]
    InvalidNode {
        /// Node label or id
        node: String,
    },

    /// Removal of an edge that does not exist.
    ///
    /// Raised during masking this means the mask/restore bookkeeping is out
    /// of sync with the graph, so the trial is aborted.
    #[error("Edge not found: ({user}, {item})")]
    EdgeNotFound {
        /// User endpoint label
        user: String,
        /// Item endpoint label
        item: String,
    },

    /// Unrecognized recommendation method name
    #[error(
        "Unknown method: {name} (allowed: jaccard, overlap, adamic_adar, resource_allocation, pagerank)"
    )]
    UnknownMethod {
        /// Name as supplied by the caller
        name: String,
    },

    /// Node used on the wrong side of the bipartition
    #[error("Partition mismatch: {node} is {actual}, expected {expected}")]
    PartitionMismatch {
        /// Node label
        node: String,
        /// Partition the operation requires
        expected: Partition,
        /// Partition the node carries
        actual: Partition,
    },

    /// Invalid hyperparameter value provided
    #[error("Invalid hyperparameter: {param} = {value}, expected {constraint}")]
    InvalidHyperparameter {
        /// Parameter name
        param: String,
        /// Provided value
        value: String,
        /// Constraint description
        constraint: String,
    },

    /// Power iteration did not reach the tolerance
    #[error("Convergence failure: power iteration did not converge in {iterations} iterations")]
    ConvergenceFailure {
        /// Number of iterations attempted
        iterations: usize,
    },

    /// Malformed configuration document
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RecError {
    pub(crate) fn invalid_hyperparameter(
        param: &str,
        value: impl ToString,
        constraint: &str,
    ) -> Self {
        Self::InvalidHyperparameter {
            param: param.to_string(),
            value: value.to_string(),
            constraint: constraint.to_string(),
        }
    }
}

impl From<serde_json::Error> for RecError {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e.to_string())
    }
}
