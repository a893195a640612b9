//! Error types for graph construction and analysis

use thiserror::Error;

/// Errors raised by the graph store and analysis engines.
///
/// Every variant is raised at the point of detection and propagated to the
/// caller unmodified; the library never retries or returns partial results.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Construction input was inconsistent: a duplicate node id, an edge
    /// endpoint missing from the node set, or a self-loop.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A per-node operation referenced a node that is not in the graph.
    #[error("unknown node `{0}`")]
    UnknownNode(String),

    /// Average path length is undefined: the largest connected component
    /// has fewer than 2 nodes.
    #[error("largest connected component has fewer than 2 nodes")]
    DisconnectedSingleton,

    /// Community detection was requested with an iteration bound below 1.
    #[error("iteration bound must be at least 1, got {0}")]
    InvalidBound(usize),
}
