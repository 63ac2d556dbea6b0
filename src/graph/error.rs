//! Structural errors raised while building a graph

use super::node::NodeId;
use thiserror::Error;

/// Integrity violations found while building or validating a graph
///
/// Duplicate nodes and dangling edges are construction defects. A cycle
/// comes from records that derive from one another.
#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("duplicate node {0} with different metadata")]
    DuplicateNode(NodeId),

    #[error("edge {from} -> {to} references a node that does not exist")]
    DanglingEdge { from: NodeId, to: NodeId },

    #[error("derivation cycle through {0}")]
    Cycle(NodeId),
}

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;
