//! Directed edge between two provenance nodes

use super::node::NodeId;
use serde::{Deserialize, Serialize};

/// A directed edge: `source` flows into `target`
///
/// File -> Step edges mean "the step consumed this file", Step -> File edges
/// mean "the step produced this file".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Source node
    pub source: NodeId,
    /// Target node
    pub target: NodeId,
}

impl Edge {
    /// Create a new edge
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self { source, target }
    }
}
