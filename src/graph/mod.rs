//! Core graph data structures

mod dag;
mod edge;
mod error;
mod node;


pub use dag::Graph;
pub use edge::Edge;
pub use error::{GraphError, GraphResult};
pub use node::{FileRole, Namespace, Node, NodeId, NodeKind, QcSubnode};
