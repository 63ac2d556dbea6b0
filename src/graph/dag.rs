//! Graph: the assembled provenance DAG handed to the renderer

use super::edge::Edge;
use super::error::{GraphError, GraphResult};
use super::node::{Node, NodeId};
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};

/// Nodes and edges of one assembly, keyed by the dataset accession
///
/// Nodes keep their insertion order; lookups go through an id index.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Graph {
    /// Accession of the dataset the graph belongs to
    pub accession: String,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    #[serde(skip)]
    node_index: HashMap<NodeId, usize>,
    #[serde(skip)]
    edge_index: HashSet<(NodeId, NodeId)>,
}

impl Graph {
    /// Create an empty graph
    pub fn new(accession: impl Into<String>) -> Self {
        Self {
            accession: accession.into(),
            ..Default::default()
        }
    }

    /// Add a node
    ///
    /// Re-adding an identical node is a no-op. Re-using an id for a node with
    /// different metadata fails with [`GraphError::DuplicateNode`].
    pub fn add_node(&mut self, node: Node) -> GraphResult<()> {
        if let Some(&idx) = self.node_index.get(&node.id) {
            if self.nodes[idx] == node {
                return Ok(());
            }
            return Err(GraphError::DuplicateNode(node.id));
        }
        self.node_index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Add an edge unless the same source/target pair already exists
    ///
    /// Endpoints may be added later; [`Graph::validate`] checks them once the
    /// graph is complete. Returns false for a duplicate.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId) -> bool {
        if !self.edge_index.insert((source.clone(), target.clone())) {
            return false;
        }
        self.edges.push(Edge::new(source, target));
        true
    }

    /// Check that every edge endpoint exists and that the edges form no cycle
    pub fn validate(&self) -> GraphResult<()> {
        for edge in &self.edges {
            if !self.contains_node(&edge.source) || !self.contains_node(&edge.target) {
                return Err(GraphError::DanglingEdge {
                    from: edge.source.clone(),
                    to: edge.target.clone(),
                });
            }
        }
        self.check_acyclic()
    }

    /// Kahn's algorithm: whatever never reaches in-degree zero sits on or
    /// behind a cycle
    fn check_acyclic(&self) -> GraphResult<()> {
        let mut in_degree: HashMap<&NodeId, usize> =
            self.nodes.iter().map(|n| (&n.id, 0)).collect();
        let mut targets: HashMap<&NodeId, Vec<&NodeId>> = HashMap::new();
        for edge in &self.edges {
            *in_degree.entry(&edge.target).or_default() += 1;
            targets.entry(&edge.source).or_default().push(&edge.target);
        }

        let mut ready: VecDeque<&NodeId> = in_degree
            .iter()
            .filter(|&(_, &degree)| degree == 0)
            .map(|(&id, _)| id)
            .collect();
        let mut sorted = 0;
        while let Some(id) = ready.pop_front() {
            sorted += 1;
            for &target in targets.get(id).into_iter().flatten() {
                if let Some(degree) = in_degree.get_mut(target) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push_back(target);
                    }
                }
            }
        }
        if sorted == in_degree.len() {
            return Ok(());
        }

        // Smallest stuck id, so the report does not depend on hash order
        let stuck = in_degree
            .into_iter()
            .filter(|&(_, degree)| degree > 0)
            .map(|(id, _)| id)
            .min();
        match stuck {
            Some(id) => Err(GraphError::Cycle(id.clone())),
            None => Ok(()),
        }
    }

    /// Get a node by ID
    pub fn get_node(&self, id: &NodeId) -> Option<&Node> {
        self.node_index.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn has_edge(&self, source: &NodeId, target: &NodeId) -> bool {
        self.edge_index.contains(&(source.clone(), target.clone()))
    }

    /// Get all nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Get all edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Edges whose target is `id`
    pub fn incoming<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| &e.target == id)
    }

    /// Edges whose source is `id`
    pub fn outgoing<'a>(&'a self, id: &'a NodeId) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| &e.source == id)
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}
