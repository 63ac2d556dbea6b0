//! Node representation in the provenance graph

use serde::{Deserialize, Serialize};

/// Namespace prefixes that keep node ids unique across variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    File,
    Step,
    Rep,
    Qc,
    Coalesced,
    Error,
}

impl Namespace {
    const ALL: [Namespace; 6] = [
        Namespace::File,
        Namespace::Step,
        Namespace::Rep,
        Namespace::Qc,
        Namespace::Coalesced,
        Namespace::Error,
    ];

    /// The prefix written in front of the node key, without the colon
    pub fn prefix(&self) -> &'static str {
        match self {
            Namespace::File => "file",
            Namespace::Step => "step",
            Namespace::Rep => "rep",
            Namespace::Qc => "qc",
            Namespace::Coalesced => "coalesced",
            Namespace::Error => "error",
        }
    }
}

/// Unique identifier for a node
///
/// Always `<namespace>:<key>`, so a file and a step can never share an id
/// even when their keys are equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    fn namespaced(namespace: Namespace, key: impl std::fmt::Display) -> Self {
        Self(format!("{}:{}", namespace.prefix(), key))
    }

    /// Node for a file record, contributing file or missing file
    pub fn file(file_id: &str) -> Self {
        Self::namespaced(Namespace::File, file_id)
    }

    /// Node for one step instance: the same step over different inputs is a
    /// different node
    pub fn step(derivation_key: &str, step_id: &str) -> Self {
        Self::namespaced(Namespace::Step, format!("{}:{}", derivation_key, step_id))
    }

    /// Placeholder step for files that derive from others without step metadata
    pub fn unknown_step(derivation_key: &str) -> Self {
        Self::namespaced(Namespace::Error, derivation_key)
    }

    /// Biological replicate cluster
    pub fn replicate(number: u32) -> Self {
        Self::namespaced(Namespace::Rep, number)
    }

    /// Quality metric subnode, unique per (metric, file) pair
    pub fn qc(metric_id: &str, file_id: &str) -> Self {
        Self::namespaced(Namespace::Qc, format!("{}{}", metric_id, file_id))
    }

    /// Summary node for a coalesced group of contributing files
    pub fn coalesced(group_key: &str) -> Self {
        Self::namespaced(Namespace::Coalesced, group_key)
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The namespace this id lives in, if it carries a known prefix
    pub fn namespace(&self) -> Option<Namespace> {
        let (prefix, _) = self.0.split_once(':')?;
        Namespace::ALL.into_iter().find(|ns| ns.prefix() == prefix)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Why a file node is in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileRole {
    /// Matches the selected assembly/annotation
    Dataset,
    /// Known record outside the selection that a dataset file derives from
    Derived,
    /// External input referenced only through the dataset's contributing files
    Contributing,
    /// Referenced but never resolved to a record
    Missing,
}

/// Variant-specific payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    File {
        file_id: String,
        role: FileRole,
    },
    Step {
        /// Analysis step `@id`; absent for unknown-software steps
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step_version: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pipelines: Vec<String>,
        /// File whose derivation created this step instance
        file_id: String,
        /// True when provenance metadata was missing
        failed: bool,
    },
    Replicate {
        number: u32,
    },
    Coalesced {
        members: Vec<String>,
    },
}

/// Quality metric attached to a file node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QcSubnode {
    pub id: NodeId,
    pub label: String,
    pub metric_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub metric_types: Vec<String>,
    #[serde(default)]
    pub active: bool,
}

/// A node in the provenance graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier
    pub id: NodeId,
    /// Display label
    pub label: String,
    /// Variant payload
    #[serde(flatten)]
    pub kind: NodeKind,
    /// Replicate node this one is clustered under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subnodes: Vec<QcSubnode>,
    /// Set when the caller selected this node
    #[serde(default)]
    pub active: bool,
}

impl Node {
    /// Create a new node with no parent, subnodes or selection
    pub fn new(id: NodeId, label: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id,
            label: label.into(),
            kind,
            parent: None,
            subnodes: Vec::new(),
            active: false,
        }
    }

    /// Cluster this node under a replicate node
    pub fn with_parent(mut self, parent: Option<NodeId>) -> Self {
        self.parent = parent;
        self
    }

    /// Attach quality metric subnodes
    pub fn with_subnodes(mut self, subnodes: Vec<QcSubnode>) -> Self {
        self.subnodes = subnodes;
        self
    }

    /// Mark the node and its subnodes active when they match the selection
    pub fn with_selection(mut self, selected: Option<&NodeId>) -> Self {
        if let Some(selected) = selected {
            self.active = &self.id == selected;
            for sub in &mut self.subnodes {
                sub.active = &sub.id == selected;
            }
        }
        self
    }

    /// True for missing files and unknown-software steps
    pub fn is_flagged(&self) -> bool {
        match &self.kind {
            NodeKind::File { role, .. } => *role == FileRole::Missing,
            NodeKind::Step { failed, .. } => *failed,
            _ => false,
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, NodeKind::File { .. })
    }

    pub fn is_step(&self) -> bool {
        matches!(self.kind, NodeKind::Step { .. })
    }

    pub fn is_coalesced(&self) -> bool {
        matches!(self.kind, NodeKind::Coalesced { .. })
    }
}
