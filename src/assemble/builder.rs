//! GraphBuilder: turns the indexed, filtered, grouped records into nodes
//! and edges

use super::coalesce::Coalescing;
use super::index::{DerivationIndex, DerivationKeys, FileIndex};
use super::replicate::ActiveReplicates;
use super::{AssembleResult, Assembly};
use crate::graph::{FileRole, Graph, Node, NodeId, NodeKind, QcSubnode};
use crate::record::{accession_from_id, FileRecord};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

const QC_LABEL: &str = "QC";
const UNKNOWN_STEP_LABEL: &str = "Software unknown";

/// Everything the builder reads; produced by the earlier passes
#[derive(Clone, Copy)]
pub(crate) struct BuildInputs<'a, 's> {
    pub accession: &'s str,
    pub selected: Option<&'s NodeId>,
    pub index: &'s FileIndex<'a>,
    pub derivations: &'s DerivationIndex<'a>,
    pub connected: &'s [&'a FileRecord],
    pub replicates: &'s ActiveReplicates,
    pub coalescing: &'s Coalescing<'s>,
}

pub(crate) struct GraphBuilder<'a, 's> {
    inputs: BuildInputs<'a, 's>,
    graph: Graph,
    graphed_files: BTreeMap<&'a str, &'a FileRecord>,
    keys: DerivationKeys<'a>,
}

impl<'a, 's> GraphBuilder<'a, 's> {
    pub fn new(inputs: BuildInputs<'a, 's>) -> Self {
        Self {
            graph: Graph::new(inputs.accession),
            inputs,
            graphed_files: BTreeMap::new(),
            keys: DerivationKeys::default(),
        }
    }

    pub fn build(mut self) -> AssembleResult<Assembly<'a>> {
        self.add_replicates()?;
        self.add_connected_files()?;
        self.add_derived_anchors()?;
        self.add_contributing_files()?;
        self.add_coalesced_groups()?;
        self.add_missing_files()?;
        self.graph.validate()?;

        debug!(
            accession = self.inputs.accession,
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            graphed_files = self.graphed_files.len(),
            "assembled provenance graph"
        );

        Ok(Assembly {
            graph: self.graph,
            graphed_files: self.graphed_files,
        })
    }

    fn push(&mut self, node: Node) -> AssembleResult<()> {
        let node = node.with_selection(self.inputs.selected);
        self.graph.add_node(node)?;
        Ok(())
    }

    fn add_replicates(&mut self) -> AssembleResult<()> {
        let inputs = self.inputs;
        for number in inputs.replicates.iter() {
            self.push(Node::new(
                NodeId::replicate(number),
                format!("Replicate {}", number),
                NodeKind::Replicate { number },
            ))?;
        }
        Ok(())
    }

    /// Dataset files plus the step each one came out of
    fn add_connected_files(&mut self) -> AssembleResult<()> {
        let inputs = self.inputs;
        for &file in inputs.connected {
            let file_node = NodeId::file(&file.id);
            let parent = inputs.replicates.parent_of(file);
            let subnodes = file
                .quality_metrics
                .iter()
                .map(|metric| QcSubnode {
                    id: NodeId::qc(&metric.id, &file.id),
                    label: QC_LABEL.to_string(),
                    metric_id: metric.id.clone(),
                    metric_types: metric.types.clone(),
                    active: false,
                })
                .collect();

            self.push(
                Node::new(
                    file_node.clone(),
                    file.display_label(),
                    NodeKind::File {
                        file_id: file.id.clone(),
                        role: FileRole::Dataset,
                    },
                )
                .with_parent(parent.clone())
                .with_subnodes(subnodes),
            )?;
            self.graphed_files.insert(file.id.as_str(), file);

            let Some(step) = self.step_node(file, parent) else {
                continue;
            };
            let step_node = step.id.clone();
            // First file seen for a step instance owns its metadata
            if !self.graph.contains_node(&step_node) {
                self.push(step)?;
            }

            self.graph.add_edge(step_node.clone(), file_node);
            for input in &file.derived_from {
                if *input == file.id {
                    debug!(file_id = %file.id, "file lists itself as an input, skipping");
                    continue;
                }
                let source = self.input_node(input);
                self.graph.add_edge(source, step_node.clone());
            }
        }
        Ok(())
    }

    /// The step between a file and its inputs; None for root files
    fn step_node(&mut self, file: &'a FileRecord, parent: Option<NodeId>) -> Option<Node> {
        let node = match file.step() {
            Some(step) => {
                let key = self.keys.key(file);
                Node::new(
                    NodeId::step(key, &step.id),
                    step.label(),
                    NodeKind::Step {
                        step_id: Some(step.id.clone()),
                        step_version: file.analysis_step_version.as_ref().map(|v| v.id.clone()),
                        pipelines: step
                            .pipelines
                            .iter()
                            .map(|p| p.display_name().to_string())
                            .collect(),
                        file_id: file.id.clone(),
                        failed: false,
                    },
                )
            }
            None if file.has_derivations() => Node::new(
                NodeId::unknown_step(self.keys.key(file)),
                UNKNOWN_STEP_LABEL,
                NodeKind::Step {
                    step_id: None,
                    step_version: None,
                    pipelines: Vec::new(),
                    file_id: file.id.clone(),
                    failed: true,
                },
            ),
            None => return None,
        };
        Some(node.with_parent(parent))
    }

    /// Node an input id is drawn as: its coalesced group, or its own file node
    fn input_node(&self, id: &str) -> NodeId {
        match self.inputs.coalescing.group_of(id) {
            Some(group) => NodeId::coalesced(&group.key),
            None => NodeId::file(id),
        }
    }

    /// Known records outside the selection that selected files derive from
    fn add_derived_anchors(&mut self) -> AssembleResult<()> {
        let inputs = self.inputs;
        let connected: HashSet<&str> = inputs.connected.iter().map(|f| f.id.as_str()).collect();
        for target in inputs.derivations.targets() {
            if connected.contains(target) || inputs.coalescing.is_coalesced(target) {
                continue;
            }
            let Some(file) = inputs.index.get(target) else {
                continue;
            };
            let role = if inputs.coalescing.is_individual(target) {
                FileRole::Contributing
            } else {
                FileRole::Derived
            };
            self.push(
                Node::new(
                    NodeId::file(&file.id),
                    file.display_label(),
                    NodeKind::File {
                        file_id: file.id.clone(),
                        role,
                    },
                )
                .with_parent(inputs.replicates.parent_of(file)),
            )?;
            self.graphed_files.insert(file.id.as_str(), file);
        }
        Ok(())
    }

    /// Individually drawn contributing files the source never returned
    fn add_contributing_files(&mut self) -> AssembleResult<()> {
        let inputs = self.inputs;
        let unresolved = inputs
            .coalescing
            .individual()
            .filter(|id| !inputs.index.contains(id));
        for id in unresolved {
            self.push(Node::new(
                NodeId::file(id),
                accession_from_id(id),
                NodeKind::File {
                    file_id: id.to_string(),
                    role: FileRole::Contributing,
                },
            ))?;
        }
        Ok(())
    }

    fn add_coalesced_groups(&mut self) -> AssembleResult<()> {
        let inputs = self.inputs;
        for group in inputs.coalescing.groups() {
            self.push(Node::new(
                NodeId::coalesced(&group.key),
                format!("{} contributing files", group.members.len()),
                NodeKind::Coalesced {
                    members: group.members.iter().map(|m| m.to_string()).collect(),
                },
            ))?;
        }
        Ok(())
    }

    /// Derivation targets nobody could resolve: unreleased or unauthorized
    fn add_missing_files(&mut self) -> AssembleResult<()> {
        let inputs = self.inputs;
        let missing = inputs.derivations.targets().filter(|id| {
            !inputs.index.contains(id)
                && !inputs.coalescing.is_coalesced(id)
                && !inputs.coalescing.is_individual(id)
        });
        for id in missing {
            self.push(Node::new(
                NodeId::file(id),
                format!("{} (unknown)", accession_from_id(id)),
                NodeKind::File {
                    file_id: id.to_string(),
                    role: FileRole::Missing,
                },
            ))?;
        }
        Ok(())
    }
}
