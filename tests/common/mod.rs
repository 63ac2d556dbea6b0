//! Common fixtures for assembly integration tests
//!
//! Builders for file records and datasets, plus structural assertions
//! shared by every scenario.

#![allow(dead_code)]

use provgraph::{
    AnalysisStep, Dataset, FileRecord, FileRole, Graph, Node, NodeKind, QualityMetric, StepVersion,
};
use std::collections::HashSet;

pub const ASSEMBLY: &str = "GRCh38";

/// Fluent builder for a processed file on [`ASSEMBLY`]
pub struct FileBuilder(FileRecord);

pub fn file(id: &str) -> FileBuilder {
    let mut record = FileRecord::new(id);
    record.assembly = Some(ASSEMBLY.into());
    record.output_type = Some("alignments".into());
    FileBuilder(record)
}

impl FileBuilder {
    pub fn derived_from<S: AsRef<str>>(mut self, ids: &[S]) -> Self {
        self.0.derived_from = ids.iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    pub fn step(mut self, step_id: &str, step_type: &str) -> Self {
        self.0.analysis_step_version = Some(StepVersion {
            id: format!("{}v1/", step_id),
            analysis_step: Some(AnalysisStep {
                id: step_id.into(),
                analysis_step_types: vec![step_type.into()],
                pipelines: vec![],
            }),
        });
        self
    }

    pub fn replicates(mut self, replicates: &[u32]) -> Self {
        self.0.biological_replicates = replicates.to_vec();
        self
    }

    pub fn assembly(mut self, assembly: &str) -> Self {
        self.0.assembly = Some(assembly.into());
        self
    }

    pub fn annotation(mut self, annotation: &str) -> Self {
        self.0.genome_annotation = Some(annotation.into());
        self
    }

    pub fn status(mut self, status: &str) -> Self {
        self.0.status = Some(status.into());
        self
    }

    pub fn qc(mut self, metric_id: &str) -> Self {
        self.0.quality_metrics.push(QualityMetric {
            id: metric_id.into(),
            types: vec!["SamtoolsFlagstatsQualityMetric".into()],
        });
        self
    }

    pub fn build(self) -> FileRecord {
        self.0
    }
}

/// `/files/<prefix>1/` .. `/files/<prefix>n/`
pub fn numbered_ids(prefix: &str, n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("/files/{}{}/", prefix, i)).collect()
}

pub fn dataset_with_contributing(contributing: &[String]) -> Dataset {
    let mut dataset = Dataset::new("ENCSR000AAA");
    dataset.contributing_files = contributing.to_vec();
    dataset
}

/// Unique node ids, no dangling edges
pub fn assert_well_formed(graph: &Graph) {
    let mut seen = HashSet::new();
    for node in graph.nodes() {
        assert!(seen.insert(node.id.clone()), "duplicate node id {}", node.id);
        assert!(node.id.namespace().is_some(), "unnamespaced node id {}", node.id);
    }
    for edge in graph.edges() {
        assert!(seen.contains(&edge.source), "dangling edge source {}", edge.source);
        assert!(seen.contains(&edge.target), "dangling edge target {}", edge.target);
    }
}

pub fn nodes_with_role(graph: &Graph, wanted: FileRole) -> Vec<&Node> {
    graph
        .nodes()
        .filter(|n| matches!(n.kind, NodeKind::File { role, .. } if role == wanted))
        .collect()
}

pub fn step_nodes(graph: &Graph) -> Vec<&Node> {
    graph.nodes().filter(|n| n.is_step()).collect()
}

pub fn coalesced_nodes(graph: &Graph) -> Vec<&Node> {
    graph.nodes().filter(|n| n.is_coalesced()).collect()
}
