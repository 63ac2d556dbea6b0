//! File records and dataset metadata as supplied by the record source
//!
//! Shapes follow the JSON objects the search endpoint returns: `@id` keys,
//! snake_case fields, unknown fields ignored.

use serde::{Deserialize, Serialize};

/// Status value of files that never enter the graph
pub const STATUS_ARCHIVED: &str = "archived";

/// Output category of raw files, which never drive the filter menu
pub const CATEGORY_RAW_DATA: &str = "raw data";

/// A pipeline an analysis step belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Pipeline {
    /// Title when present, otherwise the `@id`
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }
}

/// Processing step identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisStep {
    #[serde(rename = "@id")]
    pub id: String,
    /// Categories of analysis the step performs
    #[serde(default)]
    pub analysis_step_types: Vec<String>,
    #[serde(default)]
    pub pipelines: Vec<Pipeline>,
}

impl AnalysisStep {
    /// Display label for a step node
    pub fn label(&self) -> String {
        if self.analysis_step_types.is_empty() {
            return accession_from_id(&self.id).to_string();
        }
        self.analysis_step_types.join(", ")
    }
}

/// Versioned reference to an analysis step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepVersion {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_step: Option<AnalysisStep>,
}

/// Reference to a quality metric object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetric {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type", default)]
    pub types: Vec<String>,
}

/// One data file belonging to (or referenced by) a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    #[serde(rename = "@id")]
    pub id: String,
    /// Accession-like display title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub derived_from: Vec<String>,
    #[serde(default)]
    pub biological_replicates: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assembly: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genome_annotation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_step_version: Option<StepVersion>,
    #[serde(default)]
    pub quality_metrics: Vec<QualityMetric>,
}

impl FileRecord {
    /// Create a bare record with only an id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            derived_from: Vec::new(),
            biological_replicates: Vec::new(),
            output_type: None,
            output_category: None,
            assembly: None,
            genome_annotation: None,
            status: None,
            analysis_step_version: None,
            quality_metrics: Vec::new(),
        }
    }

    /// The analysis step behind this file, if its step version names one
    pub fn step(&self) -> Option<&AnalysisStep> {
        self.analysis_step_version
            .as_ref()
            .and_then(|v| v.analysis_step.as_ref())
    }

    /// The replicate number when the file belongs to exactly one replicate
    pub fn single_replicate(&self) -> Option<u32> {
        match self.biological_replicates.as_slice() {
            [n] => Some(*n),
            _ => None,
        }
    }

    pub fn has_derivations(&self) -> bool {
        !self.derived_from.is_empty()
    }

    /// Genome annotation, treating an empty string as absent
    pub fn annotation(&self) -> Option<&str> {
        self.genome_annotation.as_deref().filter(|a| !a.is_empty())
    }

    pub fn is_archived(&self) -> bool {
        self.status.as_deref() == Some(STATUS_ARCHIVED)
    }

    /// Title when present, otherwise the accession part of the `@id`
    pub fn accession(&self) -> &str {
        self.title
            .as_deref()
            .unwrap_or_else(|| accession_from_id(&self.id))
    }

    /// `ACCESSION (output type)`
    pub fn display_label(&self) -> String {
        match &self.output_type {
            Some(output_type) => format!("{} ({})", self.accession(), output_type),
            None => self.accession().to_string(),
        }
    }
}

/// The dataset whose files are being graphed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub accession: String,
    /// External files the dataset declares as inputs
    #[serde(default)]
    pub contributing_files: Vec<String>,
    /// Files outside the dataset's own list that must be fetched by id
    #[serde(default)]
    pub related_files: Vec<String>,
}

impl Dataset {
    pub fn new(accession: impl Into<String>) -> Self {
        Self {
            accession: accession.into(),
            ..Default::default()
        }
    }
}

/// Extract the accession from an object path like `/files/ENCFF001ABC/`
pub fn accession_from_id(id: &str) -> &str {
    let trimmed = id.trim_end_matches('/');
    match trimmed.rsplit_once('/') {
        Some((_, last)) if !last.is_empty() => last,
        _ => trimmed,
    }
}
