//! provgraph: Provenance Graph Assembler
//!
//! Turns the flat list of file records belonging to a dataset into a
//! directed acyclic graph of how the files were derived from one another.
//!
//! # Core Concepts
//!
//! - **File nodes**: dataset files, inputs outside the selection, external
//!   contributing files and files referenced but never retrieved
//! - **Step nodes**: one per processing step instance (step identity plus its
//!   input set); files derived without step metadata get a flagged step
//! - **Replicate nodes**: clusters for files from a single biological replicate
//! - **Coalesced nodes**: one summary node for many contributing files
//!   consumed by exactly the same dataset files
//!
//! # Example
//!
//! ```
//! use provgraph::{assemble, AssemblyFilter, Dataset, FileRecord};
//!
//! let mut raw = FileRecord::new("/files/R/");
//! raw.assembly = Some("GRCh38".into());
//! let mut processed = FileRecord::new("/files/P/");
//! processed.assembly = Some("GRCh38".into());
//! processed.derived_from = vec!["/files/R/".into()];
//!
//! let dataset = Dataset::new("ENCSR000AAA");
//! let files = vec![raw, processed];
//! let assembly = assemble(&dataset, None, &files, &AssemblyFilter::new("GRCh38")).unwrap();
//! assert!(assembly.is_graphed("/files/P/"));
//! ```

pub mod assemble;
pub mod config;
mod graph;
pub mod record;
pub mod source;

pub use assemble::{
    assemble, collect_filter_options, graph_candidates, AssembleError, AssembleResult, Assembler,
    Assembly, AssemblyFilter, MINIMUM_COALESCE_COUNT,
};
pub use config::{AssemblerConfig, ConfigError, ConfigResult};
pub use graph::{
    Edge, FileRole, Graph, GraphError, GraphResult, Namespace, Node, NodeId, NodeKind, QcSubnode,
};
pub use record::{accession_from_id, AnalysisStep, Dataset, FileRecord, QualityMetric, StepVersion};
pub use source::{
    fetch_related, CachedSource, FileRecordSource, JsonFileSource, SourceError, SourceResult,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
