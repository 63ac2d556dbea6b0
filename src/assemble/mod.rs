//! Provenance graph assembly
//!
//! Runs the passes in dependency order: index the records, find the files
//! matching the selected assembly/annotation and who derives from what, drop
//! islands, collect replicates and coalesce contributing files, then build
//! the node/edge graph.

mod builder;
mod coalesce;
mod filter;
mod index;
mod island;
mod replicate;

pub use coalesce::{Coalescing, CoalescingGroup, MINIMUM_COALESCE_COUNT};
pub use filter::{collect_filter_options, graph_candidates, AssemblyFilter};
pub use index::{derivation_key, DerivationIndex, DerivationKeys, FileIndex};
pub use island::{split_islands, IslandSplit};
pub use replicate::ActiveReplicates;

use crate::config::AssemblerConfig;
use crate::graph::{Graph, GraphError, NodeId};
use crate::record::{Dataset, FileRecord};
use builder::{BuildInputs, GraphBuilder};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while assembling a graph
#[derive(Debug, Error)]
pub enum AssembleError {
    /// The selection leaves no connectable files. Expected for many
    /// filters; callers show a "choose another filter" message.
    #[error("no file relationships for {filter} ({islands} unconnected files)")]
    NoRelationships { filter: AssemblyFilter, islands: usize },

    #[error("graph integrity: {0}")]
    Integrity(#[from] GraphError),
}

/// Result type for assembly
pub type AssembleResult<T> = Result<T, AssembleError>;

/// An assembled graph plus every file record that got a node of its own
#[derive(Debug)]
pub struct Assembly<'a> {
    pub graph: Graph,
    pub graphed_files: BTreeMap<&'a str, &'a FileRecord>,
}

impl Assembly<'_> {
    /// True when the file has a node the table view can link to
    pub fn is_graphed(&self, file_id: &str) -> bool {
        self.graphed_files.contains_key(file_id)
    }
}

/// Graph assembler with its tunables
#[derive(Debug, Clone)]
pub struct Assembler {
    min_coalesce_count: usize,
}

impl Default for Assembler {
    fn default() -> Self {
        Self {
            min_coalesce_count: MINIMUM_COALESCE_COUNT,
        }
    }
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &AssemblerConfig) -> Self {
        Self {
            min_coalesce_count: config.min_coalesce_count,
        }
    }

    /// Override the smallest contributing-file group that coalesces
    pub fn min_coalesce_count(mut self, count: usize) -> Self {
        self.min_coalesce_count = count;
        self
    }

    /// Assemble the provenance graph of `files` for one assembly/annotation
    ///
    /// `selected` marks the node the caller has highlighted. Records are only
    /// borrowed; the returned graph is independent of them, the graphed-file
    /// map is not.
    pub fn assemble<'a>(
        &self,
        dataset: &Dataset,
        selected: Option<&NodeId>,
        files: impl IntoIterator<Item = &'a FileRecord>,
        filter: &AssemblyFilter,
    ) -> AssembleResult<Assembly<'a>> {
        let files: Vec<&'a FileRecord> = files.into_iter().collect();
        let index = FileIndex::build(files.iter().copied());
        // Of several records sharing an id, only the one the index kept takes part
        let files: Vec<&'a FileRecord> = files
            .into_iter()
            .filter(|f| index.get(&f.id).is_some_and(|kept| std::ptr::eq(kept, *f)))
            .collect();
        let derivations = DerivationIndex::build(&files, filter);
        let split = split_islands(&derivations);
        if split.connected.is_empty() {
            debug!(
                accession = %dataset.accession,
                %filter,
                islands = split.islands.len(),
                "no file relationships for selection"
            );
            return Err(AssembleError::NoRelationships {
                filter: filter.clone(),
                islands: split.islands.len(),
            });
        }

        let replicates = ActiveReplicates::collect(&split.connected, &index);
        let coalescing = Coalescing::partition(dataset, &derivations, self.min_coalesce_count);

        GraphBuilder::new(BuildInputs {
            accession: &dataset.accession,
            selected,
            index: &index,
            derivations: &derivations,
            connected: &split.connected,
            replicates: &replicates,
            coalescing: &coalescing,
        })
        .build()
    }
}

/// Assemble with default settings
pub fn assemble<'a>(
    dataset: &Dataset,
    selected: Option<&NodeId>,
    files: impl IntoIterator<Item = &'a FileRecord>,
    filter: &AssemblyFilter,
) -> AssembleResult<Assembly<'a>> {
    Assembler::default().assemble(dataset, selected, files, filter)
}
