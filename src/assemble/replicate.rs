//! Replicate grouping: which biological replicates earn a cluster node

use super::index::FileIndex;
use crate::graph::NodeId;
use crate::record::FileRecord;
use std::collections::BTreeSet;

/// Replicate numbers that get a Replicate node
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ActiveReplicates {
    numbers: BTreeSet<u32>,
}

impl ActiveReplicates {
    /// Collect single-valued replicates from the connected files and from the
    /// known files they derive from
    pub fn collect(connected: &[&FileRecord], index: &FileIndex<'_>) -> Self {
        let mut numbers = BTreeSet::new();
        for file in connected {
            numbers.extend(file.single_replicate());
            numbers.extend(
                file.derived_from
                    .iter()
                    .filter_map(|id| index.get(id))
                    .filter_map(FileRecord::single_replicate),
            );
        }
        Self { numbers }
    }

    pub fn contains(&self, number: u32) -> bool {
        self.numbers.contains(&number)
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.numbers.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }

    /// Replicate node a file (or its step) clusters under
    ///
    /// None for files with zero or several replicates, or whose replicate has
    /// no node.
    pub fn parent_of(&self, file: &FileRecord) -> Option<NodeId> {
        file.single_replicate()
            .filter(|n| self.contains(*n))
            .map(NodeId::replicate)
    }
}
