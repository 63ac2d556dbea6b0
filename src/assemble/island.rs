//! Island removal: files with no derivation in either direction

use super::index::DerivationIndex;
use crate::record::FileRecord;

/// Eligible files split into those with provenance edges and the orphans
#[derive(Debug, Default)]
pub struct IslandSplit<'a> {
    pub connected: Vec<&'a FileRecord>,
    pub islands: Vec<&'a FileRecord>,
}

/// Keep files that derive from something or that something derives from
pub fn split_islands<'a>(derivations: &DerivationIndex<'a>) -> IslandSplit<'a> {
    let (connected, islands) = derivations
        .eligible()
        .iter()
        .copied()
        .partition(|file| file.has_derivations() || derivations.is_derived_from(&file.id));
    IslandSplit { connected, islands }
}
